use serde::Deserialize;
use serde_json::{ Map, Value };

/// Headline counters on the dashboard
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_properties: u64,
    #[serde(default)]
    pub verified_properties: u64,
    #[serde(default)]
    pub pending_verifications: u64,
    #[serde(default)]
    pub total_transfers: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything the dashboard view shows, fetched together
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub trends: Vec<Value>,
    pub activities: Vec<Value>,
}
