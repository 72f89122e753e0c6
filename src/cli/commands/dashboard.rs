use anyhow::Result;
use colored::*;

use landreg::RegistryClient;

use crate::cli::ui;

pub async fn execute(client: &RegistryClient) -> Result<()> {
    let spinner = ui::spinner_with_message("Loading dashboard...");
    let dashboard = client.dashboard().await;
    spinner.finish_and_clear();
    let dashboard = dashboard?;

    ui::print_header("Dashboard");
    let stats = &dashboard.stats;
    ui::print_result("Total properties", &stats.total_properties.to_string());
    ui::print_result("Verified", &stats.verified_properties.to_string().green().to_string());
    ui::print_result("Pending verification", &stats.pending_verifications.to_string().yellow().to_string());
    ui::print_result("Transfers", &stats.total_transfers.to_string());

    if !dashboard.trends.is_empty() {
        ui::print_header("Trends");
        for trend in &dashboard.trends {
            println!("  {}", trend);
        }
    }

    ui::print_header("Recent Activity");
    if dashboard.activities.is_empty() {
        ui::print_info("No recent activity");
    }
    for activity in &dashboard.activities {
        let description = activity
            .get("description")
            .or_else(|| activity.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| activity.to_string());
        println!("  - {}", description);
    }
    Ok(())
}
