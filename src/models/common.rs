use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::errors::RegistryError;

/// Property classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Residential,
    Commercial,
    Agricultural,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [
        PropertyType::Residential,
        PropertyType::Commercial,
        PropertyType::Agricultural,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "residential",
            PropertyType::Commercial => "commercial",
            PropertyType::Agricultural => "agricultural",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residential" => Ok(PropertyType::Residential),
            "commercial" => Ok(PropertyType::Commercial),
            "agricultural" => Ok(PropertyType::Agricultural),
            _ => Err(RegistryError::InvalidInput(format!("Unknown property type: {}", s))),
        }
    }
}

/// Where a property stands in the verification process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 3] = [
        VerificationStatus::Verified,
        VerificationStatus::Pending,
        VerificationStatus::Unverified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
        }
    }
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Unverified
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unverified" => Ok(VerificationStatus::Unverified),
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            _ => Err(RegistryError::InvalidInput(format!("Unknown verification status: {}", s))),
        }
    }
}

/// Role a file plays in a property registration. The wire name doubles as
/// the multi-part field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentRole {
    Deed,
    SurveyPlan,
    Tax,
    Identity,
    Images,
    Other,
}

impl DocumentRole {
    pub const ALL: [DocumentRole; 6] = [
        DocumentRole::Deed,
        DocumentRole::SurveyPlan,
        DocumentRole::Tax,
        DocumentRole::Identity,
        DocumentRole::Images,
        DocumentRole::Other,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            DocumentRole::Deed => "deed",
            DocumentRole::SurveyPlan => "surveyPlan",
            DocumentRole::Tax => "tax",
            DocumentRole::Identity => "identity",
            DocumentRole::Images => "images",
            DocumentRole::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentRole::Deed => "Deed",
            DocumentRole::SurveyPlan => "Survey Plan",
            DocumentRole::Tax => "Tax Document",
            DocumentRole::Identity => "Owner Identification",
            DocumentRole::Images => "Property Images",
            DocumentRole::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl FromStr for DocumentRole {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deed" => Ok(DocumentRole::Deed),
            "surveyPlan" | "survey" => Ok(DocumentRole::SurveyPlan),
            "tax" => Ok(DocumentRole::Tax),
            "identity" => Ok(DocumentRole::Identity),
            "images" => Ok(DocumentRole::Images),
            _ => Ok(DocumentRole::Other),
        }
    }
}

/// Registration fee payment channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    BankTransfer,
    MobileMoney,
    CreditCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::BankTransfer,
        PaymentMethod::MobileMoney,
        PaymentMethod::CreditCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::MobileMoney => "mobile-money",
            PaymentMethod::CreditCard => "credit-card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            "mobile-money" => Ok(PaymentMethod::MobileMoney),
            "credit-card" => Ok(PaymentMethod::CreditCard),
            _ => Err(RegistryError::InvalidInput(format!("Unknown payment method: {}", s))),
        }
    }
}

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Freetown, where the map picker opens
    pub const DEFAULT_CENTER: Coordinates = Coordinates { lat: 8.4657, lng: -13.2317 };
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}
