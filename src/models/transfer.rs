use chrono::NaiveDate;
use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value };

use crate::errors::FieldErrors;
use crate::models::user::User;
use crate::validation;

pub const REGISTRATION_FEE: f64 = 500.0;
pub const STAMP_DUTY: f64 = 200.0;

/// Fixed fees charged on every ownership transfer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFees {
    pub registration: f64,
    pub stamp_duty: f64,
}

impl TransferFees {
    pub const STANDARD: TransferFees = TransferFees {
        registration: REGISTRATION_FEE,
        stamp_duty: STAMP_DUTY,
    };

    pub fn total(&self) -> f64 {
        self.registration + self.stamp_duty
    }
}

impl Default for TransferFees {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Amount the buyer pays: agreed price plus the fixed fees
pub fn total_amount(transfer_amount: f64) -> f64 {
    transfer_amount + TransferFees::STANDARD.total()
}

/// Raw values of the transfer form, shared by all steps
#[derive(Debug, Clone, Default)]
pub struct TransferForm {
    /// Counterparty picked from the user lookup
    pub new_owner: Option<User>,
    pub transfer_reason: String,
    pub agreement_date: String,
    pub transfer_amount: String,
}

impl TransferForm {
    /// Details step. The new owner must differ from `current_owner_id`.
    pub fn validate_details(&self, current_owner_id: Option<&str>) -> Result<TransferDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let new_owner = match &self.new_owner {
            Some(owner) if Some(owner.id.as_str()) == current_owner_id => {
                errors.add("toOwnerId", "New owner cannot be the current owner");
                None
            }
            Some(owner) => Some(owner.clone()),
            None => {
                errors.add("toOwnerId", "New owner selection is required");
                None
            }
        };
        let transfer_reason = validation::required(
            &mut errors,
            "transferReason",
            &self.transfer_reason,
            "Transfer reason is required"
        );
        let agreement_date = validation::date(
            &mut errors,
            "agreementDate",
            &self.agreement_date,
            "Agreement date is required"
        );

        match (new_owner, transfer_reason, agreement_date) {
            (Some(new_owner), Some(transfer_reason), Some(agreement_date)) if errors.is_empty() => {
                Ok(TransferDetails { new_owner, transfer_reason, agreement_date })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_payment(&self) -> Result<TransferPayment, FieldErrors> {
        let mut errors = FieldErrors::new();
        let amount = validation::positive_number_with(
            &mut errors,
            "transferAmount",
            &self.transfer_amount,
            "Transfer amount is required",
            "Amount must be positive"
        );
        match amount {
            Some(transfer_amount) => Ok(TransferPayment { transfer_amount }),
            None => Err(errors),
        }
    }
}

/// Validated details step
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDetails {
    pub new_owner: User,
    pub transfer_reason: String,
    pub agreement_date: NaiveDate,
}

/// Validated payment step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferPayment {
    pub transfer_amount: f64,
}

/// Who the property goes to, as the registry records it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerDetails {
    pub name: String,
    pub identification: String,
    pub contact: String,
}

impl From<&User> for OwnerDetails {
    fn from(user: &User) -> Self {
        Self {
            name: user.full_name(),
            identification: user.id.clone(),
            contact: user.email.clone(),
        }
    }
}

/// `POST /properties/transfer/initiate` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInitiation {
    pub property_id: String,
    pub to_owner_id: String,
    pub transfer_reason: String,
    pub agreement_date: String,
    pub to_owner_details: OwnerDetails,
}

impl TransferInitiation {
    pub fn new(property_id: &str, details: &TransferDetails) -> Self {
        Self {
            property_id: property_id.to_string(),
            to_owner_id: details.new_owner.id.clone(),
            transfer_reason: details.transfer_reason.clone(),
            agreement_date: details.agreement_date.format("%Y-%m-%d").to_string(),
            to_owner_details: OwnerDetails::from(&details.new_owner),
        }
    }
}

/// `PUT /properties/transfer/:id` body
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub transfer_amount: f64,
    pub fees: TransferFees,
}

/// A document stored against a transfer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferDocument {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub doc_type: String,
}

/// Envelope returned by the documents upload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<TransferDocument>,
}

/// The server-tracked transfer draft. Fields the client does not model are
/// kept verbatim so the completion snapshot carries them back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_date: Option<String>,
    #[serde(default)]
    pub documents: Vec<TransferDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<TransferFees>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransferRecord {
    /// Flatten into multi-part text fields: strings as-is, everything else
    /// JSON-encoded, nulls dropped
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let value = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => return Vec::new(),
        };
        value
            .into_iter()
            .filter_map(|(key, value)| {
                match value {
                    Value::Null => None,
                    Value::String(s) => Some((key, s)),
                    other => Some((key, other.to_string())),
                }
            })
            .collect()
    }
}
