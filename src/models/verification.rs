use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value };

use crate::errors::FieldErrors;
use crate::validation;

/// Raw verification form
#[derive(Debug, Clone, Default)]
pub struct VerificationForm {
    pub ls_number: String,
    pub page_number: String,
    pub volume_number: String,
    pub lawyer_id: String,
}

/// `POST /verification/submit` body, also replayed on approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub property_id: String,
    pub ls_number: String,
    pub page_number: String,
    pub volume_number: String,
    pub lawyer_id: String,
    pub status: String,
}

impl VerificationForm {
    pub fn validate(&self, property_id: &str) -> Result<VerificationRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let ls_number = validation
            ::required(&mut errors, "lsNumber", &self.ls_number, "LS Number is required")
            .filter(|ls| {
                let ok = validation::is_ls_number(ls);
                if !ok {
                    errors.add("lsNumber", "Invalid LS Number format (e.g., LS1234/2024)");
                }
                ok
            });
        let page_number = validation::required(
            &mut errors,
            "pageNumber",
            &self.page_number,
            "Page number is required"
        );
        let volume_number = validation::required(
            &mut errors,
            "volumeNumber",
            &self.volume_number,
            "Volume number is required"
        );
        let lawyer_id = validation::required(
            &mut errors,
            "lawyerId",
            &self.lawyer_id,
            "Lawyer selection is required"
        );
        errors.into_result(VerificationRequest {
            property_id: property_id.to_string(),
            ls_number: ls_number.unwrap_or_default(),
            page_number: page_number.unwrap_or_default(),
            volume_number: volume_number.unwrap_or_default(),
            lawyer_id: lawyer_id.unwrap_or_default(),
            status: "verified".to_string(),
        })
    }
}

/// A verification as recorded by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    #[serde(default)]
    pub ls_number: String,
    #[serde(default)]
    pub page_number: String,
    #[serde(default)]
    pub volume_number: String,
    #[serde(default)]
    pub lawyer_id: Option<String>,
    #[serde(default)]
    pub verifier: Option<Value>,
    #[serde(default)]
    pub verification_date: Option<String>,
    #[serde(default)]
    pub documents: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerificationRecord {
    /// Whether the stored LS number has the expected shape
    pub fn has_valid_ls_number(&self) -> bool {
        validation::is_ls_number(&self.ls_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_ls_number() {
        let form = VerificationForm {
            ls_number: "LS12/2024".into(),
            page_number: "12".into(),
            volume_number: "3".into(),
            lawyer_id: "law-1".into(),
        };
        let errors = form.validate("p1").unwrap_err();
        assert_eq!(errors.get("lsNumber"), Some("Invalid LS Number format (e.g., LS1234/2024)"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn builds_request_with_verified_status() {
        let form = VerificationForm {
            ls_number: "LS1234/2024".into(),
            page_number: "12".into(),
            volume_number: "3".into(),
            lawyer_id: "law-1".into(),
        };
        let request = form.validate("p1").unwrap();
        assert_eq!(request.property_id, "p1");
        assert_eq!(request.status, "verified");
    }
}
