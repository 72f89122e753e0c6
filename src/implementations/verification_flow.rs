use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::errors::{ FieldErrors, RegistryError, RegistryResult };
use crate::models::upload::Blob;
use crate::models::verification::{ VerificationForm, VerificationRequest };
use crate::traits::backend::BackendApi;
use crate::traits::wizard_flow::{ FinalizePolicy, StepCommit, StepContext, StepInfo, WizardFlow };

const STEPS: [StepInfo; 2] = [
    StepInfo { id: "details", name: "Verification Details", description: "Survey and lawyer records" },
    StepInfo { id: "signature", name: "Signature", description: "Sign to approve" },
];

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStep {
    Details(VerificationRequest),
    Signature,
}

/// Verification of one property's survey records, approved with a signature
pub struct VerificationFlow {
    backend: Arc<dyn BackendApi>,
    property_id: String,
}

impl VerificationFlow {
    pub fn new(backend: Arc<dyn BackendApi>, property_id: impl Into<String>) -> Self {
        Self { backend, property_id: property_id.into() }
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }
}

#[async_trait]
impl WizardFlow for VerificationFlow {
    type Values = VerificationForm;
    type Validated = VerificationStep;
    /// The request accepted by the server, replayed on approval
    type Draft = Option<VerificationRequest>;
    type Output = VerificationRequest;

    fn steps(&self) -> &[StepInfo] {
        &STEPS
    }

    fn finalize_policy(&self) -> FinalizePolicy {
        FinalizePolicy { requires_draft_id: false, requires_signature: true }
    }

    fn validate_step(&self, step: usize, values: &VerificationForm) -> Result<VerificationStep, FieldErrors> {
        match step {
            0 => values.validate(&self.property_id).map(VerificationStep::Details),
            1 => Ok(VerificationStep::Signature),
            _ => Err(FieldErrors::form(format!("Unknown verification step {}", step))),
        }
    }

    async fn commit_step(
        &self,
        step: usize,
        validated: VerificationStep,
        _context: StepContext<'_, Option<VerificationRequest>>
    ) -> RegistryResult<StepCommit<Option<VerificationRequest>>> {
        match validated {
            VerificationStep::Details(request) => {
                self.backend.submit_verification(&request).await?;
                info!("Verification submitted for property {}", self.property_id);
                Ok(StepCommit::local(Some(request)))
            }
            VerificationStep::Signature =>
                Err(RegistryError::InvalidInput(format!("Step {} is completed by signing", step))),
        }
    }

    async fn finalize(
        &self,
        _validated: VerificationStep,
        context: StepContext<'_, Option<VerificationRequest>>,
        signature: Option<Blob>
    ) -> RegistryResult<VerificationRequest> {
        let request = context.draft
            .clone()
            .ok_or_else(|| RegistryError::rule("Please submit the verification details first"))?;
        let signature = signature.ok_or_else(|| RegistryError::rule("Please provide a signature first."))?;

        self.backend.approve_verification(&self.property_id, &request, &signature).await?;
        info!("Verification approved for property {}", self.property_id);
        Ok(request)
    }
}
