use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::errors::{ FieldErrors, RegistryError, RegistryResult };
use crate::models::property::Property;
use crate::models::transfer::{
    total_amount,
    PaymentUpdate,
    TransferDetails,
    TransferFees,
    TransferForm,
    TransferInitiation,
    TransferPayment,
    TransferRecord,
};
use crate::models::upload::Blob;
use crate::traits::backend::BackendApi;
use crate::traits::wizard_flow::{ FinalizePolicy, StepCommit, StepContext, StepInfo, WizardFlow };

const STEPS: [StepInfo; 4] = [
    StepInfo { id: "details", name: "Details", description: "New owner and agreement" },
    StepInfo { id: "documents", name: "Documents", description: "Supporting documents" },
    StepInfo { id: "payment", name: "Payment", description: "Transfer amount and fees" },
    StepInfo { id: "confirmation", name: "Confirmation", description: "Review and sign" },
];

/// Validated values of whichever transfer step was submitted
#[derive(Debug, Clone, PartialEq)]
pub enum TransferStep {
    Details(TransferDetails),
    Documents,
    Payment(TransferPayment),
    Confirmation,
}

/// Ownership transfer of one property.
///
/// The details step creates the server-side draft; documents and payment
/// update it; the confirmation step completes it with a signature.
pub struct TransferFlow {
    backend: Arc<dyn BackendApi>,
    property: Property,
}

impl TransferFlow {
    pub fn new(backend: Arc<dyn BackendApi>, property: Property) -> Self {
        Self { backend, property }
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Users that must not be offered as the new owner
    pub fn excluded_owner_ids(&self) -> Vec<String> {
        self.property.owner_id().map(str::to_string).into_iter().collect()
    }
}

fn require_draft_id<'a>(draft_id: Option<&'a str>) -> RegistryResult<&'a str> {
    draft_id.ok_or_else(|| RegistryError::rule("Please complete the transfer details first"))
}

#[async_trait]
impl WizardFlow for TransferFlow {
    type Values = TransferForm;
    type Validated = TransferStep;
    type Draft = TransferRecord;
    type Output = TransferRecord;

    fn steps(&self) -> &[StepInfo] {
        &STEPS
    }

    fn finalize_policy(&self) -> FinalizePolicy {
        FinalizePolicy { requires_draft_id: true, requires_signature: true }
    }

    fn validate_step(&self, step: usize, values: &TransferForm) -> Result<TransferStep, FieldErrors> {
        match step {
            0 => values.validate_details(self.property.owner_id()).map(TransferStep::Details),
            1 => Ok(TransferStep::Documents),
            2 => values.validate_payment().map(TransferStep::Payment),
            3 => Ok(TransferStep::Confirmation),
            _ => Err(FieldErrors::form(format!("Unknown transfer step {}", step))),
        }
    }

    async fn commit_step(
        &self,
        step: usize,
        validated: TransferStep,
        context: StepContext<'_, TransferRecord>
    ) -> RegistryResult<StepCommit<TransferRecord>> {
        match validated {
            TransferStep::Details(details) => {
                let initiation = TransferInitiation::new(&self.property.id, &details);
                let record = self.backend.initiate_transfer(&initiation).await?;
                if record.id.is_empty() {
                    return Err(RegistryError::Parse("Transfer draft has no id".to_string()));
                }
                info!("Transfer {} initiated for property {}", record.id, self.property.id);
                Ok(StepCommit { draft_id: Some(record.id.clone()), draft: record })
            }
            TransferStep::Documents => {
                let transfer_id = require_draft_id(context.draft_id)?;
                if context.attachments.is_empty() {
                    return Err(RegistryError::rule("Please upload at least one document"));
                }
                let documents = self.backend
                    .upload_transfer_documents(transfer_id, context.attachments).await?;
                info!("Uploaded {} documents to transfer {}", documents.len(), transfer_id);

                let mut draft = context.draft.clone();
                draft.documents = documents;
                Ok(StepCommit::local(draft))
            }
            TransferStep::Payment(payment) => {
                let transfer_id = require_draft_id(context.draft_id)?;
                let update = PaymentUpdate {
                    transfer_amount: payment.transfer_amount,
                    fees: TransferFees::STANDARD,
                };
                self.backend.update_transfer(transfer_id, &update).await?;

                let mut draft = context.draft.clone();
                draft.transfer_amount = Some(payment.transfer_amount);
                draft.fees = Some(TransferFees::STANDARD);
                draft.total_amount = Some(total_amount(payment.transfer_amount));
                Ok(StepCommit::local(draft))
            }
            TransferStep::Confirmation =>
                Err(RegistryError::InvalidInput(format!("Step {} is completed by signing", step))),
        }
    }

    async fn finalize(
        &self,
        _validated: TransferStep,
        context: StepContext<'_, TransferRecord>,
        signature: Option<Blob>
    ) -> RegistryResult<TransferRecord> {
        let transfer_id = require_draft_id(context.draft_id)?;
        let signature = signature.ok_or_else(|| RegistryError::rule("Please provide a signature first."))?;
        let completed = self.backend.complete_transfer(transfer_id, context.draft, &signature).await?;
        info!("Transfer {} completed", transfer_id);
        Ok(completed)
    }
}
