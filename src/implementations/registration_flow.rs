use std::sync::Arc;

use async_trait::async_trait;
use log::{ debug, info };

use crate::errors::{ FieldErrors, RegistryError, RegistryResult };
use crate::models::property::Property;
use crate::models::registration::{
    LocationDetails,
    NewProperty,
    PaymentDetails,
    PropertyDetails,
    RegistrationForm,
};
use crate::models::upload::Blob;
use crate::traits::backend::BackendApi;
use crate::traits::wizard_flow::{ FinalizePolicy, StepCommit, StepContext, StepInfo, WizardFlow };

const STEPS: [StepInfo; 3] = [
    StepInfo {
        id: "property-details",
        name: "Property Details",
        description: "Basic information about the property",
    },
    StepInfo { id: "location", name: "Location", description: "Property location and boundaries" },
    StepInfo { id: "payment", name: "Payment", description: "Registration fee payment" },
];

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationStep {
    Details(PropertyDetails),
    Location(LocationDetails),
    Payment(PaymentDetails),
}

/// Values held locally until the single final submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationDraft {
    pub details: Option<PropertyDetails>,
    pub location: Option<LocationDetails>,
}

/// New-property registration. Nothing reaches the server before the last
/// step, which sends fields and every tagged file in one request.
pub struct RegistrationFlow {
    backend: Arc<dyn BackendApi>,
}

impl RegistrationFlow {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WizardFlow for RegistrationFlow {
    type Values = RegistrationForm;
    type Validated = RegistrationStep;
    type Draft = RegistrationDraft;
    type Output = Property;

    fn steps(&self) -> &[StepInfo] {
        &STEPS
    }

    fn finalize_policy(&self) -> FinalizePolicy {
        FinalizePolicy { requires_draft_id: false, requires_signature: false }
    }

    fn validate_step(
        &self,
        step: usize,
        values: &RegistrationForm
    ) -> Result<RegistrationStep, FieldErrors> {
        match step {
            0 => values.validate_details().map(RegistrationStep::Details),
            1 => values.validate_location().map(RegistrationStep::Location),
            2 => values.validate_payment().map(RegistrationStep::Payment),
            _ => Err(FieldErrors::form(format!("Unknown registration step {}", step))),
        }
    }

    async fn commit_step(
        &self,
        step: usize,
        validated: RegistrationStep,
        context: StepContext<'_, RegistrationDraft>
    ) -> RegistryResult<StepCommit<RegistrationDraft>> {
        let mut draft = context.draft.clone();
        match validated {
            RegistrationStep::Details(details) => {
                draft.details = Some(details);
            }
            RegistrationStep::Location(location) => {
                draft.location = Some(location);
            }
            RegistrationStep::Payment(_) => {
                return Err(RegistryError::InvalidInput(format!("Step {} is submitted with the property", step)));
            }
        }
        debug!("Registration step {} kept locally", step);
        Ok(StepCommit::local(draft))
    }

    async fn finalize(
        &self,
        validated: RegistrationStep,
        context: StepContext<'_, RegistrationDraft>,
        _signature: Option<Blob>
    ) -> RegistryResult<Property> {
        if let RegistrationStep::Payment(payment) = &validated {
            // Payment is collected for the receipt only; the registry does
            // not take payment fields on this endpoint.
            debug!("Registration fee {} via {}", payment.amount, payment.method.as_str());
        }
        let (details, location) = match (&context.draft.details, &context.draft.location) {
            (Some(details), Some(location)) => (details.clone(), location.clone()),
            _ => {
                return Err(RegistryError::rule("Please complete the property details and location first"));
            }
        };

        let property = NewProperty { details, location };
        let created = self.backend.create_property(&property, context.attachments).await?;
        info!("Registered property {} ({})", created.id, created.title);
        Ok(created)
    }
}
