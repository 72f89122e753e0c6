use async_trait::async_trait;

use crate::errors::{ FieldErrors, RegistryResult };
use crate::models::upload::{ Blob, UploadFile };

/// Static description of one wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Preconditions the engine checks before calling [`WizardFlow::finalize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizePolicy {
    /// A server-assigned draft id from an earlier commit is needed
    pub requires_draft_id: bool,
    /// A signature blob must be supplied
    pub requires_signature: bool,
}

/// Snapshot of wizard state handed to a commit or finalization
pub struct StepContext<'a, D> {
    pub draft_id: Option<&'a str>,
    pub draft: &'a D,
    pub attachments: &'a [UploadFile],
}

/// Result of a successful step commit
#[derive(Debug, Clone, PartialEq)]
pub struct StepCommit<D> {
    /// Replaces the wizard's draft
    pub draft: D,
    /// Set on the commit that creates the server-side draft
    pub draft_id: Option<String>,
}

impl<D> StepCommit<D> {
    pub fn local(draft: D) -> Self {
        Self { draft, draft_id: None }
    }
}

/// One multi-step flow driven by the wizard engine.
///
/// Validation is pure and local to a step. Commits may call the backend; the
/// engine only advances when a commit returns `Ok`. The last step is never
/// committed: its "next" action is [`finalize`](WizardFlow::finalize).
#[async_trait]
pub trait WizardFlow: Send + Sync {
    /// Raw form values shared by every step
    type Values: Send + Sync;
    /// Typed values of whichever step was validated
    type Validated: Send;
    /// State accumulated across commits
    type Draft: Clone + Default + Send + Sync;
    /// What a successful finalization yields
    type Output: Send;

    fn steps(&self) -> &[StepInfo];

    fn finalize_policy(&self) -> FinalizePolicy;

    fn validate_step(
        &self,
        step: usize,
        values: &Self::Values
    ) -> Result<Self::Validated, FieldErrors>;

    async fn commit_step(
        &self,
        step: usize,
        validated: Self::Validated,
        context: StepContext<'_, Self::Draft>
    ) -> RegistryResult<StepCommit<Self::Draft>>;

    async fn finalize(
        &self,
        validated: Self::Validated,
        context: StepContext<'_, Self::Draft>,
        signature: Option<Blob>
    ) -> RegistryResult<Self::Output>;
}
