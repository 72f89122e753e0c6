//! Generic multi-step controller.
//!
//! The engine owns the step index, the draft and the attachments; a
//! [`WizardFlow`] supplies per-step validation and the network actions.
//! At most one commit or finalization is in flight at a time.

use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::{ Mutex, MutexGuard, PoisonError };

use log::{ debug, info, warn };
use thiserror::Error;

use crate::errors::{ ErrorReport, FieldErrors, RegistryError };
use crate::implementations::attachments::{
    AttachmentSet,
    AttachmentSummary,
    FileCandidate,
    PreviewRegistry,
    Rejection,
};
use crate::models::common::DocumentRole;
use crate::models::upload::Blob;
use crate::traits::wizard_flow::{ StepContext, StepInfo, WizardFlow };

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Please fill in all required fields correctly")]
    Validation(FieldErrors),

    #[error("A submission is already in progress")]
    Busy,

    #[error("Step {requested} cannot be submitted while on step {current}")] OutOfOrder {
        requested: usize,
        current: usize,
    },

    #[error("The last step is submitted by finishing the wizard")]
    PastFinalStep,

    #[error("Complete the remaining steps before finishing")]
    NotAtFinalStep,

    #[error("Please complete the first step before finishing")]
    DraftNotStarted,

    #[error("Please provide a signature first.")]
    MissingSignature,

    #[error("This wizard has already been completed")]
    Finished,

    #[error(transparent)] Commit(#[from] RegistryError),
}

impl WizardError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            WizardError::Validation(errors) => Some(errors),
            WizardError::Commit(err) => err.field_errors(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, WizardError::Commit(err) if err.is_unauthorized())
    }
}

impl From<&WizardError> for ErrorReport {
    fn from(err: &WizardError) -> Self {
        match err {
            WizardError::Commit(inner) => ErrorReport::from(inner),
            other =>
                ErrorReport {
                    message: other.to_string(),
                    field_errors: other.field_errors().cloned(),
                },
        }
    }
}

pub type WizardResult<T> = Result<T, WizardError>;

struct WizardState<D> {
    current_step: usize,
    draft_id: Option<String>,
    draft: D,
    attachments: AttachmentSet,
    finished: bool,
}

/// Clears the in-flight flag when the submission ends, however it ends
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> WizardResult<Self> {
        flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SubmitGuard(flag))
            .map_err(|_| WizardError::Busy)
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Wizard<F: WizardFlow> {
    flow: F,
    state: Mutex<WizardState<F::Draft>>,
    submitting: AtomicBool,
}

impl<F: WizardFlow> Wizard<F> {
    pub fn new(flow: F) -> Self {
        Self::with_draft(flow, F::Draft::default())
    }

    /// Start from caller-supplied draft defaults
    pub fn with_draft(flow: F, draft: F::Draft) -> Self {
        Self::with_parts(flow, draft, AttachmentSet::new())
    }

    pub fn with_previews(flow: F, previews: PreviewRegistry) -> Self {
        Self::with_parts(flow, F::Draft::default(), AttachmentSet::with_registry(previews))
    }

    fn with_parts(flow: F, draft: F::Draft, attachments: AttachmentSet) -> Self {
        Self {
            flow,
            state: Mutex::new(WizardState {
                current_step: 0,
                draft_id: None,
                draft,
                attachments,
                finished: false,
            }),
            submitting: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, WizardState<F::Draft>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn steps(&self) -> &[StepInfo] {
        self.flow.steps()
    }

    fn last_step(&self) -> usize {
        self.flow.steps().len().saturating_sub(1)
    }

    pub fn current_step(&self) -> usize {
        self.state().current_step
    }

    pub fn current_step_info(&self) -> Option<StepInfo> {
        self.flow.steps().get(self.current_step()).copied()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step() == self.last_step()
    }

    pub fn draft_id(&self) -> Option<String> {
        self.state().draft_id.clone()
    }

    pub fn draft(&self) -> F::Draft {
        self.state().draft.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state().finished
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Apply one step's schema. Pure: the same values always give the same
    /// answer, whatever the current step is.
    pub fn validate_step(&self, step: usize, values: &F::Values) -> Result<F::Validated, FieldErrors> {
        self.flow.validate_step(step, values)
    }

    /// Validate and commit the current step, advancing on success. Returns
    /// the new step index. On any failure the state is left as it was.
    pub async fn commit_step(&self, step: usize, values: &F::Values) -> WizardResult<usize> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;

        let (draft_id, draft, uploads) = {
            let state = self.state();
            if state.finished {
                return Err(WizardError::Finished);
            }
            if step != state.current_step {
                return Err(WizardError::OutOfOrder { requested: step, current: state.current_step });
            }
            if step >= self.last_step() {
                return Err(WizardError::PastFinalStep);
            }
            (state.draft_id.clone(), state.draft.clone(), state.attachments.to_uploads())
        };

        let validated = self.flow.validate_step(step, values).map_err(WizardError::Validation)?;
        let step_id = self.flow.steps()[step].id;
        debug!("Committing step {} ({})", step, step_id);

        let context = StepContext {
            draft_id: draft_id.as_deref(),
            draft: &draft,
            attachments: &uploads,
        };
        let commit = match self.flow.commit_step(step, validated, context).await {
            Ok(commit) => commit,
            Err(err) => {
                warn!("Step {} ({}) failed: {}", step, step_id, err);
                return Err(WizardError::Commit(err));
            }
        };

        let mut state = self.state();
        state.draft = commit.draft;
        if let Some(id) = commit.draft_id {
            info!("Draft {} created", id);
            state.draft_id = Some(id);
        }
        if state.current_step == step {
            state.current_step = step + 1;
        }
        info!("Step {} ({}) committed", step, step_id);
        Ok(state.current_step)
    }

    /// Go back one step. Local only; values and draft are kept. Ignored
    /// while a submission is in flight.
    pub fn previous_step(&self) -> usize {
        let mut state = self.state();
        if self.is_submitting() {
            debug!("Ignoring back navigation during a submission");
            return state.current_step;
        }
        state.current_step = state.current_step.saturating_sub(1);
        state.current_step
    }

    /// Submit the last step together with everything accumulated so far.
    /// On failure the wizard stays on the last step for a retry.
    pub async fn finalize(&self, values: &F::Values, signature: Option<Blob>) -> WizardResult<F::Output> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let policy = self.flow.finalize_policy();

        let (draft_id, draft, uploads) = {
            let state = self.state();
            if state.finished {
                return Err(WizardError::Finished);
            }
            if state.current_step != self.last_step() {
                return Err(WizardError::NotAtFinalStep);
            }
            if policy.requires_draft_id && state.draft_id.is_none() {
                return Err(WizardError::DraftNotStarted);
            }
            (state.draft_id.clone(), state.draft.clone(), state.attachments.to_uploads())
        };
        if policy.requires_signature && signature.as_ref().map_or(true, Blob::is_empty) {
            return Err(WizardError::MissingSignature);
        }

        let validated = self.flow
            .validate_step(self.last_step(), values)
            .map_err(WizardError::Validation)?;

        let context = StepContext {
            draft_id: draft_id.as_deref(),
            draft: &draft,
            attachments: &uploads,
        };
        let output = match self.flow.finalize(validated, context, signature).await {
            Ok(output) => output,
            Err(err) => {
                warn!("Finalization failed: {}", err);
                return Err(WizardError::Commit(err));
            }
        };

        self.state().finished = true;
        info!("Wizard finished");
        Ok(output)
    }

    /// Attach files under a role; see [`AttachmentSet::add_files`]
    pub fn add_files(&self, candidates: Vec<FileCandidate>, role: DocumentRole) -> Vec<Rejection> {
        self.state().attachments.add_files(candidates, role)
    }

    pub fn remove_file(&self, index: usize) -> Option<AttachmentSummary> {
        self.state().attachments.remove(index)
    }

    pub fn attachments(&self) -> Vec<AttachmentSummary> {
        self.state().attachments.summaries()
    }

    pub fn attachment_count(&self, role: Option<DocumentRole>) -> usize {
        let state = self.state();
        match role {
            Some(role) => state.attachments.count_role(role),
            None => state.attachments.len(),
        }
    }
}
