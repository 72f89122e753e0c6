#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::errors::{ FieldErrors, RegistryError, RegistryResult };
    use crate::implementations::attachments::{ FileCandidate, PreviewRegistry };
    use crate::implementations::wizard::{ Wizard, WizardError };
    use crate::models::common::DocumentRole;
    use crate::models::upload::Blob;
    use crate::tests::support::{ setup, signature };
    use crate::traits::wizard_flow::{ FinalizePolicy, StepCommit, StepContext, StepInfo, WizardFlow };

    const STEPS: [StepInfo; 3] = [
        StepInfo { id: "first", name: "First", description: "" },
        StepInfo { id: "second", name: "Second", description: "" },
        StepInfo { id: "last", name: "Last", description: "" },
    ];

    /// Counts words; steps commit locally after an optional pause
    struct WordFlow {
        pause: Duration,
        policy: FinalizePolicy,
        finalized: std::sync::Mutex<Vec<Vec<String>>>,
    }

    impl WordFlow {
        fn new(policy: FinalizePolicy) -> Self {
            Self { pause: Duration::ZERO, policy, finalized: Default::default() }
        }
    }

    #[async_trait]
    impl WizardFlow for WordFlow {
        type Values = String;
        type Validated = String;
        type Draft = Vec<String>;
        type Output = usize;

        fn steps(&self) -> &[StepInfo] {
            &STEPS
        }

        fn finalize_policy(&self) -> FinalizePolicy {
            self.policy
        }

        fn validate_step(&self, _step: usize, values: &String) -> Result<String, FieldErrors> {
            let mut errors = FieldErrors::new();
            if values.trim().is_empty() {
                errors.add("word", "Word is required");
            }
            errors.into_result(values.trim().to_string())
        }

        async fn commit_step(
            &self,
            _step: usize,
            validated: String,
            context: StepContext<'_, Vec<String>>
        ) -> RegistryResult<StepCommit<Vec<String>>> {
            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            if validated == "boom" {
                return Err(RegistryError::Server { status: 500, message: "boom".to_string() });
            }
            let mut draft = context.draft.clone();
            draft.push(validated);
            Ok(StepCommit::local(draft))
        }

        async fn finalize(
            &self,
            validated: String,
            context: StepContext<'_, Vec<String>>,
            _signature: Option<Blob>
        ) -> RegistryResult<usize> {
            let mut words = context.draft.clone();
            words.push(validated);
            self.finalized.lock().unwrap().push(words.clone());
            Ok(words.len() + context.attachments.len())
        }
    }

    fn open_policy() -> FinalizePolicy {
        FinalizePolicy { requires_draft_id: false, requires_signature: false }
    }

    #[tokio::test]
    async fn second_submission_while_busy_is_refused() {
        setup();
        let mut flow = WordFlow::new(open_policy());
        flow.pause = Duration::from_millis(100);
        let wizard = Wizard::new(flow);

        let alpha = "alpha".to_string();
        let first = wizard.commit_step(0, &alpha);
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(wizard.is_submitting());
            wizard.commit_step(0, &"beta".to_string()).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), 1);
        assert!(matches!(second, Err(WizardError::Busy)));
        assert_eq!(wizard.draft(), vec!["alpha".to_string()]);
        assert!(!wizard.is_submitting());
    }

    #[tokio::test]
    async fn back_navigation_waits_for_the_submission() {
        setup();
        let mut flow = WordFlow::new(open_policy());
        flow.pause = Duration::from_millis(100);
        let wizard = Wizard::new(flow);
        wizard.commit_step(0, &"alpha".to_string()).await.unwrap();

        let beta = "beta".to_string();
        let commit = wizard.commit_step(1, &beta);
        let back = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            wizard.previous_step()
        };
        let (committed, back) = tokio::join!(commit, back);

        assert_eq!(back, 1);
        assert_eq!(committed.unwrap(), 2);
        assert_eq!(wizard.current_step(), 2);
        assert_eq!(wizard.previous_step(), 1);
    }

    #[tokio::test]
    async fn invalid_values_keep_the_step() {
        setup();
        let wizard = Wizard::new(WordFlow::new(open_policy()));

        let err = wizard.commit_step(0, &"   ".to_string()).await.unwrap_err();
        assert_eq!(err.field_errors().and_then(|e| e.get("word")), Some("Word is required"));
        assert_eq!(wizard.current_step(), 0);
        assert!(wizard.draft().is_empty());
    }

    #[tokio::test]
    async fn failed_commit_leaves_state_unchanged() {
        setup();
        let wizard = Wizard::new(WordFlow::new(open_policy()));
        wizard.commit_step(0, &"alpha".to_string()).await.unwrap();

        let err = wizard.commit_step(1, &"boom".to_string()).await.unwrap_err();
        assert!(matches!(err, WizardError::Commit(RegistryError::Server { status: 500, .. })));
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.draft(), vec!["alpha".to_string()]);

        assert_eq!(wizard.commit_step(1, &"beta".to_string()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn steps_must_be_submitted_in_order() {
        setup();
        let wizard = Wizard::new(WordFlow::new(open_policy()));

        let err = wizard.commit_step(1, &"alpha".to_string()).await.unwrap_err();
        assert!(matches!(err, WizardError::OutOfOrder { requested: 1, current: 0 }));

        wizard.commit_step(0, &"alpha".to_string()).await.unwrap();
        wizard.commit_step(1, &"beta".to_string()).await.unwrap();
        assert!(wizard.is_last_step());
        let err = wizard.commit_step(2, &"gamma".to_string()).await.unwrap_err();
        assert!(matches!(err, WizardError::PastFinalStep));
    }

    #[tokio::test]
    async fn going_back_keeps_the_draft_and_revalidates() {
        setup();
        let wizard = Wizard::new(WordFlow::new(open_policy()));
        wizard.commit_step(0, &"alpha".to_string()).await.unwrap();

        assert_eq!(wizard.previous_step(), 0);
        assert_eq!(wizard.previous_step(), 0);
        assert_eq!(wizard.draft(), vec!["alpha".to_string()]);

        assert!(wizard.commit_step(0, &String::new()).await.is_err());
        assert_eq!(wizard.commit_step(0, &"again".to_string()).await.unwrap(), 1);
        assert_eq!(wizard.current_step_info().map(|s| s.id), Some("second"));
    }

    #[tokio::test]
    async fn finalize_checks_position_draft_and_signature() {
        setup();
        let wizard = Wizard::new(
            WordFlow::new(FinalizePolicy { requires_draft_id: true, requires_signature: true })
        );

        let err = wizard.finalize(&"end".to_string(), Some(signature())).await.unwrap_err();
        assert!(matches!(err, WizardError::NotAtFinalStep));

        wizard.commit_step(0, &"alpha".to_string()).await.unwrap();
        wizard.commit_step(1, &"beta".to_string()).await.unwrap();

        // Local commits never produce a draft id
        let err = wizard.finalize(&"end".to_string(), Some(signature())).await.unwrap_err();
        assert!(matches!(err, WizardError::DraftNotStarted));
        assert!(wizard.flow().finalized.lock().unwrap().is_empty());
        assert!(!wizard.is_finished());
    }

    #[tokio::test]
    async fn empty_signature_is_refused() {
        setup();
        let wizard = Wizard::new(
            WordFlow::new(FinalizePolicy { requires_draft_id: false, requires_signature: true })
        );
        wizard.commit_step(0, &"alpha".to_string()).await.unwrap();
        wizard.commit_step(1, &"beta".to_string()).await.unwrap();

        let err = wizard.finalize(&"end".to_string(), None).await.unwrap_err();
        assert!(matches!(err, WizardError::MissingSignature));
        let err = wizard.finalize(&"end".to_string(), Some(Blob::new("image/png", Vec::new()))).await.unwrap_err();
        assert_eq!(err.to_string(), "Please provide a signature first.");

        assert_eq!(wizard.finalize(&"end".to_string(), Some(signature())).await.unwrap(), 3);
        assert!(wizard.is_finished());
        let err = wizard.finalize(&"end".to_string(), Some(signature())).await.unwrap_err();
        assert!(matches!(err, WizardError::Finished));
    }

    #[tokio::test]
    async fn attachments_reach_the_flow_and_previews_are_released() {
        setup();
        let previews = PreviewRegistry::new();
        let wizard = Wizard::with_previews(WordFlow::new(open_policy()), previews.clone());

        let rejected = wizard.add_files(
            vec![
                FileCandidate::new("front.png", "image/png", vec![1, 2, 3]),
                FileCandidate::new("notes.txt", "text/plain", vec![4])
            ],
            DocumentRole::Images
        );
        assert_eq!(rejected.len(), 1);
        assert_eq!(wizard.attachment_count(Some(DocumentRole::Images)), 1);
        assert_eq!(previews.live_count(), 1);

        wizard.commit_step(0, &"alpha".to_string()).await.unwrap();
        wizard.commit_step(1, &"beta".to_string()).await.unwrap();
        assert_eq!(wizard.finalize(&"end".to_string(), None).await.unwrap(), 4);

        assert!(wizard.remove_file(0).is_some());
        assert_eq!(wizard.attachment_count(None), 0);
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn validation_is_pure() {
        let wizard = Wizard::new(WordFlow::new(open_policy()));
        let values = "alpha".to_string();
        assert_eq!(wizard.validate_step(0, &values), wizard.validate_step(2, &values));
        assert_eq!(wizard.current_step(), 0);
        assert_eq!(wizard.steps().len(), 3);
    }
}
