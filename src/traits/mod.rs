pub mod backend;
pub mod storage;
pub mod capture;
pub mod wizard_flow;

// Re-export traits
pub use backend::BackendApi;
pub use storage::KeyValueStore;
pub use capture::{ LocationPicker, SignatureEvent, SignaturePad };
pub use wizard_flow::{ FinalizePolicy, StepCommit, StepContext, StepInfo, WizardFlow };
