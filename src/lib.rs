pub mod models;
pub mod traits;
pub mod errors;
pub mod config;
pub mod validation;
pub mod implementations;
#[cfg(test)]
pub mod tests;

// Re-export core components
pub use config::{ ClientConfig, ConfigError };
pub use errors::{ ErrorReport, FieldErrors, RecoverableError, RegistryError, RegistryResult };
pub use implementations::{
    attachments::{ AttachmentPolicy, AttachmentSet, FileCandidate, PreviewRegistry, Rejection },
    client::RegistryClient,
    http_backend::HttpBackend,
    listing::{ ListFilter, PropertyList },
    registration_flow::RegistrationFlow,
    route_guard::{ Navigation, Route, RouteGuard },
    search::{ DebouncedSearch, PropertySearch, UserLookup },
    session_store::{ Session, SessionStore },
    signature::{ capture_signature, to_blob },
    storage::{ FileStore, MemoryStore },
    transfer_flow::TransferFlow,
    verification_flow::VerificationFlow,
    wizard::{ Wizard, WizardError },
};
pub use models::{
    common::{ Coordinates, DocumentRole, PaymentMethod, PropertyType, VerificationStatus },
    property::{ Property, SearchQuery },
    upload::{ Blob, UploadFile },
    user::{ Credentials, User },
};
pub use traits::{
    BackendApi,
    FinalizePolicy,
    KeyValueStore,
    LocationPicker,
    SignatureEvent,
    SignaturePad,
    StepInfo,
    WizardFlow,
};
