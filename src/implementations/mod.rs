pub mod storage;
pub mod session_store;
pub mod http_backend;
pub mod route_guard;
pub mod attachments;
pub mod signature;
pub mod wizard;
pub mod transfer_flow;
pub mod registration_flow;
pub mod verification_flow;
pub mod listing;
pub mod search;
pub mod client;

pub use client::RegistryClient;
pub use session_store::{ Session, SessionStore };
pub use wizard::{ Wizard, WizardError };
