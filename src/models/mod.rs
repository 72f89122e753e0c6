pub mod common;
pub mod user;
pub mod property;
pub mod registration;
pub mod transfer;
pub mod verification;
pub mod upload;
pub mod dashboard;

// Re-export common model types
pub use common::{ Coordinates, DocumentRole, PaymentMethod, PropertyType, VerificationStatus };
pub use user::{ AuthResponse, Credentials, User };
pub use property::{ Property, PropertyPage, SearchQuery, PriceRange };
pub use transfer::{ TransferForm, TransferRecord };
pub use verification::{ VerificationForm, VerificationRecord, VerificationRequest };
pub use upload::{ Blob, UploadFile };
