use async_trait::async_trait;

use crate::errors::RegistryResult;
use crate::models::common::Coordinates;

/// What the signer did with the signature pad
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureEvent {
    /// The signer pressed save. `is_empty` is true when nothing was drawn.
    Confirmed { data_url: String, is_empty: bool },
    Cancelled,
}

/// Produces a hand-drawn signature image on demand
#[async_trait]
pub trait SignaturePad: Send + Sync {
    /// Wait until the signer confirms or cancels
    async fn request_signature(&self) -> RegistryResult<SignatureEvent>;

    /// Show a message while keeping the pad open
    fn prompt(&self, message: &str);
}

/// Produces a coordinate pair when the user picks a point
pub trait LocationPicker: Send + Sync {
    /// `None` when the user dismisses the picker
    fn pick(&self, start: Coordinates) -> RegistryResult<Option<Coordinates>>;
}
