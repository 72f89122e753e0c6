use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{ debug, info };

use crate::errors::{ RegistryError, RegistryResult };
use crate::models::upload::Blob;
use crate::traits::capture::{ SignatureEvent, SignaturePad };

pub const EMPTY_SIGNATURE_PROMPT: &str = "Please provide a signature first.";

/// Decode a `data:<mime>;base64,<payload>` URL into a blob
pub fn to_blob(data_url: &str) -> RegistryResult<Blob> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| RegistryError::InvalidInput("Signature is not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| RegistryError::InvalidInput("Signature data URL has no payload".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| RegistryError::InvalidInput("Signature data URL is not base64".to_string()))?;
    let mime = if mime.is_empty() { "application/octet-stream" } else { mime };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| RegistryError::InvalidInput(format!("Invalid signature payload: {}", e)))?;
    Ok(Blob::new(mime, bytes))
}

/// Run the pad until the signer confirms a non-empty signature or cancels.
///
/// Empty confirmations keep the pad open with a prompt. `Ok(None)` means the
/// signer cancelled and nothing should be submitted.
pub async fn capture_signature<P>(pad: &P) -> RegistryResult<Option<Blob>> where P: SignaturePad + ?Sized {
    loop {
        match pad.request_signature().await? {
            SignatureEvent::Cancelled => {
                info!("Signature cancelled");
                return Ok(None);
            }
            SignatureEvent::Confirmed { is_empty: true, .. } => {
                debug!("Empty signature confirmed, asking again");
                pad.prompt(EMPTY_SIGNATURE_PROMPT);
            }
            SignatureEvent::Confirmed { data_url, .. } => {
                let blob = to_blob(&data_url)?;
                debug!("Captured {} byte signature", blob.len());
                return Ok(Some(blob));
            }
        }
    }
}
