use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use dialoguer::Input;
use log::debug;

use landreg::errors::{ RegistryError, RegistryResult };
use landreg::implementations::attachments::mime_from_name;
use landreg::models::common::Coordinates;
use landreg::models::upload::Blob;
use landreg::traits::{ LocationPicker, SignatureEvent, SignaturePad };
use landreg::validation;

use crate::cli::ui;

/// Signature pad backed by an image file on disk. A path given on the
/// command line is used for the first request; later requests prompt.
pub struct FileSignaturePad {
    preset: Mutex<Option<PathBuf>>,
}

impl FileSignaturePad {
    pub fn new(preset: Option<PathBuf>) -> Self {
        Self { preset: Mutex::new(preset) }
    }

    fn next_path(&self) -> RegistryResult<Option<PathBuf>> {
        let preset = self.preset
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if preset.is_some() {
            return Ok(preset);
        }
        let raw: String = Input::with_theme(&ui::get_theme())
            .with_prompt("Signature image (PNG), empty to cancel")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
        Ok(validation::present(&raw).map(PathBuf::from))
    }
}

#[async_trait]
impl SignaturePad for FileSignaturePad {
    async fn request_signature(&self) -> RegistryResult<SignatureEvent> {
        let path = match self.next_path()? {
            Some(path) => path,
            None => {
                return Ok(SignatureEvent::Cancelled);
            }
        };
        let bytes = fs
            ::read(&path)
            .map_err(|e| RegistryError::InvalidInput(format!("Failed to read {}: {}", path.display(), e)))?;
        debug!("Read {} byte signature from {}", bytes.len(), path.display());

        let mime = mime_from_name(&path.to_string_lossy());
        let is_empty = bytes.is_empty();
        Ok(SignatureEvent::Confirmed {
            data_url: Blob::new(mime, bytes).to_data_url(),
            is_empty,
        })
    }

    fn prompt(&self, message: &str) {
        ui::print_warning(message);
    }
}

/// Asks for "lat, lng", starting from the given point
pub struct PromptLocationPicker;

impl LocationPicker for PromptLocationPicker {
    fn pick(&self, start: Coordinates) -> RegistryResult<Option<Coordinates>> {
        loop {
            let raw: String = Input::with_theme(&ui::get_theme())
                .with_prompt("Coordinates (lat, lng), empty to skip")
                .with_initial_text(start.to_string())
                .allow_empty(true)
                .interact_text()
                .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
            if validation::present(&raw).is_none() {
                return Ok(None);
            }
            match validation::parse_coordinates(&raw) {
                Some((lat, lng)) => {
                    return Ok(Some(Coordinates { lat, lng }));
                }
                None => ui::print_warning("Enter two numbers separated by a comma"),
            }
        }
    }
}
