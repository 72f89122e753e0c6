//! Files attached to a wizard before submission.
//!
//! Candidates are filtered against a per-role policy. Accepted image files
//! get a preview handle that is revoked exactly once: when the file is
//! removed, replaced, or the set is dropped.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::{ Arc, Mutex, PoisonError };

use log::{ debug, warn };

use crate::errors::{ RegistryError, RegistryResult };
use crate::models::common::DocumentRole;
use crate::models::upload::UploadFile;

const MB: u64 = 1024 * 1024;

/// Which files a role accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentPolicy {
    pub allowed_mime: &'static [&'static str],
    pub max_bytes: u64,
    pub max_files: Option<usize>,
    type_hint: &'static str,
}

impl AttachmentPolicy {
    /// Deeds, plans and other documents
    pub const DOCUMENTS: AttachmentPolicy = AttachmentPolicy {
        allowed_mime: &["application/pdf", "image/jpeg", "image/png"],
        max_bytes: 10 * MB,
        max_files: None,
        type_hint: "Only PDF, JPG, and PNG files are allowed.",
    };

    /// Property photos
    pub const IMAGES: AttachmentPolicy = AttachmentPolicy {
        allowed_mime: &["image/jpeg", "image/png"],
        max_bytes: 5 * MB,
        max_files: Some(5),
        type_hint: "Only JPG and PNG images are allowed.",
    };

    pub fn for_role(role: DocumentRole) -> AttachmentPolicy {
        match role {
            DocumentRole::Images => Self::IMAGES,
            _ => Self::DOCUMENTS,
        }
    }

    fn max_megabytes(&self) -> u64 {
        self.max_bytes / MB
    }
}

/// Guess a MIME type from a file name
pub fn mime_from_name(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// A file offered by the user, not yet accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime: mime.into(), bytes }
    }

    /// Read a file from disk, deriving the MIME type from its extension
    pub fn from_path(path: &Path) -> RegistryResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RegistryError::InvalidInput(format!("Not a file: {}", path.display())))?
            .to_string();
        let bytes = fs
            ::read(path)
            .map_err(|e| RegistryError::InvalidInput(format!("Failed to read {}: {}", path.display(), e)))?;
        let mime = mime_from_name(&name).to_string();
        Ok(Self { name, mime, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    UnsupportedType,
    TooLarge,
    LimitReached,
}

/// A candidate that was not accepted, with the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectionReason,
    pub message: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Issues preview handles and tracks which are still live
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<u64>>>,
    next_id: Arc<AtomicU64>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, file_name: &str) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live.lock().unwrap_or_else(PoisonError::into_inner).insert(id);
        debug!("Issued preview {} for {}", id, file_name);
        PreviewHandle {
            id,
            url: format!("preview://{}/{}", id, file_name),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of previews not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Preview of one accepted file; revoked on drop
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    url: String,
    live: Arc<Mutex<HashSet<u64>>>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        let removed = self.live.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.id);
        if !removed {
            warn!("Preview {} was already revoked", self.id);
        }
    }
}

/// An accepted file
#[derive(Debug)]
pub struct Attachment {
    pub name: String,
    pub mime: String,
    pub role: DocumentRole,
    pub bytes: Vec<u8>,
    preview: Option<PreviewHandle>,
}

impl Attachment {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }

    pub fn to_upload(&self) -> UploadFile {
        UploadFile {
            name: self.name.clone(),
            mime: self.mime.clone(),
            role: self.role,
            bytes: self.bytes.clone(),
        }
    }
}

/// Display summary of an accepted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSummary {
    pub name: String,
    pub role: DocumentRole,
    pub size: u64,
    pub preview_url: Option<String>,
}

/// Position of the property's main image: the first attached image
pub fn main_image_index(attachments: &[AttachmentSummary]) -> Option<usize> {
    attachments.iter().position(|attachment| attachment.role == DocumentRole::Images)
}

/// Ordered collection of accepted files
#[derive(Debug, Default)]
pub struct AttachmentSet {
    entries: Vec<Attachment>,
    previews: PreviewRegistry,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(previews: PreviewRegistry) -> Self {
        Self { entries: Vec::new(), previews }
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Accept every candidate the role's policy allows. Rejected candidates
    /// leave the set unchanged and are reported back.
    pub fn add_files(&mut self, candidates: Vec<FileCandidate>, role: DocumentRole) -> Vec<Rejection> {
        let policy = AttachmentPolicy::for_role(role);
        let mut rejections = Vec::new();

        for candidate in candidates {
            if !policy.allowed_mime.contains(&candidate.mime.as_str()) {
                rejections.push(Rejection {
                    message: format!("Invalid file type: {}. {}", candidate.name, policy.type_hint),
                    file_name: candidate.name,
                    reason: RejectionReason::UnsupportedType,
                });
                continue;
            }
            if candidate.size() > policy.max_bytes {
                rejections.push(Rejection {
                    message: format!(
                        "File too large: {}. Maximum size is {}MB.",
                        candidate.name,
                        policy.max_megabytes()
                    ),
                    file_name: candidate.name,
                    reason: RejectionReason::TooLarge,
                });
                continue;
            }
            if let Some(max) = policy.max_files {
                if self.count_role(role) >= max {
                    rejections.push(Rejection {
                        message: format!(
                            "Too many files: {}. At most {} {} can be attached.",
                            candidate.name,
                            max,
                            role.label().to_lowercase()
                        ),
                        file_name: candidate.name,
                        reason: RejectionReason::LimitReached,
                    });
                    continue;
                }
            }

            let preview = candidate.mime
                .starts_with("image/")
                .then(|| self.previews.issue(&candidate.name));
            debug!("Attached {} as {}", candidate.name, role);
            self.entries.push(Attachment {
                name: candidate.name,
                mime: candidate.mime,
                role,
                bytes: candidate.bytes,
                preview,
            });
        }
        rejections
    }

    /// Remove one file by position. Its preview is revoked.
    pub fn remove(&mut self, index: usize) -> Option<AttachmentSummary> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        Some(AttachmentSummary {
            name: removed.name.clone(),
            role: removed.role,
            size: removed.size(),
            preview_url: None,
        })
    }

    /// Drop every file of one role
    pub fn clear_role(&mut self, role: DocumentRole) {
        self.entries.retain(|entry| entry.role != role);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_role(&self, role: DocumentRole) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.role == role)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.entries.iter()
    }

    pub fn summaries(&self) -> Vec<AttachmentSummary> {
        self.entries
            .iter()
            .map(|entry| AttachmentSummary {
                name: entry.name.clone(),
                role: entry.role,
                size: entry.size(),
                preview_url: entry.preview_url().map(str::to_string),
            })
            .collect()
    }

    pub fn to_uploads(&self) -> Vec<UploadFile> {
        self.entries.iter().map(Attachment::to_upload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: usize) -> FileCandidate {
        FileCandidate::new(name, "application/pdf", vec![0; size])
    }

    fn png(name: &str) -> FileCandidate {
        FileCandidate::new(name, "image/png", vec![1, 2, 3])
    }

    #[test]
    fn rejects_oversized_and_unsupported_files() {
        let mut set = AttachmentSet::new();
        let rejections = set.add_files(
            vec![
                pdf("deed.pdf", 12 * 1024 * 1024),
                FileCandidate::new("notes.docx", "application/msword", vec![0; 10]),
                pdf("plan.pdf", 1024)
            ],
            DocumentRole::Deed
        );

        assert_eq!(set.len(), 1);
        assert_eq!(rejections.len(), 2);
        assert_eq!(rejections[0].reason, RejectionReason::TooLarge);
        assert_eq!(rejections[0].message, "File too large: deed.pdf. Maximum size is 10MB.");
        assert_eq!(
            rejections[1].message,
            "Invalid file type: notes.docx. Only PDF, JPG, and PNG files are allowed."
        );
    }

    #[test]
    fn first_image_is_the_main_one() {
        let mut set = AttachmentSet::new();
        set.add_files(vec![pdf("deed.pdf", 10)], DocumentRole::Deed);
        set.add_files(vec![png("front.png"), png("back.png")], DocumentRole::Images);
        assert_eq!(main_image_index(&set.summaries()), Some(1));

        set.remove(1);
        let summaries = set.summaries();
        assert_eq!(main_image_index(&summaries).map(|i| summaries[i].name.as_str()), Some("back.png"));

        set.clear_role(DocumentRole::Images);
        assert_eq!(main_image_index(&set.summaries()), None);
    }

    #[test]
    fn image_role_is_capped_at_five() {
        let mut set = AttachmentSet::new();
        let candidates = (0..7).map(|i| png(&format!("photo{}.png", i))).collect();
        let rejections = set.add_files(candidates, DocumentRole::Images);

        assert_eq!(set.count_role(DocumentRole::Images), 5);
        assert_eq!(rejections.len(), 2);
        assert!(rejections.iter().all(|r| r.reason == RejectionReason::LimitReached));
    }

    #[test]
    fn previews_are_revoked_once() {
        let registry = PreviewRegistry::new();
        let mut set = AttachmentSet::with_registry(registry.clone());
        set.add_files(vec![png("a.png"), png("b.png"), pdf("deed.pdf", 10)], DocumentRole::Other);
        assert_eq!(registry.live_count(), 2);

        set.remove(0);
        assert_eq!(registry.live_count(), 1);

        drop(set);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn uploads_keep_roles_and_order() {
        let mut set = AttachmentSet::new();
        set.add_files(vec![pdf("deed.pdf", 10)], DocumentRole::Deed);
        set.add_files(vec![png("front.png")], DocumentRole::Images);

        let uploads = set.to_uploads();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].role, DocumentRole::Deed);
        assert_eq!(uploads[1].role.field_name(), "images");
    }

    #[test]
    fn mime_guess_is_case_insensitive() {
        assert_eq!(mime_from_name("SCAN.PDF"), "application/pdf");
        assert_eq!(mime_from_name("front.JPEG"), "image/jpeg");
        assert_eq!(mime_from_name("archive.zip"), "application/octet-stream");
    }
}
