// Uploader - Hands media blobs to the content-addressed store
// The concrete transport (multipart upload to a pinning service) lives with the host

use super::cid::{ContentId, ContentIdError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// MEDIA BLOB
// ============================================================================

/// A binary attachment with its declared media type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaBlob {
    bytes: Vec<u8>,
    media_type: String,
    file_name: Option<String>,
}

impl MediaBlob {
    /// Create a blob from bytes and a media type such as `image/png`
    pub fn new(bytes: Vec<u8>, media_type: &str) -> Self {
        Self {
            bytes,
            media_type: media_type.to_string(),
            file_name: None,
        }
    }

    /// Attach the original file name
    pub fn with_file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ============================================================================
// UPLOAD ERROR
// ============================================================================

/// Errors reported by a content uploader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Upload transport failed: {0}")]
    Transport(String),

    #[error("Uploader returned an unusable identifier: {0}")]
    InvalidIdentifier(#[from] ContentIdError),

    #[error("Refusing to upload an empty blob")]
    EmptyBlob,
}

// ============================================================================
// CONTENT UPLOADER TRAIT
// ============================================================================

/// External collaborator that stores a blob and names it by content
#[async_trait]
pub trait ContentUploader: Send + Sync {
    /// Upload one blob, returning its content identifier
    async fn upload(&self, blob: &MediaBlob) -> Result<ContentId, UploadError>;
}

// ============================================================================
// MOCK CONTENT UPLOADER
// ============================================================================

/// In-process uploader that derives CIDv0 identifiers from the blob bytes
pub struct MockContentUploader {
    failure: Option<UploadError>,
    raw_response: Option<String>,
    delay_ms: u64,
    call_count: AtomicUsize,
    uploaded: Mutex<Vec<ContentId>>,
}

impl MockContentUploader {
    /// Create an uploader that succeeds
    pub fn new() -> Self {
        Self {
            failure: None,
            raw_response: None,
            delay_ms: 0,
            call_count: AtomicUsize::new(0),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    /// Fail every upload with the given error
    pub fn with_failure(mut self, error: UploadError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Answer every upload with this raw identifier string
    pub fn with_raw_response(mut self, raw: &str) -> Self {
        self.raw_response = Some(raw.to_string());
        self
    }

    /// Add a delay before responding
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Number of upload calls received
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Identifiers handed out so far
    pub fn uploaded(&self) -> Vec<ContentId> {
        self.uploaded
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

impl Default for MockContentUploader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentUploader for MockContentUploader {
    async fn upload(&self, blob: &MediaBlob) -> Result<ContentId, UploadError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if blob.is_empty() {
            return Err(UploadError::EmptyBlob);
        }

        let cid = match &self.raw_response {
            Some(raw) => ContentId::parse(raw)?,
            None => ContentId::v0_from_bytes(blob.bytes()),
        };

        if let Ok(mut ids) = self.uploaded.lock() {
            ids.push(cid.clone());
        }
        Ok(cid)
    }
}
