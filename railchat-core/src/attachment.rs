//! File attachments
//!
//! Files picked by the user are read lazily, only once a submission reaches
//! its encoding step. Each platform provides its own [`Attachment`] (browser
//! `File`, path on disk); this module owns the acceptance policy and the
//! base64 encoding shared by all of them.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;

use crate::error::{ChatError, ChatResult};
use crate::wire::FileData;

/// Per-file size cap (20 MiB)
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Accepted kinds: media type and the extensions that imply it
pub const ALLOWED_KINDS: [(&str, &[&str]); 4] = [
    ("text/csv", &["csv"]),
    ("application/pdf", &["pdf"]),
    ("image/png", &["png"]),
    ("image/jpeg", &["jpg", "jpeg"]),
];

/// A file the user attached to a prompt
#[async_trait(?Send)]
pub trait Attachment {
    fn filename(&self) -> &str;

    /// Size in bytes as reported before reading
    fn size(&self) -> u64;

    /// Media type reported by the platform, if any
    fn media_type(&self) -> Option<&str> {
        None
    }

    /// Full contents as standard base64, without a data-URI prefix
    async fn read_base64(&self) -> ChatResult<String>;
}

/// Attachment whose bytes are already in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl InMemoryAttachment {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait(?Send)]
impl Attachment for InMemoryAttachment {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read_base64(&self) -> ChatResult<String> {
        Ok(encode_base64(&self.bytes))
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Drop a `data:<type>;base64,` prefix, leaving the payload
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        match encoded.split_once(',') {
            Some((_, payload)) => payload,
            None => "",
        }
    } else {
        encoded
    }
}

/// Read and encode every file concurrently. An empty list encodes to `None`.
pub async fn encode_attachments<A: Attachment>(files: &[A]) -> ChatResult<Option<Vec<FileData>>> {
    if files.is_empty() {
        return Ok(None);
    }

    let encoded = try_join_all(files.iter().map(|file| async move {
        let content = file.read_base64().await?;
        Ok::<_, ChatError>(FileData {
            filename: file.filename().to_string(),
            content,
        })
    }))
    .await?;

    Ok(Some(encoded))
}

/// Why a file was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidType,
    TooLarge,
}

/// A refused file, rendered as the notice shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRejection {
    pub filename: String,
    pub reason: RejectionReason,
}

impl std::fmt::Display for AttachmentRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not attach {}: ", self.filename)?;
        match self.reason {
            RejectionReason::InvalidType => write!(f, "Invalid file type."),
            RejectionReason::TooLarge => write!(
                f,
                "File size exceeds {}MB limit.",
                MAX_ATTACHMENT_BYTES / 1024 / 1024
            ),
        }
    }
}

/// True when the name or the media type is on the allow-list
pub fn is_allowed_kind(filename: &str, media_type: Option<&str>) -> bool {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    ALLOWED_KINDS.iter().any(|(mime, extensions)| {
        media_type.is_some_and(|m| m.eq_ignore_ascii_case(mime))
            || extension
                .as_deref()
                .is_some_and(|ext| extensions.contains(&ext))
    })
}

/// Check a file against the type allow-list and size cap
pub fn check_attachment<A: Attachment + ?Sized>(file: &A) -> Result<(), AttachmentRejection> {
    let reject = |reason| AttachmentRejection {
        filename: file.filename().to_string(),
        reason,
    };

    if !is_allowed_kind(file.filename(), file.media_type()) {
        return Err(reject(RejectionReason::InvalidType));
    }
    if file.size() > MAX_ATTACHMENT_BYTES {
        return Err(reject(RejectionReason::TooLarge));
    }
    Ok(())
}
