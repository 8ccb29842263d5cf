//! Files attached from the command line

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use railchat_core::attachment::{encode_base64, Attachment};
use railchat_core::error::{ChatError, ChatResult};

/// A file on disk, read only when the submission encodes it
#[derive(Debug, Clone)]
pub struct PathAttachment {
    path: PathBuf,
    filename: String,
    size: u64,
}

impl PathAttachment {
    pub async fn open(path: impl AsRef<Path>) -> ChatResult<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ChatError::Attachment {
                filename: filename.clone(),
                reason: e.to_string(),
            })?;

        if !metadata.is_file() {
            return Err(ChatError::Attachment {
                filename,
                reason: "not a regular file".to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            filename,
            size: metadata.len(),
        })
    }
}

#[async_trait(?Send)]
impl Attachment for PathAttachment {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_base64(&self) -> ChatResult<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ChatError::Attachment {
                filename: self.filename.clone(),
                reason: e.to_string(),
            })?;
        Ok(encode_base64(&bytes))
    }
}
