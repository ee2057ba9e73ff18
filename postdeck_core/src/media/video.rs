use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

use crate::helpers::format::format_file_size;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("File too large: {size} exceeds the {limit} limit")]
    TooLarge { size: String, limit: String },
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Empty upload")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    extensions: &'static [&'static str],
    mime_prefix: &'static str,
}

impl UploadPolicy {
    pub fn video(max_mb: u64) -> Self {
        Self {
            max_bytes: max_mb * 1024 * 1024,
            extensions: VIDEO_EXTENSIONS,
            mime_prefix: "video/",
        }
    }

    pub fn image(max_mb: u64) -> Self {
        Self {
            max_bytes: max_mb * 1024 * 1024,
            extensions: IMAGE_EXTENSIONS,
            mime_prefix: "image/",
        }
    }

    /// Lower-cased extension of an accepted file name.
    pub fn check(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        size: u64,
    ) -> Result<String, UploadRejection> {
        if size == 0 {
            return Err(UploadRejection::Empty);
        }
        if size > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                size: format_file_size(size),
                limit: format_file_size(self.max_bytes),
            });
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if !self.extensions.contains(&extension.as_str()) {
            return Err(UploadRejection::UnsupportedType(file_name.to_string()));
        }
        if let Some(mime) = content_type {
            if !mime.starts_with(self.mime_prefix) && mime != "application/octet-stream" {
                return Err(UploadRejection::UnsupportedType(mime.to_string()));
            }
        }

        Ok(extension)
    }
}

/// Name under which an upload is stored; never derived from user input beyond the extension.
pub fn stored_file_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}
