use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub size_label: String,
    /// Size before compression; equal to `size` for videos and untouched images.
    pub original_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Multipart schema used only for the OpenAPI document.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct FileUpload {
    #[schema(format = Binary)]
    pub file: String,
}
