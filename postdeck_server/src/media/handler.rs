use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use postdeck_core::media::{
    compress::{CompressOptions, compress_image},
    format_file_size,
    video::{UploadPolicy, stored_file_name},
};

use crate::{
    error::ErrorServer,
    media::dto::{FileUpload, UploadResponse},
    state::ServerState,
};

pub const UPLOADS_ROUTE: &str = "/uploads";

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, ErrorServer> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ErrorServer::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ErrorServer::bad_request(e.to_string()))?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ErrorServer::bad_request("Missing multipart field `file`"))
}

async fn store(
    state: &ServerState,
    subdir: &str,
    extension: &str,
    bytes: &[u8],
) -> Result<(String, String), ErrorServer> {
    let dir = state.config().upload_dir.join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(ErrorServer::internal)?;

    let name = stored_file_name(extension);
    tokio::fs::write(dir.join(&name), bytes)
        .await
        .map_err(ErrorServer::internal)?;

    let url = format!(
        "{}{}/{}/{}",
        state.config().public_url,
        UPLOADS_ROUTE,
        subdir,
        name
    );
    Ok((name, url))
}

#[utoipa::path(
    post,
    path = "/video/upload",
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    description = "Upload a video for a post",
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Rejected file"),
    )
)]
pub async fn upload_video(
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ErrorServer> {
    let upload = read_file_field(multipart).await?;
    let size = upload.bytes.len() as u64;
    let extension = UploadPolicy::video(state.config().max_video_mb)
        .check(&upload.file_name, upload.content_type.as_deref(), size)
        .map_err(|e| ErrorServer::bad_request(e.to_string()))?;

    let (file_name, url) = store(&state, "videos", &extension, &upload.bytes).await?;
    log::info!("Stored video {} ({})", file_name, format_file_size(size));

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url,
            file_name,
            content_type: upload
                .content_type
                .unwrap_or_else(|| format!("video/{}", extension)),
            size,
            size_label: format_file_size(size),
            original_size: size,
            width: None,
            height: None,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/media/images",
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    description = "Upload an image; it is downscaled and recompressed when over budget",
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Rejected file"),
    )
)]
pub async fn upload_image(
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ErrorServer> {
    let upload = read_file_field(multipart).await?;
    let original_size = upload.bytes.len() as u64;
    let extension = UploadPolicy::image(state.config().max_image_mb)
        .check(&upload.file_name, upload.content_type.as_deref(), original_size)
        .map_err(|e| ErrorServer::bad_request(e.to_string()))?;

    let bytes = upload.bytes;
    let compressed = tokio::task::spawn_blocking(move || {
        compress_image(&bytes, &CompressOptions::default())
    })
    .await
    .map_err(ErrorServer::internal)?
    .map_err(|e| ErrorServer::bad_request(e.to_string()))?;

    let extension = compressed.extension(&extension);
    let original_type = upload
        .content_type
        .unwrap_or_else(|| format!("image/{}", extension));
    let (file_name, url) = store(&state, "images", &extension, &compressed.bytes).await?;
    let size = compressed.bytes.len() as u64;
    log::info!(
        "Stored image {} ({} -> {})",
        file_name,
        format_file_size(original_size),
        format_file_size(size)
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url,
            file_name,
            content_type: compressed.content_type(&original_type),
            size,
            size_label: format_file_size(size),
            original_size,
            width: Some(compressed.width),
            height: Some(compressed.height),
        }),
    ))
}
