use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;

use super::{check_password, require};
use crate::api::response::{ApiError, Envelope};
use crate::AppState;

const PHOTO_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub saved: usize,
}

#[derive(Debug, Serialize)]
pub struct ComicPhotosResponse {
    /// Base64-encoded photos in page order
    pub images: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Upload the pages of a comic. Multipart fields: `password`, `tag`, `name`
/// and one or more `photo` files, saved as `1.jpg`, `2.jpg`, ... in upload
/// order. The password is checked before anything touches the disk.
pub async fn upload_photos(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<UploadResponse>>, ApiError> {
    let mut password = String::new();
    let mut tag = String::new();
    let mut name = String::new();
    let mut photos: Vec<Bytes> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| {
            multipart_error(e, "Invalid multipart data", state.config.max_upload_size)
        })?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "photo" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let extension = std::path::Path::new(&file_name)
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if !PHOTO_EXTENSIONS.contains(&extension.as_str()) {
                    return Err(ApiError::bad_request(format!(
                        "file is not an image or not supported: {file_name}"
                    )));
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        multipart_error(e, "Failed to read file", state.config.max_upload_size)
                    })?;

                if data.len() as u64 > state.config.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.max_upload_size
                    )));
                }
                photos.push(data);
            }
            "password" => {
                password = field
                    .text()
                    .await
                    .map_err(|e| {
                        multipart_error(e, "Invalid password", state.config.max_upload_size)
                    })?;
            }
            "tag" => {
                tag = field
                    .text()
                    .await
                    .map_err(|e| {
                        multipart_error(e, "Invalid tag", state.config.max_upload_size)
                    })?;
            }
            "name" => {
                name = field
                    .text()
                    .await
                    .map_err(|e| {
                        multipart_error(e, "Invalid name", state.config.max_upload_size)
                    })?;
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    require("password", &password)?;
    require("tag", &tag)?;
    require("name", &name)?;
    if photos.is_empty() {
        return Err(ApiError::bad_request("photo field is required"));
    }
    check_password(&state, &password)?;

    if !state.db.comic_exists(&tag, &name)? {
        return Err(ApiError::not_found("Comic not found"));
    }

    let saved = photos.len();
    for (i, data) in photos.into_iter().enumerate() {
        state.photos.save_photo(&tag, &name, i + 1, data).await?;
    }

    tracing::info!(tag = %tag, name = %name, photos = saved, "Saved comic photos");
    Ok(Envelope::ok(UploadResponse {
        message: "successful insert comix photo".to_string(),
        saved,
    }))
}

/// The body limit surfaces as a multipart error carrying 413; keep that
/// status instead of folding it into a 400.
fn multipart_error(e: MultipartError, context: &str, max_upload_size: u64) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(format!(
            "Upload exceeds maximum size of {max_upload_size} bytes"
        ))
    } else {
        ApiError::bad_request(format!("{context}: {e}"))
    }
}

/// Serve a single photo file.
/// Route: GET /photos/:tag/:name/:file
pub async fn serve_photo(
    State(state): State<Arc<AppState>>,
    Path((tag, name, file)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let data = state.photos.read_photo(&tag, &name, &file).await?;

    let content_type = mime_guess::from_path(&file)
        .first_raw()
        .unwrap_or("image/jpeg");

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(content_type),
    );
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}

/// Return every page of a comic and count the visit.
/// Route: GET /comix/:tag/:name
pub async fn comic_photos(
    State(state): State<Arc<AppState>>,
    Path((tag, name)): Path<(String, String)>,
) -> Result<Json<Envelope<ComicPhotosResponse>>, ApiError> {
    let photos = state.photos.list_photos(&tag, &name).await?;

    let images = photos
        .iter()
        .map(|data| base64::engine::general_purpose::STANDARD.encode(data))
        .collect();

    match state.db.increment_views(&tag, &name) {
        Ok(true) => {}
        Ok(false) => tracing::debug!(tag = %tag, name = %name, "Photos served for unknown comic"),
        Err(e) => tracing::warn!(tag = %tag, name = %name, error = %e, "Failed to count view"),
    }

    Ok(Envelope::ok(ComicPhotosResponse { images }))
}
