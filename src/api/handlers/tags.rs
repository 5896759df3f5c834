use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{check_password, require};
use crate::api::response::{ApiError, AppJson, Envelope};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCreatedResponse {
    pub tag_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    #[serde(default)]
    pub tag_name: String,
}

#[derive(Debug, Serialize)]
pub struct TagDescriptionResponse {
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListResponse {
    pub tag_list: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a tag with its description and photo folder.
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateTagRequest>,
) -> Result<Json<Envelope<TagCreatedResponse>>, ApiError> {
    require("password", &req.password)?;
    require("tagName", &req.tag_name)?;
    require("description", &req.description)?;
    check_password(&state, &req.password)?;

    let tag = state.db.add_tag(&req.tag_name, &req.description)?;

    if let Err(e) = state.photos.ensure_tag_folder(&tag).await {
        tracing::error!(tag = %tag, error = %e, "Failed to create tag folder");
        if let Err(undo) = state.db.remove_tag(&tag) {
            tracing::error!(tag = %tag, error = %undo, "Failed to roll back tag after folder error");
        }
        return Err(e.into());
    }

    tracing::info!(tag = %tag, "Created tag");
    Ok(Envelope::ok(TagCreatedResponse { tag_name: tag }))
}

pub async fn get_tag_description(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<TagRequest>,
) -> Result<Json<Envelope<TagDescriptionResponse>>, ApiError> {
    require("tagName", &req.tag_name)?;

    let description = state
        .db
        .get_tag_description(&req.tag_name)?
        .ok_or_else(|| ApiError::not_found(format!("Tag '{}' has no description", req.tag_name)))?;

    Ok(Envelope::ok(TagDescriptionResponse { description }))
}

pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<TagListResponse>>, ApiError> {
    let tag_list = state.db.list_tags()?;
    Ok(Envelope::ok(TagListResponse { tag_list }))
}
