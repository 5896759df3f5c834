use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{check_password, require, require_page};
use crate::api::response::{ApiError, AppJson, Empty, Envelope};
use crate::storage::models::{
    normalize_tag, page_count, ComicRecord, EditTarget, EditableField,
};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComicRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicRequest {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteComicRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditComicRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub param: String,
    #[serde(default)]
    pub new_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub page_number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPageRequest {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub tag_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub page_number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCountRequest {
    #[serde(default)]
    pub tag_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchCountRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ComicResponse {
    pub tag: String,
    pub name: String,
    pub description: String,
    pub upload_date: String,
    pub views: u64,
}

/// One entry of a paginated listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComicSummary {
    pub comix_name: String,
    pub comix_tag: String,
    pub description: String,
    pub comix_date: String,
    pub views: u64,
}

#[derive(Debug, Serialize)]
pub struct ComicListResponse {
    #[serde(rename = "comixFromForMainPage")]
    pub comics: Vec<ComicSummary>,
}

#[derive(Debug, Serialize)]
pub struct PageCountResponse {
    #[serde(rename = "NumberOfComix")]
    pub pages: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a comic and its photo folder. If the folder cannot be created the
/// comic is removed again.
pub async fn create_comic(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateComicRequest>,
) -> Result<Json<Envelope<ComicResponse>>, ApiError> {
    require("password", &req.password)?;
    require("tagName", &req.tag_name)?;
    require("name", &req.name)?;
    require("description", &req.description)?;
    check_password(&state, &req.password)?;

    let today = Utc::now().date_naive();
    let comic = state
        .db
        .add_comic(&req.tag_name, &req.name, &req.description, today)?;

    if let Err(e) = state.photos.ensure_folder(&comic.tag, &comic.name).await {
        tracing::error!(tag = %comic.tag, name = %comic.name, error = %e, "Failed to create comic folder");
        if let Err(undo) = state.db.delete_comic(&comic.tag, &comic.name) {
            tracing::error!(tag = %comic.tag, name = %comic.name, error = %undo, "Failed to roll back comic after folder error");
        }
        return Err(e.into());
    }

    tracing::info!(tag = %comic.tag, name = %comic.name, "Created comic");
    Ok(Envelope::ok(comic_to_response(&comic)))
}

pub async fn get_comic(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ComicRequest>,
) -> Result<Json<Envelope<ComicResponse>>, ApiError> {
    require("tagName", &req.tag_name)?;
    require("name", &req.name)?;

    if !state.db.tag_exists(&req.tag_name)? {
        return Err(ApiError::not_found(format!(
            "Tag '{}' does not exist",
            req.tag_name
        )));
    }

    let comic = state
        .db
        .get_comic(&req.tag_name, &req.name)?
        .ok_or_else(|| ApiError::not_found("Comic not found"))?;

    Ok(Envelope::ok(comic_to_response(&comic)))
}

pub async fn list_main_page(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<PageRequest>,
) -> Result<Json<Envelope<ComicListResponse>>, ApiError> {
    let page = require_page(req.page_number)?;
    let comics = state.db.list_global(page)?;
    Ok(Envelope::ok(list_response(comics)))
}

pub async fn list_tag_comics(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<TagPageRequest>,
) -> Result<Json<Envelope<ComicListResponse>>, ApiError> {
    require("tagName", &req.tag_name)?;
    let page = require_page(req.page_number)?;

    if !state.db.tag_exists(&req.tag_name)? {
        return Err(ApiError::not_found(format!(
            "Tag '{}' does not exist",
            req.tag_name
        )));
    }

    let comics = state.db.list_by_tag(&req.tag_name, page)?;
    Ok(Envelope::ok(list_response(comics)))
}

pub async fn find_comics(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SearchRequest>,
) -> Result<Json<Envelope<ComicListResponse>>, ApiError> {
    require("name", &req.name)?;
    let page = require_page(req.page_number)?;

    let comics = state.db.search(&req.name, page)?;
    Ok(Envelope::ok(list_response(comics)))
}

pub async fn delete_comic(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<DeleteComicRequest>,
) -> Result<Json<Envelope<Empty>>, ApiError> {
    require("password", &req.password)?;
    require("tagName", &req.tag_name)?;
    require("name", &req.name)?;
    check_password(&state, &req.password)?;

    if !state.db.delete_comic(&req.tag_name, &req.name)? {
        return Err(ApiError::not_found("Comic not found"));
    }

    // Photos go after the record, best-effort
    if let Err(e) = state.photos.remove_folder(&req.tag_name, &req.name).await {
        tracing::warn!(tag = %req.tag_name, name = %req.name, error = %e, "Failed to remove comic photos");
    }

    tracing::info!(tag = %req.tag_name, name = %req.name, "Deleted comic");
    Ok(Envelope::ok(Empty {}))
}

/// Edit one attribute of a comic. `param` selects the name, the description
/// or the tag; renames and tag moves also move the photo folder and are
/// reverted if that move fails.
pub async fn edit_comic(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<EditComicRequest>,
) -> Result<Json<Envelope<ComicResponse>>, ApiError> {
    require("password", &req.password)?;
    require("tagName", &req.tag_name)?;
    require("name", &req.name)?;
    require("param", &req.param)?;
    require("newValue", &req.new_value)?;

    check_password(&state, &req.password)?;
    let target: EditTarget = req.param.parse().map_err(ApiError::bad_request)?;

    let comic = match target {
        EditTarget::Field(EditableField::Description) => state.db.edit_field_in_tag(
            &req.tag_name,
            &req.name,
            EditableField::Description,
            &req.new_value,
        )?,
        EditTarget::Field(EditableField::Name) => {
            let renamed = state.db.edit_field_in_tag(
                &req.tag_name,
                &req.name,
                EditableField::Name,
                &req.new_value,
            )?;
            if let Err(e) =
                move_photos(&state, &renamed.tag, &req.name, &renamed.tag, &renamed.name).await
            {
                if let Err(undo) = state.db.edit_field_in_tag(
                    &renamed.tag,
                    &renamed.name,
                    EditableField::Name,
                    &req.name,
                ) {
                    tracing::error!(tag = %renamed.tag, name = %renamed.name, error = %undo, "Failed to roll back rename");
                }
                return Err(e);
            }
            renamed
        }
        EditTarget::Tag => {
            let moved = state
                .db
                .rename_tag(&req.tag_name, &req.new_value, &req.name)?;
            let old_tag = normalize_tag(&req.tag_name)?;
            if let Err(e) =
                move_photos(&state, &old_tag, &moved.name, &moved.tag, &moved.name).await
            {
                if let Err(undo) = state.db.rename_tag(&moved.tag, &old_tag, &moved.name) {
                    tracing::error!(tag = %moved.tag, name = %moved.name, error = %undo, "Failed to roll back tag move");
                }
                return Err(e);
            }
            moved
        }
    };

    tracing::info!(tag = %comic.tag, name = %comic.name, param = %req.param, "Edited comic");
    Ok(Envelope::ok(comic_to_response(&comic)))
}

/// Page count of the whole catalog.
pub async fn count_comics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<PageCountResponse>>, ApiError> {
    let total = state.db.count()?;
    Ok(Envelope::ok(PageCountResponse {
        pages: page_count(total),
    }))
}

pub async fn count_by_tag(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<TagCountRequest>,
) -> Result<Json<Envelope<PageCountResponse>>, ApiError> {
    require("tagName", &req.tag_name)?;
    let total = state.db.count_by_tag(&req.tag_name)?;
    Ok(Envelope::ok(PageCountResponse {
        pages: page_count(total),
    }))
}

pub async fn count_by_search(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SearchCountRequest>,
) -> Result<Json<Envelope<PageCountResponse>>, ApiError> {
    require("name", &req.name)?;
    let total = state.db.count_by_search(&req.name)?;
    Ok(Envelope::ok(PageCountResponse {
        pages: page_count(total),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Move a comic's photo folder if it has one.
async fn move_photos(
    state: &AppState,
    old_tag: &str,
    old_name: &str,
    new_tag: &str,
    new_name: &str,
) -> Result<(), ApiError> {
    if !state.photos.folder_exists(old_tag, old_name).await? {
        tracing::warn!(tag = %old_tag, name = %old_name, "Comic has no photo folder to move");
        return Ok(());
    }
    state
        .photos
        .move_folder(old_tag, old_name, new_tag, new_name)
        .await?;
    Ok(())
}

fn comic_to_response(comic: &ComicRecord) -> ComicResponse {
    ComicResponse {
        tag: comic.tag.clone(),
        name: comic.name.clone(),
        description: comic.description.clone(),
        upload_date: comic.upload_date.format("%Y-%m-%d").to_string(),
        views: comic.views,
    }
}

fn list_response(comics: Vec<ComicRecord>) -> ComicListResponse {
    ComicListResponse {
        comics: comics
            .into_iter()
            .map(|comic| ComicSummary {
                comix_date: comic.upload_date.format("%Y-%m-%d").to_string(),
                comix_name: comic.name,
                comix_tag: comic.tag,
                description: comic.description,
                views: comic.views,
            })
            .collect(),
    }
}
