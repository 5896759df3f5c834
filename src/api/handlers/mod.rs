mod admin;
mod comics;
mod photos;
mod tags;

use crate::api::response::ApiError;
use crate::AppState;

pub use admin::health;
pub use comics::{
    count_by_search, count_by_tag, count_comics, create_comic, delete_comic, edit_comic,
    find_comics, get_comic, list_main_page, list_tag_comics,
};
pub use photos::{comic_photos, serve_photo, upload_photos};
pub use tags::{create_tag, get_tag_description, list_tags};

/// Reject the request unless `password` matches the shared secret.
fn check_password(state: &AppState, password: &str) -> Result<(), ApiError> {
    if state.secret.verify(password) {
        Ok(())
    } else {
        tracing::info!("Rejected write request with incorrect password");
        Err(ApiError::unauthorized("incorrect password"))
    }
}

/// Required request fields must be present and non-blank.
fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

/// Page numbers are 1-based.
fn require_page(page: u32) -> Result<u32, ApiError> {
    if page == 0 {
        return Err(ApiError::bad_request("pageNumber must be at least 1"));
    }
    Ok(page)
}
