use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
        ]);

    Router::new()
        // Tags
        .route("/newtag", post(handlers::create_tag))
        .route("/gettagdescription", post(handlers::get_tag_description))
        .route("/alltags", post(handlers::list_tags))
        // Comics
        .route("/newcomix", post(handlers::create_comic))
        .route("/getcomix", post(handlers::get_comic))
        .route("/editcomix", post(handlers::edit_comic))
        .route("/deletecomix", post(handlers::delete_comic))
        .route("/getmainpagecomix", post(handlers::list_main_page))
        .route("/getalltagcomix", post(handlers::list_tag_comics))
        .route("/findcomix", post(handlers::find_comics))
        .route("/getquantitycomix", post(handlers::count_comics))
        .route("/getquantitytag", post(handlers::count_by_tag))
        .route("/getquantityname", post(handlers::count_by_search))
        // Photos
        .route(
            "/insertphoto",
            post(handlers::upload_photos).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/photos/:tag/:name/:file", get(handlers::serve_photo))
        .route("/comix/:tag/:name", get(handlers::comic_photos))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
