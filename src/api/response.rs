use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::photo_store::PhotoStoreError;
use crate::storage::models::InvalidName;
use crate::storage::DatabaseError;

// ============================================================================
// Success envelope
// ============================================================================

/// Success body: the HTTP status is repeated in an embedded `status` field
/// next to the payload's own fields, e.g. `{"status": 200, "tagList": [...]}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: u16,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Envelope<T>> {
        Json(Envelope {
            status: StatusCode::OK.as_u16(),
            data,
        })
    }
}

/// Payload for endpoints that only report success.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

// ============================================================================
// Error envelope
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
}

/// Handler error: `Fail` for client errors (4xx), `Error` for server errors (5xx).
#[derive(Debug)]
pub enum ApiError {
    Fail(StatusCode, String),
    Error(StatusCode, String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (code, message) = match self {
            ApiError::Fail(code, msg) => (code, msg),
            ApiError::Error(code, msg) => {
                tracing::error!(status = code.as_u16(), error = %msg, "Request failed");
                (code, msg)
            }
        };
        (
            code,
            Json(ErrorBody {
                status: code.as_u16(),
                error: message,
            }),
        )
            .into_response()
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::UNAUTHORIZED, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::NOT_FOUND, message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::PAYLOAD_TOO_LARGE, message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::CONFLICT, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Error(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::TagNotFound(_) | DatabaseError::ComicNotFound { .. } => {
                ApiError::not_found(e.to_string())
            }
            DatabaseError::TagExists(_) | DatabaseError::ComicExists { .. } => {
                ApiError::conflict(e.to_string())
            }
            DatabaseError::InvalidName(_) => ApiError::bad_request(e.to_string()),
            _ => ApiError::internal(e.to_string()),
        }
    }
}

impl From<InvalidName> for ApiError {
    fn from(e: InvalidName) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<PhotoStoreError> for ApiError {
    fn from(e: PhotoStoreError) -> Self {
        match e {
            PhotoStoreError::NotFound(_) => ApiError::not_found(e.to_string()),
            PhotoStoreError::AlreadyExists(_) => ApiError::conflict(e.to_string()),
            PhotoStoreError::InvalidPath(_) => ApiError::bad_request(e.to_string()),
            PhotoStoreError::FolderMissing(_) | PhotoStoreError::TagFolderMissing(_) => {
                ApiError::internal(format!("{e}, check that the tag and comic were created"))
            }
            PhotoStoreError::Io(_) => ApiError::internal(e.to_string()),
        }
    }
}

// ============================================================================
// Custom extractors (reject with the error envelope)
// ============================================================================

/// Drop-in replacement for `axum::Json` that rejects with `ApiError`.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                let message = match rejection {
                    JsonRejection::JsonDataError(err) => {
                        format!("Invalid request body: {}", err.body_text())
                    }
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body".into(),
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing Content-Type: application/json header".into()
                    }
                    _ => "Failed to read request body".into(),
                };
                Err(ApiError::bad_request(message))
            }
        }
    }
}
