//! Unified error handling with the named-key JSON response envelope.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::models::pagination::PageMetadata;
use crate::validation::FieldErrors;

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// JSON envelope keyed by resource name: `{"summoner": {...}}`.
///
/// List responses carry an additional `metadata` key with pagination details.
#[derive(Debug)]
pub struct Envelope<T: Serialize> {
    key: &'static str,
    value: T,
    metadata: Option<PageMetadata>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(key: &'static str, value: T) -> Self {
        Self {
            key,
            value,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: PageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Wrap a successful result in the envelope.
    pub fn success(key: &'static str, value: T) -> Json<Self> {
        Json(Self::new(key, value))
    }

    /// 201 response with a `Location` header pointing at the new resource.
    pub fn created(self, location: String) -> impl IntoResponse {
        (
            StatusCode::CREATED,
            [(header::LOCATION, location)],
            Json(self),
        )
    }
}

impl Envelope<&'static str> {
    pub fn message(message: &'static str) -> Json<Self> {
        Json(Self::new("message", message))
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.metadata.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(self.key, &self.value)?;
        if let Some(metadata) = &self.metadata {
            map.serialize_entry("metadata", metadata)?;
        }
        map.end()
    }
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Edit conflict")]
    EditConflict,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Account not activated")]
    InactiveAccount,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.add(field, message);
        Self::Validation(errors)
    }

    /// Check if this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error represents an auth failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(FieldErrors::from(errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "The request failed validation".to_string(),
                Some(fields),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::EditConflict => (
                StatusCode::CONFLICT,
                "EDIT_CONFLICT",
                "Unable to update the record due to an edit conflict, please try again"
                    .to_string(),
                None,
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
                None,
            ),
            AppError::InactiveAccount => (
                StatusCode::FORBIDDEN,
                "INACTIVE_ACCOUNT",
                "Your user account must be activated to access this resource".to_string(),
                None,
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded".to_string(),
                None,
            ),
            AppError::Timeout(msg) => {
                tracing::error!(error = %msg, "Operation timed out");
                internal()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                internal()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = Envelope::new(
            "error",
            ApiError {
                code: code.to_string(),
                message,
                fields,
            },
        );

        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String, Option<FieldErrors>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}
