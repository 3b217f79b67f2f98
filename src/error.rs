//! Error types for URL generation, persistence and configuration
//!
//! `UtmError` is the error surfaced to callers of the core and of the HTTP
//! handlers. Store failures are wrapped in `GatewayError` so that the
//! already generated URL can still be returned alongside them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors produced while validating, building or saving a tagged URL
#[derive(Debug, thiserror::Error)]
pub enum UtmError {
    /// The base URL does not parse even after `https://` was prepended
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A mandatory field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// An identical record already exists; nothing was saved
    #[error("Duplicate record, not saved")]
    DuplicateRecord,

    /// The record or feedback store failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Failures of the record and feedback stores
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// redb splits its errors per operation; all of them fold into `redb::Error`.
macro_rules! impl_from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for GatewayError {
                fn from(err: $ty) -> Self {
                    GatewayError::Database(err.into())
                }
            }
        )*
    };
}

impl_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Errors raised while loading start-up configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to read taxonomy file {path}: {source}")]
    TaxonomyRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse taxonomy file {path}: {source}")]
    TaxonomyParse {
        path: String,
        source: serde_json::Error,
    },
}

impl UtmError {
    /// Machine-readable code used in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            UtmError::InvalidUrl(_) => "invalid_url",
            UtmError::MissingField(_) => "missing_field",
            UtmError::DuplicateRecord => "duplicate",
            UtmError::Gateway(_) => "gateway_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UtmError::InvalidUrl(_) | UtmError::MissingField(_) => StatusCode::BAD_REQUEST,
            UtmError::DuplicateRecord => StatusCode::OK,
            UtmError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UtmError {
    fn into_response(self) -> Response {
        if let UtmError::Gateway(err) = &self {
            tracing::error!(error = %err, "Record store call failed");
        }

        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let UtmError::MissingField(field) = &self {
            body["field"] = json!(field);
        }

        (self.status(), Json(body)).into_response()
    }
}
