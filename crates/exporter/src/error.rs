//! Unified error handling for the exporter routes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use zedonk_core::ExportError;

use crate::shopify::ShopifyError;

/// Application-level error type for the export API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// CSV serialization failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Requested order(s) do not exist.
    #[error("Not found: {message}")]
    NotFound {
        message: &'static str,
        details: Option<Value>,
    },

    /// Bad request from client.
    #[error("Bad request: {message}")]
    BadRequest {
        message: &'static str,
        details: Option<Value>,
    },
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AppError {
    /// `400` with a fixed message and optional details.
    pub fn bad_request(message: &'static str, details: impl Into<Option<Value>>) -> Self {
        Self::BadRequest {
            message,
            details: details.into(),
        }
    }

    /// `404` with a fixed message and optional details.
    pub fn not_found(message: &'static str, details: impl Into<Option<Value>>) -> Self {
        Self::NotFound {
            message,
            details: details.into(),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            Self::NotFound { message, details } | Self::BadRequest { message, details } => {
                ErrorBody {
                    error: message.to_string(),
                    details,
                }
            }
            other => ErrorBody {
                error: "Internal server error".to_string(),
                details: Some(Value::String(other.to_string())),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Export request error"
            );
        } else {
            tracing::debug!(error = %self, "Export request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
