//! Error types for the transform endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::transform::TransformResponse;

/// Failures that end a transform request before an envelope is assembled.
///
/// Engine failures and empty records are not here: they are reported
/// inside a normal [`TransformResponse`].
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Request body must be JSON")]
    InvalidBody,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Internal(String),
}

impl TransformError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TransformError::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TransformError::InvalidBody | TransformError::MissingFields(_) => {
                StatusCode::BAD_REQUEST
            }
            TransformError::InputNotFound(_) => StatusCode::NOT_FOUND,
            TransformError::Io { .. } | TransformError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this is a caller mistake rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Message placed in the response `errors` list.
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            format!("Unexpected server error: {}", self)
        }
    }
}

impl IntoResponse for TransformError {
    fn into_response(self) -> Response {
        let body = TransformResponse::rejected(self.client_message());
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_all() {
        let err = TransformError::MissingFields(vec!["input_file", "output_dir"]);
        assert_eq!(err.to_string(), "Missing required fields: input_file, output_dir");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TransformError::InvalidBody.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            TransformError::InputNotFound("/data/in.csv".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TransformError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_message_for_server_faults() {
        let err = TransformError::io(
            "Failed to read input file /data/in.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(
            err.client_message(),
            "Unexpected server error: Failed to read input file /data/in.csv: permission denied"
        );
    }

    #[test]
    fn test_client_message_for_caller_mistakes() {
        let err = TransformError::InputNotFound("/data/in.csv".into());
        assert_eq!(err.client_message(), "Input file not found: /data/in.csv");
    }
}
