use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Error;

/// Message shown to the user for any failure that is not their fault.
pub const FAILURE_MESSAGE: &str = "Palm analysis failed. Please try again with a clearer image.";

/// JSON body of every unsuccessful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Technical detail, only for server-side failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Message for the user.
    pub message: String,
}

impl ErrorBody {
    /// A body with only a user message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: None,
            message: message.into(),
        }
    }
}

impl Error {
    fn status(&self) -> StatusCode {
        if self.is_client_error() {
            match self {
                Self::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            }
        } else if self.is_detector_error() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if self.is_client_error() {
            ErrorBody::message(self.to_string())
        } else {
            error!(error = %self, "Analysis error");
            ErrorBody {
                success: false,
                error: Some(self.to_string()),
                message: FAILURE_MESSAGE.to_string(),
            }
        };

        (status, Json(body)).into_response()
    }
}
