use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{error::ErrorBody, AppState};
use crate::analysis::{Outcome, NO_LINES_MESSAGE};
use crate::error::Error;
use crate::photo::PalmImage;

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Photo as a `data:` URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Hand landmarks from the browser hand tracker. Accepted and ignored.
    #[serde(default)]
    pub landmarks: Option<serde_json::Value>,
}

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        // no JSON body means no image was sent
        Err(JsonRejection::MissingJsonContentType(rejection)) => {
            debug!(error = %rejection.body_text(), "Analyze request without JSON body");
            return Error::MissingImage.into_response();
        }
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejected analyze request");
            return (rejection.status(), Json(ErrorBody::message(rejection.body_text())))
                .into_response();
        }
    };

    if request.landmarks.is_some() {
        debug!("Ignoring client-side landmarks");
    }

    let image = match PalmImage::from_data_url(request.image.as_deref().unwrap_or_default()) {
        Ok(image) => image,
        Err(e) => return e.into_response(),
    };

    match state.analyzer.analyze(&image).await {
        Ok(Outcome::Complete(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Outcome::NoLines) => {
            (StatusCode::OK, Json(ErrorBody::message(NO_LINES_MESSAGE))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
