//! Client for the hosted Roboflow palm line segmentation model.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;
use tracing::debug;

use super::{Detection, LineDetector, Prediction};
use crate::config::DetectionConfig;
use crate::error::{Error, Result};
use crate::palm::ImageSize;
use crate::photo::PalmImage;

#[derive(Debug, Deserialize)]
struct RoboflowResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    image: Option<RoboflowImage>,
}

#[derive(Debug, Deserialize)]
struct RoboflowImage {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

impl RoboflowImage {
    /// Missing or zero dimensions fall back to the detector default
    /// independently per axis.
    fn size(&self) -> ImageSize {
        let default = ImageSize::DETECTOR_DEFAULT;
        ImageSize::new(
            self.width.filter(|w| *w > 0).unwrap_or(default.width),
            self.height.filter(|h| *h > 0).unwrap_or(default.height),
        )
    }
}

/// Detector backed by the Roboflow hosted inference API.
///
/// The base64 photo is posted as a form-encoded body to
/// `<endpoint>?api_key=<key>`.
#[derive(Debug, Clone)]
pub struct RoboflowDetector {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RoboflowDetector {
    /// Build a detector from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl LineDetector for RoboflowDetector {
    fn name(&self) -> &'static str {
        "roboflow"
    }

    async fn detect(&self, image: &PalmImage) -> Result<Detection> {
        debug!(endpoint = %self.endpoint, bytes = image.payload().len(), "Requesting predictions");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(image.payload().to_owned())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                body
            };
            return Err(Error::detector_status(status.as_u16(), message));
        }

        let body: RoboflowResponse = response.json().await?;
        Ok(Detection {
            predictions: body.predictions,
            image: body.image.as_ref().map(RoboflowImage::size),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;
    use crate::palm::LineClass;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/palm-line-segmentation/1")
    }

    fn config(endpoint: String) -> DetectionConfig {
        DetectionConfig {
            endpoint,
            api_key: "test-key".to_string(),
            timeout_ms: 2_000,
            ..DetectionConfig::default()
        }
    }

    fn image() -> PalmImage {
        PalmImage::from_data_url("data:image/jpeg;base64,QUJD").unwrap()
    }

    #[tokio::test]
    async fn test_detect_parses_predictions() {
        let router = Router::new().route(
            "/palm-line-segmentation/1",
            post(
                |Query(params): Query<HashMap<String, String>>,
                 headers: HeaderMap,
                 body: String| async move {
                    assert_eq!(params.get("api_key").map(String::as_str), Some("test-key"));
                    assert_eq!(
                        headers.get("content-type").unwrap(),
                        "application/x-www-form-urlencoded"
                    );
                    assert_eq!(body, "QUJD");
                    Json(json!({
                        "predictions": [
                            {"class": "heart_line", "x": 120.0, "y": 80.0,
                             "width": 90.0, "height": 6.0, "confidence": 0.812},
                            {"class": "life_line", "x": 60.0, "y": 150.0}
                        ],
                        "image": {"width": 320, "height": 240}
                    }))
                },
            ),
        );
        let detector = RoboflowDetector::new(&config(spawn(router).await)).unwrap();

        let detection = detector.detect(&image()).await.unwrap();
        assert_eq!(detection.image, Some(ImageSize::new(320, 240)));
        assert_eq!(detection.predictions.len(), 2);
        assert_eq!(detection.predictions[0].class, LineClass::Heart);
        assert_eq!(detection.predictions[1].width, None);
    }

    #[tokio::test]
    async fn test_detect_missing_fields_default() {
        let router = Router::new().route(
            "/palm-line-segmentation/1",
            post(|| async { Json(json!({"image": {"width": 0}})) }),
        );
        let detector = RoboflowDetector::new(&config(spawn(router).await)).unwrap();

        let detection = detector.detect(&image()).await.unwrap();
        assert!(detection.predictions.is_empty());
        assert_eq!(detection.image, Some(ImageSize::DETECTOR_DEFAULT));
    }

    #[tokio::test]
    async fn test_detect_error_status() {
        let router = Router::new().route(
            "/palm-line-segmentation/1",
            post(|| async { (StatusCode::FORBIDDEN, "bad api key") }),
        );
        let detector = RoboflowDetector::new(&config(spawn(router).await)).unwrap();

        let err = detector.detect(&image()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::DetectorStatus { status: 403, ref message } if message == "bad api key"
        ));
    }

    #[tokio::test]
    async fn test_detect_invalid_json_is_error() {
        let router = Router::new().route(
            "/palm-line-segmentation/1",
            post(|| async { "<html>oops</html>" }),
        );
        let detector = RoboflowDetector::new(&config(spawn(router).await)).unwrap();

        let err = detector.detect(&image()).await.unwrap_err();
        assert!(err.is_detector_error());
    }

    #[tokio::test]
    async fn test_detect_times_out() {
        let router = Router::new().route(
            "/palm-line-segmentation/1",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(Value::Null)
            }),
        );
        let mut cfg = config(spawn(router).await);
        cfg.timeout_ms = 50;
        let detector = RoboflowDetector::new(&cfg).unwrap();

        let err = detector.detect(&image()).await.unwrap_err();
        assert!(matches!(err, Error::DetectorRequest(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_detect_unreachable_is_error() {
        let detector =
            RoboflowDetector::new(&config("http://127.0.0.1:1/nothing".to_string())).unwrap();
        let err = detector.detect(&image()).await.unwrap_err();
        assert!(matches!(err, Error::DetectorRequest(_)));
    }
}
