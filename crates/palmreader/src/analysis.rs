//! End-to-end palm analysis.
//!
//! [`Analyzer`] ties the pieces together: photo intake, detection with demo
//! fallback, normalisation, fingertip placement, the reading, and the overlay
//! plan. It holds no per-request state and is shared across requests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::detection::{self, DemoDetector, LineDetector, PredictionSource, RoboflowDetector};
use crate::error::Result;
use crate::fingertips::place_fingertips_scaled;
use crate::normalize::normalize_lines;
use crate::overlay::OverlayPlan;
use crate::palm::{Fingertip, ImageSize, PalmLine};
use crate::photo::PalmImage;
use crate::reading::{compose, Reading};

/// Message returned when nothing could be detected.
pub const NO_LINES_MESSAGE: &str = "No palm lines detected. Please ensure your palm is clearly visible with good lighting and try again.";

/// Frame summary sent alongside the reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Number of lines returned.
    pub lines_detected: usize,
    /// Number of fingertips returned.
    pub fingertips_detected: usize,
}

/// A successful analysis, shaped for the web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Always `true`.
    pub success: bool,
    /// Normalised lines.
    pub lines: Vec<PalmLine>,
    /// Placed fingertips.
    pub fingertips: Vec<Fingertip>,
    /// The reading.
    pub analysis: Reading,
    /// Same as `analysis`, for older clients.
    pub insights: Reading,
    /// Frame summary.
    pub image_info: ImageInfo,
    /// Reveal plan for the overlay animation.
    pub overlay: OverlayPlan,
    /// Where the predictions came from.
    pub source: PredictionSource,
    /// When the analysis ran.
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Frame the coordinates refer to.
    #[must_use]
    pub fn frame(&self) -> ImageSize {
        ImageSize::new(self.image_info.width, self.image_info.height)
    }
}

/// Result of analysing one photo.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A full reading.
    Complete(Box<AnalysisReport>),
    /// Nothing was detected and no fallback applied.
    NoLines,
}

/// Shared analysis pipeline.
#[derive(Debug, Clone)]
pub struct Analyzer {
    detector: Arc<dyn LineDetector>,
    demo_fallback: bool,
    reveal_interval: Duration,
    max_image_bytes: usize,
}

impl Analyzer {
    /// Create an analyzer around an explicit detector.
    #[must_use]
    pub fn new(
        detector: Arc<dyn LineDetector>,
        demo_fallback: bool,
        reveal_interval: Duration,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            detector,
            demo_fallback,
            reveal_interval,
            max_image_bytes,
        }
    }

    /// Build an analyzer from configuration.
    ///
    /// The hosted detector is used when it is enabled and has an API key;
    /// otherwise every reading uses demo data.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector's HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let detector: Arc<dyn LineDetector> = if config.detection.is_usable() {
            Arc::new(RoboflowDetector::new(&config.detection)?)
        } else {
            if config.detection.enabled {
                warn!("detection.api_key is empty, serving demo readings only");
            }
            Arc::new(DemoDetector)
        };

        info!(detector = detector.name(), "Analyzer ready");

        Ok(Self::new(
            detector,
            config.detection.demo_fallback,
            config.reveal_interval(),
            config.server.body_limit_bytes,
        ))
    }

    /// Name of the active detector.
    #[must_use]
    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Analyse one photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the photo is too large, or if detection fails
    /// while the demo fallback is off.
    #[instrument(skip_all, fields(detector = self.detector.name()))]
    pub async fn analyze(&self, image: &PalmImage) -> Result<Outcome> {
        image.ensure_within(self.max_image_bytes)?;

        let resolved =
            detection::resolve(self.detector.as_ref(), image, self.demo_fallback).await?;
        if resolved.predictions.is_empty() {
            info!("No palm lines detected");
            return Ok(Outcome::NoLines);
        }

        let frame = resolved.frame;
        let lines = normalize_lines(&resolved.predictions, frame);
        let fingertips =
            place_fingertips_scaled(&resolved.predictions, frame, resolved.offset_scale());
        let reading = compose(&lines, &fingertips);
        let overlay = OverlayPlan::build(&lines, &fingertips, self.reveal_interval);

        info!(
            lines = lines.len(),
            fingertips = fingertips.len(),
            source = %resolved.source,
            "Analysis complete"
        );

        Ok(Outcome::Complete(Box::new(AnalysisReport {
            success: true,
            image_info: ImageInfo {
                width: frame.width,
                height: frame.height,
                lines_detected: lines.len(),
                fingertips_detected: fingertips.len(),
            },
            lines,
            fingertips,
            insights: reading.clone(),
            analysis: reading,
            overlay,
            source: resolved.source,
            analyzed_at: Utc::now(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::testing::{FailingDetector, FixedDetector};
    use crate::detection::{Detection, Prediction};
    use crate::error::Error;
    use crate::palm::LineClass;

    fn image() -> PalmImage {
        PalmImage::from_data_url("data:image/jpeg;base64,QUJD").unwrap()
    }

    fn analyzer(detector: Arc<dyn LineDetector>, demo_fallback: bool) -> Analyzer {
        Analyzer::new(detector, demo_fallback, Duration::from_millis(800), 1024)
    }

    fn complete(outcome: Outcome) -> AnalysisReport {
        match outcome {
            Outcome::Complete(report) => *report,
            Outcome::NoLines => panic!("expected a complete report"),
        }
    }

    #[tokio::test]
    async fn test_demo_analysis() {
        let report = complete(
            analyzer(Arc::new(DemoDetector), true)
                .analyze(&image())
                .await
                .unwrap(),
        );

        assert!(report.success);
        assert_eq!(report.source, PredictionSource::Demo);
        assert_eq!(report.frame(), ImageSize::DEMO);
        assert_eq!(report.image_info.lines_detected, 5);
        assert_eq!(report.image_info.fingertips_detected, 5);
        assert_eq!(report.analysis, report.insights);
        assert_eq!(report.overlay.elements.len(), 10);
    }

    #[tokio::test]
    async fn test_detector_analysis_uses_reported_frame() {
        let detector = FixedDetector {
            detection: Detection {
                predictions: vec![
                    Prediction::new(LineClass::Heart, 100.0, 60.0, 80.0, 6.0, 0.8),
                    Prediction::new(LineClass::Head, 100.0, 90.0, 70.0, 6.0, 0.75),
                ],
                image: Some(ImageSize::new(200, 150)),
            },
        };
        let report = complete(
            analyzer(Arc::new(detector), true)
                .analyze(&image())
                .await
                .unwrap(),
        );

        assert_eq!(report.source, PredictionSource::Detector);
        assert_eq!(report.frame(), ImageSize::new(200, 150));
        assert_eq!(report.analysis.strengths.len(), 2);
        assert_eq!(report.analysis.challenges.len(), 3);
        for tip in &report.fingertips {
            assert!((30..=170).contains(&tip.x));
            assert!((30..=120).contains(&tip.y));
        }
    }

    #[tokio::test]
    async fn test_no_lines_without_fallback() {
        let outcome = analyzer(Arc::new(FixedDetector::default()), false)
            .analyze(&image())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::NoLines);
    }

    #[tokio::test]
    async fn test_failure_without_fallback_is_error() {
        let result = analyzer(Arc::new(FailingDetector), false)
            .analyze(&image())
            .await;
        assert!(result.unwrap_err().is_detector_error());
    }

    #[tokio::test]
    async fn test_failure_with_fallback_is_demo() {
        let report = complete(
            analyzer(Arc::new(FailingDetector), true)
                .analyze(&image())
                .await
                .unwrap(),
        );
        assert_eq!(report.source, PredictionSource::Demo);
    }

    #[tokio::test]
    async fn test_demo_fingertips_scale_with_photo() {
        let photo =
            PalmImage::from_data_url(&crate::photo::tests::png_data_url(800, 1200)).unwrap();
        let analyzer = Analyzer::new(
            Arc::new(FailingDetector),
            true,
            Duration::from_millis(800),
            1 << 20,
        );
        let report = complete(analyzer.analyze(&photo).await.unwrap());

        assert_eq!(report.frame(), ImageSize::new(800, 1200));
        let thumb = &report.fingertips[0];
        assert_eq!((thumb.x, thumb.y), (236, 520));
        let middle = &report.fingertips[2];
        assert_eq!((middle.x, middle.y), (416, 200));
    }

    #[tokio::test]
    async fn test_oversized_image_rejected() {
        let big = PalmImage::from_data_url(&format!("data:image/png;base64,{}", "A".repeat(4096)))
            .unwrap();
        let result = analyzer(Arc::new(DemoDetector), true).analyze(&big).await;
        assert!(matches!(result, Err(Error::ImageTooLarge { .. })));
    }

    #[test]
    fn test_from_config_without_key_uses_demo() {
        let analyzer = Analyzer::from_config(&Config::default()).unwrap();
        assert_eq!(analyzer.detector_name(), "demo");
    }

    #[test]
    fn test_from_config_with_key_uses_roboflow() {
        let mut config = Config::default();
        config.detection.api_key = "key".to_string();
        let analyzer = Analyzer::from_config(&config).unwrap();
        assert_eq!(analyzer.detector_name(), "roboflow");
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let report = complete(
            analyzer(Arc::new(DemoDetector), true)
                .analyze(&image())
                .await
                .unwrap(),
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["source"], "demo");
        assert_eq!(json["imageInfo"]["linesDetected"], 5);
        assert_eq!(json["lines"][0]["class"], "heart_line");
        assert_eq!(json["lines"][0]["x1"], 110);
        assert_eq!(json["fingertips"][0]["name"], "thumb");
        assert!(json["insights"]["starseed"].is_string());
        assert!(json["analyzedAt"].is_string());
    }
}
