//! Palm line detection.
//!
//! Detection is delegated to a hosted model. This module defines the
//! [`LineDetector`] seam, the demo predictions used when the hosted model is
//! unavailable or finds nothing, and the policy that decides between them.

mod roboflow;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::palm::{ImageSize, LineClass};
use crate::photo::PalmImage;

pub use roboflow::RoboflowDetector;

/// A single detector prediction in pixel space.
///
/// `(x, y)` is the centre of the bounding box. Width, height and confidence
/// are optional because the hosted model omits them for some classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Detected line class.
    pub class: LineClass,
    /// Box centre, x.
    pub x: f64,
    /// Box centre, y.
    pub y: f64,
    /// Box width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Box height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Model confidence in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Prediction {
    /// Create a fully specified prediction.
    #[must_use]
    pub fn new(class: LineClass, x: f64, y: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            class,
            x,
            y,
            width: Some(width),
            height: Some(height),
            confidence: Some(confidence),
        }
    }

    fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            class: self.class.clone(),
            x: self.x * sx,
            y: self.y * sy,
            width: self.width.map(|w| w * sx),
            height: self.height.map(|h| h * sy),
            confidence: self.confidence,
        }
    }
}

/// What a detector returned for one image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    /// Predictions, in detector order.
    pub predictions: Vec<Prediction>,
    /// Frame the predictions refer to, when the detector reports it.
    pub image: Option<ImageSize>,
}

/// Where the predictions used for a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// The hosted detector.
    Detector,
    /// Built-in demo predictions.
    Demo,
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detector => write!(f, "detector"),
            Self::Demo => write!(f, "demo"),
        }
    }
}

/// Trait for palm line detectors.
#[async_trait]
pub trait LineDetector: Send + Sync + fmt::Debug {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Where predictions from this detector should be attributed.
    fn source(&self) -> PredictionSource {
        PredictionSource::Detector
    }

    /// Run detection on a photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector cannot be reached or answers with
    /// something other than a prediction list.
    async fn detect(&self, image: &PalmImage) -> Result<Detection>;
}

/// Detector that always answers with the demo predictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoDetector;

#[async_trait]
impl LineDetector for DemoDetector {
    fn name(&self) -> &'static str {
        "demo"
    }

    fn source(&self) -> PredictionSource {
        PredictionSource::Demo
    }

    async fn detect(&self, image: &PalmImage) -> Result<Detection> {
        Ok(demo_detection(image.dimensions()))
    }
}

/// The five demo lines, laid out for a 400×600 portrait photo.
#[must_use]
pub fn demo_predictions() -> Vec<Prediction> {
    vec![
        Prediction::new(LineClass::Heart, 200.0, 180.0, 180.0, 8.0, 0.89),
        Prediction::new(LineClass::Head, 200.0, 220.0, 160.0, 6.0, 0.85),
        Prediction::new(LineClass::Life, 150.0, 280.0, 140.0, 10.0, 0.92),
        Prediction::new(LineClass::Fate, 200.0, 320.0, 120.0, 5.0, 0.78),
        Prediction::new(LineClass::Sun, 240.0, 200.0, 80.0, 4.0, 0.73),
    ]
}

/// Demo predictions fitted to `frame`, or to the 400×600 demo frame when the
/// real photo size is unknown.
#[must_use]
pub fn demo_detection(frame: Option<ImageSize>) -> Detection {
    let Some(frame) = frame else {
        return Detection {
            predictions: demo_predictions(),
            image: Some(ImageSize::DEMO),
        };
    };

    let sx = frame.w() / ImageSize::DEMO.w();
    let sy = frame.h() / ImageSize::DEMO.h();
    Detection {
        predictions: demo_predictions()
            .iter()
            .map(|p| p.scaled(sx, sy))
            .collect(),
        image: Some(frame),
    }
}

/// Predictions chosen for a reading, with the frame they live in.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Predictions to normalise. Empty means nothing was found.
    pub predictions: Vec<Prediction>,
    /// Frame used for clamping.
    pub frame: ImageSize,
    /// Where the predictions came from.
    pub source: PredictionSource,
}

/// Run `detector` and apply the demo fallback policy.
///
/// With `demo_fallback` set, a detector failure or an empty answer is
/// replaced by the demo predictions. Without it, failures propagate and an
/// empty answer is returned as is.
///
/// # Errors
///
/// Returns the detector's error when `demo_fallback` is off.
pub async fn resolve(
    detector: &dyn LineDetector,
    image: &PalmImage,
    demo_fallback: bool,
) -> Result<Resolved> {
    let detection = match detector.detect(image).await {
        Ok(detection) => detection,
        Err(e) if demo_fallback => {
            warn!(detector = detector.name(), error = %e, "Detector failed, using demo data");
            return Ok(demo_resolved(image));
        }
        Err(e) => return Err(e),
    };

    info!(
        detector = detector.name(),
        predictions = detection.predictions.len(),
        "Predictions received"
    );

    if detection.predictions.is_empty() && demo_fallback {
        info!("No predictions, using demo palm data");
        return Ok(demo_resolved(image));
    }

    Ok(Resolved {
        predictions: detection.predictions,
        frame: detection.image.unwrap_or(ImageSize::DETECTOR_DEFAULT),
        source: detector.source(),
    })
}

impl Resolved {
    /// Factors that map demo-frame pixel distances into [`Resolved::frame`].
    ///
    /// Demo predictions are scaled into the photo they stand in for, so
    /// anything placed relative to them must scale the same way. Detector
    /// output is already in its own frame.
    #[must_use]
    pub fn offset_scale(&self) -> (f64, f64) {
        match self.source {
            PredictionSource::Demo => (
                self.frame.w() / ImageSize::DEMO.w(),
                self.frame.h() / ImageSize::DEMO.h(),
            ),
            PredictionSource::Detector => (1.0, 1.0),
        }
    }
}

fn demo_resolved(image: &PalmImage) -> Resolved {
    let detection = demo_detection(image.dimensions());
    Resolved {
        predictions: detection.predictions,
        frame: detection.image.unwrap_or(ImageSize::DEMO),
        source: PredictionSource::Demo,
    }
}
