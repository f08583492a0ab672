//! Coordinate normalisation of detector predictions.
//!
//! Predictions arrive as centre/extent boxes in floating point pixels and may
//! spill outside the frame. They leave as integer corner coordinates clamped
//! to the frame.

use crate::detection::Prediction;
use crate::palm::{ImageSize, PalmLine};

/// Width assumed when a prediction has none, or reports zero.
pub const DEFAULT_WIDTH: f64 = 100.0;

/// Height assumed when a prediction has none, or reports zero.
pub const DEFAULT_HEIGHT: f64 = 20.0;

/// Confidence assumed when a prediction has none, or reports zero.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Round to the nearest pixel, halves away from zero.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn round_px(value: f64) -> i64 {
    value.round() as i64
}

/// Round a confidence to two decimal places.
#[must_use]
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}

/// A reported value, unless it is missing, zero or NaN.
fn nonzero_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.abs() > 0.0).unwrap_or(default)
}

/// Clamp `value` into `[lo, hi]`. When the range is inverted, `lo` wins.
pub(crate) fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

/// Convert one prediction into a line segment inside `frame`.
#[must_use]
pub fn normalize_line(prediction: &Prediction, frame: ImageSize) -> PalmLine {
    let (w, h) = (frame.w(), frame.h());

    let cx = clamp(prediction.x, 0.0, w);
    let cy = clamp(prediction.y, 0.0, h);
    // negative extents still describe a box around the centre
    let half_w = nonzero_or(prediction.width, DEFAULT_WIDTH).abs() / 2.0;
    let half_h = nonzero_or(prediction.height, DEFAULT_HEIGHT).abs() / 2.0;

    PalmLine {
        class: prediction.class.clone(),
        x1: round_px(clamp(cx - half_w, 0.0, w)),
        y1: round_px(clamp(cy - half_h, 0.0, h)),
        x2: round_px(clamp(cx + half_w, 0.0, w)),
        y2: round_px(clamp(cy + half_h, 0.0, h)),
        confidence: round_confidence(nonzero_or(prediction.confidence, DEFAULT_CONFIDENCE)),
        description: prediction.class.description().to_string(),
    }
}

/// Normalise every prediction, preserving order.
#[must_use]
pub fn normalize_lines(predictions: &[Prediction], frame: ImageSize) -> Vec<PalmLine> {
    predictions
        .iter()
        .map(|p| normalize_line(p, frame))
        .collect()
}
