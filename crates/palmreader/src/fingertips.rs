//! Fingertip placement.
//!
//! The hosted model only finds palm lines. Fingertips are placed at fixed
//! offsets from the mean of the line centres, which matches an upright hand
//! filling most of a portrait photo.

use crate::detection::Prediction;
use crate::normalize::{clamp, round_px};
use crate::palm::{Finger, Fingertip, ImageSize};

/// Minimum distance between a fingertip marker and the frame edge.
pub const EDGE_MARGIN: f64 = 30.0;

/// Mean of the prediction centres, or `None` when there are none.
#[must_use]
pub fn palm_center(predictions: &[Prediction]) -> Option<(f64, f64)> {
    if predictions.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = predictions.len() as f64;
    let (sx, sy) = predictions
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some((sx / n, sy / n))
}

/// Place one marker per finger around the palm centre, thumb first.
///
/// Markers are kept [`EDGE_MARGIN`] pixels inside `frame`. Returns nothing
/// when there are no predictions to anchor on.
#[must_use]
pub fn place_fingertips(predictions: &[Prediction], frame: ImageSize) -> Vec<Fingertip> {
    place_fingertips_scaled(predictions, frame, (1.0, 1.0))
}

/// Like [`place_fingertips`], with each finger offset multiplied by `scale`.
#[must_use]
pub fn place_fingertips_scaled(
    predictions: &[Prediction],
    frame: ImageSize,
    scale: (f64, f64),
) -> Vec<Fingertip> {
    let Some((cx, cy)) = palm_center(predictions) else {
        return Vec::new();
    };

    let max_x = frame.w() - EDGE_MARGIN;
    let max_y = frame.h() - EDGE_MARGIN;

    Finger::ALL
        .iter()
        .map(|&finger| {
            let (dx, dy) = finger.offset();
            let (dx, dy) = (dx * scale.0, dy * scale.1);
            Fingertip {
                name: finger,
                x: round_px(clamp(cx + dx, EDGE_MARGIN, max_x)),
                y: round_px(clamp(cy + dy, EDGE_MARGIN, max_y)),
                confidence: finger.confidence(),
                description: finger.description().to_string(),
            }
        })
        .collect()
}
