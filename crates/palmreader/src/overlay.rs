//! Overlay reveal plan.
//!
//! Lines are revealed one at a time, then the fingertip markers, each a fixed
//! interval after the previous element. The plan is returned to the web
//! client, which only has to schedule the draws, and can also be rendered as
//! a self-contained animated SVG.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::palm::{Finger, Fingertip, ImageSize, LineClass, PalmLine};

/// Stroke width of a line segment.
pub const LINE_STROKE_WIDTH: u32 = 4;

/// Radius of a fingertip marker.
pub const MARKER_RADIUS: u32 = 8;

/// Stroke width of a fingertip marker outline.
pub const MARKER_STROKE_WIDTH: u32 = 2;

/// Font size of line labels.
pub const LINE_LABEL_SIZE: u32 = 14;

/// Font size of fingertip labels.
pub const MARKER_LABEL_SIZE: u32 = 12;

/// Canvas background behind the photo.
pub const BACKDROP: &str = "#f8f8f8";

/// A text label. `(x, y)` is the top-left corner of the text box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Text to draw.
    pub text: String,
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Font size in pixels.
    pub font_size: u32,
}

/// One drawable element of the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayElement {
    /// A detected palm line.
    #[serde(rename_all = "camelCase")]
    Line {
        /// Line class.
        class: LineClass,
        /// Stroke colour.
        color: String,
        /// Start x.
        x1: i64,
        /// Start y.
        y1: i64,
        /// End x.
        x2: i64,
        /// End y.
        y2: i64,
        /// Stroke width.
        stroke_width: u32,
        /// Class label.
        label: Label,
        /// Milliseconds after the photo is shown.
        reveal_at_ms: u64,
    },
    /// A fingertip marker.
    #[serde(rename_all = "camelCase")]
    Marker {
        /// Finger.
        finger: Finger,
        /// Fill colour.
        color: String,
        /// Centre x.
        cx: i64,
        /// Centre y.
        cy: i64,
        /// Circle radius.
        radius: u32,
        /// Outline width.
        stroke_width: u32,
        /// Finger label.
        label: Label,
        /// Milliseconds after the photo is shown.
        reveal_at_ms: u64,
    },
}

impl OverlayElement {
    /// When this element appears.
    #[must_use]
    pub fn reveal_at_ms(&self) -> u64 {
        match self {
            Self::Line { reveal_at_ms, .. } | Self::Marker { reveal_at_ms, .. } => *reveal_at_ms,
        }
    }
}

/// Ordered reveal schedule for a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPlan {
    /// Delay between consecutive elements.
    pub interval_ms: u64,
    /// When the last element appears; zero for an empty plan.
    pub total_duration_ms: u64,
    /// Elements in reveal order.
    pub elements: Vec<OverlayElement>,
}

fn millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

impl OverlayPlan {
    /// Build the plan: line `i` at `i * interval`, fingertip `j` at
    /// `(lines + j) * interval`.
    #[must_use]
    pub fn build(lines: &[PalmLine], fingertips: &[Fingertip], interval: Duration) -> Self {
        let interval_ms = millis(interval);
        let mut elements = Vec::with_capacity(lines.len() + fingertips.len());
        let mut step: u64 = 0;

        for line in lines {
            elements.push(OverlayElement::Line {
                class: line.class.clone(),
                color: line.class.color().to_string(),
                x1: line.x1,
                y1: line.y1,
                x2: line.x2,
                y2: line.y2,
                stroke_width: LINE_STROKE_WIDTH,
                label: Label {
                    text: line.class.label(),
                    x: line.x1,
                    y: line.y1 - 20,
                    font_size: LINE_LABEL_SIZE,
                },
                reveal_at_ms: step.saturating_mul(interval_ms),
            });
            step += 1;
        }

        for tip in fingertips {
            elements.push(OverlayElement::Marker {
                finger: tip.name,
                color: tip.name.color().to_string(),
                cx: tip.x,
                cy: tip.y,
                radius: MARKER_RADIUS,
                stroke_width: MARKER_STROKE_WIDTH,
                label: Label {
                    text: tip.name.as_str().to_string(),
                    x: tip.x - 15,
                    y: tip.y + 15,
                    font_size: MARKER_LABEL_SIZE,
                },
                reveal_at_ms: step.saturating_mul(interval_ms),
            });
            step += 1;
        }

        let total_duration_ms = elements.last().map_or(0, OverlayElement::reveal_at_ms);

        Self {
            interval_ms,
            total_duration_ms,
            elements,
        }
    }

    /// Render as an animated SVG document.
    ///
    /// Each element starts hidden and is switched visible at its reveal time
    /// with an SMIL `<set>`. `background` is an optional image href, usually
    /// the photo's data URL.
    #[must_use]
    pub fn to_svg(&self, frame: ImageSize, background: Option<&str>) -> String {
        let (w, h) = (frame.width, frame.height);
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(svg, r#"  <rect width="{w}" height="{h}" fill="{BACKDROP}"/>"#);
        if let Some(href) = background {
            let _ = writeln!(
                svg,
                r#"  <image x="0" y="0" width="{w}" height="{h}" xlink:href="{}"/>"#,
                escape(href)
            );
        }

        for element in &self.elements {
            let _ = writeln!(svg, r#"  <g visibility="hidden">"#);
            let _ = writeln!(
                svg,
                r#"    <set attributeName="visibility" to="visible" begin="{}ms" fill="freeze"/>"#,
                element.reveal_at_ms()
            );
            match element {
                OverlayElement::Line {
                    color,
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke_width,
                    label,
                    ..
                } => {
                    let _ = writeln!(
                        svg,
                        r#"    <line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{color}" stroke-width="{stroke_width}" stroke-linecap="round"/>"#
                    );
                    write_label(&mut svg, label);
                }
                OverlayElement::Marker {
                    color,
                    cx,
                    cy,
                    radius,
                    stroke_width,
                    label,
                    ..
                } => {
                    let _ = writeln!(
                        svg,
                        r#"    <circle cx="{cx}" cy="{cy}" r="{radius}" fill="{color}" stroke="white" stroke-width="{stroke_width}"/>"#
                    );
                    write_label(&mut svg, label);
                }
            }
            let _ = writeln!(svg, "  </g>");
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// SVG text is positioned by baseline, labels by their top edge.
fn write_label(svg: &mut String, label: &Label) {
    let baseline = label.y + i64::from(label.font_size);
    let _ = writeln!(
        svg,
        r#"    <text x="{}" y="{baseline}" font-size="{}" font-family="sans-serif" fill="white" stroke="black" stroke-width="1">{}</text>"#,
        label.x,
        label.font_size,
        escape(&label.text)
    );
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::demo_predictions;
    use crate::fingertips::place_fingertips;
    use crate::normalize::normalize_lines;

    fn demo_plan(interval: Duration) -> OverlayPlan {
        let preds = demo_predictions();
        OverlayPlan::build(
            &normalize_lines(&preds, ImageSize::DEMO),
            &place_fingertips(&preds, ImageSize::DEMO),
            interval,
        )
    }

    #[test]
    fn test_reveal_schedule() {
        let plan = demo_plan(Duration::from_millis(800));
        let times: Vec<_> = plan.elements.iter().map(OverlayElement::reveal_at_ms).collect();
        assert_eq!(
            times,
            vec![0, 800, 1600, 2400, 3200, 4000, 4800, 5600, 6400, 7200]
        );
        assert_eq!(plan.total_duration_ms, 7200);
        assert_eq!(plan.interval_ms, 800);
    }

    #[test]
    fn test_lines_before_markers() {
        let plan = demo_plan(Duration::from_millis(100));
        assert!(plan.elements[..5]
            .iter()
            .all(|e| matches!(e, OverlayElement::Line { .. })));
        assert!(plan.elements[5..]
            .iter()
            .all(|e| matches!(e, OverlayElement::Marker { .. })));
    }

    #[test]
    fn test_line_element_geometry() {
        let plan = demo_plan(Duration::from_millis(800));
        let OverlayElement::Line {
            color,
            x1,
            y1,
            label,
            stroke_width,
            ..
        } = &plan.elements[0]
        else {
            panic!("expected a line first");
        };
        assert_eq!(color, "#FF6B6B");
        assert_eq!((*x1, *y1), (110, 176));
        assert_eq!(*stroke_width, 4);
        assert_eq!(label.text, "heart line");
        assert_eq!((label.x, label.y, label.font_size), (110, 156, 14));
    }

    #[test]
    fn test_marker_element_geometry() {
        let plan = demo_plan(Duration::from_millis(800));
        let OverlayElement::Marker {
            finger,
            cx,
            cy,
            radius,
            label,
            ..
        } = &plan.elements[5]
        else {
            panic!("expected a marker");
        };
        assert_eq!(*finger, Finger::Thumb);
        assert_eq!((*cx, *cy, *radius), (118, 260, 8));
        assert_eq!((label.x, label.y, label.font_size), (103, 275, 12));
    }

    #[test]
    fn test_empty_plan() {
        let plan = OverlayPlan::build(&[], &[], Duration::from_millis(800));
        assert!(plan.elements.is_empty());
        assert_eq!(plan.total_duration_ms, 0);
    }

    #[test]
    fn test_plan_serializes_tagged() {
        let plan = demo_plan(Duration::from_millis(800));
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["intervalMs"], 800);
        assert_eq!(json["elements"][0]["kind"], "line");
        assert_eq!(json["elements"][0]["class"], "heart_line");
        assert_eq!(json["elements"][0]["revealAtMs"], 0);
        assert_eq!(json["elements"][5]["kind"], "marker");
        assert_eq!(json["elements"][5]["finger"], "thumb");
    }

    #[test]
    fn test_svg_contains_every_element() {
        let plan = demo_plan(Duration::from_millis(800));
        let svg = plan.to_svg(ImageSize::DEMO, None);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<line ").count(), 5);
        assert_eq!(svg.matches("<circle ").count(), 5);
        assert!(svg.contains(r#"begin="7200ms""#));
        assert!(svg.contains(r##"fill="#f8f8f8""##));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn test_svg_embeds_background() {
        let plan = OverlayPlan::build(&[], &[], Duration::from_millis(800));
        let svg = plan.to_svg(ImageSize::new(10, 10), Some("data:image/png;base64,QUJD"));
        assert!(svg.contains(r#"xlink:href="data:image/png;base64,QUJD""#));
    }

    #[test]
    fn test_svg_escapes_labels() {
        let mut lines = normalize_lines(&demo_predictions(), ImageSize::DEMO);
        lines.truncate(1);
        lines[0].class = LineClass::from("<script>");

        let svg = OverlayPlan::build(&lines, &[], Duration::from_millis(1)).to_svg(ImageSize::DEMO, None);
        assert!(svg.contains("&lt;script&gt;"));
        assert!(!svg.contains("<script>"));
    }
}
