//! The palm reading text.
//!
//! Readings are assembled from canned sentences keyed off which line classes
//! and fingertips are present. There is no scoring beyond presence counts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::palm::{Fingertip, LineClass, PalmLine};

/// Star system a starseed reading is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lineage {
    /// Five or more fingertips.
    Pleiadian,
    /// Three or four fingertips.
    Sirian,
    /// Fewer than three fingertips.
    Arcturian,
}

impl Lineage {
    /// Pick the lineage for a fingertip count.
    #[must_use]
    pub fn for_fingertips(count: usize) -> Self {
        match count {
            n if n >= 5 => Self::Pleiadian,
            n if n >= 3 => Self::Sirian,
            _ => Self::Arcturian,
        }
    }

    /// The starseed paragraph.
    #[must_use]
    pub fn starseed(self) -> &'static str {
        match self {
            Self::Pleiadian => "Your cosmic origins trace to the Pleiadian star system. You are a natural healer and lightworker, drawn to helping others awaken to their spiritual potential. Your complete energy signature suggests you're here on a mission to bring harmony, healing, and elevated consciousness to Earth. Your soul carries the wisdom of ancient healing arts and spiritual teaching.",
            Self::Sirian => "Your soul carries ancient wisdom from the Sirian star system. You are here to share knowledge and guide others through transformation. Your mission involves bridging spiritual and practical wisdom, helping others navigate the complexities of both earthly and cosmic consciousness. You have a natural ability to teach and inspire.",
            Self::Arcturian => "Your energy resonates with the Arcturian star system. You are an advanced soul focused on spiritual evolution and consciousness expansion. Your purpose involves helping humanity raise its vibrational frequency through innovation, healing, and the integration of higher dimensional wisdom into practical applications.",
        }
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pleiadian => "Pleiadian",
            Self::Sirian => "Sirian",
            Self::Arcturian => "Arcturian",
        };
        f.write_str(name)
    }
}

/// Per-line entry of the detailed reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReading {
    /// Short description.
    pub description: String,
    /// Long-form meaning.
    pub meaning: String,
    /// Confidence as a whole percentage.
    pub strength: u32,
}

/// Per-fingertip entry of the detailed reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingertipReading {
    /// Short description.
    pub description: String,
    /// Long-form meaning.
    pub meaning: String,
    /// Confidence as a whole percentage.
    pub confidence: u32,
}

/// Detailed readings keyed by line class and finger name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedReadings {
    /// Keyed by line class wire name.
    pub lines: BTreeMap<String, LineReading>,
    /// Keyed by finger name.
    pub fingertips: BTreeMap<String, FingertipReading>,
}

/// A complete palm reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// One sentence per recognised line present, space separated.
    pub personality: String,
    /// One entry per recognised line present.
    pub strengths: Vec<String>,
    /// One entry per recognised line missing.
    pub challenges: Vec<String>,
    /// Starseed paragraph.
    pub starseed: String,
    /// Lineage the starseed paragraph belongs to.
    pub lineage: Lineage,
    /// Closing summary.
    pub overall: String,
    /// Per-line and per-fingertip details.
    pub detailed_readings: DetailedReadings,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(confidence: f64) -> u32 {
    (confidence * 100.0).round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Build the reading for a set of normalised lines and fingertips.
#[must_use]
pub fn compose(lines: &[PalmLine], fingertips: &[Fingertip]) -> Reading {
    let mut details = DetailedReadings::default();

    for line in lines {
        details.lines.insert(
            line.class.as_str().to_string(),
            LineReading {
                description: line.description.clone(),
                meaning: line.class.meaning().to_string(),
                strength: percent(line.confidence),
            },
        );
    }

    for tip in fingertips {
        details.fingertips.insert(
            tip.name.as_str().to_string(),
            FingertipReading {
                description: tip.description.clone(),
                meaning: tip.name.meaning().to_string(),
                confidence: percent(tip.confidence),
            },
        );
    }

    let present = |class: &LineClass| lines.iter().any(|l| &l.class == class);

    let mut personality = String::new();
    let mut strengths = Vec::new();
    let mut challenges = Vec::new();

    for class in &LineClass::CANONICAL {
        if present(class) {
            if let Some(sentence) = class.personality() {
                personality.push_str(sentence);
                personality.push(' ');
            }
            strengths.extend(class.strength().map(String::from));
        } else {
            challenges.extend(class.challenge().map(String::from));
        }
    }

    let lineage = Lineage::for_fingertips(fingertips.len());
    let overall = format!(
        "Based on your comprehensive palm reading, you possess {} key strengths and {} areas for growth. {} Your spiritual path as a {lineage} starseed is perfectly aligned with your earthly purpose, making you a powerful agent of positive change and spiritual evolution.",
        strengths.len(),
        challenges.len(),
        personality.trim(),
    );

    Reading {
        personality,
        strengths,
        challenges,
        starseed: lineage.starseed().to_string(),
        lineage,
        overall,
        detailed_readings: details,
    }
}
