//! Palm vocabulary: line classes, fingers and their canned texts.
//!
//! Every piece of prose the service returns is keyed off one of these two
//! enums, so the tables live next to the types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A palm line class as reported by the hosted detector.
///
/// Unknown class names are carried through as [`LineClass::Other`] rather than
/// dropped, so a retrained detector does not silently lose lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineClass {
    /// Emotions and relationships.
    Heart,
    /// Intellect and decision making.
    Head,
    /// Health and vitality.
    Life,
    /// Career and destiny.
    Fate,
    /// Fame and creativity.
    Sun,
    /// Any class name the detector returns that is not recognised.
    Other(String),
}

impl LineClass {
    /// The five recognised classes, in reading order.
    pub const CANONICAL: [LineClass; 5] = [
        LineClass::Heart,
        LineClass::Head,
        LineClass::Life,
        LineClass::Fate,
        LineClass::Sun,
    ];

    /// Wire name, e.g. `heart_line`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heart => "heart_line",
            Self::Head => "head_line",
            Self::Life => "life_line",
            Self::Fate => "fate_line",
            Self::Sun => "sun_line",
            Self::Other(name) => name,
        }
    }

    /// Overlay label: the wire name with its first underscore turned into a space.
    #[must_use]
    pub fn label(&self) -> String {
        self.as_str().replacen('_', " ", 1)
    }

    /// Short description attached to every detected line.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Heart => "Represents emotions & relationships. A clear, deep line indicates strong emotional connections and passionate nature.",
            Self::Head => "Indicates intellect & decision-making. The length and curve suggest analytical abilities and creativity.",
            Self::Life => "Relates to health & vitality. A strong life line indicates robust health and high energy levels.",
            Self::Fate => "Reflects career path & destiny. This line shows your life's direction and career success potential.",
            Self::Sun => "Represents fame and creativity. A prominent sun line suggests artistic talents and potential recognition.",
            Self::Other(_) => "Unknown line detected.",
        }
    }

    /// Long-form meaning used in the detailed reading.
    #[must_use]
    pub fn meaning(&self) -> &'static str {
        match self {
            Self::Heart => "This line reveals your emotional nature, capacity for love, and approach to relationships. A strong heart line indicates deep emotional connections and romantic fulfillment.",
            Self::Head => "Your mental faculties, intelligence, and thinking patterns are shown here. This line represents your analytical abilities, creativity, and decision-making style.",
            Self::Life => "This represents your vitality, health, and overall life energy. It shows your physical strength, stamina, and general well-being throughout life.",
            Self::Fate => "Your career path, destiny, and life direction are revealed through this line. It indicates your professional success and how external forces shape your life.",
            Self::Sun => "This line represents fame, success, creativity, and artistic talents. It shows your potential for recognition and achievement in creative endeavors.",
            Self::Other(_) => "This line provides insight into your unique life path and personal characteristics.",
        }
    }

    /// Sentence appended to the personality summary when the line is present.
    #[must_use]
    pub fn personality(&self) -> Option<&'static str> {
        match self {
            Self::Heart => Some("You are emotionally expressive and value deep connections."),
            Self::Head => Some("You possess analytical thinking and make decisions carefully."),
            Self::Life => Some("You have strong vitality and a zest for life."),
            Self::Fate => Some("Your life path is clearly defined with strong career focus."),
            Self::Sun => Some("You have creative talents and potential for recognition."),
            Self::Other(_) => None,
        }
    }

    /// Strength listed when the line is present.
    #[must_use]
    pub fn strength(&self) -> Option<&'static str> {
        match self {
            Self::Heart => Some("Strong emotional intelligence and empathy"),
            Self::Head => Some("Excellent problem-solving and analytical abilities"),
            Self::Life => Some("Natural resilience, energy, and robust health"),
            Self::Fate => Some("Natural leadership qualities and clear direction"),
            Self::Sun => Some("Artistic abilities and creative expression"),
            Self::Other(_) => None,
        }
    }

    /// Growth area listed when the line is missing.
    #[must_use]
    pub fn challenge(&self) -> Option<&'static str> {
        match self {
            Self::Heart => Some("Focus on developing emotional awareness and relationships"),
            Self::Head => Some("Work on decision-making and analytical thinking"),
            Self::Life => Some("Pay attention to health and energy management"),
            Self::Fate => Some("Define your career path and life direction more clearly"),
            Self::Sun => Some("Explore creative outlets and self-expression"),
            Self::Other(_) => None,
        }
    }

    /// Overlay stroke colour.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Self::Heart => "#FF6B6B",
            Self::Head => "#4ECDC4",
            Self::Life => "#45B7D1",
            Self::Fate => "#FFA726",
            Self::Sun => "#AB47BC",
            Self::Other(_) => "#666666",
        }
    }
}

impl From<&str> for LineClass {
    fn from(name: &str) -> Self {
        match name {
            "heart_line" => Self::Heart,
            "head_line" => Self::Head,
            "life_line" => Self::Life,
            "fate_line" => Self::Fate,
            "sun_line" => Self::Sun,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for LineClass {
    fn from(name: String) -> Self {
        match LineClass::from(name.as_str()) {
            Self::Other(_) => Self::Other(name),
            known => known,
        }
    }
}

impl From<LineClass> for String {
    fn from(class: LineClass) -> Self {
        match class {
            LineClass::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the five fingers a fingertip marker is placed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    /// Willpower and logic.
    Thumb,
    /// Ambition (Jupiter).
    Index,
    /// Responsibility (Saturn).
    Middle,
    /// Creativity (Apollo).
    Ring,
    /// Communication (Mercury).
    Pinky,
}

impl Finger {
    /// All fingers, thumb first.
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Wire name, e.g. `thumb`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }

    /// Offset of the fingertip from the palm centre, in pixels, for an
    /// upright hand with fingers pointing up.
    #[must_use]
    pub fn offset(self) -> (f64, f64) {
        match self {
            Self::Thumb => (-80.0, 20.0),
            Self::Index => (-30.0, -120.0),
            Self::Middle => (10.0, -140.0),
            Self::Ring => (50.0, -130.0),
            Self::Pinky => (85.0, -100.0),
        }
    }

    /// Confidence reported for the heuristic placement.
    #[must_use]
    pub fn confidence(self) -> f64 {
        match self {
            Self::Thumb => 0.88,
            Self::Index => 0.91,
            Self::Middle => 0.93,
            Self::Ring => 0.87,
            Self::Pinky => 0.84,
        }
    }

    /// Short description attached to every fingertip.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Thumb => "The thumb represents willpower and logic. A strong thumb indicates leadership qualities.",
            Self::Index => "The index finger represents ambition and leadership. It shows your desire for power and recognition.",
            Self::Middle => "The middle finger represents responsibility and balance. It indicates your approach to duty and structure.",
            Self::Ring => "The ring finger represents creativity and emotions. It shows artistic abilities and romantic nature.",
            Self::Pinky => "The pinky finger represents communication and intuition. It indicates social skills and business acumen.",
        }
    }

    /// Long-form meaning used in the detailed reading.
    #[must_use]
    pub fn meaning(self) -> &'static str {
        match self {
            Self::Thumb => "Your thumb reveals your willpower, determination, and ability to make independent decisions. It shows your capacity for leadership and self-direction.",
            Self::Index => "The Jupiter finger represents your ambition, leadership qualities, and desire for recognition. It indicates your confidence and ability to guide others.",
            Self::Middle => "The Saturn finger shows your sense of responsibility, discipline, and approach to structure. It reveals your relationship with authority and duty.",
            Self::Ring => "The Apollo finger represents your creativity, artistic nature, and emotional expression. It shows your capacity for beauty, art, and romantic love.",
            Self::Pinky => "The Mercury finger indicates your communication skills, business acumen, and social intelligence. It reveals your ability to connect with others and express ideas.",
        }
    }

    /// Overlay marker fill colour.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Thumb => "#E91E63",
            Self::Index => "#2196F3",
            Self::Middle => "#4CAF50",
            Self::Ring => "#FF9800",
            Self::Pinky => "#9C27B0",
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of the frame that coordinates refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Frame assumed when the detector does not report one.
    pub const DETECTOR_DEFAULT: ImageSize = ImageSize::new(640, 480);

    /// Frame the demo predictions are laid out in.
    pub const DEMO: ImageSize = ImageSize::new(400, 600);

    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width as a float, for coordinate math.
    #[must_use]
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as a float, for coordinate math.
    #[must_use]
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }
}

/// A detected line after normalisation to integer pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalmLine {
    /// Line class.
    pub class: LineClass,
    /// Left edge.
    pub x1: i64,
    /// Top edge.
    pub y1: i64,
    /// Right edge.
    pub x2: i64,
    /// Bottom edge.
    pub y2: i64,
    /// Detector confidence, two decimal places.
    pub confidence: f64,
    /// Short description of the class.
    pub description: String,
}

/// A heuristically placed fingertip marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingertip {
    /// Which finger.
    pub name: Finger,
    /// Marker centre, x.
    pub x: i64,
    /// Marker centre, y.
    pub y: i64,
    /// Placement confidence.
    pub confidence: f64,
    /// Short description of the finger.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_class_round_trip_names() {
        for class in LineClass::CANONICAL {
            assert_eq!(LineClass::from(class.as_str()), class);
        }
    }

    #[test]
    fn test_unknown_line_class_is_preserved() {
        let class = LineClass::from("marriage_line");
        assert_eq!(class, LineClass::Other("marriage_line".to_string()));
        assert_eq!(class.description(), "Unknown line detected.");
        assert_eq!(class.color(), "#666666");
        assert!(class.personality().is_none());
    }

    #[test]
    fn test_line_class_serde() {
        let json = serde_json::to_string(&LineClass::Heart).unwrap();
        assert_eq!(json, "\"heart_line\"");

        let class: LineClass = serde_json::from_str("\"fate_line\"").unwrap();
        assert_eq!(class, LineClass::Fate);

        let other: LineClass = serde_json::from_str("\"girdle_of_venus\"").unwrap();
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"girdle_of_venus\"");
    }

    #[test]
    fn test_line_label_replaces_first_underscore() {
        assert_eq!(LineClass::Heart.label(), "heart line");
        assert_eq!(LineClass::from("girdle_of_venus").label(), "girdle of_venus");
    }

    #[test]
    fn test_known_lines_have_full_texts() {
        for class in LineClass::CANONICAL {
            assert!(class.personality().is_some());
            assert!(class.strength().is_some());
            assert!(class.challenge().is_some());
            assert_ne!(class.description(), "Unknown line detected.");
        }
    }

    #[test]
    fn test_finger_serde() {
        assert_eq!(serde_json::to_string(&Finger::Pinky).unwrap(), "\"pinky\"");
        let finger: Finger = serde_json::from_str("\"ring\"").unwrap();
        assert_eq!(finger, Finger::Ring);
    }

    #[test]
    fn test_finger_display_matches_wire_name() {
        for finger in Finger::ALL {
            assert_eq!(finger.to_string(), finger.as_str());
        }
    }

    #[test]
    fn test_finger_colors_distinct() {
        let mut colors: Vec<_> = Finger::ALL.iter().map(|f| f.color()).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 5);
    }

    #[test]
    fn test_image_size_constants() {
        assert_eq!(ImageSize::DETECTOR_DEFAULT, ImageSize::new(640, 480));
        assert_eq!(ImageSize::DEMO, ImageSize::new(400, 600));
    }
}
