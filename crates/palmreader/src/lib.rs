//! `palmreader` - Palm photo readings backed by a hosted line detector
//!
//! A photo of a palm goes in as a `data:` URL. Line detection is delegated to
//! a hosted segmentation model, with built-in demo predictions when the model
//! is unavailable or finds nothing. The detected lines are clamped into the
//! photo, fingertip markers are placed around the palm centre, and a canned
//! reading plus a timed overlay plan come back out.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod fingertips;
pub mod logging;
pub mod normalize;
pub mod overlay;
pub mod palm;
pub mod photo;
pub mod reading;
pub mod server;

pub use analysis::{AnalysisReport, Analyzer, Outcome};
pub use config::Config;
pub use detection::{DemoDetector, LineDetector, Prediction, RoboflowDetector};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use overlay::OverlayPlan;
pub use palm::{Finger, Fingertip, ImageSize, LineClass, PalmLine};
pub use photo::PalmImage;
pub use reading::Reading;
