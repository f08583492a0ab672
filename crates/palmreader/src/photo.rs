//! Intake of the captured palm photo.
//!
//! The browser hands over a `data:` URL produced from a camera snapshot. The
//! base64 payload is forwarded to the detector untouched; decoding it here is
//! only used to learn the real frame size.

use std::io::Cursor;
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageReader;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::palm::ImageSize;

static MIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(?P<mime>[A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+)").expect("static regex")
});

const BASE64_MARKER: &str = "base64,";

/// A validated palm photo data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalmImage {
    mime: Option<String>,
    payload: String,
}

impl PalmImage {
    /// Parse a data URL.
    ///
    /// The payload is everything between the first and second comma, which
    /// is what the hosted detector expects to receive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingImage`] for an empty string and
    /// [`Error::InvalidImageFormat`] when there is no base64 payload.
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        if data_url.is_empty() {
            return Err(Error::MissingImage);
        }
        if !data_url.contains(BASE64_MARKER) {
            return Err(Error::InvalidImageFormat);
        }

        let payload = data_url.split(',').nth(1).unwrap_or_default().to_string();
        let mime = MIME_PATTERN
            .captures(data_url)
            .map(|caps| caps["mime"].to_ascii_lowercase());

        Ok(Self { mime, payload })
    }

    /// Wrap raw image bytes, e.g. a file read from disk.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime = image::guess_format(bytes)
            .ok()
            .map(|format| format.to_mime_type().to_string());
        Self {
            mime,
            payload: STANDARD.encode(bytes),
        }
    }

    /// Mime type declared in the data URL, if any.
    #[must_use]
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// The base64 payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Approximate decoded size in bytes.
    #[must_use]
    pub fn decoded_len(&self) -> usize {
        self.payload.len() / 4 * 3
    }

    /// Reject payloads larger than `limit` decoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageTooLarge`] when over the limit.
    pub fn ensure_within(&self, limit: usize) -> Result<()> {
        let size = self.decoded_len();
        if size > limit {
            return Err(Error::ImageTooLarge { size, limit });
        }
        Ok(())
    }

    /// Rebuild a data URL, for embedding the photo in a rendered overlay.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime.as_deref().unwrap_or("image/jpeg"),
            self.payload
        )
    }

    /// Pixel dimensions of the photo, when the payload decodes to a known
    /// raster format. Failure is not an error: callers fall back to defaults.
    #[must_use]
    pub fn dimensions(&self) -> Option<ImageSize> {
        let cleaned: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let bytes = match STANDARD.decode(cleaned) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "image payload is not valid base64");
                return None;
            }
        };

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .ok()?;
        match reader.into_dimensions() {
            Ok((width, height)) if width > 0 && height > 0 => Some(ImageSize::new(width, height)),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "could not read image dimensions");
                None
            }
        }
    }
}
