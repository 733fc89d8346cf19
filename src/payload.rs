//! In-memory image payloads: base64 bytes, MIME type, and a data-URI.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::MockupError;

/// An immutable image value.
///
/// `url` is always `data:<mime_type>;base64,<base64>`, so it can be handed
/// to anything that accepts an image source without further decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PayloadRepr", into = "PayloadRepr")]
pub struct ImagePayload {
    base64: String,
    mime_type: String,
    url: String,
}

/// Wire form; the data-URI is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct PayloadRepr {
    base64: String,
    mime_type: String,
}

impl From<PayloadRepr> for ImagePayload {
    fn from(repr: PayloadRepr) -> Self {
        Self::new(repr.base64, repr.mime_type)
    }
}

impl From<ImagePayload> for PayloadRepr {
    fn from(payload: ImagePayload) -> Self {
        Self { base64: payload.base64, mime_type: payload.mime_type }
    }
}

impl ImagePayload {
    /// Build a payload from already-encoded base64 data.
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let base64 = base64.into();
        let mime_type = mime_type.into();
        let url = format!("data:{mime_type};base64,{base64}");
        Self { base64, mime_type, url }
    }

    /// Build a payload by encoding raw bytes.
    pub fn from_bytes(data: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(base64::engine::general_purpose::STANDARD.encode(data), mime_type)
    }

    /// Wrap base64 returned by the image service.
    ///
    /// The format is sniffed from the magic bytes and the whole image is
    /// decoded once in that format; the payload carries the sniffed MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`MockupError::InvalidImageData`] if the string is not valid
    /// base64, the bytes are not a recognizable image, or the image does not
    /// decode.
    pub fn from_service(base64: String) -> Result<Self, MockupError> {
        let bytes = decode(&base64)?;
        let format = image::guess_format(&bytes)
            .map_err(|e| MockupError::InvalidImageData(format!("unrecognized image bytes: {e}")))?;
        image::load_from_memory_with_format(&bytes, format).map_err(|e| {
            MockupError::InvalidImageData(format!("{} does not decode: {e}", format.to_mime_type()))
        })?;
        Ok(Self::new(base64, format.to_mime_type()))
    }

    /// Base64-encoded image bytes.
    #[must_use]
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// MIME type, e.g. `image/jpeg`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Data-URI form of the image.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decode the raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MockupError::InvalidImageData`] if the base64 is malformed.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MockupError> {
        decode(&self.base64)
    }

    /// Approximate decoded size in bytes, for display.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.base64.len() / 4 * 3
    }
}

/// Extract the base64 portion of a `data:<mime>;base64,<data>` URI.
#[cfg(test)]
pub fn base64_from_data_url(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    header.ends_with(";base64").then_some(data)
}

fn decode(base64: &str) -> Result<Vec<u8>, MockupError> {
    base64::engine::general_purpose::STANDARD
        .decode(base64)
        .map_err(|e| MockupError::InvalidImageData(format!("Failed to decode base64: {e}")))
}
