//! Turns user-selected files into image payloads.

use std::path::Path;

use crate::error::MockupError;
use crate::payload::ImagePayload;

/// Read an image file into a payload.
///
/// The declared content type is guessed from the file name and must be
/// `image/*`. Nothing is read from disk when the check fails.
///
/// # Errors
///
/// Returns [`MockupError::InvalidFileType`] for non-image files and
/// [`MockupError::Io`] if the file cannot be read.
pub fn read_image_file(path: &Path) -> Result<ImagePayload, MockupError> {
    let content_type = declared_content_type(path);
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    ensure_image_type(&name, content_type)?;

    let data = std::fs::read(path)?;
    tracing::debug!(file = %path.display(), bytes = data.len(), "read logo file");
    payload_from_bytes(&name, &data, content_type)
}

/// Build a payload from bytes with an explicit declared content type.
///
/// # Errors
///
/// Returns [`MockupError::InvalidFileType`] if `content_type` is not `image/*`.
pub fn payload_from_bytes(
    name: &str,
    data: &[u8],
    content_type: Option<&str>,
) -> Result<ImagePayload, MockupError> {
    let mime = ensure_image_type(name, content_type)?;
    Ok(ImagePayload::from_bytes(data, mime))
}

fn declared_content_type(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

fn ensure_image_type<'a>(
    name: &str,
    content_type: Option<&'a str>,
) -> Result<&'a str, MockupError> {
    match content_type {
        Some(mime) if mime.starts_with("image/") => Ok(mime),
        other => Err(MockupError::InvalidFileType {
            name: name.to_string(),
            content_type: other.unwrap_or("unknown").to_string(),
        }),
    }
}
