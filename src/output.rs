//! File naming, image saving, and format conversion.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::MockupError;
use crate::payload::ImagePayload;
use crate::wizard::Step;

/// Validate the output format parameter.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), String> {
    match format {
        "jpeg" | "png" | "webp" => Ok(()),
        _ => Err(format!("Unsupported format '{format}'. Valid: jpeg, png, webp")),
    }
}

/// Get the file extension for an output format.
#[must_use]
pub fn format_extension(format: &str) -> &'static str {
    match format {
        "png" => "png",
        "webp" => "webp",
        // jpeg and any unknown format default to jpg
        _ => "jpg",
    }
}

/// Pick the save format from a path's extension, falling back to `default`.
#[must_use]
pub fn format_for_path<'a>(path: &Path, default: &'a str) -> &'a str {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "jpeg",
        Some("png") => "png",
        Some("webp") => "webp",
        _ => default,
    }
}

/// Filename label for the image a step shows.
#[must_use]
pub fn stage_label(step: Step) -> &'static str {
    match step {
        Step::Generate | Step::Upload => "mockup",
        Step::Edit => "final",
    }
}

/// Generate an output filename from a prompt, stage and format.
///
/// Sanitizes the first 40 characters of the prompt to kebab-case, then
/// appends the stage, a unix timestamp, and the file extension.
#[must_use]
pub fn auto_filename(prompt: &str, stage: &str, format: &str) -> String {
    let sanitized = sanitize_for_filename(prompt, 40);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    let ext = format_extension(format);
    format!("{sanitized}-{stage}-{timestamp}.{ext}")
}

/// Sanitize a string for use in a filename.
///
/// Lowercases, turns runs of non-alphanumerics into single hyphens, and
/// trims to `max_len`.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true;

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "mockup".to_string()
    } else {
        result
    }
}

/// Resolve the output path: use the explicit path or auto-generate one in `dir`.
#[must_use]
pub fn resolve_output_path(
    explicit: Option<&str>,
    dir: &Path,
    prompt: &str,
    stage: &str,
    format: &str,
) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => dir.join(auto_filename(prompt, stage, format)),
    }
}

/// Write a payload to disk in `target_format`, converting if its MIME type differs.
///
/// # Errors
///
/// Returns an error if the payload cannot be decoded, converted, or written.
pub fn save_payload(
    payload: &ImagePayload,
    target_format: &str,
    output_path: &Path,
) -> Result<(), MockupError> {
    let data = payload.to_bytes()?;
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    if mime_matches_format(payload.mime_type(), target_format) {
        std::fs::write(output_path, data).map_err(MockupError::Io)
    } else {
        tracing::debug!(from = payload.mime_type(), to = target_format, "converting image");
        convert_and_save(&data, target_format, output_path)
    }
}

fn mime_matches_format(mime: &str, format: &str) -> bool {
    matches!((mime, format), ("image/jpeg", "jpeg") | ("image/png", "png") | ("image/webp", "webp"))
}

fn convert_and_save(
    data: &[u8],
    target_format: &str,
    output_path: &Path,
) -> Result<(), MockupError> {
    let img = image::load_from_memory(data)
        .map_err(|e| MockupError::ImageConversion(format!("Failed to decode image: {e}")))?;

    let image_format = match target_format {
        "jpeg" => image::ImageFormat::Jpeg,
        "png" => image::ImageFormat::Png,
        "webp" => image::ImageFormat::WebP,
        other => {
            return Err(MockupError::ImageConversion(format!("Unsupported format: {other}")));
        }
    };

    // JPEG has no alpha channel.
    let img = if image_format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    img.save_with_format(output_path, image_format).map_err(|e| {
        MockupError::ImageConversion(format!("Failed to save as {target_format}: {e}"))
    })
}
