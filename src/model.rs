//! Model name resolution and model family detection.

/// Default text-to-image model for mockup generation.
pub const DEFAULT_GENERATE_MODEL: &str = "imagen-4.0-generate-001";

/// Default image-editing model for logo placement and edits.
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";

/// API families, which differ in endpoint and request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Imagen text-to-image models (`:predict`).
    Imagen,
    /// Gemini multimodal models (`:generateContent`).
    Gemini,
}

/// Short name aliases for the supported models.
const ALIASES: &[(&str, &str)] = &[
    ("imagen-4", "imagen-4.0-generate-001"),
    ("imagen-4-fast", "imagen-4.0-fast-generate-001"),
    ("imagen-4-ultra", "imagen-4.0-ultra-generate-001"),
    ("nano-banana", "gemini-2.5-flash-image"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    for &(alias, full) in ALIASES {
        if name == alias {
            return full.to_string();
        }
    }
    name.to_string()
}

/// Detect the API family from a resolved model name.
///
/// # Errors
///
/// Returns an error if the model name doesn't match a known family prefix.
pub fn detect_family(model: &str) -> Result<ModelFamily, String> {
    if model.starts_with("imagen") {
        Ok(ModelFamily::Imagen)
    } else if model.starts_with("gemini") {
        Ok(ModelFamily::Gemini)
    } else {
        Err(format!("Unknown model family for '{model}'. Expected 'imagen-*' or 'gemini-*'."))
    }
}

/// Check that a resolved model can edit images.
///
/// # Errors
///
/// Returns an error for Imagen or unknown models.
pub fn validate_edit_model(model: &str) -> Result<(), String> {
    match detect_family(model)? {
        ModelFamily::Gemini => Ok(()),
        ModelFamily::Imagen => {
            Err(format!("Model '{model}' cannot edit images. Use a 'gemini-*' image model."))
        }
    }
}
