//! Image service port: the three remote calls the wizard makes.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::MockupError;
use crate::payload::ImagePayload;

/// Request to synthesize a mockup from text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockupRequest {
    /// Description of the product photo.
    pub prompt: String,
}

/// Request to composite a logo onto a mockup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoPlacementRequest {
    /// The generated mockup.
    pub mockup: ImagePayload,
    /// The uploaded logo.
    pub logo: ImagePayload,
    /// The prompt the mockup was generated from.
    pub description: String,
}

/// Request to apply a free-text edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// The image to edit, usually the last composite.
    pub image: ImagePayload,
    /// What to change.
    pub instruction: String,
}

/// Action name reported when logo placement returns no image.
pub const PLACE_LOGO_ACTION: &str = "Placing the logo on the mockup";

/// Action name reported when an edit returns no image.
pub const EDIT_IMAGE_ACTION: &str = "Editing the image";

/// Boxed future returned by every [`ImageService`] method.
///
/// Resolves to the base64-encoded result image, never an empty string.
pub type ServiceFuture<'a> = Pin<Box<dyn Future<Output = Result<String, MockupError>> + Send + 'a>>;

/// Generates and edits images via an external API.
pub trait ImageService: Send + Sync {
    /// Text to a single square mockup photo.
    fn generate_mockup(&self, request: &MockupRequest) -> ServiceFuture<'_>;

    /// Mockup plus logo to a composited image.
    fn place_logo(&self, request: &LogoPlacementRequest) -> ServiceFuture<'_>;

    /// Image plus instruction to an edited image.
    fn edit_image(&self, request: &EditRequest) -> ServiceFuture<'_>;
}
