//! Replaying adapter for the `ImageService` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::MockupError;
use crate::config::API_KEY_VARS;
use crate::ports::image_service::{
    EditRequest, ImageService, LogoPlacementRequest, MockupRequest, ServiceFuture,
    EDIT_IMAGE_ACTION, PLACE_LOGO_ACTION,
};

const PORT: &str = "image_service";

/// Serves recorded image service results from a cassette.
pub struct ReplayingImageService {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageService {
    /// Create a replaying service backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }

    fn replay(&self, method: &'static str) -> ServiceFuture<'_> {
        let output = next_output(&self.replayer, PORT, method);
        Box::pin(async move {
            let output = output.map_err(MockupError::Config)?;
            replay_result::<String>(output).map_err(|e| restore_error(method, &e.to_string()))
        })
    }
}

/// Rebuild the error a recorded message came from.
///
/// Messages that match no service error (network failures among them)
/// come back as `Api` with status 0.
fn restore_error(method: &str, message: &str) -> MockupError {
    if message == MockupError::EmptyGenerationResult.to_string() {
        return MockupError::EmptyGenerationResult;
    }
    if message.ends_with(" failed. The model did not return an image.") {
        let action = if method == "place_logo" { PLACE_LOGO_ACTION } else { EDIT_IMAGE_ACTION };
        return MockupError::NoImageReturned { action };
    }
    if message.starts_with("No API key configured.") {
        return MockupError::MissingApiKey { env_var: API_KEY_VARS[0] };
    }
    if let Some(detail) = message.strip_prefix("Invalid image data: ") {
        return MockupError::InvalidImageData(detail.to_string());
    }
    if let Some((status, detail)) = message
        .strip_prefix("API error (")
        .and_then(|rest| rest.split_once("): "))
        .and_then(|(status, detail)| Some((status.parse::<u16>().ok()?, detail)))
    {
        return MockupError::Api { status, message: detail.to_string() };
    }
    MockupError::Api { status: 0, message: message.to_string() }
}

impl ImageService for ReplayingImageService {
    fn generate_mockup(&self, _request: &MockupRequest) -> ServiceFuture<'_> {
        self.replay("generate_mockup")
    }

    fn place_logo(&self, _request: &LogoPlacementRequest) -> ServiceFuture<'_> {
        self.replay("place_logo")
    }

    fn edit_image(&self, _request: &EditRequest) -> ServiceFuture<'_> {
        self.replay("edit_image")
    }
}
