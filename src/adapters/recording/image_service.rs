//! Recording adapter for the `ImageService` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_service::{
    EditRequest, ImageService, LogoPlacementRequest, MockupRequest, ServiceFuture,
};

const PORT: &str = "image_service";

/// Records image service interactions while delegating to an inner implementation.
pub struct RecordingImageService {
    inner: Box<dyn ImageService>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageService {
    /// Creates a new recording service wrapping the given implementation.
    pub fn new(inner: Box<dyn ImageService>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageService for RecordingImageService {
    fn generate_mockup(&self, request: &MockupRequest) -> ServiceFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.generate_mockup(&request).await;
            record_result(&self.recorder, PORT, "generate_mockup", &request, &result);
            result
        })
    }

    fn place_logo(&self, request: &LogoPlacementRequest) -> ServiceFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.place_logo(&request).await;
            record_result(&self.recorder, PORT, "place_logo", &request, &result);
            result
        })
    }

    fn edit_image(&self, request: &EditRequest) -> ServiceFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.edit_image(&request).await;
            record_result(&self.recorder, PORT, "edit_image", &request, &result);
            result
        })
    }
}
