//! Drives the wizard: validates actions, calls the image service, and feeds
//! the outcomes into [`WizardState::apply`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use super::state::{Event, Step, WizardState};
use crate::error::MockupError;
use crate::payload::ImagePayload;
use crate::ports::{EditRequest, ImageService, LogoPlacementRequest, MockupRequest};
use crate::upload::read_image_file;

/// Owns the wizard state for one session.
///
/// At most one remote call runs at a time; submissions and resets that
/// arrive while one is in flight are rejected with [`MockupError::Busy`]
/// without touching the state. Failures of an accepted action are recorded
/// in [`WizardState::error`] and also returned.
pub struct WizardController {
    service: Box<dyn ImageService>,
    state: Mutex<WizardState>,
    in_flight: AtomicBool,
}

/// Holds the in-flight slot; released on drop.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl WizardController {
    /// Create a controller in the initial `GENERATE` step.
    #[must_use]
    pub fn new(service: Box<dyn ImageService>) -> Self {
        Self {
            service,
            state: Mutex::new(WizardState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> WizardState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Step 1: generate a mockup from a product description.
    ///
    /// # Errors
    ///
    /// Rejections (`Busy`, `WrongStep`, empty prompt) leave the state as is.
    /// Service failures are recorded and the wizard stays in `GENERATE`.
    pub async fn submit_prompt(&self, prompt: &str) -> Result<(), MockupError> {
        let _slot = self.claim()?;
        self.expect_step(Step::Generate, "generate a mockup")?;
        let prompt = non_empty(prompt, "prompt")?;

        self.update(Event::PromptSubmitted(prompt.clone()));
        self.update(Event::RequestStarted);
        tracing::info!(%prompt, "generating mockup");

        let result = async {
            let base64 = self.service.generate_mockup(&MockupRequest { prompt }).await?;
            ImagePayload::from_service(base64)
        }
        .await;

        match result {
            Ok(image) => {
                tracing::info!(mime = image.mime_type(), "mockup ready");
                self.update(Event::MockupGenerated(image));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Step 2: place the logo at `path` onto the mockup.
    ///
    /// # Errors
    ///
    /// Rejections leave the state as is. A non-image file is recorded as
    /// `InvalidFileType` without any remote call; service failures are
    /// recorded and the wizard stays in `UPLOAD`.
    pub async fn submit_logo(&self, path: &Path) -> Result<(), MockupError> {
        let _slot = self.claim()?;
        let current = self.expect_step(Step::Upload, "place a logo")?;
        let Some(mockup) = current.mockup_image else {
            return Err(MockupError::InvalidArgument("no mockup to place the logo on".into()));
        };

        let logo = match read_image_file(path) {
            Ok(logo) => logo,
            Err(e) => return Err(self.fail(e)),
        };
        self.update(Event::LogoLoaded(logo.clone()));
        self.update(Event::RequestStarted);
        tracing::info!(logo = %path.display(), mime = logo.mime_type(), "placing logo");

        let request = LogoPlacementRequest {
            mockup,
            logo,
            description: current.mockup_prompt.unwrap_or_default(),
        };
        let result = async {
            let base64 = self.service.place_logo(&request).await?;
            ImagePayload::from_service(base64)
        }
        .await;

        match result {
            Ok(image) => {
                self.update(Event::LogoPlaced(image));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Step 3: apply a free-text edit to the final image.
    ///
    /// # Errors
    ///
    /// Rejections leave the state as is. Service failures are recorded and
    /// the previous final image is kept.
    pub async fn submit_edit(&self, instruction: &str) -> Result<(), MockupError> {
        let _slot = self.claim()?;
        let current = self.expect_step(Step::Edit, "edit the image")?;
        let instruction = non_empty(instruction, "edit instruction")?;
        let Some(image) = current.final_image else {
            return Err(MockupError::InvalidArgument("no image to edit".into()));
        };

        self.update(Event::RequestStarted);
        tracing::info!(%instruction, "editing image");

        let request = EditRequest { image, instruction };
        let result = async {
            let base64 = self.service.edit_image(&request).await?;
            ImagePayload::from_service(base64)
        }
        .await;

        match result {
            Ok(image) => {
                self.update(Event::ImageEdited(image));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Start over from `GENERATE`.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while a request is in flight.
    pub fn reset(&self) -> Result<(), MockupError> {
        let _slot = self.claim()?;
        self.update(Event::Reset);
        tracing::info!("wizard reset");
        Ok(())
    }

    fn claim(&self) -> Result<InFlight<'_>, MockupError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MockupError::Busy)?;
        Ok(InFlight(&self.in_flight))
    }

    fn expect_step(
        &self,
        expected: Step,
        action: &'static str,
    ) -> Result<WizardState, MockupError> {
        let current = self.state();
        if current.step == expected {
            Ok(current)
        } else {
            Err(MockupError::WrongStep { action, expected, actual: current.step })
        }
    }

    fn update(&self, event: Event) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = std::mem::take(&mut *guard);
        *guard = current.apply(event);
    }

    fn fail(&self, error: MockupError) -> MockupError {
        tracing::error!("{error}");
        self.update(Event::Failed(error.to_string()));
        error
    }
}

fn non_empty(text: &str, what: &str) -> Result<String, MockupError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(MockupError::InvalidArgument(format!("{what} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}
