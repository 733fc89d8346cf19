//! Service context that bundles the image service port.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::{ClientSettings, GeminiClient};
use crate::adapters::recording::image_service::RecordingImageService;
use crate::adapters::replaying::image_service::ReplayingImageService;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::API_KEY_VARS;
use crate::error::MockupError;
use crate::ports::ImageService;

/// Holds the image service the wizard talks to.
pub struct ServiceContext {
    /// Image service port.
    pub service: Box<dyn ImageService>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the service still holds the recorder or the
    /// cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context.
    ///
    /// A missing API key is only a warning here; the first call fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the generation model is not recognized.
    pub fn live(settings: ClientSettings) -> Result<Self, MockupError> {
        if settings.api_key.is_none() {
            tracing::warn!(
                "no API key set ({}); requests will fail until one is configured",
                API_KEY_VARS.join(" or ")
            );
        }
        tracing::debug!(
            generate = %settings.generate_model,
            edit = %settings.edit_model,
            "using live image service"
        );
        Ok(Self { service: Box::new(GeminiClient::new(settings)?) })
    }

    /// Create a recording context that wraps the live client with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live client cannot be created.
    pub fn recording(settings: ClientSettings) -> Result<(Self, RecordingSession), MockupError> {
        let live_ctx = Self::live(settings)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".mockup/cassettes")
            .join(&timestamp)
            .join("image_service.cassette.yaml");

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-image_service"),
            get_commit_hash(),
        )));

        let service = RecordingImageService::new(live_ctx.service, Arc::clone(&recorder));
        Ok((Self { service: Box::new(service) }, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, MockupError> {
        let replayer = load_cassette(path)
            .map_err(|e| MockupError::Config(format!("Failed to load cassette: {e}")))?;
        let service = ReplayingImageService::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { service: Box::new(service) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
