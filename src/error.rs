//! Unified error type for the mockup wizard.

use thiserror::Error;

use crate::wizard::state::Step;

/// Errors that can occur while driving the wizard.
#[derive(Debug, Error)]
pub enum MockupError {
    /// The selected file does not declare an image content type.
    #[error("File is not an image: {name} ({content_type})")]
    InvalidFileType {
        /// The file name as given by the user.
        name: String,
        /// The declared content type, or `unknown`.
        content_type: String,
    },

    /// The text-to-image model returned zero images.
    #[error("Image generation failed. The response was empty.")]
    EmptyGenerationResult,

    /// The editing model answered without inline image data.
    #[error("{action} failed. The model did not return an image.")]
    NoImageReturned {
        /// Human-readable name of the operation.
        action: &'static str,
    },

    /// Returned data was not a decodable image.
    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// No API key configured.
    #[error("No API key configured. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: &'static str,
    },

    /// An action was submitted for a step that is not active.
    #[error("Cannot {action} during the {actual} step (expected {expected})")]
    WrongStep {
        /// The attempted action.
        action: &'static str,
        /// The step the action belongs to.
        expected: Step,
        /// The step the wizard is in.
        actual: Step,
    },

    /// Another request is still in flight.
    #[error("A request is already in progress; wait for it to finish")]
    Busy,
}

impl MockupError {
    /// True for errors raised before an action was accepted; these are
    /// never recorded in the wizard state.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Busy | Self::WrongStep { .. } | Self::InvalidArgument(_))
    }
}
