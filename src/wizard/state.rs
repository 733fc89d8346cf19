//! Wizard state and its pure transition function.

use std::fmt;

use crate::payload::ImagePayload;

/// The three wizard steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    /// Describe the product and generate a mockup.
    #[default]
    Generate,
    /// Upload a logo to place on the mockup.
    Upload,
    /// Refine the composited image with free-text edits.
    Edit,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generate => "GENERATE",
            Self::Upload => "UPLOAD",
            Self::Edit => "EDIT",
        })
    }
}

/// Everything the views need to render the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    /// Active step.
    pub step: Step,
    /// Prompt the mockup was generated from.
    pub mockup_prompt: Option<String>,
    /// Generated mockup.
    pub mockup_image: Option<ImagePayload>,
    /// Uploaded logo.
    pub logo_image: Option<ImagePayload>,
    /// Composited (and possibly edited) result.
    pub final_image: Option<ImagePayload>,
    /// A remote call is in flight.
    pub loading: bool,
    /// Message of the last failure, cleared on the next submission.
    pub error: Option<String>,
}

/// Things that happen to the wizard.
#[derive(Debug, Clone)]
pub enum Event {
    /// A mockup prompt was accepted.
    PromptSubmitted(String),
    /// A remote call started.
    RequestStarted,
    /// The mockup came back.
    MockupGenerated(ImagePayload),
    /// The logo file was converted.
    LogoLoaded(ImagePayload),
    /// The logo was composited onto the mockup.
    LogoPlaced(ImagePayload),
    /// An edit was applied to the final image.
    ImageEdited(ImagePayload),
    /// The last action failed.
    Failed(String),
    /// Start over.
    Reset,
}

impl WizardState {
    /// Apply an event, producing the next state.
    #[must_use]
    pub fn apply(self, event: Event) -> Self {
        match event {
            Event::PromptSubmitted(prompt) => Self { mockup_prompt: Some(prompt), ..self },
            Event::RequestStarted => Self { loading: true, error: None, ..self },
            Event::MockupGenerated(image) => Self {
                step: Step::Upload,
                mockup_image: Some(image),
                loading: false,
                ..self
            },
            Event::LogoLoaded(image) => Self { logo_image: Some(image), error: None, ..self },
            Event::LogoPlaced(image) => Self {
                step: Step::Edit,
                final_image: Some(image),
                loading: false,
                ..self
            },
            Event::ImageEdited(image) => Self { final_image: Some(image), loading: false, ..self },
            Event::Failed(message) => Self { loading: false, error: Some(message), ..self },
            Event::Reset => Self::default(),
        }
    }

    /// The image the active step is showing, if any.
    #[must_use]
    pub fn current_image(&self) -> Option<&ImagePayload> {
        match self.step {
            Step::Generate => None,
            Step::Upload => self.mockup_image.as_ref(),
            Step::Edit => self.final_image.as_ref(),
        }
    }
}
