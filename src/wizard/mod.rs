//! The three-step mockup wizard: `GENERATE → UPLOAD → EDIT`.

pub mod controller;
pub mod state;

pub use controller::WizardController;
pub use state::{Step, WizardState};
