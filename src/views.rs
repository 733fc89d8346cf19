//! Terminal step views: rendering and input parsing, nothing else.

use std::fmt::Write as _;

use crate::payload::ImagePayload;
use crate::wizard::{Step, WizardState};

/// Used when step 1 is submitted empty.
pub const DEFAULT_PROMPT: &str =
    "A high-quality photo of a blank white t-shirt on a hanger against a clean wall";

/// Selectable with `:1`, `:2`, `:3` in step 1.
pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "A black coffee mug on a rustic wooden table",
    "A canvas tote bag lying on a sandy beach",
    "A white baseball cap, front view",
];

/// Command summary shown by `:help`.
pub const HELP: &str = "\
Commands:
  <text>        submit for the current step
  :1 :2 :3      use an example prompt (step 1)
  :save [path]  save the current image
  :reset        start over
  :help         show this help
  :quit         exit";

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text for the active step's form.
    Submit(String),
    /// Use example prompt N (1-based).
    Example(usize),
    /// Save the current image, optionally to an explicit path.
    Save(Option<String>),
    /// Start over.
    Reset,
    /// Show help.
    Help,
    /// Leave the wizard.
    Quit,
    /// A `:` command that isn't recognized.
    Unknown(String),
}

/// Parse one input line.
#[must_use]
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Submit(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    match name {
        "q" | "quit" | "exit" => Command::Quit,
        "r" | "reset" => Command::Reset,
        "h" | "help" => Command::Help,
        "s" | "save" => Command::Save(arg.map(String::from)),
        n => match n.parse::<usize>() {
            Ok(i) if (1..=EXAMPLE_PROMPTS.len()).contains(&i) => Command::Example(i),
            _ => Command::Unknown(line.to_string()),
        },
    }
}

/// Render the active step, with any error shown above its form.
#[must_use]
pub fn render(state: &WizardState) -> String {
    let mut out = String::new();
    let (title, blurb) = match state.step {
        Step::Generate => (
            "Step 1: Create Your Mockup",
            "Describe the product you want to create a mockup for.",
        ),
        Step::Upload => {
            ("Step 2: Add Your Logo", "Upload a logo to place on your generated mockup.")
        }
        Step::Edit => {
            ("Step 3: Final Edits", "Use text to make final adjustments to your mockup.")
        }
    };
    let _ = writeln!(out, "\n=== {title} ===");
    let _ = writeln!(out, "{blurb}");

    if let Some(error) = &state.error {
        let _ = writeln!(out, "\nError: {error}");
    }
    out.push('\n');

    match state.step {
        Step::Generate => {
            let _ = writeln!(out, "Examples:");
            for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
                let _ = writeln!(out, "  :{}  {example}", i + 1);
            }
            let _ = writeln!(out, "Enter a description (blank for: \"{DEFAULT_PROMPT}\").");
        }
        Step::Upload => {
            if let Some(mockup) = &state.mockup_image {
                let _ = writeln!(out, "Your mockup: {}", describe_image(mockup));
            }
            if let Some(logo) = &state.logo_image {
                let _ = writeln!(out, "Last logo: {}", describe_image(logo));
            }
            let _ = writeln!(
                out,
                "Enter the path to a logo image (PNG with transparency recommended)."
            );
        }
        Step::Edit => {
            if let Some(image) = &state.final_image {
                let _ = writeln!(out, "Final mockup with logo: {}", describe_image(image));
            }
            if let Some(logo) = &state.logo_image {
                let _ = writeln!(out, "Logo: {}", describe_image(logo));
            }
            let _ = writeln!(
                out,
                "Enter an edit, e.g. \"Add a retro filter\" or \
                 \"Change the background to a sunny park\"."
            );
            let _ = writeln!(out, "Type :reset to start over.");
        }
    }
    out.push_str("> ");
    out
}

/// Status line shown while a request is in flight.
#[must_use]
pub fn progress(state: &WizardState) -> Option<&'static str> {
    if !state.loading {
        return None;
    }
    Some(match state.step {
        Step::Generate => "Working: generating your mockup...",
        Step::Upload => "Working: placing your logo...",
        Step::Edit => "Working: applying your edit...",
    })
}

/// One-line summary of an image: type, size and the start of its data URI.
#[must_use]
pub fn describe_image(image: &ImagePayload) -> String {
    let url: String = image.url().chars().take(48).collect();
    format!("{} ({} KB) {url}...", image.mime_type(), image.byte_len().div_ceil(1024))
}
