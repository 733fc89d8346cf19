//! Drives a [`WizardController`] from stdin lines or from CLI flags.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::MockupError;
use crate::output::{format_for_path, resolve_output_path, save_payload, stage_label};
use crate::views::{self, Command, DEFAULT_PROMPT, EXAMPLE_PROMPTS};
use crate::wizard::{Step, WizardController};

/// Where images are written after each successful step.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Output directory.
    pub dir: PathBuf,
    /// Target format: jpeg, png or webp.
    pub format: String,
}

/// Inputs for a non-interactive run.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    /// Mockup description.
    pub prompt: String,
    /// Logo file, if the run should go past step 1.
    pub logo: Option<PathBuf>,
    /// Edits applied in order after the logo is placed.
    pub edits: Vec<String>,
}

/// Run every step in `plan`, stopping at the first failure.
///
/// # Errors
///
/// Returns the first step's error, or a save failure.
pub async fn run_batch(
    controller: &WizardController,
    plan: &BatchPlan,
    save: &SaveOptions,
) -> Result<(), MockupError> {
    controller.submit_prompt(&plan.prompt).await?;
    save_current(controller, save, None)?;

    let Some(logo) = &plan.logo else {
        return Ok(());
    };
    controller.submit_logo(logo).await?;
    save_current(controller, save, None)?;

    for edit in &plan.edits {
        controller.submit_edit(edit).await?;
        save_current(controller, save, None)?;
    }
    Ok(())
}

/// Read commands line by line until `:quit` or end of input.
///
/// Step failures are shown and the loop continues; only I/O errors on
/// `input`/`out` end the session early.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run_interactive<R, W>(
    controller: &WizardController,
    input: R,
    out: &mut W,
    save: &SaveOptions,
) -> Result<(), MockupError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}", views::render(&controller.state()))?;
    out.flush()?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match views::parse_command(&line) {
            Command::Quit => break,
            Command::Help => writeln!(out, "{}", views::HELP)?,
            Command::Unknown(cmd) => writeln!(out, "Unknown command '{cmd}'. Type :help.")?,
            Command::Reset => {
                if let Err(e) = controller.reset() {
                    writeln!(out, "{e}")?;
                }
            }
            Command::Save(path) => {
                if let Err(e) = save_current(controller, save, path.as_deref()) {
                    writeln!(out, "Could not save: {e}")?;
                }
            }
            Command::Example(n) => {
                if controller.state().step == Step::Generate {
                    submit(controller, EXAMPLE_PROMPTS[n - 1], out, save).await?;
                } else {
                    writeln!(out, "Example prompts apply to step 1 only.")?;
                }
            }
            Command::Submit(text) => submit(controller, &text, out, save).await?,
        }
        write!(out, "{}", views::render(&controller.state()))?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

/// Forward text to the active step's action.
async fn submit<W: Write>(
    controller: &WizardController,
    text: &str,
    out: &mut W,
    save: &SaveOptions,
) -> Result<(), MockupError> {
    let result = match controller.state().step {
        Step::Generate => {
            let prompt = if text.is_empty() { DEFAULT_PROMPT } else { text };
            with_progress(controller, controller.submit_prompt(prompt), out).await?
        }
        Step::Upload => {
            with_progress(controller, controller.submit_logo(Path::new(text)), out).await?
        }
        Step::Edit => with_progress(controller, controller.submit_edit(text), out).await?,
    };

    match result {
        Ok(()) => {
            if let Err(e) = save_current(controller, save, None) {
                writeln!(out, "Could not save: {e}")?;
            }
        }
        // Accepted failures already sit in the state and show in the banner.
        Err(e) if e.is_rejection() => writeln!(out, "{e}")?,
        Err(_) => {}
    }
    Ok(())
}

/// Drive `work` and, once it has started its request, print the progress
/// line. Requests that finish without suspending print nothing.
async fn with_progress<W, F>(
    controller: &WizardController,
    work: F,
    out: &mut W,
) -> Result<Result<(), MockupError>, MockupError>
where
    W: Write,
    F: Future<Output = Result<(), MockupError>>,
{
    let (result, shown) = tokio::join!(work, async {
        tokio::task::yield_now().await;
        if let Some(line) = views::progress(&controller.state()) {
            writeln!(out, "{line}")?;
            out.flush()?;
        }
        Ok::<(), MockupError>(())
    });
    shown?;
    Ok(result)
}

/// Save the image the active step shows.
fn save_current(
    controller: &WizardController,
    save: &SaveOptions,
    explicit: Option<&str>,
) -> Result<PathBuf, MockupError> {
    let state = controller.state();
    let image = state
        .current_image()
        .ok_or_else(|| MockupError::InvalidArgument("no image to save yet".into()))?;
    let prompt = state.mockup_prompt.as_deref().unwrap_or_default();
    let path =
        resolve_output_path(explicit, &save.dir, prompt, stage_label(state.step), &save.format);
    let format = format_for_path(&path, &save.format);

    save_payload(image, format, &path)?;
    eprintln!("Saved: {}", path.display());
    Ok(path)
}
