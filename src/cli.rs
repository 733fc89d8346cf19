//! CLI argument parsing with clap.

use clap::Parser;

/// Product mockup wizard: generate a mockup, place your logo, refine it with edits.
///
/// Without `--prompt` the wizard runs interactively on stdin.
#[derive(Parser, Debug)]
#[command(name = "mockup", version, about)]
pub struct Cli {
    /// Product description for the mockup (runs the wizard non-interactively).
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Logo image to place on the mockup.
    #[arg(short, long, requires = "prompt")]
    pub logo: Option<String>,

    /// Edit instruction to apply after the logo is placed (repeatable).
    #[arg(short, long = "edit", requires = "logo")]
    pub edits: Vec<String>,

    /// Text-to-image model name or alias.
    #[arg(long)]
    pub generate_model: Option<String>,

    /// Image-editing model name or alias.
    #[arg(long)]
    pub edit_model: Option<String>,

    /// Output format: jpeg, png, webp.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Directory for saved images.
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
