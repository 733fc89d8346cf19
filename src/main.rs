//! Mockup wizard - generate a product mockup, place a logo, refine with edits.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod model;
mod output;
mod payload;
mod ports;
mod session;
mod upload;
mod views;
mod wizard;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::adapters::live::gemini::ClientSettings;
use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::MockupError;
use crate::model::{detect_family, resolve_model, validate_edit_model};
use crate::output::validate_format;
use crate::session::{run_batch, run_interactive, BatchPlan, SaveOptions};
use crate::wizard::WizardController;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mockup_wizard=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<(), MockupError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(MockupError::Config)?;

    // Resolve and validate models before anything touches the network
    let generate_model =
        resolve_model(cli.generate_model.as_deref().unwrap_or(&config.models.generate));
    detect_family(&generate_model).map_err(MockupError::InvalidArgument)?;
    let edit_model = resolve_model(cli.edit_model.as_deref().unwrap_or(&config.models.edit));
    validate_edit_model(&edit_model).map_err(MockupError::InvalidArgument)?;

    let format = cli.format.clone().unwrap_or_else(|| config.output.format.clone());
    validate_format(&format).map_err(MockupError::InvalidArgument)?;
    let save = SaveOptions {
        dir: cli.output_dir.as_deref().map_or_else(|| config.output.dir.clone(), PathBuf::from),
        format,
    };

    tracing::debug!(
        %generate_model,
        %edit_model,
        config = %config_path.display(),
        "resolved settings"
    );

    let settings = ClientSettings {
        api_key: config.api_key(),
        api_base: config.api.base_url.trim_end_matches('/').to_string(),
        generate_model,
        edit_model,
    };

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("MOCKUP_REPLAY").ok();
    let is_recording = std::env::var("MOCKUP_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::info!(cassette = %cassette_path, "replaying");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        tracing::info!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(settings)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(settings)?, None)
    };

    let controller = WizardController::new(ctx.service);

    let result = match cli.prompt {
        Some(prompt) => {
            let plan = BatchPlan { prompt, logo: cli.logo.map(PathBuf::from), edits: cli.edits };
            run_batch(&controller, &plan, &save).await
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_interactive(&controller, stdin, &mut std::io::stdout(), &save).await
        }
    };

    // The recorder is shared with the service; release it before finishing.
    drop(controller);
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => tracing::warn!("failed to save cassette: {e}"),
        }
    }

    result
}
