use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use remix_archive::{PayloadProvider, TranscodeReport};
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::App;
use crate::config::{CompressionSetting, RemixConfig};
use crate::templates::TemplateProvider;
use crate::tracker::ProgressTracker;

mod cli;
mod config;
mod templates;
mod tracker;

/// Exit code for a run that failed on its input or output.
const EXIT_RUN_FAILED: u8 = 1;
/// Exit code when the configuration or templates cannot be loaded.
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ftl_remix=info,remix_archive=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app = App::parse();

    // Configuration and templates are loaded once; without them no run can succeed.
    let (config, payloads) = match load(&app) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error loading mod resources: {e:#}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    if app.print_config {
        return match toml::to_string_pretty(&config) {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::from(EXIT_FATAL)
            }
        };
    }

    match run(&app, &config, &payloads) {
        Ok(report) => {
            println!(
                "Wrote {} ({} tracks, {} bytes)",
                report.output.display(),
                report.tracks.len(),
                report.total_bytes
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("{e:#}");
            ExitCode::from(EXIT_RUN_FAILED)
        }
    }
}

fn load(app: &App) -> anyhow::Result<(RemixConfig, Vec<Box<dyn remix_archive::ConfigPayload>>)> {
    let mut config = RemixConfig::load(app.config.as_deref()).context("failed to load configuration")?;
    if app.stored {
        config.compression = CompressionSetting::Stored;
    }
    // Fail on a bad pattern now rather than on the first run.
    config.filter()?;

    let payloads = TemplateProvider::new(config.payloads.clone())
        .load()
        .context("failed to load configuration templates")?;
    Ok((config, payloads))
}

fn run(
    app: &App,
    config: &RemixConfig,
    payloads: &[Box<dyn remix_archive::ConfigPayload>],
) -> anyhow::Result<TranscodeReport> {
    cli::validate_input(&app.input)?;
    let output: PathBuf = app
        .output
        .clone()
        .unwrap_or_else(|| config.default_output(&app.input));

    let tracker = if app.quiet {
        ProgressTracker::hidden()
    } else {
        ProgressTracker::new(config.expected_entries)
    };
    let options = config.transcode_options()?.on_progress(tracker.callback());

    let result = remix_archive::transcode(&app.input, &output, payloads, &options);
    if result.is_err() {
        tracker.abandon();
    }
    Ok(result?)
}
