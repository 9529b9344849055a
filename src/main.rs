// src/main.rs
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use moji_export::{
    AppError, CommandLineInput, ExportConfig, ExportPipeline, MojiHttpClient, RunOutcome,
};
use std::fs;
use std::io::Write;
use std::process::ExitCode;

/// Sets up logging configuration.
///
/// The console appender writes to stderr so streamed records on stdout
/// stay clean.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("moji_export.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)
        .with_context(|| format!("opening log file {}", log_file_path.display()))?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stderr", Box::new(stderr_appender)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(LevelFilter::Debug),
        )?;

    log4rs::init_config(config).context("installing logger")?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Resolves configuration and runs the export.
async fn execute(cli: CommandLineInput) -> Result<(), AppError> {
    let config = ExportConfig::resolve(cli)?;
    log::debug!("Session token: {}", config.session.session_token);

    let client = MojiHttpClient::new(config.session.clone(), config.timeout)?;
    let pipeline = ExportPipeline::new(&config, &client);

    match pipeline.run().await? {
        RunOutcome::ItemTargets(targets) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(targets.render()?.as_bytes())?;
            stdout.flush()?;
        }
        RunOutcome::Export(summary) => {
            if summary.report.accepted == 0 {
                log::warn!("No items exported.");
            }
            if summary.report.stopped_early {
                log::info!("Stopped early after reaching --expected.");
            }
        }
    }
    Ok(())
}

/// Logs a fatal error, printing the raw envelope when one is attached.
fn report_failure(err: &AppError) {
    log::error!("{}", err);
    if let Some(envelope) = err.diagnostic_envelope() {
        let pretty =
            serde_json::to_string_pretty(envelope).unwrap_or_else(|_| envelope.to_string());
        eprintln!("{}", pretty);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CommandLineInput::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::from(err.exit_code())
        }
    }
}
