//! Album Sorter - renumber audio albums for simple players
//!
//! Copies an album's audio files into a destination with sequential,
//! naturally sorted, zero-padded names.

use album_sorter::process::{FileResult, ProcessingStatus};
use album_sorter::{Cli, Config, Error, Processor, RunOutcome};
use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Exit code for bad arguments or missing directories, same as clap's
const EXIT_USAGE: u8 = 2;

mod term {
    //! Styled lines for the run summary

    use crossterm::style::{Color, Stylize, style};

    pub const OK: Color = Color::Green;
    pub const WARN: Color = Color::Yellow;
    pub const FAIL: Color = Color::Red;
    pub const DIM: Color = Color::DarkGrey;
    pub const ACCENT: Color = Color::Cyan;

    pub fn rule() {
        println!("{}", "─".repeat(60));
    }

    pub fn stat(key: &str, value: impl std::fmt::Display, color: Color) {
        println!("  {}: {}", style(key).with(DIM), style(value).with(color).bold());
    }

    /// Colored marker, then `text`, then a dimmed `detail`
    pub fn mark(marker: &str, color: Color, text: &str, detail: &str) {
        println!(
            "  {} {} {}",
            style(marker).with(color).bold(),
            style(text).italic(),
            style(detail).with(DIM)
        );
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", Config::sample_config());
        return Ok(ExitCode::SUCCESS);
    }

    let log_path = log_path(&cli)?;
    let _guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Album Sorter starting");

    let config = load_config(&cli)?;
    if cli.verbose {
        info!(?config, "Configuration loaded");
    }

    if let Some(ref path) = cli.save_config {
        config.save_to_file(path)?;
        info!(config_file = %path.display(), "Configuration saved");
        println!("Configuration saved to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }
    info!(log_file = %log_path.display(), "Log file location");

    if let Err(msg) = validate_config(&config) {
        error!(%msg, "Invalid arguments");
        eprintln!("Error: {}", msg);
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    let dry_run = config.dry_run;
    let mut processor = Processor::new(config)?;

    match processor.run() {
        Ok(RunOutcome::EmptyAlbum) => {
            let source = processor.config().source_dir.display().to_string();
            term::mark("⚠", term::WARN, &source, "contains no audio files");
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::Completed(results)) => {
            print_summary(&processor, &results, cli.verbose, dry_run);
            term::rule();
            term::stat("Log file", log_path.display(), term::DIM);
            info!(log_file = %log_path.display(), "Processing complete. Log saved to");
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ Error::DestinationExists { .. }) => {
            error!(error = %e, "Refusing to overwrite");
            term::mark("✗", term::FAIL, &e.to_string(), "");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_summary(processor: &Processor, results: &[FileResult], verbose: bool, dry_run: bool) {
    let stats = processor.stats();
    term::rule();
    term::stat("Album", processor.album_dir().display(), term::ACCENT);
    term::stat("Copied", stats.copied, term::OK);
    term::stat("Failed", stats.failed, term::FAIL);
    if dry_run {
        term::stat("Planned", stats.planned, term::WARN);
    }
    println!();

    for result in results {
        let source = result.source.display().to_string();
        let dest = format!("→ {}", result.destination.display());
        match result.status {
            ProcessingStatus::Success if verbose => term::mark("✓", term::OK, &source, &dest),
            ProcessingStatus::DryRun => term::mark("~", term::ACCENT, &source, &dest),
            ProcessingStatus::Failed => {
                let msg = result.error.as_deref().unwrap_or("unknown error");
                term::mark("✗", term::FAIL, &source, msg);
            }
            _ => {}
        }
    }

    if dry_run {
        term::rule();
        term::mark("⚠", term::WARN, "Dry run", "nothing was created or copied");
    }
}

/// `Log/` next to the executable; one subdirectory per config file name
fn log_path(cli: &Cli) -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let log_dir = exe.parent().unwrap_or(Path::new(".")).join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    Ok(match cli.config_name() {
        Some(name) => log_dir.join(&name).join(format!("{name}_{timestamp}.log")),
        None => log_dir.join(format!("run_{timestamp}.log")),
    })
}

/// Read `--config` (trying `<path>.toml` when the bare path is missing)
/// and lay the CLI flags over it
fn load_config(cli: &Cli) -> Result<Config> {
    let Some(ref path) = cli.config else {
        return Ok(cli.to_config());
    };
    let path = if !path.exists() && path.extension().is_none() {
        path.with_extension("toml")
    } else {
        path.clone()
    };
    info!(config_file = %path.display(), "Loading configuration from file");
    Ok(cli.merge_with_config(Config::load_from_file(&path)?))
}

/// File log (plain or JSON) plus a stderr layer
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(log_path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let json = cli
        .json_log
        .then(|| fmt::layer().json().with_ansi(false).with_writer(writer.clone()));
    let plain = (!cli.json_log).then(|| fmt::layer().with_ansi(false).with_writer(writer));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(plain)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(guard)
}

/// Check that both directories were given and exist
fn validate_config(config: &Config) -> std::result::Result<(), String> {
    if config.source_dir.as_os_str().is_empty() || config.dest_dir.as_os_str().is_empty() {
        return Err("both SRC_DIR and DST_DIR are required".to_string());
    }
    if !config.source_dir.is_dir() {
        return Err(format!(
            "source directory does not exist: {}",
            config.source_dir.display()
        ));
    }
    if !config.dest_dir.is_dir() {
        return Err(format!(
            "destination directory does not exist: {}",
            config.dest_dir.display()
        ));
    }
    Ok(())
}
