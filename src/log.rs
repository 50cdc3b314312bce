use anyhow::Result;
use chrono::Local;
use std::fmt;
use std::fs::File;
use tracing::level_filters::LevelFilter;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{filter::Targets, fmt as tracing_fmt, prelude::*, registry};

use crate::cli::Cli;
use crate::config::default::LOG_FILE_NAME;

/// Console timestamp: time of day with microseconds and offset.
pub struct LocalTimeOnly;

impl FormatTime for LocalTimeOnly {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%H:%M:%S%.6f%:z"))
    }
}

/// File timestamp: full local date and time.
pub struct LocalDateTime;

impl FormatTime for LocalDateTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.6f%:z"))
    }
}

/// Initialize the logger based on command-line arguments.
pub fn init_logger(cli_args: &Cli) -> Result<()> {
    let indicatif_layer = IndicatifLayer::new();

    // Console output shares stderr with the progress bars
    let console_fmt = tracing_fmt::layer()
        .with_target(false)
        .with_timer(LocalTimeOnly)
        .with_writer(indicatif_layer.get_stderr_writer());

    let level = cli_args.log_level.to_level_filter();
    let console_filter = Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("siip", level);

    if !cli_args.log_file {
        if cli_args.quiet || cli_args.no_stdout {
            registry()
                .with(indicatif_layer)
                .with(console_fmt.with_filter(LevelFilter::ERROR))
                .init();
        } else {
            registry()
                .with(indicatif_layer)
                .with(console_fmt.with_filter(console_filter))
                .init();
        }
        return Ok(());
    }

    let log_file_path = match &cli_args.log_file_path {
        Some(path) => path.clone(),
        None => crate::config::get_user_file_path(LOG_FILE_NAME)
            .ok_or_else(|| anyhow::anyhow!("failed to resolve log file path"))?,
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    let file_fmt = tracing_fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_timer(LocalDateTime)
        .with_writer(file);

    let file_filter = Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("siip", level);

    // screen stays at errors only in quiet mode, the file keeps the full level
    let screen_filter = if cli_args.quiet || cli_args.no_stdout {
        Targets::new().with_default(LevelFilter::ERROR)
    } else {
        console_filter
    };

    registry()
        .with(indicatif_layer)
        .with(console_fmt.with_filter(screen_filter))
        .with(file_fmt.with_filter(file_filter))
        .init();

    Ok(())
}
