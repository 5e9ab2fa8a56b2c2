//! Logging setup: colourised console output plus a rolling log file
//!
//! Both sinks share the `timestamp | LEVEL | message` layout; only the
//! console gets colours. The filter comes from `RUST_LOG` and defaults to
//! `info`.

mod rolling;

pub use rolling::RollingLogger;

use colored::Colorize;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Default log file location, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "log/create_all_tables.log";

/// Rotate the log file once it reaches 10 MB
pub const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Keep rotated log files for 10 days
pub const LOG_RETENTION: Duration = Duration::from_secs(60 * 60 * 24 * 10);

/// `YYYY-MM-DD HH:MM:SS | LEVEL    | message`
pub struct PipeFormat;

impl<S, N> FormatEvent<S, N> for PipeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let level = *event.metadata().level();
        let padded = format!("{:<8}", level.as_str());

        if writer.has_ansi_escapes() {
            write!(writer, "{} | {} | ", timestamp.green(), paint(level, &padded))?;
        } else {
            write!(writer, "{} | {} | ", timestamp, padded)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn paint(level: Level, text: &str) -> colored::ColoredString {
    match level {
        Level::ERROR => text.red().bold(),
        Level::WARN => text.yellow().bold(),
        Level::INFO => text.bold(),
        Level::DEBUG => text.blue().bold(),
        _ => text.cyan().bold(),
    }
}

/// Install the global subscriber
pub fn init(log_file: &Path) -> anyhow::Result<()> {
    let file = RollingLogger::new(log_file, MAX_LOG_SIZE, LOG_RETENTION)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file.display(), e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PipeFormat)
                .with_writer(std::io::stdout),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PipeFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_lines_use_pipe_layout_without_colours() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let file = RollingLogger::new(&path, MAX_LOG_SIZE, LOG_RETENTION).unwrap();

        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(PipeFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Environment variable {} is not set.", "GCP_REGION");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let line = contents.lines().next().unwrap();
        let parts: Vec<&str> = line.split(" | ").collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), "2024-01-01 00:00:00".len());
        assert_eq!(parts[1], "WARN    ");
        assert_eq!(parts[2], "Environment variable GCP_REGION is not set.");
        assert!(!line.contains('\u{1b}'));
    }
}
