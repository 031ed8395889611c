//! Tracing subscriber bootstrap for host applications
//!
//! The engine only emits `tracing` events. A host that wants them on the
//! console (and optionally in a daily-rolling file) calls [`init`] once.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for `memsim.log.*`; console only when `None`
    pub log_dir: Option<PathBuf>,
    pub ansi: bool,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            ansi: true,
            json: false,
        }
    }
}

/// Parse a level name, falling back to INFO.
pub fn parse_level(level: &str) -> tracing::Level {
    level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO)
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for as long as file output should be
/// flushed. Fails if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(parse_level(&config.level).into());

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "memsim.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let console_layer = if config.json {
        fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(config.ansi)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("WARN"), tracing::Level::WARN);
        assert_eq!(parse_level("verbose"), tracing::Level::INFO);
    }

    #[test]
    fn test_default_config_is_console_only() {
        let config = LoggingConfig::default();
        assert!(config.log_dir.is_none());
        assert_eq!(config.level, "info");
    }
}
