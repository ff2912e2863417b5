//! Logging context for a harness run.
//!
//! [`Logging`] owns a `tracing` dispatcher writing either to stderr or to a
//! freshly truncated log file. Code runs under it through
//! [`Logging::in_scope`]; no global subscriber is installed.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt as tracing_fmt, layer::SubscriberExt};

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    #[default]
    Info,
    Debug,
}

impl DebugLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DebugLevel::Info => "INFO",
            DebugLevel::Debug => "DEBUG",
        }
    }

    fn directive(self) -> &'static str {
        match self {
            DebugLevel::Info => "info",
            DebugLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Debug level must be INFO or DEBUG, got '{0}'")]
pub struct InvalidDebugLevel(pub String);

impl FromStr for DebugLevel {
    type Err = InvalidDebugLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(DebugLevel::Info),
            "DEBUG" => Ok(DebugLevel::Debug),
            _ => Err(InvalidDebugLevel(s.to_string())),
        }
    }
}

pub struct Logging {
    dispatch: Dispatch,
    level: DebugLevel,
    file_guard: Option<WorkerGuard>,
}

impl Logging {
    /// Builds the logging context.
    ///
    /// With `log_file` set the file is created (or truncated) and written
    /// through a non-blocking appender; otherwise output goes to stderr.
    pub fn new(level: DebugLevel, log_file: Option<&Path>) -> std::io::Result<Self> {
        let filter = EnvFilter::new(level.directive());

        let (dispatch, file_guard) = match log_file {
            Some(path) => {
                let file = File::create(path)?;
                let (non_blocking_file, guard) = tracing_appender::non_blocking(file);
                let file_layer = tracing_fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(non_blocking_file)
                    .with_filter(filter);
                let subscriber = tracing_subscriber::registry().with(file_layer);
                (Dispatch::new(subscriber), Some(guard))
            }
            None => {
                let stderr_layer = tracing_fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stderr)
                    .with_filter(filter);
                let subscriber = tracing_subscriber::registry().with(stderr_layer);
                (Dispatch::new(subscriber), None)
            }
        };

        Ok(Self {
            dispatch,
            level,
            file_guard,
        })
    }

    pub fn level(&self) -> DebugLevel {
        self.level
    }

    /// Runs `f` with this context as the active dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging")
            .field("level", &self.level)
            .field("to_file", &self.file_guard.is_some())
            .finish()
    }
}
