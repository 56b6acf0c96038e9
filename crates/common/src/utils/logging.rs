use std::fmt;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::{fmt as sub_fmt, EnvFilter};

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info`
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = sub_fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, defaults to `info` and `service::http=debug`
pub fn init_logging_json() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,service::http=debug"));
    let _ = sub_fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Pick the subscriber by the configured format name (`json` or anything else
/// for the compact default).
pub fn init_logging(format: &str) {
    if format.eq_ignore_ascii_case("json") {
        init_logging_json();
    } else {
        init_logging_default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl From<&str> for LogLevel {
    /// Unknown names log at info level.
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Logger bound to a level and an optional label.
///
/// Every line is prefixed with `LEVEL [label]:  ` (or `LEVEL:  ` when no
/// label is set). `Warn` goes to the warning sink, every other level to the
/// standard one; the level survives in the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    level: LogLevel,
    label: Option<String>,
}

impl Logger {
    /// An empty label is treated as no label.
    pub fn new(level: LogLevel, label: impl Into<String>) -> Self {
        let label = label.into();
        Self { level, label: (!label.is_empty()).then_some(label) }
    }

    pub fn unlabelled(level: LogLevel) -> Self {
        Self { level, label: None }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn prefix(&self) -> String {
        match &self.label {
            Some(label) => format!("{} [{}]:  ", self.level.tag(), label),
            None => format!("{}:  ", self.level.tag()),
        }
    }

    pub fn format(&self, msg: impl fmt::Display) -> String {
        format!("{}{}", self.prefix(), msg)
    }

    pub fn log(&self, msg: impl fmt::Display) {
        let line = self.format(msg);
        match self.level {
            LogLevel::Warn => warn!("{line}"),
            LogLevel::Debug | LogLevel::Info | LogLevel::Error => info!("{line}"),
        }
    }
}
