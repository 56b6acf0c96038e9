//! Application error shared by every helper crate.
//!
//! An [`AppError`] carries the user-facing message plus whatever a developer
//! needs to track the failure down: the triggering error, the label of the
//! entity that failed, a developer message, a status code and extra context.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Name used as the level tag of reported errors.
pub const ERROR_TAG: &str = "APPERROR";

#[derive(Error)]
#[error("{message}")]
pub struct AppError {
    message: String,
    #[source]
    parent: Option<BoxError>,
    label: Option<String>,
    dev_message: Option<String>,
    status: Option<u16>,
    extra: BTreeMap<String, Value>,
    trace: Option<Box<Backtrace>>,
}

impl AppError {
    /// Build an error with a user-facing message.
    ///
    /// A backtrace is kept only when the runtime captured one
    /// (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
    pub fn new(message: impl Into<String>) -> Self {
        let trace = Backtrace::capture();
        Self {
            message: message.into(),
            parent: None,
            label: None,
            dev_message: None,
            status: None,
            extra: BTreeMap::new(),
            trace: (trace.status() == BacktraceStatus::Captured).then(|| Box::new(trace)),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<BoxError>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_dev_message(mut self, dev_message: impl Into<String>) -> Self {
        self.dev_message = Some(dev_message.into());
        self
    }

    /// Explicit status; `0` counts as unset.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = (status != 0).then_some(status);
        self
    }

    /// Attach a named piece of context. Values that cannot be serialized are
    /// stored as a string describing the failure.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|e| Value::String(format!("<unserializable: {e}>")));
        self.extra.insert(key.into(), value);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn dev_message(&self) -> Option<&str> {
        self.dev_message.as_deref()
    }

    /// Explicit status, else the status of a parent `AppError`, else `0`.
    pub fn status(&self) -> u16 {
        self.status
            .or_else(|| {
                self.parent
                    .as_deref()
                    .and_then(|p| p.downcast_ref::<AppError>())
                    .map(AppError::status)
                    .filter(|s| *s != 0)
            })
            .unwrap_or(0)
    }

    pub fn parent(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.parent.as_deref()
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn extras(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.trace.as_deref()
    }

    /// Single-line rendering used when the error is reported:
    /// `APPERROR [label]:  message -> dev message -> status`.
    pub fn log_line(&self) -> String {
        let mut line = String::from(ERROR_TAG);
        match &self.label {
            Some(label) => line.push_str(&format!(" [{label}]:  ")),
            None => line.push_str(":  "),
        }
        line.push_str(&self.message);
        if let Some(dev) = &self.dev_message {
            line.push_str(&format!(" -> {dev}"));
        }
        let status = self.status();
        if status != 0 {
            line.push_str(&format!(" -> {status}"));
        }
        line
    }

    /// Write the error to the warning sink and hand it back.
    pub fn report(self) -> Self {
        let line = self.log_line();
        let extra = Value::Object(self.extra.clone().into_iter().collect());
        match &self.parent {
            Some(parent) => warn!(parent_error = %parent, extra = %extra, "{line}"),
            None => warn!(extra = %extra, "{line}"),
        }
        self
    }
}

/// Free-function form of [`AppError::report`].
pub fn report_error(err: AppError) -> AppError {
    err.report()
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("message", &self.message)
            .field("label", &self.label)
            .field("dev_message", &self.dev_message)
            .field("status", &self.status())
            .field("parent", &self.parent)
            .field("extra", &self.extra)
            .finish()
    }
}
