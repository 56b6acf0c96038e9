//! Shared building blocks: the application error, labelled logging and small
//! formatting helpers used by the storage and request layers.

pub mod errors;
pub mod utils;

pub use errors::{report_error, AppError, BoxError};
pub use utils::logging::{LogLevel, Logger};
