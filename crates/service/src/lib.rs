//! Client-side services: key/value storage with JSON helpers and the API
//! request wrapper.

pub mod errors;
pub mod http;
pub mod storage;

pub use errors::StorageError;
pub use http::{ApiClient, RequestDescriptor, ResponseSummary};
pub use storage::{FileStore, KvStore, MemoryStore, Storage};
