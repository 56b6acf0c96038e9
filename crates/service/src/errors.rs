use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("cannot parse stored value of \"{key}\": {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
