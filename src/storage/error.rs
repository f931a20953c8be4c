use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("value for key {key} could not be encoded: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },

    #[error("storage is read-only")]
    ReadOnly,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
