use thiserror::Error;

/// Failures reported by a [`crate::storage::KeyValueStore`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by [`crate::preferences::PreferenceStore`] operations.
///
/// Validation variants are returned before any state is touched. A
/// `PersistenceWrite` is returned after the in-memory update already happened.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreferenceError {
    #[error("unknown theme `{0}`")]
    InvalidTheme(String),

    #[error("unsupported media type `{0}`, expected an image")]
    UnsupportedMedia(String),

    #[error("wallpaper is {size} bytes, the limit is {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("could not read wallpaper: {0}")]
    Decode(String),

    #[error("failed to persist `{key}`: {source}")]
    PersistenceWrite {
        key: &'static str,
        #[source]
        source: StorageError,
    },
}

impl PreferenceError {
    pub fn is_persistence(&self) -> bool {
        matches!(self, PreferenceError::PersistenceWrite { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse preference config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown default theme `{0}`")]
    UnknownTheme(String),
}
