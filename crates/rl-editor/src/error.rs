//! Error types. Every one of them is recoverable: commands report them as
//! notices and leave the editor in a consistent state.

use thiserror::Error;

/// Why an external asset could not be turned into a visual.
#[derive(Debug, Error)]
pub enum AssetLoadCause {
    #[error("fetch failed: {0}")]
    Fetch(#[from] std::io::Error),

    #[error("invalid glTF: {0}")]
    Parse(#[from] gltf::Error),

    #[error("no scene with renderable nodes")]
    EmptyScene,
}

/// Resolving an `AssetRef` failed. Carries the url so the caller can report
/// it and pick a substitute.
#[derive(Debug, Error)]
#[error("failed to load asset {url}: {cause}")]
pub struct AssetLoadError {
    pub url: String,
    #[source]
    pub cause: AssetLoadCause,
}

impl AssetLoadError {
    pub fn new(url: impl Into<String>, cause: impl Into<AssetLoadCause>) -> Self {
        Self {
            url: url.into(),
            cause: cause.into(),
        }
    }
}

/// The durable store rejected a read or write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store key {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no item is selected")]
    EmptySelection,

    #[error("no saved layout found")]
    NoSnapshot,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("saved layout is unreadable: {0}")]
    Snapshot(#[from] serde_json::Error),
}
