use std::path::PathBuf;

use thiserror::Error;

use crate::durable::WriteError;
use crate::remote::error::RemoteError;

/// Any failure that ends a mirror run
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Failed to read index file {path}: {source}")]
    ReadIndex {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode index file {path}: {source}")]
    DecodeIndex {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode index: {0}")]
    EncodeIndex(serde_json::Error),

    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
