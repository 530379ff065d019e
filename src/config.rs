use std::path::{Path, PathBuf};

use thiserror::Error;

// =============================================================================
// Remote listing constants
// =============================================================================

/// Default base URL for the GitHub REST API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Releases requested per listing page
pub const RELEASES_PER_PAGE: u32 = 10;

/// Assets requested per listing page
pub const ASSETS_PER_PAGE: u32 = 10;

// =============================================================================
// Output layout constants
// =============================================================================

/// Name of the index file inside the output directory
pub const INDEX_FILE_NAME: &str = "index.json";

/// Permission bits of the index file
pub const INDEX_FILE_MODE: u32 = 0o666;

/// User agent sent with every request
pub fn user_agent() -> String {
    format!("release-mirror/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read GitHub access token from {path}: {source}")]
    ReadToken {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("GitHub access token file {0} is empty")]
    EmptyToken(PathBuf),
}

/// Resolved settings for one mirror run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub output_dir: PathBuf,
    pub token: String,
}

impl MirrorConfig {
    pub fn index_path(&self) -> PathBuf {
        index_path(&self.output_dir)
    }
}

/// Read an access token from `path`, trimming surrounding whitespace.
pub fn read_token(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadToken {
        path: path.to_path_buf(),
        source,
    })?;
    let token = raw.trim();
    if token.is_empty() {
        return Err(ConfigError::EmptyToken(path.to_path_buf()));
    }
    Ok(token.to_string())
}

/// `<output_dir>/index.json`
pub fn index_path(output_dir: &Path) -> PathBuf {
    output_dir.join(INDEX_FILE_NAME)
}

/// `<output_dir>/<tag>`
pub fn release_dir(output_dir: &Path, tag: &str) -> PathBuf {
    output_dir.join(tag)
}

/// `<output_dir>/<tag>/<asset_name>`
pub fn asset_path(output_dir: &Path, tag: &str, asset_name: &str) -> PathBuf {
    release_dir(output_dir, tag).join(asset_name)
}
