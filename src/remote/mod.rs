//! Remote release host access
//!
//! # Modules
//!
//! - [`source`]: `ReleaseSource` / `AssetFetcher` traits and page walking
//! - [`github`]: GitHub Releases API implementation
//! - [`error`]: error type shared by remote operations

pub mod error;
pub mod github;
pub mod source;
