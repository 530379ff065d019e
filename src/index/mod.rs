//! Index data model: versions, assets, releases and their ordering
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Classify   │────▶│    Asset    │────▶│   Release   │
//! │ (file name) │     │  (record)   │     │ (tag → set) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//! ┌─────────────┐     ┌─────────────┐            ▼
//! │  Elements   │────▶│   Version   │────▶┌─────────────┐
//! │ (tokenize)  │     │ (compare)   │     │    Sort     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`elements`]: prerelease tokenization and the token cache
//! - [`version`]: tag parsing and the version comparator
//! - [`asset`]: asset records and platform/kind enums
//! - [`classify`]: name-based asset classification
//! - [`release`]: release records
//! - [`sort`]: total ordering of assets and releases
//! - [`codec`]: JSON encoding of the persisted index

pub mod asset;
pub mod classify;
pub mod codec;
pub mod elements;
pub mod release;
pub mod sort;
pub mod version;

pub(crate) fn is_zero(n: &i64) -> bool {
    *n == 0
}

pub(crate) fn is_empty(s: &str) -> bool {
    s.is_empty()
}
