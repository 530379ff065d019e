//! Mirror pipeline
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ index.json  │────▶│ Reconciler  │◀────│ReleaseSource│
//! │   (prior)   │     │   (merge)   │     │  (remote)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │AssetFetcher │────▶│  Download   │────▶│  Build ID   │
//! │  (remote)   │     │ (durable)   │     │ (backfill)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │ index.json  │
//!                                         │  (durable)  │
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`reconcile`]: merging remote listings into the prior index
//! - [`run`]: the end-to-end pipeline

pub mod reconcile;
pub mod run;

pub use run::{MirrorSummary, run};
