//! One complete mirror run: load, reconcile, download, backfill, persist

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::buildid::BuildIdExtractor;
use crate::config::{INDEX_FILE_MODE, MirrorConfig};
use crate::durable::write_file;
use crate::error::MirrorError;
use crate::index::codec::{decode_index, encode_index};
use crate::index::release::Release;
use crate::index::sort::sort_releases;
use crate::index::version::VersionComparator;
use crate::mirror::reconcile::{PendingDownload, Reconciler, backfill_build_ids};
use crate::remote::source::{AssetFetcher, ReleaseSource};

/// Counts reported at the end of a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Releases in the persisted index
    pub releases: usize,
    /// Asset files written during this run
    pub downloaded: usize,
    /// Releases that gained a build ID during this run
    pub build_ids: usize,
}

/// Run the whole pipeline against `config.output_dir`.
///
/// Every step is sequential and the first error ends the run. Asset files
/// written before a failure stay on disk; the index is only replaced at the
/// very end.
pub async fn run(
    config: &MirrorConfig,
    source: &dyn ReleaseSource,
    fetcher: &dyn AssetFetcher,
    extractor: &dyn BuildIdExtractor,
) -> Result<MirrorSummary, MirrorError> {
    let index_path = config.index_path();
    let prior = load_index(&index_path).await?;
    info!(path = %index_path.display(), count = prior.len(), "Loaded index");

    let versions = VersionComparator::new();
    let reconciliation = Reconciler::new(source, &versions)
        .reconcile(prior, &config.output_dir)
        .await?;
    let mut releases = reconciliation.releases;

    info!(count = reconciliation.pending.len(), "Downloading missing assets");
    for pending in &reconciliation.pending {
        download(fetcher, pending).await?;
    }

    let build_ids = backfill_build_ids(&mut releases, &config.output_dir, extractor).await;
    if build_ids > 0 {
        sort_releases(&mut releases, &versions);
    }

    let encoded = encode_index(&releases).map_err(MirrorError::EncodeIndex)?;
    persist(index_path.clone(), encoded, INDEX_FILE_MODE).await?;
    info!(path = %index_path.display(), count = releases.len(), "Wrote index");

    Ok(MirrorSummary {
        releases: releases.len(),
        downloaded: reconciliation.pending.len(),
        build_ids,
    })
}

/// Read the persisted index; a missing file is an empty index.
pub async fn load_index(path: &Path) -> Result<Vec<Release>, MirrorError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Index not found, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(MirrorError::ReadIndex {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    decode_index(&raw).map_err(|source| MirrorError::DecodeIndex {
        path: path.to_path_buf(),
        source,
    })
}

async fn download(
    fetcher: &dyn AssetFetcher,
    pending: &PendingDownload,
) -> Result<(), MirrorError> {
    info!(
        release_tag = %pending.release_tag,
        asset_name = %pending.asset.name,
        url = %pending.asset.url,
        "Downloading asset"
    );
    let bytes = fetcher.fetch_asset(&pending.asset.url).await?;
    persist(pending.path.clone(), bytes, pending.asset.mode()).await
}

async fn persist(path: PathBuf, bytes: Vec<u8>, mode: u32) -> Result<(), MirrorError> {
    tokio::task::spawn_blocking(move || write_file(&path, &bytes, mode)).await??;
    Ok(())
}
