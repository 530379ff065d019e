//! Merging remote release listings into the persisted index
//!
//! Releases are keyed by tag. A tag seen for the first time gets its version
//! parsed from the tag; a known tag keeps its recorded version, including any
//! build ID found by an earlier run. `id`, `name`, `body` and `assets` always
//! come from the latest listing. Releases that disappear from the remote are
//! kept.

use std::path::{Path, PathBuf};
use std::pin::pin;

use futures::TryStreamExt;
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, info, warn};

use crate::buildid::BuildIdExtractor;
use crate::config::{asset_path, release_dir};
use crate::error::MirrorError;
use crate::index::asset::{Asset, AssetType};
use crate::index::release::Release;
use crate::index::sort::sort_releases;
use crate::index::version::{Version, VersionComparator};
use crate::remote::error::RemoteError;
use crate::remote::source::{ReleaseSource, RemoteRelease, pages};

/// An asset whose file is not yet present on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDownload {
    pub release_tag: String,
    pub asset: Asset,
    pub path: PathBuf,
}

/// Result of [`Reconciler::reconcile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Every release, sorted, with sorted asset lists
    pub releases: Vec<Release>,
    /// Assets to download, in release then asset order
    pub pending: Vec<PendingDownload>,
}

pub struct Reconciler<'a> {
    source: &'a dyn ReleaseSource,
    versions: &'a VersionComparator,
}

impl<'a> Reconciler<'a> {
    pub fn new(source: &'a dyn ReleaseSource, versions: &'a VersionComparator) -> Self {
        Self { source, versions }
    }

    /// Merge the remote listing into `prior` and find the files still missing
    /// under `output_dir`.
    pub async fn reconcile(
        &self,
        prior: Vec<Release>,
        output_dir: &Path,
    ) -> Result<Reconciliation, MirrorError> {
        let releases = self.merge(prior).await?;
        let pending = pending_downloads(&releases, output_dir)?;
        Ok(Reconciliation { releases, pending })
    }

    /// Merge the remote listing into `prior`, returning the sorted result.
    pub async fn merge(&self, prior: Vec<Release>) -> Result<Vec<Release>, RemoteError> {
        let mut working: IndexMap<String, Release> = IndexMap::with_capacity(prior.len());
        for release in prior {
            if let Some(replaced) = working.insert(release.tag.clone(), release) {
                warn!(
                    release_id = replaced.id,
                    release_tag = %replaced.tag,
                    "Dropping earlier index entry with duplicate tag"
                );
            }
        }

        let mut listing = pin!(pages(|page| self.source.list_releases(page)));
        while let Some(page) = listing.try_next().await? {
            for remote in page {
                if remote.draft {
                    debug!(release_id = remote.id, release_tag = %remote.tag_name, "Skipping draft release");
                    continue;
                }

                let release = match working.entry(remote.tag_name.clone()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => match Version::parse(&remote.tag_name) {
                        Ok(version) => entry.insert(Release::new(&remote.tag_name, version)),
                        Err(e) => {
                            warn!(
                                release_id = remote.id,
                                release_tag = %remote.tag_name,
                                "Failed to parse release tag as a semantic version: {}",
                                e
                            );
                            continue;
                        }
                    },
                };

                release.id = remote.id;
                release.name = remote.name.clone().unwrap_or_default();
                release.body = remote.body.clone().unwrap_or_default();
                release.assets = self.collect_assets(&remote).await?;
            }
        }

        let mut releases: Vec<Release> = working.into_values().collect();
        sort_releases(&mut releases, self.versions);

        info!(count = releases.len(), "Reconciled release index");
        Ok(releases)
    }

    /// Source bundles first, then every listed asset classified by name.
    async fn collect_assets(&self, remote: &RemoteRelease) -> Result<Vec<Asset>, RemoteError> {
        let mut assets = vec![
            Asset::source_tarball(remote.tarball_url.as_deref().unwrap_or_default()),
            Asset::source_zipball(remote.zipball_url.as_deref().unwrap_or_default()),
        ];

        let mut listing = pin!(pages(|page| self.source.list_assets(remote.id, page)));
        while let Some(page) = listing.try_next().await? {
            assets.extend(
                page.iter()
                    .map(|asset| Asset::new(asset.id, &asset.browser_download_url, &asset.name)),
            );
        }

        debug!(
            release_tag = %remote.tag_name,
            count = assets.len(),
            "Collected release assets"
        );
        Ok(assets)
    }
}

/// Assets of `releases` whose file does not exist under `output_dir`.
///
/// Existing files are never re-verified.
pub fn pending_downloads(
    releases: &[Release],
    output_dir: &Path,
) -> Result<Vec<PendingDownload>, MirrorError> {
    let mut pending = Vec::new();
    for release in releases {
        for asset in &release.assets {
            let path = asset_path(output_dir, &release.tag, &asset.name);
            let exists = path.try_exists().map_err(|source| MirrorError::Stat {
                path: path.clone(),
                source,
            })?;
            if !exists {
                pending.push(PendingDownload {
                    release_tag: release.tag.clone(),
                    asset: asset.clone(),
                    path,
                });
            }
        }
    }
    Ok(pending)
}

/// Record build IDs for releases that have none yet.
///
/// Executables are tried in asset order; the first one yielding an ID wins.
/// Returns the number of releases updated.
pub async fn backfill_build_ids(
    releases: &mut [Release],
    output_dir: &Path,
    extractor: &dyn BuildIdExtractor,
) -> usize {
    let mut recorded = 0;
    for release in releases
        .iter_mut()
        .filter(|release| release.version.build_id.is_empty())
    {
        let dir = release_dir(output_dir, &release.tag);
        for asset in release
            .assets
            .iter()
            .filter(|asset| asset.asset_type == AssetType::Executable)
        {
            let Some(build_id) = extractor.extract(&dir, &asset.name).await else {
                continue;
            };
            if release.version.record_build_id(&build_id) {
                info!(
                    release_tag = %release.tag,
                    asset_name = %asset.name,
                    build_id = %build_id,
                    "Recorded build ID"
                );
                recorded += 1;
                break;
            }
        }
    }
    recorded
}
