//! Deterministic ordering of index collections

use std::cmp::Ordering;

use crate::index::asset::Asset;
use crate::index::release::Release;
use crate::index::version::VersionComparator;

/// Total order over index entries
///
/// Two entries compare equal only when every compared field matches, so a
/// sort is reproducible across runs for identical input.
pub trait TotalOrder {
    fn total_cmp(&self, other: &Self, versions: &VersionComparator) -> Ordering;
}

impl TotalOrder for Asset {
    /// `(os, arch, type, name, id, url, base)`
    fn total_cmp(&self, other: &Self, _versions: &VersionComparator) -> Ordering {
        self.os
            .cmp(&other.os)
            .then_with(|| self.arch.cmp(&other.arch))
            .then_with(|| self.asset_type.cmp(&other.asset_type))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.url.cmp(&other.url))
            .then_with(|| self.base.cmp(&other.base))
    }
}

impl TotalOrder for Release {
    /// `(version, tag, id)`
    fn total_cmp(&self, other: &Self, versions: &VersionComparator) -> Ordering {
        versions
            .compare(&self.version, &other.version)
            .then_with(|| self.tag.cmp(&other.tag))
            .then_with(|| self.id.cmp(&other.id))
    }
}

pub fn sort_all<T: TotalOrder>(items: &mut [T], versions: &VersionComparator) {
    items.sort_by(|a, b| a.total_cmp(b, versions));
}

/// Sort assets and drop repeats of an `(os, arch, type, name)` key.
///
/// The first entry of each key survives, which after sorting is the one with
/// the smallest id.
pub fn sort_assets(assets: &mut Vec<Asset>, versions: &VersionComparator) {
    sort_all(assets, versions);
    assets.dedup_by(|later, kept| {
        (kept.os, kept.arch, kept.asset_type, &kept.name)
            == (later.os, later.arch, later.asset_type, &later.name)
    });
}

/// Sort releases, then each release's assets.
pub fn sort_releases(releases: &mut [Release], versions: &VersionComparator) {
    sort_all(releases, versions);
    for release in releases.iter_mut() {
        sort_assets(&mut release.assets, versions);
    }
}
