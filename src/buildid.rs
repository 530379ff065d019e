//! Build ID extraction from mirrored executables

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

static VCS_REVISION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\tbuild\tvcs\.revision=([0-9a-f]{40})\s*$").expect("vcs revision pattern is valid")
});

/// Looks up the build ID embedded in a downloaded executable
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait BuildIdExtractor: Send + Sync {
    /// Returns the 40-hex-character build ID of `release_dir/asset_name`, or
    /// `None` when it cannot be determined. Never fails.
    async fn extract(&self, release_dir: &Path, asset_name: &str) -> Option<String>;
}

/// Reads the VCS revision recorded by the Go toolchain via `go version -m`
pub struct GoBuildIdExtractor {
    go: PathBuf,
}

impl GoBuildIdExtractor {
    pub fn new(go: impl Into<PathBuf>) -> Self {
        Self { go: go.into() }
    }
}

impl Default for GoBuildIdExtractor {
    fn default() -> Self {
        Self::new("go")
    }
}

#[async_trait::async_trait]
impl BuildIdExtractor for GoBuildIdExtractor {
    async fn extract(&self, release_dir: &Path, asset_name: &str) -> Option<String> {
        let asset_path = release_dir.join(asset_name);
        let output = Command::new(&self.go)
            .arg("version")
            .arg("-m")
            .arg(&asset_path)
            .output()
            .await
            .inspect_err(|e| {
                debug!(
                    path = %asset_path.display(),
                    "Failed to run {:?}: {}",
                    self.go,
                    e
                )
            })
            .ok()?;

        if !output.status.success() {
            debug!(
                path = %asset_path.display(),
                status = %output.status,
                "Build info not available"
            );
            return None;
        }

        parse_build_id(&String::from_utf8_lossy(&output.stdout))
    }
}

/// First `vcs.revision` build setting in `go version -m` output
pub fn parse_build_id(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| VCS_REVISION_RE.captures(line))
        .map(|captures| captures[1].to_string())
}
