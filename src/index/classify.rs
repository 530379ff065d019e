//! Asset classification by file name
//!
//! Each asset category has one matcher. Matchers are tried in the order of
//! [`MATCHERS`]; the first hit decides the classification and no hit yields
//! [`Classification::unknown`].
//!
//! Names handled today:
//! - executable: `<base>-<os>-<arch>[.exe]`
//! - provenance: `<base>-<os>-<arch>.intoto.json[l]`

use std::sync::LazyLock;

use regex::Regex;

use crate::index::asset::{AssetArch, AssetOs, AssetType};

/// Result of classifying an asset name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub base: String,
    pub os: AssetOs,
    pub arch: AssetArch,
    pub asset_type: AssetType,
}

impl Classification {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Matches `<base>-<os>-<arch><suffix>` for one asset category
pub struct AssetMatcher {
    asset_type: AssetType,
    pattern: Regex,
}

const BASE: &str = r"[0-9A-Za-z]+(?:[_-][0-9A-Za-z]+)*";
const OS: &str = r"linux";
const ARCH: &str = r"amd64|arm64";

impl AssetMatcher {
    /// `suffix` is a regex fragment matched after the architecture.
    pub fn new(asset_type: AssetType, suffix: &str) -> Self {
        let pattern = format!(r"^({BASE})-({OS})-({ARCH}){suffix}$");
        Self {
            asset_type,
            pattern: Regex::new(&pattern).expect("asset name pattern is valid"),
        }
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    pub fn matches(&self, name: &str) -> Option<Classification> {
        let captures = self.pattern.captures(name)?;
        Some(Classification {
            base: captures[1].to_string(),
            os: captures[2].parse().ok()?,
            arch: captures[3].parse().ok()?,
            asset_type: self.asset_type,
        })
    }
}

/// Decision table, in match order
pub static MATCHERS: LazyLock<Vec<AssetMatcher>> = LazyLock::new(|| {
    vec![
        AssetMatcher::new(AssetType::Executable, r"(?:\.exe)?"),
        AssetMatcher::new(AssetType::Provenance, r"\.intoto\.jsonl?"),
    ]
});

pub fn classify(name: &str) -> Classification {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher.matches(name))
        .unwrap_or_else(Classification::unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classification(
        base: &str,
        os: AssetOs,
        arch: AssetArch,
        asset_type: AssetType,
    ) -> Classification {
        Classification {
            base: base.to_string(),
            os,
            arch,
            asset_type,
        }
    }

    #[rstest]
    #[case(
        "myapp-linux-amd64",
        classification("myapp", AssetOs::Linux, AssetArch::Amd64, AssetType::Executable)
    )]
    #[case(
        "myapp-linux-amd64.intoto.jsonl",
        classification("myapp", AssetOs::Linux, AssetArch::Amd64, AssetType::Provenance)
    )]
    #[case(
        "my_app-v2-linux-arm64.exe",
        classification("my_app-v2", AssetOs::Linux, AssetArch::Arm64, AssetType::Executable)
    )]
    #[case(
        "tool-linux-arm64.intoto.json",
        classification("tool", AssetOs::Linux, AssetArch::Arm64, AssetType::Provenance)
    )]
    #[case("readme.txt", Classification::unknown())]
    #[case("myapp-darwin-amd64", Classification::unknown())]
    #[case("myapp-linux-386", Classification::unknown())]
    #[case("my__app-linux-amd64", Classification::unknown())]
    #[case("-linux-amd64", Classification::unknown())]
    #[case("myapp-linux-amd64.tar.gz", Classification::unknown())]
    fn classify_matches_expected_category(#[case] name: &str, #[case] expected: Classification) {
        assert_eq!(classify(name), expected);
    }

    #[test]
    fn matchers_are_tried_in_declared_order() {
        let order: Vec<AssetType> = MATCHERS.iter().map(AssetMatcher::asset_type).collect();
        assert_eq!(order, vec![AssetType::Executable, AssetType::Provenance]);
    }

    #[test]
    fn executable_matcher_ignores_provenance_names() {
        let matcher = AssetMatcher::new(AssetType::Executable, r"(?:\.exe)?");
        assert!(matcher.matches("tool-linux-amd64.intoto.jsonl").is_none());
        assert!(matcher.matches("tool-linux-amd64.exe").is_some());
    }

    #[test]
    fn unknown_classification_has_empty_base() {
        let unknown = Classification::unknown();
        assert_eq!(unknown.base, "");
        assert_eq!(unknown.os, AssetOs::Unknown);
        assert_eq!(unknown.arch, AssetArch::Unknown);
        assert_eq!(unknown.asset_type, AssetType::Unknown);
    }
}
