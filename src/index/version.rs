//! Release versions parsed from tags and their total order

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::index::elements::TokenCache;

/// `v<major>.<minor>.<patch>[-<prerelease>]` with no leading zeros on numeric parts.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(?:-((?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?$",
    )
    .expect("tag pattern is valid")
});

static BUILD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("build ID pattern is valid"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {0:?}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    #[serde(default, skip_serializing_if = "crate::index::is_empty")]
    pub prerelease: String,
    #[serde(rename = "buildID", default, skip_serializing_if = "crate::index::is_empty")]
    pub build_id: String,
}

impl Version {
    /// Parse a release tag. The build ID of the result is always empty.
    pub fn parse(tag: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat(tag.to_string());
        let captures = TAG_RE.captures(tag).ok_or_else(invalid)?;

        let number = |index: usize| -> Result<u64, VersionError> {
            captures[index].parse().map_err(|_| invalid())
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            prerelease: captures
                .get(4)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            build_id: String::new(),
        })
    }

    /// Rebuild the tag this version was parsed from.
    pub fn to_tag(&self) -> String {
        let mut tag = format!("v{}.{}.{}", self.major, self.minor, self.patch);
        if !self.prerelease.is_empty() {
            tag.push('-');
            tag.push_str(&self.prerelease);
        }
        tag
    }

    /// Record a build ID discovered after download.
    ///
    /// Only the first well-formed ID (40 lowercase hex characters) is kept.
    /// Returns whether the ID was recorded.
    pub fn record_build_id(&mut self, build_id: &str) -> bool {
        if !self.build_id.is_empty() || !is_build_id(build_id) {
            return false;
        }
        self.build_id = build_id.to_string();
        true
    }
}

pub fn is_build_id(text: &str) -> bool {
    BUILD_ID_RE.is_match(text)
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease)?;
        }
        if !self.build_id.is_empty() {
            write!(f, "+{}", self.build_id)?;
        }
        Ok(())
    }
}

/// Total order over [`Version`] backed by a shared prerelease token cache.
///
/// Note this is not semver precedence: an empty prerelease tokenizes to the
/// shortest sequence, so `1.2.3` sorts *before* `1.2.3-rc1`, and numeric
/// prerelease identifiers sort before alphanumeric ones only because
/// `Digits` ranks below `Letters`.
#[derive(Debug, Default)]
pub struct VersionComparator {
    cache: TokenCache,
}

impl VersionComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn compare(&self, a: &Version, b: &Version) -> Ordering {
        a.major
            .cmp(&b.major)
            .then_with(|| a.minor.cmp(&b.minor))
            .then_with(|| a.patch.cmp(&b.patch))
            .then_with(|| {
                let a_elements = self.cache.tokenize(&a.prerelease);
                let b_elements = self.cache.tokenize(&b.prerelease);
                a_elements.cmp(&b_elements)
            })
            .then_with(|| a.build_id.cmp(&b.build_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BUILD_ID: &str = "0123456789abcdef0123456789abcdef01234567";

    fn version(tag: &str) -> Version {
        Version::parse(tag).unwrap()
    }

    #[rstest]
    #[case("v0.0.0", 0, 0, 0, "")]
    #[case("v1.2.3", 1, 2, 3, "")]
    #[case("v10.20.30-rc.1", 10, 20, 30, "rc.1")]
    #[case("v1.0.0-alpha-beta.0.x7", 1, 0, 0, "alpha-beta.0.x7")]
    #[case("v1.0.0-0a", 1, 0, 0, "0a")]
    fn parse_accepts_valid_tags(
        #[case] tag: &str,
        #[case] major: u64,
        #[case] minor: u64,
        #[case] patch: u64,
        #[case] prerelease: &str,
    ) {
        let parsed = version(tag);
        assert_eq!(
            parsed,
            Version {
                major,
                minor,
                patch,
                prerelease: prerelease.to_string(),
                build_id: String::new(),
            }
        );
        assert_eq!(parsed.to_tag(), tag);
    }

    #[rstest]
    #[case("1.2.3")] // missing v prefix
    #[case("v1.2")] // missing patch
    #[case("v01.2.3")] // leading zero
    #[case("v1.2.3-")] // empty prerelease
    #[case("v1.2.3-rc..1")] // empty identifier
    #[case("v1.2.3-01")] // numeric identifier with leading zero
    #[case("v1.2.3+build")] // build metadata is not part of a tag
    #[case("v99999999999999999999.0.0")] // overflows u64
    #[case("")]
    fn parse_rejects_invalid_tags(#[case] tag: &str) {
        assert_eq!(
            Version::parse(tag),
            Err(VersionError::InvalidFormat(tag.to_string()))
        );
    }

    #[test]
    fn display_appends_prerelease_and_build_id() {
        let mut v = version("v1.2.3-rc.1");
        assert_eq!(v.to_string(), "1.2.3-rc.1");

        assert!(v.record_build_id(BUILD_ID));
        assert_eq!(v.to_string(), format!("1.2.3-rc.1+{BUILD_ID}"));
        assert_eq!(v.to_tag(), "v1.2.3-rc.1");
    }

    #[test]
    fn record_build_id_keeps_first_valid_id() {
        let mut v = version("v1.0.0");

        assert!(!v.record_build_id("not-a-build-id"));
        assert!(!v.record_build_id(&BUILD_ID.to_uppercase()));
        assert!(v.build_id.is_empty());

        assert!(v.record_build_id(BUILD_ID));
        assert!(!v.record_build_id("ffffffffffffffffffffffffffffffffffffffff"));
        assert_eq!(v.build_id, BUILD_ID);
    }

    #[rstest]
    #[case("v1.2.3", "v1.2.4", Ordering::Less)]
    #[case("v1.10.0", "v1.9.0", Ordering::Greater)]
    #[case("v2.0.0", "v10.0.0", Ordering::Less)]
    #[case("v1.0.0-rc.2", "v1.0.0-rc.10", Ordering::Less)]
    #[case("v1.0.0-alpha", "v1.0.0-beta", Ordering::Less)]
    #[case("v1.0.0-1", "v1.0.0-alpha", Ordering::Less)]
    #[case("v1.0.0-rc.1", "v1.0.0-rc.1", Ordering::Equal)]
    fn compare_orders_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        let comparator = VersionComparator::new();
        assert_eq!(comparator.compare(&version(a), &version(b)), expected);
        assert_eq!(
            comparator.compare(&version(b), &version(a)),
            expected.reverse()
        );
    }

    #[test]
    fn compare_sorts_release_before_its_prereleases() {
        // Deliberately differs from semver precedence, where 1.2.3-rc1 < 1.2.3.
        let comparator = VersionComparator::new();
        assert_eq!(
            comparator.compare(&version("v1.2.3"), &version("v1.2.3-rc1")),
            Ordering::Less
        );
    }

    #[test]
    fn compare_breaks_ties_on_build_id() {
        let comparator = VersionComparator::new();
        let plain = version("v1.0.0");
        let mut built = version("v1.0.0");
        built.record_build_id(BUILD_ID);

        assert_eq!(comparator.compare(&plain, &built), Ordering::Less);
        assert_eq!(comparator.compare(&built, &built), Ordering::Equal);
    }

    #[test]
    fn compare_is_a_total_order_over_sample() {
        let comparator = VersionComparator::new();
        let samples: Vec<Version> = [
            "v0.1.0",
            "v1.0.0",
            "v1.0.0-0",
            "v1.0.0-alpha",
            "v1.0.0-alpha.1",
            "v1.0.0-alpha-1",
            "v1.0.0-beta.11",
            "v1.0.0-beta.2",
            "v1.0.1",
        ]
        .iter()
        .map(|tag| version(tag))
        .collect();

        for a in &samples {
            assert_eq!(comparator.compare(a, a), Ordering::Equal);
            for b in &samples {
                let ab = comparator.compare(a, b);
                assert_eq!(ab, comparator.compare(b, a).reverse());
                assert_eq!(ab == Ordering::Equal, a == b);
                for c in &samples {
                    if ab != Ordering::Greater && comparator.compare(b, c) != Ordering::Greater {
                        assert_ne!(comparator.compare(a, c), Ordering::Greater);
                    }
                }
            }
        }
    }

    #[test]
    fn compare_populates_token_cache() {
        let comparator = VersionComparator::new();
        comparator.compare(&version("v1.0.0-rc.1"), &version("v1.0.0-rc.2"));
        comparator.compare(&version("v1.0.0-rc.1"), &version("v1.0.0-rc.2"));
        assert_eq!(comparator.cache().len(), 2);
    }

    #[test]
    fn serializes_with_index_field_names() {
        let mut v = version("v1.2.3");
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            serde_json::json!({"major": 1, "minor": 2, "patch": 3})
        );

        v.prerelease = "rc.1".to_string();
        v.record_build_id(BUILD_ID);
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            serde_json::json!({
                "major": 1,
                "minor": 2,
                "patch": 3,
                "prerelease": "rc.1",
                "buildID": BUILD_ID
            })
        );
    }

    #[test]
    fn deserialize_rejects_unknown_fields() {
        let result = serde_json::from_value::<Version>(serde_json::json!({
            "major": 1, "minor": 0, "patch": 0, "build": "x"
        }));
        assert!(result.is_err());
    }
}
