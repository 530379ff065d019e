//! Asset records and their platform/kind enums

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::index::classify;

/// File name of the synthetic source tarball asset
pub const SOURCE_TARBALL_NAME: &str = "source.tar.gz";

/// File name of the synthetic source zip archive asset
pub const SOURCE_ZIPBALL_NAME: &str = "source.zip";

/// Error returned when an enum's text form is not recognized
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Failed to parse {value:?} as {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Match `text` against each variant's name and aliases, ignoring ASCII case.
fn lookup<T: Copy>(
    kind: &'static str,
    table: &[(T, &'static str, &[&'static str])],
    text: &str,
) -> Result<T, UnknownVariant> {
    let text = text.trim();
    table
        .iter()
        .find(|(_, name, aliases)| {
            name.eq_ignore_ascii_case(text) || aliases.iter().any(|a| a.eq_ignore_ascii_case(text))
        })
        .map(|(variant, _, _)| *variant)
        .ok_or_else(|| UnknownVariant {
            kind,
            value: text.to_string(),
        })
}

/// Operating system an asset targets
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "&'static str", try_from = "String")]
pub enum AssetOs {
    #[default]
    Unknown,
    Any,
    Linux,
}

impl AssetOs {
    const TABLE: &'static [(Self, &'static str, &'static [&'static str])] = &[
        (Self::Unknown, "unknown", &[""]),
        (Self::Any, "any", &[]),
        (Self::Linux, "linux", &[]),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetOs::Unknown => "unknown",
            AssetOs::Any => "any",
            AssetOs::Linux => "linux",
        }
    }
}

/// CPU architecture an asset targets
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "&'static str", try_from = "String")]
pub enum AssetArch {
    #[default]
    Unknown,
    Any,
    Amd64,
    Arm64,
}

impl AssetArch {
    const TABLE: &'static [(Self, &'static str, &'static [&'static str])] = &[
        (Self::Unknown, "unknown", &[""]),
        (Self::Any, "any", &[]),
        (Self::Amd64, "amd64", &["x86-64", "x64"]),
        (Self::Arm64, "arm64", &["aarch64"]),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetArch::Unknown => "unknown",
            AssetArch::Any => "any",
            AssetArch::Amd64 => "amd64",
            AssetArch::Arm64 => "arm64",
        }
    }
}

/// Kind of file an asset holds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "&'static str", try_from = "String")]
pub enum AssetType {
    #[default]
    Unknown,
    SourceTar,
    SourceZip,
    Executable,
    Provenance,
}

impl AssetType {
    const TABLE: &'static [(Self, &'static str, &'static [&'static str])] = &[
        (Self::Unknown, "unknown", &[""]),
        (Self::SourceTar, "source-tar", &["sourcetar"]),
        (Self::SourceZip, "source-zip", &["sourcezip"]),
        (Self::Executable, "executable", &["binary"]),
        (Self::Provenance, "provenance", &[]),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Unknown => "unknown",
            AssetType::SourceTar => "source-tar",
            AssetType::SourceZip => "source-zip",
            AssetType::Executable => "executable",
            AssetType::Provenance => "provenance",
        }
    }
}

impl FromStr for AssetOs {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup("AssetOs", Self::TABLE, s)
    }
}

impl FromStr for AssetArch {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup("AssetArch", Self::TABLE, s)
    }
}

impl FromStr for AssetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup("AssetType", Self::TABLE, s)
    }
}

impl TryFrom<String> for AssetOs {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for AssetArch {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for AssetType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetOs> for &'static str {
    fn from(value: AssetOs) -> Self {
        value.as_str()
    }
}

impl From<AssetArch> for &'static str {
    fn from(value: AssetArch) -> Self {
        value.as_str()
    }
}

impl From<AssetType> for &'static str {
    fn from(value: AssetType) -> Self {
        value.as_str()
    }
}

impl fmt::Display for AssetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AssetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One downloadable file attached to a release
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Asset {
    /// Remote-assigned ID; zero for the synthetic source bundles
    #[serde(default, skip_serializing_if = "crate::index::is_zero")]
    pub id: i64,
    pub url: String,
    pub name: String,
    /// Project-name prefix captured from executable/provenance names
    #[serde(default, skip_serializing_if = "crate::index::is_empty")]
    pub base: String,
    pub os: AssetOs,
    pub arch: AssetArch,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

impl Asset {
    /// Build an asset from a remote listing entry, classifying it by name.
    pub fn new(id: i64, url: &str, name: &str) -> Self {
        let class = classify::classify(name);
        Self {
            id,
            url: url.to_string(),
            name: name.to_string(),
            base: class.base,
            os: class.os,
            arch: class.arch,
            asset_type: class.asset_type,
        }
    }

    pub fn source_tarball(url: &str) -> Self {
        Self::source_bundle(url, SOURCE_TARBALL_NAME, AssetType::SourceTar)
    }

    pub fn source_zipball(url: &str) -> Self {
        Self::source_bundle(url, SOURCE_ZIPBALL_NAME, AssetType::SourceZip)
    }

    fn source_bundle(url: &str, name: &str, asset_type: AssetType) -> Self {
        Self {
            id: 0,
            url: url.to_string(),
            name: name.to_string(),
            base: String::new(),
            os: AssetOs::Any,
            arch: AssetArch::Any,
            asset_type,
        }
    }

    /// Permission bits for the mirrored file
    pub fn mode(&self) -> u32 {
        match self.asset_type {
            AssetType::Executable => 0o777,
            _ => 0o666,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("linux", AssetOs::Linux)]
    #[case("LINUX", AssetOs::Linux)]
    #[case(" any ", AssetOs::Any)]
    #[case("", AssetOs::Unknown)]
    fn asset_os_parses_names_ignoring_case(#[case] text: &str, #[case] expected: AssetOs) {
        assert_eq!(text.parse::<AssetOs>(), Ok(expected));
    }

    #[rstest]
    #[case("amd64", AssetArch::Amd64)]
    #[case("x86-64", AssetArch::Amd64)]
    #[case("X64", AssetArch::Amd64)]
    #[case("aarch64", AssetArch::Arm64)]
    fn asset_arch_accepts_aliases(#[case] text: &str, #[case] expected: AssetArch) {
        assert_eq!(text.parse::<AssetArch>(), Ok(expected));
    }

    #[test]
    fn asset_type_rejects_unknown_text() {
        assert_eq!(
            "tarball".parse::<AssetType>(),
            Err(UnknownVariant {
                kind: "AssetType",
                value: "tarball".to_string()
            })
        );
        assert_eq!("binary".parse::<AssetType>(), Ok(AssetType::Executable));
    }

    #[test]
    fn enum_order_follows_declaration() {
        assert!(AssetOs::Unknown < AssetOs::Any && AssetOs::Any < AssetOs::Linux);
        assert!(AssetArch::Amd64 < AssetArch::Arm64);
        assert!(AssetType::SourceZip < AssetType::Executable);
    }

    #[test]
    fn source_bundles_have_fixed_names_and_any_platform() {
        let tarball = Asset::source_tarball("https://example.com/tarball/v1.0.0");
        assert_eq!(tarball.name, "source.tar.gz");
        assert_eq!(tarball.asset_type, AssetType::SourceTar);
        assert_eq!((tarball.os, tarball.arch), (AssetOs::Any, AssetArch::Any));

        let zipball = Asset::source_zipball("https://example.com/zipball/v1.0.0");
        assert_eq!(zipball.name, "source.zip");
        assert_eq!(zipball.asset_type, AssetType::SourceZip);
    }

    #[test]
    fn mode_is_executable_only_for_executables() {
        assert_eq!(Asset::new(1, "u", "tool-linux-amd64").mode(), 0o777);
        assert_eq!(Asset::new(2, "u", "tool-linux-amd64.intoto.jsonl").mode(), 0o666);
        assert_eq!(Asset::source_zipball("u").mode(), 0o666);
    }

    #[test]
    fn serializes_enums_as_text_and_omits_empty_fields() {
        let asset = Asset::source_tarball("https://example.com/t");
        assert_eq!(
            serde_json::to_value(&asset).unwrap(),
            json!({
                "url": "https://example.com/t",
                "name": "source.tar.gz",
                "os": "any",
                "arch": "any",
                "type": "source-tar"
            })
        );
    }

    #[test]
    fn deserializes_aliases_and_rejects_unknown_fields() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 7,
            "url": "u",
            "name": "tool-linux-arm64",
            "base": "tool",
            "os": "Linux",
            "arch": "aarch64",
            "type": "binary"
        }))
        .unwrap();
        assert_eq!(asset, Asset::new(7, "u", "tool-linux-arm64"));

        let result = serde_json::from_value::<Asset>(json!({
            "url": "u", "name": "n", "os": "any", "arch": "any", "type": "unknown", "size": 1
        }));
        assert!(result.is_err());
    }
}
