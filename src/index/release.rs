use serde::{Deserialize, Serialize};

use crate::index::asset::Asset;
use crate::index::version::Version;

/// One mirrored release, keyed by `tag`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Release {
    #[serde(default, skip_serializing_if = "crate::index::is_zero")]
    pub id: i64,
    pub tag: String,
    #[serde(default, skip_serializing_if = "crate::index::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "crate::index::is_empty")]
    pub body: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Start a release for a tag seen for the first time.
    pub fn new(tag: &str, version: Version) -> Self {
        Self {
            tag: tag.to_string(),
            version,
            ..Self::default()
        }
    }

    pub fn first_matching_asset<F>(&self, predicate: F) -> Option<&Asset>
    where
        F: Fn(&Asset) -> bool,
    {
        self.assets.iter().find(|asset| predicate(asset))
    }

    pub fn matching_assets<F>(&self, predicate: F) -> Vec<&Asset>
    where
        F: Fn(&Asset) -> bool,
    {
        self.assets.iter().filter(|asset| predicate(asset)).collect()
    }
}
