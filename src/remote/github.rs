//! GitHub Releases API implementation of the remote traits

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, LINK};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{ASSETS_PER_PAGE, MirrorConfig, RELEASES_PER_PAGE, user_agent};
use crate::remote::error::RemoteError;
use crate::remote::source::{AssetFetcher, Page, ReleaseSource, RemoteAsset, RemoteRelease};

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Authenticated client for one GitHub repository
pub struct GitHubSource {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubSource {
    pub fn new(base_url: &str, owner: &str, repo: &str, token: &str) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &MirrorConfig) -> Result<Self, RemoteError> {
        Self::new(&config.api_url, &config.owner, &config.repo, &config.token)
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.base_url, self.owner, self.repo)
    }

    async fn get_page<T: DeserializeOwned>(&self, url: String) -> Result<Page<T>, RemoteError> {
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_JSON)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(RemoteError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }

        let next_page = next_page(response.headers());
        let items: Vec<T> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub response from {}: {}", url, e);
            RemoteError::InvalidResponse(e.to_string())
        })?;

        debug!(url = %url, count = items.len(), next_page = ?next_page, "Fetched page");
        Ok(Page { items, next_page })
    }
}

/// Page number of the `rel="next"` entry of a `Link` header
fn next_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|param| param.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        let url = reqwest::Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubSource {
    async fn list_releases(&self, page: u32) -> Result<Page<RemoteRelease>, RemoteError> {
        let url = format!(
            "{}/releases?per_page={}&page={}",
            self.repo_url(),
            RELEASES_PER_PAGE,
            page
        );
        self.get_page(url).await
    }

    async fn list_assets(
        &self,
        release_id: i64,
        page: u32,
    ) -> Result<Page<RemoteAsset>, RemoteError> {
        let url = format!(
            "{}/releases/{}/assets?per_page={}&page={}",
            self.repo_url(),
            release_id,
            ASSETS_PER_PAGE,
            page
        );
        self.get_page(url).await
    }
}

#[async_trait::async_trait]
impl AssetFetcher for GitHubSource {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
