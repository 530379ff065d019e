//! Shared fixtures for mirror end-to-end tests

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use mockito::{Matcher, Mock, ServerGuard};
use tempfile::TempDir;

use release_mirror::buildid::BuildIdExtractor;
use release_mirror::config::MirrorConfig;
use release_mirror::remote::github::GitHubSource;

pub const OWNER: &str = "octo";
pub const REPO: &str = "tool";
pub const TOKEN: &str = "secret-token";

/// Build ID extractor returning a fixed answer and recording every lookup
pub struct FixedBuildIdExtractor {
    build_id: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FixedBuildIdExtractor {
    pub fn new(build_id: Option<&str>) -> Self {
        Self {
            build_id: build_id.map(str::to_string),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `<release dir name>/<asset name>` for each call, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildIdExtractor for FixedBuildIdExtractor {
    async fn extract(&self, release_dir: &Path, asset_name: &str) -> Option<String> {
        let dir = release_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push(format!("{dir}/{asset_name}"));
        self.build_id.clone()
    }
}

pub fn create_config(server: &ServerGuard, output_dir: &TempDir) -> MirrorConfig {
    MirrorConfig {
        api_url: server.url(),
        owner: OWNER.to_string(),
        repo: REPO.to_string(),
        output_dir: output_dir.path().to_path_buf(),
        token: TOKEN.to_string(),
    }
}

pub fn create_source(config: &MirrorConfig) -> GitHubSource {
    GitHubSource::from_config(config).unwrap()
}

fn page_query(page: u32) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("per_page".into(), "10".into()),
        Matcher::UrlEncoded("page".into(), page.to_string()),
    ])
}

/// Serve `body` as page `page` of the release listing.
pub async fn mock_releases_page(
    server: &mut ServerGuard,
    page: u32,
    body: &str,
    next_page: Option<u32>,
) -> Mock {
    let mut mock = server
        .mock("GET", format!("/repos/{OWNER}/{REPO}/releases").as_str())
        .match_query(page_query(page))
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json");
    if let Some(next) = next_page {
        let link = format!(
            r#"<{}/repos/{OWNER}/{REPO}/releases?per_page=10&page={next}>; rel="next""#,
            server.url()
        );
        mock = mock.with_header("link", &link);
    }
    mock.with_body(body).create_async().await
}

/// Serve `body` as the only page of a release's asset listing.
pub async fn mock_assets(server: &mut ServerGuard, release_id: i64, body: &str) -> Mock {
    server
        .mock(
            "GET",
            format!("/repos/{OWNER}/{REPO}/releases/{release_id}/assets").as_str(),
        )
        .match_query(page_query(1))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Serve `contents` at `path`, expecting exactly `hits` requests.
pub async fn mock_download(
    server: &mut ServerGuard,
    path: &str,
    contents: &[u8],
    hits: usize,
) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_body(contents)
        .expect(hits)
        .create_async()
        .await
}
