//! Traits for listing releases and fetching asset bytes from a remote host

use std::future::Future;

use futures::Stream;
use futures::stream;
use serde::Deserialize;

#[cfg(test)]
use mockall::automock;

use crate::remote::error::RemoteError;

/// Page numbers start at 1
pub const FIRST_PAGE: u32 = 1;

/// Release summary as returned by the remote listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteRelease {
    pub id: i64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub tarball_url: Option<String>,
    #[serde(default)]
    pub zipball_url: Option<String>,
}

/// Asset entry as returned by the remote listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteAsset {
    pub id: i64,
    pub name: String,
    pub browser_download_url: String,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of the following page, `None` on the last page
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }
}

/// Paginated listing of a repository's releases and their assets
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches one page of releases, drafts included
    async fn list_releases(&self, page: u32) -> Result<Page<RemoteRelease>, RemoteError>;

    /// Fetches one page of the assets attached to `release_id`
    async fn list_assets(
        &self,
        release_id: i64,
        page: u32,
    ) -> Result<Page<RemoteAsset>, RemoteError>;
}

/// Download of asset contents
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetches the full body at `url`. Any status other than 200 is an error.
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, RemoteError>;
}

/// Walk a paginated listing from [`FIRST_PAGE`], yielding each page's items.
///
/// The stream ends after a page without a following page number, or with one
/// that does not advance. The first error ends the stream.
pub fn pages<'a, T, F, Fut>(fetch: F) -> impl Stream<Item = Result<Vec<T>, RemoteError>> + 'a
where
    T: 'a,
    F: FnMut(u32) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, RemoteError>> + 'a,
{
    stream::try_unfold(
        (Some(FIRST_PAGE), fetch),
        |(page, mut fetch)| async move {
            let Some(page) = page else {
                return Ok::<_, RemoteError>(None);
            };
            let Page { items, next_page } = fetch(page).await?;
            let next_page = next_page.filter(|next| *next > page);
            Ok(Some((items, (next_page, fetch))))
        },
    )
}
