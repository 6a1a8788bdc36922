//! Remote metadata sources.
//!
//! The catalog talks to YouTube only through the [`DataSource`] trait. Two
//! interchangeable backends exist, picked once from configuration:
//!
//! - [`ApiSource`] - YouTube Data API v3 (requires an API key)
//! - [`ScrapeSource`] - HTML pages + regex extraction, no key needed
//!
//! Calls are blocking; they only ever run on worker pool threads.

mod error;
mod record;

#[cfg(feature = "api")]
mod api;
#[cfg(feature = "scrape")]
mod scrape;

use std::sync::Arc;

pub use error::SourceError;
pub use record::{
    ContentDetails, ListResponse, PlaylistEntry, PlaylistPage, RecordView, Resource, ResourceId,
    SearchId, SearchItem, SearchTarget, Snippet, Thumbnail, KIND_PLAYLIST, KIND_VIDEO,
};

#[cfg(feature = "api")]
pub use api::ApiSource;
#[cfg(feature = "scrape")]
pub use scrape::ScrapeSource;

use crate::config::{Backend, SourceConfig};

/// Supplier of raw metadata for videos and playlists.
///
/// Implementations must be safe to call from several worker threads at once.
pub trait DataSource: Send + Sync {
    /// Short identifier for logging (e.g. `"api"`).
    fn name(&self) -> &'static str;

    /// Search for videos and playlists with a single remote call.
    fn search(&self, query: &str) -> Result<Vec<SearchItem>, SourceError>;

    /// Look up title, channel and duration of up to 50 videos.
    fn list_videos(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError>;

    /// Look up title, channel, thumbnails and item count of up to 50 playlists.
    fn list_playlists(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError>;

    /// Fetch one page of a playlist's entries.
    ///
    /// `page_token` is `None` for the first page.
    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: usize,
    ) -> Result<PlaylistPage, SourceError>;
}

/// Build the backend selected by `config`.
pub fn from_config(config: &SourceConfig) -> Result<Arc<dyn DataSource>, SourceError> {
    let source: Arc<dyn DataSource> = match config.backend {
        #[cfg(feature = "api")]
        Backend::Api => {
            let key = config
                .api_key
                .clone()
                .ok_or_else(|| SourceError::Unavailable("api backend needs an API key".into()))?;
            Arc::new(ApiSource::new(http_client(config)?, key, config.search_results))
        }
        #[cfg(feature = "scrape")]
        Backend::Scrape => Arc::new(ScrapeSource::new(http_client(config)?)?),
        #[allow(unreachable_patterns)]
        other => {
            return Err(SourceError::Unavailable(format!(
                "backend '{}' was not compiled in",
                other.as_str()
            )))
        }
    };

    tracing::debug!(backend = source.name(), "data source ready");
    Ok(source)
}

/// Blocking HTTP client shared by both backends.
pub(crate) fn http_client(
    config: &SourceConfig,
) -> Result<reqwest::blocking::Client, SourceError> {
    let mut builder = reqwest::blocking::Client::builder().user_agent(config.user_agent.clone());

    // blocking::ClientBuilder::timeout(None) disables its 30s default
    builder = builder.timeout(config.request_timeout);

    if let Some(ref proxy) = config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
    }

    Ok(builder.build()?)
}
