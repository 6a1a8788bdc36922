//! YouTube Data API v3 backend.
//!
//! See <https://developers.google.com/youtube/v3/docs/>. Each batch lookup
//! is a single request, which makes this backend far faster than scraping.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use super::record::{ListResponse, PlaylistEntry, PlaylistPage, Resource, SearchItem};
use super::{DataSource, SourceError};

const API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/";

/// Metadata source backed by the official API.
pub struct ApiSource {
    client: Client,
    key: String,
    search_results: usize,
    endpoint: String,
}

impl ApiSource {
    pub fn new(client: Client, key: impl Into<String>, search_results: usize) -> Self {
        Self {
            client,
            key: key.into(),
            search_results,
            endpoint: API_ENDPOINT.to_string(),
        }
    }

    /// Point the source at a different base URL (must end with `/`).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// GET `resource` with `query` and decode the JSON body.
    fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = format!("{}{}", self.endpoint, resource);
        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.key.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                endpoint: resource.to_string(),
            });
        }

        Ok(response.json()?)
    }
}

impl DataSource for ApiSource {
    fn name(&self) -> &'static str {
        "api"
    }

    fn search(&self, query: &str) -> Result<Vec<SearchItem>, SourceError> {
        let response: ListResponse<SearchItem> = self.get(
            "search",
            &[
                ("part", "id,snippet".into()),
                (
                    "fields",
                    "items(id,snippet(title,thumbnails,channelTitle))".into(),
                ),
                ("maxResults", self.search_results.to_string()),
                ("type", "video,playlist".into()),
                ("q", query.to_string()),
            ],
        )?;
        Ok(response.items)
    }

    fn list_videos(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        let response: ListResponse<Resource> = self.get(
            "videos",
            &[
                ("part", "id,snippet,contentDetails".into()),
                (
                    "fields",
                    "items(id,snippet(title,channelTitle),contentDetails(duration))".into(),
                ),
                ("id", ids.join(",")),
            ],
        )?;
        Ok(response.items)
    }

    fn list_playlists(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        let response: ListResponse<Resource> = self.get(
            "playlists",
            &[
                ("part", "id,snippet,contentDetails".into()),
                (
                    "fields",
                    "items(id,snippet(title,thumbnails,channelTitle),contentDetails(itemCount))"
                        .into(),
                ),
                ("id", ids.join(",")),
            ],
        )?;
        Ok(response.items)
    }

    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: usize,
    ) -> Result<PlaylistPage, SourceError> {
        let response: ListResponse<PlaylistEntry> = self.get(
            "playlistItems",
            &[
                ("part", "id,snippet".into()),
                (
                    "fields",
                    "nextPageToken,items(snippet(title,resourceId(videoId)))".into(),
                ),
                ("maxResults", max_results.to_string()),
                ("playlistId", playlist_id.to_string()),
                ("pageToken", page_token.unwrap_or_default().to_string()),
            ],
        )?;
        Ok(response.into())
    }
}
