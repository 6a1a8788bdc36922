//! Raw records returned by data sources.
//!
//! Shapes follow the YouTube Data API v3 JSON so the API backend can
//! deserialize responses directly. Every nested attribute is optional: a
//! missing attribute turns into an absent value for that one field.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Kind tag of a video in search results.
pub const KIND_VIDEO: &str = "youtube#video";
/// Kind tag of a playlist in search results.
pub const KIND_PLAYLIST: &str = "youtube#playlist";

/// Envelope of every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A video or playlist as returned by a batch lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<Snippet>,
    #[serde(default)]
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    /// Thumbnails keyed by size name (`default`, `medium`, `high`, ...).
    #[serde(default)]
    pub thumbnails: Option<BTreeMap<String, Thumbnail>>,
    /// Set on playlist items only.
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    /// ISO 8601 duration, e.g. `PT1H2M10S`.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub item_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// A single search hit, either a video or a playlist.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: SearchId,
    #[serde(default)]
    pub snippet: Option<Snippet>,
    #[serde(default)]
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchId {
    pub kind: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub playlist_id: Option<String>,
}

/// What a search hit points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget<'a> {
    Video(&'a str),
    Playlist(&'a str),
}

impl SearchId {
    /// Resolve the kind tag and matching ID; `None` for unknown kinds.
    pub fn target(&self) -> Option<SearchTarget<'_>> {
        match self.kind.as_str() {
            KIND_VIDEO => self.video_id.as_deref().map(SearchTarget::Video),
            KIND_PLAYLIST => self.playlist_id.as_deref().map(SearchTarget::Playlist),
            _ => None,
        }
    }
}

/// One entry of a playlist page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub snippet: Option<Snippet>,
}

impl PlaylistEntry {
    /// ID of the video this entry refers to.
    pub fn video_id(&self) -> Option<&str> {
        self.snippet
            .as_ref()?
            .resource_id
            .as_ref()?
            .video_id
            .as_deref()
    }
}

/// One page of playlist entries.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistEntry>,
    /// Token for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl From<ListResponse<PlaylistEntry>> for PlaylistPage {
    fn from(response: ListResponse<PlaylistEntry>) -> Self {
        Self {
            items: response.items,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

/// Borrowed view over the parts of a record that carry field data.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordView<'a> {
    pub snippet: Option<&'a Snippet>,
    pub details: Option<&'a ContentDetails>,
}

impl<'a> From<&'a Resource> for RecordView<'a> {
    fn from(r: &'a Resource) -> Self {
        Self {
            snippet: r.snippet.as_ref(),
            details: r.content_details.as_ref(),
        }
    }
}

impl<'a> From<&'a SearchItem> for RecordView<'a> {
    fn from(r: &'a SearchItem) -> Self {
        Self {
            snippet: r.snippet.as_ref(),
            details: r.content_details.as_ref(),
        }
    }
}

impl<'a> From<&'a PlaylistEntry> for RecordView<'a> {
    fn from(r: &'a PlaylistEntry) -> Self {
        Self {
            snippet: r.snippet.as_ref(),
            details: None,
        }
    }
}
