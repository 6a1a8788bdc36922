//! HTML scraping backend.
//!
//! Works without an API key by fetching the public watch / playlist /
//! results pages and pulling fields out with regular expressions. Batch
//! lookups cost one request per ID, and extraction is best-effort: a field
//! the patterns miss simply comes back absent.

use std::collections::BTreeMap;

use regex::Regex;
use reqwest::blocking::Client;

use super::record::{
    ContentDetails, PlaylistEntry, PlaylistPage, Resource, ResourceId, SearchId, SearchItem,
    Snippet, Thumbnail, KIND_PLAYLIST, KIND_VIDEO,
};
use super::{DataSource, SourceError};

const SITE_ENDPOINT: &str = "https://www.youtube.com/";

const SEARCH_PATTERN: &str = concat!(
    r#"(?:video-count[^<]*<b>(?P<item_count>\d+)</b>[\s\S]*?)?"#,
    r#"<a href="/watch\?v=(?P<id>[\w-]{11})(?:&amp;list=(?P<playlist>PL[\w-]{32}))?"[^>]*?"#,
    r#"title="(?P<title>[^"]+)"[^>]*>"#,
    r#"(?:[\s\S]*?Duration: (?:(?P<hours>\d+):)?(?P<minutes>\d+):(?P<seconds>\d{2}))?"#,
    r#"[\s\S]*?<a href="/(?:user|channel)/[^"]+"[^>]*>(?P<uploader>[^<]*)</a>"#,
);
const META_TITLE: &str = r#"<meta itemprop="name" content="(?P<v>[^"]*)">"#;
const META_DURATION: &str = r#"<meta itemprop="duration" content="(?P<v>[^"]*)">"#;
const META_CHANNEL: &str = r#"<link itemprop="name" content="(?P<v>[^"]*)">"#;
const PLAYLIST_TITLE: &str = r#"<meta property="og:title" content="(?P<v>[^"]*)">"#;
const PLAYLIST_CHANNEL: &str = r#"<a href="/(?:user|channel|@)[^"]*"[^>]*>(?P<v>[^<]+)</a>"#;
const PLAYLIST_COUNT: &str = r#"(?P<v>[\d,]+) videos"#;
const PLAYLIST_THUMB: &str = r#"https://i\.ytimg\.com/vi/(?P<v>[\w-]{11})/"#;
const PLAYLIST_ENTRY: &str =
    r#"data-title="(?P<title>[^"]+)"[^>]*?>[\s\S]*?<a href="/watch\?v=(?P<id>[\w-]{11})&amp;"#;

/// Metadata source that scrapes the public website.
pub struct ScrapeSource {
    client: Client,
    endpoint: String,
    search: Regex,
    meta_title: Regex,
    meta_duration: Regex,
    meta_channel: Regex,
    playlist_title: Regex,
    playlist_channel: Regex,
    playlist_count: Regex,
    playlist_thumb: Regex,
    playlist_entry: Regex,
}

impl ScrapeSource {
    pub fn new(client: Client) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            endpoint: SITE_ENDPOINT.to_string(),
            search: Regex::new(SEARCH_PATTERN)?,
            meta_title: Regex::new(META_TITLE)?,
            meta_duration: Regex::new(META_DURATION)?,
            meta_channel: Regex::new(META_CHANNEL)?,
            playlist_title: Regex::new(PLAYLIST_TITLE)?,
            playlist_channel: Regex::new(PLAYLIST_CHANNEL)?,
            playlist_count: Regex::new(PLAYLIST_COUNT)?,
            playlist_thumb: Regex::new(PLAYLIST_THUMB)?,
            playlist_entry: Regex::new(PLAYLIST_ENTRY)?,
        })
    }

    /// Point the source at a different base URL (must end with `/`).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn fetch(&self, page: &str, query: &[(&str, &str)]) -> Result<String, SourceError> {
        let response = self
            .client
            .get(format!("{}{}", self.endpoint, page))
            .query(query)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                endpoint: page.to_string(),
            });
        }

        Ok(response.text()?)
    }

    fn parse_search(&self, html: &str) -> Vec<SearchItem> {
        self.search
            .captures_iter(html)
            .map(|caps| {
                let video_id = caps.name("id").map_or("", |m| m.as_str());
                let playlist = caps.name("playlist").map(|m| m.as_str().to_string());

                let id = match playlist {
                    Some(playlist_id) => SearchId {
                        kind: KIND_PLAYLIST.into(),
                        video_id: None,
                        playlist_id: Some(playlist_id),
                    },
                    None => SearchId {
                        kind: KIND_VIDEO.into(),
                        video_id: Some(video_id.to_string()),
                        playlist_id: None,
                    },
                };

                let mut duration = String::new();
                for (group, unit) in [("hours", 'H'), ("minutes", 'M'), ("seconds", 'S')] {
                    if let Some(m) = caps.name(group) {
                        duration.push_str(m.as_str());
                        duration.push(unit);
                    }
                }

                let details = ContentDetails {
                    duration: (!duration.is_empty()).then(|| format!("PT{}", duration)),
                    item_count: caps.name("item_count").and_then(|m| m.as_str().parse().ok()),
                };

                SearchItem {
                    id,
                    snippet: Some(Snippet {
                        title: caps.name("title").map(|m| unescape_html(m.as_str())),
                        channel_title: caps.name("uploader").map(|m| unescape_html(m.as_str())),
                        thumbnails: Some(video_thumbnails(video_id)),
                        resource_id: None,
                    }),
                    content_details: (details.duration.is_some() || details.item_count.is_some())
                        .then_some(details),
                }
            })
            .collect()
    }

    fn parse_video(&self, id: &str, html: &str) -> Option<Resource> {
        let title = capture(&self.meta_title, html)?;
        Some(Resource {
            id: id.to_string(),
            snippet: Some(Snippet {
                title: Some(title),
                channel_title: capture(&self.meta_channel, html),
                thumbnails: Some(video_thumbnails(id)),
                resource_id: None,
            }),
            content_details: Some(ContentDetails {
                duration: capture(&self.meta_duration, html),
                item_count: None,
            }),
        })
    }

    fn parse_playlist(&self, id: &str, html: &str) -> Option<Resource> {
        let title = capture(&self.playlist_title, html)?;
        let thumbnails = capture(&self.playlist_thumb, html).map(|v| video_thumbnails(&v));
        let item_count = capture(&self.playlist_count, html).and_then(|c| c.replace(',', "").parse().ok());

        Some(Resource {
            id: id.to_string(),
            snippet: Some(Snippet {
                title: Some(title),
                channel_title: capture(&self.playlist_channel, html),
                thumbnails,
                resource_id: None,
            }),
            content_details: Some(ContentDetails {
                duration: None,
                item_count,
            }),
        })
    }

    fn parse_playlist_entries(&self, html: &str, max_results: usize) -> Vec<PlaylistEntry> {
        self.playlist_entry
            .captures_iter(html)
            .take(max_results)
            .map(|caps| PlaylistEntry {
                snippet: Some(Snippet {
                    title: caps.name("title").map(|m| unescape_html(m.as_str())),
                    channel_title: None,
                    thumbnails: None,
                    resource_id: Some(ResourceId {
                        video_id: caps.name("id").map(|m| m.as_str().to_string()),
                    }),
                }),
            })
            .collect()
    }
}

impl DataSource for ScrapeSource {
    fn name(&self) -> &'static str {
        "scrape"
    }

    fn search(&self, query: &str) -> Result<Vec<SearchItem>, SourceError> {
        let html = self.fetch("results", &[("search_query", query)])?;
        Ok(self.parse_search(&html))
    }

    fn list_videos(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let html = self.fetch("watch", &[("v", id)])?;
            items.extend(self.parse_video(id, &html));
        }
        Ok(items)
    }

    fn list_playlists(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let html = self.fetch("playlist", &[("list", id)])?;
            items.extend(self.parse_playlist(id, &html));
        }
        Ok(items)
    }

    /// The playlist page lists everything at once, so there is never a
    /// continuation token.
    fn list_playlist_items(
        &self,
        playlist_id: &str,
        _page_token: Option<&str>,
        max_results: usize,
    ) -> Result<PlaylistPage, SourceError> {
        let html = self.fetch("playlist", &[("list", playlist_id)])?;
        Ok(PlaylistPage {
            items: self.parse_playlist_entries(&html, max_results),
            next_page_token: None,
        })
    }
}

fn capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.name("v"))
        .map(|m| unescape_html(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Thumbnail map for a video, keyed like the API does.
fn video_thumbnails(video_id: &str) -> BTreeMap<String, Thumbnail> {
    [("medium", "mqdefault", 320, 180), ("high", "hqdefault", 480, 360)]
        .into_iter()
        .map(|(key, file, width, height)| {
            (
                key.to_string(),
                Thumbnail {
                    url: format!("https://i.ytimg.com/vi/{}/{}.jpg", video_id, file),
                    width: Some(width),
                    height: Some(height),
                },
            )
        })
        .collect()
}

fn unescape_html(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
