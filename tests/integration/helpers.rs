//! Test helpers: an in-memory data source and resolver.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tubecache::config::CatalogConfig;
use tubecache::resolver::ResolveError;
use tubecache::source::{
    ContentDetails, PlaylistEntry, PlaylistPage, Resource, ResourceId, SearchId, SearchItem,
    Snippet, Thumbnail, KIND_PLAYLIST, KIND_VIDEO,
};
use tubecache::{Catalog, DataSource, FieldFuture, SourceError, StreamResolver};

/// How long a test waits on a field before declaring it stuck.
pub const WAIT: Duration = Duration::from_secs(10);

/// Wait for a field, failing the test if it never resolves.
pub fn wait<T: Clone>(future: &FieldFuture<T>) -> Option<T> {
    future
        .get_timeout(WAIT)
        .expect("field future was never resolved")
}

/// A call received by [`FakeSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Videos(Vec<String>),
    Playlists(Vec<String>),
    Items {
        playlist: String,
        page_token: Option<String>,
        max_results: usize,
    },
}

/// In-memory [`DataSource`] that records every call.
#[derive(Default)]
pub struct FakeSource {
    videos: HashMap<String, Resource>,
    playlists: HashMap<String, Resource>,
    entries: HashMap<String, Vec<(String, String)>>,
    search: Vec<SearchItem>,
    fail_batches: bool,
    fail_search: bool,
    /// Zero-based page index whose request fails
    fail_page: Option<usize>,
    latency: Duration,
    pages_served: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, id: &str, title: &str, channel: &str, duration: Option<&str>) -> Self {
        self.videos.insert(
            id.to_string(),
            Resource {
                id: id.to_string(),
                snippet: Some(Snippet {
                    title: Some(title.to_string()),
                    channel_title: Some(channel.to_string()),
                    ..Default::default()
                }),
                content_details: Some(ContentDetails {
                    duration: duration.map(str::to_string),
                    ..Default::default()
                }),
            },
        );
        self
    }

    /// Register `n` videos named `<prefix>0`, `<prefix>1`, ...
    pub fn with_videos(mut self, prefix: &str, n: usize) -> Self {
        for i in 0..n {
            let id = format!("{}{}", prefix, i);
            self = self.with_video(&id, &format!("Video {}", i), "Channel", Some("PT1M"));
        }
        self
    }

    pub fn with_playlist(mut self, id: &str, title: &str, item_count: u64) -> Self {
        self.playlists.insert(
            id.to_string(),
            Resource {
                id: id.to_string(),
                snippet: Some(Snippet {
                    title: Some(title.to_string()),
                    channel_title: Some("Curator".to_string()),
                    thumbnails: Some(thumbnails(id)),
                    ..Default::default()
                }),
                content_details: Some(ContentDetails {
                    item_count: Some(item_count),
                    ..Default::default()
                }),
            },
        );
        self
    }

    /// Give playlist `id` `n` entries, each backed by a registered video.
    pub fn with_entries(mut self, id: &str, n: usize) -> Self {
        let prefix = format!("{}-v", id);
        let entries = (0..n)
            .map(|i| (format!("{}{}", prefix, i), format!("Entry {}", i)))
            .collect();
        self.entries.insert(id.to_string(), entries);
        self.with_videos(&prefix, n)
    }

    pub fn with_search_video(mut self, id: &str, title: &str, duration: Option<&str>) -> Self {
        self.search.push(SearchItem {
            id: SearchId {
                kind: KIND_VIDEO.to_string(),
                video_id: Some(id.to_string()),
                playlist_id: None,
            },
            snippet: Some(Snippet {
                title: Some(title.to_string()),
                channel_title: Some("Uploader".to_string()),
                ..Default::default()
            }),
            content_details: duration.map(|d| ContentDetails {
                duration: Some(d.to_string()),
                item_count: None,
            }),
        });
        self
    }

    pub fn with_search_playlist(mut self, id: &str, title: &str, item_count: Option<u64>) -> Self {
        self.search.push(SearchItem {
            id: SearchId {
                kind: KIND_PLAYLIST.to_string(),
                video_id: None,
                playlist_id: Some(id.to_string()),
            },
            snippet: Some(Snippet {
                title: Some(title.to_string()),
                channel_title: Some("Curator".to_string()),
                thumbnails: Some(thumbnails(id)),
                ..Default::default()
            }),
            content_details: item_count.map(|n| ContentDetails {
                duration: None,
                item_count: Some(n),
            }),
        });
        self
    }

    pub fn with_search_channel(mut self, id: &str) -> Self {
        self.search.push(SearchItem {
            id: SearchId {
                kind: "youtube#channel".to_string(),
                ..Default::default()
            },
            snippet: Some(Snippet {
                title: Some(id.to_string()),
                ..Default::default()
            }),
            content_details: None,
        });
        self
    }

    pub fn failing_batches(mut self) -> Self {
        self.fail_batches = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_page(mut self, index: usize) -> Self {
        self.fail_page = Some(index);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Sizes of the video batch lookups, in call order.
    pub fn video_batches(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Videos(ids) => Some(ids.len()),
                _ => None,
            })
            .collect()
    }

    pub fn playlist_batches(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Playlists(ids) => Some(ids.len()),
                _ => None,
            })
            .collect()
    }

    /// `max_results` of each page request, in call order.
    pub fn page_requests(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Items { max_results, .. } => Some(max_results),
                _ => None,
            })
            .collect()
    }

    /// Every video ID that was looked up, with duplicates.
    pub fn looked_up_videos(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Videos(ids) => Some(ids),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }

    fn lookup(
        &self,
        table: &HashMap<String, Resource>,
        ids: &[String],
    ) -> Result<Vec<Resource>, SourceError> {
        if self.fail_batches {
            return Err(SourceError::Status {
                status: 503,
                endpoint: "videos".to_string(),
            });
        }
        Ok(ids.iter().filter_map(|id| table.get(id).cloned()).collect())
    }
}

impl DataSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn search(&self, query: &str) -> Result<Vec<SearchItem>, SourceError> {
        self.record(Call::Search(query.to_string()));
        if self.fail_search {
            return Err(SourceError::Parse("garbled search page".to_string()));
        }
        Ok(self.search.clone())
    }

    fn list_videos(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        self.record(Call::Videos(ids.to_vec()));
        self.lookup(&self.videos, ids)
    }

    fn list_playlists(&self, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        self.record(Call::Playlists(ids.to_vec()));
        self.lookup(&self.playlists, ids)
    }

    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: usize,
    ) -> Result<PlaylistPage, SourceError> {
        self.record(Call::Items {
            playlist: playlist_id.to_string(),
            page_token: page_token.map(str::to_string),
            max_results,
        });

        let index = {
            let mut requests = self.pages_served.lock().unwrap();
            let n = requests.entry(playlist_id.to_string()).or_insert(0);
            *n += 1;
            *n - 1
        };
        if self.fail_page == Some(index) {
            return Err(SourceError::Unavailable("connection reset".to_string()));
        }

        let all = self.entries.get(playlist_id).cloned().unwrap_or_default();
        let offset: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let end = (offset + max_results).min(all.len());
        let items = all[offset.min(end)..end]
            .iter()
            .map(|(video_id, title)| PlaylistEntry {
                snippet: Some(Snippet {
                    title: Some(title.clone()),
                    // Playlist owner, not the video's uploader
                    channel_title: Some("Curator".to_string()),
                    resource_id: Some(ResourceId {
                        video_id: Some(video_id.clone()),
                    }),
                    ..Default::default()
                }),
            })
            .collect();

        Ok(PlaylistPage {
            items,
            next_page_token: (end < all.len()).then(|| end.to_string()),
        })
    }
}

fn thumbnails(id: &str) -> BTreeMap<String, Thumbnail> {
    ["default", "medium", "high"]
        .iter()
        .map(|size| {
            (
                size.to_string(),
                Thumbnail {
                    url: format!("https://img/{}/{}.jpg", id, size),
                    width: None,
                    height: None,
                },
            )
        })
        .collect()
}

/// Resolver returning `https://audio/<id>`, or failing for chosen IDs.
#[derive(Default)]
pub struct FakeResolver {
    failing: HashSet<String>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeResolver {
    pub fn failing_for(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StreamResolver for FakeResolver {
    fn resolve_audio_url(&self, video_id: &str) -> Result<String, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(video_id) {
            return Err(ResolveError::NoUrl);
        }
        Ok(format!("https://audio/{}", video_id))
    }
}

/// A catalog over `source`, keeping handles to the fakes for assertions.
pub struct Harness {
    pub catalog: Catalog,
    pub source: Arc<FakeSource>,
    pub resolver: Arc<FakeResolver>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(source: FakeSource) -> Self {
        Self::with_config(source, CatalogConfig::default())
    }

    pub fn with_config(source: FakeSource, config: CatalogConfig) -> Self {
        Self::with_resolver(source, FakeResolver::default(), config)
    }

    pub fn with_resolver(source: FakeSource, resolver: FakeResolver, config: CatalogConfig) -> Self {
        let source = Arc::new(source);
        let resolver = Arc::new(resolver);
        let catalog = Catalog::new(config, source.clone(), resolver.clone());
        Self {
            catalog,
            source,
            resolver,
        }
    }

    /// Block until every scheduled job has run.
    pub fn settle(&self) {
        assert!(
            self.catalog.pool().wait_idle_timeout(WAIT),
            "worker pool did not go idle"
        );
    }
}
