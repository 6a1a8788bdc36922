//! Catalog: the entry point tying pool, caches and collaborators together.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::EntityCache;
use crate::config::{CatalogConfig, Config};
use crate::entity::{Entry, Playlist, Video};
use crate::pool::WorkerPool;
use crate::resolver::{StreamResolver, YtDlpResolver};
use crate::source::{self, DataSource, RecordView, SearchTarget, SourceError};

/// Cache key: a video and a playlist may share an ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Video,
    Playlist,
}

type Key = (Kind, Box<str>);

fn key(kind: Kind, id: &str) -> Key {
    (kind, Box::from(id))
}

/// State reachable from every entity through a weak handle.
pub(crate) struct Shared {
    pub(crate) config: CatalogConfig,
    pub(crate) pool: WorkerPool,
    pub(crate) source: Arc<dyn DataSource>,
    pub(crate) resolver: Arc<dyn StreamResolver>,
    /// Videos and playlists under one capacity and one LRU order.
    entities: EntityCache<Key, Entry>,
}

impl Shared {
    pub(crate) fn video(self: &Arc<Self>, id: &str) -> Arc<Video> {
        let entry = self.entities.get_or_insert_with(&key(Kind::Video, id), || {
            Entry::Video(Arc::new(Video::new(id, Arc::downgrade(self))))
        });
        match entry {
            Entry::Video(video) => video,
            Entry::Playlist(_) => unreachable!("video key {} holds a playlist", id),
        }
    }

    pub(crate) fn playlist(self: &Arc<Self>, id: &str) -> Arc<Playlist> {
        let entry = self.entities.get_or_insert_with(&key(Kind::Playlist, id), || {
            Entry::Playlist(Arc::new(Playlist::new(id, Arc::downgrade(self))))
        });
        match entry {
            Entry::Playlist(playlist) => playlist,
            Entry::Video(_) => unreachable!("playlist key {} holds a video", id),
        }
    }
}

/// Lazily populated metadata for YouTube videos and playlists.
///
/// ```rust,ignore
/// let catalog = Catalog::from_config(&Config::from_env()?)?;
/// let video = catalog.video("7uj0hOIm2kY");
/// let (title, length) = (video.title(), video.length());
/// println!("{:?} ({:?}s)", title.get(), length.get());
/// ```
///
/// Entities keep only a weak handle to the catalog. Once the catalog is
/// dropped, fields that were never requested resolve to absent.
pub struct Catalog {
    shared: Arc<Shared>,
}

impl Catalog {
    pub fn new(
        config: CatalogConfig,
        source: Arc<dyn DataSource>,
        resolver: Arc<dyn StreamResolver>,
    ) -> Self {
        let pool = WorkerPool::new(config.pool_workers(), "tubecache");
        let shared = Shared {
            entities: EntityCache::with_capacity(config.cache_capacity()),
            config,
            pool,
            source,
            resolver,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Build the data source and resolver selected by `config`.
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let source = source::from_config(&config.source)?;
        let resolver = YtDlpResolver::new(config.source.ytdlp_path.clone());
        Ok(Self::new(config.catalog.clone(), source, Arc::new(resolver)))
    }

    /// The canonical video for `id`, created on first use.
    pub fn video(&self, id: &str) -> Arc<Video> {
        self.shared.video(id)
    }

    /// The canonical playlist for `id`, created on first use.
    pub fn playlist(&self, id: &str) -> Arc<Playlist> {
        self.shared.playlist(id)
    }

    /// Schedule info lookups for many videos at once, in batches.
    pub fn load_videos(&self, videos: &[Arc<Video>]) {
        crate::entity::populate(Some(&self.shared), videos.iter().map(|v| &**v));
    }

    /// Schedule info lookups for many playlists at once, in batches.
    pub fn load_playlists(&self, playlists: &[Arc<Playlist>]) {
        crate::entity::populate(Some(&self.shared), playlists.iter().map(|p| &**p));
    }

    /// Search videos and playlists.
    ///
    /// Runs the remote call on the calling thread. Fields carried by the
    /// results are set right away. Returns `None` if the search failed.
    pub fn search(&self, query: &str) -> Option<Vec<Entry>> {
        let items = match self.shared.source.search(query) {
            Ok(items) => items,
            Err(e) => {
                error!(
                    query = %query,
                    source = self.shared.source.name(),
                    error = %e,
                    "search failed"
                );
                return None;
            }
        };

        let max_videos = self.shared.config.max_videos();
        let entries: Vec<Entry> = items
            .iter()
            .filter_map(|item| {
                let view = RecordView::from(item);
                match item.id.target()? {
                    SearchTarget::Video(id) => {
                        let video = self.video(id);
                        video.apply_summary(view);
                        Some(Entry::Video(video))
                    }
                    SearchTarget::Playlist(id) => {
                        let playlist = self.playlist(id);
                        playlist.apply_summary(view, max_videos);
                        Some(Entry::Playlist(playlist))
                    }
                }
            })
            .collect();

        debug!(query = %query, results = entries.len(), "search done");
        Some(entries)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.shared.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.shared.pool
    }

    /// Number of resident entities, videos and playlists together.
    pub fn cached(&self) -> usize {
        self.shared.entities.len()
    }

    /// Check whether a video is resident, without creating it.
    pub fn has_video(&self, id: &str) -> bool {
        self.shared.entities.contains(&key(Kind::Video, id))
    }

    /// Check whether a playlist is resident, without creating it.
    pub fn has_playlist(&self, id: &str) -> bool {
        self.shared.entities.contains(&key(Kind::Playlist, id))
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("source", &self.shared.source.name())
            .field("pool", &self.shared.pool)
            .field("entities", &self.shared.entities.len())
            .finish()
    }
}
