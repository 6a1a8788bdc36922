//! Catalog configuration.

use std::num::NonZeroUsize;

use super::parse::{env_nonzero, env_parse};
use super::ConfigError;
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::pool::DEFAULT_MAX_WORKERS;

/// Default cap on videos listed per playlist.
pub const DEFAULT_MAX_VIDEOS: usize = 60;

/// Number of IDs sent to the data source in one batch lookup.
pub const BATCH_SIZE: usize = 50;

/// Limits applied by the catalog, its caches and its worker pool.
///
/// All values are resolved at construction time and never zero.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    max_videos: NonZeroUsize,
    pool_workers: NonZeroUsize,
    cache_capacity: NonZeroUsize,
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_videos = env_nonzero("PLAYLIST_MAX_VIDEOS", DEFAULT_MAX_VIDEOS)?;
        let cache_capacity = env_nonzero("CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;

        // Resolve 0 to CPU count
        let workers = match env_parse("POOL_WORKERS", DEFAULT_MAX_WORKERS)? {
            0 => num_cpus::get(),
            n => n,
        };

        Ok(Self::default()
            .with_max_videos(max_videos)
            .with_pool_workers(workers)
            .with_cache_capacity(cache_capacity))
    }

    /// Cap on `video_count` and on the number of listed playlist videos.
    #[inline]
    pub fn max_videos(&self) -> usize {
        self.max_videos.get()
    }

    /// Maximum number of concurrently running pool workers.
    #[inline]
    pub fn pool_workers(&self) -> usize {
        self.pool_workers.get()
    }

    /// Resident entities per cache (videos and playlists each).
    #[inline]
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity.get()
    }

    /// Set the playlist cap. Zero is raised to one.
    pub fn with_max_videos(mut self, n: usize) -> Self {
        self.max_videos = NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Set the worker cap. Zero is raised to one.
    pub fn with_pool_workers(mut self, n: usize) -> Self {
        self.pool_workers = NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Set the cache capacity. Zero is raised to one.
    pub fn with_cache_capacity(mut self, n: usize) -> Self {
        self.cache_capacity = NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN);
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let nz = |n| NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN);
        Self {
            max_videos: nz(DEFAULT_MAX_VIDEOS),
            pool_workers: nz(DEFAULT_MAX_WORKERS),
            cache_capacity: nz(DEFAULT_CACHE_CAPACITY),
        }
    }
}
