//! tubecache - lazily populated metadata cache for YouTube videos and playlists.
//!
//! Entities are looked up by ID and expose each field as a [`FieldFuture`].
//! Fields are fetched on first access, in batches of up to 50 IDs per remote
//! call, on a small self-shrinking worker pool. Remote failures never surface
//! as errors: the affected fields resolve to `None`.
//!
//! # Architecture
//!
//! ```text
//!  Catalog ──► EntityCache<(kind, id), Entry>   (one instance per ID, one LRU bound)
//!     │
//!     ├──► WorkerPool ──► batch jobs ──► DataSource (ApiSource | ScrapeSource)
//!     │                └► audio jobs ──► StreamResolver (yt-dlp)
//!     └──► search (calling thread)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tubecache::{Catalog, Config};
//!
//! let catalog = Catalog::from_config(&Config::from_env()?)?;
//! for entry in catalog.search("lofi").unwrap_or_default() {
//!     println!("{} {:?}", entry.id(), entry.title().get());
//! }
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty when built outside a checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod cache;
pub mod catalog;
pub mod config;
pub mod entity;
pub mod future;
pub mod logging;
pub mod pool;
pub mod resolver;
pub mod source;

// Re-exports for convenience
pub use cache::EntityCache;
pub use catalog::Catalog;
pub use config::Config;
pub use entity::{Entry, Playlist, Video};
pub use future::FieldFuture;
pub use pool::WorkerPool;
pub use resolver::{StreamResolver, YtDlpResolver};
pub use source::{DataSource, SourceError};
