//! Lazily populated video and playlist records.
//!
//! ```text
//!   video.title()          ┌───────────────────────────┐
//!   ──────────────────────►│ slot empty? claim futures │──► batch job ──► DataSource
//!   ◄── FieldFuture ───────│ for title/channel/length  │        │
//!                          └───────────────────────────┘        ▼
//!   future.get() blocks ◄──────────────────────────── set(Some(v)) / set(None)
//! ```
//!
//! A field that was never requested has no future. Every future that is
//! created is resolved by exactly one job, on every path including errors.

mod batch;
mod fields;
mod playlist;
mod video;

use std::sync::Arc;

pub(crate) use batch::populate;
pub use fields::{parse_duration, Field, THUMBNAIL_SIZES};
pub use playlist::Playlist;
pub use video::{video_thumbnails, Video};

/// A search hit: a video or a playlist.
#[derive(Debug, Clone)]
pub enum Entry {
    Video(Arc<Video>),
    Playlist(Arc<Playlist>),
}

impl Entry {
    pub fn id(&self) -> &str {
        match self {
            Entry::Video(v) => v.id(),
            Entry::Playlist(p) => p.id(),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Entry::Video(_))
    }

    pub fn title(&self) -> crate::future::FieldFuture<String> {
        match self {
            Entry::Video(v) => v.title(),
            Entry::Playlist(p) => p.title(),
        }
    }

    pub fn as_video(&self) -> Option<&Arc<Video>> {
        match self {
            Entry::Video(v) => Some(v),
            Entry::Playlist(_) => None,
        }
    }

    pub fn as_playlist(&self) -> Option<&Arc<Playlist>> {
        match self {
            Entry::Playlist(p) => Some(p),
            Entry::Video(_) => None,
        }
    }
}
