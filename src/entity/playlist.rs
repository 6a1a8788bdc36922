//! Playlist entity and child enumeration.

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use super::batch::{self, Populate};
use super::fields::{self, Field};
use super::video::Video;
use crate::catalog::Shared;
use crate::config::BATCH_SIZE;
use crate::future::FieldFuture;
use crate::source::{DataSource, RecordView, Resource, SourceError};

#[derive(Default)]
pub(crate) struct PlaylistFields {
    pub(crate) title: Option<FieldFuture<String>>,
    pub(crate) channel: Option<FieldFuture<String>>,
    pub(crate) video_count: Option<FieldFuture<usize>>,
    pub(crate) thumbnails: Option<FieldFuture<Vec<String>>>,
    pub(crate) videos: Option<FieldFuture<Vec<Arc<Video>>>>,
}

/// A YouTube playlist.
///
/// Info fields (`title`, `channel`, `video_count`, `thumbnails`) share one
/// batch lookup. [`videos`](Self::videos) pages through the playlist on a
/// pool job, capped at the catalog's `max_videos`.
pub struct Playlist {
    id: String,
    catalog: Weak<Shared>,
    fields: Mutex<PlaylistFields>,
}

pub(crate) struct PlaylistInfo {
    title: FieldFuture<String>,
    channel: FieldFuture<String>,
    video_count: FieldFuture<usize>,
    thumbnails: FieldFuture<Vec<String>>,
}

impl Playlist {
    pub(crate) fn new(id: impl Into<String>, catalog: Weak<Shared>) -> Self {
        Self {
            id: id.into(),
            catalog,
            fields: Mutex::new(PlaylistFields::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> MutexGuard<'_, PlaylistFields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule a lookup of the info fields, if none is pending.
    pub fn load_info(&self) {
        let shared = self.catalog.upgrade();
        batch::populate(shared.as_ref(), [self]);
    }

    fn info_field<T>(
        &self,
        slot: fn(&mut PlaylistFields) -> &mut Option<FieldFuture<T>>,
    ) -> FieldFuture<T> {
        if let Some(future) = slot(&mut self.lock()).clone() {
            return future;
        }
        self.load_info();
        slot(&mut self.lock())
            .clone()
            .unwrap_or_else(|| FieldFuture::resolved(None))
    }

    pub fn title(&self) -> FieldFuture<String> {
        self.info_field(|f| &mut f.title)
    }

    pub fn channel(&self) -> FieldFuture<String> {
        self.info_field(|f| &mut f.channel)
    }

    /// Number of videos, at most `max_videos`.
    pub fn video_count(&self) -> FieldFuture<usize> {
        self.info_field(|f| &mut f.video_count)
    }

    pub fn thumbnails(&self) -> FieldFuture<Vec<String>> {
        self.info_field(|f| &mut f.thumbnails)
    }

    /// Videos of the playlist, in playlist order.
    ///
    /// Pages are fetched one after another; the videos of each page get their
    /// own info lookup in the background while the next page loads. A failed
    /// page ends the listing with what was collected so far.
    #[doc(alias = "children")]
    pub fn videos(&self) -> FieldFuture<Vec<Arc<Video>>> {
        let (future, created) = fields::claim(&mut self.lock().videos);
        if !created {
            return future;
        }

        let Some(shared) = self.catalog.upgrade() else {
            future.set_absent();
            return future;
        };

        let id = self.id.clone();
        let listing = Listing {
            future: future.clone(),
            videos: Vec::new(),
        };
        let job_shared = Arc::clone(&shared);
        shared
            .pool
            .submit(move || enumerate(&job_shared, &id, listing));
        future
    }

    /// Set fields carried by a search hit.
    pub(crate) fn apply_summary(&self, view: RecordView<'_>, max_videos: usize) {
        if let Some(title) = fields::title(view) {
            fields::resolve(&self.fields, |f| &mut f.title, title);
        }
        if let Some(channel) = fields::channel(view) {
            fields::resolve(&self.fields, |f| &mut f.channel, channel);
        }
        if let Some(thumbnails) = fields::thumbnails(view) {
            fields::resolve(&self.fields, |f| &mut f.thumbnails, thumbnails);
        }
        if let Some(count) = fields::video_count(view, max_videos) {
            fields::resolve(&self.fields, |f| &mut f.video_count, count);
        }
    }
}

/// Collected videos; resolves the listing future when dropped.
struct Listing {
    future: FieldFuture<Vec<Arc<Video>>>,
    videos: Vec<Arc<Video>>,
}

impl Drop for Listing {
    fn drop(&mut self) {
        self.future.set(Some(mem::take(&mut self.videos)));
    }
}

fn enumerate(shared: &Arc<Shared>, playlist_id: &str, mut listing: Listing) {
    let max_videos = shared.config.max_videos();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let remaining = max_videos.saturating_sub(listing.videos.len());
        if remaining == 0 {
            break;
        }

        let page = match shared.source.list_playlist_items(
            playlist_id,
            page_token.as_deref(),
            remaining.min(BATCH_SIZE),
        ) {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    playlist = %playlist_id,
                    page = pages,
                    collected = listing.videos.len(),
                    error = %e,
                    "playlist page failed, keeping partial listing"
                );
                break;
            }
        };
        pages += 1;

        if page.items.is_empty() {
            break;
        }

        let fresh: Vec<Arc<Video>> = page
            .items
            .iter()
            .filter_map(|entry| {
                let video = shared.video(entry.video_id()?);
                video.apply_title(RecordView::from(entry));
                Some(video)
            })
            .take(remaining)
            .collect();

        batch::populate(Some(shared), fresh.iter().map(|v| &**v));
        listing.videos.extend(fresh);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    debug!(
        playlist = %playlist_id,
        pages,
        videos = listing.videos.len(),
        "playlist listed"
    );
}

impl Populate for Playlist {
    const KIND: &'static str = "playlist";
    const INFO_FIELDS: &'static [Field] = &[
        Field::Title,
        Field::VideoCount,
        Field::Thumbnails,
        Field::Channel,
    ];

    type Claim = PlaylistInfo;

    fn id(&self) -> &str {
        &self.id
    }

    fn claim_info(&self) -> Option<PlaylistInfo> {
        let mut slots = self.lock();
        let (title, a) = fields::claim(&mut slots.title);
        let (channel, b) = fields::claim(&mut slots.channel);
        let (video_count, c) = fields::claim(&mut slots.video_count);
        let (thumbnails, d) = fields::claim(&mut slots.thumbnails);
        (a || b || c || d).then_some(PlaylistInfo {
            title,
            channel,
            video_count,
            thumbnails,
        })
    }

    fn apply(claim: &PlaylistInfo, record: Option<RecordView<'_>>, max_videos: usize) {
        let view = record.unwrap_or_default();
        claim.title.set(fields::title(view));
        claim.channel.set(fields::channel(view));
        claim.video_count.set(fields::video_count(view, max_videos));
        claim.thumbnails.set(fields::thumbnails(view));
    }

    fn fetch(source: &dyn DataSource, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        source.list_playlists(ids)
    }
}

impl fmt::Debug for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playlist")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
