//! Video entity.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use super::batch::{self, Populate};
use super::fields::{self, Field};
use crate::catalog::Shared;
use crate::future::FieldFuture;
use crate::source::{DataSource, RecordView, Resource, SourceError};

#[derive(Default)]
pub(crate) struct VideoFields {
    pub(crate) title: Option<FieldFuture<String>>,
    pub(crate) channel: Option<FieldFuture<String>>,
    pub(crate) length: Option<FieldFuture<u64>>,
    pub(crate) thumbnails: Option<FieldFuture<Vec<String>>>,
    pub(crate) audio_url: Option<FieldFuture<String>>,
}

/// A YouTube video.
///
/// Obtained from [`Catalog::video`](crate::Catalog::video); one instance per
/// ID while cached. Every accessor returns immediately with a
/// [`FieldFuture`]; the first access to an info field (`title`, `channel`,
/// `length`) schedules one batch lookup for all three.
pub struct Video {
    id: String,
    catalog: Weak<Shared>,
    fields: Mutex<VideoFields>,
}

/// Info futures handed to a batch job.
pub(crate) struct VideoInfo {
    title: FieldFuture<String>,
    channel: FieldFuture<String>,
    length: FieldFuture<u64>,
}

impl Video {
    pub(crate) fn new(id: impl Into<String>, catalog: Weak<Shared>) -> Self {
        Self {
            id: id.into(),
            catalog,
            fields: Mutex::new(VideoFields::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> MutexGuard<'_, VideoFields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule a lookup of the info fields, if none is pending.
    pub fn load_info(&self) {
        let shared = self.catalog.upgrade();
        batch::populate(shared.as_ref(), [self]);
    }

    fn info_field<T>(
        &self,
        slot: fn(&mut VideoFields) -> &mut Option<FieldFuture<T>>,
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

    /// Duration in seconds.
    pub fn length(&self) -> FieldFuture<u64> {
        self.info_field(|f| &mut f.length)
    }

    /// Thumbnail URLs, derived from the ID without a lookup.
    pub fn thumbnails(&self) -> FieldFuture<Vec<String>> {
        self.lock()
            .thumbnails
            .get_or_insert_with(|| FieldFuture::resolved(Some(video_thumbnails(&self.id))))
            .clone()
    }

    /// Playable audio stream URL.
    ///
    /// Resolved at most once per instance, by its own pool job.
    pub fn audio_url(&self) -> FieldFuture<String> {
        let (future, created) = fields::claim(&mut self.lock().audio_url);
        if !created {
            return future;
        }

        let Some(shared) = self.catalog.upgrade() else {
            future.set_absent();
            return future;
        };

        let resolver = Arc::clone(&shared.resolver);
        let id = self.id.clone();
        let guard = AbsentOnDrop(future.clone());
        shared.pool.submit(move || {
            match resolver.resolve_audio_url(&id) {
                Ok(url) => {
                    debug!(id = %id, "audio url resolved");
                    guard.0.set(Some(url));
                }
                Err(e) => warn!(id = %id, error = %e, "audio url resolution failed"),
            }
            drop(guard);
        });
        future
    }

    /// Set the title carried by a playlist page entry.
    ///
    /// Page entries describe the playlist item, so their channel is the
    /// playlist owner's and is left to the batch lookup.
    pub(crate) fn apply_title(&self, view: RecordView<'_>) {
        if let Some(title) = fields::title(view) {
            fields::resolve(&self.fields, |f| &mut f.title, title);
        }
    }

    /// Set fields carried by a search hit.
    pub(crate) fn apply_summary(&self, view: RecordView<'_>) {
        if let Some(title) = fields::title(view) {
            fields::resolve(&self.fields, |f| &mut f.title, title);
        }
        if let Some(channel) = fields::channel(view) {
            fields::resolve(&self.fields, |f| &mut f.channel, channel);
        }
        if let Some(length) = fields::length(view) {
            fields::resolve(&self.fields, |f| &mut f.length, length);
        }
    }
}

impl Populate for Video {
    const KIND: &'static str = "video";
    const INFO_FIELDS: &'static [Field] = &[Field::Title, Field::Length, Field::Channel];

    type Claim = VideoInfo;

    fn id(&self) -> &str {
        &self.id
    }

    fn claim_info(&self) -> Option<VideoInfo> {
        let mut slots = self.lock();
        let (title, a) = fields::claim(&mut slots.title);
        let (channel, b) = fields::claim(&mut slots.channel);
        let (length, c) = fields::claim(&mut slots.length);
        (a || b || c).then_some(VideoInfo {
            title,
            channel,
            length,
        })
    }

    fn apply(claim: &VideoInfo, record: Option<RecordView<'_>>, _max_videos: usize) {
        let view = record.unwrap_or_default();
        claim.title.set(fields::title(view));
        claim.channel.set(fields::channel(view));
        claim.length.set(fields::length(view));
    }

    fn fetch(source: &dyn DataSource, ids: &[String]) -> Result<Vec<Resource>, SourceError> {
        source.list_videos(ids)
    }
}

impl fmt::Debug for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Video").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Resolves a future to absent when dropped, unless it is already set.
pub(crate) struct AbsentOnDrop<T>(pub(crate) FieldFuture<T>);

impl<T> Drop for AbsentOnDrop<T> {
    fn drop(&mut self) {
        self.0.set_absent();
    }
}

/// Thumbnail URLs of a video, smallest first.
pub fn video_thumbnails(id: &str) -> Vec<String> {
    ["mqdefault", "hqdefault"]
        .iter()
        .map(|size| format!("https://i.ytimg.com/vi/{}/{}.jpg", id, size))
        .collect()
}
