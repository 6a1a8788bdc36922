//! Field names and raw-record to field-value mapping.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::future::FieldFuture;
use crate::source::RecordView;

/// Thumbnail sizes kept from a record, in output order.
pub const THUMBNAIL_SIZES: [&str; 2] = ["medium", "high"];

/// Name of a lazily populated entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Channel,
    Length,
    VideoCount,
    Thumbnails,
    AudioUrl,
    Videos,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Channel => "channel",
            Field::Length => "length",
            Field::VideoCount => "video_count",
            Field::Thumbnails => "thumbnails",
            Field::AudioUrl => "audio_url",
            Field::Videos => "videos",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an ISO 8601 duration of the form `PT#H#M#S` into seconds.
///
/// Every component is optional. Anything else (days, fractions, stray
/// characters, a missing `PT` prefix) yields `None`.
///
/// ```
/// use tubecache::entity::parse_duration;
///
/// assert_eq!(parse_duration("PT1H2M10S"), Some(3730));
/// assert_eq!(parse_duration("PT5M"), Some(300));
/// assert_eq!(parse_duration("P1D"), None);
/// ```
pub fn parse_duration(s: &str) -> Option<u64> {
    let mut rest = s.strip_prefix("PT")?;
    let mut total: u64 = 0;
    // Units must appear in this order, each at most once.
    for (unit, factor) in [('H', 3600), ('M', 60), ('S', 1)] {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || rest[digits..].chars().next() != Some(unit) {
            continue;
        }
        let n: u64 = rest[..digits].parse().ok()?;
        total = total.checked_add(n.checked_mul(factor)?)?;
        rest = &rest[digits + 1..];
    }
    rest.is_empty().then_some(total)
}

pub(crate) fn title(view: RecordView<'_>) -> Option<String> {
    view.snippet?.title.clone()
}

pub(crate) fn channel(view: RecordView<'_>) -> Option<String> {
    view.snippet?.channel_title.clone()
}

pub(crate) fn length(view: RecordView<'_>) -> Option<u64> {
    parse_duration(view.details?.duration.as_deref()?)
}

/// Item count, clamped to `max`.
pub(crate) fn video_count(view: RecordView<'_>, max: usize) -> Option<usize> {
    let count = view.details?.item_count?;
    Some(usize::try_from(count).unwrap_or(usize::MAX).min(max))
}

/// Allowed thumbnail URLs in [`THUMBNAIL_SIZES`] order.
pub(crate) fn thumbnails(view: RecordView<'_>) -> Option<Vec<String>> {
    let map = view.snippet?.thumbnails.as_ref()?;
    Some(
        THUMBNAIL_SIZES
            .iter()
            .filter_map(|size| map.get(*size))
            .map(|thumb| thumb.url.clone())
            .collect(),
    )
}

/// Create the slot's future if the field was never requested.
///
/// Returns the future and whether this call created it.
pub(crate) fn claim<T>(slot: &mut Option<FieldFuture<T>>) -> (FieldFuture<T>, bool) {
    match slot {
        Some(future) => (future.clone(), false),
        None => {
            let future = FieldFuture::new();
            *slot = Some(future.clone());
            (future, true)
        }
    }
}

/// Resolve a field from data already at hand, unless it is resolved.
pub(crate) fn resolve<F, T, S>(fields: &Mutex<F>, slot: S, value: T)
where
    S: FnOnce(&mut F) -> &mut Option<FieldFuture<T>>,
{
    let future = {
        let mut guard = fields.lock().unwrap_or_else(PoisonError::into_inner);
        claim(slot(&mut guard)).0
    };
    future.set(Some(value));
}
