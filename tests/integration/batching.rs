//! Batched info lookups.

use std::sync::Arc;

use tubecache::config::CatalogConfig;
use tubecache::Video;

use crate::helpers::*;

fn videos(h: &Harness, prefix: &str, n: usize) -> Vec<Arc<Video>> {
    (0..n).map(|i| h.catalog.video(&format!("{}{}", prefix, i))).collect()
}

/// 120 videos are fetched in three calls of 50, 50 and 20, in order
#[test]
fn test_batches_of_fifty_in_order() {
    // One worker runs the batches in submission order
    let config = CatalogConfig::default().with_pool_workers(1);
    let h = Harness::with_config(FakeSource::new().with_videos("v", 120), config);
    let all = videos(&h, "v", 120);

    h.catalog.load_videos(&all);
    h.settle();

    assert_eq!(h.source.video_batches(), vec![50, 50, 20]);
    let expected: Vec<String> = (0..120).map(|i| format!("v{}", i)).collect();
    assert_eq!(h.source.looked_up_videos(), expected);

    for (i, video) in all.iter().enumerate() {
        assert_eq!(wait(&video.title()), Some(format!("Video {}", i)));
        assert_eq!(wait(&video.length()), Some(60));
    }
}

/// Batch sizes do not depend on how many workers run them
#[test]
fn test_batches_with_parallel_workers() {
    let config = CatalogConfig::default().with_pool_workers(4);
    let h = Harness::with_config(FakeSource::new().with_videos("v", 120), config);
    let all = videos(&h, "v", 120);

    h.catalog.load_videos(&all);
    h.settle();

    let mut sizes = h.source.video_batches();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![20, 50, 50]);

    let mut ids = h.source.looked_up_videos();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 120);
}

/// Entities that already have their futures are skipped
#[test]
fn test_pending_entities_are_not_batched_twice() {
    let config = CatalogConfig::default().with_pool_workers(1);
    let h = Harness::with_config(FakeSource::new().with_videos("v", 10), config);
    let all = videos(&h, "v", 10);

    // v0..v3 are claimed by their own request first
    h.catalog.load_videos(&all[..4]);
    h.catalog.load_videos(&all);
    h.settle();

    assert_eq!(h.source.video_batches(), vec![4, 6]);
}

/// Duration strings map to seconds; absent or malformed ones to None
#[test]
fn test_duration_mapping() {
    let source = FakeSource::new()
        .with_video("a", "A", "C", Some("PT1H2M10S"))
        .with_video("b", "B", "C", Some("PT5M"))
        .with_video("c", "C", "C", Some("PT10S"))
        .with_video("d", "D", "C", None)
        .with_video("e", "E", "C", Some("P1D"));
    let h = Harness::new(source);

    let lengths: Vec<_> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| h.catalog.video(id).length())
        .collect();
    let lengths: Vec<_> = lengths.iter().map(wait).collect();

    assert_eq!(lengths, vec![Some(3730), Some(300), Some(10), None, None]);
}

/// A failed batch resolves every requested field of every entity to absent
#[test]
fn test_failed_batch_resolves_absent() {
    let h = Harness::new(FakeSource::new().with_videos("v", 60).failing_batches());
    let all = videos(&h, "v", 60);

    h.catalog.load_videos(&all);
    for video in &all {
        assert_eq!(wait(&video.title()), None);
        assert_eq!(wait(&video.channel()), None);
        assert_eq!(wait(&video.length()), None);
    }

    h.settle();
    assert_eq!(h.catalog.pool().stats().panicked, 0);
    let mut sizes = h.source.video_batches();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![10, 50]);
}

/// IDs missing from the response resolve to absent; the rest are filled
#[test]
fn test_missing_items_are_absent() {
    let h = Harness::new(FakeSource::new().with_video("known", "Known", "C", Some("PT3S")));
    let known = h.catalog.video("known");
    let unknown = h.catalog.video("unknown");

    h.catalog.load_videos(&[known.clone(), unknown.clone()]);

    assert_eq!(wait(&known.title()), Some("Known".to_string()));
    assert_eq!(wait(&known.length()), Some(3));
    assert_eq!(wait(&unknown.title()), None);
    assert_eq!(wait(&unknown.channel()), None);
    assert_eq!(h.source.video_batches(), vec![2]);
}

/// Playlist info lookups batch the same way
#[test]
fn test_playlist_info_batches() {
    let mut source = FakeSource::new();
    for i in 0..55 {
        source = source.with_playlist(&format!("PL{}", i), &format!("List {}", i), 10);
    }
    let h = Harness::new(source);
    let lists: Vec<_> = (0..55)
        .map(|i| h.catalog.playlist(&format!("PL{}", i)))
        .collect();

    h.catalog.load_playlists(&lists);
    h.settle();

    let mut sizes = h.source.playlist_batches();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![5, 50]);
    assert_eq!(wait(&lists[54].title()), Some("List 54".to_string()));
    assert_eq!(
        wait(&lists[0].thumbnails()),
        Some(vec![
            "https://img/PL0/medium.jpg".to_string(),
            "https://img/PL0/high.jpg".to_string(),
        ])
    );
}
