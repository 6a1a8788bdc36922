//! Playlist info and video listing.

use tubecache::config::CatalogConfig;

use crate::helpers::*;

/// Item counts above the cap are clamped
#[test]
fn test_video_count_clamped() {
    let source = FakeSource::new()
        .with_playlist("PLbig", "Big", 85)
        .with_playlist("PLsmall", "Small", 12);
    let h = Harness::new(source);

    assert_eq!(wait(&h.catalog.playlist("PLbig").video_count()), Some(60));
    assert_eq!(wait(&h.catalog.playlist("PLsmall").video_count()), Some(12));
}

/// Listing stops at the cap however many pages exist
#[test]
fn test_listing_capped() {
    let h = Harness::new(FakeSource::new().with_entries("PL1", 500));
    let videos = wait(&h.catalog.playlist("PL1").videos()).unwrap();

    assert_eq!(videos.len(), 60);
    assert_eq!(videos[0].id(), "PL1-v0");
    assert_eq!(videos[59].id(), "PL1-v59");
    h.settle();
    assert_eq!(h.source.page_requests(), vec![50, 10]);
}

/// All pages are followed when the playlist fits under the cap
#[test]
fn test_listing_follows_pages() {
    let config = CatalogConfig::default().with_max_videos(200);
    let h = Harness::with_config(FakeSource::new().with_entries("PL1", 120), config);
    let videos = wait(&h.catalog.playlist("PL1").videos()).unwrap();

    assert_eq!(videos.len(), 120);
    let ids: Vec<_> = videos.iter().map(|v| v.id().to_string()).collect();
    let expected: Vec<_> = (0..120).map(|i| format!("PL1-v{}", i)).collect();
    assert_eq!(ids, expected);

    h.settle();
    assert_eq!(h.source.page_requests(), vec![50, 50, 50]);
}

/// A failing second page leaves the first page's videos
#[test]
fn test_failed_page_keeps_partial_listing() {
    let config = CatalogConfig::default().with_max_videos(150);
    let h = Harness::with_config(
        FakeSource::new().with_entries("PL1", 150).failing_page(1),
        config,
    );
    let videos = wait(&h.catalog.playlist("PL1").videos()).unwrap();

    assert_eq!(videos.len(), 50);
    assert_eq!(videos[49].id(), "PL1-v49");
    h.settle();
    assert_eq!(h.source.page_requests(), vec![50, 50]);
}

/// A failing first page yields an empty listing, not an absent one
#[test]
fn test_failed_first_page() {
    let h = Harness::new(FakeSource::new().with_entries("PL1", 10).failing_page(0));
    assert_eq!(wait(&h.catalog.playlist("PL1").videos()).map(|v| v.len()), Some(0));
}

/// Listed videos come from the video cache with page titles set
#[test]
fn test_listed_videos_are_cached_and_populated() {
    let h = Harness::new(FakeSource::new().with_entries("PL1", 30));
    let before = h.catalog.video("PL1-v3");
    let videos = wait(&h.catalog.playlist("PL1").videos()).unwrap();

    assert!(std::sync::Arc::ptr_eq(&before, &videos[3]));
    assert!(videos.iter().all(|v| h.catalog.has_video(v.id())));

    // Title comes from the page; the background lookup does not replace it.
    // Channel comes from the lookup, not from the page's owner channel.
    assert_eq!(wait(&videos[0].title()), Some("Entry 0".to_string()));
    assert_eq!(wait(&videos[0].channel()), Some("Channel".to_string()));
    assert_eq!(wait(&videos[0].length()), Some(60));

    h.settle();
    assert_eq!(wait(&videos[0].title()), Some("Entry 0".to_string()));
    assert_eq!(h.source.video_batches(), vec![30]);
}

/// Listing is started once and shared
#[test]
fn test_listing_runs_once() {
    let h = Harness::new(FakeSource::new().with_entries("PL1", 5));
    let playlist = h.catalog.playlist("PL1");

    let a = playlist.videos();
    let b = playlist.videos();
    assert!(a.ptr_eq(&b));
    assert_eq!(wait(&a).map(|v| v.len()), Some(5));

    h.settle();
    assert_eq!(h.source.page_requests().len(), 1);
}

/// Empty playlists list no videos
#[test]
fn test_empty_playlist() {
    let h = Harness::new(FakeSource::new());
    assert_eq!(wait(&h.catalog.playlist("PLnone").videos()).map(|v| v.len()), Some(0));
    assert_eq!(wait(&h.catalog.playlist("PLnone").title()), None);
}
