//! One instance, one future and one lookup per ID.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::helpers::*;

/// Same ID, same instance
#[test]
fn test_same_id_same_instance() {
    let h = Harness::new(FakeSource::new());

    let a = h.catalog.video("abc");
    let b = h.catalog.video("abc");
    assert!(Arc::ptr_eq(&a, &b));

    let p = h.catalog.playlist("abc");
    assert!(Arc::ptr_eq(&p, &h.catalog.playlist("abc")));
    assert_eq!(h.catalog.cached(), 2);
    assert!(h.catalog.has_video("abc"));
    assert!(h.catalog.has_playlist("abc"));
}

/// Concurrent lookups race on creation and on the first field access
#[test]
fn test_concurrent_access_single_lookup() {
    let source = FakeSource::new()
        .with_video("abc", "Title", "Channel", Some("PT2M"))
        .with_latency(Duration::from_millis(20));
    let h = Harness::new(source);
    let barrier = Barrier::new(8);
    let (catalog, barrier) = (&h.catalog, &barrier);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(move || {
                    barrier.wait();
                    let video = catalog.video("abc");
                    let title = video.title();
                    (video, title)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let (first_video, first_title) = &results[0];
    for (video, title) in &results {
        assert!(Arc::ptr_eq(first_video, video));
        assert!(first_title.ptr_eq(title));
        assert_eq!(wait(title), Some("Title".to_string()));
    }

    h.settle();
    assert_eq!(h.source.video_batches(), vec![1]);
}

/// Every info field shares one lookup
#[test]
fn test_info_fields_share_lookup() {
    let h = Harness::new(FakeSource::new().with_video("abc", "Title", "Channel", Some("PT1H2M10S")));
    let video = h.catalog.video("abc");

    let title = video.title();
    let channel = video.channel();
    let length = video.length();

    assert_eq!(wait(&title), Some("Title".to_string()));
    assert_eq!(wait(&channel), Some("Channel".to_string()));
    assert_eq!(wait(&length), Some(3730));

    // Resolved fields are returned as-is
    assert!(video.title().ptr_eq(&title));
    video.load_info();
    h.settle();
    assert_eq!(h.source.video_batches(), vec![1]);
}

/// A future read before and after it is set yields the same value
#[test]
fn test_get_before_and_after_resolution() {
    let source = FakeSource::new()
        .with_video("abc", "Title", "Channel", None)
        .with_latency(Duration::from_millis(30));
    let h = Harness::new(source);
    let title = h.catalog.video("abc").title();

    let early = {
        let title = title.clone();
        thread::spawn(move || title.get())
    };
    let late = wait(&title);

    assert_eq!(early.join().unwrap(), late);
    assert_eq!(title.get(), Some("Title".to_string()));
}

/// Fields not requested have no lookup
#[test]
fn test_untouched_entity_is_not_fetched() {
    let h = Harness::new(FakeSource::new().with_video("abc", "Title", "Channel", None));
    let video = h.catalog.video("abc");

    // Thumbnails are derived locally
    let thumbs = wait(&video.thumbnails()).unwrap();
    assert_eq!(thumbs.len(), 2);
    assert!(thumbs[0].ends_with("/abc/mqdefault.jpg"));

    h.settle();
    assert!(h.source.calls().is_empty());
}
