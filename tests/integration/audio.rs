//! Audio stream resolution.

use tubecache::config::CatalogConfig;

use crate::helpers::*;

#[test]
fn test_audio_url_resolved_once() {
    let h = Harness::new(FakeSource::new());
    let video = h.catalog.video("abc");

    let first = video.audio_url();
    let second = video.audio_url();
    assert!(first.ptr_eq(&second));
    assert_eq!(wait(&first), Some("https://audio/abc".to_string()));

    h.settle();
    assert_eq!(h.resolver.call_count(), 1);
    // Audio does not go through the data source
    assert!(h.source.calls().is_empty());
}

#[test]
fn test_audio_failure_is_absent() {
    let h = Harness::with_resolver(
        FakeSource::new(),
        FakeResolver::default().failing_for("bad"),
        CatalogConfig::default(),
    );

    assert_eq!(wait(&h.catalog.video("bad").audio_url()), None);
    assert_eq!(
        wait(&h.catalog.video("good").audio_url()),
        Some("https://audio/good".to_string())
    );
}
