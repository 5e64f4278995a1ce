use std::collections::BTreeSet;
use std::time::Duration;

use quran_viewer::pdf::{PageRenderer, PageState, Zoom};
use quran_viewer::test_utils::test_helpers::{FixedGeometry, RecordingBackend, RecordingDocument};

fn renderer(backend: &RecordingBackend) -> PageRenderer<RecordingDocument> {
    PageRenderer::new(backend.document(), Zoom::default())
}

#[tokio::test(start_paused = true)]
async fn visible_page_and_buffer_render_in_order() {
    let backend = RecordingBackend::new(20);
    let renderer = renderer(&backend);

    let visible = renderer.refresh(&FixedGeometry::showing(20, &[5]));
    assert_eq!(visible, BTreeSet::from([5]));
    assert_eq!(renderer.book().queued(), vec![3, 4, 5, 6, 7]);

    renderer.drain_queue().await;

    assert_eq!(backend.rendered_pages(), vec![3, 4, 5, 6, 7]);
    assert_eq!(renderer.page_state(5), PageState::Rendered);
    assert_eq!(renderer.page_state(8), PageState::Unrendered);
    assert_eq!(renderer.stats().rendered, 5);
    assert!(!renderer.is_draining());
}

#[tokio::test(start_paused = true)]
async fn rendered_pages_are_not_queued_again() {
    let backend = RecordingBackend::new(20);
    let renderer = renderer(&backend);
    renderer.refresh(&FixedGeometry::showing(20, &[5]));
    renderer.drain_queue().await;

    renderer.refresh(&FixedGeometry::showing(20, &[6]));
    assert_eq!(renderer.book().queued(), vec![8]);
}

#[tokio::test(start_paused = true)]
async fn buffer_is_clamped_to_document() {
    let backend = RecordingBackend::new(3);
    let renderer = renderer(&backend);
    renderer.refresh(&FixedGeometry::showing(3, &[1]));
    assert_eq!(renderer.book().queued(), vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn detached_container_queues_nothing() {
    let backend = RecordingBackend::new(10);
    let renderer = renderer(&backend);
    assert!(renderer.refresh(&FixedGeometry::detached(10)).is_empty());
    assert!(renderer.book().queued().is_empty());

    renderer.drain_queue().await;
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_drains_never_overlap() {
    let backend = RecordingBackend::new(10).with_delay(Duration::from_millis(100));
    let renderer = renderer(&backend);
    renderer.refresh(&FixedGeometry::showing(10, &[1]));

    tokio::join!(renderer.drain_queue(), renderer.drain_queue());

    assert_eq!(backend.max_in_flight(), 1);
    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert!(pair[1].started >= pair[0].finished);
    }
}

#[tokio::test(start_paused = true)]
async fn pages_queued_mid_drain_are_picked_up() {
    let backend = RecordingBackend::new(10).with_delay(Duration::from_millis(100));
    let renderer = renderer(&backend);
    renderer.refresh(&FixedGeometry::showing(10, &[1]));

    tokio::join!(renderer.drain_queue(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(renderer.is_draining());
        renderer.refresh(&FixedGeometry::showing(10, &[6]));
    });

    assert_eq!(backend.rendered_pages(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(backend.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn zoom_change_rerenders_at_new_scale() {
    let backend = RecordingBackend::new(10);
    let renderer = renderer(&backend);
    let geometry = FixedGeometry::showing(10, &[1]);
    renderer.refresh(&geometry);
    renderer.drain_queue().await;
    backend.clear_calls();

    assert!(renderer.set_zoom(2.0, &geometry));
    assert_eq!(renderer.page_state(1), PageState::Queued);
    assert_eq!(renderer.page_state(4), PageState::Unrendered);

    renderer.drain_queue().await;
    let calls = backend.calls();
    assert_eq!(calls.iter().map(|c| c.page).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(calls.iter().all(|c| c.scale == 2.0));
}

#[tokio::test(start_paused = true)]
async fn unchanged_or_clamped_zoom_is_ignored() {
    let backend = RecordingBackend::new(10);
    let renderer = renderer(&backend);
    let geometry = FixedGeometry::showing(10, &[1]);
    renderer.refresh(&geometry);
    renderer.drain_queue().await;

    assert!(!renderer.set_zoom(1.0, &geometry));
    assert!(renderer.set_zoom(10.0, &geometry));
    assert_eq!(renderer.zoom().factor(), Zoom::MAX_SCALE);
    assert!(!renderer.set_zoom(12.0, &geometry));
}

#[tokio::test(start_paused = true)]
async fn render_in_flight_during_zoom_is_discarded() {
    let backend = RecordingBackend::new(10).with_delay(Duration::from_millis(100));
    let renderer = renderer(&backend);
    let geometry = FixedGeometry::showing(10, &[1]);
    renderer.refresh(&geometry);

    tokio::join!(renderer.drain_queue(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(renderer.page_state(1), PageState::Rendering);
        renderer.set_zoom(1.5, &geometry);
    });

    let calls = backend.calls();
    assert_eq!(calls[0].page, 1);
    assert_eq!(calls[0].scale, 1.0);
    assert!(calls[1..].iter().all(|c| c.scale == 1.5));
    assert_eq!(renderer.stats().stale, 1);
    assert_eq!(renderer.book().rendered_pages(), vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn failed_page_can_be_retried() {
    let backend = RecordingBackend::new(10);
    backend.fail_page(2);
    let renderer = renderer(&backend);
    let geometry = FixedGeometry::showing(10, &[1]);
    renderer.refresh(&geometry);
    renderer.drain_queue().await;

    assert_eq!(renderer.page_state(2), PageState::Unrendered);
    assert_eq!(renderer.page_state(3), PageState::Rendered);
    assert_eq!(renderer.stats().failed, 1);

    backend.heal_page(2);
    renderer.refresh(&geometry);
    assert_eq!(renderer.book().queued(), vec![2]);
    renderer.drain_queue().await;
    assert_eq!(renderer.page_state(2), PageState::Rendered);
}

#[tokio::test(start_paused = true)]
async fn invalidate_all_resets_everything() {
    let backend = RecordingBackend::new(10);
    let renderer = renderer(&backend);
    renderer.refresh(&FixedGeometry::showing(10, &[5]));
    renderer.drain_queue().await;

    renderer.invalidate_all();
    assert!(renderer.book().rendered_pages().is_empty());
    assert!(renderer.book().queued().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancelled_drain_returns_page_to_queue() {
    let backend = RecordingBackend::new(10).with_delay(Duration::from_millis(100));
    let renderer = renderer(&backend);
    let geometry = FixedGeometry::showing(10, &[1]);
    renderer.refresh(&geometry);

    let cancelled = tokio::time::timeout(Duration::from_millis(50), renderer.drain_queue()).await;
    assert!(cancelled.is_err());
    assert!(!renderer.is_draining());
    assert_eq!(renderer.page_state(1), PageState::Unrendered);

    renderer.refresh(&geometry);
    renderer.drain_queue().await;
    assert_eq!(renderer.book().rendered_pages(), vec![1, 2, 3]);
}
