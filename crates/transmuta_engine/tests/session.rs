use std::io::Cursor;
use std::sync::Once;
use std::time::{Duration, Instant};

use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use transmuta_core::{ConversionStatus, IncomingFile, ItemId};
use transmuta_engine::ConverterSession;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(transmuta_logging::initialize_for_tests);
}

fn incoming(name: &str, media_type: &str, bytes: Bytes) -> IncomingFile {
    IncomingFile {
        name: name.to_string(),
        declared_media_type: media_type.to_string(),
        bytes,
    }
}

fn small_png(name: &str) -> IncomingFile {
    let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode fixture");
    incoming(name, "image/png", Bytes::from(out.into_inner()))
}

fn ebook(name: &str, size: usize) -> IncomingFile {
    incoming(name, "application/epub+zip", Bytes::from(vec![b'e'; size]))
}

fn row<'a>(
    snapshot: &'a transmuta_core::AppViewModel,
    item_id: ItemId,
) -> &'a transmuta_core::ItemRowView {
    snapshot
        .items
        .iter()
        .find(|row| row.item_id == item_id)
        .expect("item present")
}

#[test]
fn full_round_completes_every_category() {
    init_logging();
    let mut session = ConverterSession::new();
    let ids = session.submit_files(vec![
        small_png("photo.png"),
        ebook("novel.epub", 1_000),
        incoming("notes.xyz", "", Bytes::from_static(b"free-form text")),
    ]);
    assert_eq!(ids.len(), 3);
    // One preview handle for the image, none for the others.
    assert_eq!(session.live_handles(), 1);

    let dispatched = session.start_batch_conversion();
    assert_eq!(dispatched, ids);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.in_flight, 0);
    assert_eq!(snapshot.completed, 3);
    for id in &ids {
        let item = row(&snapshot, *id);
        assert_eq!(item.status, ConversionStatus::Completed);
        assert_eq!(item.progress, 100);
        assert_eq!(item.error, None);
        assert!(item.result.is_some());
    }

    // Preview plus three result buffers.
    assert_eq!(session.live_handles(), 4);

    // The passthrough round returns the source bytes untouched.
    let download = session.download(ids[1]).expect("ebook download");
    assert_eq!(download.filename, "converted_novel.epub");
    assert_eq!(download.bytes.len(), 1_000);

    // The raster round produced a decodable image.
    let download = session.download(ids[0]).expect("image download");
    assert_eq!(download.filename, "converted_photo.png");
    assert_eq!(download.media_type, "image/png");
    image::load_from_memory(&download.bytes).expect("decodable output");
}

#[test]
fn round_runs_items_concurrently() {
    init_logging();
    let mut session = ConverterSession::new();
    // Three items with the minimum 800ms stubbed duration each; a serial
    // engine would need at least 2400ms.
    session.submit_files(vec![
        ebook("a.epub", 1_000),
        ebook("b.epub", 1_000),
        ebook("c.epub", 1_000),
    ]);

    let started = Instant::now();
    let dispatched = session.start_batch_conversion();
    let elapsed = started.elapsed();

    assert_eq!(dispatched.len(), 3);
    assert_eq!(session.snapshot().completed, 3);
    assert!(elapsed >= Duration::from_millis(750), "stub delay ran");
    assert!(
        elapsed < Duration::from_millis(2_000),
        "items converted in parallel, took {elapsed:?}"
    );
}

#[test]
fn completed_items_are_not_redispatched() {
    init_logging();
    let mut session = ConverterSession::new();
    session.submit_files(vec![ebook("once.epub", 1_000)]);
    assert_eq!(session.start_batch_conversion().len(), 1);
    assert_eq!(session.start_batch_conversion(), Vec::<ItemId>::new());
    assert_eq!(session.snapshot().completed, 1);
}

#[test]
fn removal_during_a_round_is_absorbed() {
    init_logging();
    let mut session = ConverterSession::new();
    let ids = session.submit_files(vec![ebook("gone.epub", 1_000)]);

    let dispatched = session.begin_round();
    assert_eq!(dispatched, ids);
    session.remove(ids[0]);
    // The engine still reports a terminal event for the removed id; it must
    // land as a no-op and register no buffer.
    session.wait_round(&dispatched);

    let snapshot = session.snapshot();
    assert!(snapshot.items.is_empty());
    assert_eq!(session.live_handles(), 0);
}

#[test]
fn retarget_resets_a_completed_item_for_the_next_round() {
    init_logging();
    let mut session = ConverterSession::new();
    let ids = session.submit_files(vec![small_png("photo.png")]);
    session.start_batch_conversion();
    assert_eq!(session.snapshot().completed, 1);

    session.set_target(ids[0], "jpeg");
    let snapshot = session.snapshot();
    let item = row(&snapshot, ids[0]);
    assert_eq!(item.status, ConversionStatus::Idle);
    assert_eq!(item.result, None);

    session.start_batch_conversion();
    let download = session.download(ids[0]).expect("reconverted download");
    assert_eq!(download.filename, "converted_photo.jpeg");
    assert_eq!(download.media_type, "image/jpeg");
}

#[test]
fn one_failing_item_does_not_abort_the_batch() {
    init_logging();
    let mut session = ConverterSession::new();
    let ids = session.submit_files(vec![
        incoming("broken.png", "image/png", Bytes::from_static(b"not pixels")),
        ebook("fine.epub", 1_000),
    ]);

    session.start_batch_conversion();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.completed, 1);

    let failed = row(&snapshot, ids[0]);
    assert_eq!(failed.status, ConversionStatus::Error);
    assert_eq!(failed.progress, 0);
    assert!(
        failed.error.as_deref().is_some_and(|e| e.contains("decode failure")),
        "error carries the failure kind: {:?}",
        failed.error
    );
    assert_eq!(session.download(ids[0]), None);

    let survivor = row(&snapshot, ids[1]);
    assert_eq!(survivor.status, ConversionStatus::Completed);

    // Errored items stay eligible and are retried next round.
    let redispatched = session.start_batch_conversion();
    assert_eq!(redispatched, vec![ids[0]]);
}

#[test]
fn bulk_download_covers_every_completed_item_in_order() {
    init_logging();
    let mut session = ConverterSession::new();
    let ids = session.submit_files(vec![
        ebook("first.epub", 1_000),
        incoming("broken.png", "image/png", Bytes::from_static(b"not pixels")),
        ebook("third.epub", 1_000),
    ]);
    session.start_batch_conversion();

    let mut seen = Vec::new();
    let count = session.download_all_completed(|download| seen.push(download.item_id));
    assert_eq!(count, 2);
    assert_eq!(seen, vec![ids[0], ids[2]]);
}

#[test]
fn clear_revokes_every_live_buffer() {
    init_logging();
    let mut session = ConverterSession::new();
    session.submit_files(vec![small_png("photo.png"), ebook("novel.epub", 1_000)]);
    session.start_batch_conversion();
    assert!(session.live_handles() > 0);

    session.clear();
    assert!(session.snapshot().items.is_empty());
    assert_eq!(session.live_handles(), 0);
}
