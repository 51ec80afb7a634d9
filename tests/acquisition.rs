mod common;

use common::synthetic_frame::{clicks, gradient_rgb, null_camera};
use ipm_picker::annotate::{annotate_points, parse_points, serialize_points, write_artifacts};
use ipm_picker::capture::{CalibrationFrame, ImageFileSource};
use ipm_picker::session::{step, InputEvent, Mode, Phase, SessionContext};
use ipm_picker::types::Point2D;
use std::fs;

fn drive(mut ctx: SessionContext, events: &[InputEvent]) -> SessionContext {
    for event in events {
        let (next, _) = step(ctx, event);
        ctx = next;
    }
    ctx
}

#[test]
fn direct_mode_pipeline_maps_clicks_to_source_space() {
    let mut source = ImageFileSource::from_frame(gradient_rgb(64, 48));
    let params = null_camera(64, 48);
    // Display at half width: every click doubles back to source.
    let frame = CalibrationFrame::acquire(&mut source, &params, 32).unwrap();
    assert_eq!(frame.display.dimensions(), (32, 24));

    let mut events = vec![InputEvent::SelectMode(Mode::Direct)];
    events.extend(clicks(&[(5.0, 5.0), (10.0, 5.0), (10.0, 10.0), (5.0, 10.0)]));
    let ctx = drive(SessionContext::new(frame.scale), &events);

    let points = ctx.completed_points().expect("session should complete");
    assert_eq!(points.get(0), Some(Point2D::new(10.0, 10.0)));
    assert_eq!(points.get(1), Some(Point2D::new(20.0, 10.0)));
    assert_eq!(points.get(2), Some(Point2D::new(20.0, 20.0)));
    assert_eq!(points.get(3), Some(Point2D::new(10.0, 20.0)));
}

#[test]
fn inferred_mode_virtual_corner_and_fixed_fill_order() {
    let frame = CalibrationFrame::from_corrected(gradient_rgb(64, 48), 64);
    let mut events = vec![InputEvent::SelectMode(Mode::Inferred)];
    events.extend(clicks(&[(0.0, 0.0), (10.0, 0.0), (5.0, -5.0), (5.0, 5.0)]));
    events.push(InputEvent::CornerIndex("2".into()));
    events.extend(clicks(&[(30.0, 30.0), (40.0, 40.0), (50.0, 50.0)]));
    let ctx = drive(SessionContext::new(frame.scale), &events);

    let points = ctx.completed_points().expect("session should complete");
    assert_eq!(points.get(1), Some(Point2D::new(5.0, 0.0)));
    assert_eq!(points.get(0), Some(Point2D::new(30.0, 30.0)));
    assert_eq!(points.get(2), Some(Point2D::new(40.0, 40.0)));
    assert_eq!(points.get(3), Some(Point2D::new(50.0, 50.0)));
}

#[test]
fn completed_set_survives_serialize_parse_roundtrip() {
    let frame = CalibrationFrame::from_corrected(gradient_rgb(640, 480), 320);
    let mut events = vec![InputEvent::SelectMode(Mode::Direct)];
    events.extend(clicks(&[
        (12.3, 45.6),
        (310.9, 47.1),
        (305.2, 230.8),
        (18.7, 228.4),
    ]));
    let ctx = drive(SessionContext::new(frame.scale), &events);
    let points = ctx.completed_points().unwrap();

    let parsed = parse_points(&serialize_points(points)).unwrap();
    for slot in 0..4 {
        let orig = points.get(slot).unwrap();
        let back = parsed.get(slot).unwrap();
        assert!((orig.x - back.x).abs() < 1e-6, "slot {slot} x");
        assert!((orig.y - back.y).abs() < 1e-6, "slot {slot} y");
    }
}

#[test]
fn abort_before_clicks_leaves_no_artifacts() {
    let dir = std::env::temp_dir().join("ipm_picker_abort_test");
    fs::remove_dir_all(&dir).ok();
    let image_path = dir.join("result.png");
    let text_path = dir.join("points.txt");

    let frame = CalibrationFrame::from_corrected(gradient_rgb(64, 48), 32);
    let ctx = drive(SessionContext::new(frame.scale), &[InputEvent::Abort]);
    assert_eq!(*ctx.phase(), Phase::Cancelled);
    assert!(ctx.completed_points().is_none());

    // The assembler is only reachable through a completed set; nothing may
    // have been written.
    assert!(!image_path.exists());
    assert!(!text_path.exists());
}

#[test]
fn artifacts_written_for_completed_session() {
    let dir = std::env::temp_dir().join("ipm_picker_complete_test");
    fs::remove_dir_all(&dir).ok();
    let image_path = dir.join("result.png");
    let text_path = dir.join("points.txt");

    let frame = CalibrationFrame::from_corrected(gradient_rgb(64, 48), 32);
    let mut events = vec![InputEvent::SelectMode(Mode::Direct)];
    events.extend(clicks(&[(5.0, 5.0), (10.0, 5.0), (10.0, 10.0), (5.0, 10.0)]));
    let ctx = drive(SessionContext::new(frame.scale), &events);
    let points = ctx.completed_points().unwrap();

    let annotated = annotate_points(&frame.full, points, &frame.scale);
    write_artifacts(&annotated, points, &image_path, &text_path).unwrap();

    let text = fs::read_to_string(&text_path).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert_eq!(text.lines().next().unwrap(), "10.000000,10.000000");
    let reloaded = image::open(&image_path).unwrap().into_rgb8();
    assert_eq!(reloaded.dimensions(), (64, 48));
    fs::remove_dir_all(&dir).ok();
}
