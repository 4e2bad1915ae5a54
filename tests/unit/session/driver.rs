use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::DrawingSpace;
use crate::foundation::error::ReelError;
use crate::motion::player::RecordingPacer;
use crate::surface::recording::RecordingSurface;
use std::path::PathBuf;

fn fast_config(name: &str) -> SessionConfig {
    let dir = PathBuf::from("target")
        .join("test-tmp")
        .join(format!("driver-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    SessionConfig {
        canvas: DrawingSpace::new(64, 48).unwrap(),
        capture_fps: 200,
        overlay: false,
        staging_dir: dir,
        ..SessionConfig::default()
    }
}

const SCRIPT: &str = r#"[
  {"reasoning": "Base line", "strokes": [{"x": [5, 60], "y": [40, 40], "t": [1]}]},
  {"reasoning": "Zig", "strokes": [
    {"x": [5, 20, 35, 50], "y": [5, 30, 5, 30], "t": [2, 2, 2]},
    {"x": [10], "y": [10]}
  ]}
]"#;

#[test]
fn run_plays_every_stroke_and_tallies_estimate() {
    let cfg = fast_config("run");
    let surface = Arc::new(RecordingSurface::new(cfg.canvas));
    let mut session = DrawingSession::new(surface.clone(), cfg).unwrap();
    let script = SessionScript::from_json_str(SCRIPT).unwrap();

    let mut pacer = RecordingPacer::new();
    let report = session.run(&script, &mut pacer).unwrap();

    assert_eq!(report.instructions, 2);
    assert_eq!(report.strokes, 3);
    assert_eq!(report.events, surface.events().len());
    // recording pacer never sleeps, so every requested pause is nominal time
    assert_eq!(pacer.total(), report.estimated);
    assert!(report.capture.frames_written >= 1);
    assert!(!session.capturer().is_running());
    assert_eq!(session.step_slot().current().step_number, 2);

    let mut sink = InMemorySink::new();
    let video = session.export(&report, &mut sink).unwrap();
    assert_eq!(video.frames, report.capture.frames_written);
    assert_eq!(sink.frames().len() as u64, video.frames);
}

#[test]
fn dispatch_failure_stops_capture_and_propagates() {
    let cfg = fast_config("stall");
    let dir = cfg.staging_dir.clone();
    let surface = Arc::new(RecordingSurface::new(cfg.canvas).failing_dispatch_after(4));
    let mut session = DrawingSession::new(surface, cfg).unwrap();
    let script = SessionScript::from_json_str(SCRIPT).unwrap();

    let err = session.run(&script, &mut RecordingPacer::new()).unwrap_err();
    assert!(matches!(err, ReelError::SurfaceStall { .. }));
    assert!(!session.capturer().is_running());
    // the starting frame was staged before playback
    assert!(session.capturer().frame_count() >= 1);
    session.capturer().stage().clear().unwrap();
    assert!(!dir.exists());
}

#[test]
fn first_frame_is_the_blank_starting_frame() {
    let cfg = fast_config("first");
    let surface = Arc::new(RecordingSurface::new(cfg.canvas));
    let mut session = DrawingSession::new(surface, cfg).unwrap();
    session
        .run(&SessionScript::default(), &mut RecordingPacer::new())
        .unwrap();

    let frames = session.capturer().stage().list().unwrap();
    assert_eq!(frames[0].index.0, 0);
    let first = image::open(&frames[0].path).unwrap().into_rgba8();
    assert_eq!(first.get_pixel(0, 0).0, [255, 255, 255, 255]);
    session.capturer().stage().clear().unwrap();
}

#[test]
fn unreadable_starting_frame_does_not_abort_playback() {
    let cfg = fast_config("blank-fail");
    let surface = Arc::new(RecordingSurface::new(cfg.canvas).failing_first_snapshots(1));
    let mut session = DrawingSession::new(surface.clone(), cfg).unwrap();
    let script = SessionScript::from_json_str(SCRIPT).unwrap();

    let report = session.run(&script, &mut RecordingPacer::new()).unwrap();
    assert_eq!(report.instructions, 2);
    assert_eq!(report.strokes, 3);
    assert_eq!(report.events, surface.events().len());
    assert!(report.capture.ticks_skipped >= 1);
    assert!(!session.capturer().is_running());

    // whatever the bracket captured still starts at index 0
    let staged: Vec<u64> = session
        .capturer()
        .stage()
        .list()
        .unwrap()
        .iter()
        .map(|f| f.index.0)
        .collect();
    assert_eq!(staged, (0..report.capture.frames_written).collect::<Vec<_>>());
    session.capturer().stage().clear().unwrap();
}
