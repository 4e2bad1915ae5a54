use super::*;
use crate::capture::step::StepInfo;
use crate::foundation::core::DrawingSpace;
use crate::surface::recording::RecordingSurface;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target")
        .join("test-tmp")
        .join(format!("capturer-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn capturer_with(surface: RecordingSurface, name: &str, tick: Duration) -> FrameCapturer {
    let cfg = CaptureConfig {
        tick,
        overlay: false,
        staging_dir: scratch(name),
    };
    let mut cap = FrameCapturer::new(Arc::new(surface), StepSlot::new(), cfg).unwrap();
    cap.begin_session().unwrap();
    cap
}

fn small_surface() -> RecordingSurface {
    RecordingSurface::new(DrawingSpace::new(8, 8).unwrap())
}

fn staged_indices(cap: &FrameCapturer) -> Vec<u64> {
    cap.stage().list().unwrap().iter().map(|f| f.index.0).collect()
}

#[test]
fn tick_for_fps_divides_a_second() {
    assert_eq!(
        CaptureConfig::tick_for_fps(30).unwrap(),
        Duration::from_secs(1) / 30
    );
    assert!(CaptureConfig::tick_for_fps(0).is_err());
}

#[test]
fn zero_tick_is_rejected() {
    let cfg = CaptureConfig {
        tick: Duration::ZERO,
        overlay: false,
        staging_dir: scratch("zero-tick"),
    };
    assert!(FrameCapturer::new(Arc::new(small_surface()), StepSlot::new(), cfg).is_err());
}

#[test]
fn immediate_stop_yields_no_frames() {
    let mut cap = capturer_with(small_surface(), "immediate", Duration::from_secs(1));
    cap.start().unwrap();
    let report = cap.stop().unwrap();
    assert_eq!(report, CaptureReport::default());
    assert_eq!(cap.frame_count(), 0);
    assert!(staged_indices(&cap).is_empty());
    cap.stage().clear().unwrap();
}

#[test]
fn bracket_writes_contiguous_complete_frames() {
    let mut cap = capturer_with(small_surface(), "bracket", Duration::from_millis(5));
    cap.start().unwrap();
    assert!(cap.is_running());
    std::thread::sleep(Duration::from_millis(80));
    let report = cap.stop().unwrap();
    assert!(!cap.is_running());

    assert!(report.frames_written > 0);
    let idx = staged_indices(&cap);
    assert_eq!(idx, (0..report.frames_written).collect::<Vec<_>>());
    assert_eq!(cap.frame_count(), report.frames_written);
    for f in cap.stage().list().unwrap() {
        assert!(std::fs::metadata(&f.path).unwrap().len() > 0);
    }
    cap.stage().clear().unwrap();
}

#[test]
fn stop_during_slow_capture_waits_for_a_complete_frame() {
    let surface = small_surface().with_snapshot_delay(Duration::from_millis(60));
    let mut cap = capturer_with(surface, "slow", Duration::from_millis(5));
    cap.start().unwrap();
    // first tick fires after 5ms, so its snapshot is still sleeping here
    std::thread::sleep(Duration::from_millis(30));
    let report = cap.stop().unwrap();

    assert!(report.frames_written >= 1);
    assert_eq!(
        staged_indices(&cap),
        (0..report.frames_written).collect::<Vec<_>>()
    );
    for entry in std::fs::read_dir(cap.stage().dir()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.ends_with(".partial"), "leftover {name}");
        assert!(std::fs::metadata(&path).unwrap().len() > 0, "empty {name}");
    }
    for f in cap.stage().list().unwrap() {
        let img = image::open(&f.path).unwrap().into_rgba8();
        assert_eq!(img.dimensions(), (8, 8));
    }
    cap.stage().clear().unwrap();
}

#[test]
fn indices_continue_across_brackets_and_sync_captures() {
    let mut cap = capturer_with(small_surface(), "brackets", Duration::from_millis(5));
    assert_eq!(cap.capture_now().unwrap(), FrameIndex(0));

    cap.start().unwrap();
    std::thread::sleep(Duration::from_millis(40));
    let first = cap.stop().unwrap();

    let idx = cap.capture_now().unwrap();
    assert_eq!(idx, FrameIndex(1 + first.frames_written));

    cap.start().unwrap();
    std::thread::sleep(Duration::from_millis(40));
    let second = cap.stop().unwrap();

    let total = 2 + first.frames_written + second.frames_written;
    assert_eq!(cap.frame_count(), total);
    assert_eq!(cap.session_report().frames_written, total);
    assert_eq!(staged_indices(&cap), (0..total).collect::<Vec<_>>());
    cap.stage().clear().unwrap();
}

#[test]
fn failed_ticks_are_skipped_without_gaps() {
    let surface = small_surface().failing_snapshots_every(2);
    let mut cap = capturer_with(surface, "failing", Duration::from_millis(5));
    cap.start().unwrap();
    std::thread::sleep(Duration::from_millis(80));
    let report = cap.stop().unwrap();

    assert!(report.ticks_skipped > 0);
    assert!(report.frames_written > 0);
    assert_eq!(
        staged_indices(&cap),
        (0..report.frames_written).collect::<Vec<_>>()
    );
    cap.stage().clear().unwrap();
}

#[test]
fn failed_sync_capture_is_a_tick_error_and_keeps_the_index() {
    let surface = small_surface().failing_snapshots_every(1);
    let mut cap = capturer_with(surface, "sync-fail", Duration::from_secs(1));
    let err = cap.capture_now().unwrap_err();
    assert!(matches!(err, ReelError::CaptureTick { frame_index: 0, .. }));
    assert_eq!(cap.frame_count(), 0);
    assert_eq!(cap.session_report().ticks_skipped, 1);
    cap.stage().clear().unwrap();
}

#[test]
fn bracket_misuse_is_rejected() {
    let mut cap = capturer_with(small_surface(), "misuse", Duration::from_secs(1));
    assert_eq!(cap.stop().unwrap(), CaptureReport::default());

    cap.start().unwrap();
    assert!(cap.start().is_err());
    assert!(cap.capture_now().is_err());
    assert!(cap.begin_session().is_err());
    cap.stop().unwrap();
    cap.stage().clear().unwrap();
}

#[test]
fn begin_session_resets_indices_and_stage() {
    let mut cap = capturer_with(small_surface(), "reset", Duration::from_secs(1));
    cap.capture_now().unwrap();
    cap.capture_now().unwrap();
    assert_eq!(cap.frame_count(), 2);

    cap.begin_session().unwrap();
    assert_eq!(cap.frame_count(), 0);
    assert!(staged_indices(&cap).is_empty());
    assert_eq!(cap.capture_now().unwrap(), FrameIndex(0));
    cap.stage().clear().unwrap();
}

#[test]
fn overlay_is_applied_from_the_current_step() {
    let cfg = CaptureConfig {
        tick: Duration::from_secs(1),
        overlay: true,
        staging_dir: scratch("overlay"),
    };
    let step = StepSlot::new();
    let surface = RecordingSurface::new(DrawingSpace::new(200, 120).unwrap());
    let mut cap = FrameCapturer::new(Arc::new(surface), step.clone(), cfg).unwrap();
    cap.begin_session().unwrap();

    cap.capture_now().unwrap();
    step.publish(StepInfo::new(1, "Outline"));
    cap.capture_now().unwrap();

    let frames = cap.stage().list().unwrap();
    let plain = image::open(&frames[0].path).unwrap().into_rgba8();
    let banner = image::open(&frames[1].path).unwrap().into_rgba8();
    // recording surface frames are flat; the band darkens the top area
    assert_eq!(plain.get_pixel(180, 90), plain.get_pixel(100, 110));
    assert!(banner.get_pixel(180, 90).0[0] < plain.get_pixel(180, 90).0[0]);
    cap.stage().clear().unwrap();
}

#[test]
fn drop_closes_an_open_bracket() {
    let mut cap = capturer_with(small_surface(), "drop", Duration::from_millis(5));
    let dir = cap.stage().dir().to_path_buf();
    cap.start().unwrap();
    drop(cap);
    // no thread left writing into the directory
    let stage = FrameStage::new(&dir);
    let n = stage.list().unwrap().len();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(stage.list().unwrap().len(), n);
    stage.clear().unwrap();
}
