use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target")
        .join("test-tmp")
        .join(format!("staging-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn tiny_frame(v: u8) -> image::RgbaImage {
    image::RgbaImage::from_pixel(4, 2, image::Rgba([v, v, v, 255]))
}

#[test]
fn file_names_are_zero_padded_and_parse_back() {
    assert_eq!(FrameStage::file_name(FrameIndex(42)), "frame_000042.png");
    assert_eq!(FrameStage::file_name(FrameIndex(1_234_567)), "frame_1234567.png");
    assert_eq!(FrameStage::parse_file_name("frame_000042.png"), Some(FrameIndex(42)));
    assert_eq!(FrameStage::parse_file_name("frame_1234567.png"), Some(FrameIndex(1_234_567)));
    assert_eq!(FrameStage::parse_file_name("frame_42.png"), None);
    assert_eq!(FrameStage::parse_file_name("frame_000042.png.partial"), None);
    assert_eq!(FrameStage::parse_file_name("shot_000042.png"), None);
}

#[test]
fn write_then_list_in_index_order() {
    let stage = FrameStage::new(scratch("list"));
    stage.prepare().unwrap();
    for i in [2u64, 0, 1] {
        stage.write(FrameIndex(i), &tiny_frame(i as u8)).unwrap();
    }
    let frames = stage.list().unwrap();
    let idx: Vec<u64> = frames.iter().map(|f| f.index.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
    for f in &frames {
        assert!(std::fs::metadata(&f.path).unwrap().len() > 0);
    }
    let leftovers: Vec<_> = std::fs::read_dir(stage.dir())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty());

    let back = image::open(stage.frame_path(FrameIndex(1))).unwrap().into_rgba8();
    assert_eq!(back, tiny_frame(1));
    stage.clear().unwrap();
}

#[test]
fn prepare_removes_stale_frames_but_keeps_foreign_files() {
    let dir = scratch("prepare");
    let stage = FrameStage::new(&dir);
    stage.prepare().unwrap();
    stage.write(FrameIndex(0), &tiny_frame(0)).unwrap();
    std::fs::write(dir.join("frame_000001.png.partial"), b"").unwrap();
    std::fs::write(dir.join("notes.txt"), b"keep").unwrap();

    stage.prepare().unwrap();
    assert!(stage.list().unwrap().is_empty());
    assert!(!dir.join("frame_000001.png.partial").exists());
    assert!(dir.join("notes.txt").exists());

    stage.clear().unwrap();
    // directory survives because it still holds a foreign file
    assert!(dir.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn clear_removes_frames_and_empty_dir() {
    let dir = scratch("clear");
    let stage = FrameStage::new(&dir);
    stage.prepare().unwrap();
    stage.write(FrameIndex(0), &tiny_frame(9)).unwrap();
    stage.clear().unwrap();
    assert!(!dir.exists());
    // clearing a missing stage is fine
    stage.clear().unwrap();
    assert!(stage.list().unwrap().is_empty());
}
