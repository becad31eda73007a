use super::*;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fractalreel_delivery_{tag}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn file_names_are_sanitized() {
    assert_eq!(
        export_file_name("Seahorse Valley", Container::Mp4),
        "Seahorse_Valley.mp4"
    );
    assert_eq!(export_file_name("deep/zoom?", Container::Webm), "deep_zoom.webm");
    assert_eq!(export_file_name("   ", Container::Mp4), "fractal-animation.mp4");
}

#[test]
fn bytes_are_written_into_directory() {
    let dir = scratch_dir("bytes");
    let d = DirectoryDelivery::new(&dir);
    let out = d
        .deliver(
            MediaBlob {
                mime_type: "video/mp4".to_string(),
                payload: MediaPayload::Bytes(vec![7; 10]),
            },
            "clip.mp4",
        )
        .unwrap();
    assert_eq!(out.bytes, 10);
    assert_eq!(out.location, Some(dir.join("clip.mp4")));
    assert_eq!(std::fs::read(dir.join("clip.mp4")).unwrap(), vec![7; 10]);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn files_are_moved_into_place() {
    let dir = scratch_dir("file");
    std::fs::create_dir_all(&dir).unwrap();
    let src = dir.join("encoded.mp4");
    std::fs::write(&src, b"abc").unwrap();

    let out = DirectoryDelivery::new(dir.join("final"))
        .deliver(
            MediaBlob {
                mime_type: "video/mp4".to_string(),
                payload: MediaPayload::File(src.clone()),
            },
            "zoom.mp4",
        )
        .unwrap();
    assert_eq!(out.bytes, 3);
    assert!(!src.exists());
    assert!(dir.join("final").join("zoom.mp4").exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn path_like_file_names_are_rejected() {
    for bad in ["", ".", "..", "../escaped.mp4", "sub/clip.mp4", "/tmp/clip.mp4", "a\\b.mp4"] {
        let err = check_file_name(bad).unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)), "{bad:?}: {err}");
    }
    check_file_name("clip.mp4").unwrap();
    check_file_name("..hidden.mp4").unwrap();
}

#[test]
fn delivery_stays_inside_its_directory() {
    let base = scratch_dir("escape");
    let d = DirectoryDelivery::new(base.join("deliver"));
    let err = d
        .deliver(
            MediaBlob {
                mime_type: "video/x-raw-rgba".to_string(),
                payload: MediaPayload::Bytes(vec![1; 4]),
            },
            "../escaped.rgba",
        )
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert!(!base.join("escaped.rgba").exists());
    let _ = std::fs::remove_dir_all(&base);
}
