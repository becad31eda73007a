use super::*;

fn cfg(codec: Codec, container: Container) -> EncoderConfig {
    EncoderConfig {
        width: 640,
        height: 360,
        fps: 30,
        bitrate_quality: 0.5,
        codec,
        container,
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn mp4_h264_arguments() {
    let args = ffmpeg_args(&cfg(Codec::H264, Container::Mp4));
    assert_eq!(value_after(&args, "-s"), Some("640x360"));
    assert_eq!(value_after(&args, "-r"), Some("30"));
    assert_eq!(value_after(&args, "-c:v"), Some("libx264"));
    assert_eq!(value_after(&args, "-b:v"), Some("691200"));
    assert_eq!(value_after(&args, "-movflags"), Some("+faststart"));
    assert_eq!(args.last().map(String::as_str), Some("mp4"));
    assert!(!args.iter().any(|a| a == "hvc1"));
}

#[test]
fn hevc_in_mp4_is_tagged() {
    let args = ffmpeg_args(&cfg(Codec::H265, Container::Mp4));
    assert_eq!(value_after(&args, "-c:v"), Some("libx265"));
    assert_eq!(value_after(&args, "-tag:v"), Some("hvc1"));
}

#[test]
fn webm_has_no_faststart() {
    let args = ffmpeg_args(&cfg(Codec::Vp9, Container::Webm));
    assert_eq!(value_after(&args, "-c:v"), Some("libvpx-vp9"));
    assert!(!args.iter().any(|a| a == "-movflags"));
    assert_eq!(args.last().map(String::as_str), Some("webm"));
}

#[test]
fn partial_suffix_is_stripped() {
    assert_eq!(
        finished_path(Path::new("/tmp/out/clip.mp4.partial")),
        PathBuf::from("/tmp/out/clip.mp4")
    );
}

#[test]
fn start_rejects_odd_dimensions() {
    let mut enc = FfmpegEncoder::new(FfmpegEncoderOpts::new(std::env::temp_dir()));
    let mut c = cfg(Codec::H264, Container::Mp4);
    c.width = 641;
    assert!(matches!(enc.start(&c), Err(ReelError::Encoding(_))));
}

#[test]
fn start_rejects_codec_container_mismatch() {
    let mut enc = FfmpegEncoder::new(FfmpegEncoderOpts::new(std::env::temp_dir()));
    let err = enc.start(&cfg(Codec::H264, Container::Webm)).unwrap_err();
    assert!(matches!(err, ReelError::Encoding(_)));
}
