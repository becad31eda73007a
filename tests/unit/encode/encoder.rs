use super::*;

fn cfg() -> EncoderConfig {
    EncoderConfig {
        width: 4,
        height: 2,
        fps: 30,
        bitrate_quality: 0.5,
        codec: Codec::H264,
        container: Container::Mp4,
    }
}

#[test]
fn bitrate_scales_with_quality() {
    let mut c = EncoderConfig {
        width: 1280,
        height: 720,
        fps: 30,
        bitrate_quality: 1.0,
        codec: Codec::H264,
        container: Container::Mp4,
    };
    assert_eq!(c.bitrate_bps(), 5_529_600);
    c.bitrate_quality = 0.5;
    assert_eq!(c.bitrate_bps(), 2_764_800);
}

#[test]
fn codec_container_compatibility() {
    assert!(Codec::H264.fits(Container::Mp4));
    assert!(Codec::H265.fits(Container::Mp4));
    assert!(Codec::Av1.fits(Container::Mp4));
    assert!(!Codec::Vp9.fits(Container::Mp4));
    assert!(Codec::Vp9.fits(Container::Webm));
    assert!(Codec::Av1.fits(Container::Webm));
    assert!(!Codec::H264.fits(Container::Webm));
}

#[test]
fn in_memory_encoder_concatenates_frames() {
    let mut enc = InMemoryEncoder::new();
    enc.start(&cfg()).unwrap();
    let mut a = RasterFrame::new(4, 2).unwrap();
    a.data.fill(1);
    let mut b = RasterFrame::new(4, 2).unwrap();
    b.data.fill(2);
    enc.add_frame(&a).unwrap();
    enc.add_frame(&b).unwrap();
    assert_eq!(enc.frames(), 2);

    let blob = enc.finish().unwrap();
    assert_eq!(blob.mime_type, InMemoryEncoder::MIME_TYPE);
    let MediaPayload::Bytes(bytes) = blob.payload else {
        panic!("expected in-memory payload");
    };
    assert_eq!(bytes.len(), 64);
    assert_eq!(bytes[0], 1);
    assert_eq!(bytes[63], 2);
}

#[test]
fn in_memory_encoder_rejects_wrong_size() {
    let mut enc = InMemoryEncoder::new();
    enc.start(&cfg()).unwrap();
    let err = enc
        .add_frame(&RasterFrame::new(2, 2).unwrap())
        .unwrap_err();
    assert!(matches!(err, ReelError::Encoding(_)));
}

#[test]
fn in_memory_encoder_requires_start() {
    let mut enc = InMemoryEncoder::new();
    assert!(enc.add_frame(&RasterFrame::new(4, 2).unwrap()).is_err());
    assert!(enc.finish().is_err());
}
