use super::*;

fn info() -> OverlayInfo {
    OverlayInfo {
        zoom: 12_500.0,
        center: Complex::new(-0.75, -0.1),
        frame: FrameIndex(4),
        total_frames: 150,
    }
}

#[test]
fn lines_follow_flags() {
    let all = OverlaySettings {
        show_zoom: true,
        show_center: true,
        show_frame: true,
        ..OverlaySettings::default()
    };
    let lines = overlay_lines(&all, &info());
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "zoom 1.25e4x");
    assert_eq!(lines[1], "center -0.7500000000 - 0.1000000000i");
    assert_eq!(lines[2], "frame 5/150");

    let zoom_only = OverlaySettings::default();
    assert_eq!(overlay_lines(&zoom_only, &info()), vec!["zoom 1.25e4x"]);
}

#[test]
fn zoom_switches_to_scientific() {
    assert_eq!(format_zoom(1.0), "1.0x");
    assert_eq!(format_zoom(250.0), "250.0x");
    assert_eq!(format_zoom(3.0e7), "3.00e7x");
}

#[test]
fn band_is_anchored_to_corner() {
    let bottom = OverlaySettings {
        font_size: 20.0,
        ..OverlaySettings::default()
    };
    let l = BandLayout::new(&bottom, 720, 2);
    assert_eq!(l.height, (20.0f32 * 0.6 * 2.0 + 20.0 * 1.3 * 2.0).ceil() as u32);
    assert_eq!(l.y + l.height, 720);

    let top = OverlaySettings {
        corner: OverlayCorner::TopRight,
        ..bottom
    };
    assert_eq!(BandLayout::new(&top, 720, 2).y, 0);
}

#[test]
fn band_never_exceeds_frame() {
    let s = OverlaySettings {
        font_size: 200.0,
        ..OverlaySettings::default()
    };
    let l = BandLayout::new(&s, 64, 3);
    assert_eq!((l.y, l.height), (0, 64));
}

#[test]
fn composite_is_source_over() {
    let mut frame = RasterFrame::new(2, 2).unwrap();
    for px in frame.data.chunks_exact_mut(4) {
        px.copy_from_slice(&[200, 100, 50, 255]);
    }
    // Second row: one transparent pixel, one half-covered white pixel.
    let band = [0, 0, 0, 0, 128, 128, 128, 128];
    composite_band(&mut frame, &band, 1).unwrap();

    assert_eq!(frame.pixel(0, 0), Some([200, 100, 50, 255]));
    assert_eq!(frame.pixel(0, 1), Some([200, 100, 50, 255]));
    let [r, g, b, a] = frame.pixel(1, 1).unwrap();
    assert_eq!(a, 255);
    assert_eq!(r, 128 + mul_div255_u16(200, 127) as u8);
    assert_eq!(g, 128 + mul_div255_u16(100, 127) as u8);
    assert_eq!(b, 128 + mul_div255_u16(50, 127) as u8);
}

#[test]
fn composite_rejects_out_of_bounds_band() {
    let mut frame = RasterFrame::new(2, 2).unwrap();
    let band = [255u8; 16];
    assert!(composite_band(&mut frame, &band, 1).is_err());
}

#[test]
fn nothing_to_show_leaves_frame_untouched() {
    let renderer = OverlayRenderer {
        settings: OverlaySettings {
            show_zoom: false,
            show_center: false,
            show_frame: false,
            ..OverlaySettings::default()
        },
        fontdb: Arc::new(usvg::fontdb::Database::new()),
    };
    let mut frame = RasterFrame::new(4, 4).unwrap();
    let before = frame.clone();
    renderer.compose(&mut frame, &info()).unwrap();
    assert_eq!(frame, before);
}

#[test]
fn text_markup_is_escaped() {
    assert_eq!(escape_xml("a<b & c>"), "a&lt;b &amp; c&gt;");
}
