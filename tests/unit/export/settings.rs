use super::*;

#[test]
fn defaults_are_valid() {
    let s = ExportSettings::default();
    s.validate().unwrap();
    assert_eq!(s.anti_alias.grid(), 3);
    assert_eq!(ExporterConfig::default().queue_capacity, 4);
    assert_eq!(ExporterConfig::default().yield_every, 5);
}

#[test]
fn fps_must_be_30_or_60() {
    for fps in [0, 24, 59, 120] {
        let s = ExportSettings {
            fps,
            ..ExportSettings::default()
        };
        assert!(matches!(s.validate(), Err(ReelError::Validation(_))), "fps {fps}");
    }
    let s = ExportSettings {
        fps: 60,
        ..ExportSettings::default()
    };
    s.validate().unwrap();
}

#[test]
fn size_must_be_even_and_non_zero() {
    for (width, height) in [(0, 720), (1280, 0), (1281, 720), (1280, 721)] {
        let s = ExportSettings {
            width,
            height,
            ..ExportSettings::default()
        };
        assert!(s.validate().is_err(), "{width}x{height}");
    }
}

#[test]
fn quality_range_is_half_open() {
    for q in [0.0, -0.1, 1.01, f64::NAN] {
        let s = ExportSettings {
            bitrate_quality: q,
            ..ExportSettings::default()
        };
        assert!(s.validate().is_err(), "quality {q}");
    }
    let s = ExportSettings {
        bitrate_quality: 1.0,
        ..ExportSettings::default()
    };
    s.validate().unwrap();
}

#[test]
fn codec_must_fit_container() {
    let s = ExportSettings {
        container: Container::Webm,
        codec: Codec::H264,
        ..ExportSettings::default()
    };
    assert!(s.validate().is_err());
    let s = ExportSettings {
        container: Container::Webm,
        codec: Codec::Vp9,
        ..ExportSettings::default()
    };
    s.validate().unwrap();
}

#[test]
fn json_fills_missing_fields() {
    let json = r#"{"fps": 60, "codec": "av1", "anti_alias": "ultra", "precision": "cpu",
                   "overlay": {"show_frame": true}}"#;
    let s = ExportSettings::from_json_reader(json.as_bytes()).unwrap();
    assert_eq!(s.fps, 60);
    assert_eq!(s.codec, Codec::Av1);
    assert_eq!(s.anti_alias.grid(), 5);
    assert_eq!(s.precision, PrecisionMode::Cpu);
    assert_eq!(s.width, 1280);
    let overlay = s.overlay.unwrap();
    assert!(overlay.show_frame);
    assert!(overlay.show_zoom);
}

#[test]
fn tier_grids() {
    let grids: Vec<u32> = [
        AntiAliasTier::Off,
        AntiAliasTier::Low,
        AntiAliasTier::Medium,
        AntiAliasTier::High,
        AntiAliasTier::Ultra,
    ]
    .iter()
    .map(|t| t.grid())
    .collect();
    assert_eq!(grids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn exporter_config_rejects_degenerate_precision() {
    ExporterConfig::default().validate().unwrap();
    for cfg in [
        ExporterConfig {
            precision_threshold: f64::NAN,
            ..ExporterConfig::default()
        },
        ExporterConfig {
            precision_threshold: 0.0,
            ..ExporterConfig::default()
        },
        ExporterConfig {
            reference_range: -3.0,
            ..ExporterConfig::default()
        },
        ExporterConfig {
            reference_range: f64::INFINITY,
            ..ExporterConfig::default()
        },
        ExporterConfig {
            queue_capacity: 0,
            ..ExporterConfig::default()
        },
        ExporterConfig {
            exact_threads: Some(0),
            ..ExporterConfig::default()
        },
    ] {
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)), "{cfg:?}: {err}");
    }
}
