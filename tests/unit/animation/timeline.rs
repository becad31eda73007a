use super::*;
use crate::animation::ease::Ease;

fn kf(id: u64, duration_ms: u64, center: (f64, f64), half: f64) -> Keyframe {
    Keyframe {
        id,
        timestamp_ms: 0,
        duration_ms,
        easing: Ease::Linear,
        view_bounds: ViewBounds::from_center(Complex::new(center.0, center.1), half, half),
        fractal_mode: FractalMode::Mandelbrot,
        julia_constant: Complex::new(-0.8, 0.156),
        equation_id: 1,
        max_iterations: 100,
        palette_id: 0,
        color_temperature: 0.0,
        thumbnail: None,
    }
}

fn retimed(mut keys: Vec<Keyframe>) -> Vec<Keyframe> {
    let mut t = 0;
    for k in &mut keys {
        k.timestamp_ms = t;
        t += k.duration_ms;
    }
    keys
}

fn zoom_in() -> Vec<Keyframe> {
    let mut b = kf(1, 1000, (-0.75, 0.1), 1e-3);
    b.max_iterations = 500;
    b.equation_id = 5;
    b.palette_id = 2;
    b.color_temperature = 1.0;
    b.fractal_mode = FractalMode::Julia;
    b.julia_constant = Complex::new(0.2, -0.156);
    retimed(vec![
        kf(0, 2000, (-0.5, 0.0), 1.5),
        b,
        kf(2, 500, (-0.75, 0.1), 1e-6),
    ])
}

#[test]
fn keyframe_timestamps_return_exact_snapshots() {
    let keys = zoom_in();
    for k in &keys {
        assert_eq!(state_at(&keys, k.timestamp_ms as f64), k.snapshot());
        assert_eq!(
            state_at_for_output(&keys, k.timestamp_ms as f64, 1920, 1080),
            k.snapshot()
        );
    }
}

#[test]
fn times_outside_the_timeline_clamp() {
    let keys = zoom_in();
    assert_eq!(state_at(&keys, -250.0), state_at(&keys, 0.0));
    assert_eq!(state_at(&keys, f64::NEG_INFINITY), keys[0].snapshot());
    assert_eq!(state_at(&keys, 3000.0), keys[2].snapshot());
    assert_eq!(state_at(&keys, 1e12), keys[2].snapshot());
}

#[test]
fn linear_zoom_in_is_strictly_decreasing() {
    let keys = zoom_in();
    let mut prev = f64::INFINITY;
    for t in (0..2000).step_by(7) {
        let r = state_at(&keys, f64::from(t)).view_bounds.half_range_real();
        assert!(r < prev, "half-range did not shrink at t={t}");
        prev = r;
    }
}

#[test]
fn zoom_midpoint_is_geometric() {
    let keys = zoom_in();
    let mid = state_at(&keys, 1000.0).view_bounds.half_range_real();
    let expected = (1.5f64 * 1e-3).sqrt();
    assert!((mid - expected).abs() / expected < 1e-12);
}

#[test]
fn center_moves_linearly() {
    let keys = zoom_in();
    let c = state_at(&keys, 500.0).view_bounds.center();
    assert!((c.real - (-0.5625)).abs() < 1e-12);
    assert!((c.imag - 0.025).abs() < 1e-12);
}

#[test]
fn discrete_fields_snap_at_next_keyframe() {
    let keys = zoom_in();
    let before = state_at(&keys, 1999.0);
    assert_eq!(before.equation_id, 1);
    assert_eq!(before.palette_id, 0);
    assert_eq!(before.fractal_mode, FractalMode::Mandelbrot);

    let at = state_at(&keys, 2000.0);
    assert_eq!(at.equation_id, 5);
    assert_eq!(at.palette_id, 2);
    assert_eq!(at.fractal_mode, FractalMode::Julia);
}

#[test]
fn scalar_fields_interpolate() {
    let keys = zoom_in();
    let s = state_at(&keys, 1000.0);
    assert_eq!(s.max_iterations, 300);
    assert!((s.color_temperature - 0.5).abs() < 1e-12);
    assert!((s.julia_constant.real - (-0.3)).abs() < 1e-12);
    assert!(s.julia_constant.imag.abs() < 1e-12);
}

#[test]
fn max_iterations_never_drops_below_one() {
    let mut a = kf(0, 1000, (0.0, 0.0), 1.0);
    a.max_iterations = 1;
    let mut b = kf(1, 1000, (0.0, 0.0), 1.0);
    b.max_iterations = 1;
    let keys = retimed(vec![a, b]);
    assert_eq!(state_at(&keys, 500.0).max_iterations, 1);
}

#[test]
fn easing_shapes_segment_progress() {
    let mut keys = zoom_in();
    keys[0].easing = Ease::EaseIn;
    let c = state_at(&keys, 1000.0).view_bounds.center();
    // eased t = 0.25 at the segment midpoint
    assert!((c.real - (-0.5625)).abs() < 1e-12);
}

#[test]
fn output_aspect_drives_imaginary_range() {
    let keys = zoom_in();
    let s = state_at_for_output(&keys, 700.0, 1920, 1080);
    let b = s.view_bounds;
    let ratio = b.half_range_imag() / b.half_range_real();
    assert!((ratio - 1080.0 / 1920.0).abs() < 1e-12);
}

#[test]
fn empty_and_single_keyframe_lists_are_total() {
    assert_eq!(state_at(&[], 10.0), RenderState::default());
    let keys = retimed(vec![kf(0, 1000, (0.1, 0.2), 0.5)]);
    assert_eq!(state_at(&keys, 500.0), keys[0].snapshot());
}

#[test]
fn frame_count_rounds_up() {
    assert_eq!(frame_count(5000, 30), 150);
    assert_eq!(frame_count(5000, 60), 300);
    assert_eq!(frame_count(1001, 30), 31);
    assert_eq!(frame_count(0, 30), 0);
}

#[test]
fn frame_time_steps_by_fps() {
    assert_eq!(frame_time_ms(0, 30), 0.0);
    assert_eq!(frame_time_ms(30, 30), 1000.0);
    assert_eq!(frame_time_ms(3, 60), 50.0);
}
