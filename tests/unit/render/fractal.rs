use super::*;
use crate::foundation::core::Complex;

#[test]
fn origin_never_escapes_mandelbrot() {
    let e = escape(Equation::Quadratic, (0.0f32, 0.0), (0.0f32, 0.0), 500);
    assert!(!e.escaped);
    assert_eq!(e.iterations, 500);
}

#[test]
fn far_point_escapes_immediately() {
    let e = escape(
        Equation::Quadratic,
        (DoubleDouble::from_f64(0.0), DoubleDouble::from_f64(0.0)),
        (DoubleDouble::from_f64(300.0), DoubleDouble::from_f64(0.0)),
        100,
    );
    assert!(e.escaped);
    assert_eq!(e.iterations, 1);
}

#[test]
fn scalar_types_agree_at_shallow_zoom() {
    for eq in [
        Equation::Quadratic,
        Equation::Cubic,
        Equation::Quartic,
        Equation::BurningShip,
        Equation::Tricorn,
    ] {
        let c = (1.2, 0.9);
        let a = escape(eq, (0.0f32, 0.0), (c.0 as f32, c.1 as f32), 64);
        let b = escape(
            eq,
            (DoubleDouble::from_f64(0.0), DoubleDouble::from_f64(0.0)),
            (DoubleDouble::from_f64(c.0), DoubleDouble::from_f64(c.1)),
            64,
        );
        assert_eq!(a.escaped, b.escaped, "{eq:?}");
        assert!(a.iterations.abs_diff(b.iterations) <= 1, "{eq:?}");
    }
}

#[test]
fn unknown_equation_ids_fall_back() {
    assert_eq!(Equation::from_id(1), Equation::Quadratic);
    assert_eq!(Equation::from_id(5), Equation::Tricorn);
    assert_eq!(Equation::from_id(999), Equation::Quadratic);
}

#[test]
fn interior_points_are_black() {
    let shader = Shader::new(&RenderState::default());
    assert_eq!(shader.color(0.0f32, 0.0f32), [0.0; 3]);
}

#[test]
fn temperature_warms_and_cools() {
    let warm = Shader::new(&RenderState {
        color_temperature: 1.0,
        palette_id: 3,
        ..RenderState::default()
    });
    let cool = Shader::new(&RenderState {
        color_temperature: -1.0,
        palette_id: 3,
        ..RenderState::default()
    });
    let w = warm.color(0.5f32, 0.5f32);
    let c = cool.color(0.5f32, 0.5f32);
    assert!(w[0] >= c[0]);
    assert!(w[2] <= c[2]);
    assert_eq!(w[1], c[1]);
}

#[test]
fn julia_mode_uses_constant() {
    let state = RenderState {
        fractal_mode: FractalMode::Julia,
        julia_constant: Complex::new(0.0, 0.0),
        ..RenderState::default()
    };
    let shader = Shader::new(&state);
    // With c = 0 the Julia set is the unit disk.
    assert_eq!(shader.color(0.5f32, 0.0f32), [0.0; 3]);
    assert_ne!(shader.color(1.5f32, 0.0f32), [0.0; 3]);
}

#[test]
fn write_pixel_averages_and_is_opaque() {
    let mut px = [0u8; 4];
    write_pixel(&mut px, [400.0, 200.0, 0.0], 4);
    assert_eq!(px, [100, 50, 0, 255]);
}

#[test]
fn sample_offsets_are_centered() {
    assert_eq!(sample_offset(0, 1), 0.5);
    assert_eq!(sample_offset(0, 2), 0.25);
    assert_eq!(sample_offset(1, 2), 0.75);
}
