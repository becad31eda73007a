pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate in log space. Both endpoints must be positive.
pub(crate) fn lerp_log(a: f64, b: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    lerp(a.ln(), b.ln(), t).exp()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
