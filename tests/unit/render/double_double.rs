use super::*;

fn dd(v: f64) -> DoubleDouble {
    DoubleDouble::from_f64(v)
}

#[test]
fn addition_keeps_bits_f64_drops() {
    let tiny = 1e-20;
    assert_eq!((1.0 + tiny) - 1.0, 0.0);

    let sum = dd(1.0) + dd(tiny);
    let back = sum - dd(1.0);
    assert_eq!(back.to_f64(), tiny);
}

#[test]
fn product_captures_rounding_error() {
    let a = dd(1.0 + f64::EPSILON);
    let sq = a * a;
    let (hi, lo) = sq.parts();
    // (1 + e)^2 = 1 + 2e + e^2, and e^2 does not fit in hi.
    assert_eq!(hi, 1.0 + 2.0 * f64::EPSILON);
    assert_eq!(lo, f64::EPSILON * f64::EPSILON);
}

#[test]
fn abs_and_neg() {
    let v = dd(-2.5) + dd(-1e-30);
    assert_eq!(v.abs().to_f64(), 2.5);
    assert_eq!((-v).parts(), (2.5, 1e-30));
}

#[test]
fn ordinary_values_match_f64() {
    let a = dd(0.375);
    let b = dd(-1.25);
    assert_eq!((a * b).to_f64(), 0.375 * -1.25);
    assert_eq!((a + b).to_f64(), 0.375 - 1.25);
    assert_eq!((a - b).to_f64(), 0.375 + 1.25);
}
