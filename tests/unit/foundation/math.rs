use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 128), 64);
}

#[test]
fn lerp_log_endpoints_are_exact() {
    assert_eq!(lerp_log(1.5, 1.5e-6, 0.0), 1.5);
    assert_eq!(lerp_log(1.5, 1.5e-6, 1.0), 1.5e-6);
}

#[test]
fn lerp_log_midpoint_is_geometric_mean() {
    let mid = lerp_log(1.0, 1e-4, 0.5);
    assert!((mid - 1e-2).abs() < 1e-12);
}
