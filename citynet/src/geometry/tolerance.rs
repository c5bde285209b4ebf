// Centralized tolerances and helpers for robust geometry

pub const EPS_POS: f64 = 1e-6;            // point coincidence threshold (world units)
pub const EPS_LEN: f64 = 1e-9;            // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-12;         // denominator guard for line intersection
pub const EPS_FACE_AREA: f64 = 1e-6;      // tiny face area threshold (units^2)
pub const EPS_ANG: f64 = 1e-9;            // angle compare slack (radians)
pub const EPS_COLLINEAR: f64 = 1e-6;      // sine threshold for collinear simplification

// A split point must sit this far from both endpoints of the segment it cuts
pub const SPLIT_EPS: f64 = 1e-3;

// Quantization grid for vertex keys (0.01 units)
pub const QUANT_SCALE: f64 = 100.0;       // 1.0 / 0.01

#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}
#[inline]
pub fn near_zero(x: f64, eps: f64) -> bool {
    x.abs() <= eps
}
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap_tau(theta: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let r = theta.rem_euclid(tau);
    if r >= tau { 0.0 } else { r }
}

#[inline]
pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= EPS_DENOM { fallback } else { num / den }
}
