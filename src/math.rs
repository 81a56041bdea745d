/// Degree-mode helpers. All angles in this crate are degrees.

#[inline]
pub fn sin_deg(deg: f32) -> f32 {
    deg.to_radians().sin()
}

#[inline]
pub fn cos_deg(deg: f32) -> f32 {
    deg.to_radians().cos()
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear remap of `v` from `[in_lo, in_hi]` to `[out_lo, out_hi]`. Not clamped.
#[inline]
pub fn map_range(v: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    lerp(out_lo, out_hi, (v - in_lo) / (in_hi - in_lo))
}
