// DSP utilities for the output stage

/// Flush denormal values to zero
///
/// Decaying envelopes end in very small values that are slow to process.
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft clipping with tanh
///
/// Several tracks firing on the same step can sum above 1.0.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Equal-power pan law
///
/// Maps pan in [-1, 1] to (left, right) gains with constant total power.
#[inline]
pub fn equal_power_pan(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4;
    (angle.cos(), angle.sin())
}
