use super::geo_point::Radians;
use crate::error;
use std::f32::consts::{PI, TAU};

/// Wraps an angle into the half-open range `[0, 2π)`.
///
/// # Arguments
/// - `angle`: Any finite angle in radians.
///
/// # Returns
/// - The equivalent angle in `[0, 2π)`.
pub fn wrap_two_pi(angle: Radians) -> Radians {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wraps an angle into the half-open range `(-π, π]`.
///
/// # Arguments
/// - `angle`: Any finite angle in radians.
///
/// # Returns
/// - The equivalent angle in `(-π, π]`.
pub fn wrap_pi(angle: Radians) -> Radians {
    let wrapped = wrap_two_pi(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Clamps `value` into `[minimum, maximum]`.
///
/// Unlike [`f32::clamp`] this never panics: reversed bounds are swapped and
/// reported, since they can only come from a bad configuration.
///
/// # Arguments
/// - `value`: The value to clamp.
/// - `minimum`: The lower bound.
/// - `maximum`: The upper bound.
///
/// # Returns
/// - `value` limited to the range spanned by the two bounds.
pub fn clamp(value: f32, minimum: f32, maximum: f32) -> f32 {
    let (lo, hi) = if minimum > maximum {
        error!("clamp minimum and maximum were reversed: {minimum} {maximum}");
        (maximum, minimum)
    } else {
        (minimum, maximum)
    };
    value.max(lo).min(hi)
}

/// Clamps `value` into `[-limit, limit]`.
pub fn clamp_symmetric(value: f32, limit: f32) -> f32 { clamp(value, -limit, limit) }
