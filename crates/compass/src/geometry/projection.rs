//! Horizontal-plane projection and bearing math.
//!
//! Angles follow the compass convention: degrees, clockwise positive when
//! looking down the `+y` axis, with `+z` as north and `+x` as east.

use super::types::Vec3;
use crate::constants::HORIZONTAL_EPSILON;

/// Drop the vertical component and normalize.
///
/// A purely vertical direction has no horizontal heading, so it is replaced
/// with [`Vec3::FORWARD`].
pub fn project_to_horizontal(direction: Vec3) -> Vec3 {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < HORIZONTAL_EPSILON {
        return Vec3::FORWARD;
    }
    flat.normalized()
}

/// Signed angle in degrees from `from` to `to` about the up axis, in (-180, 180].
pub fn signed_angle_about_up(from: Vec3, to: Vec3) -> f32 {
    let sin = Vec3::UP.dot(from.cross(to));
    let cos = from.dot(to);
    sin.atan2(cos).to_degrees()
}

/// Bearing in degrees [0, 360) from `north` to the direction `from -> to`.
pub fn bearing_from_north(north: Vec3, from: Vec3, to: Vec3) -> f32 {
    let north = project_to_horizontal(north);
    let target = project_to_horizontal(to - from);
    let mut angle = signed_angle_about_up(north, target);
    if angle < 0.0 {
        angle += 360.0;
    }
    // -tiny + 360 rounds up to 360 in f32
    if angle >= 360.0 { 0.0 } else { angle }
}

/// Wrap a value in turns into [0, 1)
#[inline]
pub fn wrap01(turns: f32) -> f32 {
    let w = turns - turns.floor();
    if w >= 1.0 { 0.0 } else { w }
}

/// Wrap a turn difference onto the shortest path, [-0.5, 0.5)
#[inline]
pub fn wrap_half(turns: f32) -> f32 {
    wrap01(turns + 0.5) - 0.5
}

/// Horizontal pixel offset of a target on the strip.
///
/// `bearing_deg` is the target's bearing, `heading` the viewer heading in
/// turns. The strip shows `uv_width_fraction` of a full turn across
/// `band_width` pixels, and scrolls opposite to the world bearing.
pub fn strip_offset_px(bearing_deg: f32, heading: f32, band_width: f32, uv_width_fraction: f32) -> f32 {
    let diff = wrap_half(bearing_deg / 360.0 - heading);
    -diff * band_width * (1.0 / uv_width_fraction)
}
