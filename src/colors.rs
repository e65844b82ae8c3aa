//! Color constants and conversions.
//!
//! Colors are linear RGB triples stored as [`Vec3`] with channels in `[0, 1]`.

use crate::math::vec3::Vec3;

pub const BLACK: Vec3 = Vec3::new(0.0, 0.0, 0.0);
pub const WHITE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

/// Clamp every channel into `[0, 1]`.
#[inline]
pub fn clamp_unit(color: Vec3) -> Vec3 {
    color.clamp(0.0, 1.0)
}

/// Scale a unit color to integer intensities, truncating toward zero.
#[inline]
pub fn quantize(color: Vec3, max_intensity: u32) -> [u32; 3] {
    let max = max_intensity as f32;
    [
        (color.x * max) as u32,
        (color.y * max) as u32,
        (color.z * max) as u32,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_truncates() {
        assert_eq!(quantize(Vec3::new(1.0, 0.5, 0.999), 255), [255, 127, 254]);
        assert_eq!(quantize(BLACK, 255), [0, 0, 0]);
    }

    #[test]
    fn clamp_unit_limits_channels() {
        assert_eq!(clamp_unit(Vec3::new(-0.5, 0.25, 7.0)), Vec3::new(0.0, 0.25, 1.0));
    }
}
