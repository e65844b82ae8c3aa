//! Per-separator transform entries.
//!
//! A [`Transform`] bundles a translation, an axis-angle rotation and a scale.
//! A separator's model matrix is the product of its entries' matrices in list
//! order, each entry contributing `T * S * R`.

use serde::{Deserialize, Serialize};

use crate::math::{mat4::Mat4, vec3::Vec3, vec4::Vec4};
use crate::scene::SceneError;

/// A 3D transform with translation, axis-angle rotation and scale.
///
/// Provides a fluent API where mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .set_translation_xyz(5.0, 2.0, 0.0)
///     .set_rotation(Vec3::UP, 0.1)
///     .set_scale_uniform(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    translation: Vec3,
    rotation: Vec4, // axis in xyz, angle in radians in w
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec4::new(0.0, 0.0, 1.0, 0.0),
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with default values (no translation, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Translation ============

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) -> &mut Self {
        self.translation = translation;
        self
    }

    pub fn set_translation_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.translation = Vec3::new(x, y, z);
        self
    }

    // ============ Rotation ============

    /// Rotation axis (not necessarily normalized).
    pub fn rotation_axis(&self) -> Vec3 {
        self.rotation.to_vec3()
    }

    /// Rotation angle in radians.
    pub fn rotation_angle(&self) -> f32 {
        self.rotation.w
    }

    /// Set the rotation as `angle` radians around `axis`.
    pub fn set_rotation(&mut self, axis: Vec3, angle: f32) -> &mut Self {
        self.rotation = Vec4::from_vec3(axis, angle);
        self
    }

    // ============ Scale ============

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    /// Set uniform scale (same value for x, y, z).
    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale = Vec3::splat(s);
        self
    }

    // ============ Validation ============

    /// Rejects transforms whose matrices would not be invertible.
    ///
    /// A zero scale component collapses geometry (and makes the normal matrix
    /// divide by zero); a zero rotation axis has no direction to rotate around.
    pub fn validate(&self) -> Result<(), SceneError> {
        let s = self.scale;
        if s.x == 0.0 || s.y == 0.0 || s.z == 0.0 {
            return Err(SceneError::ZeroScale { scale: s.to_array() });
        }
        if self.rotation_axis() == Vec3::ZERO {
            return Err(SceneError::ZeroRotationAxis);
        }
        Ok(())
    }

    // ============ Matrix Generation ============

    /// Generate the transformation matrix.
    ///
    /// Order: Translation * Scale * Rotation
    /// (rotation applied first, then scale, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        let t = self.translation;
        let s = self.scale;
        Mat4::translation(t.x, t.y, t.z)
            * Mat4::scaling(s.x, s.y, s.z)
            * Mat4::rotation(self.rotation_axis(), self.rotation_angle())
    }

    /// Generate the normal matrix for lighting calculations.
    ///
    /// This is the inverse transpose of the linear part `S * R` of
    /// [`Transform::to_matrix`], i.e. `(R⁻¹ * S⁻¹)ᵀ`, built from the closed-form
    /// inverses (reciprocal scale, negated angle) so no general matrix
    /// inversion is needed. Correctly handles non-uniform scaling.
    pub fn normal_matrix(&self) -> Mat4 {
        let s = self.scale;
        let inverse_scale = Mat4::scaling(1.0 / s.x, 1.0 / s.y, 1.0 / s.z);
        let inverse_rotation = Mat4::rotation(self.rotation_axis(), -self.rotation_angle());
        (inverse_rotation * inverse_scale).transpose()
    }
}
