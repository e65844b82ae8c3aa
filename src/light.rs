//! Lights, materials and Blinn-Phong illumination.

use serde::{Deserialize, Serialize};

use crate::colors;
use crate::math::vec3::Vec3;

/// A point light that radiates `color` from `position` in world space.
///
/// There is no distance attenuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    #[serde(default = "default_light_color")]
    pub color: Vec3,
}

fn default_light_color() -> Vec3 {
    colors::WHITE
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }

    /// A white light at `position`.
    pub fn white(position: Vec3) -> Self {
        Self::new(position, colors::WHITE)
    }
}

/// Surface reflectance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Exponent of the specular falloff; larger is a tighter highlight.
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.7),
            specular: Vec3::splat(0.3),
            shininess: 16.0,
        }
    }
}

/// Everything needed to light one surface point: a material, the scene
/// lights and the eye position.
#[derive(Debug, Clone, Copy)]
pub struct Lighting<'a> {
    material: &'a Material,
    lights: &'a [PointLight],
    eye: Vec3,
}

impl<'a> Lighting<'a> {
    pub fn new(material: &'a Material, lights: &'a [PointLight], eye: Vec3) -> Self {
        Self {
            material,
            lights,
            eye,
        }
    }

    /// Blinn-Phong color at world `position` with surface `normal`.
    ///
    /// ```text
    /// color = ambient + min(Σ diffuse_i, 1) ⊙ kd + Σ specular_i ⊙ ks
    /// diffuse_i  = light_i · max(n · l, 0)
    /// specular_i = light_i · max(n · normalize(e + l), 0) ^ shininess
    /// ```
    ///
    /// where `l` and `e` are the unit directions toward the light and the eye.
    /// The result is clamped into `[0, 1]`.
    pub fn shade(&self, position: Vec3, normal: Vec3) -> Vec3 {
        let normal = normal.normalize();
        let to_eye = (self.eye - position).normalize();

        let mut diffuse_sum = Vec3::ZERO;
        let mut specular_sum = Vec3::ZERO;
        for light in self.lights {
            let to_light = (light.position - position).normalize();

            let diffuse = normal.dot(to_light).max(0.0);
            diffuse_sum += light.color * diffuse;

            let half = (to_eye + to_light).normalize();
            let specular = normal.dot(half).max(0.0).powf(self.material.shininess);
            specular_sum += light.color * specular;
        }

        let color = self.material.ambient
            + colors::clamp_unit(diffuse_sum).hadamard(self.material.diffuse)
            + specular_sum.hadamard(self.material.specular);
        colors::clamp_unit(color)
    }
}
