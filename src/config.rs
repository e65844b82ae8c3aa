//! Render configuration.
//!
//! Loads render settings from JSON strings (file IO left to the binary).
//! Every field has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::engine::{Engine, RenderMode, ShadingMode};
use crate::light::{Material, PointLight};
use crate::math::vec3::Vec3;
use crate::mesh::MeshData;
use crate::render::canvas::Viewport;
use crate::scene::{Camera, Scene, SceneError, Separator};
use crate::transform::Transform;

/// Everything needed to turn one mesh into one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    pub render_mode: RenderMode,
    pub shading: ShadingMode,
    pub backface_culling: bool,
    /// Largest channel value written to PPM output.
    pub max_intensity: u32,
    pub camera: Camera,
    pub lights: Vec<PointLight>,
    pub material: Material,
    /// Applied to the mesh in list order.
    pub transforms: Vec<Transform>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let mut tilt = Transform::new();
        tilt.set_rotation(Vec3::new(1.0, 1.0, 0.0), 0.6);

        Self {
            width: 256,
            height: 256,
            render_mode: RenderMode::default(),
            shading: ShadingMode::default(),
            backface_culling: true,
            max_intensity: 255,
            camera: Camera::default(),
            lights: vec![PointLight::white(Vec3::new(3.0, 4.0, 5.0))],
            material: Material::default(),
            transforms: vec![tilt],
        }
    }
}

impl RenderConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// NDC viewport at the configured resolution.
    pub fn viewport(&self) -> Viewport {
        Viewport::ndc(self.width, self.height)
    }

    /// An engine set up with the configured modes.
    pub fn engine(&self) -> Engine {
        let mut engine = Engine::new(self.viewport());
        engine.set_render_mode(self.render_mode);
        engine.set_shading_mode(self.shading);
        engine.backface_culling = self.backface_culling;
        engine
    }

    /// A single-separator scene around `mesh`.
    pub fn build_scene(&self, mesh: MeshData) -> Result<Scene, SceneError> {
        let separator = Separator::new(mesh, self.transforms.clone(), self.material)?;
        Scene::new(self.camera, self.lights.clone(), vec![separator])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4::Vec4;
    use crate::projection::ProjectionKind;

    #[test]
    fn empty_object_uses_defaults() {
        let config = RenderConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn parses_partial_config() {
        let json = r#"{
            "width": 64,
            "height": 32,
            "render_mode": "wireframe",
            "shading": "phong",
            "camera": {
                "position": [0, 1, 8],
                "orientation": [1, 0, 0, -0.1],
                "projection": "orthographic",
                "frustum": { "left": -2, "right": 2, "bottom": -1, "top": 1, "near": 1, "far": 20 }
            },
            "lights": [ { "position": [0, 5, 5], "color": [1, 0.5, 0.5] }, { "position": [1, 1, 1] } ],
            "material": { "shininess": 4 },
            "transforms": [ { "translation": [1, 0, 0], "scale": [2, 2, 2] } ]
        }"#;
        let config = RenderConfig::from_json_str(json).unwrap();

        assert_eq!(config.viewport().x_res(), 64);
        assert_eq!(config.render_mode, RenderMode::Wireframe);
        assert_eq!(config.shading, ShadingMode::Phong);
        assert_eq!(config.camera.orientation, Vec4::new(1.0, 0.0, 0.0, -0.1));
        assert_eq!(config.camera.projection, ProjectionKind::Orthographic);
        assert_eq!(config.camera.frustum.left, -2.0);
        assert_eq!(config.lights.len(), 2);
        assert_eq!(config.lights[1].color, Vec3::ONE);
        assert_eq!(config.material.shininess, 4.0);
        assert_eq!(config.material.ambient, Material::default().ambient);
        assert_eq!(config.transforms[0].translation(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(config.transforms[0].rotation_angle(), 0.0);
        assert_eq!(config.max_intensity, 255);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(RenderConfig::from_json_str(r#"{ "render_mode": "toon" }"#).is_err());
        assert!(RenderConfig::from_json_str(r#"{ "width": "wide" }"#).is_err());
    }

    #[test]
    fn default_config_renders_the_cube() {
        let config = RenderConfig {
            width: 32,
            height: 32,
            ..RenderConfig::default()
        };
        let scene = config.build_scene(MeshData::cube()).unwrap();
        let mut engine = config.engine();
        let stats = engine.render(&scene);

        assert_eq!(stats.triangles, 12);
        assert!(stats.fragments > 0);
        assert!(engine.canvas().lit_pixels().count() > 0);
    }

    #[test]
    fn invalid_scene_settings_surface_as_errors() {
        let config = RenderConfig::from_json_str(r#"{ "transforms": [ { "scale": [1, 0, 1] } ] }"#)
            .unwrap();
        assert!(matches!(
            config.build_scene(MeshData::cube()),
            Err(SceneError::ZeroScale { .. })
        ));
    }
}
