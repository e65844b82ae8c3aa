//! A CPU software rasterizer for lit triangle meshes.
//!
//! Scenes of transformed meshes are projected to normalized device
//! coordinates, rasterized with edge functions and shaded flat, Gouraud or
//! Phong into a [`Canvas`](render::Canvas) that can be written as PPM or PNG.
//!
//! # Quick Start
//!
//! ```no_run
//! use softshade::prelude::*;
//!
//! let config = RenderConfig::default();
//! let scene = config.build_scene(MeshData::cube())?;
//! let mut engine = config.engine();
//! engine.render(&scene);
//! engine.canvas().save("cube.png", config.max_intensity)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod colors;
pub mod config;
pub mod engine;
pub mod light;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod render;
pub mod scene;
pub mod transform;

pub use config::RenderConfig;
pub use engine::{Engine, FrameStats, ParseModeError, RenderMode, ShadingMode};
pub use mesh::{LoadError, MeshData};
pub use scene::{Scene, SceneError};

/// Prelude module for convenient imports.
pub mod prelude {
    // Configuration & engine
    pub use crate::config::RenderConfig;
    pub use crate::engine::{Engine, FrameStats, RenderMode, ShadingMode};

    // Scene
    pub use crate::light::{Material, PointLight};
    pub use crate::mesh::MeshData;
    pub use crate::projection::{Frustum, ProjectionKind};
    pub use crate::scene::{Camera, Scene, Separator};
    pub use crate::transform::Transform;

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Rendering
    pub use crate::render::{Canvas, Viewport};
}
