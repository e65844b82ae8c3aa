//! Core rendering engine.
//!
//! The [`Engine`] owns the canvas and runs one full pass over a [`Scene`]:
//! matrix composition, projection, backface culling, lighting and
//! rasterization. Every call to [`Engine::render`] starts from a cleared
//! canvas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::light::Lighting;
use crate::math::{vec3::Vec3, vec4::Vec4};
use crate::render::canvas::{Canvas, Viewport, WriteStats};
use crate::render::rasterizer::{
    color_vertex, phong_vertex, rasterize_triangle, ColorShader, DepthShader, PhongShader,
    Vertex,
};
use crate::scene::{Scene, Separator, TriangleIndices};

/// What the engine draws for each triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// White Bresenham edges, no depth test and no culling.
    Wireframe,
    /// Depth-tested solid white fill, no lighting.
    Depth,
    /// Lit fill using the current [`ShadingMode`].
    #[default]
    Shaded,
}

/// Where the lighting model is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// Once per triangle at its centroid with the averaged normal.
    Flat,
    /// Once per vertex; colors are interpolated.
    #[default]
    Gouraud,
    /// Once per pixel from interpolated world positions and normals.
    Phong,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

impl FromStr for RenderMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wireframe" => Ok(RenderMode::Wireframe),
            "depth" => Ok(RenderMode::Depth),
            "shaded" => Ok(RenderMode::Shaded),
            _ => Err(ParseModeError {
                kind: "render mode",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ShadingMode {
    type Err = ParseModeError;

    /// Accepts the mode name or its number: 0 flat, 1 Gouraud, 2 Phong.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" | "0" => Ok(ShadingMode::Flat),
            "gouraud" | "1" => Ok(ShadingMode::Gouraud),
            "phong" | "2" => Ok(ShadingMode::Phong),
            _ => Err(ParseModeError {
                kind: "shading mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Wireframe => write!(f, "wireframe"),
            RenderMode::Depth => write!(f, "depth"),
            RenderMode::Shaded => write!(f, "shaded"),
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadingMode::Flat => write!(f, "flat"),
            ShadingMode::Gouraud => write!(f, "gouraud"),
            ShadingMode::Phong => write!(f, "phong"),
        }
    }
}

/// Counters for one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles produced by fan-triangulating every face.
    pub triangles: usize,
    /// Triangles discarded by backface culling.
    pub culled: usize,
    /// Triangles with a vertex on or behind the eye plane (clip w <= 0).
    pub behind_camera: usize,
    /// Fragments emitted by the triangle rasterizer.
    pub fragments: usize,
    pub writes: WriteStats,
}

pub struct Engine {
    canvas: Canvas,
    render_mode: RenderMode,
    shading_mode: ShadingMode,
    pub backface_culling: bool,
}

impl Engine {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            canvas: Canvas::new(viewport),
            render_mode: RenderMode::default(),
            shading_mode: ShadingMode::default(),
            backface_culling: true,
        }
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        self.shading_mode = mode;
    }

    pub fn shading_mode(&self) -> ShadingMode {
        self.shading_mode
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    /// Render `scene` into a freshly cleared canvas.
    pub fn render(&mut self, scene: &Scene) -> FrameStats {
        self.canvas.clear();
        debug!(
            mode = %self.render_mode,
            shading = %self.shading_mode,
            separators = scene.separators().len(),
            lights = scene.lights().len(),
            triangles = scene.triangle_count(),
            "rendering scene"
        );

        let mut stats = FrameStats::default();
        for separator in scene.separators() {
            self.render_separator(scene, separator, &mut stats);
        }
        stats.writes = self.canvas.stats();

        debug!(
            triangles = stats.triangles,
            culled = stats.culled,
            behind_camera = stats.behind_camera,
            fragments = stats.fragments,
            written = stats.writes.written,
            clipped = stats.writes.clipped,
            depth_rejected = stats.writes.depth_rejected,
            "frame complete"
        );
        stats
    }

    fn render_separator(&mut self, scene: &Scene, separator: &Separator, stats: &mut FrameStats) {
        let camera = scene.camera();
        let model = separator.model_matrix();
        let model_view_projection = camera.view_projection() * model;
        let normal_matrix = separator.normal_matrix();
        let lighting = Lighting::new(separator.material(), scene.lights(), camera.position);
        let viewport = self.canvas.viewport();
        let points = separator.points();

        for triangle in separator.triangles() {
            stats.triangles += 1;

            let object = triangle.vertices.map(|i| points[i]);
            let clip = object.map(|p| model_view_projection * Vec4::from(p));
            if clip.iter().any(|c| c.w <= 0.0) {
                trace!(vertices = ?triangle.vertices, "triangle behind camera");
                stats.behind_camera += 1;
                continue;
            }
            let ndc = clip.map(Vec4::perspective_divide);

            if self.render_mode == RenderMode::Wireframe {
                for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                    self.canvas
                        .draw_line((ndc[a].x, ndc[a].y), (ndc[b].x, ndc[b].y));
                }
                continue;
            }

            if self.backface_culling && is_back_facing(&ndc) {
                trace!(vertices = ?triangle.vertices, "triangle culled");
                stats.culled += 1;
                continue;
            }

            stats.fragments += if self.render_mode == RenderMode::Depth {
                let vertices = ndc.map(|p| Vertex::new([p.x, p.y, p.z]));
                rasterize_triangle(&viewport, &vertices, &mut DepthShader::new(&mut self.canvas))
            } else {
                let world = object.map(|p| model * p);
                let normals = world_normals(separator, &triangle, &world, |n| {
                    (normal_matrix * n).normalize()
                });
                self.shade_triangle(&viewport, lighting, ndc, world, normals)
            };
        }
    }

    fn shade_triangle(
        &mut self,
        viewport: &Viewport,
        lighting: Lighting<'_>,
        ndc: [Vec3; 3],
        world: [Vec3; 3],
        normals: [Vec3; 3],
    ) -> usize {
        match self.shading_mode {
            ShadingMode::Flat => {
                let centroid = (world[0] + world[1] + world[2]) / 3.0;
                let normal = (normals[0] + normals[1] + normals[2]).normalize();
                let color = lighting.shade(centroid, normal);
                let vertices = ndc.map(|p| color_vertex(p, color));
                rasterize_triangle(viewport, &vertices, &mut ColorShader::new(&mut self.canvas))
            }
            ShadingMode::Gouraud => {
                let vertices: [Vertex<6>; 3] = std::array::from_fn(|i| {
                    color_vertex(ndc[i], lighting.shade(world[i], normals[i]))
                });
                rasterize_triangle(viewport, &vertices, &mut ColorShader::new(&mut self.canvas))
            }
            ShadingMode::Phong => {
                let vertices: [Vertex<9>; 3] =
                    std::array::from_fn(|i| phong_vertex(ndc[i], world[i], normals[i]));
                rasterize_triangle(
                    viewport,
                    &vertices,
                    &mut PhongShader::new(&mut self.canvas, lighting),
                )
            }
        }
    }
}

/// Counter-clockwise triangles face the viewer. Zero-area ones count as back-facing.
fn is_back_facing(ndc: &[Vec3; 3]) -> bool {
    let [p0, p1, p2] = *ndc;
    let a = p2 - p1;
    let b = p0 - p1;
    a.x * b.y - a.y * b.x <= 0.0
}

/// World-space unit normals for the three vertices of `triangle`.
///
/// Falls back to the geometric face normal when the mesh has none.
fn world_normals(
    separator: &Separator,
    triangle: &TriangleIndices,
    world: &[Vec3; 3],
    transform: impl Fn(Vec3) -> Vec3,
) -> [Vec3; 3] {
    match triangle.normals {
        Some(indices) => indices.map(|i| transform(separator.normals()[i])),
        None => {
            let face = (world[1] - world[0]).cross(world[2] - world[0]).normalize();
            [face; 3]
        }
    }
}
