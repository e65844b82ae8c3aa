//! Fragment shaders for triangle rasterization.
//!
//! The rasterizer handles the bounding box, the edge functions, the inside test
//! and attribute interpolation. A [`FragmentShader`] receives each covered
//! pixel with its interpolated attributes and decides what, if anything, ends
//! up on the canvas.
//!
//! # Attribute Layouts
//!
//! | Shader | N | Slots |
//! |--------|---|-------|
//! | [`DepthShader`] | 3 | `x, y, z` |
//! | [`ColorShader`] | 6 | `x, y, z, r, g, b` |
//! | [`PhongShader`] | 9 | `x, y, z, world x, y, z, normal x, y, z` |
//!
//! `x, y, z` are normalized device coordinates; `z` is the depth tested
//! against the canvas depth buffer.

use super::Vertex;
use crate::colors::WHITE;
use crate::light::Lighting;
use crate::math::vec3::Vec3;
use crate::render::canvas::Canvas;

/// Per-pixel callback invoked by the rasterizer.
///
/// Any `FnMut(i32, i32, &[f32; N])` closure is a fragment shader.
pub trait FragmentShader<const N: usize> {
    fn shade(&mut self, x: i32, y: i32, attributes: &[f32; N]);
}

impl<const N: usize, F> FragmentShader<N> for F
where
    F: FnMut(i32, i32, &[f32; N]),
{
    #[inline]
    fn shade(&mut self, x: i32, y: i32, attributes: &[f32; N]) {
        self(x, y, attributes)
    }
}

/// Build a vertex for [`ColorShader`].
#[inline]
pub fn color_vertex(ndc: Vec3, color: Vec3) -> Vertex<6> {
    Vertex::new([ndc.x, ndc.y, ndc.z, color.x, color.y, color.z])
}

/// Build a vertex for [`PhongShader`].
#[inline]
pub fn phong_vertex(ndc: Vec3, world: Vec3, normal: Vec3) -> Vertex<9> {
    Vertex::new([
        ndc.x, ndc.y, ndc.z, world.x, world.y, world.z, normal.x, normal.y, normal.z,
    ])
}

/// Writes the interpolated vertex color with a depth test.
///
/// Serves flat shading (all three vertices carry the same color) and Gouraud
/// shading (each vertex carries its own lit color).
pub struct ColorShader<'a> {
    canvas: &'a mut Canvas,
}

impl<'a> ColorShader<'a> {
    pub fn new(canvas: &'a mut Canvas) -> Self {
        Self { canvas }
    }
}

impl FragmentShader<6> for ColorShader<'_> {
    #[inline]
    fn shade(&mut self, x: i32, y: i32, a: &[f32; 6]) {
        self.canvas
            .set_pixel_with_depth(x, y, a[2], Vec3::new(a[3], a[4], a[5]));
    }
}

/// Evaluates the lighting model at every pixel from the interpolated world
/// position and normal.
pub struct PhongShader<'a> {
    canvas: &'a mut Canvas,
    lighting: Lighting<'a>,
}

impl<'a> PhongShader<'a> {
    pub fn new(canvas: &'a mut Canvas, lighting: Lighting<'a>) -> Self {
        Self { canvas, lighting }
    }
}

impl FragmentShader<9> for PhongShader<'_> {
    #[inline]
    fn shade(&mut self, x: i32, y: i32, a: &[f32; 9]) {
        let world = Vec3::new(a[3], a[4], a[5]);
        // Interpolated normals shrink toward the middle of the triangle.
        let normal = Vec3::new(a[6], a[7], a[8]).normalize();
        let color = self.lighting.shade(world, normal);
        self.canvas.set_pixel_with_depth(x, y, a[2], color);
    }
}

/// Depth-tested solid white, the unlit debug view.
pub struct DepthShader<'a> {
    canvas: &'a mut Canvas,
}

impl<'a> DepthShader<'a> {
    pub fn new(canvas: &'a mut Canvas) -> Self {
        Self { canvas }
    }
}

impl FragmentShader<3> for DepthShader<'_> {
    #[inline]
    fn shade(&mut self, x: i32, y: i32, a: &[f32; 3]) {
        self.canvas.set_pixel_with_depth(x, y, a[2], WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{Material, PointLight};
    use crate::render::canvas::Viewport;
    use crate::render::rasterizer::rasterize_triangle;
    use approx::assert_relative_eq;

    fn flat_triangle(depth: f32, color: Vec3) -> [Vertex<6>; 3] {
        [
            color_vertex(Vec3::new(-0.8, -0.8, depth), color),
            color_vertex(Vec3::new(0.8, -0.8, depth), color),
            color_vertex(Vec3::new(0.0, 0.8, depth), color),
        ]
    }

    #[test]
    fn closest_triangle_wins_in_either_order() {
        let viewport = Viewport::ndc(16, 16);
        let red = Vec3::new(1.0, 0.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 1.0);
        let near = flat_triangle(0.2, red);
        let far = flat_triangle(0.6, blue);

        for order in [[&near, &far], [&far, &near]] {
            let mut canvas = Canvas::new(viewport);
            for triangle in order {
                rasterize_triangle(&viewport, triangle, &mut ColorShader::new(&mut canvas));
            }
            let color = canvas.get_pixel(8, 10).expect("in bounds");
            let depth = canvas.get_depth(8, 10).expect("depth buffer");
            assert_relative_eq!(color, red, epsilon = 1e-5);
            assert_relative_eq!(depth, 0.2, epsilon = 1e-5);
        }
    }

    #[test]
    fn gouraud_colors_blend_across_the_triangle() {
        let viewport = Viewport::ndc(16, 16);
        let vertices = [
            color_vertex(Vec3::new(-0.8, -0.8, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            color_vertex(Vec3::new(0.8, -0.8, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            color_vertex(Vec3::new(0.0, 0.8, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        ];
        let mut canvas = Canvas::new(viewport);
        rasterize_triangle(&viewport, &vertices, &mut ColorShader::new(&mut canvas));

        let center = canvas.get_pixel(8, 9).expect("in bounds");
        assert!(center.x > 0.0 && center.y > 0.0 && center.z > 0.0);
        assert!((center.x + center.y + center.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn phong_shader_lights_every_fragment() {
        let viewport = Viewport::ndc(16, 16);
        let material = Material {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            shininess: 1.0,
        };
        let lights = [PointLight::white(Vec3::new(0.0, 0.0, 10.0))];
        let lighting = Lighting::new(&material, &lights, Vec3::new(0.0, 0.0, 10.0));

        // Unnormalized normals: the shader must normalize before lighting.
        let normal = Vec3::new(0.0, 0.0, 3.0);
        let vertices = [
            phong_vertex(Vec3::new(-0.8, -0.8, 0.0), Vec3::new(-1.0, -1.0, 0.0), normal),
            phong_vertex(Vec3::new(0.8, -0.8, 0.0), Vec3::new(1.0, -1.0, 0.0), normal),
            phong_vertex(Vec3::new(0.0, 0.8, 0.0), Vec3::new(0.0, 1.0, 0.0), normal),
        ];

        let mut canvas = Canvas::new(viewport);
        let fragments =
            rasterize_triangle(&viewport, &vertices, &mut PhongShader::new(&mut canvas, lighting));

        assert!(fragments > 0);
        assert_eq!(canvas.stats().written, fragments as u64);
        let lit = canvas.lit_pixels().count();
        assert_eq!(lit, fragments);
        let center = canvas.get_pixel(8, 9).expect("in bounds");
        assert!(center.x > 0.95 && center.x <= 1.0);
    }

    #[test]
    fn depth_shader_writes_white() {
        let viewport = Viewport::ndc(8, 8);
        let vertices = [
            Vertex::new([-1.0, -1.0, 0.5]),
            Vertex::new([1.0, -1.0, 0.5]),
            Vertex::new([-1.0, 1.0, 0.5]),
        ];
        let mut canvas = Canvas::new(viewport);
        rasterize_triangle(&viewport, &vertices, &mut DepthShader::new(&mut canvas));
        assert_eq!(canvas.get_pixel(1, 6), Some(WHITE));
        assert_eq!(canvas.get_depth(1, 6), Some(0.5));
    }
}
