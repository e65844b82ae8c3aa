//! Edge-function triangle rasterization with barycentric attribute interpolation.
//!
//! # Algorithm Overview
//!
//! 1. Map each vertex's continuous (x, y) to a pixel through the [`Viewport`]
//! 2. Take the integer bounding box of the three pixels, clamped to the canvas
//! 3. Evaluate three edge functions at every pixel of the box
//! 4. Hand each covered pixel, with its interpolated attributes, to a
//!    [`FragmentShader`]
//!
//! # Edge Function
//!
//! For pixel-space vertices `a`, `b` and a query point `(x, y)`:
//!
//! ```text
//! f(a, b, x, y) = (a.y - b.y) * x + (b.x - a.x) * y + a.x * b.y - b.x * a.y
//! ```
//!
//! which is twice the signed area of `(a, b, query)`. The barycentric weights are
//!
//! ```text
//! alpha = f(v1, v2, x, y) / f(v1, v2, v0)
//! beta  = f(v2, v0, x, y) / f(v2, v0, v1)
//! gamma = f(v0, v1, x, y) / f(v0, v1, v2)
//! ```
//!
//! Each weight is normalized by its own vertex, so the inside test
//! `alpha, beta, gamma >= 0` holds for either winding.
//!
//! # Fill Rule
//!
//! The test is inclusive on all three edges. A pixel lying exactly on an edge
//! shared by two triangles is emitted for both of them.

pub mod shader;

pub use shader::{
    color_vertex, phong_vertex, ColorShader, DepthShader, FragmentShader, PhongShader,
};

use super::canvas::Viewport;

/// Full-triangle edge values below this magnitude mark a zero-area triangle.
pub const DEGENERATE_EPSILON: f32 = 1e-4;

/// A vertex carrying `N` attributes.
///
/// Slots 0 and 1 are the projected (x, y) position in the viewport's
/// continuous domain. The meaning of the remaining slots is agreed between
/// whoever builds the vertices and the shader that consumes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex<const N: usize> {
    pub attributes: [f32; N],
}

impl<const N: usize> Vertex<N> {
    pub const fn new(attributes: [f32; N]) -> Self {
        Self { attributes }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.attributes[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.attributes[1]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
}

/// Twice the signed area of the triangle `(a, b, (x, y))`.
///
/// Pixel coordinates span the full `i32` range when a vertex saturates the
/// viewport mapping. Each product then needs 65 bits and the sum 67, so the
/// exact value is computed in `i128`.
#[inline]
fn edge_function(a: PixelCoord, b: PixelCoord, x: i32, y: i32) -> f64 {
    let (ax, ay) = (a.x as i128, a.y as i128);
    let (bx, by) = (b.x as i128, b.y as i128);
    let (x, y) = (x as i128, y as i128);
    ((ay - by) * x + (bx - ax) * y + ax * by - bx * ay) as f64
}

/// Per-triangle state shared by every pixel of the bounding box.
#[derive(Clone, Copy, Debug)]
pub struct TriangleSetup {
    pixels: [PixelCoord; 3],
    f_alpha: f64,
    f_beta: f64,
    f_gamma: f64,
    min: PixelCoord,
    max: PixelCoord,
}

impl TriangleSetup {
    /// Map `positions` to pixels and prepare the edge functions.
    ///
    /// Returns `None` for a degenerate (zero-area) triangle.
    pub fn new(viewport: &Viewport, positions: [(f32, f32); 3]) -> Option<Self> {
        let pixels = positions.map(|(x, y)| PixelCoord {
            x: viewport.map_x(x),
            y: viewport.map_y(y),
        });
        let [v0, v1, v2] = pixels;

        let f_alpha = edge_function(v1, v2, v0.x, v0.y);
        let f_beta = edge_function(v2, v0, v1.x, v1.y);
        let f_gamma = edge_function(v0, v1, v2.x, v2.y);
        let epsilon = f64::from(DEGENERATE_EPSILON);
        if f_alpha.abs() < epsilon || f_beta.abs() < epsilon || f_gamma.abs() < epsilon
        {
            return None;
        }

        let min = PixelCoord {
            x: v0.x.min(v1.x).min(v2.x).max(0),
            y: v0.y.min(v1.y).min(v2.y).max(0),
        };
        let max = PixelCoord {
            x: v0.x.max(v1.x).max(v2.x).min(viewport.x_res() as i32 - 1),
            y: v0.y.max(v1.y).max(v2.y).min(viewport.y_res() as i32 - 1),
        };

        Some(Self {
            pixels,
            f_alpha,
            f_beta,
            f_gamma,
            min,
            max,
        })
    }

    /// The three vertices in pixel coordinates.
    pub fn pixels(&self) -> [PixelCoord; 3] {
        self.pixels
    }

    /// Inclusive pixel bounding box clamped to the canvas, or `None` when the
    /// triangle lies entirely outside it.
    pub fn bounds(&self) -> Option<(PixelCoord, PixelCoord)> {
        (self.min.x <= self.max.x && self.min.y <= self.max.y).then_some((self.min, self.max))
    }

    /// Barycentric weights `[alpha, beta, gamma]` of pixel `(x, y)`.
    ///
    /// Divided in `f64`: with far off-screen vertices the edge values reach
    /// 1e19 while neighbouring pixels differ by far less than `f32` resolves.
    #[inline]
    pub fn weights(&self, x: i32, y: i32) -> [f32; 3] {
        let [v0, v1, v2] = self.pixels;
        [
            (edge_function(v1, v2, x, y) / self.f_alpha) as f32,
            (edge_function(v2, v0, x, y) / self.f_beta) as f32,
            (edge_function(v0, v1, x, y) / self.f_gamma) as f32,
        ]
    }

    /// Iterate over every covered pixel together with its weights.
    pub fn covered(&self) -> impl Iterator<Item = (PixelCoord, [f32; 3])> + '_ {
        let (min, max) = self.bounds().unwrap_or((
            PixelCoord { x: 0, y: 0 },
            PixelCoord { x: -1, y: -1 },
        ));
        (min.y..=max.y)
            .flat_map(move |y| (min.x..=max.x).map(move |x| PixelCoord { x, y }))
            .filter_map(move |p| {
                let weights = self.weights(p.x, p.y);
                weights.iter().all(|w| *w >= 0.0).then_some((p, weights))
            })
    }
}

/// Interpolate every attribute slot with barycentric `weights`.
#[inline]
pub fn interpolate<const N: usize>(vertices: &[Vertex<N>; 3], weights: [f32; 3]) -> [f32; N] {
    let [alpha, beta, gamma] = weights;
    std::array::from_fn(|i| {
        alpha * vertices[0].attributes[i]
            + beta * vertices[1].attributes[i]
            + gamma * vertices[2].attributes[i]
    })
}

/// Rasterize one triangle, calling `shader` once per covered pixel.
///
/// The rasterizer never touches a canvas itself; whatever the shader does
/// with the fragment is up to the shader. Degenerate triangles and triangles
/// outside the viewport produce no fragments. Returns the number of
/// fragments emitted.
pub fn rasterize_triangle<const N: usize, S>(
    viewport: &Viewport,
    vertices: &[Vertex<N>; 3],
    shader: &mut S,
) -> usize
where
    S: FragmentShader<N> + ?Sized,
{
    let positions = vertices.map(|v| (v.x(), v.y()));
    let Some(setup) = TriangleSetup::new(viewport, positions) else {
        return 0;
    };

    let mut fragments = 0;
    for (pixel, weights) in setup.covered() {
        let attributes = interpolate(vertices, weights);
        shader.shade(pixel.x, pixel.y, &attributes);
        fragments += 1;
    }
    fragments
}
