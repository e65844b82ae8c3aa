//! Color and depth buffers over a continuous coordinate domain.
//!
//! The [`Viewport`] maps continuous coordinates (normalized device coordinates
//! in practice) to pixel indices. The [`Canvas`] owns one RGB triple per pixel
//! plus an optional depth buffer and exposes bounds-checked, clamped writes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::{Rgb, RgbImage};
use thiserror::Error;

use crate::colors::{self, BLACK};
use crate::math::vec3::Vec3;

/// Failure while serializing a canvas to disk.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write image: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Continuous domain `[x_min, x_max] × [y_min, y_max]` sampled at `x_res × y_res` pixels.
///
/// Row 0 is the top of the image, so increasing continuous `y` maps to
/// decreasing pixel rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    x_min: f32,
    x_max: f32,
    y_min: f32,
    y_max: f32,
    x_res: u32,
    y_res: u32,
}

impl Viewport {
    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32, x_res: u32, y_res: u32) -> Self {
        debug_assert!(x_min < x_max && y_min < y_max, "viewport domain must be non-empty");
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            x_res,
            y_res,
        }
    }

    /// Viewport covering normalized device coordinates `[-1, 1] × [-1, 1]`.
    pub fn ndc(x_res: u32, y_res: u32) -> Self {
        Self::new(-1.0, 1.0, -1.0, 1.0, x_res, y_res)
    }

    pub fn x_res(&self) -> u32 {
        self.x_res
    }

    pub fn y_res(&self) -> u32 {
        self.y_res
    }

    /// Pixel column containing continuous `x`. May lie outside `[0, x_res)`.
    #[inline]
    pub fn map_x(&self, x: f32) -> i32 {
        ((x - self.x_min) / (self.x_max - self.x_min) * self.x_res as f32).floor() as i32
    }

    /// Pixel row containing continuous `y`. May lie outside `[0, y_res)`.
    #[inline]
    pub fn map_y(&self, y: f32) -> i32 {
        ((self.y_max - y) / (self.y_max - self.y_min) * self.y_res as f32).floor() as i32
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.x_res as i32 && y >= 0 && y < self.y_res as i32
    }

    /// Clips the segment `from`→`to` to the continuous domain (Liang-Barsky).
    ///
    /// Returns `None` when no part of the segment lies inside, or when an
    /// endpoint is not finite. A clipped endpoint is snapped exactly onto the
    /// boundary it was clipped against, since `from + t * (to - from)` loses
    /// that coordinate entirely once the endpoints are far off-screen.
    pub fn clip_segment(&self, from: (f32, f32), to: (f32, f32)) -> Option<((f32, f32), (f32, f32))> {
        if ![from.0, from.1, to.0, to.1].iter().all(|c| c.is_finite()) {
            return None;
        }
        let (x0, y0) = (f64::from(from.0), f64::from(from.1));
        let (dx, dy) = (f64::from(to.0) - x0, f64::from(to.1) - y0);
        let bounds = [
            f64::from(self.x_min),
            f64::from(self.x_max),
            f64::from(self.y_min),
            f64::from(self.y_max),
        ];
        // (p, q) per boundary: left, right, bottom, top.
        let edges = [
            (-dx, x0 - bounds[0]),
            (dx, bounds[1] - x0),
            (-dy, y0 - bounds[2]),
            (dy, bounds[3] - y0),
        ];

        let (mut t_enter, mut t_exit) = (0.0_f64, 1.0_f64);
        let (mut enter_edge, mut exit_edge) = (None, None);
        for (edge, (p, q)) in edges.into_iter().enumerate() {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t_exit {
                    return None;
                }
                if t > t_enter {
                    t_enter = t;
                    enter_edge = Some(edge);
                }
            } else {
                if t < t_enter {
                    return None;
                }
                if t < t_exit {
                    t_exit = t;
                    exit_edge = Some(edge);
                }
            }
        }

        let point = |t: f64, edge: Option<usize>| {
            let mut x = (x0 + t * dx).clamp(bounds[0], bounds[1]);
            let mut y = (y0 + t * dy).clamp(bounds[2], bounds[3]);
            match edge {
                Some(e @ 0..=1) => x = bounds[e],
                Some(e) => y = bounds[e],
                None => {}
            }
            (x as f32, y as f32)
        };
        let start = if enter_edge.is_some() { point(t_enter, enter_edge) } else { from };
        let end = if exit_edge.is_some() { point(t_exit, exit_edge) } else { to };
        Some((start, end))
    }
}

/// Counters for every pixel write a canvas has seen since the last clear.
///
/// Out-of-bounds and depth-failed writes are silently dropped; these counters
/// are the only trace they leave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub written: u64,
    pub clipped: u64,
    pub depth_rejected: u64,
}

/// Owning color buffer with an optional depth buffer.
///
/// Depth follows the closer-is-smaller convention: every depth starts at
/// `+∞` and a depth-tested write is rejected when its depth is strictly
/// greater than the stored one.
pub struct Canvas {
    viewport: Viewport,
    color_buffer: Vec<Vec3>,
    depth_buffer: Option<Vec<f32>>,
    stats: WriteStats,
}

impl Canvas {
    /// Creates a black canvas with a depth buffer.
    pub fn new(viewport: Viewport) -> Self {
        let size = Self::pixel_count(&viewport);
        Self {
            viewport,
            color_buffer: vec![BLACK; size],
            depth_buffer: Some(vec![f32::INFINITY; size]),
            stats: WriteStats::default(),
        }
    }

    /// Creates a black canvas without a depth buffer.
    ///
    /// Depth-tested writes on such a canvas always pass.
    pub fn without_depth(viewport: Viewport) -> Self {
        Self {
            viewport,
            color_buffer: vec![BLACK; Self::pixel_count(&viewport)],
            depth_buffer: None,
            stats: WriteStats::default(),
        }
    }

    fn pixel_count(viewport: &Viewport) -> usize {
        viewport.x_res as usize * viewport.y_res as usize
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn width(&self) -> u32 {
        self.viewport.x_res
    }

    pub fn height(&self) -> u32 {
        self.viewport.y_res
    }

    pub fn has_depth(&self) -> bool {
        self.depth_buffer.is_some()
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Reset every pixel to black, every depth to `+∞` and the write counters.
    pub fn clear(&mut self) {
        self.color_buffer.fill(BLACK);
        if let Some(depth) = self.depth_buffer.as_mut() {
            depth.fill(f32::INFINITY);
        }
        self.stats = WriteStats::default();
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.viewport
            .contains(x, y)
            .then(|| y as usize * self.viewport.x_res as usize + x as usize)
    }

    /// Set a pixel without depth testing.
    ///
    /// Channels are clamped into `[0, 1]`. Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Vec3) {
        match self.index(x, y) {
            Some(idx) => {
                self.color_buffer[idx] = colors::clamp_unit(color);
                self.stats.written += 1;
            }
            None => self.stats.clipped += 1,
        }
    }

    /// Set a pixel at (x, y) with depth testing.
    ///
    /// The pixel is only written if `depth` is not greater than the depth
    /// already stored there (smaller is closer). Returns whether the write
    /// happened. Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: Vec3) -> bool {
        let Some(idx) = self.index(x, y) else {
            self.stats.clipped += 1;
            return false;
        };

        if let Some(depth_buffer) = self.depth_buffer.as_mut() {
            if depth > depth_buffer[idx] {
                self.stats.depth_rejected += 1;
                return false;
            }
            depth_buffer[idx] = depth;
        }

        self.color_buffer[idx] = colors::clamp_unit(color);
        self.stats.written += 1;
        true
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Vec3> {
        self.index(x, y).map(|idx| self.color_buffer[idx])
    }

    /// Get the stored depth at (x, y), or None if out of bounds or there is no depth buffer.
    #[inline]
    pub fn get_depth(&self, x: i32, y: i32) -> Option<f32> {
        let idx = self.index(x, y)?;
        self.depth_buffer.as_ref().map(|depth| depth[idx])
    }

    /// Iterate over the pixel coordinates whose color is not black.
    pub fn lit_pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.viewport.x_res as usize;
        self.color_buffer
            .iter()
            .enumerate()
            .filter(|(_, color)| **color != BLACK)
            .map(move |(idx, _)| ((idx % width) as i32, (idx / width) as i32))
    }

    /// Write the canvas as a plain-text `P3` image.
    ///
    /// Rows run top to bottom and columns left to right; each channel is
    /// scaled by `max_intensity` and truncated toward zero.
    pub fn write_ppm<W: Write>(&self, out: &mut W, max_intensity: u32) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.viewport.x_res, self.viewport.y_res)?;
        writeln!(out, "{max_intensity}")?;
        for color in &self.color_buffer {
            let [r, g, b] = colors::quantize(*color, max_intensity);
            writeln!(out, "{r} {g} {b}")?;
        }
        Ok(())
    }

    /// Convert to an 8-bit RGB image.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.viewport.x_res, self.viewport.y_res, |x, y| {
            let idx = y as usize * self.viewport.x_res as usize + x as usize;
            let [r, g, b] = colors::quantize(self.color_buffer[idx], u8::MAX as u32);
            Rgb([r as u8, g as u8, b as u8])
        })
    }

    /// Save the canvas to `path`.
    ///
    /// `.ppm` files are written as plain-text `P3` with `max_intensity`; every
    /// other extension goes through the `image` encoders at 8 bits per channel.
    pub fn save<P: AsRef<Path>>(&self, path: P, max_intensity: u32) -> Result<(), OutputError> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let mut out = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut out, max_intensity)?;
            out.flush()?;
        } else {
            self.to_image().save(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_segment_keeps_inside_and_rejects_outside() {
        let viewport = Viewport::ndc(10, 10);
        let inside = ((-0.5, 0.2), (0.3, -0.4));
        assert_eq!(viewport.clip_segment(inside.0, inside.1), Some(inside));

        assert_eq!(viewport.clip_segment((1.5, 0.0), (3.0, 0.5)), None);
        assert_eq!(viewport.clip_segment((-2.0, 1.5), (2.0, 1.5)), None);
        assert_eq!(viewport.clip_segment((f32::NAN, 0.0), (0.0, 0.0)), None);
    }

    #[test]
    fn clip_segment_snaps_far_endpoints_to_the_boundary() {
        let viewport = Viewport::ndc(10, 10);
        assert_eq!(
            viewport.clip_segment((-1e30, 0.05), (1e30, 0.05)),
            Some(((-1.0, 0.05), (1.0, 0.05)))
        );
        assert_eq!(
            viewport.clip_segment((0.0, 0.0), (0.0, -1e6)),
            Some(((0.0, 0.0), (0.0, -1.0)))
        );
        let (start, end) = viewport
            .clip_segment((-1e6, -1e6), (1e6, 1e6))
            .expect("diagonal crosses the domain");
        assert_eq!(start, (-1.0, -1.0));
        assert_eq!(end, (1.0, 1.0));
    }

    #[test]
    fn maps_ndc_to_pixels_with_flipped_rows() {
        let viewport = Viewport::ndc(10, 10);
        assert_eq!(viewport.map_x(-1.0), 0);
        assert_eq!(viewport.map_x(0.0), 5);
        assert_eq!(viewport.map_x(0.99), 9);
        assert_eq!(viewport.map_x(1.0), 10);
        assert_eq!(viewport.map_y(1.0), 0);
        assert_eq!(viewport.map_y(-0.99), 9);
        assert_eq!(viewport.map_y(-0.5), 7);
        assert_eq!(viewport.map_x(-1.5), -3);
    }

    #[test]
    fn starts_black_with_infinite_depth() {
        let canvas = Canvas::new(Viewport::ndc(4, 3));
        assert_eq!(canvas.get_pixel(3, 2), Some(BLACK));
        assert_eq!(canvas.get_depth(0, 0), Some(f32::INFINITY));
        assert_eq!(canvas.lit_pixels().count(), 0);
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut canvas = Canvas::new(Viewport::ndc(4, 4));
        canvas.set_pixel(-1, 0, Vec3::ONE);
        canvas.set_pixel(4, 0, Vec3::ONE);
        canvas.set_pixel_with_depth(0, 4, 0.0, Vec3::ONE);

        assert_eq!(canvas.lit_pixels().count(), 0);
        assert_eq!(canvas.get_pixel(4, 0), None);
        assert_eq!(canvas.stats().clipped, 3);
        assert_eq!(canvas.stats().written, 0);
    }

    #[test]
    fn colors_are_clamped() {
        let mut canvas = Canvas::new(Viewport::ndc(2, 2));
        canvas.set_pixel(1, 1, Vec3::new(2.0, -1.0, 0.5));
        assert_eq!(canvas.get_pixel(1, 1), Some(Vec3::new(1.0, 0.0, 0.5)));
    }

    #[test]
    fn depth_test_keeps_closest() {
        let mut canvas = Canvas::new(Viewport::ndc(2, 2));
        assert!(canvas.set_pixel_with_depth(0, 0, 0.5, Vec3::new(1.0, 0.0, 0.0)));
        assert!(!canvas.set_pixel_with_depth(0, 0, 0.7, Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(canvas.get_pixel(0, 0), Some(Vec3::new(1.0, 0.0, 0.0)));

        // Equal depth is not "greater", so it passes.
        assert!(canvas.set_pixel_with_depth(0, 0, 0.5, Vec3::new(0.0, 0.0, 1.0)));
        assert!(canvas.set_pixel_with_depth(0, 0, -0.2, Vec3::ONE));
        assert_eq!(canvas.get_depth(0, 0), Some(-0.2));
        assert_eq!(canvas.stats().depth_rejected, 1);
    }

    #[test]
    fn canvas_without_depth_always_writes() {
        let mut canvas = Canvas::without_depth(Viewport::ndc(2, 2));
        assert!(canvas.set_pixel_with_depth(0, 0, 0.1, Vec3::new(1.0, 0.0, 0.0)));
        assert!(canvas.set_pixel_with_depth(0, 0, 0.9, Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(canvas.get_pixel(0, 0), Some(Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(canvas.get_depth(0, 0), None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut canvas = Canvas::new(Viewport::ndc(2, 2));
        canvas.set_pixel_with_depth(1, 0, 0.3, Vec3::ONE);
        canvas.clear();
        assert_eq!(canvas.get_pixel(1, 0), Some(BLACK));
        assert_eq!(canvas.get_depth(1, 0), Some(f32::INFINITY));
        assert_eq!(canvas.stats(), WriteStats::default());
    }

    #[test]
    fn writes_plain_ppm() {
        let mut canvas = Canvas::new(Viewport::ndc(2, 2));
        canvas.set_pixel(1, 0, Vec3::new(1.0, 0.5, 0.0));
        canvas.set_pixel(0, 1, Vec3::ONE);

        let mut out = Vec::new();
        canvas.write_ppm(&mut out, 255).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "P3\n2 2\n255\n0 0 0\n255 127 0\n255 255 255\n0 0 0\n");
    }

    #[test]
    fn converts_to_rgb_image() {
        let mut canvas = Canvas::new(Viewport::ndc(3, 2));
        canvas.set_pixel(2, 1, Vec3::new(0.0, 1.0, 0.0));
        let image = canvas.to_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1), &Rgb([0, 255, 0]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn saves_ppm_by_extension() {
        let mut canvas = Canvas::new(Viewport::ndc(1, 1));
        canvas.set_pixel(0, 0, Vec3::ONE);
        let path = std::env::temp_dir().join(format!("softshade-canvas-{}.ppm", std::process::id()));
        canvas.save(&path, 15).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(text, "P3\n1 1\n15\n15 15 15\n");
    }
}
