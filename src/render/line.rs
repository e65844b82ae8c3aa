//! Bresenham line rasterization for wireframe rendering.
//!
//! [`BresenhamLine`] walks the 8-connected pixel approximation of a segment
//! using integer-only error accumulation. It iterates along the major axis
//! (whichever of |dx|, |dy| is larger) and steps the minor axis whenever the
//! accumulated error crosses zero, so exactly one pixel is produced per major
//! step and both endpoints are included.

use super::canvas::Canvas;
use crate::colors::WHITE;

/// Iterator over the pixels of a line segment, endpoints included.
#[derive(Debug, Clone)]
pub struct BresenhamLine {
    x: i32,
    y: i32,
    // Per-step increments along the major axis and the minor axis.
    major_step: (i32, i32),
    minor_step: (i32, i32),
    d_major: i64,
    d_minor: i64,
    error: i64,
    remaining: u64,
}

impl BresenhamLine {
    pub fn new(from: (i32, i32), to: (i32, i32)) -> Self {
        let dx = to.0 as i64 - from.0 as i64;
        let dy = to.1 as i64 - from.1 as i64;
        let sx = if dx < 0 { -1 } else { 1 };
        let sy = if dy < 0 { -1 } else { 1 };

        let (major_step, minor_step, d_major, d_minor) = if dx.abs() >= dy.abs() {
            ((sx, 0), (0, sy), dx.abs(), dy.abs())
        } else {
            ((0, sy), (sx, 0), dy.abs(), dx.abs())
        };

        Self {
            x: from.0,
            y: from.1,
            major_step,
            minor_step,
            d_major,
            d_minor,
            error: 2 * d_minor - d_major,
            // Up to 2^32 steps when the endpoints span the whole i32 range.
            remaining: d_major as u64 + 1,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = (self.x, self.y);
        if self.remaining == 0 {
            return Some(current);
        }

        if self.error > 0 {
            self.x += self.minor_step.0;
            self.y += self.minor_step.1;
            self.error -= 2 * self.d_major;
        }
        self.error += 2 * self.d_minor;
        self.x += self.major_step.0;
        self.y += self.major_step.1;

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for BresenhamLine {}

impl Canvas {
    /// Draws a white line between two continuous-space points.
    ///
    /// Endpoints are put in a canonical order, clipped to the viewport domain
    /// and then mapped to pixels, so drawing a→b and b→a lights the same
    /// pixels and the walk never leaves the canvas by more than one pixel. No
    /// depth test is performed. Returns the number of pixels visited.
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32)) -> usize {
        let (from, to) = if from.0 < to.0 || (from.0 == to.0 && from.1 <= to.1) {
            (from, to)
        } else {
            (to, from)
        };
        let viewport = self.viewport();
        let Some((from, to)) = viewport.clip_segment(from, to) else {
            return 0;
        };
        let start = (viewport.map_x(from.0), viewport.map_y(from.1));
        let end = (viewport.map_x(to.0), viewport.map_y(to.1));

        let line = BresenhamLine::new(start, end);
        let steps = line.len();
        for (x, y) in line {
            self.set_pixel(x, y, WHITE);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::Viewport;
    use std::collections::BTreeSet;

    fn pixels(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
        BresenhamLine::new(from, to).collect()
    }

    #[test]
    fn coincident_endpoints_draw_one_pixel() {
        assert_eq!(pixels((3, 4), (3, 4)), vec![(3, 4)]);
    }

    #[test]
    fn shallow_line_steps_once_per_column() {
        assert_eq!(
            pixels((0, 0), (5, 2)),
            vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2), (5, 2)]
        );
    }

    #[test]
    fn steep_line_steps_once_per_row() {
        let line = pixels((0, 0), (2, 5));
        assert_eq!(line.len(), 6);
        for (i, (_, y)) in line.iter().enumerate() {
            assert_eq!(*y, i as i32);
        }
        assert_eq!(line.last(), Some(&(2, 5)));
    }

    #[test]
    fn handles_every_octant() {
        let targets = [
            (6, 2),
            (2, 6),
            (-2, 6),
            (-6, 2),
            (-6, -2),
            (-2, -6),
            (2, -6),
            (6, -2),
        ];
        for to in targets {
            let line = pixels((0, 0), to);
            assert_eq!(line.len(), 7, "line to {to:?}");
            assert_eq!(line.first(), Some(&(0, 0)));
            assert_eq!(line.last(), Some(&to));
            // 8-connected: consecutive pixels are neighbours.
            for pair in line.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
            }
        }
    }

    #[test]
    fn diagonal_has_no_double_width() {
        let line = pixels((0, 0), (4, 4));
        assert_eq!(line, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
    }

    #[test]
    fn canvas_line_is_direction_independent() {
        let mut forward = Canvas::new(Viewport::ndc(20, 20));
        let mut backward = Canvas::new(Viewport::ndc(20, 20));
        forward.draw_line((-0.9, -0.3), (0.7, 0.45));
        backward.draw_line((0.7, 0.45), (-0.9, -0.3));

        let a: BTreeSet<_> = forward.lit_pixels().collect();
        let b: BTreeSet<_> = backward.lit_pixels().collect();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn canvas_line_is_white_and_clipped() {
        let mut canvas = Canvas::new(Viewport::ndc(10, 10));
        let visited = canvas.draw_line((-2.0, 0.05), (2.0, 0.05));
        // x = 1.0 maps one past the last column.
        assert_eq!(visited, 11);
        assert_eq!(canvas.lit_pixels().count(), 10);
        assert_eq!(canvas.get_pixel(0, 4), Some(WHITE));
        assert_eq!(canvas.stats().clipped, 1);
    }

    #[test]
    fn far_offscreen_segment_walks_only_the_canvas() {
        let mut canvas = Canvas::new(Viewport::ndc(256, 256));
        let visited = canvas.draw_line((-1e6, 0.0), (1e6, 0.0));
        assert!(visited <= 256 + 256, "visited {visited}");
        assert_eq!(canvas.lit_pixels().count(), 256);

        let visited = canvas.draw_line((-1e6, -1e6), (1e6, 1e6));
        assert!(visited <= 256 + 256, "visited {visited}");

        assert_eq!(canvas.draw_line((2.0, -5.0), (2.0, 5.0)), 0);
    }

    #[test]
    fn saturated_endpoints_do_not_overflow() {
        let mut canvas = Canvas::new(Viewport::ndc(10, 10));
        assert_eq!(canvas.draw_line((-1e30, 0.05), (1e30, 0.05)), 11);
        assert_eq!(canvas.lit_pixels().count(), 10);

        let span = BresenhamLine::new((i32::MIN, 0), (i32::MAX, 0));
        assert_eq!(span.size_hint().1, Some(u32::MAX as usize + 1));
    }
}
