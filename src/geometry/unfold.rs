// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar unfolding of triangles into 2D edge frames
//!
//! Every edge gets a local frame: its first vertex at the origin, its second
//! vertex at `(length, 0)`. Triangles are laid out from intrinsic edge lengths
//! only, so no 3D rotation error accumulates along a chain of unfoldings.

use nalgebra::{Point2, Vector2};

/// Apex of a triangle built on the base `(0,0)-(base,0)` with the given side
/// lengths from the base start and base end. The apex is returned with `y >= 0`.
pub fn place_apex(base: f64, from_start: f64, from_end: f64) -> Point2<f64> {
    let x = (from_start * from_start - from_end * from_end + base * base) / (2.0 * base);
    let y_sq = from_start * from_start - x * x;
    Point2::new(x, if y_sq > 0.0 { y_sq.sqrt() } else { 0.0 })
}

/// 2D cross product (z component)
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Local frame of a segment expressed in some parent 2D layout
#[derive(Debug, Clone, Copy)]
pub struct EdgeFrame {
    origin: Point2<f64>,
    axis: Vector2<f64>,
    /// +1 or -1 so that the reference side maps to positive y
    side: f64,
}

impl EdgeFrame {
    /// Frame with `start` at the origin, `end` on the positive x axis and
    /// `side_point` on the non-negative y side
    pub fn new(start: Point2<f64>, end: Point2<f64>, side_point: Point2<f64>) -> Self {
        let d = end - start;
        let len = d.norm();
        let axis = if len > 0.0 { d / len } else { Vector2::x() };
        let side = if cross(&axis, &(side_point - start)) < 0.0 {
            -1.0
        } else {
            1.0
        };
        Self {
            origin: start,
            axis,
            side,
        }
    }

    /// Express a parent-layout point in this frame
    pub fn to_local(&self, p: Point2<f64>) -> Point2<f64> {
        let r = p - self.origin;
        Point2::new(r.dot(&self.axis), self.side * cross(&self.axis, &r))
    }
}

/// Where the segment from `source` (with `source.y >= 0`) to `p` (with
/// `p.y <= 0`) crosses the x axis.
pub fn axis_crossing(source: &Point2<f64>, p: &Point2<f64>) -> f64 {
    if p.y >= 0.0 {
        return p.x;
    }
    let denom = source.y - p.y;
    if denom <= 0.0 {
        return source.x;
    }
    source.x + (p.x - source.x) * source.y / denom
}

/// Parameter `u` in `[0, 1]` along `start -> end` where the line from
/// `source` through `(x, 0)` meets the segment.
pub fn ray_segment_parameter(
    source: &Point2<f64>,
    x: f64,
    start: &Point2<f64>,
    end: &Point2<f64>,
) -> f64 {
    let dir = Vector2::new(x - source.x, -source.y);
    let seg = end - start;
    let denom = cross(&seg, &dir);
    if denom.abs() <= f64::EPSILON * seg.norm() * dir.norm() {
        return 0.0;
    }
    (cross(&(source - start), &dir) / denom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_place_apex_right_triangle() {
        let apex = place_apex(1.0, 1.0, 2f64.sqrt());
        assert_relative_eq!(apex.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(apex.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_place_apex_degenerate_is_on_axis() {
        let apex = place_apex(2.0, 1.0, 1.0);
        assert_relative_eq!(apex.x, 1.0, epsilon = 1e-12);
        assert_eq!(apex.y, 0.0);
    }

    #[test]
    fn test_frame_orientation() {
        let frame = EdgeFrame::new(
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(0.0, 2.0),
        );
        let local = frame.to_local(Point2::new(0.0, 2.0));
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(local.y, 1.0, epsilon = 1e-12);

        let other_side = frame.to_local(Point2::new(2.0, 2.0));
        assert_relative_eq!(other_side.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_crossing() {
        let source = Point2::new(0.0, 1.0);
        assert_relative_eq!(axis_crossing(&source, &Point2::new(2.0, -1.0)), 1.0);
        assert_relative_eq!(axis_crossing(&source, &Point2::new(3.0, 0.0)), 3.0);
    }

    #[test]
    fn test_ray_segment_parameter() {
        let source = Point2::new(0.0, 1.0);
        // Ray through (1,0) continues to (2,-1), the middle of the segment
        let u = ray_segment_parameter(
            &source,
            1.0,
            &Point2::new(0.0, -1.0),
            &Point2::new(4.0, -1.0),
        );
        assert_relative_eq!(u, 0.5, epsilon = 1e-12);
    }
}
