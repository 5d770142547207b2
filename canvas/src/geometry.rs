//! Oriented-rectangle geometry for object footprints.
//!
//! World axes follow the scene capture layout: world `x` grows *down* the
//! canvas and world `y` grows *right*. At orientation 0 an object's `size.x`
//! spans world `y` (its on-canvas width) and `size.y` spans world `x` (its
//! on-canvas depth). Positive orientation turns the footprint clockwise on
//! screen, which is a rotation by `-θ` in world terms.
//!
//! Everything here is a pure numeric function. Degenerate sizes are not
//! rejected; callers validate upstream.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

/// A point in either canvas-pixel or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Four corners of an object footprint plus its facing marker.
///
/// Corner order is fixed: the edge from `corners[0]` to `corners[3]` is the
/// front edge, and `reference` is its midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub corners: [Point; 4],
    pub reference: Point,
}

impl OrientedRect {
    /// Mean of the four corners.
    #[must_use]
    pub fn centroid(&self) -> Point {
        let sx: f64 = self.corners.iter().map(|c| c.x).sum();
        let sy: f64 = self.corners.iter().map(|c| c.y).sum();
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Whether `pt` lies inside or on the boundary of the footprint.
    ///
    /// The footprint is convex, so the point is inside when it sits on the
    /// same side of all four edges.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        let mut saw_pos = false;
        let mut saw_neg = false;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            let cross = (b.x - a.x) * (pt.y - a.y) - (b.y - a.y) * (pt.x - a.x);
            if cross > 0.0 {
                saw_pos = true;
            } else if cross < 0.0 {
                saw_neg = true;
            }
            if saw_pos && saw_neg {
                return false;
            }
        }
        true
    }
}

/// Compute the footprint of an object centred at `center` with local extents
/// `size_x` / `size_y` and `orientation_deg` degrees of clockwise turn.
#[must_use]
pub fn oriented_rect(center: Point, size_x: f64, size_y: f64, orientation_deg: f64) -> OrientedRect {
    let rad = orientation_deg.to_radians();
    let cs = (-rad).cos();
    let sn = (-rad).sin();

    // Half-depth and half-width offsets, projected onto world x / y.
    let depth_x = (size_y / 2.0) * cs;
    let depth_y = (size_y / 2.0) * sn;
    let width_x = (size_x / 2.0) * sn;
    let width_y = (-size_x / 2.0) * cs;

    let corners = [
        Point::new(center.x - depth_x - width_x, center.y - depth_y - width_y),
        Point::new(center.x + depth_x - width_x, center.y + depth_y - width_y),
        Point::new(center.x + depth_x + width_x, center.y + depth_y + width_y),
        Point::new(center.x - depth_x + width_x, center.y - depth_y + width_y),
    ];
    let reference = corners[0].midpoint(corners[3]);

    OrientedRect { corners, reference }
}

/// Orientation (degrees in `[0, 360)`) that turns an object at `center` so its
/// front edge faces `toward`.
///
/// Absolute, not incremental: the same pointer always yields the same angle.
#[must_use]
pub fn facing_angle_deg(center: Point, toward: Point) -> f64 {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    // At θ the front marker sits in direction (-cos θ, sin θ) from the centre.
    normalize_deg(dy.atan2(-dx).to_degrees())
}

/// Wrap an angle into `[0, 360)`.
#[must_use]
pub fn normalize_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
