//! World/pixel coordinate transform.
//!
//! The world rectangle is static and maps onto the canvas with one uniform
//! scale, inset by the axis padding band: world x runs down the canvas, world
//! y runs right. Points outside the rectangle still map; they are only
//! clipped when drawn.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::consts::{AXIS_PADDING_PX, WORLD_X_MAX, WORLD_X_MIN, WORLD_Y_MAX, WORLD_Y_MIN};
use crate::geometry::Point;

/// Static world region shown on the canvas.
///
/// World `x` maps to the canvas vertical axis, world `y` to the horizontal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for WorldRect {
    fn default() -> Self {
        Self { x_min: WORLD_X_MIN, x_max: WORLD_X_MAX, y_min: WORLD_Y_MIN, y_max: WORLD_Y_MAX }
    }
}

impl WorldRect {
    /// Extent along world x (canvas vertical).
    #[must_use]
    pub fn x_range(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Extent along world y (canvas horizontal).
    #[must_use]
    pub fn y_range(&self) -> f64 {
        self.y_max - self.y_min
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.x_min + self.x_max) * 0.5, (self.y_min + self.y_max) * 0.5)
    }

    /// Clamp a world point into the rectangle.
    #[must_use]
    pub fn clamp(&self, pt: Point) -> Point {
        Point::new(pt.x.clamp(self.x_min, self.x_max), pt.y.clamp(self.y_min, self.y_max))
    }

    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        (self.x_min..=self.x_max).contains(&pt.x) && (self.y_min..=self.y_max).contains(&pt.y)
    }
}

/// Which world axis a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// World x, drawn down the left edge.
    X,
    /// World y, drawn along the bottom edge.
    Y,
}

/// A labelled axis tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// World-space value at the tick.
    pub value: f64,
    /// Canvas-pixel position of the tick along its axis.
    pub pixel: f64,
}

/// Uniform-scale mapping between world coordinates and canvas pixels.
///
/// One scale factor (the smaller of the two axis fits) keeps the aspect ratio;
/// the axis with slack is centred inside the padded plot area. Recompute with
/// [`CanvasTransform::resize`] whenever the viewport changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    world: WorldRect,
    padding: f64,
    width: f64,
    height: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::new(WorldRect::default(), AXIS_PADDING_PX)
    }
}

impl CanvasTransform {
    /// Create a transform with an empty viewport. Call [`Self::resize`] before use.
    #[must_use]
    pub fn new(world: WorldRect, padding: f64) -> Self {
        Self { world, padding, width: 0.0, height: 0.0, scale: 0.0, offset_x: padding, offset_y: padding }
    }

    /// Recompute scale and centring offsets for a `width` x `height` CSS-pixel viewport.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;

        let plot_w = (width - 2.0 * self.padding).max(0.0);
        let plot_h = (height - 2.0 * self.padding).max(0.0);
        let range_h = self.world.y_range();
        let range_v = self.world.x_range();

        self.scale = if range_h > 0.0 && range_v > 0.0 { (plot_w / range_h).min(plot_h / range_v) } else { 0.0 };
        self.offset_x = self.padding + (plot_w - range_h * self.scale) / 2.0;
        self.offset_y = self.padding + (plot_h - range_v * self.scale) / 2.0;
    }

    /// World point to canvas pixel.
    #[must_use]
    pub fn to_canvas(&self, world: Point) -> Point {
        Point {
            x: self.offset_x + (world.y - self.world.y_min) * self.scale,
            y: self.offset_y + (world.x - self.world.x_min) * self.scale,
        }
    }

    /// Canvas pixel to world point.
    ///
    /// Before the first non-degenerate resize every pixel maps to the world centre.
    #[must_use]
    pub fn to_world(&self, pixel: Point) -> Point {
        if self.scale <= 0.0 {
            return self.world.center();
        }
        Point {
            x: self.world.x_min + (pixel.y - self.offset_y) / self.scale,
            y: self.world.y_min + (pixel.x - self.offset_x) / self.scale,
        }
    }

    /// World length to pixel length.
    #[must_use]
    pub fn world_len_to_px(&self, len: f64) -> f64 {
        len * self.scale
    }

    /// `count` evenly spaced ticks spanning `axis` of the world rectangle.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn ticks(&self, axis: Axis, count: usize) -> Vec<Tick> {
        let (min, max) = match axis {
            Axis::X => (self.world.x_min, self.world.x_max),
            Axis::Y => (self.world.y_min, self.world.y_max),
        };
        if count < 2 {
            return Vec::new();
        }
        let step = (max - min) / (count - 1) as f64;
        (0..count)
            .map(|i| {
                let value = min + step * i as f64;
                let pixel = match axis {
                    Axis::X => self.offset_y + (value - self.world.x_min) * self.scale,
                    Axis::Y => self.offset_x + (value - self.world.y_min) * self.scale,
                };
                Tick { value, pixel }
            })
            .collect()
    }

    #[must_use]
    pub fn world(&self) -> WorldRect {
        self.world
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Top-left pixel of the drawn world rectangle.
    #[must_use]
    pub fn origin_px(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }
}
