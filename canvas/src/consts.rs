//! Shared numeric constants for the canvas crate.

// ── World rectangle ─────────────────────────────────────────────

/// Lower bound of world x (grows down the canvas), in metres.
pub const WORLD_X_MIN: f64 = 0.0;

/// Upper bound of world x.
pub const WORLD_X_MAX: f64 = 0.5;

/// Lower bound of world y (grows right across the canvas), in metres.
pub const WORLD_Y_MIN: f64 = -0.7;

/// Upper bound of world y.
pub const WORLD_Y_MAX: f64 = 0.3;

// ── Canvas layout ───────────────────────────────────────────────

/// Padding band around the plot area reserved for axes, in CSS pixels.
pub const AXIS_PADDING_PX: f64 = 50.0;

/// Number of labelled ticks per axis.
pub const TICK_COUNT: usize = 5;

/// Length of an axis tick mark, in CSS pixels.
pub const TICK_LENGTH_PX: f64 = 5.0;

// ── Placement ───────────────────────────────────────────────────

/// Opened lid is set aside along world x by this fraction of the container's `size.y`.
pub const LID_ASIDE_X_FACTOR: f64 = 0.7;

/// Opened lid is set aside along world y by this fraction of the container's `size.x`.
pub const LID_ASIDE_Y_FACTOR: f64 = 0.3;

// ── Rendering ───────────────────────────────────────────────────

/// Radius of the facing-direction marker, in CSS pixels.
pub const REFERENCE_DOT_RADIUS_PX: f64 = 3.0;

/// Fill opacity for object footprints.
pub const FOOTPRINT_ALPHA: f64 = 0.5;

// ── Input ───────────────────────────────────────────────────────

/// Pointer travel (CSS pixels) below which a press-release counts as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;
