//! Pose rules for each action type.
//!
//! PUT_IN / PUT_ON / OPEN / CLOSE are deterministic functions of the moving
//! object and its reference. PUT_NEAR and MOVE follow the pointer; ROTATE
//! follows the pointer's bearing from the object's centre.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use crate::consts::{LID_ASIDE_X_FACTOR, LID_ASIDE_Y_FACTOR};
use crate::geometry::{Point, facing_angle_deg};
use crate::interaction::DragAnchor;
use crate::scene::{SceneObject, Vec3};
use crate::transform::CanvasTransform;

/// A resulting object pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: f64,
}

/// Stack `moving` centred on top of `support`. Orientation resets to 0.
#[must_use]
pub fn put_on(moving: &SceneObject, support: &SceneObject) -> Pose {
    Pose {
        position: Vec3::new(support.position.x, support.position.y, support.top() + moving.size.z / 2.0),
        orientation: 0.0,
    }
}

/// Nest `moving` on the floor of `container`. Orientation resets to 0.
#[must_use]
pub fn put_in(moving: &SceneObject, container: &SceneObject) -> Pose {
    Pose {
        position: Vec3::new(container.position.x, container.position.y, container.bottom() + moving.size.z / 2.0),
        orientation: 0.0,
    }
}

/// Seat `lid` on top of `container`, keeping the lid's orientation.
#[must_use]
pub fn close_lid(lid: &SceneObject, container: &SceneObject) -> Pose {
    Pose {
        position: Vec3::new(container.position.x, container.position.y, container.top() + lid.size.z / 2.0),
        orientation: lid.orientation,
    }
}

/// Set `lid` aside next to `container` at table height, keeping its orientation.
#[must_use]
pub fn open_lid(lid: &SceneObject, container: &SceneObject) -> Pose {
    Pose {
        position: Vec3::new(
            container.position.x - container.size.y * LID_ASIDE_X_FACTOR,
            container.position.y - container.size.x * LID_ASIDE_Y_FACTOR,
            container.bottom() + lid.size.z / 2.0,
        ),
        orientation: lid.orientation,
    }
}

/// Object centre for a PUT_NEAR drag.
///
/// The pointer's displacement from `anchor.start_px` is applied along the
/// single world axis with the larger displacement; the other axis stays at
/// its drag-start value. Only the moving axis is clamped to the world
/// rectangle; the pinned axis keeps its start value even when outside it.
#[must_use]
pub fn constrained_drag(anchor: &DragAnchor, pointer_px: Point, transform: &CanvasTransform) -> Point {
    let start = transform.to_world(anchor.start_px);
    let now = transform.to_world(pointer_px);
    let dx = now.x - start.x;
    let dy = now.y - start.y;

    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return anchor.origin;
    }
    let world = transform.world();
    if dx.abs() > dy.abs() {
        let x = world.clamp(Point::new(anchor.origin.x + dx, anchor.origin.y)).x;
        Point::new(x, anchor.origin.y)
    } else {
        let y = world.clamp(Point::new(anchor.origin.x, anchor.origin.y + dy)).y;
        Point::new(anchor.origin.x, y)
    }
}

/// Object centre for a free MOVE drag, clamped to the world rectangle.
#[must_use]
pub fn free_drag(anchor: &DragAnchor, pointer_px: Point, transform: &CanvasTransform) -> Point {
    let start = transform.to_world(anchor.start_px);
    let now = transform.to_world(pointer_px);
    transform
        .world()
        .clamp(Point::new(anchor.origin.x + (now.x - start.x), anchor.origin.y + (now.y - start.y)))
}

/// Orientation for a ROTATE preview: face the pointer from the fixed centre.
#[must_use]
pub fn rotate_toward(object: &SceneObject, pointer_px: Point, transform: &CanvasTransform) -> f64 {
    facing_angle_deg(object.position.xy(), transform.to_world(pointer_px))
}
