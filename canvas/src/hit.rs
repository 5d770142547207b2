#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::Point;
use crate::scene::{ObjectId, Scene, SceneObject};
use crate::transform::CanvasTransform;

/// Find the object whose footprint contains the canvas pixel `pixel_pt`.
///
/// Overlapping footprints resolve to the highest centre `z`; ties go to the
/// object drawn last (later in scene order).
#[must_use]
pub fn hit_test(pixel_pt: Point, scene: &Scene, transform: &CanvasTransform) -> Option<ObjectId> {
    let world_pt = transform.to_world(pixel_pt);
    scene
        .objects()
        .iter()
        .filter(|o| o.footprint().contains(world_pt))
        .fold(None, |best: Option<&SceneObject>, o| match best {
            Some(b) if b.position.z > o.position.z => Some(b),
            _ => Some(o),
        })
        .map(|o| o.id.clone())
}
