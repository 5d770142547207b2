//! Scene model: tabletop objects, their categories, and the in-memory scene.
//!
//! This module defines what is on the table (`SceneObject`, `Category`), the
//! static container-to-lid mapping supplied alongside each scene (`LidMap`),
//! and the runtime `Scene` that owns every live object for the loaded scene.
//!
//! Data flows into this layer from the scene provider (JSON deserialization)
//! and from the interaction state machine, which is the only writer of poses.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PreconditionViolation;
use crate::geometry::{OrientedRect, Point, oriented_rect};

/// Unique, stable identifier for a scene object (e.g. `"container_07"`).
pub type ObjectId = String;

/// Coarse semantic class of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Bowl-like object that can hold items and may have a mapped lid.
    #[serde(alias = "bowl")]
    Container,
    /// Flat surface other objects can be stacked on.
    Support,
    /// Lid that seats on its mapped container.
    #[serde(alias = "lid-bearing")]
    Lid,
    /// Open basket.
    Basket,
    /// Ordinary movable item.
    Item,
    /// Fixed base plate.
    Base,
    /// Anything the provider did not classify.
    #[serde(other)]
    Unclassified,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Support => "support",
            Self::Lid => "lid",
            Self::Basket => "basket",
            Self::Item => "item",
            Self::Base => "base",
            Self::Unclassified => "unclassified",
        }
    }
}

/// A 3-vector, serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal projection.
    #[must_use]
    pub fn xy(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self { x: v[0], y: v[1], z: v[2] }
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// A rigid tabletop object as supplied by the scene provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique identifier for this object.
    pub id: ObjectId,
    /// Free-text kind, e.g. `"bowl"`.
    pub name: String,
    /// Semantic class; drives placement preconditions and colour.
    #[serde(default = "default_category")]
    pub category: Category,
    /// Centre in world units.
    pub position: Vec3,
    /// Clockwise turn in degrees.
    #[serde(default)]
    pub orientation: f64,
    /// Extents in the object's own frame.
    pub size: Vec3,
    /// Provider hint for openable objects.
    #[serde(default, rename = "isOpen", skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
}

fn default_category() -> Category {
    Category::Unclassified
}

impl SceneObject {
    /// Oriented footprint in world coordinates.
    #[must_use]
    pub fn footprint(&self) -> OrientedRect {
        oriented_rect(self.position.xy(), self.size.x, self.size.y, self.orientation)
    }

    /// Height of the top face.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.position.z + self.size.z / 2.0
    }

    /// Height of the bottom face.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.position.z - self.size.z / 2.0
    }
}

/// Static mapping from container id to the id of its lid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LidMap(BTreeMap<ObjectId, ObjectId>);

impl LidMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, container: impl Into<ObjectId>, lid: impl Into<ObjectId>) {
        self.0.insert(container.into(), lid.into());
    }

    /// Lid mapped to `container`, if any.
    #[must_use]
    pub fn lid_for(&self, container: &str) -> Option<&ObjectId> {
        self.0.get(container)
    }

    /// Container whose mapped lid is `lid`, if any.
    #[must_use]
    pub fn container_for(&self, lid: &str) -> Option<&ObjectId> {
        self.0.iter().find(|(_, l)| l.as_str() == lid).map(|(c, _)| c)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C: Into<ObjectId>, L: Into<ObjectId>> FromIterator<(C, L)> for LidMap {
    fn from_iter<T: IntoIterator<Item = (C, L)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(c, l)| (c.into(), l.into())).collect())
    }
}

/// The loaded scene: every live object plus the scene id and reference image.
///
/// Object order is the provider's order and doubles as draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    scene_id: String,
    image: String,
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Build a scene, rejecting duplicate object ids.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation::DuplicateObjectId`] when two objects share an id.
    pub fn new(
        scene_id: impl Into<String>,
        image: impl Into<String>,
        objects: Vec<SceneObject>,
    ) -> Result<Self, PreconditionViolation> {
        for (i, obj) in objects.iter().enumerate() {
            if objects[..i].iter().any(|o| o.id == obj.id) {
                return Err(PreconditionViolation::DuplicateObjectId(obj.id.clone()));
            }
        }
        Ok(Self { scene_id: scene_id.into(), image: image.into(), objects })
    }

    #[must_use]
    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    /// Handle of the static reference image.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Look up an object or report it as unknown.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation::UnknownObject`] when `id` is not in the scene.
    pub fn require(&self, id: &str) -> Result<&SceneObject, PreconditionViolation> {
        self.get(id).ok_or_else(|| PreconditionViolation::UnknownObject(id.to_owned()))
    }

    /// Replace an object's pose. Returns false if the object doesn't exist.
    pub fn set_pose(&mut self, id: &str, position: Vec3, orientation: f64) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        obj.position = position;
        obj.orientation = orientation;
        true
    }

    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
