//! Trajectory log: the append-only record of committed actions.

#[cfg(test)]
#[path = "trajectory_test.rs"]
mod trajectory_test;

use serde::{Deserialize, Serialize};

use crate::interaction::ActionType;
use crate::placement::Pose;
use crate::relations::RelationSet;
use crate::scene::{ObjectId, Vec3};

/// One committed trajectory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Semantic action type.
    #[serde(rename = "type")]
    pub kind: ActionType,
    /// The object whose pose changed (the lid, for OPEN/CLOSE).
    pub object_id: ObjectId,
    /// Reference object for PUT_*; the container for OPEN/CLOSE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<ObjectId>,
    /// Resulting centre.
    pub new_pos: Vec3,
    /// Resulting orientation in degrees.
    pub new_orientation: f64,
}

impl Action {
    #[must_use]
    pub fn new(kind: ActionType, object_id: impl Into<ObjectId>, reference_id: Option<ObjectId>, pose: Pose) -> Self {
        Self {
            kind,
            object_id: object_id.into(),
            reference_id,
            new_pos: pose.position,
            new_orientation: pose.orientation,
        }
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose { position: self.new_pos, orientation: self.new_orientation }
    }
}

/// Body handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub actions: Vec<Action>,
    pub relations: RelationSet,
}

/// Ordered committed actions for the loaded scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    actions: Vec<Action>,
}

impl Trajectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Drop every entry. Only called when a new scene loads.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Full ordered list plus the current relations, ready to persist.
    #[must_use]
    pub fn snapshot_for_save(&self, relations: &RelationSet) -> SavePayload {
        SavePayload { actions: self.actions.clone(), relations: relations.clone() }
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
