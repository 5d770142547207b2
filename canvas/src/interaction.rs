//! Interaction model: action types, the selection state machine, and the
//! transactional step.
//!
//! `ActionType` captures what the annotator chose to do. `InteractionState`
//! is where the state machine stands between clicks, carrying whatever
//! context the next transition needs (chosen target, drag anchor).
//! `InteractionStep` is the at-most-one in-flight action: a structural copy
//! of the scene and relations taken when the step began, plus the
//! provisional action assembled so far.

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::relations::RelationSet;
use crate::scene::{ObjectId, Scene};
use crate::trajectory::Action;

/// Semantic type of a trajectory action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Lift a container's lid and set it aside.
    Open,
    /// Seat a container's lid.
    Close,
    /// Nest the target inside a container.
    PutIn,
    /// Stack the target on a non-container.
    PutOn,
    /// Axis-constrained drag of the target relative to a reference.
    PutNear,
    /// Unconstrained drag.
    Move,
    /// Turn in place to face the pointer.
    Rotate,
}

impl ActionType {
    /// Whether the action needs a second, distinct object.
    #[must_use]
    pub fn needs_reference(self) -> bool {
        matches!(self, Self::PutIn | Self::PutOn | Self::PutNear)
    }

    /// Whether the action is resolved from the target and lid map alone.
    #[must_use]
    pub fn is_lid_toggle(self) -> bool {
        matches!(self, Self::Open | Self::Close)
    }

    /// Wire name, e.g. `PUT_IN`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::PutIn => "PUT_IN",
            Self::PutOn => "PUT_ON",
            Self::PutNear => "PUT_NEAR",
            Self::Move => "MOVE",
            Self::Rotate => "ROTATE",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer context captured at the start of a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    /// Canvas-pixel position of the pointer-down.
    pub start_px: Point,
    /// Object centre (world x/y) at pointer-down.
    pub origin: Point,
}

/// Where the state machine stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    /// No action chosen.
    #[default]
    Idle,
    /// Action chosen; waiting for the object to manipulate.
    SelectTarget,
    /// Target chosen; waiting for the destination or anchor object.
    SelectReference {
        target: ObjectId,
    },
    /// Live drag or rotate preview of `target`.
    Manipulate {
        target: ObjectId,
        /// Anchor object for PUT_NEAR.
        reference: Option<ObjectId>,
        /// Set between pointer-down and pointer-up.
        drag: Option<DragAnchor>,
    },
    /// Deterministic placement applied; waiting for commit or cancel.
    AwaitCommit {
        target: ObjectId,
        reference: Option<ObjectId>,
    },
}

impl InteractionState {
    /// The selected target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&ObjectId> {
        match self {
            Self::SelectReference { target } | Self::Manipulate { target, .. } | Self::AwaitCommit { target, .. } => {
                Some(target)
            }
            Self::Idle | Self::SelectTarget => None,
        }
    }

    /// The selected reference, if any.
    #[must_use]
    pub fn reference(&self) -> Option<&ObjectId> {
        match self {
            Self::Manipulate { reference, .. } | Self::AwaitCommit { reference, .. } => reference.as_ref(),
            _ => None,
        }
    }
}

/// Scene and relations as they were when a step began.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSnapshot {
    pub scene: Scene,
    pub relations: RelationSet,
}

/// The single in-flight action.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionStep {
    /// Restored verbatim on cancel.
    pub snapshot: StepSnapshot,
    /// Provisional action; `None` until the first pose change.
    pub action: Option<Action>,
}

impl InteractionStep {
    #[must_use]
    pub fn begin(scene: &Scene, relations: &RelationSet) -> Self {
        Self { snapshot: StepSnapshot { scene: scene.clone(), relations: relations.clone() }, action: None }
    }
}
