//! Symbolic scene relations: `on`, `in` and `closed`.
//!
//! DESIGN
//! ======
//! Relations are asserted by the actions that produced the current poses, not
//! derived from geometry: a lid that happens to rest on a bowl is only
//! `closed` if a CLOSE put it there. [`RelationSet::apply`] is the single
//! update rule and runs after every pose change the state machine makes.
//! It is idempotent for a repeated `(object, action, context)` triple, so
//! live previews may call it on every pointer move.

#[cfg(test)]
#[path = "relations_test.rs"]
mod relations_test;

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::interaction::ActionType;
use crate::scene::{LidMap, ObjectId};

/// `object` rests on / is enclosed by `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(rename = "obj1")]
    pub object: ObjectId,
    #[serde(rename = "obj2")]
    pub anchor: ObjectId,
}

impl Placement {
    #[must_use]
    pub fn new(object: impl Into<ObjectId>, anchor: impl Into<ObjectId>) -> Self {
        Self { object: object.into(), anchor: anchor.into() }
    }
}

/// `container` has its lid seated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
    #[serde(rename = "obj1")]
    pub container: ObjectId,
}

impl Closure {
    #[must_use]
    pub fn new(container: impl Into<ObjectId>) -> Self {
        Self { container: container.into() }
    }
}

/// The relation kind an object currently participates in as the moving member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    On,
    In,
}

/// All asserted relations for the loaded scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSet {
    #[serde(default)]
    pub on: Vec<Placement>,
    #[serde(default, rename = "in")]
    pub inside: Vec<Placement>,
    #[serde(default)]
    pub closed: Vec<Closure>,
}

impl RelationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `container` is currently closed.
    #[must_use]
    pub fn is_closed(&self, container: &str) -> bool {
        self.closed.iter().any(|c| c.container == container)
    }

    /// The relation `object` currently holds as the moving member, if any.
    #[must_use]
    pub fn placement_of(&self, object: &str) -> Option<(PlacementKind, &ObjectId)> {
        if let Some(p) = self.on.iter().find(|p| p.object == object) {
            return Some((PlacementKind::On, &p.anchor));
        }
        self.inside.iter().find(|p| p.object == object).map(|p| (PlacementKind::In, &p.anchor))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on.is_empty() && self.inside.is_empty() && self.closed.is_empty()
    }

    /// Update relations after `moved` changed pose through `action`.
    ///
    /// `context` is the reference object for PUT_* and the container for
    /// OPEN/CLOSE (where `moved` is that container's lid).
    pub fn apply(&mut self, moved: &str, action: ActionType, context: Option<&str>, lids: &LidMap) {
        // The object has left whatever it was on or in.
        self.on.retain(|p| p.object != moved);
        self.inside.retain(|p| p.object != moved);

        // A lid leaving its container opens it, unless this is that very closing.
        if let Some(container) = lids.container_for(moved) {
            let closing_own = action == ActionType::Close && context == Some(container.as_str());
            if !closing_own {
                self.closed.retain(|c| &c.container != container);
            }
        }

        match (action, context) {
            (ActionType::PutOn, Some(anchor)) => self.on.push(Placement::new(moved, anchor)),
            (ActionType::PutIn, Some(anchor)) => self.inside.push(Placement::new(moved, anchor)),
            (ActionType::Close, Some(container)) => {
                if lids.lid_for(container).is_some_and(|lid| lid == moved) {
                    self.closed.push(Closure::new(container));
                    self.on.retain(|p| !(p.object == moved && p.anchor == container));
                }
            }
            (ActionType::Open, Some(container)) => self.closed.retain(|c| c.container != container),
            _ => {}
        }

        self.dedup_closed();
    }

    /// Rewrite provider facts so a mapped lid `on` its own container reads as
    /// that container being `closed`.
    pub fn normalize_closures(&mut self, lids: &LidMap) {
        let mut seated = Vec::new();
        self.on.retain(|p| {
            let is_seated = lids.lid_for(&p.anchor).is_some_and(|lid| *lid == p.object);
            if is_seated {
                seated.push(Closure::new(p.anchor.clone()));
            }
            !is_seated
        });
        self.closed.extend(seated);
        self.dedup_closed();
    }

    /// Check the structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut seen: Vec<&str> = Vec::new();
        for p in self.on.iter().chain(self.inside.iter()) {
            if seen.contains(&p.object.as_str()) {
                return Err(InvariantViolation::MultiplePlacements(p.object.clone()));
            }
            seen.push(&p.object);
        }
        for (i, c) in self.closed.iter().enumerate() {
            if self.closed[..i].iter().any(|o| o.container == c.container) {
                return Err(InvariantViolation::DuplicateClosed(c.container.clone()));
            }
        }
        Ok(())
    }

    fn dedup_closed(&mut self) {
        let mut kept: Vec<Closure> = Vec::with_capacity(self.closed.len());
        for c in self.closed.drain(..) {
            if !kept.iter().any(|k| k.container == c.container) {
                kept.push(c);
            }
        }
        self.closed = kept;
    }
}
