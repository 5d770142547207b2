//! The scene interaction engine.
//!
//! [`EngineCore`] owns the loaded scene, its relations, the chosen action
//! type, the selection state machine, the in-flight step and the trajectory.
//! It is the single writer of all of them. Input handlers return
//! [`Effect`]s for the host; preconditions are checked before any mutation so
//! a rejected transition leaves every piece of state untouched.
//!
//! [`Engine`] wraps the core with the browser canvas element it draws to.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::{AXIS_PADDING_PX, CLICK_SLOP_PX, TICK_COUNT};
use crate::error::{CollaboratorError, EngineError, PreconditionViolation};
use crate::geometry::Point;
use crate::hit;
use crate::interaction::{ActionType, DragAnchor, InteractionState, InteractionStep, StepSnapshot};
use crate::placement::{self, Pose};
use crate::relations::RelationSet;
use crate::render;
use crate::scene::{Category, LidMap, ObjectId, Scene, SceneObject, Vec3};
use crate::trajectory::{Action, SavePayload, Trajectory};
use crate::transform::{CanvasTransform, WorldRect};

/// Effects returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RenderNeeded,
    /// Target or reference changed; refresh any selection chrome.
    SelectionChanged,
    /// A step was appended to the trajectory.
    StepCommitted(Action),
    /// The in-flight step was rolled back.
    StepCancelled,
    SetCursor(String),
}

/// Static engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub world: WorldRect,
    pub axis_padding_px: f64,
    pub tick_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { world: WorldRect::default(), axis_padding_px: AXIS_PADDING_PX, tick_count: TICK_COUNT }
    }
}

/// Scene body as served by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub task_id: String,
    pub objects: Vec<SceneObject>,
}

/// Full data-provider response for one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneBundle {
    pub scene: SceneDocument,
    /// Handle of the static reference image.
    pub image: String,
    #[serde(default)]
    pub lid_map: LidMap,
    #[serde(default)]
    pub relations: RelationSet,
}

/// Identifies one scene load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    scene_id: String,
}

impl LoadTicket {
    #[must_use]
    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }
}

/// Result of delivering a load completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// A newer load was requested after this one; the completion was ignored.
    Superseded,
}

/// Everything the persistence collaborator needs for one save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub scene_id: String,
    pub payload: SavePayload,
}

/// Core engine state. All logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Clone)]
pub struct EngineCore {
    config: EngineConfig,
    transform: CanvasTransform,
    scene: Option<Scene>,
    lids: LidMap,
    relations: RelationSet,
    mode: Option<ActionType>,
    state: InteractionState,
    step: Option<InteractionStep>,
    trajectory: Trajectory,
    latest_load: u64,
    press_px: Option<Point>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            transform: CanvasTransform::new(config.world, config.axis_padding_px),
            scene: None,
            lids: LidMap::new(),
            relations: RelationSet::new(),
            mode: None,
            state: InteractionState::Idle,
            step: None,
            trajectory: Trajectory::new(),
            latest_load: 0,
            press_px: None,
        }
    }

    // --- Scene loading ---

    /// Register a load request. Only the most recently issued ticket may complete.
    pub fn begin_load(&mut self, scene_id: &str) -> LoadTicket {
        self.latest_load += 1;
        debug!(scene_id, ticket = self.latest_load, "scene load requested");
        LoadTicket { seq: self.latest_load, scene_id: scene_id.to_owned() }
    }

    /// Deliver the provider's answer for `ticket`.
    ///
    /// A stale ticket is ignored. A failure leaves the previous scene in place.
    /// Success replaces scene, lid map and relations and resets the trajectory,
    /// selection and any pending step.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when the provider failed or sent
    /// data that can't form a valid scene.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<SceneBundle, CollaboratorError>,
    ) -> Result<LoadOutcome, EngineError> {
        if ticket.seq != self.latest_load {
            info!(scene_id = %ticket.scene_id, ticket = ticket.seq, "superseded scene load ignored");
            return Ok(LoadOutcome::Superseded);
        }
        let bundle =
            result.inspect_err(|e| warn!(scene_id = %ticket.scene_id, error = %e, "scene load failed"))?;
        self.install(bundle)?;
        Ok(LoadOutcome::Loaded)
    }

    /// Load a bundle that is already in hand.
    ///
    /// # Errors
    ///
    /// Same as [`EngineCore::complete_load`].
    pub fn load_scene(&mut self, bundle: SceneBundle) -> Result<(), EngineError> {
        let ticket = self.begin_load(&bundle.scene.task_id);
        self.complete_load(&ticket, Ok(bundle)).map(|_| ())
    }

    fn install(&mut self, bundle: SceneBundle) -> Result<(), CollaboratorError> {
        let SceneBundle { scene, image, lid_map, mut relations } = bundle;
        let scene = Scene::new(scene.task_id, image, scene.objects)
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
        relations.normalize_closures(&lid_map);
        relations.validate().map_err(|e| CollaboratorError::Malformed(e.to_string()))?;

        info!(
            scene_id = scene.scene_id(),
            objects = scene.len(),
            lids = lid_map.len(),
            closed = relations.closed.len(),
            "scene loaded"
        );
        self.scene = Some(scene);
        self.lids = lid_map;
        self.relations = relations;
        self.trajectory.clear();
        self.reset_interaction();
        Ok(())
    }

    // --- Viewport ---

    /// Resize the pixel viewport (CSS pixels).
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Effect> {
        self.transform.resize(width, height);
        vec![Effect::RenderNeeded]
    }

    // --- Action choice ---

    /// Choose the action type and start selecting its target.
    ///
    /// A pending step is dropped without restoring its snapshot.
    pub fn choose_action(&mut self, kind: ActionType) -> Vec<Effect> {
        if self.step.take().is_some() {
            debug!(action = %kind, "pending step dropped by action switch");
        }
        self.mode = Some(kind);
        self.state = InteractionState::SelectTarget;
        self.press_px = None;
        vec![Effect::SelectionChanged, Effect::RenderNeeded]
    }

    // --- Clicks ---

    /// Route a click at canvas pixel `pixel` to the object under it or to
    /// the empty canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Precondition`] when the transition is not allowed.
    pub fn on_click(&mut self, pixel: Point) -> Result<Vec<Effect>, EngineError> {
        let scene = self.loaded()?;
        match hit::hit_test(pixel, scene, &self.transform) {
            Some(id) => self.click_object(&id),
            None => self.click_empty(),
        }
    }

    /// Click on object `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Precondition`] when the transition is not allowed.
    pub fn click_object(&mut self, id: &str) -> Result<Vec<Effect>, EngineError> {
        self.loaded()?.require(id)?;
        let Some(kind) = self.mode else {
            return Err(PreconditionViolation::NoActionChosen.into());
        };
        let result = match &self.state {
            InteractionState::Idle => Err(PreconditionViolation::NoActionChosen),
            InteractionState::SelectTarget => self.select_target(kind, id),
            InteractionState::SelectReference { target } => {
                let target = target.clone();
                self.select_reference(kind, &target, id)
            }
            InteractionState::Manipulate { .. } | InteractionState::AwaitCommit { .. } => Ok(Vec::new()),
        };
        result.map_err(|e| {
            debug!(action = %kind, object_id = id, error = %e, "click rejected");
            e.into()
        })
    }

    /// Click on empty canvas: commit if a step action exists, otherwise clear
    /// the selection and keep the chosen action type.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Precondition`] when no scene is loaded.
    pub fn click_empty(&mut self) -> Result<Vec<Effect>, EngineError> {
        self.loaded()?;
        if self.has_step_action() {
            return self.finish();
        }
        if self.state == InteractionState::Idle {
            return Ok(Vec::new());
        }
        self.step = None;
        self.state = if self.mode.is_some() { InteractionState::SelectTarget } else { InteractionState::Idle };
        Ok(vec![Effect::SelectionChanged, Effect::RenderNeeded])
    }

    fn select_target(&mut self, kind: ActionType, id: &str) -> Result<Vec<Effect>, PreconditionViolation> {
        if kind.is_lid_toggle() {
            return self.toggle_lid(kind, id);
        }
        let step = InteractionStep::begin(self.loaded()?, &self.relations);
        self.step = Some(step);
        self.state = if kind.needs_reference() {
            InteractionState::SelectReference { target: id.to_owned() }
        } else {
            InteractionState::Manipulate { target: id.to_owned(), reference: None, drag: None }
        };
        debug!(action = %kind, target = id, "target selected");
        Ok(vec![Effect::SelectionChanged, Effect::RenderNeeded])
    }

    fn select_reference(
        &mut self,
        kind: ActionType,
        target: &str,
        reference: &str,
    ) -> Result<Vec<Effect>, PreconditionViolation> {
        if target == reference {
            return Err(PreconditionViolation::SameObject { action: kind, target: target.to_owned() });
        }
        let scene = self.loaded()?;
        let moving = scene.require(target)?;
        let anchor = scene.require(reference)?;
        self.check_reference(kind, anchor)?;

        if kind == ActionType::PutNear {
            self.state = InteractionState::Manipulate {
                target: target.to_owned(),
                reference: Some(reference.to_owned()),
                drag: None,
            };
            debug!(target, reference, "put-near anchor selected");
            return Ok(vec![Effect::SelectionChanged, Effect::RenderNeeded]);
        }

        let pose = if kind == ActionType::PutIn {
            placement::put_in(moving, anchor)
        } else {
            placement::put_on(moving, anchor)
        };
        self.apply_pose(target, pose, kind, Some(reference));
        self.set_step_action(Action::new(kind, target, Some(reference.to_owned()), pose));
        self.state =
            InteractionState::AwaitCommit { target: target.to_owned(), reference: Some(reference.to_owned()) };
        Ok(vec![Effect::SelectionChanged, Effect::RenderNeeded])
    }

    /// OPEN/CLOSE resolve from the target and the lid map alone. Clicking a
    /// mapped lid stands for its container.
    fn toggle_lid(&mut self, kind: ActionType, clicked: &str) -> Result<Vec<Effect>, PreconditionViolation> {
        let container = self.lids.container_for(clicked).map_or(clicked, String::as_str).to_owned();
        let (lid, pose) = self.resolve_lid_toggle(kind, &container)?;

        let mut step = InteractionStep::begin(self.loaded()?, &self.relations);
        self.apply_pose(&lid, pose, kind, Some(&container));
        step.action = Some(Action::new(kind, lid, Some(container.clone()), pose));
        self.step = Some(step);
        self.state = InteractionState::AwaitCommit { target: container, reference: None };
        Ok(vec![Effect::SelectionChanged, Effect::RenderNeeded])
    }

    fn resolve_lid_toggle(
        &self,
        kind: ActionType,
        container: &str,
    ) -> Result<(ObjectId, Pose), PreconditionViolation> {
        let scene = self.loaded()?;
        let container_obj = scene.require(container)?;
        let lid_id = self
            .lids
            .lid_for(container)
            .ok_or_else(|| PreconditionViolation::NoMappedLid(container.to_owned()))?;
        let lid = scene.require(lid_id)?;
        let closed = self.relations.is_closed(container);

        if kind == ActionType::Open {
            if !closed {
                return Err(PreconditionViolation::AlreadyOpen(container.to_owned()));
            }
            Ok((lid_id.clone(), placement::open_lid(lid, container_obj)))
        } else {
            if closed {
                return Err(PreconditionViolation::AlreadyClosed(container.to_owned()));
            }
            Ok((lid_id.clone(), placement::close_lid(lid, container_obj)))
        }
    }

    fn check_reference(&self, kind: ActionType, anchor: &SceneObject) -> Result<(), PreconditionViolation> {
        match kind {
            ActionType::PutIn if anchor.category != Category::Container => {
                Err(PreconditionViolation::NotAContainer(anchor.id.clone()))
            }
            ActionType::PutIn if self.relations.is_closed(&anchor.id) => {
                Err(PreconditionViolation::ContainerClosed(anchor.id.clone()))
            }
            ActionType::PutOn if anchor.category == Category::Container => {
                Err(PreconditionViolation::ReferenceIsContainer(anchor.id.clone()))
            }
            _ => Ok(()),
        }
    }

    // --- Pointer ---

    /// Pointer pressed. Starts a drag when the press lands on the PUT_NEAR or
    /// MOVE target.
    pub fn on_pointer_down(&mut self, pixel: Point) -> Vec<Effect> {
        self.press_px = Some(pixel);
        if !matches!(self.mode, Some(ActionType::PutNear | ActionType::Move)) {
            return Vec::new();
        }
        let InteractionState::Manipulate { target, drag: None, .. } = &self.state else {
            return Vec::new();
        };
        let Some(obj) = self.scene.as_ref().and_then(|s| s.get(target)) else {
            return Vec::new();
        };
        if !obj.footprint().contains(self.transform.to_world(pixel)) {
            return Vec::new();
        }
        let anchor = DragAnchor { start_px: pixel, origin: obj.position.xy() };
        if let InteractionState::Manipulate { drag, .. } = &mut self.state {
            *drag = Some(anchor);
        }
        vec![Effect::SetCursor("grabbing".to_owned())]
    }

    /// Pointer moved. Updates the live preview while dragging, and on every
    /// move while rotating.
    pub fn on_pointer_move(&mut self, pixel: Point) -> Vec<Effect> {
        let Some(kind) = self.mode else {
            return Vec::new();
        };
        let InteractionState::Manipulate { target, reference, drag } = &self.state else {
            return Vec::new();
        };
        let Some(obj) = self.scene.as_ref().and_then(|s| s.get(target)) else {
            return Vec::new();
        };

        let pose = match (kind, drag) {
            (ActionType::Rotate, _) => Pose {
                position: obj.position,
                orientation: placement::rotate_toward(obj, pixel, &self.transform),
            },
            (ActionType::PutNear, Some(anchor)) => {
                let p = placement::constrained_drag(anchor, pixel, &self.transform);
                Pose { position: Vec3::new(p.x, p.y, obj.position.z), orientation: obj.orientation }
            }
            (ActionType::Move, Some(anchor)) => {
                let p = placement::free_drag(anchor, pixel, &self.transform);
                Pose { position: Vec3::new(p.x, p.y, obj.position.z), orientation: obj.orientation }
            }
            _ => return Vec::new(),
        };
        let target = target.clone();
        let reference = reference.clone();

        self.apply_pose(&target, pose, kind, reference.as_deref());
        self.set_step_action(Action::new(kind, target, reference, pose));
        vec![Effect::RenderNeeded]
    }

    /// Pointer released. Ends a drag, or counts as a click if the pointer
    /// barely moved since the press.
    ///
    /// # Errors
    ///
    /// Propagates errors from the click it stands for.
    pub fn on_pointer_up(&mut self, pixel: Point) -> Result<Vec<Effect>, EngineError> {
        let press = self.press_px.take();
        if let InteractionState::Manipulate { drag, .. } = &mut self.state
            && drag.take().is_some()
        {
            return Ok(vec![Effect::SetCursor("default".to_owned()), Effect::RenderNeeded]);
        }
        match press {
            Some(start) if (pixel.x - start.x).hypot(pixel.y - start.y) <= CLICK_SLOP_PX => self.on_click(pixel),
            _ => Ok(Vec::new()),
        }
    }

    // --- Commit / cancel ---

    /// Append the step action to the trajectory and return to idle.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation::NothingToCommit`] when no step action exists.
    pub fn finish(&mut self) -> Result<Vec<Effect>, EngineError> {
        let Some(action) = self.step.take_if(|s| s.action.is_some()).and_then(|s| s.action) else {
            return Err(PreconditionViolation::NothingToCommit.into());
        };
        self.trajectory.append(action.clone());
        self.mode = None;
        self.state = InteractionState::Idle;
        self.press_px = None;
        info!(
            action = %action.kind,
            object_id = %action.object_id,
            steps = self.trajectory.len(),
            "step committed"
        );
        Ok(vec![Effect::StepCommitted(action), Effect::SelectionChanged, Effect::RenderNeeded])
    }

    /// Roll back to the pre-step snapshot and return to idle.
    pub fn cancel(&mut self) -> Vec<Effect> {
        let was_idle = self.state == InteractionState::Idle && self.mode.is_none();
        let restored = match self.step.take() {
            Some(InteractionStep { snapshot: StepSnapshot { scene, relations }, .. }) => {
                self.scene = Some(scene);
                self.relations = relations;
                true
            }
            None => false,
        };
        self.mode = None;
        self.state = InteractionState::Idle;
        self.press_px = None;

        if restored {
            info!("step cancelled");
            vec![Effect::StepCancelled, Effect::SelectionChanged, Effect::RenderNeeded]
        } else if was_idle {
            Vec::new()
        } else {
            vec![Effect::SelectionChanged, Effect::RenderNeeded]
        }
    }

    // --- Save ---

    /// Build the payload for the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation::NothingToSave`] when no scene is loaded
    /// or nothing has been committed.
    pub fn save_request(&self) -> Result<SaveRequest, EngineError> {
        let Some(scene) = &self.scene else {
            return Err(PreconditionViolation::NothingToSave.into());
        };
        if self.trajectory.is_empty() {
            return Err(PreconditionViolation::NothingToSave.into());
        }
        Ok(SaveRequest {
            scene_id: scene.scene_id().to_owned(),
            payload: self.trajectory.snapshot_for_save(&self.relations),
        })
    }

    /// Deliver the persistence collaborator's answer. The trajectory is kept either way.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when the save failed.
    pub fn complete_save(&self, request: &SaveRequest, result: Result<(), CollaboratorError>) -> Result<(), EngineError> {
        match result {
            Ok(()) => {
                info!(scene_id = %request.scene_id, actions = request.payload.actions.len(), "trajectory saved");
                Ok(())
            }
            Err(e) => {
                warn!(scene_id = %request.scene_id, error = %e, "trajectory save failed");
                Err(e.into())
            }
        }
    }

    // --- Replay ---

    /// Apply a recorded action headlessly and append it.
    ///
    /// Deterministic placements are recomputed from the current scene; free
    /// MOVE, ROTATE and PUT_NEAR take the recorded pose, clamped to the world
    /// rectangle. Any pending step is dropped first. Returns the action as applied.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Precondition`] when the action is not valid
    /// against the current scene and relations.
    pub fn replay(&mut self, action: &Action) -> Result<Action, EngineError> {
        let pose = self.replay_pose(action).inspect_err(|e| {
            debug!(action = %action.kind, object_id = %action.object_id, error = %e, "replay rejected");
        })?;

        self.step = None;
        self.mode = None;
        self.state = InteractionState::Idle;

        self.apply_pose(&action.object_id, pose, action.kind, action.reference_id.as_deref());
        let applied = Action::new(action.kind, action.object_id.clone(), action.reference_id.clone(), pose);
        self.trajectory.append(applied.clone());
        debug!(action = %applied.kind, object_id = %applied.object_id, "action replayed");
        Ok(applied)
    }

    fn replay_pose(&self, action: &Action) -> Result<Pose, PreconditionViolation> {
        let scene = self.loaded()?;
        let moving = scene.require(&action.object_id)?;
        let kind = action.kind;

        let reference = if kind.needs_reference() || kind.is_lid_toggle() {
            let reference = action.reference_id.as_deref().ok_or(PreconditionViolation::MissingReference(kind))?;
            if reference == action.object_id {
                return Err(PreconditionViolation::SameObject { action: kind, target: action.object_id.clone() });
            }
            Some(scene.require(reference)?)
        } else {
            None
        };

        match (kind, reference) {
            (ActionType::Open | ActionType::Close, Some(container)) => {
                let (lid, pose) = self.resolve_lid_toggle(kind, &container.id)?;
                if lid != action.object_id {
                    return Err(PreconditionViolation::LidMismatch {
                        container: container.id.clone(),
                        lid: action.object_id.clone(),
                    });
                }
                Ok(pose)
            }
            (ActionType::PutIn, Some(anchor)) => {
                self.check_reference(kind, anchor)?;
                Ok(placement::put_in(moving, anchor))
            }
            (ActionType::PutOn, Some(anchor)) => {
                self.check_reference(kind, anchor)?;
                Ok(placement::put_on(moving, anchor))
            }
            (ActionType::Rotate, _) => Ok(Pose { position: moving.position, orientation: action.new_orientation }),
            _ => {
                let xy = clamp_moved_axes(&self.config.world, moving.position.xy(), action.new_pos.xy());
                Ok(Pose { position: Vec3::new(xy.x, xy.y, action.new_pos.z), orientation: action.new_orientation })
            }
        }
    }

    // --- Mutation helpers ---

    fn apply_pose(&mut self, id: &str, pose: Pose, kind: ActionType, context: Option<&str>) {
        if let Some(scene) = self.scene.as_mut() {
            scene.set_pose(id, pose.position, pose.orientation);
        }
        self.relations.apply(id, kind, context, &self.lids);
        debug_assert!(self.relations.validate().is_ok(), "relation bookkeeping broken: {:?}", self.relations);
    }

    fn set_step_action(&mut self, action: Action) {
        if let Some(step) = self.step.as_mut() {
            step.action = Some(action);
        }
    }

    fn reset_interaction(&mut self) {
        self.mode = None;
        self.state = InteractionState::Idle;
        self.step = None;
        self.press_px = None;
    }

    fn has_step_action(&self) -> bool {
        self.step.as_ref().is_some_and(|s| s.action.is_some())
    }

    fn loaded(&self) -> Result<&Scene, PreconditionViolation> {
        self.scene.as_ref().ok_or(PreconditionViolation::NoSceneLoaded)
    }

    // --- Queries ---

    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    #[must_use]
    pub fn object(&self, id: &str) -> Option<&SceneObject> {
        self.scene.as_ref().and_then(|s| s.get(id))
    }

    #[must_use]
    pub fn relations(&self) -> &RelationSet {
        &self.relations
    }

    #[must_use]
    pub fn lid_map(&self) -> &LidMap {
        &self.lids
    }

    #[must_use]
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// The chosen action type, if any.
    #[must_use]
    pub fn mode(&self) -> Option<ActionType> {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn step(&self) -> Option<&InteractionStep> {
        self.step.as_ref()
    }

    #[must_use]
    pub fn target(&self) -> Option<&ObjectId> {
        self.state.target()
    }

    #[must_use]
    pub fn reference(&self) -> Option<&ObjectId> {
        self.state.reference()
    }

    #[must_use]
    pub fn transform(&self) -> &CanvasTransform {
        &self.transform
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Clamp only the axes that moved; an axis left at `from` keeps its value
/// even when outside the world rectangle.
fn clamp_moved_axes(world: &WorldRect, from: Point, to: Point) -> Point {
    let clamped = world.clamp(to);
    Point::new(
        if (to.x - from.x).abs() < f64::EPSILON { to.x } else { clamped.x },
        if (to.y - from.y).abs() < f64::EPSILON { to.y } else { clamped.y },
    )
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    dpr: f64,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, dpr: 1.0, core: EngineCore::new() }
    }

    // --- Delegated data inputs ---

    pub fn begin_load(&mut self, scene_id: &str) -> LoadTicket {
        self.core.begin_load(scene_id)
    }

    /// # Errors
    ///
    /// See [`EngineCore::complete_load`].
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<SceneBundle, CollaboratorError>,
    ) -> Result<LoadOutcome, EngineError> {
        self.core.complete_load(ticket, result)
    }

    pub fn choose_action(&mut self, kind: ActionType) -> Vec<Effect> {
        self.core.choose_action(kind)
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the backing store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Effect> {
        self.dpr = dpr;
        self.canvas.set_width((width_css * dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * dpr).round().max(0.0) as u32);
        self.core.set_viewport(width_css, height_css)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Effect> {
        self.core.on_pointer_down(screen_pt)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Effect> {
        self.core.on_pointer_move(screen_pt)
    }

    /// # Errors
    ///
    /// See [`EngineCore::on_pointer_up`].
    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Result<Vec<Effect>, EngineError> {
        self.core.on_pointer_up(screen_pt)
    }

    /// # Errors
    ///
    /// See [`EngineCore::finish`].
    pub fn finish(&mut self) -> Result<Vec<Effect>, EngineError> {
        self.core.finish()
    }

    pub fn cancel(&mut self) -> Vec<Effect> {
        self.core.cancel()
    }

    /// # Errors
    ///
    /// See [`EngineCore::save_request`].
    pub fn save_request(&self) -> Result<SaveRequest, EngineError> {
        self.core.save_request()
    }

    /// Set the CSS cursor on the canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the style property cannot be written.
    pub fn set_cursor(&self, cursor: &str) -> Result<(), JsValue> {
        self.canvas.style().set_property("cursor", cursor)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or any draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(
            &ctx,
            self.core.scene(),
            self.core.transform(),
            self.core.config().tick_count,
            self.core.target().map(String::as_str),
            self.core.reference().map(String::as_str),
            self.dpr,
        )
    }
}
