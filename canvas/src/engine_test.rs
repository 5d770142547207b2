#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::relations::Placement;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// bowl1 is closed by lid1 (provided as `on`, normalised on load); bowl2 is
/// open with lid2 set aside; item3 starts on support1.
fn bundle() -> SceneBundle {
    serde_json::from_value(json!({
        "scene": {
            "task_id": "42",
            "objects": [
                {"id": "bowl1", "name": "bowl", "category": "container",
                 "position": [0.2, -0.4, 0.05], "orientation": 0.0, "size": [0.12, 0.12, 0.1]},
                {"id": "lid1", "name": "lid", "category": "lid",
                 "position": [0.2, -0.4, 0.105], "orientation": 10.0, "size": [0.12, 0.12, 0.01]},
                {"id": "bowl2", "name": "bowl", "category": "bowl",
                 "position": [0.35, -0.1, 0.05], "orientation": 0.0, "size": [0.1, 0.1, 0.1]},
                {"id": "lid2", "name": "lid", "category": "lid",
                 "position": [0.45, 0.15, 0.005], "orientation": 30.0, "size": [0.1, 0.1, 0.01]},
                {"id": "support1", "name": "tray", "category": "support",
                 "position": [0.1, 0.1, 0.01], "orientation": 0.0, "size": [0.15, 0.15, 0.02]},
                {"id": "item1", "name": "cup", "category": "item",
                 "position": [0.4, -0.6, 0.02], "orientation": 45.0, "size": [0.04, 0.04, 0.04]},
                {"id": "item2", "name": "block", "category": "item",
                 "position": [0.25, 0.2, 0.02], "orientation": 0.0, "size": [0.04, 0.04, 0.04]},
                {"id": "item3", "name": "block", "category": "item",
                 "position": [0.1, 0.1, 0.04], "orientation": 0.0, "size": [0.04, 0.04, 0.04]}
            ]
        },
        "image": "/images/scene_42_rgb.png",
        "lid_map": {"bowl1": "lid1", "bowl2": "lid2"},
        "relations": {
            "on": [{"obj1": "lid1", "obj2": "bowl1"}, {"obj1": "item3", "obj2": "support1"}],
            "in": [],
            "closed": []
        }
    }))
    .unwrap()
}

/// Loaded core in a 1100 x 600 viewport: 1000 px per metre, origin (50, 50).
fn core() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_viewport(1100.0, 600.0);
    core.load_scene(bundle()).unwrap();
    core
}

/// Like [`core`], with `item2` placed at world `(x, y)`, possibly off the rectangle.
fn core_with_item2_at(x: f64, y: f64) -> EngineCore {
    let mut bundle = bundle();
    for obj in &mut bundle.scene.objects {
        if obj.id == "item2" {
            obj.position = Vec3::new(x, y, obj.position.z);
        }
    }
    let mut core = EngineCore::new();
    core.set_viewport(1100.0, 600.0);
    core.load_scene(bundle).unwrap();
    core
}

fn px(core: &EngineCore, x: f64, y: f64) -> Point {
    core.transform().to_canvas(Point::new(x, y))
}

fn pos(core: &EngineCore, id: &str) -> Vec3 {
    core.object(id).unwrap().position
}

fn precondition(err: EngineError) -> PreconditionViolation {
    match err {
        EngineError::Precondition(p) => p,
        EngineError::Collaborator(c) => panic!("expected precondition violation, got {c}"),
    }
}

fn commit(core: &mut EngineCore) -> Action {
    let effects = core.finish().unwrap();
    match effects.first() {
        Some(Effect::StepCommitted(action)) => action.clone(),
        other => panic!("expected StepCommitted, got {other:?}"),
    }
}

// =============================================================
// Loading
// =============================================================

#[test]
fn load_normalises_seated_lid_to_closed() {
    let core = core();
    assert!(core.relations().is_closed("bowl1"));
    assert_eq!(core.relations().on, vec![Placement::new("item3", "support1")]);
    assert_eq!(core.scene().unwrap().scene_id(), "42");
    assert_eq!(core.state(), &InteractionState::Idle);
}

#[test]
fn stale_load_is_superseded() {
    let mut core = EngineCore::new();
    let first = core.begin_load("41");
    let second = core.begin_load("42");

    let outcome = core.complete_load(&first, Ok(bundle())).unwrap();
    assert_eq!(outcome, LoadOutcome::Superseded);
    assert!(core.scene().is_none());

    let outcome = core.complete_load(&second, Ok(bundle())).unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded);
    assert!(core.scene().is_some());
}

#[test]
fn stale_failure_is_ignored_too() {
    let mut core = core();
    let first = core.begin_load("41");
    let _second = core.begin_load("43");
    let outcome = core.complete_load(&first, Err(CollaboratorError::Transport("reset".into())));
    assert_eq!(outcome, Ok(LoadOutcome::Superseded));
}

#[test]
fn failed_load_keeps_previous_scene() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    core.click_object("support1").unwrap();
    commit(&mut core);

    let before = core.scene().cloned();
    let ticket = core.begin_load("99");
    let err = core
        .complete_load(&ticket, Err(CollaboratorError::Status { status: 404, message: "unknown scene".into() }))
        .unwrap_err();
    assert!(matches!(err, EngineError::Collaborator(CollaboratorError::Status { status: 404, .. })));
    assert_eq!(core.scene().cloned(), before);
    assert_eq!(core.trajectory().len(), 1);
}

#[test]
fn load_resets_trajectory_and_selection() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    core.click_object("support1").unwrap();
    commit(&mut core);
    core.choose_action(ActionType::Move);
    core.click_object("item2").unwrap();

    core.load_scene(bundle()).unwrap();
    assert!(core.trajectory().is_empty());
    assert!(core.step().is_none());
    assert!(core.mode().is_none());
    assert_eq!(core.state(), &InteractionState::Idle);
    assert_eq!(pos(&core, "item1"), Vec3::new(0.4, -0.6, 0.02));
}

#[test]
fn duplicate_ids_are_malformed() {
    let mut b = bundle();
    let dup = b.scene.objects[0].clone();
    b.scene.objects.push(dup);
    let mut core = EngineCore::new();
    let err = core.load_scene(b).unwrap_err();
    assert!(matches!(err, EngineError::Collaborator(CollaboratorError::Malformed(_))));
    assert!(core.scene().is_none());
}

#[test]
fn conflicting_provider_relations_are_malformed() {
    let mut b = bundle();
    b.relations.inside.push(Placement::new("item3", "bowl2"));
    let err = EngineCore::new().load_scene(b).unwrap_err();
    assert!(matches!(err, EngineError::Collaborator(CollaboratorError::Malformed(_))));
}

// =============================================================
// OPEN / CLOSE
// =============================================================

#[test]
fn open_closed_bowl_scenario() {
    let mut core = core();
    let lid_before = pos(&core, "lid1");

    core.choose_action(ActionType::Open);
    core.click_object("bowl1").unwrap();

    let lid = core.object("lid1").unwrap();
    assert_ne!(lid.position, lid_before);
    assert!(approx_eq(lid.position.x, 0.2 - 0.12 * 0.7));
    assert!(approx_eq(lid.position.y, -0.4 - 0.12 * 0.3));
    assert!(approx_eq(lid.position.z, 0.005));
    assert_eq!(lid.orientation, 10.0);
    assert!(!core.relations().is_closed("bowl1"));
    assert!(matches!(core.state(), InteractionState::AwaitCommit { .. }));

    let action = commit(&mut core);
    assert_eq!(core.state(), &InteractionState::Idle);
    assert_eq!(core.trajectory().len(), 1);
    assert_eq!(action.kind, ActionType::Open);
    assert_eq!(action.object_id, "lid1");
    assert_eq!(action.reference_id.as_deref(), Some("bowl1"));
}

#[test]
fn clicking_the_lid_stands_for_its_container() {
    let mut core = core();
    core.choose_action(ActionType::Open);
    core.click_object("lid1").unwrap();
    assert_eq!(core.target().map(String::as_str), Some("bowl1"));
    assert!(!core.relations().is_closed("bowl1"));
}

#[test]
fn close_open_bowl_seats_lid() {
    let mut core = core();
    core.choose_action(ActionType::Close);
    core.click_object("bowl2").unwrap();

    let lid = core.object("lid2").unwrap();
    assert_eq!((lid.position.x, lid.position.y), (0.35, -0.1));
    assert!(approx_eq(lid.position.z, 0.105));
    assert_eq!(lid.orientation, 30.0);
    assert!(core.relations().is_closed("bowl2"));
    commit(&mut core);
    assert!(core.relations().is_closed("bowl2"));
}

#[test]
fn lid_toggle_preconditions_leave_state_unchanged() {
    let mut core = core();
    let scene = core.scene().cloned();
    let relations = core.relations().clone();

    core.choose_action(ActionType::Open);
    let err = precondition(core.click_object("bowl2").unwrap_err());
    assert_eq!(err, PreconditionViolation::AlreadyOpen("bowl2".into()));
    let err = precondition(core.click_object("support1").unwrap_err());
    assert_eq!(err, PreconditionViolation::NoMappedLid("support1".into()));

    core.choose_action(ActionType::Close);
    let err = precondition(core.click_object("bowl1").unwrap_err());
    assert_eq!(err, PreconditionViolation::AlreadyClosed("bowl1".into()));

    assert_eq!(core.scene().cloned(), scene);
    assert_eq!(core.relations(), &relations);
    assert!(core.step().is_none());
    assert_eq!(core.state(), &InteractionState::SelectTarget);
}

#[test]
fn close_then_open_round_trips_closed_set() {
    let mut core = core();
    let closed_before = core.relations().closed.clone();

    core.choose_action(ActionType::Close);
    core.click_object("bowl2").unwrap();
    commit(&mut core);

    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    core.click_object("support1").unwrap();
    commit(&mut core);

    core.choose_action(ActionType::PutIn);
    core.click_object("item2").unwrap();
    let err = precondition(core.click_object("bowl2").unwrap_err());
    assert_eq!(err, PreconditionViolation::ContainerClosed("bowl2".into()));

    core.choose_action(ActionType::Open);
    core.click_object("bowl2").unwrap();
    commit(&mut core);

    assert_eq!(core.relations().closed, closed_before);
}

#[test]
fn moving_a_seated_lid_opens_its_container() {
    let mut core = core();
    core.choose_action(ActionType::Move);
    core.click_object("lid1").unwrap();
    let start = px(&core, 0.2, -0.4);
    core.on_pointer_down(start);
    core.on_pointer_move(Point::new(start.x + 100.0, start.y));
    assert!(!core.relations().is_closed("bowl1"));
}

// =============================================================
// PUT_ON / PUT_IN
// =============================================================

#[test]
fn put_on_scenario() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    assert_eq!(core.state(), &InteractionState::SelectReference { target: "item1".into() });
    core.click_object("support1").unwrap();

    let item = core.object("item1").unwrap();
    let support = core.object("support1").unwrap();
    assert!(approx_eq(item.position.z, support.position.z + support.size.z / 2.0 + item.size.z / 2.0));
    assert_eq!((item.position.x, item.position.y), (0.1, 0.1));
    assert_eq!(item.orientation, 0.0);
    assert!(core.relations().on.contains(&Placement::new("item1", "support1")));

    let action = commit(&mut core);
    assert_eq!(action.kind, ActionType::PutOn);
    assert_eq!(action.reference_id.as_deref(), Some("support1"));
    assert!(approx_eq(action.new_pos.z, 0.04));
}

#[test]
fn put_on_container_is_rejected() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    let err = precondition(core.click_object("bowl2").unwrap_err());
    assert_eq!(err, PreconditionViolation::ReferenceIsContainer("bowl2".into()));
    assert_eq!(core.state(), &InteractionState::SelectReference { target: "item1".into() });
}

#[test]
fn put_in_closed_container_rejected_without_mutation() {
    let mut core = core();
    let scene = core.scene().cloned();
    core.choose_action(ActionType::PutIn);
    core.click_object("item1").unwrap();

    let err = precondition(core.click_object("bowl1").unwrap_err());
    assert_eq!(err, PreconditionViolation::ContainerClosed("bowl1".into()));
    assert_eq!(core.scene().cloned(), scene);
    assert!(core.trajectory().is_empty());
    assert_eq!(precondition(core.finish().unwrap_err()), PreconditionViolation::NothingToCommit);
    assert!(core.trajectory().is_empty());
}

#[test]
fn put_in_open_container_nests_item() {
    let mut core = core();
    core.choose_action(ActionType::PutIn);
    core.click_object("item3").unwrap();
    core.click_object("bowl2").unwrap();

    let item = core.object("item3").unwrap();
    assert_eq!((item.position.x, item.position.y), (0.35, -0.1));
    assert!(approx_eq(item.position.z, 0.02));
    assert_eq!(core.relations().placement_of("item3").map(|(k, _)| k), Some(crate::relations::PlacementKind::In));
    assert!(core.relations().on.is_empty());
}

#[test]
fn put_in_non_container_rejected() {
    let mut core = core();
    core.choose_action(ActionType::PutIn);
    core.click_object("item1").unwrap();
    let err = precondition(core.click_object("support1").unwrap_err());
    assert_eq!(err, PreconditionViolation::NotAContainer("support1".into()));
}

#[test]
fn reference_must_differ_from_target() {
    let mut core = core();
    core.choose_action(ActionType::PutNear);
    core.click_object("item1").unwrap();
    let err = precondition(core.click_object("item1").unwrap_err());
    assert!(matches!(err, PreconditionViolation::SameObject { action: ActionType::PutNear, .. }));
}

// =============================================================
// PUT_NEAR / MOVE / ROTATE
// =============================================================

#[test]
fn put_near_pins_minor_axis() {
    let mut core = core();
    core.choose_action(ActionType::PutNear);
    core.click_object("item2").unwrap();
    core.click_object("item3").unwrap();
    assert!(matches!(core.state(), InteractionState::Manipulate { drag: None, .. }));

    let start = px(&core, 0.25, 0.2);
    let effects = core.on_pointer_down(start);
    assert_eq!(effects, vec![Effect::SetCursor("grabbing".into())]);

    // 60 px down (world x) beats 10 px right (world y).
    core.on_pointer_move(Point::new(start.x + 10.0, start.y + 60.0));
    let item = core.object("item2").unwrap();
    assert!(approx_eq(item.position.x, 0.31));
    assert_eq!(item.position.y, 0.2);
    assert_eq!(item.position.z, 0.02);

    core.on_pointer_up(Point::new(start.x + 10.0, start.y + 60.0)).unwrap();
    let action = commit(&mut core);
    assert_eq!(action.kind, ActionType::PutNear);
    assert_eq!(action.reference_id.as_deref(), Some("item3"));
    assert_eq!(action.new_pos.y, 0.2);
}

#[test]
fn put_near_pinned_axis_holds_for_whole_drag() {
    let mut core = core();
    core.choose_action(ActionType::PutNear);
    core.click_object("item2").unwrap();
    core.click_object("item3").unwrap();
    let start = px(&core, 0.25, 0.2);
    core.on_pointer_down(start);
    for step in 1..30 {
        let s = f64::from(step);
        core.on_pointer_move(Point::new(start.x - s * 2.0, start.y + s * 0.5));
        assert_eq!(pos(&core, "item2").x, 0.25, "step {step}");
    }
}

#[test]
fn put_near_clamps_to_world() {
    let mut core = core();
    core.choose_action(ActionType::PutNear);
    core.click_object("item2").unwrap();
    core.click_object("item3").unwrap();
    let start = px(&core, 0.25, 0.2);
    core.on_pointer_down(start);
    core.on_pointer_move(Point::new(start.x + 2000.0, start.y));
    assert_eq!(pos(&core, "item2").y, 0.3);
}

#[test]
fn put_near_keeps_off_world_pinned_axis() {
    // item2 sits past y_max (0.3); the drag runs along world x only.
    let mut core = core_with_item2_at(0.25, 0.32);
    core.choose_action(ActionType::PutNear);
    core.click_object("item2").unwrap();
    core.click_object("item3").unwrap();
    let start = px(&core, 0.25, 0.32);
    core.on_pointer_down(start);
    for step in 1..=6 {
        let s = f64::from(step);
        core.on_pointer_move(Point::new(start.x + 2.0, start.y + s * 10.0));
        assert_eq!(pos(&core, "item2").y, 0.32, "step {step}");
    }
    assert!(approx_eq(pos(&core, "item2").x, 0.31));

    core.on_pointer_up(Point::new(start.x + 2.0, start.y + 60.0)).unwrap();
    let action = commit(&mut core);
    assert_eq!(action.new_pos.y, 0.32);
}

#[test]
fn drag_needs_press_on_target() {
    let mut core = core();
    core.choose_action(ActionType::Move);
    core.click_object("item2").unwrap();
    let elsewhere = px(&core, 0.45, -0.3);
    assert!(core.on_pointer_down(elsewhere).is_empty());
    assert!(core.on_pointer_move(Point::new(elsewhere.x + 50.0, elsewhere.y)).is_empty());
    assert_eq!(pos(&core, "item2"), Vec3::new(0.25, 0.2, 0.02));
}

#[test]
fn free_move_follows_pointer() {
    let mut core = core();
    core.choose_action(ActionType::Move);
    core.click_object("item3").unwrap();
    let start = px(&core, 0.1, 0.1);
    core.on_pointer_down(start);
    core.on_pointer_move(Point::new(start.x + 30.0, start.y + 40.0));
    let item = core.object("item3").unwrap();
    assert!(approx_eq(item.position.x, 0.14));
    assert!(approx_eq(item.position.y, 0.13));
    assert!(core.relations().on.is_empty());
    let action = commit(&mut core);
    assert_eq!(action.kind, ActionType::Move);
    assert!(action.reference_id.is_none());
}

#[test]
fn rotate_faces_pointer_without_drift() {
    let mut core = core();
    core.choose_action(ActionType::Rotate);
    core.click_object("item1").unwrap();
    let centre = px(&core, 0.4, -0.6);
    let right = Point::new(centre.x + 40.0, centre.y);

    core.on_pointer_move(right);
    let first = core.object("item1").unwrap().orientation;
    assert!(approx_eq(first, 90.0));
    for i in 0..20 {
        let a = f64::from(i) * 0.3;
        core.on_pointer_move(Point::new(centre.x + a.cos() * 50.0, centre.y + a.sin() * 50.0));
    }
    core.on_pointer_move(right);
    assert_eq!(core.object("item1").unwrap().orientation, first);
    assert_eq!(pos(&core, "item1"), Vec3::new(0.4, -0.6, 0.02));
}

// =============================================================
// Cancel / action switch / empty clicks
// =============================================================

#[test]
fn cancel_restores_snapshot_exactly() {
    let mut core = core();
    let scene = core.scene().cloned();
    let relations = core.relations().clone();

    core.choose_action(ActionType::PutNear);
    core.click_object("item3").unwrap();
    core.click_object("item2").unwrap();
    let start = px(&core, 0.1, 0.1);
    core.on_pointer_down(start);
    for step in 1..15 {
        let s = f64::from(step);
        core.on_pointer_move(Point::new(start.x + s * 7.0, start.y - s * 3.0));
    }
    assert_ne!(core.scene().cloned(), scene);
    assert_ne!(core.relations(), &relations);

    let effects = core.cancel();
    assert_eq!(effects[0], Effect::StepCancelled);
    assert_eq!(core.scene().cloned(), scene);
    assert_eq!(core.relations(), &relations);
    assert_eq!(core.state(), &InteractionState::Idle);
    assert!(core.trajectory().is_empty());
}

#[test]
fn cancel_after_lid_toggle_recloses() {
    let mut core = core();
    core.choose_action(ActionType::Open);
    core.click_object("bowl1").unwrap();
    core.cancel();
    assert!(core.relations().is_closed("bowl1"));
    assert_eq!(pos(&core, "lid1"), Vec3::new(0.2, -0.4, 0.105));
}

#[test]
fn cancel_when_idle_is_noop() {
    let mut core = core();
    assert!(core.cancel().is_empty());
    assert_eq!(core.state(), &InteractionState::Idle);
}

#[test]
fn action_switch_drops_step_without_restoring() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    core.click_object("support1").unwrap();

    core.choose_action(ActionType::Move);
    assert!(core.step().is_none());
    assert_eq!(core.state(), &InteractionState::SelectTarget);
    assert!(approx_eq(pos(&core, "item1").z, 0.04));
    assert!(core.trajectory().is_empty());
}

#[test]
fn empty_click_commits_pending_step() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    core.click_object("support1").unwrap();
    let effects = core.click_empty().unwrap();
    assert!(matches!(effects[0], Effect::StepCommitted(_)));
    assert_eq!(core.trajectory().len(), 1);
    assert!(core.mode().is_none());
}

#[test]
fn empty_click_clears_selection_and_keeps_mode() {
    let mut core = core();
    core.choose_action(ActionType::PutIn);
    core.click_object("item1").unwrap();
    let effects = core.click_empty().unwrap();
    assert_eq!(effects, vec![Effect::SelectionChanged, Effect::RenderNeeded]);
    assert_eq!(core.state(), &InteractionState::SelectTarget);
    assert_eq!(core.mode(), Some(ActionType::PutIn));
    assert!(core.target().is_none());
}

#[test]
fn object_click_while_awaiting_commit_is_ignored() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    core.click_object("support1").unwrap();
    assert!(core.click_object("item2").unwrap().is_empty());
    assert_eq!(core.target().map(String::as_str), Some("item1"));
}

#[test]
fn click_without_action_is_rejected() {
    let mut core = core();
    let err = precondition(core.click_object("item1").unwrap_err());
    assert_eq!(err, PreconditionViolation::NoActionChosen);
}

#[test]
fn click_unknown_object_is_rejected() {
    let mut core = core();
    core.choose_action(ActionType::Move);
    let err = precondition(core.click_object("ghost").unwrap_err());
    assert_eq!(err, PreconditionViolation::UnknownObject("ghost".into()));
}

#[test]
fn click_without_scene_is_rejected() {
    let mut core = EngineCore::new();
    core.choose_action(ActionType::Move);
    let err = precondition(core.on_click(Point::new(10.0, 10.0)).unwrap_err());
    assert_eq!(err, PreconditionViolation::NoSceneLoaded);
}

// =============================================================
// Pixel routing
// =============================================================

#[test]
fn pixel_click_routes_through_hit_test() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    let item_px = px(&core, 0.4, -0.6);
    core.on_click(item_px).unwrap();
    assert_eq!(core.target().map(String::as_str), Some("item1"));
}

#[test]
fn press_release_in_place_is_a_click() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    let item_px = px(&core, 0.4, -0.6);
    core.on_pointer_down(item_px);
    core.on_pointer_up(Point::new(item_px.x + 1.0, item_px.y)).unwrap();
    assert_eq!(core.target().map(String::as_str), Some("item1"));
}

#[test]
fn release_after_drag_is_not_a_click() {
    let mut core = core();
    core.choose_action(ActionType::Move);
    core.click_object("item2").unwrap();
    let start = px(&core, 0.25, 0.2);
    core.on_pointer_down(start);
    core.on_pointer_move(Point::new(start.x - 200.0, start.y));
    let effects = core.on_pointer_up(Point::new(start.x - 200.0, start.y)).unwrap();
    assert_eq!(effects[0], Effect::SetCursor("default".into()));
    assert!(core.trajectory().is_empty());
    assert!(core.step().is_some_and(|s| s.action.is_some()));
}

#[test]
fn viewport_resize_rescales() {
    let mut core = core();
    let effects = core.set_viewport(600.0, 350.0);
    assert_eq!(effects, vec![Effect::RenderNeeded]);
    assert!(approx_eq(core.transform().scale(), 500.0));
}

// =============================================================
// Save
// =============================================================

#[test]
fn save_requires_scene_and_steps() {
    let core_empty = EngineCore::new();
    assert_eq!(precondition(core_empty.save_request().unwrap_err()), PreconditionViolation::NothingToSave);
    let core = core();
    assert_eq!(precondition(core.save_request().unwrap_err()), PreconditionViolation::NothingToSave);
}

#[test]
fn save_request_carries_actions_and_relations() {
    let mut core = core();
    core.choose_action(ActionType::PutOn);
    core.click_object("item1").unwrap();
    core.click_object("support1").unwrap();
    commit(&mut core);

    let request = core.save_request().unwrap();
    assert_eq!(request.scene_id, "42");
    assert_eq!(request.payload.actions.len(), 1);
    assert_eq!(&request.payload.relations, core.relations());
}

#[test]
fn failed_save_keeps_trajectory() {
    let mut core = core();
    core.choose_action(ActionType::Open);
    core.click_object("bowl1").unwrap();
    commit(&mut core);
    let request = core.save_request().unwrap();

    let err = core.complete_save(&request, Err(CollaboratorError::Transport("refused".into()))).unwrap_err();
    assert!(matches!(err, EngineError::Collaborator(_)));
    assert_eq!(core.trajectory().len(), 1);
    assert!(core.complete_save(&request, Ok(())).is_ok());
}

// =============================================================
// Replay
// =============================================================

#[test]
fn replay_recomputes_deterministic_pose() {
    let mut core = core();
    let recorded = Action::new(
        ActionType::PutOn,
        "item1",
        Some("support1".into()),
        Pose { position: Vec3::new(9.0, 9.0, 9.0), orientation: 77.0 },
    );
    let applied = core.replay(&recorded).unwrap();
    assert_eq!((applied.new_pos.x, applied.new_pos.y), (0.1, 0.1));
    assert_eq!(applied.new_orientation, 0.0);
    assert_eq!(core.trajectory().len(), 1);
    assert!(core.relations().on.contains(&Placement::new("item1", "support1")));
}

#[test]
fn replay_clamps_free_moves() {
    let mut core = core();
    let recorded =
        Action::new(ActionType::Move, "item2", None, Pose { position: Vec3::new(0.9, -2.0, 0.02), orientation: 5.0 });
    let applied = core.replay(&recorded).unwrap();
    assert_eq!(applied.new_pos, Vec3::new(0.5, -0.7, 0.02));
    assert_eq!(applied.new_orientation, 5.0);
}

#[test]
fn replay_keeps_unmoved_off_world_axis() {
    let mut core = core_with_item2_at(0.25, 0.32);
    let recorded = Action::new(
        ActionType::PutNear,
        "item2",
        Some("item3".into()),
        Pose { position: Vec3::new(0.31, 0.32, 0.02), orientation: 0.0 },
    );
    let applied = core.replay(&recorded).unwrap();
    assert_eq!(applied.new_pos, Vec3::new(0.31, 0.32, 0.02));
}

#[test]
fn replayed_rotate_stays_in_place() {
    let mut live = core_with_item2_at(0.25, 0.32);
    live.choose_action(ActionType::Rotate);
    live.click_object("item2").unwrap();
    let centre = px(&live, 0.25, 0.32);
    live.on_pointer_move(Point::new(centre.x + 40.0, centre.y));
    let recorded = commit(&mut live);
    assert_eq!(recorded.new_pos, Vec3::new(0.25, 0.32, 0.02));

    let mut fresh = core_with_item2_at(0.25, 0.32);
    let applied = fresh.replay(&recorded).unwrap();
    assert_eq!(applied.new_pos, Vec3::new(0.25, 0.32, 0.02));
    assert!(approx_eq(applied.new_orientation, 90.0));
    assert_eq!(fresh.scene(), live.scene());

    // A rotate never takes its position from the log.
    let mut tampered = recorded.clone();
    tampered.new_pos = Vec3::new(0.1, -0.5, 0.02);
    let mut other = core();
    let applied = other.replay(&tampered).unwrap();
    assert_eq!(applied.new_pos, Vec3::new(0.25, 0.2, 0.02));
}

#[test]
fn replay_rejects_invalid_actions_without_mutation() {
    let mut core = core();
    let scene = core.scene().cloned();

    let into_closed =
        Action::new(ActionType::PutIn, "item1", Some("bowl1".into()), Pose { position: Vec3::new(0.0, 0.0, 0.0), orientation: 0.0 });
    assert_eq!(
        precondition(core.replay(&into_closed).unwrap_err()),
        PreconditionViolation::ContainerClosed("bowl1".into())
    );

    let wrong_lid =
        Action::new(ActionType::Open, "lid2", Some("bowl1".into()), Pose { position: Vec3::new(0.0, 0.0, 0.0), orientation: 0.0 });
    assert!(matches!(
        precondition(core.replay(&wrong_lid).unwrap_err()),
        PreconditionViolation::LidMismatch { .. }
    ));

    let no_reference =
        Action::new(ActionType::PutNear, "item1", None, Pose { position: Vec3::new(0.0, 0.0, 0.0), orientation: 0.0 });
    assert_eq!(
        precondition(core.replay(&no_reference).unwrap_err()),
        PreconditionViolation::MissingReference(ActionType::PutNear)
    );

    assert_eq!(core.scene().cloned(), scene);
    assert!(core.trajectory().is_empty());
}

#[test]
fn replayed_trajectory_matches_interactive_one() {
    let mut live = core();
    live.choose_action(ActionType::Open);
    live.click_object("bowl1").unwrap();
    commit(&mut live);
    live.choose_action(ActionType::PutIn);
    live.click_object("item1").unwrap();
    live.click_object("bowl1").unwrap();
    commit(&mut live);

    let mut headless = core();
    for action in live.trajectory().actions() {
        headless.replay(action).unwrap();
    }
    assert_eq!(headless.scene(), live.scene());
    assert_eq!(headless.relations(), live.relations());
    assert_eq!(headless.trajectory(), live.trajectory());
}
