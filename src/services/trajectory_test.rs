use super::*;

use canvas::interaction::ActionType;
use canvas::placement::Pose;
use canvas::relations::{Closure, Placement, RelationSet};
use canvas::scene::Vec3;
use canvas::trajectory::Action;

use crate::state::test_helpers::{cleanup, scratch_config};

fn payload() -> SavePayload {
    let mut relations = RelationSet::new();
    relations.inside.push(Placement::new("item_03", "container_07"));
    relations.closed.push(Closure::new("container_07"));
    SavePayload {
        actions: vec![
            Action::new(
                ActionType::PutIn,
                "item_03",
                Some("container_07".to_owned()),
                Pose { position: Vec3::new(0.25, -0.35, 0.055), orientation: 0.0 },
            ),
            Action::new(
                ActionType::Close,
                "lid_01",
                Some("container_07".to_owned()),
                Pose { position: Vec3::new(0.25, -0.35, 0.105), orientation: 0.0 },
            ),
        ],
        relations,
    }
}

#[test]
fn output_paths_live_under_output_dir() {
    let config = ServerConfig::with_dirs("/d", "/o");
    assert_eq!(trajectory_path(&config, "7"), PathBuf::from("/o/trajectories/7.json"));
    assert_eq!(problem_path(&config, "7"), PathBuf::from("/o/pddl/7.pddl"));
}

#[tokio::test]
async fn save_writes_trajectory_and_problem() {
    let config = scratch_config("traj-save");
    let saved = save(&config, "7", &payload()).await.unwrap();

    let json = std::fs::read_to_string(&saved.trajectory).unwrap();
    let actions: Vec<Action> = serde_json::from_str(&json).unwrap();
    assert_eq!(actions, payload().actions);
    assert!(json.contains("\"type\": \"PUT_IN\""));

    let problem = std::fs::read_to_string(&saved.problem).unwrap();
    assert!(problem.starts_with("(define (problem 7-goal)\n"));
    assert!(problem.contains("    container_07 - container\n"));
    assert!(problem.contains("    lid_01 - lid\n"));
    assert!(problem.contains("    (in item_03 container_07)\n"));
    assert!(problem.contains("    (closed container_07)\n"));
    cleanup(&config);
}

#[tokio::test]
async fn save_overwrites_previous() {
    let config = scratch_config("traj-overwrite");
    save(&config, "7", &payload()).await.unwrap();

    let empty = SavePayload { actions: Vec::new(), relations: RelationSet::new() };
    let saved = save(&config, "7", &empty).await.unwrap();
    let actions: Vec<Action> = serde_json::from_str(&std::fs::read_to_string(&saved.trajectory).unwrap()).unwrap();
    assert!(actions.is_empty());
    assert!(!std::fs::read_to_string(&saved.problem).unwrap().contains("(closed"));
    cleanup(&config);
}

#[tokio::test]
async fn save_unknown_scene_writes_nothing() {
    let config = scratch_config("traj-unknown");
    let err = save(&config, "99", &payload()).await.unwrap_err();
    assert!(matches!(err, TrajectoryStoreError::Scene(SceneStoreError::NotFound(_))));
    assert!(!trajectory_path(&config, "99").exists());
    assert!(!problem_path(&config, "99").exists());
    cleanup(&config);
}

#[tokio::test]
async fn save_rejects_unsafe_id() {
    let config = scratch_config("traj-unsafe");
    let err = save(&config, "../7", &payload()).await.unwrap_err();
    assert!(matches!(err, TrajectoryStoreError::Scene(SceneStoreError::InvalidId(_))));
    cleanup(&config);
}
