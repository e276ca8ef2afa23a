use super::*;
use crate::event::{Agent, Ball, Pose, Trajectory, TrajectoryPoint};
use crate::logs::LogChannel;
use chrono::Local;
use serde_json::json;

fn agent(id: i64, x: f64) -> Agent {
    Agent {
        id,
        x,
        y: 0.0,
        angle: 0.0,
    }
}

fn trajectory(robot_id: i64) -> Trajectory {
    Trajectory {
        robot_id,
        points: vec![TrajectoryPoint {
            x: 1.0,
            y: 1.0,
            vx: 0.5,
            vy: 0.0,
            t: 0.1,
        }],
        total_duration: Some(0.1),
    }
}

fn status_map(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn test_agents_update_replaces_team_list() {
    let mut store = StateStore::default();

    store.apply_agents_update(Team::Yellow, vec![agent(1, 0.0), agent(2, 1.0), agent(3, 2.0)]);
    store.apply_agents_update(Team::Yellow, vec![agent(7, 5.0)]);

    let yellow = store.agents(Team::Yellow);
    assert_eq!(yellow.len(), 1);
    assert_eq!(yellow[0].id, 7);
    assert!(store.agents(Team::Blue).is_empty());
}

#[test]
fn test_agents_update_preserves_payload_order() {
    let mut store = StateStore::default();
    store.apply_agents_update(Team::Blue, vec![agent(4, 0.0), agent(0, 0.0), agent(2, 0.0)]);

    let ids: Vec<i64> = store.agents(Team::Blue).iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![4, 0, 2]);
}

#[test]
fn test_objects_update_replaces_list() {
    let mut store = StateStore::default();
    store.apply_objects_update(vec![Ball { id: None, x: 1.0, y: 2.0 }]);
    store.apply_objects_update(vec![]);
    assert!(store.objects().is_empty());
}

#[test]
fn test_trajectory_update_drops_stale_ids() {
    let mut store = StateStore::default();

    store.apply_trajectory_update(vec![trajectory(1), trajectory(2), trajectory(3)]);
    store.apply_trajectory_update(vec![trajectory(2), trajectory(9)]);

    let keys: Vec<i64> = store.trajectories().keys().copied().collect();
    assert_eq!(keys, vec![2, 9]);
}

#[test]
fn test_trajectory_update_empty_clears_map() {
    let mut store = StateStore::default();
    store.apply_trajectory_update(vec![trajectory(1)]);
    store.apply_trajectory_update(vec![]);
    assert!(store.trajectories().is_empty());
}

#[test]
fn test_merge_status_leaves_absent_keys() {
    let mut store = StateStore::default();
    store.merge_status(&status_map(json!({"vision": true, "control": true})));
    store.merge_status(&status_map(json!({"control": false})));

    let status = store.status();
    assert!(status.vision);
    assert!(!status.control);
    assert!(!status.strategy);
    assert!(!status.gui);
}

#[test]
fn test_merge_status_keeps_unknown_keys_and_skips_non_bool() {
    let mut store = StateStore::default();
    store.merge_status(&status_map(json!({"simulator": true, "vision": "yes", "referee": true})));

    let status = store.status();
    assert_eq!(status.extra.get("simulator"), Some(&true));
    assert!(!status.vision);
    assert!(status.strategy);
}

#[test]
fn test_reset_on_disconnect_leaves_extra_flags() {
    let mut store = StateStore::default();
    store.merge_status(&status_map(json!({
        "gui": true, "vision": true, "strategy": true, "control": true, "simulator": true
    })));

    store.reset_status_on_disconnect();

    let status = store.status();
    assert!(!status.gui);
    assert!(!status.vision);
    assert!(!status.strategy);
    assert!(!status.control);
    assert_eq!(status.extra.get("simulator"), Some(&true));
}

#[test]
fn test_set_status_flag_reports_change() {
    let mut store = StateStore::default();
    assert!(store.set_status_flag(StatusFlag::Vision, true));
    assert!(!store.set_status_flag(StatusFlag::Vision, true));
    assert!(store.set_status_flag(StatusFlag::Vision, false));
}

#[test]
fn test_change_notifications() {
    let mut store = StateStore::default();
    let mut rx = store.subscribe();

    store.apply_agents_update(Team::Blue, vec![agent(1, 0.0)]);
    store.apply_trajectory_update(vec![]);
    store.append_log(LogChannel::Referee, Local::now(), "HALT");

    assert_eq!(rx.try_recv().unwrap(), StoreChange::Agents(Team::Blue));
    assert_eq!(rx.try_recv().unwrap(), StoreChange::Trajectories);
    assert_eq!(rx.try_recv().unwrap(), StoreChange::Log(LogChannel::Referee));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_unchanged_flag_does_not_notify() {
    let mut store = StateStore::default();
    let mut rx = store.subscribe();

    store.set_status_flag(StatusFlag::Control, false);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_snapshot_copies_every_container() {
    let mut store = StateStore::default();
    store.apply_agents_update(Team::Yellow, vec![agent(1, 0.5)]);
    store.apply_objects_update(vec![Ball { id: Some(0), x: 0.0, y: 0.0 }]);
    store.apply_trajectory_update(vec![trajectory(1)]);
    store.set_position(Pose { x: 1.0, y: 2.0, angle: 0.3 });
    store.set_last_output(LogChannel::Vision, json!({"line": "cam0 ok"}));
    store.append_log_verbatim(LogChannel::Vision, Local::now(), "cam0 ok");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.yellow.len(), 1);
    assert_eq!(snapshot.balls.len(), 1);
    assert!(snapshot.trajectories.contains_key(&1));
    assert_eq!(snapshot.position.y, 2.0);
    assert_eq!(snapshot.last_output[&LogChannel::Vision], json!({"line": "cam0 ok"}));
    assert_eq!(snapshot.logs[&LogChannel::Vision], vec!["cam0 ok".to_string()]);
    assert!(snapshot.logs[&LogChannel::Referee].is_empty());

    let rendered = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(rendered["yellow"][0]["id"], json!(1));
    assert_eq!(rendered["status"]["gui"], json!(false));
}
