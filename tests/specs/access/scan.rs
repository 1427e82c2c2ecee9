//! Card scans travel reader -> overseer -> door

use crate::prelude::*;

use std::sync::Arc;
use std::time::Duration;

async fn site_with_door(tables: &Tables) -> (Arc<DaemonOverseer>, Arc<DaemonDoor>) {
    let overseer = spawn_overseer(overseer_config(tables)).await;
    let config = door_config("101", FailureMode::FailSafe, overseer.local_addr());
    let door = spawn_door(config).await;
    let registered = Arc::clone(&overseer);
    eventually("door registered", move || {
        registered.inspect(|s| s.door("101").is_some())
    })
    .await;
    (overseer, door)
}

#[tokio::test]
async fn authorized_scan_opens_then_recloses_the_door() {
    let tables = Tables::new();
    let (overseer, door) = site_with_door(&tables).await;

    let answer = scan(overseer.local_addr(), "r1", "a1b2c3").await;
    assert_eq!(answer, Message::Allowed);

    let observed = Arc::clone(&door);
    eventually("door opened", move || {
        observed.controller().status() != DoorStatus::Closed
    })
    .await;
    let observed = Arc::clone(&door);
    eventually("door closed again", move || {
        observed.controller().status() == DoorStatus::Closed
    })
    .await;

    let reports = Arc::clone(&overseer);
    eventually("close reported", move || {
        reports.inspect(|s| {
            s.doors()
                .iter()
                .any(|d| d.record.id == "101" && d.last_report == Some(DoorReply::Closed))
        })
    })
    .await;
    assert!(door_list(&overseer).await.contains("CLOSED"));
}

#[tokio::test]
async fn unknown_code_is_denied_and_door_stays_closed() {
    let tables = Tables::new();
    let (overseer, door) = site_with_door(&tables).await;

    let answer = scan(overseer.local_addr(), "r1", "ffffff").await;
    assert_eq!(answer, Message::Denied);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(door.controller().status(), DoorStatus::Closed);
    assert_eq!(door.controller().latch(), None);
}

#[tokio::test]
async fn code_for_another_door_is_denied() {
    let tables = Tables::new();
    let (overseer, door) = site_with_door(&tables).await;

    // 0f0f0f only opens door 102; reader r1 controls 101
    let answer = scan(overseer.local_addr(), "r1", "0f0f0f").await;
    assert_eq!(answer, Message::Denied);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(door.controller().status(), DoorStatus::Closed);
}

#[tokio::test]
async fn authorized_code_at_unregistered_door_is_denied() {
    let tables = Tables::new();
    let overseer = spawn_overseer(overseer_config(&tables)).await;

    // r2 controls door 102, which never said hello
    let answer = scan(overseer.local_addr(), "r2", "a1b2c3").await;
    assert_eq!(answer, Message::Denied);
}

#[tokio::test]
async fn console_opens_and_closes_a_door_by_id() {
    let tables = Tables::new();
    let (overseer, door) = site_with_door(&tables).await;

    let opened = overseer
        .control(ControlCommand::DoorOpen("101".to_string()))
        .await;
    assert_eq!(opened, "door 101: OPENING# OPENED#");
    assert_eq!(door.controller().status(), DoorStatus::Open);

    let closed = overseer
        .control(ControlCommand::DoorClose("101".to_string()))
        .await;
    assert_eq!(closed, "door 101: CLOSING# CLOSED#");
    assert_eq!(door.controller().status(), DoorStatus::Closed);

    let unknown = overseer
        .control(ControlCommand::DoorOpen("999".to_string()))
        .await;
    assert_eq!(unknown, "unknown door 999");
}
