//! Fire and security alarms reach the doors whose failure mode calls for it

use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;

struct Site {
    _tables: Tables,
    overseer: Arc<DaemonOverseer>,
    fail_safe: Arc<DaemonDoor>,
    fail_secure: Arc<DaemonDoor>,
    unit: Arc<DaemonFireUnit>,
}

/// Overseer, one door of each mode and a fire unit that has learned about
/// the fail-safe door
async fn site() -> Site {
    let tables = Tables::new();
    let overseer = spawn_overseer(overseer_config(&tables)).await;
    let addr = overseer.local_addr();
    let fail_safe = spawn_door(door_config("101", FailureMode::FailSafe, addr)).await;
    let fail_secure = spawn_door(door_config("102", FailureMode::FailSecure, addr)).await;
    let registered = Arc::clone(&overseer);
    eventually("both doors registered", move || {
        registered.inspect(|s| s.door("101").is_some() && s.door("102").is_some())
    })
    .await;
    let unit = spawn_fire_unit(fire_unit_config(addr, Vec::new())).await;

    let forwarded = Arc::clone(&unit);
    let endpoint = fail_safe.local_addr();
    eventually("fail-safe door forwarded to fire unit", move || {
        forwarded.doors().contains(&endpoint)
    })
    .await;

    Site {
        _tables: tables,
        overseer,
        fail_safe,
        fail_secure,
        unit,
    }
}

#[tokio::test]
async fn only_fail_safe_doors_are_forwarded() {
    let site = site().await;

    // Give a stray push time to land before asserting its absence
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(site.unit.doors(), vec![site.fail_safe.local_addr()]);
    assert!(status(&site.overseer).await.contains("fire units: 1"));
}

#[tokio::test]
async fn fire_datagram_latches_fail_safe_doors_open() {
    let site = site().await;

    send_datagram(site.unit.local_addr(), Datagram::Fire).await;

    let door = Arc::clone(&site.fail_safe);
    eventually("fail-safe door in emergency mode", move || {
        door.controller().latch() == Some(Latch::EmergencyOpen)
    })
    .await;
    let door = Arc::clone(&site.fail_safe);
    eventually("fail-safe door open", move || {
        door.controller().status() == DoorStatus::Open
    })
    .await;

    assert!(*site.unit.alarm().borrow());
    assert_eq!(site.fail_secure.controller().latch(), None);
    assert_eq!(site.fail_secure.controller().status(), DoorStatus::Closed);
}

#[tokio::test]
async fn latched_door_refuses_to_close() {
    let site = site().await;
    send_datagram(site.unit.local_addr(), Datagram::Fire).await;
    let door = Arc::clone(&site.fail_safe);
    eventually("fail-safe door open", move || {
        door.controller().status() == DoorStatus::Open
    })
    .await;

    let answer = site
        .overseer
        .control(ControlCommand::DoorClose("101".to_string()))
        .await;
    assert_eq!(answer, "door 101: EMERGENCY_MODE#");
    assert_eq!(site.fail_safe.controller().status(), DoorStatus::Open);
}

#[tokio::test]
async fn sustained_hot_readings_raise_the_alarm() {
    let site = site().await;

    for _ in 0..3 {
        let reading = TempReading {
            recorded_at: now_micros(),
            temperature: 85.0,
            sensor_id: 4,
            relays: Vec::new(),
        };
        send_datagram(site.unit.local_addr(), Datagram::Temp(reading)).await;
    }

    let door = Arc::clone(&site.fail_safe);
    eventually("fail-safe door in emergency mode", move || {
        door.controller().latch() == Some(Latch::EmergencyOpen)
    })
    .await;
}

#[tokio::test]
async fn cool_readings_leave_doors_alone() {
    let site = site().await;

    for sensor_id in 0..5 {
        let reading = TempReading {
            recorded_at: now_micros(),
            temperature: 21.5,
            sensor_id,
            relays: Vec::new(),
        };
        send_datagram(site.unit.local_addr(), Datagram::Temp(reading)).await;
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!*site.unit.alarm().borrow());
    assert_eq!(site.fail_safe.controller().latch(), None);
}

#[tokio::test]
async fn console_fire_alarm_reaches_the_unit() {
    let site = site().await;

    let answer = site.overseer.control(ControlCommand::FireAlarm).await;
    assert_eq!(answer, "FIRE sent 2 time(s) to 1 unit(s), 0 failed");

    let door = Arc::clone(&site.fail_safe);
    eventually("fail-safe door in emergency mode", move || {
        door.controller().latch() == Some(Latch::EmergencyOpen)
    })
    .await;
}

#[tokio::test]
async fn security_alarm_latches_fail_secure_doors_closed() {
    let site = site().await;

    let answer = site.overseer.control(ControlCommand::SecurityAlarm).await;
    assert_eq!(
        answer,
        "security alarm raised, 1 fail-secure door(s)\ndoor 102: SECURE_MODE#"
    );
    assert_eq!(
        site.fail_secure.controller().latch(),
        Some(Latch::SecureClosed)
    );
    assert_eq!(site.fail_safe.controller().latch(), None);
    assert!(status(&site.overseer).await.contains("security alarm: on"));

    // The secured door refuses to open
    let opened = site
        .overseer
        .control(ControlCommand::DoorOpen("102".to_string()))
        .await;
    assert_eq!(opened, "door 102: SECURE_MODE#");
    assert_eq!(site.fail_secure.controller().status(), DoorStatus::Closed);
}
