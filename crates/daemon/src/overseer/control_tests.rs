// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use kw_adapters::{FakeDoorLink, FakeRegistrar};
use kw_core::{DoorRecord, FailureMode, OverseerConfig, RegistryLimits};
use kw_storage::{AuthorizationTable, ConnectionTable};
use kw_wire::TempReading;
use yare::parameterized;

use crate::overseer::OverseerState;

#[parameterized(
    door_list = { "DOOR LIST", ControlCommand::DoorList },
    door_open = { "DOOR OPEN 101", ControlCommand::DoorOpen("101".into()) },
    door_close = { "DOOR CLOSE 7", ControlCommand::DoorClose("7".into()) },
    fire_alarm = { "FIRE ALARM", ControlCommand::FireAlarm },
    security_alarm = { "SECURITY ALARM", ControlCommand::SecurityAlarm },
    temp_list = { "TEMP LIST", ControlCommand::TempList },
    status = { "STATUS", ControlCommand::Status },
    help = { "HELP", ControlCommand::Help },
    extra_whitespace = { "  DOOR   LIST \n", ControlCommand::DoorList },
)]
fn parses(line: &str, expected: ControlCommand) {
    assert_eq!(line.parse::<ControlCommand>().unwrap(), expected);
}

#[parameterized(
    empty = { "" },
    lowercase = { "door list" },
    missing_id = { "DOOR OPEN" },
    extra_token = { "FIRE ALARM NOW" },
    unknown = { "EXIT" },
)]
fn rejects(line: &str) {
    assert!(matches!(
        line.parse::<ControlCommand>(),
        Err(ControlError::Invalid(_))
    ));
}

fn endpoint(port: u16) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)
}

fn context(
    link: FakeDoorLink,
    registrar: FakeRegistrar,
) -> OverseerContext<FakeDoorLink, FakeRegistrar> {
    let config = OverseerConfig {
        bind: endpoint(0),
        door_open_duration: Duration::from_millis(10),
        datagram_resend_delay: Duration::from_millis(1),
        fire_alarm_repeats: 3,
        authorization_file: PathBuf::from("auth.txt"),
        connections_file: PathBuf::from("conn.txt"),
        limits: RegistryLimits::default(),
        io_timeout: Duration::from_secs(1),
        log_path: None,
    };
    let mut state = OverseerState::new(config.limits);
    state
        .register_door(DoorRecord::new("1", endpoint(4001), FailureMode::FailSafe))
        .unwrap();
    state
        .register_door(DoorRecord::new("2", endpoint(4002), FailureMode::FailSecure))
        .unwrap();
    OverseerContext {
        config,
        state: Mutex::new(state),
        authorizations: AuthorizationTable::parse(Path::new("auth.txt"), "").unwrap(),
        connections: ConnectionTable::parse(Path::new("conn.txt"), "").unwrap(),
        link,
        registrar,
    }
}

#[tokio::test]
async fn door_open_commands_the_door() {
    let link = FakeDoorLink::new();
    let ctx = context(link.clone(), FakeRegistrar::new());

    let out = execute(&ctx, ControlCommand::DoorOpen("1".into())).await;

    assert_eq!(out, "door 1: OPENING# OPENED#");
    assert_eq!(link.commands_to(endpoint(4001)), vec![DoorCommand::Open]);
}

#[tokio::test]
async fn unknown_door_is_reported() {
    let link = FakeDoorLink::new();
    let ctx = context(link.clone(), FakeRegistrar::new());

    let out = execute(&ctx, ControlCommand::DoorClose("9".into())).await;

    assert_eq!(out, "unknown door 9");
    assert!(link.calls().is_empty());
}

#[tokio::test]
async fn unreachable_door_is_reported_not_fatal() {
    let link = FakeDoorLink::new();
    link.set_unreachable(endpoint(4001));
    let ctx = context(link, FakeRegistrar::new());

    let out = execute(&ctx, ControlCommand::DoorOpen("1".into())).await;

    assert!(out.starts_with("door 1: failed to connect"), "{out}");
}

#[tokio::test]
async fn fire_alarm_repeats_to_every_unit() {
    let registrar = FakeRegistrar::new();
    let ctx = context(FakeDoorLink::new(), registrar.clone());
    ctx.lock().register_fire_unit(endpoint(5000)).unwrap();
    ctx.lock().register_fire_unit(endpoint(5001)).unwrap();

    let out = execute(&ctx, ControlCommand::FireAlarm).await;

    assert_eq!(out, "FIRE sent 3 time(s) to 2 unit(s), 0 failed");
    assert_eq!(registrar.fires_sent_to(endpoint(5000)), 3);
    assert_eq!(registrar.fires_sent_to(endpoint(5001)), 3);
}

#[tokio::test]
async fn fire_alarm_without_units() {
    let ctx = context(FakeDoorLink::new(), FakeRegistrar::new());
    assert_eq!(
        execute(&ctx, ControlCommand::FireAlarm).await,
        "no fire unit registered"
    );
}

#[tokio::test]
async fn security_alarm_secures_fail_secure_doors_only() {
    let link = FakeDoorLink::new();
    let ctx = context(link.clone(), FakeRegistrar::new());

    let out = execute(&ctx, ControlCommand::SecurityAlarm).await;

    assert!(out.contains("door 2: SECURE_MODE#"), "{out}");
    assert_eq!(link.commands_to(endpoint(4002)), vec![DoorCommand::CloseSecure]);
    assert!(link.commands_to(endpoint(4001)).is_empty());
    assert!(execute(&ctx, ControlCommand::Status)
        .await
        .contains("security alarm: on"));
}

#[tokio::test]
async fn door_list_shows_every_door() {
    let ctx = context(FakeDoorLink::new(), FakeRegistrar::new());
    ctx.lock().record_report("2", DoorReply::Closed);

    let out = execute(&ctx, ControlCommand::DoorList).await;

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "ID\tENDPOINT\tMODE\tLAST",
            "1\t127.0.0.1:4001\tFAIL_SAFE\t-",
            "2\t127.0.0.1:4002\tFAIL_SECURE\tCLOSED",
        ]
    );
}

#[tokio::test]
async fn temp_list_shows_latest_readings() {
    let ctx = context(FakeDoorLink::new(), FakeRegistrar::new());
    ctx.lock().record_temp(TempReading {
        recorded_at: 42,
        temperature: 21.5,
        sensor_id: 3,
        relays: Vec::new(),
    });

    let out = execute(&ctx, ControlCommand::TempList).await;

    assert_eq!(out, "SENSOR\tTEMP\tRECORDED_AT_US\n3\t21.5\t42");
}
