// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::net::Ipv4Addr;
use std::time::Duration;

use kw_adapters::{FakeDoorLink, TcpDoorLink};
use kw_core::{DoorCommand, DoorReply, FailureMode};
use kw_wire::{read_message, write_message};
use tokio::io::BufReader;
use tokio::net::TcpStream;

const TIMEOUT: Duration = Duration::from_secs(2);

fn overseer() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000)
}

fn config(report: bool) -> DoorConfig {
    DoorConfig {
        id: "101".into(),
        bind: SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0),
        mode: FailureMode::FailSafe,
        overseer: overseer(),
        actuation_delay: Duration::from_millis(10),
        report_to_overseer: report,
        io_timeout: TIMEOUT,
        log_path: None,
    }
}

async fn running_door(report: bool) -> (Arc<DoorDaemon<FakeDoorLink>>, FakeDoorLink) {
    let link = FakeDoorLink::new();
    let door = Arc::new(DoorDaemon::start(config(report), link.clone()).await.unwrap());
    let runner = Arc::clone(&door);
    tokio::spawn(async move { runner.run().await });
    (door, link)
}

/// Wait until the report for `reply` reaches the fake overseer
async fn wait_for_report(link: &FakeDoorLink, reply: DoorReply) {
    let expected = Message::DoorReport {
        id: "101".into(),
        reply,
    };
    for _ in 0..100 {
        if link.notifications_to(overseer()).contains(&expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no {reply} report in {:?}", link.calls());
}

#[tokio::test]
async fn start_announces_door_to_overseer() {
    let (door, link) = running_door(true).await;

    assert_eq!(
        link.notifications_to(overseer()),
        vec![Message::DoorHello {
            id: "101".into(),
            endpoint: door.local_addr(),
            mode: FailureMode::FailSafe,
        }]
    );
    assert_eq!(door.controller().status(), DoorStatus::Closed);
}

#[tokio::test]
async fn open_over_tcp_replies_and_reports() {
    let (door, link) = running_door(true).await;
    let client = TcpDoorLink::new(TIMEOUT);

    let replies = client
        .command(door.local_addr(), DoorCommand::Open)
        .await
        .unwrap();

    assert_eq!(replies, vec![DoorReply::Opening, DoorReply::Opened]);
    assert_eq!(door.controller().status(), DoorStatus::Open);
    wait_for_report(&link, DoorReply::Opened).await;
}

#[tokio::test]
async fn reports_can_be_disabled() {
    let (door, link) = running_door(false).await;
    let client = TcpDoorLink::new(TIMEOUT);

    client
        .command(door.local_addr(), DoorCommand::Open)
        .await
        .unwrap();

    // Only the hello
    assert_eq!(link.notifications_to(overseer()).len(), 1);
}

#[tokio::test]
async fn emergency_connection_stays_open_and_refuses_close() {
    let (door, _link) = running_door(true).await;

    let stream = TcpStream::connect(door.local_addr()).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let emergency = Message::Command(DoorCommand::OpenEmergency);
    write_message(&mut writer, &emergency, TIMEOUT).await.unwrap();
    assert_eq!(
        read_message(&mut reader, TIMEOUT).await.unwrap(),
        Message::Reply(DoorReply::EmergencyMode)
    );

    for _ in 0..2 {
        let close = Message::Command(DoorCommand::Close);
        write_message(&mut writer, &close, TIMEOUT).await.unwrap();
        assert_eq!(
            read_message(&mut reader, TIMEOUT).await.unwrap(),
            Message::Reply(DoorReply::EmergencyMode)
        );
    }

    // Other connections are refused too
    let replies = TcpDoorLink::new(TIMEOUT)
        .command(door.local_addr(), DoorCommand::Close)
        .await
        .unwrap();
    assert_eq!(replies, vec![DoorReply::EmergencyMode]);
    assert_eq!(door.controller().status(), DoorStatus::Open);
}

#[tokio::test]
async fn non_command_closes_without_response() {
    let (door, _link) = running_door(true).await;

    let stream = TcpStream::connect(door.local_addr()).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    write_message(&mut writer, &Message::Denied, TIMEOUT)
        .await
        .unwrap();

    assert!(matches!(
        read_message(&mut reader, TIMEOUT).await,
        Err(kw_wire::ProtocolError::ConnectionClosed)
    ));
    assert_eq!(door.controller().status(), DoorStatus::Closed);
}

#[tokio::test]
async fn garbage_closes_without_response() {
    let (door, _link) = running_door(true).await;

    let mut stream = TcpStream::connect(door.local_addr()).await.unwrap();
    tokio::io::AsyncWriteExt::write_all(&mut stream, b"OPEN THE POD BAY DOORS#")
        .await
        .unwrap();

    let mut reader = BufReader::new(stream);
    assert!(matches!(
        read_message(&mut reader, TIMEOUT).await,
        Err(kw_wire::ProtocolError::ConnectionClosed)
    ));
}
