//! A fire unit only forwards to doors the overseer vouches for

use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::prelude::*;

#[tokio::test]
async fn known_doors_are_confirmed_only_when_fail_safe() {
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

    let stranger = loopback(9);
    let known = vec![fail_secure.local_addr(), stranger, fail_safe.local_addr()];
    let unit = spawn_fire_unit(fire_unit_config(addr, known)).await;

    let forwarded = Arc::clone(&unit);
    let endpoint = fail_safe.local_addr();
    eventually("fail-safe door confirmed", move || {
        forwarded.doors().contains(&endpoint)
    })
    .await;

    // Unconfirmed candidates give up after their retries
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(unit.doors(), vec![fail_safe.local_addr()]);
}

#[tokio::test]
async fn door_registered_after_the_unit_is_pushed_to_it() {
    let tables = Tables::new();
    let overseer = spawn_overseer(overseer_config(&tables)).await;
    let addr = overseer.local_addr();
    let unit = spawn_fire_unit(fire_unit_config(addr, Vec::new())).await;
    let counted = Arc::clone(&overseer);
    eventually("fire unit registered", move || {
        counted.inspect(|s| !s.fire_unit_endpoints().is_empty())
    })
    .await;

    let door = spawn_door(door_config("101", FailureMode::FailSafe, addr)).await;

    let forwarded = Arc::clone(&unit);
    let endpoint = door.local_addr();
    eventually("late door forwarded", move || {
        forwarded.doors().contains(&endpoint)
    })
    .await;
}

#[tokio::test]
async fn overseer_answers_door_queries_over_udp() {
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

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut buf = [0u8; 64];

    let query = Datagram::Door(fail_safe.local_addr()).encode().unwrap();
    socket.send_to(&query, addr).await.unwrap();
    let (len, _) = tokio::time::timeout(TIMEOUT, socket.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        Datagram::decode(&buf[..len]).unwrap(),
        Datagram::DoorRegistered(fail_safe.local_addr())
    );

    let query = Datagram::Door(fail_secure.local_addr()).encode().unwrap();
    socket.send_to(&query, addr).await.unwrap();
    let silence =
        tokio::time::timeout(Duration::from_millis(200), socket.recv_from(&mut buf)).await;
    assert!(silence.is_err(), "fail-secure door must not be confirmed");
}
