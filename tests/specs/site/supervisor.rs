//! A whole site started from one configuration

use std::net::TcpListener;
use std::sync::Arc;

use kw_daemon::Site;

use crate::prelude::*;

/// A loopback port nobody is listening on right now
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn site_config(tables: &Tables) -> SiteConfig {
    let overseer_addr = loopback(free_port());
    let mut overseer = overseer_config(tables);
    overseer.bind = overseer_addr;
    SiteConfig {
        overseer,
        doors: vec![
            door_config("101", FailureMode::FailSafe, overseer_addr),
            door_config("102", FailureMode::FailSecure, overseer_addr),
        ],
        fire_unit: Some(fire_unit_config(overseer_addr, Vec::new())),
        log_path: None,
    }
}

#[tokio::test]
async fn site_registers_every_device() {
    let tables = Tables::new();
    let site = Site::start(site_config(&tables)).await.unwrap();

    assert_eq!(site.doors.len(), 2);
    let overseer = Arc::clone(&site.overseer);
    eventually("doors and fire unit registered", move || {
        overseer.inspect(|s| s.doors().len() == 2 && s.fire_unit_endpoints().len() == 1)
    })
    .await;

    let status = status(&site.overseer).await;
    assert!(status.contains("doors: 2"), "{status}");
    assert!(status.contains("fire units: 1"), "{status}");
    assert!(status.contains("security alarm: off"), "{status}");
}

#[tokio::test]
async fn site_serves_scans_end_to_end() {
    let tables = Tables::new();
    let site = Site::start(site_config(&tables)).await.unwrap();
    let overseer = Arc::clone(&site.overseer);
    eventually("door 102 registered", move || {
        overseer.inspect(|s| s.door("102").is_some())
    })
    .await;

    let answer = scan(site.overseer.local_addr(), "r2", "0f0f0f").await;
    assert_eq!(answer, Message::Allowed);

    let door = Arc::clone(&site.doors[1]);
    eventually("door 102 moved", move || {
        door.controller().status() != DoorStatus::Closed
    })
    .await;
}

#[tokio::test]
async fn site_fire_unit_learns_the_fail_safe_door() {
    let tables = Tables::new();
    let site = Site::start(site_config(&tables)).await.unwrap();
    let unit = Arc::clone(site.fire_unit.as_ref().unwrap());
    let endpoint = site.doors[0].local_addr();

    eventually("fail-safe door forwarded", move || {
        unit.doors() == vec![endpoint]
    })
    .await;
}

#[tokio::test]
async fn site_fails_fast_on_missing_tables() {
    let tables = Tables::new();
    let mut config = site_config(&tables);
    config.overseer.authorization_file = tables.authorizations.with_extension("missing");

    assert!(matches!(
        Site::start(config).await,
        Err(kw_daemon::LifecycleError::Table(_))
    ));
}
