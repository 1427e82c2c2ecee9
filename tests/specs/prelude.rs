//! Shared helpers for the behavioral specs

#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kw_core::{Clock, SystemClock};
pub use kw_core::{
    DoorConfig, DoorReply, DoorStatus, FailureMode, FireUnitConfig, Latch, OverseerConfig,
    RegistryLimits, SiteConfig,
};
pub use kw_daemon::lifecycle::{
    startup_door, startup_fire_unit, startup_overseer, DaemonDoor, DaemonFireUnit,
    DaemonOverseer,
};
pub use kw_daemon::ControlCommand;
pub use kw_wire::{read_message, write_message, Datagram, Message, TempReading};
use tempfile::TempDir;
use tokio::io::BufReader;
use tokio::net::{TcpStream, UdpSocket};

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub const AUTHORIZATIONS: &str = "\
# code       doors
a1b2c3 DOOR:101 DOOR:102
0f0f0f DOOR:102
";

pub const CONNECTIONS: &str = "\
DOOR 101 r1
DOOR 102 r2
";

/// Authorization and connection tables in a temporary directory
pub struct Tables {
    _dir: TempDir,
    pub authorizations: PathBuf,
    pub connections: PathBuf,
}

impl Tables {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let authorizations = dir.path().join("authorisation.txt");
        let connections = dir.path().join("connections.txt");
        std::fs::write(&authorizations, AUTHORIZATIONS).unwrap();
        std::fs::write(&connections, CONNECTIONS).unwrap();
        Self {
            _dir: dir,
            authorizations,
            connections,
        }
    }
}

pub fn loopback(port: u16) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)
}

pub fn overseer_config(tables: &Tables) -> OverseerConfig {
    OverseerConfig {
        bind: loopback(0),
        door_open_duration: Duration::from_millis(50),
        datagram_resend_delay: Duration::from_millis(20),
        fire_alarm_repeats: 2,
        authorization_file: tables.authorizations.clone(),
        connections_file: tables.connections.clone(),
        limits: RegistryLimits::default(),
        io_timeout: TIMEOUT,
        log_path: None,
    }
}

pub fn door_config(id: &str, mode: FailureMode, overseer: SocketAddrV4) -> DoorConfig {
    DoorConfig {
        id: id.to_string(),
        bind: loopback(0),
        mode,
        overseer,
        actuation_delay: Duration::from_millis(10),
        report_to_overseer: true,
        io_timeout: TIMEOUT,
        log_path: None,
    }
}

pub fn fire_unit_config(
    overseer: SocketAddrV4,
    known_doors: Vec<SocketAddrV4>,
) -> FireUnitConfig {
    FireUnitConfig {
        bind: loopback(0),
        temp_threshold: 60.0,
        min_detections: 3,
        detection_period: Duration::from_secs(5),
        overseer,
        resend_delay: Duration::from_millis(20),
        known_doors,
        io_timeout: TIMEOUT,
        log_path: None,
    }
}

pub async fn spawn_overseer(config: OverseerConfig) -> Arc<DaemonOverseer> {
    let overseer = Arc::new(startup_overseer(config).await.unwrap());
    let runner = Arc::clone(&overseer);
    tokio::spawn(async move { runner.run().await });
    overseer
}

pub async fn spawn_door(config: DoorConfig) -> Arc<DaemonDoor> {
    let door = Arc::new(startup_door(config).await.unwrap());
    let runner = Arc::clone(&door);
    tokio::spawn(async move { runner.run().await });
    door
}

pub async fn spawn_fire_unit(config: FireUnitConfig) -> Arc<DaemonFireUnit> {
    let unit = Arc::new(startup_fire_unit(config).await.unwrap());
    let runner = Arc::clone(&unit);
    tokio::spawn(async move { runner.run().await });
    unit
}

/// Poll `check` until it holds, failing after a few seconds
pub async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..300 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("never happened: {what}");
}

/// One card-reader round trip
pub async fn scan(overseer: SocketAddrV4, reader: &str, code: &str) -> Message {
    let stream = TcpStream::connect(overseer).await.unwrap();
    let (reader_half, mut writer) = stream.into_split();
    let scan = Message::Scanned {
        reader: reader.to_string(),
        code: code.to_string(),
    };
    write_message(&mut writer, &scan, TIMEOUT).await.unwrap();
    read_message(&mut BufReader::new(reader_half), TIMEOUT)
        .await
        .unwrap()
}

/// Send one datagram from an ephemeral socket
pub async fn send_datagram(to: SocketAddrV4, datagram: Datagram) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket
        .send_to(&datagram.encode().unwrap(), to)
        .await
        .unwrap();
}

/// Overseer `STATUS` output
pub async fn status(overseer: &DaemonOverseer) -> String {
    overseer.control(ControlCommand::Status).await
}

/// Current wall-clock time in microseconds, as a sensor would stamp it
pub fn now_micros() -> u64 {
    SystemClock.now_micros()
}

/// Overseer `DOOR LIST` output
pub async fn door_list(overseer: &DaemonOverseer) -> String {
    overseer.control(ControlCommand::DoorList).await
}
