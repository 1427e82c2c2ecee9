// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup with the concrete adapter stack.

use std::net::{SocketAddr, SocketAddrV4};

use kw_adapters::{TcpDoorLink, TracedDoorLink, TracedRegistrar, UdpRegistrar};
use kw_core::{ConfigError, DoorConfig, FireUnitConfig, OverseerConfig, SystemClock};
use kw_storage::StorageError;
use thiserror::Error;
use tokio::net::{TcpListener, UdpSocket};
use tracing::info;

use crate::door::DoorDaemon;
use crate::fire::FireUnit;
use crate::overseer::Overseer;

/// Door link used by the daemons (wrapped with tracing)
pub type DaemonLink = TracedDoorLink<TcpDoorLink>;

/// Registrar used by the daemons (wrapped with tracing)
pub type DaemonRegistrar = TracedRegistrar<UdpRegistrar>;

pub type DaemonOverseer = Overseer<DaemonLink, DaemonRegistrar>;
pub type DaemonDoor = DoorDaemon<DaemonLink>;
pub type DaemonFireUnit = FireUnit<DaemonLink, DaemonRegistrar, SystemClock>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(SocketAddrV4, #[source] std::io::Error),

    #[error("Bound address {0} is not IPv4")]
    NotIpv4(SocketAddr),

    #[error("Table error: {0}")]
    Table(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn ipv4(addr: SocketAddr) -> Result<SocketAddrV4, LifecycleError> {
    match addr {
        SocketAddr::V4(addr) => Ok(addr),
        SocketAddr::V6(_) => Err(LifecycleError::NotIpv4(addr)),
    }
}

pub(crate) async fn bind_tcp(
    addr: SocketAddrV4,
) -> Result<(TcpListener, SocketAddrV4), LifecycleError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(addr, e))?;
    let local = ipv4(listener.local_addr()?)?;
    Ok((listener, local))
}

pub(crate) async fn bind_udp(
    addr: SocketAddrV4,
) -> Result<(UdpSocket, SocketAddrV4), LifecycleError> {
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(addr, e))?;
    let local = ipv4(socket.local_addr()?)?;
    Ok((socket, local))
}

/// Start the overseer
pub async fn startup_overseer(config: OverseerConfig) -> Result<DaemonOverseer, LifecycleError> {
    let link = TracedDoorLink::new(TcpDoorLink::new(config.io_timeout));
    let registrar = TracedRegistrar::new(UdpRegistrar::new(config.datagram_resend_delay));
    let overseer = Overseer::start(config, link, registrar).await?;
    info!(addr = %overseer.local_addr(), "overseer started");
    Ok(overseer)
}

/// Start a door controller
pub async fn startup_door(config: DoorConfig) -> Result<DaemonDoor, LifecycleError> {
    let link = TracedDoorLink::new(TcpDoorLink::new(config.io_timeout));
    let door = DoorDaemon::start(config, link).await?;
    info!(door_id = %door.id(), addr = %door.local_addr(), "door started");
    Ok(door)
}

/// Start the fire-detection unit
pub async fn startup_fire_unit(config: FireUnitConfig) -> Result<DaemonFireUnit, LifecycleError> {
    let link = TracedDoorLink::new(TcpDoorLink::new(config.io_timeout));
    let registrar = TracedRegistrar::new(UdpRegistrar::new(config.resend_delay));
    let unit = FireUnit::start(config, link, registrar, SystemClock).await?;
    info!(addr = %unit.local_addr(), "fire unit started");
    Ok(unit)
}
