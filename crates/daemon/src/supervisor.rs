// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A whole site in one process.
//!
//! Daemons start in dependency order: the overseer first, so doors and the
//! fire unit find it listening when they say hello.

use std::sync::Arc;

use kw_core::SiteConfig;
use tokio::task::JoinSet;
use tracing::info;

use crate::lifecycle::{
    startup_door, startup_fire_unit, startup_overseer, DaemonDoor, DaemonFireUnit,
    DaemonOverseer, LifecycleError,
};

pub struct Site {
    pub overseer: Arc<DaemonOverseer>,
    pub doors: Vec<Arc<DaemonDoor>>,
    pub fire_unit: Option<Arc<DaemonFireUnit>>,
    tasks: JoinSet<()>,
}

impl Site {
    /// Start every daemon described by `config`
    pub async fn start(config: SiteConfig) -> Result<Self, LifecycleError> {
        let mut tasks = JoinSet::new();

        let overseer = Arc::new(startup_overseer(config.overseer).await?);
        tasks.spawn({
            let overseer = Arc::clone(&overseer);
            async move { overseer.run().await }
        });

        let mut doors = Vec::with_capacity(config.doors.len());
        for door_config in config.doors {
            let door = Arc::new(startup_door(door_config).await?);
            tasks.spawn({
                let door = Arc::clone(&door);
                async move { door.run().await }
            });
            doors.push(door);
        }

        let fire_unit = match config.fire_unit {
            Some(unit_config) => {
                let unit = Arc::new(startup_fire_unit(unit_config).await?);
                tasks.spawn({
                    let unit = Arc::clone(&unit);
                    async move { unit.run().await }
                });
                Some(unit)
            }
            None => None,
        };

        info!(
            doors = doors.len(),
            fire_unit = fire_unit.is_some(),
            "site started"
        );

        Ok(Self {
            overseer,
            doors,
            fire_unit,
            tasks,
        })
    }

    /// Wait until any daemon task ends
    pub async fn run(&mut self) {
        if let Some(Err(e)) = self.tasks.join_next().await {
            tracing::error!(error = %e, "daemon task failed");
        }
    }
}
