//! The run loop: interleaves periodic inventory cycles with short-cadence
//! command polls inside one cooperative task, and owns the in-memory copy of
//! the known-vehicle set.

use crate::commands::Command;
use crate::config::Config;
use crate::diff;
use crate::extractor::Extractor;
use crate::messages;
use crate::model::InventoryState;
use crate::notifier::{CommandSource, Notifier};
use crate::store::InventoryStore;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// How often inbound commands are polled while waiting for the next
/// inventory check. Materially shorter than any sane check interval, so the
/// bot stays responsive mid-wait.
pub const MESSAGE_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Pause between consecutive notifications, respecting Telegram throughput
/// limits.
const SEND_PAUSE: Duration = Duration::from_secs(1);
/// Wait after a failed inventory cycle before the next attempt.
const FAILURE_COOLDOWN: Duration = Duration::from_secs(60);

/// What one inventory cycle did. Logged, and asserted on in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub skipped: bool,
    pub fetched: usize,
    /// Delivery attempts, not confirmed deliveries — a failed send still
    /// counts, matching the at-least-once semantic.
    pub attempted: usize,
}

pub struct Watcher {
    cfg: Config,
    store: InventoryStore,
    state: InventoryState,
    extractor: Box<dyn Extractor>,
    notifier: Box<dyn Notifier>,
    commands: Box<dyn CommandSource>,
    monitoring: bool,
    /// Set when the in-memory state is ahead of the persisted file; cleared
    /// by the next successful save.
    dirty: bool,
}

impl Watcher {
    pub async fn new(
        cfg: Config,
        store: InventoryStore,
        extractor: Box<dyn Extractor>,
        notifier: Box<dyn Notifier>,
        commands: Box<dyn CommandSource>,
    ) -> Self {
        let state = store.load().await;
        Self {
            cfg,
            store,
            state,
            extractor,
            notifier,
            commands,
            monitoring: true,
            dirty: false,
        }
    }

    pub fn monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn known_ids(&self) -> &HashSet<String> {
        &self.state.known
    }

    /// Drive the loop forever. Errors that escape a single pass pause the
    /// loop for longer than a full check interval, then it resumes.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            models = ?self.cfg.models,
            interval = self.cfg.check_interval,
            "watcher started"
        );
        if let Err(err) = self.notifier.notify(&messages::startup(&self.cfg)).await {
            warn!(?err, "failed to send startup message");
        }

        let check_interval = Duration::from_secs(self.cfg.check_interval);
        // The schedule survives a loop restart: a transient poll failure
        // must not make the next inventory check come early.
        let mut next_check = Instant::now();
        loop {
            if let Err(err) = self.run_schedule(check_interval, &mut next_check).await {
                error!(?err, "watcher loop error; cooling down");
                tokio::time::sleep(check_interval + FAILURE_COOLDOWN).await;
            }
        }
    }

    async fn run_schedule(
        &mut self,
        check_interval: Duration,
        next_check: &mut Instant,
    ) -> Result<()> {
        loop {
            if Instant::now() >= *next_check {
                match self.run_inventory_cycle().await {
                    Ok(report) if report.skipped => {
                        *next_check = Instant::now() + check_interval;
                    }
                    Ok(report) => {
                        info!(
                            fetched = report.fetched,
                            attempted = report.attempted,
                            "inventory cycle complete"
                        );
                        *next_check = Instant::now() + check_interval;
                    }
                    Err(err) => {
                        error!(?err, "inventory cycle failed");
                        *next_check = Instant::now() + FAILURE_COOLDOWN;
                    }
                }
            }
            self.poll_commands().await?;
            let wait = next_check
                .saturating_duration_since(Instant::now())
                .min(MESSAGE_POLL_INTERVAL);
            tokio::time::sleep(wait).await;
        }
    }

    /// One extract→diff→notify→persist pass. A fetch failure returns `Err`
    /// with the known set untouched, so a transient hiccup is never misread
    /// as "everything known is gone".
    pub async fn run_inventory_cycle(&mut self) -> Result<CycleReport> {
        if !self.monitoring {
            return Ok(CycleReport {
                skipped: true,
                ..CycleReport::default()
            });
        }

        let vehicles = self.extractor.fetch_inventory().await?;
        let new_ids = diff::new_vehicle_ids(&vehicles, &self.state.known);
        let mut attempted = 0;

        if new_ids.is_empty() {
            info!(fetched = vehicles.len(), "no new vehicles");
        } else {
            info!(count = new_ids.len(), "new vehicles found");
            for vehicle in vehicles.iter().filter(|v| new_ids.contains(&v.id)) {
                if let Err(err) = self
                    .notifier
                    .notify(&messages::vehicle_notification(vehicle))
                    .await
                {
                    // Delivery failure never blocks the remaining items or
                    // the state write; at worst we re-notify after a crash.
                    warn!(id = %vehicle.id, ?err, "failed to deliver notification");
                }
                attempted += 1;
                tokio::time::sleep(SEND_PAUSE).await;
            }
            self.state.known = diff::current_id_set(&vehicles);
            self.state.last_update = Some(Utc::now().naive_utc());
            self.dirty = true;
        }

        if self.dirty {
            self.try_save().await;
        }

        Ok(CycleReport {
            skipped: false,
            fetched: vehicles.len(),
            attempted,
        })
    }

    async fn try_save(&mut self) {
        match self.store.save(&self.state).await {
            Ok(()) => self.dirty = false,
            Err(err) => {
                warn!(?err, "failed to persist inventory state; will retry next cycle");
            }
        }
    }

    /// One message cycle: read the pending batch, dispatch whatever is
    /// command-shaped, then advance the offset exactly once — even when a
    /// dispatch failed — so no command ever runs twice.
    pub async fn poll_commands(&mut self) -> Result<()> {
        let batch = self.commands.read_pending().await?;
        let Some(last_id) = batch.last().map(|m| m.id) else {
            return Ok(());
        };
        for inbound in &batch {
            let Some(cmd) = Command::parse(&inbound.text) else {
                continue;
            };
            if let Err(err) = self.dispatch(cmd).await {
                warn!(?cmd, ?err, "command dispatch failed");
            }
        }
        self.commands.acknowledge(last_id).await?;
        Ok(())
    }

    async fn dispatch(&mut self, cmd: Command) -> Result<()> {
        info!(?cmd, "dispatching command");
        let reply = match cmd {
            Command::Stop => {
                self.monitoring = false;
                messages::stopped().to_string()
            }
            Command::Resume => {
                self.monitoring = true;
                messages::resumed().to_string()
            }
            Command::ManualSearch => self.manual_search().await,
            Command::Start | Command::Help => messages::help(),
            Command::Ping => messages::pong().to_string(),
            Command::Status => messages::status(&self.cfg, self.monitoring, &self.state),
            Command::ListModels => messages::model_list(&self.cfg.models),
            Command::Unknown => messages::unknown_command().to_string(),
        };
        self.notifier.notify(&reply).await
    }

    /// Diff-free on-demand report: exactly one reply whatever the extraction
    /// outcome, and no state mutation.
    async fn manual_search(&self) -> String {
        match self.extractor.fetch_inventory().await {
            Ok(vehicles) => messages::search_summary(&vehicles),
            Err(err) => messages::search_failed(&err),
        }
    }
}
