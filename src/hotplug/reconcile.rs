// SPDX-License-Identifier: GPL-3.0-only
//! Reconciliation loop
//!
//! Runs one pass at startup, then waits for output change notifications.
//! Every notification restarts the debounce window; a pass only runs once
//! the window elapses with no further notification. Passes run to
//! completion before the next notification is looked at.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::Notification;
use crate::apply::Apply;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::layout::{AutoPolicy, plan};
use crate::resolve::{MatchPolicy, TargetLayout, resolve};
use crate::topology::{Topology, TopologySource};

/// What a single pass ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The live layout already matched the target
    NothingToDo,
    /// This many directives were handed to the applier
    Applied(usize),
}

/// Owns the topology source, the applier and the debounce state
pub struct Reconciler<S, A> {
    source: S,
    applier: A,
    match_policy: MatchPolicy,
    auto_policy: AutoPolicy,
    debounce: Duration,
}

impl<S: TopologySource, A: Apply> Reconciler<S, A> {
    pub fn new(source: S, applier: A, config: &Config) -> Self {
        Self {
            source,
            applier,
            match_policy: config.match_policy,
            auto_policy: config.auto_policy(),
            debounce: config.debounce,
        }
    }

    /// Snapshot, resolve, plan and apply once
    pub fn reconcile(&mut self) -> Result<PassOutcome> {
        let topology = self.source.snapshot()?;
        for output in topology.outputs() {
            debug!("{}", topology.describe(output));
        }
        self.reconcile_with(&topology)
    }

    fn reconcile_with(&mut self, topology: &Topology) -> Result<PassOutcome> {
        let layout = resolve(topology, self.match_policy)?;
        match layout {
            TargetLayout::CommonMode(resolution) => info!("common mode found: {}", resolution),
            TargetLayout::AutoPerOutput => info!("no common mode, falling back to auto"),
        }

        let directives = plan(topology, layout, self.auto_policy)?;
        if directives.is_empty() {
            info!("nothing to do");
            return Ok(PassOutcome::NothingToDo);
        }

        for directive in &directives {
            info!("{}", directive);
        }
        self.applier.apply(&directives)?;

        Ok(PassOutcome::Applied(directives.len()))
    }

    /// First pass: log the whole topology, then establish a baseline layout
    fn startup(&mut self) -> Result<PassOutcome> {
        let topology = self.source.snapshot()?;
        for output in topology.outputs() {
            info!("{}", topology.describe(output));
        }
        self.reconcile_with(&topology)
    }

    fn log_pass(result: Result<PassOutcome>) {
        match result {
            Ok(PassOutcome::Applied(n)) => debug!("Applied {} directive(s)", n),
            Ok(PassOutcome::NothingToDo) => {}
            Err(e) => error!("Reconciliation pass aborted: {}", e),
        }
    }

    /// Run until the notification stream ends
    ///
    /// Per-pass failures are logged and never end the loop. The only way out
    /// is the stream closing, which means the topology source is gone.
    pub async fn run(mut self, mut events: mpsc::Receiver<Notification>) -> Result<()> {
        info!(
            "Starting reconciliation ({} matching, {:?} debounce)",
            self.match_policy, self.debounce
        );
        Self::log_pass(self.startup());

        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                notification = events.recv() => match notification {
                    Some(notification) if notification.is_topology_change() => {
                        if deadline.is_some() {
                            debug!("{}, restarting debounce window", notification);
                        } else {
                            info!("{}, waiting {:?} for outputs to settle", notification, self.debounce);
                        }
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(notification) => debug!("Ignoring {}", notification),
                    None => {
                        return Err(AppError::SourceUnavailable(
                            "notification stream ended".to_string(),
                        ));
                    }
                },
                () = settled(deadline) => {
                    deadline = None;
                    info!("Outputs settled, reconciling layout");
                    Self::log_pass(self.reconcile());
                }
            }
        }
    }
}

/// Resolves at `deadline`, or never when no debounce is pending
async fn settled(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
