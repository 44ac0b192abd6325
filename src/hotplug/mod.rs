// SPDX-License-Identifier: GPL-3.0-only
/// Output hotplug detection using RandR notifications
///
/// A blocking thread waits for X events and forwards them over a channel to
/// the reconciliation loop, which debounces them into layout passes.

mod randr_monitor;
mod reconcile;

pub use randr_monitor::RandrMonitor;
pub use reconcile::Reconciler;

use std::fmt;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::topology::{ConnectionState, OutputId};

/// Capacity of the channel between the event thread and the loop
const NOTIFICATION_QUEUE: usize = 100;

/// One event from the topology source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// An output was plugged, unplugged or reconfigured
    OutputChanged {
        output: OutputId,
        connection: ConnectionState,
    },
    /// Anything else the source delivered
    Ignored { what: String },
}

impl Notification {
    pub fn is_topology_change(&self) -> bool {
        matches!(self, Notification::OutputChanged { .. })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::OutputChanged { output, connection } => {
                write!(f, "output {output:#x} {connection}")
            }
            Notification::Ignored { what } => f.write_str(what),
        }
    }
}

/// Run `monitor` on a dedicated thread and return the notification stream
///
/// The stream ends when the monitor's X connection dies.
pub fn spawn_monitor(monitor: RandrMonitor) -> Result<mpsc::Receiver<Notification>> {
    let (tx, rx) = mpsc::channel(NOTIFICATION_QUEUE);

    std::thread::Builder::new()
        .name("randr-events".to_string())
        .spawn(move || {
            let err = monitor.run(|notification| match tx.try_send(notification) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!("Notification channel full, skipping event (will debounce)");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    error!("Notification channel closed, stopping monitor");
                    false
                }
            });

            error!("Output hotplug monitoring stopped: {}", err);
        })?;

    Ok(rx)
}
