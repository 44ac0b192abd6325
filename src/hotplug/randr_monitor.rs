// SPDX-License-Identifier: GPL-3.0-only
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::rust_connection::RustConnection;

use super::Notification;
use crate::error::{AppError, Result};
use crate::topology::{ConnectionState, connect_randr};

/// Listens for RandR output change notifications
///
/// Owns its own X connection and runs on a dedicated blocking thread, since
/// `wait_for_event` never yields.
pub struct RandrMonitor {
    conn: RustConnection,
}

impl RandrMonitor {
    /// Open `display` and subscribe to output changes on its root window
    pub fn open(display: Option<&str>) -> Result<Self> {
        let (conn, root) = connect_randr(display)?;
        conn.randr_select_input(root, randr::NotifyMask::OUTPUT_CHANGE)?
            .check()?;

        Ok(Self { conn })
    }

    /// Run the monitoring loop, calling the callback for each event
    ///
    /// Blocks until the connection fails or the callback returns `false`.
    pub fn run<F>(self, mut callback: F) -> AppError
    where
        F: FnMut(Notification) -> bool, // Returns true to continue, false to stop
    {
        info!("Output hotplug monitoring started");

        loop {
            let event = match self.conn.wait_for_event() {
                Ok(event) => event,
                Err(e) => {
                    error!("Lost X connection: {}", e);
                    return e.into();
                }
            };

            let notification = match event {
                Event::RandrNotify(notify) if notify.sub_code == randr::Notify::OUTPUT_CHANGE => {
                    let change = notify.u.as_oc();
                    Notification::OutputChanged {
                        output: change.output,
                        connection: ConnectionState::from_raw(u8::from(change.connection)),
                    }
                }
                Event::RandrNotify(notify) => Notification::Ignored {
                    what: format!("RandR notify subtype {}", u8::from(notify.sub_code)),
                },
                Event::Error(err) => {
                    warn!("X error: {:?}", err);
                    continue;
                }
                other => {
                    let debug = format!("{other:?}");
                    Notification::Ignored {
                        what: debug.split('(').next().unwrap_or_default().to_string(),
                    }
                }
            };

            if !callback(notification) {
                info!("Output hotplug monitoring stopped by callback");
                return AppError::SourceUnavailable("notification receiver closed".to_string());
            }
        }
    }
}
