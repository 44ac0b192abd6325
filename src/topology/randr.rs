// SPDX-License-Identifier: GPL-3.0-only
//! X11 RandR topology source
//!
//! Reads screen resources, output info and CRTC info against a single
//! `config_timestamp` so outputs and modes never come from different
//! configurations.

use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use super::{ConnectionState, Mode, Output, Topology, TopologySource};
use crate::error::{AppError, Result};

/// Oldest RandR version providing `GetScreenResourcesCurrent`
const RANDR_MIN_VERSION: (u32, u32) = (1, 3);

/// Open a connection to `display` (or `$DISPLAY`) and check for RandR
///
/// Returns the connection and the root window of its default screen.
pub(crate) fn connect_randr(display: Option<&str>) -> Result<(RustConnection, Window)> {
    let (conn, screen_num) = x11rb::connect(display).map_err(|source| AppError::Open {
        display: display
            .map(str::to_owned)
            .or_else(|| std::env::var("DISPLAY").ok())
            .unwrap_or_default(),
        source,
    })?;

    if conn
        .extension_information(randr::X11_EXTENSION_NAME)?
        .is_none()
    {
        return Err(AppError::MissingExtension);
    }

    let version = conn
        .randr_query_version(RANDR_MIN_VERSION.0, RANDR_MIN_VERSION.1)?
        .reply()?;
    if (version.major_version, version.minor_version) < RANDR_MIN_VERSION {
        warn!(
            "RandR {}.{} is too old, need at least {}.{}",
            version.major_version, version.minor_version, RANDR_MIN_VERSION.0, RANDR_MIN_VERSION.1
        );
        return Err(AppError::MissingExtension);
    }

    let root = conn
        .setup()
        .roots
        .get(screen_num)
        .map(|screen| screen.root)
        .ok_or_else(|| AppError::SourceUnavailable(format!("screen {screen_num} does not exist")))?;

    debug!(
        "Connected to X server, RandR {}.{}, root window {:#x}",
        version.major_version, version.minor_version, root
    );
    Ok((conn, root))
}

/// Queries the live topology over a dedicated X connection
pub struct RandrTopology {
    conn: RustConnection,
    root: Window,
}

impl RandrTopology {
    pub fn connect(display: Option<&str>) -> Result<Self> {
        let (conn, root) = connect_randr(display)?;
        Ok(Self { conn, root })
    }
}

impl TopologySource for RandrTopology {
    fn snapshot(&mut self) -> Result<Topology> {
        let resources = self
            .conn
            .randr_get_screen_resources_current(self.root)?
            .reply()?;

        // Mode names are packed back to back in `names`
        let mut names = resources.names.as_slice();
        let mut modes = Vec::with_capacity(resources.modes.len());
        for info in &resources.modes {
            let (name, rest) = names.split_at(usize::from(info.name_len).min(names.len()));
            names = rest;
            modes.push(Mode {
                id: info.id,
                width: info.width.into(),
                height: info.height.into(),
                name: String::from_utf8_lossy(name).into_owned(),
            });
        }

        let mut outputs = Vec::with_capacity(resources.outputs.len());
        for &output in &resources.outputs {
            let info = self
                .conn
                .randr_get_output_info(output, resources.config_timestamp)?
                .reply()?;
            if info.status != randr::SetConfig::SUCCESS {
                return Err(AppError::SourceUnavailable(
                    "configuration changed while taking a snapshot".to_string(),
                ));
            }

            let active_mode = if info.crtc != x11rb::NONE {
                let crtc = self
                    .conn
                    .randr_get_crtc_info(info.crtc, resources.config_timestamp)?
                    .reply()?;
                Some(crtc.mode).filter(|&mode| mode != x11rb::NONE)
            } else {
                None
            };

            outputs.push(Output {
                id: output,
                name: String::from_utf8_lossy(&info.name).into_owned(),
                connection: ConnectionState::from_raw(u8::from(info.connection)),
                active_mode,
                modes: info.modes,
                num_preferred: usize::from(info.num_preferred),
            });
        }

        Ok(Topology::new(modes, outputs))
    }
}
