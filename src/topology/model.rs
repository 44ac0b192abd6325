// SPDX-License-Identifier: GPL-3.0-only
//! Point-in-time snapshot of outputs and modes
//!
//! A [`Topology`] is built fresh for every reconciliation pass and dropped
//! afterwards. Nothing in it is ever mutated after construction.

use std::collections::HashMap;
use std::fmt;

use crate::error::{AppError, Result};

pub type ModeId = u32;
pub type OutputId = u32;

/// A width x height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` if both dimensions are strictly larger than `other`'s
    pub fn exceeds(&self, other: &Resolution) -> bool {
        self.width > other.width && self.height > other.height
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A mode an output can be driven at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub id: ModeId,
    pub width: u32,
    pub height: u32,
    /// Informational only (e.g. "1920x1080")
    pub name: String,
}

impl Mode {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Unknown,
}

impl ConnectionState {
    /// Map a RandR wire connection code
    pub fn from_raw(code: u8) -> Self {
        match code {
            0 => ConnectionState::Connected,
            1 => ConnectionState::Disconnected,
            _ => ConnectionState::Unknown,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Unknown => "unknown connection",
        })
    }
}

/// A display connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub id: OutputId,
    /// Connector name (e.g. "HDMI-1", "eDP-1")
    pub name: String,
    pub connection: ConnectionState,
    /// Mode currently driven, `None` when the output is disabled
    pub active_mode: Option<ModeId>,
    /// Supported modes in the source's preference order
    pub modes: Vec<ModeId>,
    /// How many leading entries of `modes` the source flags as preferred
    pub num_preferred: usize,
}

impl Output {
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Modes `--auto` would pick from: the flagged preferred ones, or the
    /// first supported mode when none are flagged
    pub fn preferred_modes(&self) -> &[ModeId] {
        let n = self.num_preferred.max(1).min(self.modes.len());
        &self.modes[..n]
    }
}

/// Immutable snapshot of every output and mode, taken in one query
#[derive(Debug, Clone, Default)]
pub struct Topology {
    modes: HashMap<ModeId, Mode>,
    outputs: Vec<Output>,
}

impl Topology {
    pub fn new(modes: impl IntoIterator<Item = Mode>, outputs: Vec<Output>) -> Self {
        Self {
            modes: modes.into_iter().map(|m| (m.id, m)).collect(),
            outputs,
        }
    }

    /// Outputs in the order the source reported them
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn connected(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter().filter(|o| o.is_connected())
    }

    pub fn mode(&self, id: ModeId) -> Option<&Mode> {
        self.modes.get(&id)
    }

    /// Resolve a mode referenced by `output`
    pub fn resolution(&self, output: &Output, mode: ModeId) -> Result<Resolution> {
        self.mode(mode)
            .map(Mode::resolution)
            .ok_or(AppError::UnknownMode {
                output: output.id,
                mode,
            })
    }

    /// Resolution the output is currently driven at, if it is enabled
    pub fn active_resolution(&self, output: &Output) -> Result<Option<Resolution>> {
        output
            .active_mode
            .map(|mode| self.resolution(output, mode))
            .transpose()
    }

    /// One log line: name, connection state, active mode, supported modes
    pub fn describe(&self, output: &Output) -> String {
        let mode_name = |id: ModeId| {
            self.mode(id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| format!("<unknown mode {id}>"))
        };

        let active = output
            .active_mode
            .map(mode_name)
            .unwrap_or_else(|| "disabled".to_string());
        let supported = output
            .modes
            .iter()
            .map(|&id| mode_name(id))
            .collect::<Vec<_>>()
            .join(", ");

        format!("{} {} {} [{}]", output.name, output.connection, active, supported)
    }
}
