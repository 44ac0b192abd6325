// SPDX-License-Identifier: GPL-3.0-only
//! Topology fixtures for unit tests

use super::{ConnectionState, Mode, ModeId, Output, Topology};

/// Builds a [`Topology`] from plain resolutions
///
/// Outputs get ids 1, 2, 3... in insertion order. Identical resolutions share
/// one mode id, like they do on a real server.
#[derive(Default)]
pub struct TopologyBuilder {
    modes: Vec<Mode>,
    outputs: Vec<Output>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(self, name: &str, modes: &[(u32, u32)]) -> Self {
        self.output(name, ConnectionState::Connected, modes, None)
    }

    pub fn output(
        mut self,
        name: &str,
        connection: ConnectionState,
        modes: &[(u32, u32)],
        active: Option<(u32, u32)>,
    ) -> Self {
        let mode_ids: Vec<_> = modes.iter().map(|&res| self.mode_id(res)).collect();
        let active_mode = active.map(|res| self.mode_id(res));
        let id = self.outputs.len() as u32 + 1;

        self.outputs.push(Output {
            id,
            name: name.to_string(),
            connection,
            active_mode,
            num_preferred: usize::from(!mode_ids.is_empty()),
            modes: mode_ids,
        });
        self
    }

    pub fn build(self) -> Topology {
        Topology::new(self.modes, self.outputs)
    }

    fn mode_id(&mut self, (width, height): (u32, u32)) -> ModeId {
        if let Some(mode) = self
            .modes
            .iter()
            .find(|m| m.width == width && m.height == height)
        {
            return mode.id;
        }

        let id = 100 + self.modes.len() as ModeId;
        self.modes.push(Mode {
            id,
            width,
            height,
            name: format!("{width}x{height}"),
        });
        id
    }
}
