// SPDX-License-Identifier: GPL-3.0-only
//! Turns a target layout into per-output directives
//!
//! Outputs already in the requested state get no directive, so an empty plan
//! means there is nothing to do.

use std::fmt;

use crate::error::Result;
use crate::resolve::TargetLayout;
use crate::topology::{ConnectionState, Resolution, Topology};

/// One instruction for one output, addressed by connector name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    SetMode { output: String, resolution: Resolution },
    SetAuto { output: String },
    Disable { output: String },
}

impl Directive {
    pub fn output(&self) -> &str {
        match self {
            Directive::SetMode { output, .. }
            | Directive::SetAuto { output }
            | Directive::Disable { output } => output,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::SetMode { output, resolution } => write!(f, "{output} -> {resolution}"),
            Directive::SetAuto { output } => write!(f, "{output} -> auto"),
            Directive::Disable { output } => write!(f, "{output} -> off"),
        }
    }
}

/// Behavior of [`TargetLayout::AutoPerOutput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPolicy {
    /// Send `SetAuto` even to outputs already on one of their preferred modes
    pub reassert: bool,
}

impl Default for AutoPolicy {
    fn default() -> Self {
        Self { reassert: true }
    }
}

/// Compute the directives that move `topology` to `layout`
pub fn plan(topology: &Topology, layout: TargetLayout, auto: AutoPolicy) -> Result<Vec<Directive>> {
    let mut directives = Vec::new();

    for output in topology.outputs() {
        match output.connection {
            ConnectionState::Connected => match layout {
                TargetLayout::CommonMode(resolution) => {
                    if topology.active_resolution(output)? == Some(resolution) {
                        debug!("{} already at {}", output.name, resolution);
                        continue;
                    }
                    directives.push(Directive::SetMode {
                        output: output.name.clone(),
                        resolution,
                    });
                }
                TargetLayout::AutoPerOutput => {
                    let on_preferred = output
                        .active_mode
                        .is_some_and(|mode| output.preferred_modes().contains(&mode));
                    if !auto.reassert && on_preferred {
                        debug!("{} already on a preferred mode", output.name);
                        continue;
                    }
                    directives.push(Directive::SetAuto {
                        output: output.name.clone(),
                    });
                }
            },
            ConnectionState::Disconnected if output.active_mode.is_some() => {
                directives.push(Directive::Disable {
                    output: output.name.clone(),
                });
            }
            ConnectionState::Disconnected | ConnectionState::Unknown => {}
        }
    }

    Ok(directives)
}
