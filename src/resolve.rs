// SPDX-License-Identifier: GPL-3.0-only
//! Common mode resolution
//!
//! Decides whether every connected output can be driven at one shared
//! resolution. Candidates are taken from the first connected output (the
//! reference) in its own preference order, so the most preferred shared
//! resolution wins.
//!
//! Mode lists are expected to be ordered by preference, getting smaller as
//! they go. An entry larger than its predecessor in both dimensions marks
//! the end of the part of the list that can be trusted as a ranking.

use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::topology::{Output, Resolution, Topology};

/// How a candidate is matched against the other outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Only the monotonic preferred prefix of each output counts
    #[default]
    Strict,
    /// Any supported mode counts, wherever it sits in the list
    Loose,
}

impl FromStr for MatchPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(MatchPolicy::Strict),
            "loose" => Ok(MatchPolicy::Loose),
            other => Err(AppError::Config(format!(
                "unknown match policy {other:?}, expected \"strict\" or \"loose\""
            ))),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchPolicy::Strict => "strict",
            MatchPolicy::Loose => "loose",
        })
    }
}

/// The layout a reconciliation pass aims for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLayout {
    /// Every connected output at the same resolution
    CommonMode(Resolution),
    /// Every connected output picks its own preferred mode
    AutoPerOutput,
}

/// Leading modes of `output` up to the first ordering violation
pub fn preferred_prefix(topology: &Topology, output: &Output) -> Result<Vec<Resolution>> {
    let mut prefix: Vec<Resolution> = Vec::with_capacity(output.modes.len());

    for &mode in &output.modes {
        let resolution = topology.resolution(output, mode)?;
        if let Some(previous) = prefix.last() {
            if resolution.exceeds(previous) {
                trace!(
                    "{}: {} after {} breaks the preference order",
                    output.name, resolution, previous
                );
                break;
            }
        }
        prefix.push(resolution);
    }

    Ok(prefix)
}

fn candidates(topology: &Topology, output: &Output, policy: MatchPolicy) -> Result<Vec<Resolution>> {
    match policy {
        MatchPolicy::Strict => preferred_prefix(topology, output),
        MatchPolicy::Loose => output
            .modes
            .iter()
            .map(|&mode| topology.resolution(output, mode))
            .collect(),
    }
}

/// Pick the target layout for `topology`
pub fn resolve(topology: &Topology, policy: MatchPolicy) -> Result<TargetLayout> {
    let connected: Vec<&Output> = topology.connected().collect();
    let [reference, others @ ..] = connected.as_slice() else {
        return Ok(TargetLayout::AutoPerOutput);
    };
    if others.is_empty() {
        return Ok(TargetLayout::AutoPerOutput);
    }

    let others = others
        .iter()
        .map(|output| candidates(topology, output, policy))
        .collect::<Result<Vec<_>>>()?;

    for candidate in candidates(topology, reference, policy)? {
        if others.iter().all(|supported| supported.contains(&candidate)) {
            return Ok(TargetLayout::CommonMode(candidate));
        }
        trace!("{} is not shared by every output", candidate);
    }

    Ok(TargetLayout::AutoPerOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ConnectionState;
    use crate::topology::testing::TopologyBuilder;

    const FHD: (u32, u32) = (1920, 1080);
    const HD: (u32, u32) = (1280, 720);

    fn common(w: u32, h: u32) -> TargetLayout {
        TargetLayout::CommonMode(Resolution::new(w, h))
    }

    #[test]
    fn test_no_outputs() {
        let topology = TopologyBuilder::new().build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), TargetLayout::AutoPerOutput);
    }

    #[test]
    fn test_single_output_is_auto() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[FHD, HD])
            .output("HDMI-1", ConnectionState::Disconnected, &[FHD], Some(FHD))
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), TargetLayout::AutoPerOutput);
        assert_eq!(resolve(&topology, MatchPolicy::Loose).unwrap(), TargetLayout::AutoPerOutput);
    }

    #[test]
    fn test_shared_first_entry() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[(2560, 1600), HD])
            .connected("DP-1", &[(2560, 1600), FHD])
            .connected("DP-2", &[(2560, 1600)])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), common(2560, 1600));
    }

    #[test]
    fn test_common_mode_found() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[FHD, HD])
            .connected("HDMI-1", &[FHD])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), common(1920, 1080));
    }

    #[test]
    fn test_no_common_mode() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[FHD])
            .connected("HDMI-1", &[HD])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), TargetLayout::AutoPerOutput);
        assert_eq!(resolve(&topology, MatchPolicy::Loose).unwrap(), TargetLayout::AutoPerOutput);
    }

    #[test]
    fn test_most_preferred_shared_mode_wins() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[(2560, 1440), FHD, HD])
            .connected("HDMI-1", &[FHD, HD])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), common(1920, 1080));
    }

    #[test]
    fn test_reference_order_violation_stops_strict_search() {
        // 1280x720 comes after 800x600 and is larger in both dimensions
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[FHD, (800, 600), HD])
            .connected("HDMI-1", &[HD])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), TargetLayout::AutoPerOutput);
        assert_eq!(resolve(&topology, MatchPolicy::Loose).unwrap(), common(1280, 720));
    }

    #[test]
    fn test_other_output_order_violation() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[(2560, 1440), FHD, HD])
            .connected("HDMI-1", &[FHD, HD])
            .connected("VGA-1", &[HD, FHD])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), common(1280, 720));
        assert_eq!(resolve(&topology, MatchPolicy::Loose).unwrap(), common(1920, 1080));
    }

    #[test]
    fn test_one_growing_dimension_keeps_order() {
        let prefix_of = |modes: &[(u32, u32)]| {
            let topology = TopologyBuilder::new().connected("DP-1", modes).build();
            preferred_prefix(&topology, &topology.outputs()[0]).unwrap().len()
        };

        assert_eq!(prefix_of(&[FHD, (1920, 1200)]), 2);
        assert_eq!(prefix_of(&[(1280, 1024), (1440, 900)]), 2);
        assert_eq!(prefix_of(&[HD, FHD, (800, 600)]), 1);
    }

    #[test]
    fn test_disconnected_and_unknown_outputs_are_ignored() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[FHD, HD])
            .output("VGA-1", ConnectionState::Unknown, &[(1024, 768)], None)
            .output("HDMI-1", ConnectionState::Disconnected, &[HD], Some(HD))
            .connected("DP-1", &[FHD])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Strict).unwrap(), common(1920, 1080));
    }

    #[test]
    fn test_output_without_modes_never_matches() {
        let topology = TopologyBuilder::new()
            .connected("eDP-1", &[FHD, HD])
            .connected("DP-1", &[])
            .build();
        assert_eq!(resolve(&topology, MatchPolicy::Loose).unwrap(), TargetLayout::AutoPerOutput);
    }

    #[test]
    fn test_dangling_mode_aborts() {
        let mut outputs = TopologyBuilder::new()
            .connected("eDP-1", &[FHD])
            .connected("DP-1", &[FHD])
            .build()
            .outputs()
            .to_vec();
        outputs[1].modes.insert(0, 999);
        let topology = Topology::new(
            [crate::topology::Mode { id: 100, width: 1920, height: 1080, name: "1920x1080".into() }],
            outputs,
        );

        let err = resolve(&topology, MatchPolicy::Strict).unwrap_err();
        assert!(matches!(err, AppError::UnknownMode { output: 2, mode: 999 }));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<MatchPolicy>().unwrap(), MatchPolicy::Strict);
        assert_eq!("Loose".parse::<MatchPolicy>().unwrap(), MatchPolicy::Loose);
        assert!("fuzzy".parse::<MatchPolicy>().is_err());
    }
}
