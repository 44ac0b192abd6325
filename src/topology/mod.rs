mod model;
mod randr;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use randr::connect_randr;

pub use model::{ConnectionState, Mode, ModeId, Output, OutputId, Resolution, Topology};
pub use randr::RandrTopology;

use crate::error::Result;

/// Something that can report the current output topology
pub trait TopologySource {
    /// Take a fresh, self-consistent snapshot
    fn snapshot(&mut self) -> Result<Topology>;
}
