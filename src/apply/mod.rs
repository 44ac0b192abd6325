// SPDX-License-Identifier: GPL-3.0-only
//! Layout application backends
//!
//! A backend receives the whole ordered directive list of a pass and applies
//! it as one request.

pub mod xrandr;

pub use xrandr::XrandrCommand;

use crate::error::Result;
use crate::layout::Directive;

/// Common trait for everything that can change the physical layout
pub trait Apply {
    /// Apply every directive in one request; failures are not retried
    fn apply(&mut self, directives: &[Directive]) -> Result<()>;
}
