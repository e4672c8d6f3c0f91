//! When the Responder asserts the signal line
//!
//! The decision is made once per cycle, independently of arming. Arming
//! always happens; the policy only decides whether the Initiator is told
//! there is something to read.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of moduli in [`Policy::Residues`]
pub const MAX_RESIDUES: usize = 4;

/// Per-cycle facts available to a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleContext {
    /// Responder cycle index (wraps)
    pub cycle: u32,
    /// A fresh frame was staged into the transmit buffer
    pub frame_staged: bool,
}

/// Decides whether to assert the signal line for a cycle
pub trait AssertPolicy {
    /// Return true to assert `Ready` once the pair is armed
    fn should_assert(&mut self, ctx: &CycleContext) -> bool;
}

impl<F: FnMut(&CycleContext) -> bool> AssertPolicy for F {
    fn should_assert(&mut self, ctx: &CycleContext) -> bool {
        self(ctx)
    }
}

/// Built-in policies, selectable from configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Policy {
    /// Assert whenever a frame is staged
    #[default]
    WhenStaged,
    /// Assert every cycle
    Always,
    /// Never assert; the Initiator only ever writes
    Never,
    /// Assert when the cycle index is a multiple of any modulus
    ///
    /// `[5, 6]` reproduces the fixed demo schedule of the first firmware.
    Residues(Vec<u32, MAX_RESIDUES>),
}

impl Policy {
    /// Residue schedule from a list of moduli
    ///
    /// Returns `None` for an empty list, a zero modulus, or more than
    /// [`MAX_RESIDUES`] entries.
    pub fn residues(moduli: &[u32]) -> Option<Self> {
        if moduli.is_empty() || moduli.contains(&0) {
            return None;
        }
        Vec::from_slice(moduli).ok().map(Policy::Residues)
    }
}

impl AssertPolicy for Policy {
    fn should_assert(&mut self, ctx: &CycleContext) -> bool {
        match self {
            Policy::WhenStaged => ctx.frame_staged,
            Policy::Always => true,
            Policy::Never => false,
            Policy::Residues(moduli) => moduli.iter().any(|&m| m != 0 && ctx.cycle % m == 0),
        }
    }
}
