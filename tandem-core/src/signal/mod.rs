//! Handshake signal line
//!
//! The Responder is the only writer of the line and the Initiator the only
//! reader. The line carries a level, never a payload:
//!
//! - `Ready` (asserted): a buffer pair is armed and holds a frame for the
//!   Initiator to read.
//! - `Busy` (deasserted): nothing to read; the Initiator may write.
//!
//! The Responder asserts only after its pair is armed.

pub mod line;
pub mod policy;
pub mod shared;

pub use line::{SignalLine, SignalSampler, SignalState};
pub use policy::{AssertPolicy, CycleContext, Policy, MAX_RESIDUES};
pub use shared::{LevelReader, LevelWriter, SharedLevel};
