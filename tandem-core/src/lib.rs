//! Board-agnostic protocol logic for the Tandem handshake link
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Buffer pool for word-aligned transaction buffers
//! - Signal line controller and assertion policies
//! - Responder and Initiator transaction engines
//! - Configuration types and the `link.toml` parser
//!
//! The engines are synchronous and do one protocol cycle per call. The
//! caller (an embassy task on hardware, a plain loop in tests) owns the
//! schedule and logs the returned cycle reports.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod pool;
pub mod signal;

pub use engine::{
    Direction, FrameSink, InitiatorEngine, InitiatorReport, Outbox, QueueOutbox, ResponderEngine,
    ResponderReport, ResponderState, TemplateOutbox, TransactionOutcome,
};
pub use error::LinkFailure;
pub use pool::{BufferPair, BufferPool, DmaBuf, PoolError};
pub use signal::{AssertPolicy, CycleContext, Policy, SignalLine, SignalSampler, SignalState};
