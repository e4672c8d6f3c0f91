//! Embassy tasks
//!
//! One task per node role. Each owns its engine and runs it forever.

pub mod initiator;
pub mod responder;

pub use initiator::{initiator_task, Initiator};
pub use responder::{responder_task, Responder};
