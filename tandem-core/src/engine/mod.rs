//! Transaction engines
//!
//! One engine per node role. Each call to `run_cycle` performs one complete
//! protocol cycle and returns a report; nothing escapes the cycle boundary.
//!
//! ```text
//! Responder                         Initiator
//! ─────────                         ─────────
//! acquire + zero pair               sample signal line
//! stage frame into tx               stage outgoing frame
//! arm link ──► assert (policy)      Ready ─► read   │ Busy ─► write
//! block until clocked  ◄──────────  transact (bounded wait)
//! deliver rx, deassert, release     deliver rx (read), release
//! ```

pub mod initiator;
pub mod mailbox;
pub mod outcome;
pub mod responder;

pub use initiator::{InitiatorEngine, InitiatorReport};
pub use mailbox::{FrameSink, Outbox, QueueOutbox, TemplateOutbox, MAX_TEMPLATE_LEN};
pub use outcome::{Direction, TransactionOutcome};
pub use responder::{ResponderEngine, ResponderReport, ResponderState};
