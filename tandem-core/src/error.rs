//! Cycle-local failures
//!
//! Every failure here ends the current cycle only. Engines report it in the
//! cycle report and carry on with the next cycle.

use tandem_hal::LinkErrorKind;
use tandem_protocol::FrameError;

use crate::pool::PoolError;

/// Why a cycle did not complete a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkFailure {
    /// The link driver failed or timed out
    Transport(LinkErrorKind),
    /// No free buffer pair in the pool
    OutOfMemory,
    /// Outgoing payload exceeds the frame capacity
    EncodingOverflow,
}

impl LinkFailure {
    /// True if the driver gave up waiting for the other side
    pub fn is_timeout(&self) -> bool {
        matches!(self, LinkFailure::Transport(LinkErrorKind::Timeout))
    }
}

impl From<PoolError> for LinkFailure {
    fn from(_: PoolError) -> Self {
        LinkFailure::OutOfMemory
    }
}

impl From<FrameError> for LinkFailure {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Overflow => LinkFailure::EncodingOverflow,
        }
    }
}

impl From<LinkErrorKind> for LinkFailure {
    fn from(kind: LinkErrorKind) -> Self {
        LinkFailure::Transport(kind)
    }
}
