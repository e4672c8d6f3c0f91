//! Result types shared by both engines

use crate::error::LinkFailure;

/// Which half of the full-duplex exchange carries meaning this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Initiator reads the Responder's frame; its own tx is a placeholder
    Read,
    /// Initiator writes its frame; what it receives is discarded
    Write,
}

/// Result of one link driver call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionOutcome {
    /// Transaction completed, this many bytes exchanged
    Success(usize),
    /// Cycle ended without a usable transaction
    Failure(LinkFailure),
}

impl TransactionOutcome {
    /// True on `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, TransactionOutcome::Success(_))
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<LinkFailure> {
        match self {
            TransactionOutcome::Success(_) => None,
            TransactionOutcome::Failure(f) => Some(*f),
        }
    }
}

impl From<Result<usize, LinkFailure>> for TransactionOutcome {
    fn from(result: Result<usize, LinkFailure>) -> Self {
        match result {
            Ok(n) => TransactionOutcome::Success(n),
            Err(f) => TransactionOutcome::Failure(f),
        }
    }
}
