//! Initiator transaction engine
//!
//! Every cycle the Initiator stages its next frame, samples the signal line
//! once and picks the direction from that sample alone:
//!
//! - `Ready`: read. The Responder has armed a frame; the Initiator clocks
//!   a zeroed placeholder out and delivers what comes back.
//! - `Busy`: write. The Initiator clocks its own frame out and discards
//!   whatever the Responder had in its transmit buffer.

use tandem_hal::{InitiatorLink, InputPin, LinkError, Timeout};
use tandem_protocol::{decode, Frame, FrameError, FRAME_BITS};

use super::mailbox::{FrameSink, Outbox};
use super::outcome::{Direction, TransactionOutcome};
use crate::error::LinkFailure;
use crate::pool::{BufferPair, BufferPool};
use crate::signal::{SignalSampler, SignalState};

/// What happened during one Initiator cycle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitiatorReport {
    /// Cycle index, also the sequence number of the outgoing frame
    pub cycle: u32,
    /// Sampled signal level
    pub signal: SignalState,
    /// Direction chosen from `signal`
    pub direction: Direction,
    /// Frame clocked out on a write cycle
    pub outgoing: Option<Frame>,
    /// Staging error on a read cycle
    ///
    /// A read does not need the outgoing frame, so the transaction still
    /// runs. On a write cycle the error ends up in `outcome` instead.
    pub staging: Option<LinkFailure>,
    /// Transaction result
    pub outcome: TransactionOutcome,
}

/// Initiator side of the link
pub struct InitiatorEngine<L, P, O, const N: usize = 1> {
    link: L,
    sampler: SignalSampler<P>,
    pool: BufferPool<N>,
    outbox: O,
    timeout: Timeout,
    cycle: u32,
}

impl<L, P, O, const N: usize> InitiatorEngine<L, P, O, N>
where
    L: InitiatorLink,
    P: InputPin,
    O: Outbox,
{
    /// Create an engine
    ///
    /// `timeout` bounds each transaction. It must be finite in practice, or
    /// a stalled Responder stalls the Initiator too.
    pub fn new(link: L, sampler: SignalSampler<P>, outbox: O, timeout: Timeout) -> Self {
        Self {
            link,
            sampler,
            pool: BufferPool::new(),
            outbox,
            timeout,
            cycle: 0,
        }
    }

    /// Index of the next cycle
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Outgoing frame source
    pub fn outbox_mut(&mut self) -> &mut O {
        &mut self.outbox
    }

    /// Link driver
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run one cycle: stage, sample, then read or write
    pub fn run_cycle<S: FrameSink>(&mut self, sink: &mut S) -> InitiatorReport {
        let cycle = self.cycle;
        self.cycle = self.cycle.wrapping_add(1);

        // The outbox advances every cycle; a frame staged on a read cycle
        // is dropped.
        let staged = self.outbox.stage(cycle);
        let signal = self.sampler.sample();
        let direction = match signal {
            SignalState::Ready => Direction::Read,
            SignalState::Busy => Direction::Write,
        };
        let mut report = InitiatorReport {
            cycle,
            signal,
            direction,
            outgoing: None,
            staging: None,
            outcome: TransactionOutcome::Success(0),
        };
        if direction == Direction::Read {
            report.staging = staged.as_ref().err().map(|&e| e.into());
        }

        let result = match self.pool.acquire() {
            Ok(pair) => {
                let result = match direction {
                    Direction::Read => self.read(cycle, &pair, sink),
                    Direction::Write => self.write(staged, &pair, &mut report),
                };
                let released = self.pool.release(pair);
                debug_assert!(released.is_ok());
                result
            }
            Err(e) => Err(e.into()),
        };

        report.outcome = result.into();
        report
    }

    fn read<S: FrameSink>(
        &mut self,
        cycle: u32,
        pair: &BufferPair,
        sink: &mut S,
    ) -> Result<usize, LinkFailure> {
        let (tx, rx) = self.pool.buffers_mut(pair);
        let exchanged = self
            .link
            .transact(tx.as_slice(), rx.as_mut_slice(), FRAME_BITS, self.timeout)
            .map_err(|e| LinkFailure::Transport(e.kind()))?;

        let received = &rx.as_slice()[..exchanged.min(rx.len())];
        sink.deliver(cycle, decode(received));
        Ok(exchanged)
    }

    fn write(
        &mut self,
        staged: Result<Option<Frame>, FrameError>,
        pair: &BufferPair,
        report: &mut InitiatorReport,
    ) -> Result<usize, LinkFailure> {
        let staged = staged?;
        let frame = staged.clone().unwrap_or_default();

        let (tx, rx) = self.pool.buffers_mut(pair);
        frame.write_into(tx.as_mut_slice());
        report.outgoing = Some(frame);

        let exchanged = self
            .link
            .transact(tx.as_slice(), rx.as_mut_slice(), FRAME_BITS, self.timeout)
            .map_err(|e| LinkFailure::Transport(e.kind()))?;

        if staged.is_some() {
            self.outbox.sent();
        }
        Ok(exchanged)
    }
}
