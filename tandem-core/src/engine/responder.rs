//! Responder transaction engine
//!
//! The Responder cannot start a transaction. Each cycle it arms a fresh
//! buffer pair, optionally raises the signal line, and blocks until the
//! Initiator clocks the pair.
//!
//! ```text
//!   Idle ──arm──> Armed ──clocked / timeout──> Completed ──release──> Idle
//! ```

use tandem_hal::{LinkError, OutputPin, ResponderLink, Timeout};
use tandem_protocol::{decode, Frame, FRAME_BITS};

use super::mailbox::{FrameSink, Outbox};
use super::outcome::TransactionOutcome;
use crate::error::LinkFailure;
use crate::pool::{BufferPair, BufferPool};
use crate::signal::{AssertPolicy, CycleContext, Policy, SignalLine};

/// Responder engine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponderState {
    /// No pair armed
    Idle,
    /// Pair handed to the link driver, waiting for the Initiator
    Armed,
    /// Link driver returned; pair not yet released
    Completed,
}

/// What happened during one Responder cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponderReport {
    /// Cycle index
    pub cycle: u32,
    /// A frame from the outbox was staged into tx
    pub staged: bool,
    /// The signal line was asserted for this cycle
    pub asserted: bool,
    /// Transaction result
    pub outcome: TransactionOutcome,
}

/// Responder side of the link
///
/// `N` is the number of buffer pairs in the pool. The engine only ever has
/// one armed, so one is enough unless the pool is shared.
pub struct ResponderEngine<L, P, O, A = Policy, const N: usize = 1> {
    link: L,
    signal: SignalLine<P>,
    pool: BufferPool<N>,
    outbox: O,
    policy: A,
    timeout: Timeout,
    state: ResponderState,
    cycle: u32,
}

impl<L, P, O, A, const N: usize> ResponderEngine<L, P, O, A, N>
where
    L: ResponderLink,
    P: OutputPin,
    O: Outbox,
    A: AssertPolicy,
{
    /// Create an engine
    ///
    /// `timeout` bounds each wait for the Initiator; `Timeout::Forever`
    /// is the usual choice.
    pub fn new(link: L, signal: SignalLine<P>, outbox: O, policy: A, timeout: Timeout) -> Self {
        Self {
            link,
            signal,
            pool: BufferPool::new(),
            outbox,
            policy,
            timeout,
            state: ResponderState::Idle,
            cycle: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> ResponderState {
        self.state
    }

    /// Index of the next cycle
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Signal line controller
    pub fn signal(&self) -> &SignalLine<P> {
        &self.signal
    }

    /// Outgoing frame source
    pub fn outbox_mut(&mut self) -> &mut O {
        &mut self.outbox
    }

    /// Link driver
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run one cycle: arm, signal, wait, deliver
    ///
    /// Never fails; failures are reported in the returned report and the
    /// next call starts a fresh cycle.
    pub fn run_cycle<S: FrameSink>(&mut self, sink: &mut S) -> ResponderReport {
        let cycle = self.cycle;
        self.cycle = self.cycle.wrapping_add(1);

        let mut report = ResponderReport {
            cycle,
            staged: false,
            asserted: false,
            outcome: TransactionOutcome::Success(0),
        };

        let result = match self.pool.acquire() {
            Ok(pair) => {
                let result = self.exchange(cycle, &pair, sink, &mut report);
                self.signal.deassert();
                let released = self.pool.release(pair);
                debug_assert!(released.is_ok());
                result
            }
            Err(e) => Err(e.into()),
        };

        self.state = ResponderState::Idle;
        report.outcome = result.into();
        report
    }

    fn exchange<S: FrameSink>(
        &mut self,
        cycle: u32,
        pair: &BufferPair,
        sink: &mut S,
        report: &mut ResponderReport,
    ) -> Result<usize, LinkFailure> {
        let staged: Option<Frame> = self.outbox.stage(cycle)?;

        let (tx, rx) = self.pool.buffers_mut(pair);
        if let Some(frame) = &staged {
            frame.write_into(tx.as_mut_slice());
        }

        let ctx = CycleContext {
            cycle,
            frame_staged: staged.is_some(),
        };
        let assert = self.policy.should_assert(&ctx);
        if !assert {
            self.signal.deassert();
        }
        report.staged = ctx.frame_staged;
        report.asserted = assert;

        let signal = &mut self.signal;
        let state = &mut self.state;
        let result = self.link.transact(
            tx.as_slice(),
            rx.as_mut_slice(),
            FRAME_BITS,
            self.timeout,
            || {
                *state = ResponderState::Armed;
                if assert {
                    signal.assert();
                }
            },
        );
        self.state = ResponderState::Completed;

        let exchanged = result.map_err(|e| LinkFailure::Transport(e.kind()))?;
        let received = &rx.as_slice()[..exchanged.min(rx.len())];
        sink.deliver(cycle, decode(received));
        // Without the line raised the Initiator wrote, and our tx was
        // clocked into nothing.
        if assert && staged.is_some() {
            self.outbox.sent();
        }
        Ok(exchanged)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::engine::mailbox::{QueueOutbox, TemplateOutbox};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::string::{String, ToString};
    use std::vec::Vec;
    use tandem_hal::LinkErrorKind;
    use tandem_protocol::{OverflowPolicy, FRAME_CAPACITY};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Arm { tx_zeroed_tail: bool, rx_zeroed: bool },
        Assert,
        Deassert,
        Complete,
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct RecordingPin {
        log: Log,
        high: bool,
    }

    impl OutputPin for RecordingPin {
        fn set_high(&mut self) {
            self.high = true;
            self.log.borrow_mut().push(Event::Assert);
        }

        fn set_low(&mut self) {
            self.high = false;
            self.log.borrow_mut().push(Event::Deassert);
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    /// Plays back a scripted Initiator transaction per call
    struct ScriptedLink {
        log: Log,
        initiator_tx: &'static [u8],
        fail_with: Option<LinkErrorKind>,
        seen_tx: Vec<u8>,
    }

    impl ResponderLink for ScriptedLink {
        type Error = LinkErrorKind;

        fn transact<F: FnOnce()>(
            &mut self,
            tx: &[u8],
            rx: &mut [u8],
            length_bits: usize,
            _timeout: Timeout,
            on_armed: F,
        ) -> Result<usize, LinkErrorKind> {
            let payload_end = tx.iter().position(|&b| b == 0).unwrap_or(tx.len());
            self.log.borrow_mut().push(Event::Arm {
                tx_zeroed_tail: tx[payload_end..].iter().all(|&b| b == 0),
                rx_zeroed: rx.iter().all(|&b| b == 0),
            });
            on_armed();

            if let Some(kind) = self.fail_with {
                return Err(kind);
            }
            self.seen_tx = tx.to_vec();
            rx[..self.initiator_tx.len()].copy_from_slice(self.initiator_tx);
            self.log.borrow_mut().push(Event::Complete);
            Ok(length_bits / 8)
        }
    }

    fn engine(
        policy: Policy,
        fail_with: Option<LinkErrorKind>,
    ) -> (ResponderEngine<ScriptedLink, RecordingPin, TemplateOutbox>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let pin = RecordingPin {
            log: log.clone(),
            high: false,
        };
        let signal = SignalLine::new(pin, false);
        log.borrow_mut().clear();

        let link = ScriptedLink {
            log: log.clone(),
            initiator_tx: b"Sender, transmission no. 0000.",
            fail_with,
            seen_tx: Vec::new(),
        };
        let outbox = TemplateOutbox::new("Receiver seq {seq}", OverflowPolicy::Truncate).unwrap();
        (
            ResponderEngine::new(link, signal, outbox, policy, Timeout::Forever),
            log,
        )
    }

    #[test]
    fn test_arm_before_assert() {
        let (mut engine, log) = engine(Policy::Always, None);
        let mut received = Vec::new();
        let report = engine.run_cycle(&mut |_, f: tandem_protocol::DecodedFrame<'_>| {
            received.push(f.to_string())
        });

        assert!(report.asserted);
        assert_eq!(report.outcome, TransactionOutcome::Success(FRAME_CAPACITY));
        assert_eq!(
            *log.borrow(),
            [
                Event::Arm {
                    tx_zeroed_tail: true,
                    rx_zeroed: true
                },
                Event::Assert,
                Event::Complete,
                Event::Deassert,
            ]
        );
        assert_eq!(received, ["Sender, transmission no. 0000."]);
    }

    #[test]
    fn test_policy_no_deasserts_before_arming() {
        let (mut engine, log) = engine(Policy::Never, None);
        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});

        assert!(!report.asserted);
        let log = log.borrow();
        assert_eq!(log[0], Event::Deassert);
        assert!(!log.contains(&Event::Assert));
    }

    #[test]
    fn test_stages_sequenced_frame() {
        let (mut engine, _log) = engine(Policy::WhenStaged, None);
        engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});
        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});

        assert_eq!(report.cycle, 1);
        assert!(report.staged);
        assert!(report.asserted);
        let seen = decode(&engine.link().seen_tx).to_string();
        assert_eq!(seen, "Receiver seq 0001");
    }

    #[test]
    fn test_timeout_abandons_cycle() {
        let (mut engine, log) = engine(Policy::Always, Some(LinkErrorKind::Timeout));
        let mut delivered = 0;
        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| delivered += 1);

        assert_eq!(
            report.outcome,
            TransactionOutcome::Failure(LinkFailure::Transport(LinkErrorKind::Timeout))
        );
        assert_eq!(delivered, 0);
        assert_eq!(engine.state(), ResponderState::Idle);
        assert!(!engine.signal().is_asserted());
        assert_eq!(log.borrow().last(), Some(&Event::Deassert));

        // Next cycle re-arms immediately
        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});
        assert_eq!(report.cycle, 1);
    }

    #[test]
    fn test_overflow_rejected_skips_arming() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let signal = SignalLine::new(
            RecordingPin {
                log: log.clone(),
                high: false,
            },
            false,
        );
        let link = ScriptedLink {
            log: log.clone(),
            initiator_tx: b"",
            fail_with: None,
            seen_tx: Vec::new(),
        };
        let long: String = core::iter::repeat('x').take(FRAME_CAPACITY).collect();
        let outbox = TemplateOutbox::new(&long, OverflowPolicy::Reject).unwrap();
        let mut engine = ResponderEngine::<_, _, _, _, 1>::new(link, signal, outbox, Policy::Always, Timeout::Forever);

        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});
        assert_eq!(
            report.outcome,
            TransactionOutcome::Failure(LinkFailure::EncodingOverflow)
        );
        assert!(!log
            .borrow()
            .iter()
            .any(|e| matches!(e, Event::Arm { .. })));
    }

    #[test]
    fn test_queue_frame_kept_on_timeout() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let signal = SignalLine::new(
            RecordingPin {
                log: log.clone(),
                high: false,
            },
            false,
        );
        let link = ScriptedLink {
            log,
            initiator_tx: b"",
            fail_with: Some(LinkErrorKind::Timeout),
            seen_tx: Vec::new(),
        };
        let mut outbox = QueueOutbox::<4>::new();
        outbox
            .push(Frame::new(b"hello", OverflowPolicy::Truncate).unwrap())
            .unwrap();
        let mut engine =
            ResponderEngine::<_, _, _, _, 1>::new(link, signal, outbox, Policy::WhenStaged, Timeout::Millis(5));

        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});
        assert!(report.staged);
        assert!(report.outcome.failure().unwrap().is_timeout());
        assert_eq!(engine.outbox_mut().len(), 1);
    }

    #[test]
    fn test_queue_frame_kept_when_not_signalled() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let signal = SignalLine::new(
            RecordingPin {
                log: log.clone(),
                high: false,
            },
            false,
        );
        let link = ScriptedLink {
            log,
            initiator_tx: b"Sender, transmission no. 0000.",
            fail_with: None,
            seen_tx: Vec::new(),
        };
        let mut outbox = QueueOutbox::<4>::new();
        outbox
            .push(Frame::new(b"important", OverflowPolicy::Truncate).unwrap())
            .unwrap();
        let mut engine =
            ResponderEngine::<_, _, _, _, 1>::new(link, signal, outbox, Policy::Never, Timeout::Forever);

        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});
        assert!(report.staged);
        assert!(!report.asserted);
        assert!(report.outcome.is_success());
        assert_eq!(engine.outbox_mut().len(), 1);
    }

    #[test]
    fn test_queue_frame_sent_when_signalled() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let signal = SignalLine::new(
            RecordingPin {
                log: log.clone(),
                high: false,
            },
            false,
        );
        let link = ScriptedLink {
            log,
            initiator_tx: b"",
            fail_with: None,
            seen_tx: Vec::new(),
        };
        let mut outbox = QueueOutbox::<4>::new();
        outbox
            .push(Frame::new(b"important", OverflowPolicy::Truncate).unwrap())
            .unwrap();
        let mut engine =
            ResponderEngine::<_, _, _, _, 1>::new(link, signal, outbox, Policy::WhenStaged, Timeout::Forever);

        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});
        assert!(report.asserted);
        assert!(engine.outbox_mut().is_empty());
        assert_eq!(decode(&engine.link().seen_tx).to_string(), "important");
    }

    #[test]
    fn test_empty_queue_does_not_assert() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let signal = SignalLine::new(
            RecordingPin {
                log: log.clone(),
                high: false,
            },
            false,
        );
        let link = ScriptedLink {
            log: log.clone(),
            initiator_tx: b"hi",
            fail_with: None,
            seen_tx: Vec::new(),
        };
        let mut engine = ResponderEngine::<_, _, _, _, 1>::new(
            link,
            signal,
            QueueOutbox::<4>::new(),
            Policy::WhenStaged,
            Timeout::Forever,
        );

        let report = engine.run_cycle(&mut |_, _: tandem_protocol::DecodedFrame<'_>| {});
        assert!(!report.staged);
        assert!(!report.asserted);
        assert!(report.outcome.is_success());
        assert!(engine.link().seen_tx.iter().all(|&b| b == 0));
    }
}
