//! Where outgoing frames come from and where received frames go

use heapless::{Deque, String};
use tandem_protocol::{DecodedFrame, Frame, FrameError, OverflowPolicy, FRAME_CAPACITY};

/// Maximum template length in bytes
pub const MAX_TEMPLATE_LEN: usize = FRAME_CAPACITY;

/// Source of outgoing frames
pub trait Outbox {
    /// Frame to send this cycle, if any
    ///
    /// Called once per cycle. `sequence` is the engine's cycle index.
    fn stage(&mut self, sequence: u32) -> Result<Option<Frame>, FrameError>;

    /// The staged frame reached the peer
    ///
    /// Only called after a completed transaction in which the peer was
    /// reading this node's frame.
    fn sent(&mut self) {}
}

/// Consumer of received frames
pub trait FrameSink {
    /// Called once per completed transaction that carries meaning
    fn deliver(&mut self, cycle: u32, frame: DecodedFrame<'_>);
}

impl<F: FnMut(u32, DecodedFrame<'_>)> FrameSink for F {
    fn deliver(&mut self, cycle: u32, frame: DecodedFrame<'_>) {
        self(cycle, frame)
    }
}

/// Renders a fresh sequenced text frame every cycle
#[derive(Debug, Clone)]
pub struct TemplateOutbox {
    template: String<MAX_TEMPLATE_LEN>,
    overflow: OverflowPolicy,
}

impl TemplateOutbox {
    /// Create from a template such as `"Sender, transmission no. {seq}."`
    pub fn new(template: &str, overflow: OverflowPolicy) -> Result<Self, FrameError> {
        let mut owned = String::new();
        owned.push_str(template).map_err(|_| FrameError::Overflow)?;
        Ok(Self {
            template: owned,
            overflow,
        })
    }

    /// The template text
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Outbox for TemplateOutbox {
    fn stage(&mut self, sequence: u32) -> Result<Option<Frame>, FrameError> {
        Frame::from_template(&self.template, sequence, self.overflow).map(Some)
    }
}

/// Application-fed queue of frames
///
/// A frame stays at the head of the queue until the peer actually reads
/// it, so a timed-out or unsignalled cycle does not lose it.
#[derive(Debug, Clone, Default)]
pub struct QueueOutbox<const N: usize> {
    queue: Deque<Frame, N>,
}

impl<const N: usize> QueueOutbox<N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Queue a frame; hands it back if the queue is full
    pub fn push(&mut self, frame: Frame) -> Result<(), Frame> {
        self.queue.push_back(frame)
    }

    /// Frames waiting to be sent
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<const N: usize> Outbox for QueueOutbox<N> {
    fn stage(&mut self, _sequence: u32) -> Result<Option<Frame>, FrameError> {
        Ok(self.queue.front().cloned())
    }

    fn sent(&mut self) {
        self.queue.pop_front();
    }
}
