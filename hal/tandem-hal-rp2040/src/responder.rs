//! PIO-based SPI follower
//!
//! Implements [`ResponderLink`] on one PIO state machine. Arming clears the
//! FIFOs, restarts the program and prefills up to `queue_depth` transmit
//! bytes; the rest are fed while the Initiator clocks.

use embassy_rp::gpio::Pull;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, Instance, PioPin, ShiftConfig, ShiftDirection,
    StateMachine,
};
use embassy_rp::Peri;
use embassy_time::{Duration, Instant};
use fixed::types::U24F8;

use tandem_hal::link::transfer_len;
use tandem_hal::{BusConfig, LinkError, LinkErrorKind, ResponderLink, Timeout};

use crate::pio::{rx_byte, sample_edge, supports_frequency, tx_word, SampleEdge};

/// Errors from [`PioResponder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PioLinkError {
    /// The Initiator did not finish the transaction in time
    Timeout,
    /// Requested length does not fit the buffers
    Length,
    /// Bus clock too fast for the state machine, or zero queue depth
    Unsupported,
}

impl LinkError for PioLinkError {
    fn kind(&self) -> LinkErrorKind {
        match self {
            PioLinkError::Timeout => LinkErrorKind::Timeout,
            PioLinkError::Length => LinkErrorKind::Length,
            PioLinkError::Unsupported => LinkErrorKind::Other,
        }
    }
}

impl From<LinkErrorKind> for PioLinkError {
    fn from(kind: LinkErrorKind) -> Self {
        match kind {
            LinkErrorKind::Timeout => PioLinkError::Timeout,
            LinkErrorKind::Length => PioLinkError::Length,
            LinkErrorKind::Bus | LinkErrorKind::Other => PioLinkError::Unsupported,
        }
    }
}

/// SPI follower on a PIO state machine
pub struct PioResponder<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    /// Program start, for restarting between transactions
    origin: u8,
    queue_depth: usize,
}

impl<'d, PIO: Instance, const SM: usize> PioResponder<'d, PIO, SM> {
    /// Create a follower
    ///
    /// `mosi`, `sck` and `cs` must be consecutive GPIOs in that order.
    /// The state machine stays disabled until the first transaction.
    pub fn new<MOSI: PioPin, SCK: PioPin, CS: PioPin, MISO: PioPin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        mosi: Peri<'d, MOSI>,
        sck: Peri<'d, SCK>,
        cs: Peri<'d, CS>,
        miso: Peri<'d, MISO>,
        bus: &BusConfig,
    ) -> Result<Self, PioLinkError> {
        if !supports_frequency(bus.frequency) || bus.queue_depth == 0 {
            return Err(PioLinkError::Unsupported);
        }

        // Pin indices are relative to in_base (MOSI)
        let installed = match sample_edge(bus.mode) {
            SampleEdge::Rising => {
                let prg = pio::pio_asm!(
                    ".wrap_target",
                    "wait 0 pin 2", // chip select asserted
                    "wait 0 pin 1", // SCK low: launch
                    "out pins, 1",
                    "wait 1 pin 1", // SCK high: sample
                    "in pins, 1",
                    ".wrap"
                );
                common.load_program(&prg.program)
            }
            SampleEdge::Falling => {
                let prg = pio::pio_asm!(
                    ".wrap_target",
                    "wait 0 pin 2",
                    "wait 1 pin 1", // SCK high: launch
                    "out pins, 1",
                    "wait 0 pin 1", // SCK low: sample
                    "in pins, 1",
                    ".wrap"
                );
                common.load_program(&prg.program)
            }
        };

        let mut mosi = common.make_pio_pin(mosi);
        let mut sck = common.make_pio_pin(sck);
        let mut cs = common.make_pio_pin(cs);
        let miso = common.make_pio_pin(miso);
        // CS idles high when the Initiator is not attached
        cs.set_pull(Pull::Up);
        mosi.set_pull(Pull::None);
        sck.set_pull(Pull::None);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[]);
        cfg.set_in_pins(&[&mosi, &sck, &cs]);
        cfg.set_out_pins(&[&miso]);
        cfg.shift_in = ShiftConfig {
            threshold: 8,
            direction: ShiftDirection::Left,
            auto_fill: true,
        };
        cfg.shift_out = ShiftConfig {
            threshold: 8,
            direction: ShiftDirection::Left,
            auto_fill: true,
        };
        // Full speed; the program paces itself on SCK
        cfg.clock_divider = U24F8::from_num(1);

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::In, &[&mosi, &sck, &cs]);
        sm.set_pin_dirs(PioDirection::Out, &[&miso]);

        Ok(Self {
            sm,
            origin: installed.origin,
            queue_depth: bus.queue_depth as usize,
        })
    }

    fn rearm(&mut self) {
        self.sm.set_enable(false);
        self.sm.clear_fifos();
        self.sm.restart();
        // SAFETY: origin is the first instruction of the program this
        // state machine was configured with.
        unsafe { self.sm.exec_jmp(self.origin) };
    }
}

impl<PIO: Instance, const SM: usize> ResponderLink for PioResponder<'_, PIO, SM> {
    type Error = PioLinkError;

    fn transact<F: FnOnce()>(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
        length_bits: usize,
        timeout: Timeout,
        on_armed: F,
    ) -> Result<usize, PioLinkError> {
        let len = transfer_len(length_bits, tx, rx)?;

        self.rearm();
        let mut sent = 0;
        while sent < len.min(self.queue_depth) && self.sm.tx().try_push(tx_word(tx[sent])) {
            sent += 1;
        }
        self.sm.set_enable(true);
        on_armed();

        let deadline = timeout
            .as_millis()
            .map(|ms| Instant::now() + Duration::from_millis(ms as u64));
        let mut received = 0;
        while received < len {
            if sent < len && self.sm.tx().try_push(tx_word(tx[sent])) {
                sent += 1;
            }
            if let Some(word) = self.sm.rx().try_pull() {
                rx[received] = rx_byte(word);
                received += 1;
                continue;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                self.sm.set_enable(false);
                return Err(PioLinkError::Timeout);
            }
        }

        self.sm.set_enable(false);
        Ok(len)
    }
}
