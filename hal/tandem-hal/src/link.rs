//! SPI link driver abstractions
//!
//! A link driver performs exactly one physical full-duplex transaction per
//! call. The two sides have different shapes:
//!
//! - The Initiator (master) clocks the transaction itself, so
//!   [`InitiatorLink::transact`] is a plain blocking transfer.
//! - The Responder (slave) can only make its buffers eligible and wait for
//!   the master. [`ResponderLink::transact`] takes an `on_armed` hook that
//!   the driver calls after the buffers are eligible and before it blocks.
//!   The engines use that hook to raise the handshake line.

use embedded_hal::spi::{self, SpiDevice};

/// Maximum wait for a transaction to complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Wait until the other side acts
    Forever,
    /// Give up after this many milliseconds
    Millis(u32),
}

impl Timeout {
    /// Bounded timeout in milliseconds, `None` for `Forever`
    pub fn as_millis(&self) -> Option<u32> {
        match self {
            Timeout::Forever => None,
            Timeout::Millis(ms) => Some(*ms),
        }
    }
}

/// Coarse classification of link driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkErrorKind {
    /// The other side never completed the transaction
    Timeout,
    /// The bus or peripheral reported a fault
    Bus,
    /// Requested length does not fit the supplied buffers
    Length,
    /// Anything else
    Other,
}

/// Error type of a link driver
pub trait LinkError: core::fmt::Debug {
    /// Convert to the generic error kind
    fn kind(&self) -> LinkErrorKind;
}

impl LinkError for LinkErrorKind {
    fn kind(&self) -> LinkErrorKind {
        *self
    }
}

/// Master side of the link
pub trait InitiatorLink {
    /// Error type for transactions
    type Error: LinkError;

    /// Perform one transaction of `length_bits` bits
    ///
    /// Shifts `tx` out while shifting into `rx`. Returns the number of bytes
    /// exchanged. A driver that can stall (waiting on a peer, a shared bus
    /// or DMA) must return a `Timeout` error rather than block past
    /// `timeout`. A driver that clocks the whole transfer itself cannot
    /// block and may ignore `timeout`.
    fn transact(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
        length_bits: usize,
        timeout: Timeout,
    ) -> Result<usize, Self::Error>;
}

/// Slave side of the link
pub trait ResponderLink {
    /// Error type for transactions
    type Error: LinkError;

    /// Arm `tx`/`rx` for the next master transaction and wait for it
    ///
    /// `on_armed` runs exactly once, after the buffers are eligible for
    /// transfer and before the blocking wait. It is not called if arming
    /// itself fails. Returns the number of bytes exchanged.
    fn transact<F: FnOnce()>(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
        length_bits: usize,
        timeout: Timeout,
        on_armed: F,
    ) -> Result<usize, Self::Error>;
}

/// Byte count for a bit length, checked against both buffers
pub fn transfer_len(length_bits: usize, tx: &[u8], rx: &[u8]) -> Result<usize, LinkErrorKind> {
    if length_bits % 8 != 0 {
        return Err(LinkErrorKind::Length);
    }
    let len = length_bits / 8;
    if len > tx.len() || len > rx.len() {
        return Err(LinkErrorKind::Length);
    }
    Ok(len)
}

/// Error from [`EhInitiator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EhLinkError<E> {
    /// The SPI device failed
    Spi(E),
    /// Requested length does not fit the buffers
    Length,
}

impl<E: spi::Error> LinkError for EhLinkError<E> {
    fn kind(&self) -> LinkErrorKind {
        match self {
            EhLinkError::Spi(_) => LinkErrorKind::Bus,
            EhLinkError::Length => LinkErrorKind::Length,
        }
    }
}

/// Initiator link over any embedded-hal 1.0 SPI device
///
/// The device owns chip-select handling. A master transfer is clocked
/// locally and always finishes, so the timeout is not consulted.
pub struct EhInitiator<D> {
    device: D,
}

impl<D: SpiDevice> EhInitiator<D> {
    /// Wrap an SPI device
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Release the wrapped device
    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: SpiDevice> InitiatorLink for EhInitiator<D> {
    type Error = EhLinkError<D::Error>;

    fn transact(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
        length_bits: usize,
        _timeout: Timeout,
    ) -> Result<usize, Self::Error> {
        let len = transfer_len(length_bits, tx, rx).map_err(|_| EhLinkError::Length)?;
        self.device
            .transfer(&mut rx[..len], &tx[..len])
            .map_err(EhLinkError::Spi)?;
        Ok(len)
    }
}
