//! PIO helpers for the SPI follower
//!
//! The follower program waits for chip select, then for each bit waits
//! for the launch edge, shifts one bit out on MISO, waits for the sample
//! edge and shifts one bit in from MOSI. Autopull and autopush at 8 bits
//! move whole bytes through the FIFOs.
//!
//! Input pins are mapped consecutively from MOSI:
//!
//! ```text
//!   in_base + 0   MOSI
//!   in_base + 1   SCK
//!   in_base + 2   CS (active low)
//! ```

use tandem_hal::Mode;

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// State machine cycles the follower needs per bus clock period
///
/// Each bit costs four instructions plus the wait latency on both edges.
pub const MIN_OVERSAMPLE: u32 = 8;

/// Fastest bus clock the follower can keep up with
pub const MAX_BUS_FREQ_HZ: u32 = SYS_CLK_HZ / MIN_OVERSAMPLE;

/// Clock edge on which MOSI is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleEdge {
    /// Modes 0 and 3
    Rising,
    /// Modes 1 and 2
    Falling,
}

/// Which edge a given SPI mode samples on
pub fn sample_edge(mode: Mode) -> SampleEdge {
    match mode {
        Mode::Mode0 | Mode::Mode3 => SampleEdge::Rising,
        Mode::Mode1 | Mode::Mode2 => SampleEdge::Falling,
    }
}

/// True if the follower can track a bus clocked at `freq_hz`
pub fn supports_frequency(freq_hz: u32) -> bool {
    freq_hz > 0 && freq_hz <= MAX_BUS_FREQ_HZ
}

/// TX FIFO word for one byte
///
/// The output shift register shifts left, so the byte sits in the top
/// eight bits and leaves MSB first.
pub fn tx_word(byte: u8) -> u32 {
    (byte as u32) << 24
}

/// Byte from one RX FIFO word
///
/// The input shift register shifts left and autopushes after 8 bits, so
/// the byte is in the low eight bits.
pub fn rx_byte(word: u32) -> u8 {
    word as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_edge() {
        assert_eq!(sample_edge(Mode::Mode0), SampleEdge::Rising);
        assert_eq!(sample_edge(Mode::Mode3), SampleEdge::Rising);
        assert_eq!(sample_edge(Mode::Mode1), SampleEdge::Falling);
        assert_eq!(sample_edge(Mode::Mode2), SampleEdge::Falling);
    }

    #[test]
    fn test_supported_frequencies() {
        assert!(supports_frequency(1_000_000));
        assert!(supports_frequency(MAX_BUS_FREQ_HZ));
        assert!(!supports_frequency(MAX_BUS_FREQ_HZ + 1));
        assert!(!supports_frequency(0));
    }

    #[test]
    fn test_word_packing() {
        assert_eq!(tx_word(0xA5), 0xA500_0000);
        assert_eq!(rx_byte(0x0000_01A5), 0xA5);
    }
}
