//! Board wiring
//!
//! Both nodes are Raspberry Pi Pico boards. Connect GND, and cross the
//! lines as follows:
//!
//! | Signal    | Initiator      | Responder       |
//! |-----------|----------------|-----------------|
//! | SCK       | GPIO18 (SPI0)  | GPIO11          |
//! | MOSI      | GPIO19 (SPI0)  | GPIO10          |
//! | MISO      | GPIO16 (SPI0)  | GPIO13          |
//! | CS        | GPIO17         | GPIO12          |
//! | Handshake | GPIO20 (input) | GPIO14 (output) |
//!
//! On the Responder, MOSI, SCK and CS must stay consecutive for the PIO
//! follower.

use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{PIO0, SPI0};
use embassy_rp::pio::{Common, InterruptHandler, Pio};
use embassy_rp::spi::Spi;
use embassy_rp::Peripherals;

use tandem_core::config::LinkConfig;
use tandem_hal_rp2040::{new_initiator, spi_config, PioLinkError, PioResponder, Rp2040Initiator};

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// Initiator peripherals
pub struct InitiatorBoard {
    /// SPI master with chip select
    pub link: Rp2040Initiator<'static, SPI0>,
    /// Handshake line input
    pub handshake: Input<'static>,
}

/// Set up the Initiator's SPI master and handshake input
pub fn initiator(p: Peripherals, config: &LinkConfig) -> InitiatorBoard {
    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_18,
        p.PIN_19,
        p.PIN_16,
        spi_config(&config.bus),
    );
    let cs = Output::new(p.PIN_17, Level::High);
    let link = match new_initiator(spi, cs) {
        Ok(link) => link,
        Err(never) => match never {},
    };

    // Hold the line at Busy while the Responder is absent
    let pull = if config.signal.active_low {
        Pull::Up
    } else {
        Pull::Down
    };
    let handshake = Input::new(p.PIN_20, pull);

    InitiatorBoard { link, handshake }
}

/// Responder peripherals
pub struct ResponderBoard {
    /// PIO follower on state machine 0
    pub link: PioResponder<'static, PIO0, 0>,
    /// Handshake line output
    pub handshake: Output<'static>,
    /// PIO block, kept alive with the follower
    pub common: Common<'static, PIO0>,
}

/// Set up the Responder's PIO follower and handshake output
pub fn responder(p: Peripherals, config: &LinkConfig) -> Result<ResponderBoard, PioLinkError> {
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);

    let link = PioResponder::new(
        &mut common,
        sm0,
        p.PIN_10,
        p.PIN_11,
        p.PIN_12,
        p.PIN_13,
        &config.bus,
    )?;
    let handshake = Output::new(p.PIN_14, Level::from(config.signal.active_low));

    Ok(ResponderBoard {
        link,
        handshake,
        common,
    })
}
