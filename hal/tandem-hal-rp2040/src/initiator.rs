//! SPI master for the Initiator
//!
//! The blocking embassy SPI driver is an `embedded_hal::spi::SpiBus`. An
//! `ExclusiveDevice` adds chip select around each transfer, and
//! [`EhInitiator`] turns the device into a link driver.

use core::convert::Infallible;

use embassy_rp::gpio::Output;
use embassy_rp::spi::{self, Blocking, Instance, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use tandem_hal::{BusConfig, EhInitiator, Phase, Polarity};

/// Link driver for the Initiator node
pub type Rp2040Initiator<'d, T> =
    EhInitiator<ExclusiveDevice<Spi<'d, T, Blocking>, Output<'d>, Delay>>;

/// Peripheral configuration for a bus
pub fn spi_config(bus: &BusConfig) -> spi::Config {
    let mut config = spi::Config::default();
    config.frequency = bus.frequency;
    config.polarity = match bus.mode.polarity() {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    config.phase = match bus.mode.phase() {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    config
}

/// Wrap a configured SPI master and its chip select
///
/// `cs` should start high (deselected).
pub fn new_initiator<'d, T: Instance>(
    spi: Spi<'d, T, Blocking>,
    cs: Output<'d>,
) -> Result<Rp2040Initiator<'d, T>, Infallible> {
    let device = ExclusiveDevice::new(spi, cs, Delay)?;
    Ok(EhInitiator::new(device))
}
