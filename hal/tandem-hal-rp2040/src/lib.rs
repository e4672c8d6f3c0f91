//! RP2040 link drivers for the Tandem handshake link
//!
//! This crate provides RP2040 implementations of the `tandem-hal` link
//! traits:
//!
//! - Initiator: the SPI master peripheral behind an `embedded-hal-bus`
//!   `ExclusiveDevice`, driven through [`tandem_hal::EhInitiator`]
//! - Responder: a PIO state machine acting as SPI follower, since the
//!   embassy SPI driver is master-only

#![no_std]

pub mod initiator;
pub mod pio;
pub mod responder;

pub use initiator::{new_initiator, spi_config, Rp2040Initiator};
pub use responder::{PioLinkError, PioResponder};
