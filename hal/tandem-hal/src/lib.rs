//! Tandem Hardware Abstraction Layer
//!
//! This crate defines the hardware seams of the handshake link: the
//! signal line pins and the two halves of the SPI link driver. Chip-specific
//! HALs implement them, and the protocol engines in `tandem-core` only ever
//! talk to these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware (tandem-firmware)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-core (engines, pool, signal)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │ tandem-hal-   │
//! │ adapters      │       │    rp2040     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Handshake line I/O
//! - [`link::InitiatorLink`] - Master side of one SPI transaction
//! - [`link::ResponderLink`] - Slave side of one SPI transaction
//! - [`link::LinkError`] - Classification of driver errors

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod link;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::{EhInput, EhOutput, InputPin, OutputPin};
pub use link::{EhInitiator, InitiatorLink, LinkError, LinkErrorKind, ResponderLink, Timeout};
pub use spi::{BusConfig, Mode, Phase, Polarity};
