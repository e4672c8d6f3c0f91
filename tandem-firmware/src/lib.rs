//! Tandem handshake link firmware
//!
//! Shared pieces of the two firmware images:
//!
//! - `tandem-initiator` drives the SPI clock and samples the handshake line
//! - `tandem-responder` follows the clock on PIO and drives the line
//!
//! Both read the same embedded `link.toml`.

#![no_std]

pub mod board;
pub mod config;
pub mod tasks;
