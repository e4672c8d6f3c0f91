//! Tandem frame codec
//!
//! Every SPI transaction on the link moves exactly one fixed-size frame in
//! each direction. There is no header, length field or checksum: the
//! transport always clocks [`FRAME_BITS`] bits and the payload is whatever
//! text the sender rendered into the zeroed buffer.
//!
//! ```text
//! ┌──────────────────────────────────────────┬──────────────┐
//! │ PAYLOAD (text, 0–128B)                   │ ZERO PADDING │
//! └──────────────────────────────────────────┴──────────────┘
//! │◄──────────────── FRAME_CAPACITY = 128B ────────────────►│
//! ```
//!
//! Payloads that do not fit are truncated or rejected according to an
//! [`OverflowPolicy`]; nothing is ever written past the frame capacity.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod template;

pub use frame::{decode, DecodedFrame, Frame, FrameError, OverflowPolicy, FRAME_BITS, FRAME_CAPACITY};
pub use template::{render, SEQ_PLACEHOLDER};
