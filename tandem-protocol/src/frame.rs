//! Frame encoding and decoding.
//!
//! Frame layout:
//! - PAYLOAD (0-128 bytes): opaque bytes, usually UTF-8 text
//! - PADDING: zero bytes up to [`FRAME_CAPACITY`]
//!
//! The padding is only zero because both engines zero their buffers before
//! arming. Decoding stops at the first zero byte or at the end of the
//! exchanged bytes, whichever comes first.

use core::fmt;

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::template;

/// Frame capacity in bytes
pub const FRAME_CAPACITY: usize = 128;

/// Bits clocked per transaction
pub const FRAME_BITS: usize = FRAME_CAPACITY * 8;

/// Errors that can occur during frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds the frame capacity and the policy rejects it
    Overflow,
}

/// What to do with payloads longer than [`FRAME_CAPACITY`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowPolicy {
    /// Keep the longest prefix that fits
    #[default]
    Truncate,
    /// Fail with [`FrameError::Overflow`]
    Reject,
}

/// An outgoing frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Vec<u8, FRAME_CAPACITY>,
    truncated: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

impl Frame {
    /// A frame with no payload (all padding)
    pub const fn empty() -> Self {
        Self {
            payload: Vec::new(),
            truncated: false,
        }
    }

    /// Create a frame from raw payload bytes
    pub fn new(bytes: &[u8], policy: OverflowPolicy) -> Result<Self, FrameError> {
        let fits = bytes.len() <= FRAME_CAPACITY;
        if !fits && policy == OverflowPolicy::Reject {
            return Err(FrameError::Overflow);
        }

        let take = bytes.len().min(FRAME_CAPACITY);
        let mut payload = Vec::new();
        payload
            .extend_from_slice(&bytes[..take])
            .map_err(|_| FrameError::Overflow)?;

        Ok(Self {
            payload,
            truncated: !fits,
        })
    }

    /// Render a sequenced text frame
    ///
    /// See [`template::render`] for the placeholder rules.
    pub fn from_template(
        template: &str,
        sequence: u32,
        policy: OverflowPolicy,
    ) -> Result<Self, FrameError> {
        let (payload, truncated) = template::render(template, sequence);
        if truncated && policy == OverflowPolicy::Reject {
            return Err(FrameError::Overflow);
        }
        Ok(Self { payload, truncated })
    }

    /// Payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// True if the payload was cut to fit the capacity
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Copy the payload into a transaction buffer
    ///
    /// Writes at most `buf.len()` bytes and leaves the rest of `buf`
    /// untouched. Returns the number of bytes written.
    pub fn write_into(&self, buf: &mut [u8]) -> usize {
        let len = self.payload.len().min(buf.len());
        buf[..len].copy_from_slice(&self.payload[..len]);
        len
    }
}

/// Bounded view of a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    bytes: &'a [u8],
}

/// Decode a received transaction buffer
///
/// Never looks past `FRAME_CAPACITY` bytes or past the end of `buf`.
pub fn decode(buf: &[u8]) -> DecodedFrame<'_> {
    let bounded = &buf[..buf.len().min(FRAME_CAPACITY)];
    let end = bounded.iter().position(|&b| b == 0).unwrap_or(bounded.len());
    DecodedFrame {
        bytes: &bounded[..end],
    }
}

impl<'a> DecodedFrame<'a> {
    /// Payload bytes, without padding
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Payload as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.bytes).ok()
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing but padding was received
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for DecodedFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.bytes.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DecodedFrame<'_> {
    fn format(&self, f: defmt::Formatter) {
        match self.as_str() {
            Some(text) => defmt::write!(f, "{=str}", text),
            None => defmt::write!(f, "{=[u8]}", self.bytes),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Frame {{ len: {}, truncated: {} }}", self.payload.len(), self.truncated)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use proptest::prelude::*;
    use std::string::{String, ToString};

    #[test]
    fn test_frame_new_fits() {
        let frame = Frame::new(b"hello", OverflowPolicy::Reject).unwrap();
        assert_eq!(frame.as_bytes(), b"hello");
        assert!(!frame.is_truncated());
    }

    #[test]
    fn test_frame_new_overflow() {
        let big = [b'x'; FRAME_CAPACITY + 1];
        assert_eq!(
            Frame::new(&big, OverflowPolicy::Reject),
            Err(FrameError::Overflow)
        );

        let frame = Frame::new(&big, OverflowPolicy::Truncate).unwrap();
        assert_eq!(frame.len(), FRAME_CAPACITY);
        assert!(frame.is_truncated());
    }

    #[test]
    fn test_write_into_leaves_tail() {
        let frame = Frame::new(b"abc", OverflowPolicy::Truncate).unwrap();
        let mut buf = [0xEEu8; 8];
        assert_eq!(frame.write_into(&mut buf), 3);
        assert_eq!(&buf[..3], b"abc");
        assert!(buf[3..].iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_write_into_short_buffer() {
        let frame = Frame::new(b"abcdef", OverflowPolicy::Truncate).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(frame.write_into(&mut buf), 4);
        assert_eq!(&buf, b"abcd");
    }

    #[test]
    fn test_decode_stops_at_nul() {
        let mut buf = [0u8; FRAME_CAPACITY];
        buf[..5].copy_from_slice(b"hello");
        buf[6] = b'!';
        let decoded = decode(&buf);
        assert_eq!(decoded.as_str(), Some("hello"));
    }

    #[test]
    fn test_decode_full_frame_without_terminator() {
        let buf = [b'a'; FRAME_CAPACITY + 16];
        let decoded = decode(&buf);
        assert_eq!(decoded.len(), FRAME_CAPACITY);
    }

    #[test]
    fn test_decode_empty() {
        let buf = [0u8; FRAME_CAPACITY];
        assert!(decode(&buf).is_empty());
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn test_display_is_lossy() {
        let buf = [b'o', b'k', 0xFF, b'!'];
        assert_eq!(decode(&buf).to_string(), "ok\u{FFFD}!");
        assert_eq!(decode(&buf).as_str(), None);
    }

    proptest! {
        #[test]
        fn prop_template_never_exceeds_capacity(template in ".{0,300}", seq in any::<u32>()) {
            let frame = Frame::from_template(&template, seq, OverflowPolicy::Truncate).unwrap();
            prop_assert!(frame.len() <= FRAME_CAPACITY);
            // Truncation happens on a char boundary
            prop_assert!(core::str::from_utf8(frame.as_bytes()).is_ok());

            let mut buf = [0u8; FRAME_CAPACITY];
            let written = frame.write_into(&mut buf);
            prop_assert_eq!(written, frame.len());
            prop_assert!(decode(&buf).len() <= FRAME_CAPACITY);
        }

        #[test]
        fn prop_roundtrip_without_nul(template in "[^\u{0}{}]{0,200}", seq in 0u32..10_000) {
            let frame = Frame::from_template(&template, seq, OverflowPolicy::Truncate).unwrap();
            let mut buf = [0u8; FRAME_CAPACITY];
            frame.write_into(&mut buf);

            let decoded = decode(&buf);
            prop_assert_eq!(decoded.as_bytes(), frame.as_bytes());

            let mut expected = String::from(template.as_str());
            if !expected.is_empty() {
                expected.push(' ');
            }
            expected.push_str(&std::format!("{:04}", seq));
            prop_assert!(expected.as_bytes().starts_with(decoded.as_bytes()));
            prop_assert_eq!(frame.is_truncated(), expected.len() > FRAME_CAPACITY);
        }

        #[test]
        fn prop_reject_iff_overflow(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
            let result = Frame::new(&bytes, OverflowPolicy::Reject);
            if bytes.len() > FRAME_CAPACITY {
                prop_assert_eq!(result, Err(FrameError::Overflow));
            } else {
                let frame = result.unwrap();
                prop_assert_eq!(frame.as_bytes(), &bytes[..]);
            }
        }

        #[test]
        fn prop_decode_is_bounded(bytes in proptest::collection::vec(any::<u8>(), 0..400)) {
            let decoded = decode(&bytes);
            prop_assert!(decoded.len() <= FRAME_CAPACITY);
            prop_assert!(decoded.len() <= bytes.len());
            prop_assert!(!decoded.as_bytes().contains(&0));
        }
    }
}
