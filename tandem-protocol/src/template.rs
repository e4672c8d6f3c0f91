//! Sequenced text payloads
//!
//! Each side of the link sends human-readable text carrying a running
//! sequence number, e.g. `"Sender, transmission no. 0042."`. The template
//! marks where the number goes with [`SEQ_PLACEHOLDER`]; a template without
//! a placeholder gets the number appended after a space.

use core::fmt::{self, Write};

use heapless::Vec;

use crate::frame::FRAME_CAPACITY;

/// Marker replaced by the zero-padded sequence number
pub const SEQ_PLACEHOLDER: &str = "{seq}";

/// Writer that keeps whole chars only and drops everything after overflow
struct Bounded<'a> {
    out: &'a mut Vec<u8, FRAME_CAPACITY>,
    truncated: bool,
}

impl Write for Bounded<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }

        if self.out.extend_from_slice(s.as_bytes()).is_ok() {
            return Ok(());
        }

        // Did not fit as a whole: copy char by char up to the boundary
        for ch in s.chars() {
            let mut utf8 = [0u8; 4];
            let encoded = ch.encode_utf8(&mut utf8);
            if self.out.extend_from_slice(encoded.as_bytes()).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

/// Render `template` with `sequence` into a capacity-bounded buffer
///
/// Returns the rendered bytes and whether anything was cut off.
pub fn render(template: &str, sequence: u32) -> (Vec<u8, FRAME_CAPACITY>, bool) {
    let mut payload = Vec::new();
    let mut w = Bounded {
        out: &mut payload,
        truncated: false,
    };

    // Bounded never returns an error, so the write! results are always Ok
    if template.contains(SEQ_PLACEHOLDER) {
        let mut parts = template.split(SEQ_PLACEHOLDER);
        if let Some(first) = parts.next() {
            let _ = w.write_str(first);
        }
        for part in parts {
            let _ = write!(w, "{:04}", sequence);
            let _ = w.write_str(part);
        }
    } else if template.is_empty() {
        let _ = write!(w, "{:04}", sequence);
    } else {
        let _ = write!(w, "{} {:04}", template, sequence);
    }

    let truncated = w.truncated;
    (payload, truncated)
}
