//! Word-aligned transaction buffer

use tandem_protocol::FRAME_CAPACITY;

/// One frame-sized, word-aligned buffer
///
/// The alignment satisfies DMA and PIO FIFO word access on the supported
/// chips. Only the pool creates these.
#[repr(C, align(4))]
#[derive(Clone, Copy)]
pub struct DmaBuf {
    bytes: [u8; FRAME_CAPACITY],
}

impl DmaBuf {
    pub(crate) const ZEROED: Self = Self {
        bytes: [0; FRAME_CAPACITY],
    };

    /// Buffer contents
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable buffer contents
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Fill with zeros
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Buffer length (always the frame capacity)
    pub const fn len(&self) -> usize {
        FRAME_CAPACITY
    }

    /// Always false; present for API symmetry with slices
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Start address, for placement checks
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }
}

impl core::fmt::Debug for DmaBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaBuf").field("addr", &self.as_ptr()).finish()
    }
}
