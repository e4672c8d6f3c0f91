//! In-memory signal line
//!
//! A single-writer/single-reader atomic level, used where both ends of the
//! line live in one address space (host simulation, tests). The writer and
//! reader halves implement the GPIO traits, so the engines cannot tell it
//! apart from a real pin.

use portable_atomic::{AtomicBool, Ordering};

use tandem_hal::{InputPin, OutputPin};

/// Shared line level
pub struct SharedLevel {
    high: AtomicBool,
    split: AtomicBool,
}

impl Default for SharedLevel {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SharedLevel {
    /// Create a line at the given level
    pub const fn new(high: bool) -> Self {
        Self {
            high: AtomicBool::new(high),
            split: AtomicBool::new(false),
        }
    }

    /// Hand out the writer and reader halves
    ///
    /// Succeeds once; later calls return `None` so there is never more
    /// than one writer or reader.
    pub fn split(&self) -> Option<(LevelWriter<'_>, LevelReader<'_>)> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some((LevelWriter { level: self }, LevelReader { level: self }))
    }

    /// Current level
    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::Acquire)
    }
}

/// Writing half of a [`SharedLevel`]
pub struct LevelWriter<'a> {
    level: &'a SharedLevel,
}

impl OutputPin for LevelWriter<'_> {
    fn set_high(&mut self) {
        self.level.high.store(true, Ordering::Release);
    }

    fn set_low(&mut self) {
        self.level.high.store(false, Ordering::Release);
    }

    fn is_set_high(&self) -> bool {
        self.level.is_high()
    }
}

/// Reading half of a [`SharedLevel`]
pub struct LevelReader<'a> {
    level: &'a SharedLevel,
}

impl InputPin for LevelReader<'_> {
    fn is_high(&mut self) -> bool {
        self.level.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_once() {
        let level = SharedLevel::new(false);
        assert!(level.split().is_some());
        assert!(level.split().is_none());
    }

    #[test]
    fn test_writer_visible_to_reader() {
        let level = SharedLevel::default();
        let (mut writer, mut reader) = level.split().unwrap();
        assert!(!reader.is_high());

        writer.set_high();
        assert!(reader.is_high());
        assert!(writer.is_set_high());

        writer.set_low();
        assert!(reader.is_low());
    }
}
