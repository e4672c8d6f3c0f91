//! Fixed-slot pool of transmit/receive buffer pairs

use super::buffer::DmaBuf;

/// Errors from the buffer pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// Every pair is currently acquired
    Exhausted,
    /// The pair is not acquired from this pool
    NotAcquired,
}

/// Token for one acquired buffer pair
///
/// Not `Clone`: a pair has exactly one owner until it is released.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an acquired pair must be released back to its pool"]
pub struct BufferPair {
    slot: usize,
}

impl BufferPair {
    /// Pool slot backing this pair
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Clone, Copy)]
struct Slot {
    tx: DmaBuf,
    rx: DmaBuf,
    acquired: bool,
}

impl Slot {
    const FREE: Self = Self {
        tx: DmaBuf::ZEROED,
        rx: DmaBuf::ZEROED,
        acquired: false,
    };
}

/// Pool of `N` buffer pairs
///
/// All memory lives inside the pool, so placing the pool in DMA-capable
/// RAM places every buffer there.
pub struct BufferPool<const N: usize> {
    slots: [Slot; N],
}

impl<const N: usize> Default for BufferPool<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BufferPool<N> {
    /// Create a pool with every pair free
    pub const fn new() -> Self {
        Self {
            slots: [Slot::FREE; N],
        }
    }

    /// Acquire a zeroed pair
    pub fn acquire(&mut self) -> Result<BufferPair, PoolError> {
        let (slot, entry) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| !s.acquired)
            .ok_or(PoolError::Exhausted)?;

        entry.tx.clear();
        entry.rx.clear();
        entry.acquired = true;
        Ok(BufferPair { slot })
    }

    /// Return a pair to the pool
    pub fn release(&mut self, pair: BufferPair) -> Result<(), PoolError> {
        match self.slots.get_mut(pair.slot) {
            Some(entry) if entry.acquired => {
                entry.acquired = false;
                Ok(())
            }
            _ => Err(PoolError::NotAcquired),
        }
    }

    /// Transmit and receive buffers of an acquired pair
    ///
    /// # Panics
    /// Panics if `pair` did not come from this pool. Pairs cannot be forged
    /// outside this module, so that only happens when mixing pools.
    pub fn buffers_mut(&mut self, pair: &BufferPair) -> (&mut DmaBuf, &mut DmaBuf) {
        let entry = &mut self.slots[pair.slot];
        assert!(entry.acquired, "buffer pair used after release");
        (&mut entry.tx, &mut entry.rx)
    }

    /// Number of pairs currently acquired
    pub fn in_use(&self) -> usize {
        self.slots.iter().filter(|s| s.acquired).count()
    }

    /// Total number of pairs
    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(buf: &DmaBuf) -> core::ops::Range<usize> {
        let start = buf.as_ptr() as usize;
        start..start + buf.len()
    }

    fn overlaps(a: &core::ops::Range<usize>, b: &core::ops::Range<usize>) -> bool {
        a.start < b.end && b.start < a.end
    }

    #[test]
    fn test_acquire_is_zeroed() {
        let mut pool = BufferPool::<1>::new();
        let pair = pool.acquire().unwrap();
        {
            let (tx, rx) = pool.buffers_mut(&pair);
            tx.as_mut_slice().fill(0xAA);
            rx.as_mut_slice().fill(0x55);
        }
        pool.release(pair).unwrap();

        let pair = pool.acquire().unwrap();
        let (tx, rx) = pool.buffers_mut(&pair);
        assert!(tx.as_slice().iter().all(|&b| b == 0));
        assert!(rx.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_exhaustion() {
        let mut pool = BufferPool::<2>::new();
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.acquire(), Err(PoolError::Exhausted));
        assert_eq!(pool.in_use(), 2);

        pool.release(a).unwrap();
        let c = pool.acquire().unwrap();
        assert_eq!(pool.in_use(), 2);
        pool.release(b).unwrap();
        pool.release(c).unwrap();
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_live_pairs_never_alias() {
        let mut pool = BufferPool::<4>::new();
        let pairs = [
            pool.acquire().unwrap(),
            pool.acquire().unwrap(),
            pool.acquire().unwrap(),
            pool.acquire().unwrap(),
        ];

        let mut spans = heapless::Vec::<_, 8>::new();
        for pair in &pairs {
            let (tx, rx) = pool.buffers_mut(pair);
            spans.push(span(tx)).unwrap();
            spans.push(span(rx)).unwrap();
        }

        for (i, a) in spans.iter().enumerate() {
            for b in spans.iter().skip(i + 1) {
                assert!(!overlaps(a, b));
            }
        }

        for pair in pairs {
            pool.release(pair).unwrap();
        }
    }

    #[test]
    fn test_back_to_back_reuses_slot() {
        let mut pool = BufferPool::<2>::new();
        for _ in 0..10 {
            let pair = pool.acquire().unwrap();
            assert_eq!(pair.slot(), 0);
            pool.release(pair).unwrap();
        }
    }

    #[test]
    fn test_release_foreign_pair() {
        let mut small = BufferPool::<1>::new();
        let mut big = BufferPool::<4>::new();
        let _first = big.acquire().unwrap();
        let second = big.acquire().unwrap();
        assert_eq!(second.slot(), 1);
        assert_eq!(small.release(second), Err(PoolError::NotAcquired));
    }

    mod props {
        extern crate std;

        use crate::pool::{BufferPair, BufferPool, PoolError};
        use proptest::prelude::*;
        use std::vec::Vec;

        proptest! {
            /// Each live pair keeps its own contents whatever the other
            /// pairs do in between
            #[test]
            fn prop_live_pairs_are_isolated(
                ops in proptest::collection::vec((any::<bool>(), 0usize..4), 0..64)
            ) {
                let mut pool = BufferPool::<4>::new();
                let mut live: Vec<(BufferPair, u8)> = Vec::new();
                let mut tag = 0u8;

                for (acquire, pick) in ops {
                    if acquire {
                        match pool.acquire() {
                            Ok(pair) => {
                                tag = tag.wrapping_add(1).max(1);
                                let (tx, rx) = pool.buffers_mut(&pair);
                                prop_assert!(tx.as_slice().iter().all(|&b| b == 0));
                                prop_assert!(rx.as_slice().iter().all(|&b| b == 0));
                                tx.as_mut_slice().fill(tag);
                                rx.as_mut_slice().fill(!tag);
                                live.push((pair, tag));
                            }
                            Err(e) => {
                                prop_assert_eq!(e, PoolError::Exhausted);
                                prop_assert_eq!(live.len(), 4);
                            }
                        }
                    } else if !live.is_empty() {
                        let (pair, _) = live.swap_remove(pick % live.len());
                        prop_assert_eq!(pool.release(pair), Ok(()));
                    }

                    prop_assert_eq!(pool.in_use(), live.len());
                    for (pair, tag) in &live {
                        let (tx, rx) = pool.buffers_mut(pair);
                        prop_assert!(tx.as_slice().iter().all(|b| b == tag));
                        prop_assert!(rx.as_slice().iter().all(|&b| b == !*tag));
                    }
                }

                for (pair, _) in live {
                    prop_assert_eq!(pool.release(pair), Ok(()));
                }
            }
        }
    }

    #[test]
    fn test_buffers_are_word_aligned() {
        let mut pool = BufferPool::<3>::new();
        let pair = pool.acquire().unwrap();
        let (tx, rx) = pool.buffers_mut(&pair);
        assert_eq!(tx.as_ptr() as usize % 4, 0);
        assert_eq!(rx.as_ptr() as usize % 4, 0);
    }
}
