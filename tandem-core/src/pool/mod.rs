//! Transaction buffer pool
//!
//! Buffers handed to the link driver must be word-aligned and must not be
//! touched by anyone else while a transaction may be clocking them. The
//! pool owns all buffer memory in place and hands out [`BufferPair`]
//! tokens; the memory behind a token is only reachable through the pool and
//! only while the token is live.
//!
//! ```text
//!     FREE ──acquire()──> ACQUIRED (zeroed) ──release()──> FREE
//! ```

pub mod buffer;
pub mod slots;

pub use buffer::DmaBuf;
pub use slots::{BufferPair, BufferPool, PoolError};
