//! Link configuration
//!
//! Board-agnostic settings for both nodes. Pin assignment is not here; it
//! belongs to the board.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ConfigErrorKind, ParseError};
pub use types::*;
