//! Parsing of reservation chat commands
//!
//! [`scanner`] splits a message into raw fields, [`time`] resolves the time
//! tokens into absolute instants. [`crate::reservation`] ties the two
//! together.

pub mod scanner;
pub mod time;

pub use scanner::{scan_message, RawCommand};
pub use time::{classify, resolve, TimeError, TimeExpr};
