//! Address representation and prefix matching.
//!
//! Addresses are binary; hex parsing and checksum display live here as
//! boundary helpers and never take part in matching.

mod address;
mod prefix;

pub use address::{Address, ADDRESS_LEN};
pub use prefix::PrefixPattern;
