//! Ledger module containing cash-out ledger parsing and name normalization

pub mod names;
pub mod parser;

pub use names::*;
pub use parser::*;
