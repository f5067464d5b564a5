//! # Poker Tab
//!
//! Turns the cash-out ledger of an online poker session into per-player
//! results and folds them into a running balance sheet.
//!
//! ## Features
//!
//! - **Ledger parsing**: both copy-paste layouts of the poker client's ledger,
//!   with player names normalized to Title Case
//! - **Reconciliation**: formula-preserving balance updates, new player rows,
//!   block re-sorting, and totals row refresh
//! - **Storage abstraction**: any spreadsheet backend via the [`Worksheet`] trait
//! - **Explicit formatting**: currency formatting passed as configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use pokertab::{parse_ledger, SheetReconciler};
//!
//! let deltas = parse_ledger("Alice @ xid DETAILS 100 150 50 50").unwrap();
//! let names = vec!["Alice".to_string(), "Bob".to_string()];
//!
//! let plan = SheetReconciler::default().plan(&names, &deltas).unwrap();
//! assert_eq!(plan.changes.len(), 1);
//! assert!(!plan.grows_block());
//! ```

pub mod config;
pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod updater;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
pub use updater::*;
pub use utils::{CsvWorkbook, MemorySheet};
