//! Core types and data structures for the tab updater

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from normalized player name to net result for one session.
///
/// Ordered by name so that every run walks the players in the same order.
pub type DeltasMap = BTreeMap<String, BigDecimal>;

/// One player's line in a cash-out ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Normalized (Title Case) player name
    pub player: String,
    /// Total bought in
    pub buy_in: BigDecimal,
    /// Total cashed out
    pub buy_out: BigDecimal,
    /// Stack still on the table
    pub stack: BigDecimal,
    /// Net result for the session
    pub net: BigDecimal,
}

impl LedgerEntry {
    /// Create a new ledger entry
    pub fn new(
        player: String,
        buy_in: BigDecimal,
        buy_out: BigDecimal,
        stack: BigDecimal,
        net: BigDecimal,
    ) -> Self {
        Self {
            player,
            buy_in,
            buy_out,
            stack,
            net,
        }
    }
}

/// Contents of a single sheet cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    /// Nothing in the cell
    #[default]
    Empty,
    /// A plain number
    Number(BigDecimal),
    /// Literal text
    Text(String),
    /// A formula, stored with its leading `=`
    Formula(String),
}

impl CellValue {
    /// Build a formula value, adding the leading `=` if missing
    pub fn formula(expr: impl Into<String>) -> Self {
        let expr = expr.into();
        if expr.starts_with('=') {
            CellValue::Formula(expr)
        } else {
            CellValue::Formula(format!("={}", expr))
        }
    }

    /// Build a text value
    pub fn text(text: impl Into<String>) -> Self {
        CellValue::Text(text.into())
    }

    /// Whether the cell holds nothing (an empty string counts as nothing)
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(t) => t.is_empty(),
            _ => false,
        }
    }
}

/// How cell contents are rendered when read back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueRenderOption {
    /// Computed and formatted, as displayed to a user
    Formatted,
    /// Computed but not formatted
    Unformatted,
    /// Formulas are returned as written; plain values unformatted
    Formula,
}

/// How written values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueInputOption {
    /// Stored exactly as given
    Raw,
    /// Parsed as if typed by a user: `=` starts a formula, currency and
    /// numeric strings become numbers
    UserEntered,
}

/// Number formats the reconciler applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    Number,
    Currency,
}

/// Direction for range sorts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Summary of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Players whose running balance was adjusted
    pub updated: Vec<String>,
    /// Players appended as new rows
    pub inserted: Vec<String>,
    /// First sheet row (1-based) of the player block
    pub first_row: u32,
    /// Last sheet row (1-based) of the player block after insertions
    pub last_row: u32,
    /// Row whose SUM formulas were rewritten, if any
    pub totals_row: Option<u32>,
    /// When the run finished
    pub completed_at: NaiveDateTime,
}

impl ReconcileReport {
    /// Number of players touched by the run
    pub fn players_touched(&self) -> usize {
        self.updated.len() + self.inserted.len()
    }
}

/// Errors that can occur while updating the tab
#[derive(Debug, thiserror::Error)]
pub enum TabError {
    #[error("Ledger format error: {0}")]
    Format(String),
    #[error("Lookup error: {0}")]
    Lookup(String),
    #[error("Invalid cell: {0}")]
    InvalidCell(String),
    #[error("Sheet error: {0}")]
    Sheet(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tab operations
pub type TabResult<T> = Result<T, TabError>;
