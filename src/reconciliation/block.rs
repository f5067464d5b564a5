//! Locating the contiguous block of player rows

use log::warn;
use std::collections::HashMap;

use crate::ledger::normalize_name;
use crate::types::*;

/// The contiguous run of player rows in the name column
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBlock {
    first_row: u32,
    last_row: u32,
    rows_by_player: HashMap<String, u32>,
}

impl PlayerBlock {
    /// Locate the block in a column read top to bottom.
    ///
    /// The block starts at the first non-empty cell and ends just before
    /// the next empty cell, or at the end of the column.
    pub fn locate(column: &[String]) -> TabResult<Self> {
        let is_filled = |cell: &String| !cell.trim().is_empty();

        let first_idx = column.iter().position(is_filled).ok_or_else(|| {
            TabError::Lookup("no player rows found in the name column".to_string())
        })?;
        let len = column[first_idx..]
            .iter()
            .position(|cell| !is_filled(cell))
            .unwrap_or(column.len() - first_idx);

        let first_row = first_idx as u32 + 1;
        let last_row = first_row + len as u32 - 1;

        let mut rows_by_player = HashMap::new();
        for (offset, name) in column[first_idx..first_idx + len].iter().enumerate() {
            let row = first_row + offset as u32;
            let key = normalize_name(name);
            if let Some(existing) = rows_by_player.get(&key) {
                warn!(
                    "Player {} appears in rows {} and {}; updates go to row {}",
                    key, existing, row, existing
                );
                continue;
            }
            rows_by_player.insert(key, row);
        }

        Ok(Self {
            first_row,
            last_row,
            rows_by_player,
        })
    }

    /// First sheet row of the block (1-based)
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    /// Last sheet row of the block (1-based)
    pub fn last_row(&self) -> u32 {
        self.last_row
    }

    /// Number of rows in the block; never zero
    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    /// Row holding `player`, compared by normalized name
    pub fn row_of(&self, player: &str) -> Option<u32> {
        self.rows_by_player.get(&normalize_name(player)).copied()
    }
}
