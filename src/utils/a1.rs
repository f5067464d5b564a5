//! A1 notation for cells and ranges
//!
//! Rows and columns are 1-based, matching the way spreadsheets number them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::*;

/// A single cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    /// Create a cell reference; both coordinates are 1-based
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| TabError::Sheet(format!("invalid cell reference '{}'", s)))?;
        let (letters, digits) = s.split_at(split);

        let col = column_index(letters)
            .ok_or_else(|| TabError::Sheet(format!("invalid column in '{}'", s)))?;
        let row = match digits.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(TabError::Sheet(format!("invalid row in '{}'", s))),
        };

        Ok(CellRef { row, col })
    }
}

/// A rectangular block of cells, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Create a range, normalizing so that `start` is the top-left corner
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self {
            start: CellRef::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellRef::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Range spanning whole columns `first_col..=last_col` of rows `first_row..=last_row`
    pub fn rows(first_row: u32, last_row: u32, first_col: u32, last_col: u32) -> Self {
        Self::new(
            CellRef::new(first_row, first_col),
            CellRef::new(last_row, last_col),
        )
    }

    /// Whether a cell lies inside the range
    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row)
            && (self.start.col..=self.end.col).contains(&cell.col)
    }

    /// Every cell in the range, row by row
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellRef::new(row, col))
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for CellRange {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((start, end)) => Ok(CellRange::new(start.parse()?, end.parse()?)),
            None => {
                let cell: CellRef = s.parse()?;
                Ok(CellRange::new(cell, cell))
            }
        }
    }
}

/// Column letters for a 1-based column index (`1` -> `A`, `27` -> `AA`)
pub fn column_letters(col: u32) -> String {
    let mut col = col;
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 1-based column index for a run of column letters, case-insensitive
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    letters.chars().try_fold(0u32, |acc, c| {
        let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as u32;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(6), "F");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_index("aa"), Some(27));
        assert_eq!(column_index(""), None);
    }

    #[test]
    fn test_cell_ref_parse_and_display() {
        let cell: CellRef = "B12".parse().unwrap();
        assert_eq!(cell, CellRef::new(12, 2));
        assert_eq!(cell.to_string(), "B12");
        assert!("B0".parse::<CellRef>().is_err());
        assert!("12".parse::<CellRef>().is_err());
    }

    #[test]
    fn test_range_parse_normalizes_corners() {
        let range: CellRange = "E9:A2".parse().unwrap();
        assert_eq!(range.to_string(), "A2:E9");
        assert!(range.contains(CellRef::new(5, 3)));
        assert!(!range.contains(CellRef::new(10, 1)));
        assert_eq!(range.cells().count(), 40);
    }
}
