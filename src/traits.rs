//! Traits for the sheet and form collaborators

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::a1::{CellRange, CellRef};

/// A cell position together with its contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCell {
    pub at: CellRef,
    pub value: CellValue,
}

impl SheetCell {
    pub fn new(at: CellRef, value: CellValue) -> Self {
        Self { at, value }
    }
}

/// Storage abstraction for the balance sheet
///
/// This trait lets the reconciler work against any spreadsheet backend
/// (a remote spreadsheet service, a local CSV file, an in-memory grid) by
/// implementing these methods. Rows and columns are 1-based.
#[async_trait]
pub trait Worksheet: Send + Sync {
    /// Formatted values of a whole column, with trailing empty cells dropped
    async fn col_values(&self, col: u32) -> TabResult<Vec<String>>;

    /// Read one cell
    async fn cell(&self, row: u32, col: u32, render: ValueRenderOption) -> TabResult<CellValue>;

    /// Overwrite one cell, keeping its number format
    async fn update_cell(&mut self, row: u32, col: u32, value: CellValue) -> TabResult<()>;

    /// Insert a row at `index`, pushing the existing row at `index` and
    /// everything below it down by one
    async fn insert_row(
        &mut self,
        values: Vec<CellValue>,
        index: u32,
        input: ValueInputOption,
    ) -> TabResult<()>;

    /// Apply a number format to every cell in a range
    async fn format_range(&mut self, range: &CellRange, format: NumberFormat) -> TabResult<()>;

    /// First cell whose displayed text equals `text`
    async fn find(&self, text: &str) -> TabResult<Option<CellRef>>;

    /// Read every cell in a range, row by row, as written
    async fn range(&self, range: &CellRange) -> TabResult<Vec<SheetCell>>;

    /// Write a batch of cells in one update
    async fn update_cells(
        &mut self,
        cells: Vec<SheetCell>,
        input: ValueInputOption,
    ) -> TabResult<()>;

    /// Sort the rows of a range by one of its columns
    async fn sort_range(
        &mut self,
        range: &CellRange,
        sort_col: u32,
        order: SortOrder,
    ) -> TabResult<()>;
}

/// What the operator did with the ledger form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    /// The pasted ledger text
    Submitted(String),
    /// Cancel pressed or the form was closed
    Cancelled,
}

/// Source of the pasted ledger text
pub trait LedgerForm {
    /// Block until the operator submits or cancels
    fn read_ledger(&mut self) -> TabResult<FormSubmission>;
}
