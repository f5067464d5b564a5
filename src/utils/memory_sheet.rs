//! In-memory worksheet implementation for testing and local use

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::traits::*;
use crate::types::*;
use crate::utils::a1::{CellRange, CellRef};
use crate::utils::currency::CurrencyFormat;
use crate::utils::formula;

/// Nested formulas deeper than this are treated as circular
const MAX_FORMULA_DEPTH: usize = 64;

/// Shown in place of a formula that cannot be evaluated
pub const FORMULA_ERROR: &str = "#ERROR!";

/// A cell as stored: its contents plus an optional number format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredCell {
    pub value: CellValue,
    pub format: Option<NumberFormat>,
}

/// In-memory worksheet with just enough spreadsheet behaviour for the
/// balance sheet: formula evaluation, currency rendering, row insertion
/// with reference adjustment, and range sorts.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    rows: Vec<Vec<StoredCell>>,
    currency: CurrencyFormat,
}

impl MemorySheet {
    /// Create an empty sheet using US dollar formatting
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sheet rendering currency with `currency`
    pub fn with_currency(currency: CurrencyFormat) -> Self {
        Self {
            rows: Vec::new(),
            currency,
        }
    }

    /// Build a sheet from user-entered text, one inner vector per row
    pub fn from_inputs<R, S>(rows: R, currency: CurrencyFormat) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sheet = Self::with_currency(currency);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, input) in row.into_iter().enumerate() {
                let cell = sheet.interpret(input.as_ref());
                if cell != StoredCell::default() {
                    *sheet.cell_mut(CellRef::new(r as u32 + 1, c as u32 + 1)) = cell;
                }
            }
        }
        sheet
    }

    /// Currency format used for rendering and parsing
    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    /// Number of rows holding at least one allocated cell
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Stored cell at a position, if allocated
    pub fn get(&self, at: CellRef) -> Option<&StoredCell> {
        if at.row == 0 || at.col == 0 {
            return None;
        }
        self.rows
            .get(at.row as usize - 1)
            .and_then(|row| row.get(at.col as usize - 1))
    }

    /// Contents of a cell as written
    pub fn value(&self, at: CellRef) -> CellValue {
        self.get(at).map(|c| c.value.clone()).unwrap_or_default()
    }

    /// Write a cell as if typed by a user
    pub fn set_input(&mut self, at: CellRef, input: &str) {
        let interpreted = self.interpret(input);
        let cell = self.cell_mut(at);
        cell.value = interpreted.value;
        if interpreted.format.is_some() {
            cell.format = interpreted.format;
        }
    }

    /// Write a cell's contents, keeping its format
    pub fn set_value(&mut self, at: CellRef, value: CellValue) {
        self.cell_mut(at).value = value;
    }

    /// Numeric value of a cell; empty and text cells count as zero
    pub fn evaluate(&self, at: CellRef) -> TabResult<BigDecimal> {
        self.evaluate_at(at, 0)
    }

    /// Text a user would see in the cell; formulas that fail to evaluate
    /// show [`FORMULA_ERROR`]
    pub fn display(&self, at: CellRef) -> String {
        let Some(cell) = self.get(at) else {
            return String::new();
        };
        match &cell.value {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) => self.format_number(n, cell.format),
            CellValue::Formula(_) => match self.evaluate(at) {
                Ok(n) => self.format_number(&n, cell.format),
                Err(_) => FORMULA_ERROR.to_string(),
            },
        }
    }

    /// Every row as user-enterable text, suitable for writing back out
    pub fn to_inputs(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match &cell.value {
                        CellValue::Empty => String::new(),
                        CellValue::Text(text) => text.clone(),
                        CellValue::Formula(f) => f.clone(),
                        CellValue::Number(n) => self.format_number(n, cell.format),
                    })
                    .collect()
            })
            .collect()
    }

    fn format_number(&self, n: &BigDecimal, format: Option<NumberFormat>) -> String {
        match format {
            Some(NumberFormat::Currency) => self.currency.format(n),
            _ => n.to_string(),
        }
    }

    fn evaluate_at(&self, at: CellRef, depth: usize) -> TabResult<BigDecimal> {
        if depth > MAX_FORMULA_DEPTH {
            return Err(TabError::InvalidCell(format!("circular reference through {}", at)));
        }
        match self.get(at).map(|c| &c.value) {
            Some(CellValue::Number(n)) => Ok(n.clone()),
            Some(CellValue::Formula(f)) => {
                formula::evaluate(f, &mut |cell| self.evaluate_at(cell, depth + 1))
            }
            _ => Ok(BigDecimal::zero()),
        }
    }

    fn render(&self, at: CellRef, render: ValueRenderOption) -> TabResult<CellValue> {
        let value = self.value(at);
        match render {
            ValueRenderOption::Formula => Ok(value),
            ValueRenderOption::Unformatted => match value {
                CellValue::Formula(_) => Ok(CellValue::Number(self.evaluate(at)?)),
                other => Ok(other),
            },
            ValueRenderOption::Formatted => match value {
                CellValue::Empty => Ok(CellValue::Empty),
                _ => Ok(CellValue::Text(self.display(at))),
            },
        }
    }

    fn interpret(&self, input: &str) -> StoredCell {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return StoredCell::default();
        }
        if trimmed.starts_with('=') {
            return StoredCell {
                value: CellValue::Formula(trimmed.to_string()),
                format: None,
            };
        }
        if let Ok(n) = BigDecimal::from_str(trimmed) {
            return StoredCell {
                value: CellValue::Number(n),
                format: None,
            };
        }
        if let Some(n) = self.currency.parse(trimmed) {
            return StoredCell {
                value: CellValue::Number(n),
                format: Some(NumberFormat::Currency),
            };
        }
        StoredCell {
            value: CellValue::Text(input.to_string()),
            format: None,
        }
    }

    fn store(&mut self, at: CellRef, value: CellValue, input: ValueInputOption) {
        match (input, value) {
            (ValueInputOption::UserEntered, CellValue::Text(text)) => self.set_input(at, &text),
            (_, value) => self.set_value(at, value),
        }
    }

    fn cell_mut(&mut self, at: CellRef) -> &mut StoredCell {
        let (r, c) = (at.row.max(1) as usize - 1, at.col.max(1) as usize - 1);
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let row = &mut self.rows[r];
        if row.len() <= c {
            row.resize_with(c + 1, StoredCell::default);
        }
        &mut row[c]
    }

    fn shift_formulas(&mut self, from_row: u32) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if let CellValue::Formula(f) = &cell.value {
                    cell.value = CellValue::Formula(formula::shift_row_references(f, from_row, 1));
                }
            }
        }
    }
}

#[async_trait]
impl Worksheet for MemorySheet {
    async fn col_values(&self, col: u32) -> TabResult<Vec<String>> {
        let mut values: Vec<String> = (1..=self.row_count())
            .map(|row| self.display(CellRef::new(row, col)))
            .collect();
        while values.last().is_some_and(|v| v.is_empty()) {
            values.pop();
        }
        Ok(values)
    }

    async fn cell(&self, row: u32, col: u32, render: ValueRenderOption) -> TabResult<CellValue> {
        self.render(CellRef::new(row, col), render)
    }

    async fn update_cell(&mut self, row: u32, col: u32, value: CellValue) -> TabResult<()> {
        self.store(CellRef::new(row, col), value, ValueInputOption::UserEntered);
        Ok(())
    }

    async fn insert_row(
        &mut self,
        values: Vec<CellValue>,
        index: u32,
        input: ValueInputOption,
    ) -> TabResult<()> {
        if index == 0 {
            return Err(TabError::Sheet("row index must be at least 1".to_string()));
        }

        let at = index as usize - 1;
        if at <= self.rows.len() {
            self.shift_formulas(index);
            self.rows.insert(at, Vec::new());
        }

        for (c, value) in values.into_iter().enumerate() {
            self.store(CellRef::new(index, c as u32 + 1), value, input);
        }
        Ok(())
    }

    async fn format_range(&mut self, range: &CellRange, format: NumberFormat) -> TabResult<()> {
        for at in range.cells() {
            self.cell_mut(at).format = Some(format);
        }
        Ok(())
    }

    async fn find(&self, text: &str) -> TabResult<Option<CellRef>> {
        for (r, row) in self.rows.iter().enumerate() {
            for c in 0..row.len() {
                let at = CellRef::new(r as u32 + 1, c as u32 + 1);
                if self.display(at) == text {
                    return Ok(Some(at));
                }
            }
        }
        Ok(None)
    }

    async fn range(&self, range: &CellRange) -> TabResult<Vec<SheetCell>> {
        Ok(range
            .cells()
            .map(|at| SheetCell::new(at, self.value(at)))
            .collect())
    }

    async fn update_cells(
        &mut self,
        cells: Vec<SheetCell>,
        input: ValueInputOption,
    ) -> TabResult<()> {
        for cell in cells {
            self.store(cell.at, cell.value, input);
        }
        Ok(())
    }

    async fn sort_range(
        &mut self,
        range: &CellRange,
        sort_col: u32,
        order: SortOrder,
    ) -> TabResult<()> {
        if !(range.start.col..=range.end.col).contains(&sort_col) {
            return Err(TabError::Sheet(format!(
                "sort column {} is outside range {}",
                sort_col, range
            )));
        }

        // Text, empty and broken formula cells sort after every number regardless
        // of direction.
        let mut keyed = Vec::new();
        for row in range.start.row..=range.end.row {
            let at = CellRef::new(row, sort_col);
            let key = match self.value(at) {
                CellValue::Number(n) => Some(n),
                CellValue::Formula(_) => self.evaluate(at).ok(),
                _ => None,
            };
            let cells: Vec<StoredCell> = (range.start.col..=range.end.col)
                .map(|col| self.get(CellRef::new(row, col)).cloned().unwrap_or_default())
                .collect();
            keyed.push((key, cells));
        }

        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => match order {
                SortOrder::Ascending => a.cmp(b),
                SortOrder::Descending => b.cmp(a),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        for (offset, (_, cells)) in keyed.into_iter().enumerate() {
            let row = range.start.row + offset as u32;
            for (i, cell) in cells.into_iter().enumerate() {
                *self.cell_mut(CellRef::new(row, range.start.col + i as u32)) = cell;
            }
        }
        Ok(())
    }
}
