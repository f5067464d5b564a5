//! CSV-file-backed workbook for running against a local sheet

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::*;
use crate::utils::currency::CurrencyFormat;
use crate::utils::memory_sheet::MemorySheet;

fn csv_error(path: &Path, err: csv::Error) -> TabError {
    TabError::Sheet(format!("{}: {}", path.display(), err))
}

/// A single-sheet workbook stored as CSV.
///
/// Cells hold what a user would type: formulas keep their leading `=`,
/// currency amounts are written formatted. Loading re-interprets every
/// cell the same way a spreadsheet does for user-entered input.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    path: PathBuf,
    sheet: MemorySheet,
}

impl CsvWorkbook {
    /// Load a workbook from disk
    pub fn open(path: impl Into<PathBuf>, currency: CurrencyFormat) -> TabResult<Self> {
        let path = path.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| csv_error(&path, e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(&path, e))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        debug!("Loaded {} rows from {}", rows.len(), path.display());

        Ok(Self {
            sheet: MemorySheet::from_inputs(rows, currency),
            path,
        })
    }

    /// Where the workbook is saved
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet(&self) -> &MemorySheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut MemorySheet {
        &mut self.sheet
    }

    /// Write the sheet back to its file.
    ///
    /// The new contents go to a sibling temporary file first and replace
    /// the original only once fully written.
    pub fn save(&self) -> TabResult<()> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(&tmp)
                .map_err(|e| csv_error(&tmp, e))?;
            for row in self.sheet.to_inputs() {
                writer.write_record(&row).map_err(|e| csv_error(&tmp, e))?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("Saved {}", self.path.display());
        Ok(())
    }
}
