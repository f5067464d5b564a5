//! Reconciliation of session deltas into the running balance sheet
//!
//! The sheet holds one row per player in a contiguous block:
//!
//! | A      | B               | C | D     | E      | F          |
//! |--------|-----------------|---|-------|--------|------------|
//! | player | running balance |   | owed  | owing  | `=B+D+E`   |
//!
//! A totals row sits directly below a fixed label somewhere else on the
//! sheet and sums columns B, D, E and F over the block.

pub mod block;

pub use block::*;

use bigdecimal::{BigDecimal, Zero};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::ledger::normalize_name;
use crate::traits::*;
use crate::types::*;
use crate::utils::a1::{column_letters, CellRange, CellRef};
use crate::utils::currency::CurrencyFormat;

/// Label directly above the totals row
pub const TOTALS_LABEL: &str = "SUM OF OWED/OWING:";

pub const NAME_COL: u32 = 1;
pub const BALANCE_COL: u32 = 2;
pub const SPACER_COL: u32 = 3;
pub const OWED_COL: u32 = 4;
pub const OWING_COL: u32 = 5;
pub const TOTAL_COL: u32 = 6;

/// Columns the totals row sums over the block
const TOTALS_COLS: [u32; 4] = [BALANCE_COL, OWED_COL, OWING_COL, TOTAL_COL];

/// What goes into the owed and owing columns of a newly inserted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NewRowPolicy {
    /// Both start at zero
    #[default]
    Zero,
    /// Both start at the player's session delta
    Delta,
}

/// One change to the player block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlannedChange {
    /// Add `delta` to the running balance of an existing row
    Update {
        row: u32,
        player: String,
        delta: BigDecimal,
    },
    /// Insert a new row for a player not yet on the sheet
    Insert {
        row: u32,
        player: String,
        delta: BigDecimal,
    },
}

impl PlannedChange {
    pub fn player(&self) -> &str {
        match self {
            PlannedChange::Update { player, .. } | PlannedChange::Insert { player, .. } => player,
        }
    }
}

/// Everything a reconciliation run will do, computed before touching the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    /// First row of the block
    pub first_row: u32,
    /// Last row of the block before any insertion
    pub last_row: u32,
    /// Changes in application order
    pub changes: Vec<PlannedChange>,
}

impl ReconcilePlan {
    /// Number of rows the block grows by
    pub fn inserted_count(&self) -> u32 {
        self.changes
            .iter()
            .filter(|c| matches!(c, PlannedChange::Insert { .. }))
            .count() as u32
    }

    /// Whether any row gets inserted
    pub fn grows_block(&self) -> bool {
        self.inserted_count() > 0
    }

    /// Last row of the block once every insertion is done
    pub fn final_last_row(&self) -> u32 {
        self.last_row + self.inserted_count()
    }

    /// The range sorted after all changes: columns A through E of the block
    pub fn sort_range(&self) -> CellRange {
        CellRange::rows(self.first_row, self.final_last_row(), NAME_COL, OWING_COL)
    }

    /// SUM formulas for the totals row, spanning the final block
    pub fn totals_formulas(&self, totals_row: u32) -> Vec<SheetCell> {
        TOTALS_COLS
            .iter()
            .map(|&col| {
                let letters = column_letters(col);
                SheetCell::new(
                    CellRef::new(totals_row, col),
                    CellValue::formula(format!(
                        "SUM({}{}:{}{})",
                        letters,
                        self.first_row,
                        letters,
                        self.final_last_row()
                    )),
                )
            })
            .collect()
    }
}

/// Applies session deltas to the balance sheet
#[derive(Debug, Clone)]
pub struct SheetReconciler {
    currency: CurrencyFormat,
    new_row_policy: NewRowPolicy,
    totals_label: String,
}

impl Default for SheetReconciler {
    fn default() -> Self {
        Self::new(CurrencyFormat::default())
    }
}

impl SheetReconciler {
    /// Create a reconciler writing amounts with `currency`
    pub fn new(currency: CurrencyFormat) -> Self {
        Self {
            currency,
            new_row_policy: NewRowPolicy::default(),
            totals_label: TOTALS_LABEL.to_string(),
        }
    }

    /// Choose what new rows get in the owed and owing columns
    pub fn with_new_row_policy(mut self, policy: NewRowPolicy) -> Self {
        self.new_row_policy = policy;
        self
    }

    /// Use a different label to find the totals row
    pub fn with_totals_label(mut self, label: impl Into<String>) -> Self {
        self.totals_label = label.into();
        self
    }

    /// Work out the changes for `deltas` given the name column.
    ///
    /// Players are keyed by normalized name; keys that normalize to the same
    /// name are summed into one change. Existing players are matched against
    /// the block, new players are appended one after another directly below
    /// it. Zero deltas for existing players are dropped.
    pub fn plan(&self, column: &[String], deltas: &DeltasMap) -> TabResult<ReconcilePlan> {
        let block = PlayerBlock::locate(column)?;
        let mut next_new_row = block.last_row() + 1;
        let mut changes = Vec::with_capacity(deltas.len());

        for (player, delta) in &Self::normalize_deltas(deltas) {
            match block.row_of(player) {
                Some(_) if delta.is_zero() => {
                    debug!("Skipping {}: zero delta", player);
                }
                Some(row) => changes.push(PlannedChange::Update {
                    row,
                    player: player.clone(),
                    delta: delta.clone(),
                }),
                None => {
                    changes.push(PlannedChange::Insert {
                        row: next_new_row,
                        player: player.clone(),
                        delta: delta.clone(),
                    });
                    next_new_row += 1;
                }
            }
        }

        Ok(ReconcilePlan {
            first_row: block.first_row(),
            last_row: block.last_row(),
            changes,
        })
    }

    /// Re-key `deltas` by normalized name, summing keys that collapse together
    fn normalize_deltas(deltas: &DeltasMap) -> DeltasMap {
        let mut normalized = DeltasMap::new();
        for (player, delta) in deltas {
            let name = normalize_name(player);
            match normalized.get_mut(&name) {
                Some(total) => {
                    warn!("Merging delta for {} into {}", player, name);
                    *total += delta;
                }
                None => {
                    normalized.insert(name, delta.clone());
                }
            }
        }
        normalized
    }

    /// Read the sheet, plan the changes, and apply them
    pub async fn reconcile<S>(
        &self,
        sheet: &mut S,
        deltas: &DeltasMap,
    ) -> TabResult<ReconcileReport>
    where
        S: Worksheet + ?Sized,
    {
        let column = sheet.col_values(NAME_COL).await?;
        let plan = self.plan(&column, deltas)?;
        self.apply(sheet, &plan).await
    }

    /// Apply a plan: adjust balances, insert rows, sort the block, and
    /// refresh the totals row if the block grew.
    ///
    /// Mutations already made stay in place if a later step fails.
    pub async fn apply<S>(&self, sheet: &mut S, plan: &ReconcilePlan) -> TabResult<ReconcileReport>
    where
        S: Worksheet + ?Sized,
    {
        let mut updated = Vec::new();
        let mut inserted = Vec::new();

        for change in &plan.changes {
            match change {
                PlannedChange::Update { row, player, delta } => {
                    self.adjust_balance(sheet, *row, delta).await?;
                    debug!("Adjusted {} (row {}) by {}", player, row, delta);
                    updated.push(player.clone());
                }
                PlannedChange::Insert { row, player, delta } => {
                    self.insert_player(sheet, *row, player, delta).await?;
                    debug!("Inserted {} at row {} with {}", player, row, delta);
                    inserted.push(player.clone());
                }
            }
        }

        sheet
            .sort_range(&plan.sort_range(), BALANCE_COL, SortOrder::Descending)
            .await?;

        let totals_row = if plan.grows_block() {
            Some(self.refresh_totals(sheet, plan).await?)
        } else {
            None
        };

        info!(
            "Reconciled {} players: {} updated, {} inserted",
            updated.len() + inserted.len(),
            updated.len(),
            inserted.len()
        );

        Ok(ReconcileReport {
            updated,
            inserted,
            first_row: plan.first_row,
            last_row: plan.final_last_row(),
            totals_row,
            completed_at: chrono::Utc::now().naive_utc(),
        })
    }

    /// Add `delta` to the balance cell, keeping any formula already there
    pub fn add_delta(&self, current: CellValue, delta: &BigDecimal) -> TabResult<CellValue> {
        match current {
            CellValue::Empty => Ok(CellValue::Number(delta.clone())),
            CellValue::Number(n) => Ok(CellValue::Number(n + delta)),
            CellValue::Formula(f) => {
                let op = if *delta < BigDecimal::zero() { "-" } else { "+" };
                Ok(CellValue::Formula(format!("{}{}{}", f, op, delta.abs())))
            }
            CellValue::Text(text) => match self.currency.parse(&text) {
                Some(n) => Ok(CellValue::Number(n + delta)),
                None => Err(TabError::InvalidCell(format!(
                    "running balance '{}' is not a number",
                    text
                ))),
            },
        }
    }

    async fn adjust_balance<S>(&self, sheet: &mut S, row: u32, delta: &BigDecimal) -> TabResult<()>
    where
        S: Worksheet + ?Sized,
    {
        let current = sheet
            .cell(row, BALANCE_COL, ValueRenderOption::Formula)
            .await?;
        let updated = self.add_delta(current, delta).map_err(|e| match e {
            TabError::InvalidCell(msg) => {
                TabError::InvalidCell(format!("{} at {}", msg, CellRef::new(row, BALANCE_COL)))
            }
            other => other,
        })?;
        sheet.update_cell(row, BALANCE_COL, updated).await
    }

    /// Cells for a newly inserted player row
    pub fn new_row_values(&self, row: u32, player: &str, delta: &BigDecimal) -> Vec<CellValue> {
        let side = match self.new_row_policy {
            NewRowPolicy::Zero => BigDecimal::zero(),
            NewRowPolicy::Delta => delta.clone(),
        };

        vec![
            CellValue::text(player),
            CellValue::text(self.currency.format(delta)),
            CellValue::text(""),
            CellValue::text(self.currency.format(&side)),
            CellValue::text(self.currency.format(&side)),
            CellValue::formula(format!("B{row}+D{row}+E{row}")),
        ]
    }

    async fn insert_player<S>(
        &self,
        sheet: &mut S,
        row: u32,
        player: &str,
        delta: &BigDecimal,
    ) -> TabResult<()>
    where
        S: Worksheet + ?Sized,
    {
        let values = self.new_row_values(row, player, delta);
        sheet
            .insert_row(values, row, ValueInputOption::UserEntered)
            .await?;
        sheet
            .format_range(
                &CellRange::rows(row, row, BALANCE_COL, OWED_COL),
                NumberFormat::Currency,
            )
            .await
    }

    async fn refresh_totals<S>(&self, sheet: &mut S, plan: &ReconcilePlan) -> TabResult<u32>
    where
        S: Worksheet + ?Sized,
    {
        let label = sheet.find(&self.totals_label).await?.ok_or_else(|| {
            TabError::Lookup(format!(
                "totals label '{}' not found on the sheet",
                self.totals_label
            ))
        })?;
        let totals_row = label.row + 1;

        let existing = sheet
            .range(&CellRange::rows(totals_row, totals_row, BALANCE_COL, TOTAL_COL))
            .await?;
        let formulas = plan.totals_formulas(totals_row);
        let batch: Vec<SheetCell> = existing
            .into_iter()
            .filter_map(|cell| {
                formulas
                    .iter()
                    .find(|f| f.at == cell.at)
                    .map(|f| SheetCell::new(cell.at, f.value.clone()))
            })
            .collect();

        sheet
            .update_cells(batch, ValueInputOption::UserEntered)
            .await?;
        debug!(
            "Totals row {} now sums rows {}..={}",
            totals_row,
            plan.first_row,
            plan.final_last_row()
        );
        Ok(totals_row)
    }
}
