//! Main tab updater that runs a whole session update

use log::info;

use crate::config::Config;
use crate::ledger::LedgerParser;
use crate::reconciliation::SheetReconciler;
use crate::traits::*;
use crate::types::*;

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The operator cancelled before anything was written
    Cancelled,
    /// Every delta was applied
    Applied(ReconcileReport),
}

/// Runs the single pass: read the ledger, parse it, reconcile the sheet
#[derive(Debug, Clone, Default)]
pub struct TabUpdater {
    parser: LedgerParser,
    reconciler: SheetReconciler,
}

impl TabUpdater {
    /// Create an updater from explicit parts
    pub fn new(parser: LedgerParser, reconciler: SheetReconciler) -> Self {
        Self { parser, reconciler }
    }

    /// Create an updater following a configuration document
    pub fn from_config(config: &Config) -> Self {
        Self {
            parser: LedgerParser::with_name_policy(config.name_policy),
            reconciler: SheetReconciler::new(config.currency.clone())
                .with_new_row_policy(config.new_row_policy)
                .with_totals_label(config.totals_label.clone()),
        }
    }

    pub fn parser(&self) -> &LedgerParser {
        &self.parser
    }

    pub fn reconciler(&self) -> &SheetReconciler {
        &self.reconciler
    }

    /// Parse a ledger and apply it to the sheet.
    ///
    /// The whole ledger is parsed before the sheet is touched, so a
    /// malformed ledger leaves the sheet unchanged.
    pub async fn apply_ledger<S>(&self, sheet: &mut S, ledger: &str) -> TabResult<ReconcileReport>
    where
        S: Worksheet + ?Sized,
    {
        let deltas = self.parser.parse(ledger)?;
        info!("Parsed ledger with {} players", deltas.len());
        self.reconciler.reconcile(sheet, &deltas).await
    }

    /// Ask the form for a ledger and apply it, unless the operator cancels
    pub async fn run<F, S>(&self, form: &mut F, sheet: &mut S) -> TabResult<RunOutcome>
    where
        F: LedgerForm + ?Sized,
        S: Worksheet + ?Sized,
    {
        let ledger = match form.read_ledger()? {
            FormSubmission::Cancelled => {
                info!("Ledger entry cancelled; sheet left untouched");
                return Ok(RunOutcome::Cancelled);
            }
            FormSubmission::Submitted(text) => text,
        };

        let report = self.apply_ledger(sheet, &ledger).await?;
        Ok(RunOutcome::Applied(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_sheet::MemorySheet;
    use crate::utils::CurrencyFormat;

    struct ScriptedForm(Option<FormSubmission>);

    impl LedgerForm for ScriptedForm {
        fn read_ledger(&mut self) -> TabResult<FormSubmission> {
            self.0
                .take()
                .ok_or_else(|| TabError::Sheet("form already read".to_string()))
        }
    }

    fn balance_sheet() -> MemorySheet {
        MemorySheet::from_inputs(
            vec![
                vec!["", "", "", "", "", ""],
                vec!["Alice", "$100.00", "", "$0.00", "$0.00", "=B2+D2+E2"],
                vec!["Bob", "$20.00", "", "$0.00", "$0.00", "=B3+D3+E3"],
                vec!["", "", "", "", "", ""],
                vec!["SUM OF OWED/OWING:", "", "", "", "", ""],
                vec!["", "=SUM(B2:B3)", "", "=SUM(D2:D3)", "=SUM(E2:E3)", "=SUM(F2:F3)"],
            ],
            CurrencyFormat::en_us(),
        )
    }

    #[tokio::test]
    async fn test_cancel_leaves_sheet_untouched() {
        let updater = TabUpdater::default();
        let mut sheet = balance_sheet();
        let before = sheet.to_inputs();
        let mut form = ScriptedForm(Some(FormSubmission::Cancelled));

        let outcome = updater.run(&mut form, &mut sheet).await.unwrap();

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(sheet.to_inputs(), before);
    }

    #[tokio::test]
    async fn test_malformed_ledger_leaves_sheet_untouched() {
        let updater = TabUpdater::default();
        let mut sheet = balance_sheet();
        let before = sheet.to_inputs();
        let mut form = ScriptedForm(Some(FormSubmission::Submitted(
            "Alice @ x\n10 20 0 ten\nBob @ y\n10 0 0 -10".to_string(),
        )));

        let result = updater.run(&mut form, &mut sheet).await;

        assert!(matches!(result, Err(TabError::Format(_))));
        assert_eq!(sheet.to_inputs(), before);
    }

    #[tokio::test]
    async fn test_submitted_ledger_is_applied() {
        let updater = TabUpdater::from_config(&Config::new("tab"));
        let mut sheet = balance_sheet();
        let mut form = ScriptedForm(Some(FormSubmission::Submitted(
            "bob @ yDETAILS\n10 40 0 30\ncarol @ zDETAILS\n40 10 0 -30".to_string(),
        )));

        let outcome = updater.run(&mut form, &mut sheet).await.unwrap();

        let RunOutcome::Applied(report) = outcome else {
            panic!("expected the ledger to be applied");
        };
        assert_eq!(report.updated, vec!["Bob".to_string()]);
        assert_eq!(report.inserted, vec!["Carol".to_string()]);
        assert_eq!(report.totals_row, Some(7));
    }
}
