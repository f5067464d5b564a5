//! Applies a pasted ledger to an in-memory balance sheet and prints the result

use pokertab::utils::{CellRef, CurrencyFormat, MemorySheet};
use pokertab::{LedgerParser, NewRowPolicy, SheetReconciler, TabUpdater};

const LEDGER: &str = "\
alice @ 9xk2DETAILS
100 180 0 80
Bob Stone @ 77qaDETAILS
200 90 0 -110
dana @ p0p0DETAILS
50 80 0 30
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Poker Tab - update example\n");

    let mut sheet = MemorySheet::from_inputs(
        vec![
            vec!["", "BALANCE", "", "OWED", "OWING", "TOTAL"],
            vec!["Alice", "$40.00", "", "$0.00", "$0.00", "=B2+D2+E2"],
            vec!["Bob Stone", "$15.00", "", "$0.00", "$0.00", "=B3+D3+E3"],
            vec!["", "", "", "", "", ""],
            vec!["SUM OF OWED/OWING:", "", "", "", "", ""],
            vec!["", "=SUM(B2:B3)", "", "=SUM(D2:D3)", "=SUM(E2:E3)", "=SUM(F2:F3)"],
        ],
        CurrencyFormat::en_us(),
    );

    let updater = TabUpdater::new(
        LedgerParser::new(),
        SheetReconciler::new(CurrencyFormat::en_us()).with_new_row_policy(NewRowPolicy::Zero),
    );
    let report = updater.apply_ledger(&mut sheet, LEDGER).await?;

    println!("Updated: {:?}", report.updated);
    println!("Inserted: {:?}", report.inserted);
    println!();

    for row in 1..=sheet.row_count() {
        let cells: Vec<String> = (1..=6)
            .map(|col| sheet.display(CellRef::new(row, col)))
            .collect();
        println!("{:>3} | {}", row, cells.join(" | "));
    }

    Ok(())
}
