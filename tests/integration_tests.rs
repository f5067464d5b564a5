//! Integration tests for pokertab

use bigdecimal::BigDecimal;
use pokertab::utils::{CellRef, CurrencyFormat, MemorySheet};
use pokertab::{
    parse_ledger, CellValue, Config, LedgerParser, NamePolicy, NewRowPolicy, SheetReconciler,
    TabError, TabUpdater, Worksheet,
};
use std::str::FromStr;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// Title row, blank spacer, three players, blank sentinel, label, totals row
fn balance_sheet() -> MemorySheet {
    MemorySheet::from_inputs(
        vec![
            vec!["", "POKER TAB", "", "", "", ""],
            vec!["", "", "", "", "", ""],
            vec!["Alice", "$120.00", "", "$0.00", "$0.00", "=B3+D3+E3"],
            vec!["Bob", "=40-15", "", "$0.00", "$0.00", "=B4+D4+E4"],
            vec!["Carol", "-$60.00", "", "$0.00", "$0.00", "=B5+D5+E5"],
            vec!["", "", "", "", "", ""],
            vec!["SUM OF OWED/OWING:", "", "", "", "", ""],
            vec!["", "=SUM(B3:B5)", "", "=SUM(D3:D5)", "=SUM(E3:E5)", "=SUM(F3:F5)"],
        ],
        CurrencyFormat::en_us(),
    )
}

async fn names(sheet: &MemorySheet, first: u32, last: u32) -> Vec<String> {
    let column = sheet.col_values(1).await.unwrap();
    column[(first - 1) as usize..last as usize].to_vec()
}

fn balance_of(sheet: &MemorySheet, player: &str) -> BigDecimal {
    let row = (1..=sheet.row_count())
        .find(|&row| sheet.value(CellRef::new(row, 1)) == CellValue::text(player))
        .unwrap_or_else(|| panic!("{} not on sheet", player));
    sheet.evaluate(CellRef::new(row, 2)).unwrap()
}

#[tokio::test]
async fn test_existing_players_keep_running_balance() {
    let mut sheet = balance_sheet();
    let ledger = "Alice @ a1DETAILS\n100 150 0 50\nbob @ b2DETAILS\n100 0 20 -80\nCAROL @ c3DETAILS\n50 80 0 30";

    let report = TabUpdater::default()
        .apply_ledger(&mut sheet, ledger)
        .await
        .unwrap();

    assert_eq!(report.updated.len(), 3);
    assert!(report.inserted.is_empty());
    assert_eq!(report.totals_row, None);
    assert_eq!(balance_of(&sheet, "Alice"), dec("170"));
    assert_eq!(balance_of(&sheet, "Bob"), dec("-55"));
    assert_eq!(balance_of(&sheet, "Carol"), dec("-30"));

    // Bob's balance was a formula and stays one
    let bob_row = (3..=5)
        .find(|&row| sheet.value(CellRef::new(row, 1)) == CellValue::text("Bob"))
        .unwrap();
    assert_eq!(
        sheet.value(CellRef::new(bob_row, 2)),
        CellValue::formula("40-15-80")
    );

    // Totals untouched when no rows were added
    assert_eq!(
        sheet.value(CellRef::new(8, 2)),
        CellValue::formula("SUM(B3:B5)")
    );
    assert_eq!(sheet.evaluate(CellRef::new(8, 2)).unwrap(), dec("85"));
}

#[tokio::test]
async fn test_new_players_are_inserted_sorted_and_totalled() {
    let mut sheet = balance_sheet();
    let ledger = "Alice @ a 100 150 0 50\nDave Jones @ d 100 0 0 -100\nerin @ e 50 100 0 50";

    let report = TabUpdater::default()
        .apply_ledger(&mut sheet, ledger)
        .await
        .unwrap();

    assert_eq!(report.updated, vec!["Alice".to_string()]);
    assert_eq!(
        report.inserted,
        vec!["Dave Jones".to_string(), "Erin".to_string()]
    );
    assert_eq!(report.first_row, 3);
    assert_eq!(report.last_row, 7);
    assert_eq!(report.totals_row, Some(10));

    // Block sorted by running balance, highest first
    assert_eq!(
        names(&sheet, 3, 7).await,
        vec!["Alice", "Erin", "Bob", "Carol", "Dave Jones"]
    );
    assert!(sheet.col_values(1).await.unwrap()[7].is_empty());

    // New rows carry currency values and a row total formula
    let dave_row = 7;
    assert_eq!(sheet.display(CellRef::new(dave_row, 2)), "-$100.00");
    assert_eq!(sheet.display(CellRef::new(dave_row, 4)), "$0.00");
    assert_eq!(sheet.evaluate(CellRef::new(dave_row, 6)).unwrap(), dec("-100"));

    // Totals span exactly the grown block
    for (col, letter) in [(2, "B"), (4, "D"), (5, "E"), (6, "F")] {
        assert_eq!(
            sheet.value(CellRef::new(10, col)),
            CellValue::formula(format!("SUM({letter}3:{letter}7)"))
        );
    }
    assert_eq!(sheet.value(CellRef::new(9, 1)), CellValue::text("SUM OF OWED/OWING:"));
    assert_eq!(sheet.evaluate(CellRef::new(10, 2)).unwrap(), dec("85"));
}

#[tokio::test]
async fn test_repeat_runs_never_duplicate_players() {
    let mut sheet = balance_sheet();
    let updater = TabUpdater::default();

    updater
        .apply_ledger(&mut sheet, "Frank @ f 10 30 0 20\nalice @ a 30 10 0 -20")
        .await
        .unwrap();
    let report = updater
        .apply_ledger(&mut sheet, "FRANK @ f 10 15 0 5\nAlice @ a 15 10 0 -5")
        .await
        .unwrap();

    assert!(report.inserted.is_empty());
    let column = sheet.col_values(1).await.unwrap();
    assert_eq!(column.iter().filter(|n| *n == "Frank").count(), 1);
    assert_eq!(balance_of(&sheet, "Frank"), dec("25"));
    assert_eq!(balance_of(&sheet, "Alice"), dec("95"));
}

#[tokio::test]
async fn test_missing_totals_label_is_fatal_when_rows_are_added() {
    let mut sheet = MemorySheet::from_inputs(
        vec![
            vec!["Alice", "$10.00", "", "$0.00", "$0.00", "=B1+D1+E1"],
            vec!["", "", "", "", "", ""],
        ],
        CurrencyFormat::en_us(),
    );
    let reconciler = SheetReconciler::default();

    // Updates alone never need the label
    let deltas = parse_ledger("Alice @ a 10 15 0 5").unwrap();
    reconciler.reconcile(&mut sheet, &deltas).await.unwrap();

    let deltas = parse_ledger("Zed @ z 10 5 0 -5").unwrap();
    let result = reconciler.reconcile(&mut sheet, &deltas).await;
    assert!(matches!(result, Err(TabError::Lookup(_))));
}

#[tokio::test]
async fn test_policies_from_config() {
    let config = Config::from_json(
        r#"{ "sheetKey": "tab", "namePolicy": "firstToken", "newRowPolicy": "delta" }"#,
    )
    .unwrap();
    let updater = TabUpdater::from_config(&config);
    let mut sheet = balance_sheet();

    let report = updater
        .apply_ledger(&mut sheet, "grace hopper @ g\n10 35 0 25\nalice @ a\n35 10 0 -25")
        .await
        .unwrap();

    assert_eq!(report.inserted, vec!["Grace".to_string()]);
    let grace_row = (3..=6)
        .find(|&row| sheet.value(CellRef::new(row, 1)) == CellValue::text("Grace"))
        .unwrap();
    assert_eq!(sheet.display(CellRef::new(grace_row, 4)), "$25.00");
    assert_eq!(sheet.display(CellRef::new(grace_row, 5)), "$25.00");
    assert_eq!(sheet.evaluate(CellRef::new(grace_row, 6)).unwrap(), dec("75"));
}

#[test]
fn test_both_ledger_layouts() {
    let two_line = "Alice @ xid DETAILS\n100 150 50 50\nBob @ yid DETAILS\n200 100 0 -100";
    let deltas = parse_ledger(two_line).unwrap();
    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas["Alice"], dec("50.0"));
    assert_eq!(deltas["Bob"], dec("-100.0"));

    let deltas = LedgerParser::with_name_policy(NamePolicy::FullName)
        .parse("Alice @ xid DETAILS 100 150 50 50")
        .unwrap();
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas["Alice"], dec("50.0"));
}

#[test]
fn test_new_row_policy_default_is_zero() {
    let config = Config::new("tab");
    assert_eq!(config.new_row_policy, NewRowPolicy::Zero);
}

#[tokio::test]
async fn test_case_variants_in_one_run_insert_a_single_row() {
    let mut sheet = balance_sheet();
    let mut deltas = pokertab::DeltasMap::new();
    deltas.insert("ZED".to_string(), dec("5"));
    deltas.insert("zed".to_string(), dec("-2"));

    let report = SheetReconciler::default()
        .reconcile(&mut sheet, &deltas)
        .await
        .unwrap();

    assert_eq!(report.inserted, vec!["Zed".to_string()]);
    let column = sheet.col_values(1).await.unwrap();
    assert_eq!(column.iter().filter(|n| n.eq_ignore_ascii_case("zed")).count(), 1);
    assert_eq!(balance_of(&sheet, "Zed"), dec("3"));
}

#[tokio::test]
async fn test_unsupported_formula_outside_block_does_not_block_insertion() {
    let mut sheet = balance_sheet();
    sheet.set_input(CellRef::new(1, 4), "=MAX(B3:B5)");

    let report = TabUpdater::default()
        .apply_ledger(&mut sheet, "Zed @ z 10 15 0 5")
        .await
        .unwrap();

    assert_eq!(report.inserted, vec!["Zed".to_string()]);
    assert_eq!(report.totals_row, Some(9));
    assert_eq!(sheet.value(CellRef::new(9, 2)), CellValue::formula("SUM(B3:B6)"));
    assert_eq!(sheet.display(CellRef::new(1, 4)), pokertab::utils::FORMULA_ERROR);
}
