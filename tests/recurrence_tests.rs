// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::commands::{accounts, recurring};
use billfold::models::{ScheduleKind, TxKind};
use billfold::store::UserStore;
use billfold::{BookError, cli, recurrence};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn run(store: &UserStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["billfold"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("account", sub)) => accounts::handle(store, sub),
        Some(("recurring", sub)) => recurring::handle(store, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn setup() -> (TempDir, UserStore) {
    let dir = TempDir::new().unwrap();
    let store = UserStore::at(dir.path()).unwrap();
    run(&store, &["account", "add", "--id", "bank", "--name", "Bank", "--type", "Current", "--balance", "1000"]).unwrap();
    (dir, store)
}

#[test]
fn monthly_rollout_clamps_to_month_end() {
    let (_dir, store) = setup();
    run(&store, &[
        "recurring", "add", "--kind", "expense", "--label", "Rent", "--amount", "400",
        "--frequency", "Monthly", "--next", "2025-01-31", "--account", "bank",
    ])
    .unwrap();
    run(&store, &["recurring", "run", "--date", "2025-03-01"]).unwrap();

    let book = store.load().unwrap();
    let dates: Vec<NaiveDate> = book.transactions.iter().map(|t| t.date).collect();
    assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 2, 28)]);
    assert!(book.transactions.iter().all(|t| t.kind == TxKind::Expense));
    assert!(book.transactions.iter().all(|t| t.category == "Rent"));
    assert!(book.transactions.iter().all(|t| t.ref_table == "recurring_expenses" && t.ref_id == "1"));
    assert_eq!(book.recurring_expenses[0].next_due_date, "2025-03-28");
    assert_eq!(book.account("bank").unwrap().balance, Decimal::from(200));
}

#[test]
fn rollout_is_idempotent_for_the_same_day() {
    let (_dir, store) = setup();
    run(&store, &[
        "recurring", "add", "--kind", "income", "--label", "Salary", "--amount", "1500",
        "--frequency", "Bi-Weekly", "--next", "2025-01-01", "--account", "bank",
    ])
    .unwrap();
    run(&store, &["recurring", "run", "--date", "2025-01-20"]).unwrap();
    run(&store, &["recurring", "run", "--date", "2025-01-20"]).unwrap();

    let book = store.load().unwrap();
    assert_eq!(book.transactions.len(), 2);
    assert!(book.transactions.iter().all(|t| t.kind == TxKind::Income));
    assert_eq!(book.recurring_incomes[0].next_due_date, "2025-01-29");
}

#[test]
fn leap_day_and_short_months() {
    let (_dir, store) = setup();
    store
        .update(|book| {
            for (label, freq, next) in [
                ("Insurance", recurrence::Frequency::Yearly, d(2024, 2, 29)),
                ("Gym", recurrence::Frequency::Monthly, d(2024, 1, 31)),
                ("Water", recurrence::Frequency::Quarterly, d(2024, 8, 31)),
            ] {
                recurrence::add_schedule(
                    book,
                    ScheduleKind::Expense,
                    recurrence::NewSchedule {
                        label: label.into(),
                        amount: Decimal::ONE,
                        currency: String::new(),
                        frequency: freq,
                        next_due_date: next,
                        account_id: "bank".into(),
                        note: String::new(),
                    },
                )?;
            }
            Ok(())
        })
        .unwrap();

    let report = store
        .update(|book| Ok(recurrence::process_recurring(book, ScheduleKind::Expense, d(2024, 9, 1))))
        .unwrap();
    assert!(report.is_clean());

    let book = store.load().unwrap();
    let next: Vec<&str> = book
        .recurring_expenses
        .iter()
        .map(|r| r.next_due_date.as_str())
        .collect();
    assert_eq!(next, vec!["2025-02-28", "2024-09-29", "2024-11-30"]);
    let gym: Vec<NaiveDate> = book
        .transactions
        .iter()
        .filter(|t| t.category == "Gym")
        .map(|t| t.date)
        .take(3)
        .collect();
    assert_eq!(gym, vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 29)]);
}

#[test]
fn failing_row_stops_while_siblings_continue() {
    let (dir, store) = setup();
    fs::write(
        dir.path().join("recurring_expenses.csv"),
        "id,expense_type,amount,currency,frequency,next_due_date,account_id,note\n\
         1,Phone,20,GBP,Monthly,2025-01-10,closed_acct,\n\
         2,Netflix,10,GBP,Monthly,2025-01-15,bank,\n\
         3,Mystery,5,GBP,Fortnightly,2025-01-01,bank,\n\
         4,Typo,5,GBP,Weekly,soon,bank,\n",
    )
    .unwrap();

    let report = store
        .update(|book| Ok(recurrence::process_all(book, d(2025, 2, 20))))
        .unwrap();
    assert_eq!(report.posted, 2);
    assert_eq!(report.advanced, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], BookError::UnknownAccount(_)));
    assert_eq!(report.skipped.len(), 2);

    let book = store.load().unwrap();
    let rows = &book.recurring_expenses;
    assert_eq!(rows[0].next_due_date, "2025-01-10");
    assert_eq!(rows[1].next_due_date, "2025-03-15");
    assert_eq!(rows[2].frequency, "Fortnightly");
    assert_eq!(rows[2].next_due_date, "2025-01-01");
    assert_eq!(rows[3].next_due_date, "soon");
    assert_eq!(book.transactions.len(), 2);
}

#[test]
fn add_rejects_unknown_account() {
    let (_dir, store) = setup();
    let err = run(&store, &[
        "recurring", "add", "--kind", "expense", "--label", "Rent", "--amount", "10",
        "--frequency", "Monthly", "--next", "2025-01-01", "--account", "nowhere",
    ])
    .unwrap_err();
    assert!(err.to_string().contains("nowhere"));
    assert!(store.load().unwrap().recurring_expenses.is_empty());
}

#[test]
fn upcoming_lists_overdue_and_soon() {
    let (_dir, store) = setup();
    for next in ["2025-01-01", "2025-01-20", "2025-03-01"] {
        run(&store, &[
            "recurring", "add", "--kind", "expense", "--label", "Bill", "--amount", "10",
            "--frequency", "Monthly", "--next", next, "--account", "bank",
        ])
        .unwrap();
    }
    let book = store.load().unwrap();
    let soon = recurrence::upcoming(&book, d(2025, 1, 10), 14).unwrap();
    let due: Vec<NaiveDate> = soon.iter().map(|u| u.due).collect();
    assert_eq!(due, vec![d(2025, 1, 1), d(2025, 1, 20)]);
    assert!(recurrence::upcoming(&book, d(2025, 1, 10), i64::MAX).is_err());
}
