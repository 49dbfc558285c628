// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::commands::{accounts, cards, prefs, transactions};
use billfold::models::TxKind;
use billfold::statements::{self, StatementTerms};
use billfold::store::UserStore;
use billfold::{BookError, cli};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn run(store: &UserStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["billfold"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("account", sub)) => accounts::handle(store, sub),
        Some(("tx", sub)) => transactions::handle(store, sub),
        Some(("card", sub)) => cards::handle(store, sub),
        Some(("prefs", sub)) => prefs::handle(store, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn setup() -> (TempDir, UserStore) {
    let dir = TempDir::new().unwrap();
    let store = UserStore::at(dir.path()).unwrap();
    run(&store, &["account", "add", "--id", "bank", "--name", "Bank", "--type", "Current", "--balance", "1000"]).unwrap();
    run(&store, &["account", "add", "--id", "visa", "--name", "Visa", "--type", "Credit Card", "--apr", "19.9"]).unwrap();
    run(&store, &["tx", "expense", "--account", "visa", "--amount", "300", "--date", "2025-05-10"]).unwrap();
    (dir, store)
}

#[test]
fn close_uses_floor_and_default_due_days() {
    let (_dir, store) = setup();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-05-31"]).unwrap();

    let book = store.load().unwrap();
    let s = &book.statements[0];
    assert_eq!(s.statement_balance, dec("300"));
    assert_eq!(s.min_due, dec("25"));
    assert_eq!(s.due_date, d(2025, 6, 25));
    assert_eq!(s.period_start, d(2025, 5, 1));
    assert_eq!(s.apr_at_cycle, dec("19.9"));
    assert_eq!(s.carried_balance, dec("300"));
    assert_eq!(s.paid_date, None);
}

#[test]
fn statement_day_pref_sets_default_period_end() {
    let (_dir, store) = setup();
    run(&store, &["prefs", "set", "cc_statement_day", "21"]).unwrap();
    run(&store, &["card", "close", "--card", "visa", "--date", "2025-06-10"]).unwrap();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-06-30", "--due-days", "10", "--min-pct", "5"]).unwrap();

    let book = store.load().unwrap();
    assert_eq!(book.statements[0].period_end, d(2025, 5, 21));
    assert_eq!(book.statements[0].due_date, d(2025, 6, 15));
    assert_eq!(book.statements[1].due_date, d(2025, 7, 10));
    assert_eq!(book.statements[1].min_due, dec("25"));
}

#[test]
fn statement_day_pref_does_not_shift_due_date() {
    let (_dir, store) = setup();
    run(&store, &["prefs", "set", "cc_statement_day", "1"]).unwrap();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-03-31"]).unwrap();
    assert_eq!(store.load().unwrap().statements[0].due_date, d(2025, 4, 25));
}

#[test]
fn last_statement_date_wraps_into_previous_month() {
    assert_eq!(statements::last_statement_date(d(2025, 1, 5), 25), Some(d(2024, 12, 25)));
    assert_eq!(statements::last_statement_date(d(2025, 3, 25), 25), Some(d(2025, 3, 25)));
}

#[test]
fn out_of_range_due_days_are_rejected() {
    let (_dir, store) = setup();
    let terms = StatementTerms { due_days: 1_000_000_000, ..StatementTerms::default() };
    let err = store
        .update(|book| statements::close_statement(book, "visa", d(2025, 5, 31), None, terms, ""))
        .unwrap_err();
    assert!(matches!(err, BookError::InvalidInput(_)));
    assert!(store.load().unwrap().statements.is_empty());

    let err = run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-05-31", "--due-days", "9223372036854775807"]).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn due_window_too_wide_is_an_error() {
    let (_dir, store) = setup();
    let book = store.load().unwrap();
    assert!(matches!(statements::due_within(&book, d(2025, 6, 1), i64::MAX), Err(BookError::InvalidInput(_))));
}

#[test]
fn payment_total_uses_the_rounded_amount() {
    let (_dir, store) = setup();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-05-31"]).unwrap();
    store
        .update(|book| statements::record_cc_payment(book, 1, "bank", dec("10.005"), "", d(2025, 6, 2), ""))
        .unwrap();

    let book = store.load().unwrap();
    let stmt = &book.statements[0];
    assert_eq!(stmt.paid_amount, dec("10.01"));
    assert_eq!(stmt.carried_balance, dec("289.99"));
    let legs: Vec<Decimal> = book.transactions.iter().filter(|t| t.kind == TxKind::Transfer).map(|t| t.amount).collect();
    assert_eq!(legs, vec![dec("10.01"), dec("10.01")]);
    assert_eq!(book.account("visa").unwrap().balance, dec("289.99"));
}

#[test]
fn percentage_minimum_above_the_floor() {
    let (_dir, store) = setup();
    run(&store, &["tx", "expense", "--account", "visa", "--amount", "1700", "--date", "2025-05-11"]).unwrap();
    let id = store
        .update(|book| {
            statements::close_statement(book, "visa", d(2025, 5, 31), None, StatementTerms::default(), "")
        })
        .unwrap();
    let book = store.load().unwrap();
    assert_eq!(book.statement(id).unwrap().min_due, dec("60"));
}

#[test]
fn paying_by_card_targets_the_latest_statement() {
    let (_dir, store) = setup();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-05-31"]).unwrap();
    run(&store, &["tx", "expense", "--account", "visa", "--amount", "50", "--date", "2025-06-03"]).unwrap();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-06-30"]).unwrap();

    run(&store, &["card", "pay", "--card", "visa", "--from", "bank", "--amount", "100", "--date", "2025-07-05"]).unwrap();
    run(&store, &["card", "pay", "--statement", "2", "--from", "bank", "--amount", "20", "--date", "2025-07-06"]).unwrap();

    let book = store.load().unwrap();
    let (first, second) = (&book.statements[0], &book.statements[1]);
    assert_eq!(first.paid_amount, Decimal::ZERO);
    assert_eq!(second.statement_balance, dec("350"));
    assert_eq!(second.paid_amount, dec("120"));
    assert_eq!(second.carried_balance, dec("230"));
    assert_eq!(second.paid_date, Some(d(2025, 7, 6)));

    assert_eq!(book.account("visa").unwrap().balance, dec("230"));
    assert_eq!(book.account("bank").unwrap().balance, dec("880"));
    let legs = book.transactions.iter().filter(|t| t.kind == TxKind::Transfer).count();
    assert_eq!(legs, 4);
}

#[test]
fn overpayment_carries_nothing() {
    let (_dir, store) = setup();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-05-31"]).unwrap();
    run(&store, &["card", "pay", "--card", "visa", "--from", "bank", "--amount", "400", "--date", "2025-06-01"]).unwrap();
    let book = store.load().unwrap();
    assert_eq!(book.statements[0].carried_balance, Decimal::ZERO);
    assert_eq!(book.account("visa").unwrap().balance, dec("-100"));

    let due = statements::due_within(&book, d(2025, 6, 1), 60).unwrap();
    assert!(due.is_empty());
}

#[test]
fn close_rejects_non_card_accounts() {
    let (_dir, store) = setup();
    let err = store
        .update(|book| {
            statements::close_statement(book, "bank", d(2025, 5, 31), None, StatementTerms::default(), "")
        })
        .unwrap_err();
    assert!(matches!(err, BookError::WrongAccountType { .. }));
}

#[test]
fn paying_without_a_statement_fails_cleanly() {
    let (_dir, store) = setup();
    let err = run(&store, &["card", "pay", "--card", "visa", "--from", "bank", "--amount", "10"]).unwrap_err();
    assert!(err.to_string().contains("No statement"));
    let err = store
        .update(|book| statements::record_cc_payment(book, 9, "bank", dec("10"), "", d(2025, 6, 1), ""))
        .unwrap_err();
    assert!(matches!(err, BookError::StatementNotFound(9)));
    assert_eq!(store.load().unwrap().account("bank").unwrap().balance, dec("1000"));
}

#[test]
fn due_within_reports_outstanding_minimum() {
    let (_dir, store) = setup();
    run(&store, &["card", "close", "--card", "visa", "--period-end", "2025-05-31"]).unwrap();
    run(&store, &["card", "pay", "--card", "visa", "--from", "bank", "--amount", "10", "--date", "2025-06-02"]).unwrap();
    let book = store.load().unwrap();

    assert!(statements::due_within(&book, d(2025, 6, 1), 14).unwrap().is_empty());
    let due = statements::due_within(&book, d(2025, 6, 15), 14).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].min_due, dec("15"));
    assert_eq!(due[0].outstanding, dec("290"));
}
