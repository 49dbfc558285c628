// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::commands::{accounts, init, interest, transactions};
use billfold::models::{TRANSFER_IN, TRANSFER_OUT, TxKind};
use billfold::store::UserStore;
use billfold::{BookError, cli, ledger};
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use tempfile::TempDir;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn run(store: &UserStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["billfold"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("account", sub)) => accounts::handle(store, sub),
        Some(("tx", sub)) => transactions::handle(store, sub),
        Some(("interest", sub)) => interest::handle(store, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn setup() -> (TempDir, UserStore) {
    let dir = TempDir::new().unwrap();
    let store = UserStore::at(dir.path()).unwrap();
    init::handle(&store).unwrap();
    run(&store, &["account", "add", "--id", "bank", "--name", "Bank", "--type", "Current", "--balance", "100"]).unwrap();
    run(&store, &["account", "add", "--id", "cc", "--name", "Visa", "--type", "Credit Card", "--apr", "24"]).unwrap();
    (dir, store)
}

#[test]
fn income_then_expense_round_trips_balance() {
    let (_dir, store) = setup();
    run(&store, &["tx", "income", "--account", "bank", "--amount", "50", "--date", "2025-03-01"]).unwrap();
    run(&store, &["tx", "expense", "--account", "bank", "--amount", "50", "--date", "2025-03-02"]).unwrap();

    let book = store.load().unwrap();
    assert_eq!(book.account("bank").unwrap().balance, dec("100"));
    assert_eq!(book.transactions.len(), 2);
    assert_eq!(book.transactions[0].kind, TxKind::Income);
    assert_eq!(book.transactions[1].kind, TxKind::Expense);
    assert!(book.transactions.iter().all(|t| t.amount == dec("50")));
    assert!(book.transactions.iter().all(|t| t.currency == "GBP"));
}

#[test]
fn card_spending_raises_owed_balance() {
    let (_dir, store) = setup();
    run(&store, &["tx", "expense", "--account", "cc", "--amount", "40", "--date", "2025-03-01"]).unwrap();
    let book = store.load().unwrap();
    assert_eq!(book.account("cc").unwrap().balance, dec("40"));
    assert_eq!(ledger::net_worth(&book), dec("60"));
}

#[test]
fn transfer_writes_mirrored_legs_and_keeps_net_worth() {
    let (_dir, store) = setup();
    run(&store, &["account", "add", "--id", "sav", "--name", "Savings", "--type", "Savings"]).unwrap();
    let before = ledger::net_worth(&store.load().unwrap());

    run(&store, &["tx", "transfer", "--from", "bank", "--to", "sav", "--amount", "30.005", "--date", "2025-03-05", "--note", "rainy day"]).unwrap();

    let book = store.load().unwrap();
    assert_eq!(ledger::net_worth(&book), before);
    assert_eq!(book.account("bank").unwrap().balance, dec("69.99"));
    assert_eq!(book.account("sav").unwrap().balance, dec("30.01"));

    let legs: Vec<_> = book.transactions.iter().filter(|t| t.kind == TxKind::Transfer).collect();
    assert_eq!(legs.len(), 2);
    let (out_leg, in_leg) = (legs[0], legs[1]);
    assert_eq!(out_leg.category, TRANSFER_OUT);
    assert_eq!(in_leg.category, TRANSFER_IN);
    assert_eq!(out_leg.account_id, "bank");
    assert_eq!(out_leg.counterparty_account_id, "sav");
    assert_eq!(in_leg.account_id, "sav");
    assert_eq!(in_leg.counterparty_account_id, "bank");
    assert_eq!(out_leg.amount, in_leg.amount);
    assert_eq!(out_leg.date, in_leg.date);
    assert_eq!(in_leg.note, "rainy day");
}

#[test]
fn paying_a_card_reduces_what_is_owed() {
    let (_dir, store) = setup();
    run(&store, &["tx", "expense", "--account", "cc", "--amount", "80", "--date", "2025-03-01"]).unwrap();
    run(&store, &["tx", "transfer", "--from", "bank", "--to", "cc", "--amount", "50", "--date", "2025-03-02"]).unwrap();
    let book = store.load().unwrap();
    assert_eq!(book.account("cc").unwrap().balance, dec("30"));
    assert_eq!(book.account("bank").unwrap().balance, dec("50"));
}

#[test]
fn self_transfer_is_rejected() {
    let (_dir, store) = setup();
    let err = store
        .update(|book| {
            ledger::transfer(book, "bank", "bank", dec("5"), "", chrono::NaiveDate::MIN, "")
        })
        .unwrap_err();
    assert!(matches!(err, BookError::SameAccount(_)));
}

#[test]
fn rejected_postings_leave_files_untouched() {
    let (dir, store) = setup();
    let snapshot = || {
        let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .map(|p| (p.display().to_string(), fs::read(&p).unwrap()))
            .collect();
        files.sort();
        files
    };
    let before = snapshot();

    let err = run(&store, &["tx", "expense", "--account", "nope", "--amount", "5", "--date", "2025-03-01"]).unwrap_err();
    assert!(err.to_string().contains("not found"));
    let err = run(&store, &["tx", "income", "--account", "bank", "--amount", "0", "--date", "2025-03-01"]).unwrap_err();
    assert!(err.to_string().contains("greater than zero"));
    let err = run(&store, &["tx", "transfer", "--from", "bank", "--to", "ghost", "--amount", "5"]).unwrap_err();
    assert!(err.to_string().contains("ghost"));

    assert_eq!(snapshot(), before);
}

#[test]
fn card_interest_at_24_percent_apr() {
    let (_dir, store) = setup();
    run(&store, &["tx", "expense", "--account", "cc", "--amount", "1000", "--date", "2025-03-01"]).unwrap();
    run(&store, &["interest", "cards", "--date", "2025-03-31"]).unwrap();

    let book = store.load().unwrap();
    assert_eq!(book.account("cc").unwrap().balance, dec("1020.00"));
    let charges: Vec<_> = book.transactions.iter().filter(|t| t.kind == TxKind::Interest).collect();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].amount, dec("20.00"));
    assert_eq!(charges[0].account_id, "cc");
    assert_eq!(charges[0].category, "interest");
    assert_eq!(charges[0].note, "Monthly interest @24% APR");
}

#[test]
fn card_interest_skips_cleared_cards() {
    let (_dir, store) = setup();
    run(&store, &["interest", "cards", "--date", "2025-03-31"]).unwrap();
    let book = store.load().unwrap();
    assert!(book.transactions.is_empty());
    assert_eq!(book.account("cc").unwrap().balance, Decimal::ZERO);
}

#[test]
fn duplicate_account_id_is_rejected() {
    let (_dir, store) = setup();
    let err = run(&store, &["account", "add", "--id", "bank", "--name", "Again", "--type", "Savings"]).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(store.load().unwrap().accounts.len(), 2);
}

#[test]
fn sub_penny_amounts_are_rejected() {
    let (_dir, store) = setup();
    let err = store
        .update(|book| ledger::post_income(book, ledger::Posting::new("bank", dec("0.004"), chrono::NaiveDate::MIN)))
        .unwrap_err();
    assert!(matches!(err, BookError::InvalidAmount(_)));
    assert!(run(&store, &["tx", "transfer", "--from", "bank", "--to", "cc", "--amount", "0.001"]).is_err());

    let book = store.load().unwrap();
    assert!(book.transactions.is_empty());
    assert_eq!(book.account("bank").unwrap().balance, dec("100"));
}

#[test]
fn income_on_a_loan_reduces_what_is_owed() {
    let (_dir, store) = setup();
    run(&store, &["account", "add", "--id", "car", "--name", "Car loan", "--type", "Loan", "--balance", "5000"]).unwrap();
    run(&store, &["tx", "income", "--account", "car", "--amount", "200", "--date", "2025-03-01"]).unwrap();
    run(&store, &["tx", "expense", "--account", "car", "--amount", "15", "--date", "2025-03-02"]).unwrap();
    assert_eq!(store.load().unwrap().account("car").unwrap().balance, dec("4815"));
}
