// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::commands::{accounts, rules, transactions};
use billfold::models::TxKind;
use billfold::store::UserStore;
use billfold::{BookError, categorise, cli};
use tempfile::TempDir;

fn run(store: &UserStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["billfold"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("account", sub)) => accounts::handle(store, sub),
        Some(("tx", sub)) => transactions::handle(store, sub),
        Some(("rules", sub)) => rules::handle(store, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn setup() -> (TempDir, UserStore) {
    let dir = TempDir::new().unwrap();
    let store = UserStore::at(dir.path()).unwrap();
    run(&store, &["account", "add", "--id", "bank", "--name", "Bank", "--type", "Current", "--balance", "500"]).unwrap();
    for (note, category) in [
        ("TESCO STORES 2231", ""),
        ("Tesco Express", "Eating Out"),
        ("SHELL fuel", ""),
        ("Amazon Prime", ""),
    ] {
        let mut args = vec!["tx", "expense", "--account", "bank", "--amount", "10", "--date", "2025-02-01", "--note", note];
        if !category.is_empty() {
            args.extend(["--category", category]);
        }
        run(&store, &args).unwrap();
    }
    (dir, store)
}

fn categories(store: &UserStore) -> Vec<String> {
    store
        .load()
        .unwrap()
        .transactions
        .iter()
        .map(|t| t.category.clone())
        .collect()
}

#[test]
fn fills_only_uncategorised_rows_and_is_idempotent() {
    let (_dir, store) = setup();
    run(&store, &["rules", "add", "--contains", "tesco", "--category", "Groceries"]).unwrap();
    run(&store, &["rules", "add", "--contains", "shell", "--category", "Transport"]).unwrap();

    run(&store, &["rules", "apply"]).unwrap();
    assert_eq!(categories(&store), vec!["Groceries", "Eating Out", "Transport", ""]);

    let before = store.load().unwrap();
    let changed = store.update(|book| Ok(categorise::apply_rules(book, false))).unwrap();
    assert_eq!(changed, 0);
    assert_eq!(store.load().unwrap(), before);
}

#[test]
fn lower_priority_number_wins() {
    let (_dir, store) = setup();
    run(&store, &["rules", "add", "--contains", "tesco", "--category", "Shopping", "--priority", "50"]).unwrap();
    run(&store, &["rules", "add", "--contains", "stores", "--category", "Groceries", "--priority", "10"]).unwrap();
    run(&store, &["rules", "apply"]).unwrap();
    assert_eq!(categories(&store)[0], "Groceries");
}

#[test]
fn case_sensitive_rules_and_kind_override() {
    let (_dir, store) = setup();
    run(&store, &["rules", "add", "--contains", "amazon", "--category", "Shopping", "--case-sensitive"]).unwrap();
    run(&store, &["rules", "add", "--contains", "SHELL", "--category", "Refund", "--kind", "income", "--case-sensitive"]).unwrap();
    run(&store, &["rules", "apply"]).unwrap();

    let book = store.load().unwrap();
    assert_eq!(book.transactions[3].category, "");
    assert_eq!(book.transactions[2].category, "Refund");
    assert_eq!(book.transactions[2].kind, TxKind::Income);
}

#[test]
fn dry_run_changes_nothing() {
    let (dir, store) = setup();
    run(&store, &["rules", "add", "--contains", "tesco", "--category", "Groceries"]).unwrap();
    let before = std::fs::read(dir.path().join("transactions.csv")).unwrap();
    run(&store, &["rules", "apply", "--dry-run"]).unwrap();
    assert_eq!(std::fs::read(dir.path().join("transactions.csv")).unwrap(), before);
}

#[test]
fn account_field_matching() {
    let (_dir, store) = setup();
    run(&store, &["rules", "add", "--contains", "bank", "--category", "Misc", "--field", "account_id"]).unwrap();
    run(&store, &["rules", "apply"]).unwrap();
    assert_eq!(categories(&store), vec!["Misc", "Eating Out", "Misc", "Misc"]);
}

#[test]
fn remove_rule_and_unknown_id() {
    let (_dir, store) = setup();
    run(&store, &["rules", "add", "--contains", "tesco", "--category", "Groceries"]).unwrap();
    run(&store, &["rules", "rm", "--id", "1"]).unwrap();
    assert!(store.load().unwrap().rules.is_empty());

    let err = store.update(|book| categorise::remove_rule(book, 1)).unwrap_err();
    assert!(matches!(err, BookError::RuleNotFound(1)));
}

#[test]
fn add_rejects_blank_category() {
    let (_dir, store) = setup();
    let err = run(&store, &["rules", "add", "--contains", "tesco", "--category", "  "]).unwrap_err();
    assert!(err.to_string().contains("category"));
    assert!(store.load().unwrap().rules.is_empty());
}
