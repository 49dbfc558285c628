// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::TxKind;
use crate::store::{Book, UserStore};
use crate::utils::{maybe_print_json, month_of, parse_month, pretty_table, required_str};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(store, sub)?,
        Some(("cashflow", sub)) => cashflow(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn balances(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let book = store.load()?;
    let data: Vec<Vec<String>> = book
        .accounts
        .iter()
        .map(|a| {
            vec![
                a.account_name.clone(),
                a.currency.clone(),
                format!("{:.2}", a.balance),
                format!("{:.2}", a.class().net_worth(a.balance)),
            ]
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!(
            "{}",
            pretty_table(&["Account", "CCY", "Balance", "Net"], data)
        );
        println!("Net worth: {:.2}", ledger::net_worth(&book));
    }
    Ok(())
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct CashflowLine {
    pub category: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Income against outgoings (expenses and interest) by category for one
/// month. Transfers move money between the user's own accounts and are left
/// out.
pub fn cashflow_for(book: &Book, month: &str) -> Vec<CashflowLine> {
    let mut map: BTreeMap<String, CashflowLine> = BTreeMap::new();
    for t in book.transactions.iter().filter(|t| month_of(t.date) == month) {
        let key = if t.is_uncategorised() {
            "(uncategorised)".to_string()
        } else {
            t.category.clone()
        };
        let entry = map.entry(key.clone()).or_insert_with(|| CashflowLine {
            category: key,
            ..CashflowLine::default()
        });
        match t.kind {
            TxKind::Income => entry.income += t.amount,
            TxKind::Expense | TxKind::Interest => entry.expense += t.amount,
            TxKind::Transfer => {}
        }
    }
    map.into_values()
        .filter(|l| !l.income.is_zero() || !l.expense.is_zero())
        .collect()
}

fn cashflow(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(required_str(sub, "month")?)?;
    let book = store.load()?;
    let lines = cashflow_for(&book, &month);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &lines)? {
        return Ok(());
    }
    let (inc, exp) = lines
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(i, e), l| (i + l.income, e + l.expense));
    let mut data: Vec<Vec<String>> = lines
        .iter()
        .map(|l| {
            vec![
                l.category.clone(),
                format!("{:.2}", l.income),
                format!("{:.2}", l.expense),
            ]
        })
        .collect();
    data.push(vec!["Total".into(), format!("{:.2}", inc), format!("{:.2}", exp)]);
    println!("{}", pretty_table(&["Category", "Income", "Expense"], data));
    println!("Net for {}: {:.2}", month, inc - exp);
    Ok(())
}
