// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, Posting};
use crate::models::Transaction;
use crate::store::{Book, UserStore};
use crate::utils::{
    arg_str, as_of, maybe_print_json, month_of, parse_decimal, parse_month, pretty_table,
    required_str,
};
use anyhow::{Context, Result};
use serde::Serialize;

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("income", sub)) => post(store, sub, true)?,
        Some(("expense", sub)) => post(store, sub, false)?,
        Some(("transfer", sub)) => transfer(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn posting_from(sub: &clap::ArgMatches) -> Result<Posting> {
    let amount_raw = required_str(sub, "amount")?;
    let amount = parse_decimal(amount_raw)
        .with_context(|| format!("Invalid amount '{}'", amount_raw))?;
    Ok(Posting::new(required_str(sub, "account")?, amount, as_of(sub)?)
        .currency(arg_str(sub, "currency").unwrap_or_default())
        .category(arg_str(sub, "category").unwrap_or_default())
        .note(arg_str(sub, "note").unwrap_or_default()))
}

fn post(store: &UserStore, sub: &clap::ArgMatches, income: bool) -> Result<()> {
    let p = posting_from(sub)?;
    let (account, amount, date) = (p.account_id.clone(), p.amount, p.date);
    let id = store.update(|book| {
        if income {
            ledger::post_income(book, p)
        } else {
            ledger::post_expense(book, p)
        }
    })?;
    println!(
        "Recorded {} {} on {} (acct: {}, tx {})",
        if income { "income" } else { "expense" },
        amount,
        date,
        account,
        id
    );
    Ok(())
}

fn transfer(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let from = required_str(sub, "from")?;
    let to = required_str(sub, "to")?;
    let amount = parse_decimal(required_str(sub, "amount")?)?;
    let date = as_of(sub)?;
    let currency = arg_str(sub, "currency").unwrap_or_default();
    let note = arg_str(sub, "note").unwrap_or_default();
    let (out_id, in_id) =
        store.update(|book| ledger::transfer(book, from, to, amount, currency, date, note))?;
    println!(
        "Transferred {} from {} to {} on {} (tx {} / {})",
        amount, from, to, date, out_id, in_id
    );
    Ok(())
}

fn list(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let book = store.load()?;
    let data = query_rows(&book, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.account_id.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Account", "Amount", "CCY", "Category", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub account_id: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub note: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            account_id: t.account_id.clone(),
            amount: format!("{:.2}", t.inflow()),
            currency: t.currency.clone(),
            category: t.category.clone(),
            note: t.note.clone(),
        }
    }
}

/// Newest first, filtered by the `tx list` arguments.
pub fn query_rows(book: &Book, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let month = arg_str(sub, "month").map(parse_month).transpose()?;
    let account = arg_str(sub, "account");
    let category = arg_str(sub, "category");
    let uncategorised = sub.get_flag("uncategorised");

    let mut txs: Vec<&Transaction> = book
        .transactions
        .iter()
        .filter(|t| month.as_deref().is_none_or(|m| month_of(t.date) == m))
        .filter(|t| account.is_none_or(|a| t.account_id == a))
        .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
        .filter(|t| !uncategorised || t.is_uncategorised())
        .collect();
    txs.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txs.truncate(*limit);
    }
    Ok(txs.into_iter().map(TransactionRow::from).collect())
}
