// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budgets;
use crate::store::UserStore;
use crate::utils::{
    arg_str, fmt_money, maybe_print_json, parse_decimal, parse_month, pretty_table, required_str,
};
use anyhow::Result;

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("report", sub)) => report(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(required_str(sub, "month")?)?;
    let cat = required_str(sub, "category")?;
    let amount = parse_decimal(required_str(sub, "amount")?)?;
    let currency = arg_str(sub, "currency").unwrap_or_default();
    let note = arg_str(sub, "note").unwrap_or_default();
    store.update(|book| budgets::set_budget(book, &month, cat, amount, currency, note))?;
    println!("Budget set for {} / {} = {}", month, cat, amount);
    Ok(())
}

fn list(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let month = arg_str(sub, "month").map(parse_month).transpose()?;
    let book = store.load()?;
    let mut rows: Vec<_> = book
        .budgets
        .iter()
        .filter(|b| month.as_deref().is_none_or(|m| b.month == m))
        .collect();
    rows.sort_by(|a, b| b.month.cmp(&a.month).then(a.category.cmp(&b.category)));
    let data = rows
        .iter()
        .map(|b| {
            vec![
                b.month.clone(),
                b.category.clone(),
                fmt_money(&b.amount, &b.currency),
                if b.active { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Category", "Budget", "Active"], data)
    );
    Ok(())
}

fn report(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(required_str(sub, "month")?)?;
    let book = store.load()?;
    let lines = budgets::report(&book, &month);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &lines)? {
        return Ok(());
    }
    let data = lines
        .iter()
        .map(|l| {
            vec![
                l.category.clone(),
                fmt_money(&l.budget, &l.currency),
                fmt_money(&l.spent, &l.currency),
                fmt_money(&l.remaining, &l.currency),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Budget", "Spent", "Remaining"], data)
    );
    Ok(())
}
