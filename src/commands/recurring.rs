// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::ScheduleKind;
use crate::recurrence::{self, Frequency, NewSchedule, RolloutReport};
use crate::store::UserStore;
use crate::utils::{
    arg_str, as_of, maybe_print_json, parse_date, parse_decimal, pretty_table, required_str,
};
use anyhow::{Result, anyhow};
use serde::Serialize;

pub fn parse_kind(s: &str) -> Result<ScheduleKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "expense" | "expenses" => Ok(ScheduleKind::Expense),
        "income" | "incomes" => Ok(ScheduleKind::Income),
        other => Err(anyhow!("Unknown recurring kind '{}', expected income or expense", other)),
    }
}

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind = parse_kind(required_str(sub, "kind")?)?;
            let frequency: Frequency = required_str(sub, "frequency")?
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let s = NewSchedule {
                label: required_str(sub, "label")?.to_string(),
                amount: parse_decimal(required_str(sub, "amount")?)?,
                currency: arg_str(sub, "currency").unwrap_or_default().to_string(),
                frequency,
                next_due_date: parse_date(required_str(sub, "next")?)?,
                account_id: required_str(sub, "account")?.to_string(),
                note: arg_str(sub, "note").unwrap_or_default().to_string(),
            };
            let id = store.update(|book| recurrence::add_schedule(book, kind, s))?;
            println!("Added recurring {} {} ({})", kind, id, frequency);
        }
        Some(("list", sub)) => list(store, sub)?,
        Some(("run", sub)) => {
            let today = as_of(sub)?;
            let report = store.update(|book| Ok(recurrence::process_all(book, today)))?;
            print_report(&report);
        }
        _ => {}
    }
    Ok(())
}

pub fn print_report(report: &RolloutReport) {
    println!(
        "Recurring: posted {} entr{} across {} schedule(s)",
        report.posted,
        if report.posted == 1 { "y" } else { "ies" },
        report.advanced
    );
    for e in &report.skipped {
        eprintln!("skipped: {}", e);
    }
    for e in &report.failures {
        eprintln!("failed: {}", e);
    }
}

#[derive(Serialize)]
struct ScheduleRow {
    kind: ScheduleKind,
    id: i64,
    label: String,
    amount: String,
    currency: String,
    frequency: String,
    next_due_date: String,
    account_id: String,
}

fn list(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let book = store.load()?;
    let kinds = match arg_str(sub, "kind") {
        Some(k) => vec![parse_kind(k)?],
        None => vec![ScheduleKind::Expense, ScheduleKind::Income],
    };
    let data: Vec<ScheduleRow> = kinds
        .into_iter()
        .flat_map(|kind| {
            book.schedules(kind).iter().map(move |r| ScheduleRow {
                kind,
                id: r.id,
                label: r.label.clone(),
                amount: r.amount.to_string(),
                currency: r.currency.clone(),
                frequency: r.frequency.clone(),
                next_due_date: r.next_due_date.clone(),
                account_id: r.account_id.clone(),
            })
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|r| {
            vec![
                r.kind.to_string(),
                r.id.to_string(),
                r.label.clone(),
                format!("{} {}", r.currency, r.amount),
                r.frequency.clone(),
                r.next_due_date.clone(),
                r.account_id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Kind", "ID", "Label", "Amount", "Frequency", "Next Due", "Account"],
            rows
        )
    );
    Ok(())
}
