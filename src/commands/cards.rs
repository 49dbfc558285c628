// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Prefs;
use crate::error::BookError;
use crate::statements::{self, StatementTerms};
use crate::store::UserStore;
use crate::utils::{
    arg_str, as_of, date_arg, decimal_arg, maybe_print_json, parse_decimal,
    pretty_table, required_str,
};
use anyhow::{Context, Result, anyhow};

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("close", sub)) => close(store, sub)?,
        Some(("pay", sub)) => pay(store, sub)?,
        Some(("statements", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn close(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let prefs = Prefs::load(store)?;
    let defaults = StatementTerms::default();
    let terms = StatementTerms {
        due_days: sub.get_one::<i64>("due-days").copied().unwrap_or(defaults.due_days),
        min_pct: decimal_arg(sub, "min-pct")?.unwrap_or(defaults.min_pct),
        min_floor: decimal_arg(sub, "min-floor")?.unwrap_or(defaults.min_floor),
    };
    let card = required_str(sub, "card")?;
    let period_end = match date_arg(sub, "period-end")? {
        Some(d) => d,
        None => statements::last_statement_date(as_of(sub)?, prefs.statement_day())
            .ok_or_else(|| anyhow!("Could not work out the last statement date"))?,
    };
    let period_start = date_arg(sub, "period-start")?;
    let note = arg_str(sub, "note").unwrap_or_default();
    let (id, stmt) = store.update(|book| {
        let id = statements::close_statement(book, card, period_end, period_start, terms, note)?;
        Ok((id, book.statement(id)?.clone()))
    })?;
    println!(
        "Closed statement {} for {}: balance {:.2}, min due {:.2} by {}",
        id, card, stmt.statement_balance, stmt.min_due, stmt.due_date
    );
    Ok(())
}

fn pay(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let from = required_str(sub, "from")?;
    let amount = parse_decimal(required_str(sub, "amount")?)?;
    let date = as_of(sub)?;
    let currency = arg_str(sub, "currency").unwrap_or_default();
    let note = arg_str(sub, "note").unwrap_or_default();
    let explicit = arg_str(sub, "statement")
        .map(|raw| {
            raw.parse::<i64>()
                .with_context(|| format!("Invalid statement id '{}'", raw))
        })
        .transpose()?;
    let card = arg_str(sub, "card");
    if explicit.is_none() && card.is_none() {
        return Err(anyhow!("Pass --statement <ID> or --card <ACCOUNT_ID>"));
    }
    let stmt_id = store.update(|book| {
        let stmt_id = match explicit {
            Some(id) => id,
            None => {
                let card = card.unwrap_or_default();
                book.account(card)?;
                statements::latest_open_statement(book, card).ok_or_else(|| {
                    BookError::InvalidInput(format!("No statement has been closed for '{}'", card))
                })?
            }
        };
        statements::record_cc_payment(book, stmt_id, from, amount, currency, date, note)?;
        Ok(stmt_id)
    })?;
    println!("Paid {} from {} towards statement {}", amount, from, stmt_id);
    Ok(())
}

fn list(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let book = store.load()?;
    let card = arg_str(sub, "card");
    let data: Vec<_> = book
        .statements
        .iter()
        .filter(|s| card.is_none_or(|c| s.card_account_id == c))
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.card_account_id.clone(),
                format!("{}..{}", s.period_start, s.period_end),
                format!("{:.2}", s.statement_balance),
                format!("{:.2}", s.min_due),
                s.due_date.to_string(),
                format!("{:.2}", s.paid_amount),
                format!("{:.2}", s.carried_balance),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Card", "Period", "Balance", "Min Due", "Due", "Paid", "Carried"],
            rows
        )
    );
    Ok(())
}
