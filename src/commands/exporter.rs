// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::codec::BOM;
use crate::models::Transaction;
use crate::store::{TRANSACTIONS, UserStore};
use crate::utils::{arg_str, date_arg, required_str};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use std::fs;

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

/// Transactions dated within `[from, to]` on any of `accounts` (all when empty),
/// oldest first.
pub fn select<'a>(
    txs: &'a [Transaction],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    accounts: &[String],
) -> Vec<&'a Transaction> {
    let mut out: Vec<&Transaction> = txs
        .iter()
        .filter(|t| from.is_none_or(|f| t.date >= f))
        .filter(|t| to.is_none_or(|e| t.date <= e))
        .filter(|t| accounts.is_empty() || accounts.iter().any(|a| a == &t.account_id))
        .collect();
    out.sort_by_key(|t| (t.date, t.id));
    out
}

fn export_transactions(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg_str(sub, "format").unwrap_or("csv").to_lowercase();
    let out = required_str(sub, "out")?;
    let accounts: Vec<String> = sub
        .get_many::<String>("account")
        .map(|vals| vals.map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();
    let book = store.load()?;
    let rows = select(
        &book.transactions,
        date_arg(sub, "from")?,
        date_arg(sub, "to")?,
        &accounts,
    );

    match fmt.as_str() {
        "csv" => {
            let mut buf = BOM.to_vec();
            {
                let mut wtr = csv::Writer::from_writer(&mut buf);
                wtr.write_record(TRANSACTIONS.columns)?;
                for t in &rows {
                    wtr.write_record(t.to_record())?;
                }
                wtr.flush()?;
            }
            fs::write(out, buf)?;
        }
        "json" => {
            fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    println!("Exported {} transaction(s) to {}", rows.len(), out);
    Ok(())
}
