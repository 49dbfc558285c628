// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::{Account, AccountType};
use crate::store::UserStore;
use crate::utils::{arg_str, decimal_arg, fmt_money, maybe_print_json, pretty_table, required_str};
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let account_type: AccountType = required_str(sub, "type")?
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let acct = Account {
                id: 0,
                account_name: required_str(sub, "name")?.to_string(),
                account_type,
                account_id: required_str(sub, "id")?.to_string(),
                balance: decimal_arg(sub, "balance")?.unwrap_or_default(),
                currency: arg_str(sub, "currency").unwrap_or("GBP").to_string(),
                limit: decimal_arg(sub, "limit")?.unwrap_or_default(),
                apr: decimal_arg(sub, "apr")?.unwrap_or_default(),
                note: arg_str(sub, "note").unwrap_or_default().to_string(),
            };
            let name = acct.account_name.clone();
            let id = store.update(|book| ledger::open_account(book, acct))?;
            println!("Added account '{}' ({}, id {})", name, account_type, id);
        }
        Some(("list", sub)) => {
            let book = store.load()?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &book.accounts)? {
                return Ok(());
            }
            let data = book
                .accounts
                .iter()
                .map(|a| {
                    vec![
                        a.account_id.clone(),
                        a.account_name.clone(),
                        a.account_type.to_string(),
                        fmt_money(&a.balance, &a.currency),
                        if a.limit > Decimal::ZERO { a.limit.to_string() } else { String::new() },
                        if a.apr > Decimal::ZERO { format!("{}%", a.apr) } else { String::new() },
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["ID", "Name", "Type", "Balance", "Limit", "APR"], data)
            );
            println!("Net worth: {}", ledger::net_worth(&book).round_dp(2));
        }
        _ => {}
    }
    Ok(())
}
