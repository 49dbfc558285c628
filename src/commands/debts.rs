// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::debts::{self, DebtPayment, NewDebt};
use crate::models::DebtType;
use crate::store::UserStore;
use crate::utils::{
    arg_str, as_of, decimal_arg, fmt_money, maybe_print_json, parse_decimal, pretty_table,
    required_str,
};
use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let debt_type: DebtType = arg_str(sub, "type")
                .unwrap_or_default()
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let d = NewDebt {
                lender: required_str(sub, "lender")?.to_string(),
                debt_type,
                account_id: arg_str(sub, "account").unwrap_or_default().to_string(),
                original_amount: parse_decimal(required_str(sub, "amount")?)?,
                currency: arg_str(sub, "currency").unwrap_or("GBP").to_string(),
                apr: decimal_arg(sub, "apr")?.unwrap_or_default(),
                min_payment: decimal_arg(sub, "min-payment")?.unwrap_or_default(),
                payment_day: sub.get_one::<u32>("payment-day").copied().unwrap_or(1),
                note: arg_str(sub, "note").unwrap_or_default().to_string(),
            };
            let lender = d.lender.clone();
            let id = store.update(|book| debts::add_debt(book, d))?;
            println!("Added {} debt {} ({})", debt_type, id, lender);
        }
        Some(("list", sub)) => {
            let today = as_of(sub)?;
            let book = store.load()?;
            let lines = debts::overview(&book, today);
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &lines)? {
                return Ok(());
            }
            let total: Decimal = lines.iter().map(|l| l.balance).sum();
            let rows = lines
                .iter()
                .map(|l| {
                    vec![
                        l.id.to_string(),
                        l.lender.clone(),
                        l.debt_type.to_string(),
                        format!("{:.2}%", l.apr),
                        fmt_money(&l.balance, &l.currency),
                        fmt_money(&l.min_due, &l.currency),
                        l.due_date.to_string(),
                        l.account_id.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["ID", "Lender", "Type", "APR", "Balance", "Min Due", "Due", "Account"],
                    rows
                )
            );
            println!("Total debt: {:.2}", total);
        }
        Some(("pay", sub)) => {
            let id_raw = required_str(sub, "id")?;
            let debt_id: i64 = id_raw
                .parse()
                .with_context(|| format!("Invalid debt id '{}'", id_raw))?;
            let from = required_str(sub, "from")?;
            let amount = parse_decimal(required_str(sub, "amount")?)?;
            let date = as_of(sub)?;
            let currency = arg_str(sub, "currency").unwrap_or_default();
            let note = arg_str(sub, "note").unwrap_or_default();
            let paid = store.update(|book| {
                debts::pay_debt(book, from, debt_id, amount, currency, date, note)
            })?;
            match paid {
                DebtPayment::Transfer { .. } => {
                    println!("Paid {} to debt {} from {}", amount, debt_id, from)
                }
                DebtPayment::Standalone { applied, .. } => {
                    println!("Paid {} to debt {} from {}", applied, debt_id, from);
                    if applied < amount {
                        println!("Only {} was owed; the rest was not taken", applied);
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}
