// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::UserStore;
use crate::utils::{as_of, maybe_print_json, pretty_table};
use crate::{recurrence, statements};
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct DueItem {
    due: String,
    what: String,
    reference: String,
    amount: String,
    account_id: String,
}

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    let today = as_of(m)?;
    let days = m.get_one::<i64>("days").copied().unwrap_or(14);
    let book = store.load()?;

    let mut items: Vec<DueItem> = recurrence::upcoming(&book, today, days)?
        .into_iter()
        .map(|u| DueItem {
            due: u.due.to_string(),
            what: format!("recurring {}", u.kind),
            reference: format!("{} #{}", u.label, u.id),
            amount: format!("{} {:.2}", u.currency, u.amount),
            account_id: u.account_id,
        })
        .collect();
    items.extend(
        statements::due_within(&book, today, days)?
            .into_iter()
            .map(|s| DueItem {
                due: s.due_date.to_string(),
                what: "card statement".into(),
                reference: format!("statement #{}", s.id),
                amount: format!("min {:.2} of {:.2}", s.min_due, s.outstanding),
                account_id: s.card_account_id,
            }),
    );
    items.sort_by(|a, b| a.due.cmp(&b.due));

    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    if items.is_empty() {
        println!("Nothing due in the next {} day(s)", days);
        return Ok(());
    }
    let rows = items
        .into_iter()
        .map(|i| vec![i.due, i.what, i.reference, i.amount, i.account_id])
        .collect();
    println!(
        "{}",
        pretty_table(&["Due", "What", "Ref", "Amount", "Account"], rows)
    );
    Ok(())
}
