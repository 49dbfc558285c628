// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::{TRANSFER_IN, TRANSFER_OUT, TxKind};
use crate::recurrence::Frequency;
use crate::store::{Book, UserStore};
use crate::utils::{parse_iso_date, pretty_table};
use anyhow::Result;
use std::collections::{HashMap, HashSet};

/// One problem found in a user's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

fn issue(kind: &'static str, detail: String) -> Issue {
    Issue { kind, detail }
}

pub fn check(book: &Book) -> Vec<Issue> {
    let mut out = Vec::new();

    // 1) account ids must be unique
    let mut seen = HashSet::new();
    for a in &book.accounts {
        if !seen.insert(a.account_id.as_str()) {
            out.push(issue("duplicate_account_id", a.account_id.clone()));
        }
    }

    // 2) rows pointing at accounts that do not exist
    for t in &book.transactions {
        if !seen.contains(t.account_id.as_str()) {
            out.push(issue(
                "txn_unknown_account",
                format!("tx {} -> '{}'", t.id, t.account_id),
            ));
        }
        if t.id <= 0 {
            out.push(issue("txn_missing_id", format!("{} {} {}", t.date, t.kind, t.amount)));
        }
    }
    for s in &book.statements {
        if !seen.contains(s.card_account_id.as_str()) {
            out.push(issue(
                "statement_unknown_card",
                format!("statement {} -> '{}'", s.id, s.card_account_id),
            ));
        }
    }

    // 3) every transfer leg needs its mirror
    let mut legs: HashMap<(String, String, String, String, bool), i64> = HashMap::new();
    for t in book.transactions.iter().filter(|t| t.kind == TxKind::Transfer) {
        let outgoing = t.category != TRANSFER_IN;
        let (src, dst) = if outgoing {
            (&t.account_id, &t.counterparty_account_id)
        } else {
            (&t.counterparty_account_id, &t.account_id)
        };
        let key = (
            t.date.to_string(),
            t.amount.normalize().to_string(),
            src.clone(),
            dst.clone(),
            outgoing,
        );
        *legs.entry(key).or_default() += 1;
    }
    for ((date, amount, src, dst, outgoing), n) in &legs {
        let mirror = (date.clone(), amount.clone(), src.clone(), dst.clone(), !outgoing);
        let m = legs.get(&mirror).copied().unwrap_or(0);
        if n > &m {
            let side = if *outgoing { TRANSFER_OUT } else { TRANSFER_IN };
            out.push(issue(
                "unpaired_transfer",
                format!("{} {} {} -> {} ({} x{})", date, amount, src, dst, side, n - m),
            ));
        }
    }

    // 4) schedules the recurrence run will skip
    for (kind, rows) in [
        ("expense", &book.recurring_expenses),
        ("income", &book.recurring_incomes),
    ] {
        for r in rows {
            let date_ok = parse_iso_date(&r.next_due_date).is_some();
            let freq_ok = r.frequency.parse::<Frequency>().is_ok();
            if !date_ok || !freq_ok {
                out.push(issue(
                    "unparseable_schedule",
                    format!(
                        "recurring {} {}: frequency '{}', next_due_date '{}'",
                        kind, r.id, r.frequency, r.next_due_date
                    ),
                ));
            }
        }
    }

    out.sort_by(|a, b| a.kind.cmp(b.kind).then_with(|| a.detail.cmp(&b.detail)));
    out
}

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    if m.get_flag("fix") {
        let fixed = store.update(|book| Ok(ledger::backfill_transaction_ids(book)))?;
        println!("Assigned ids to {} transaction(s)", fixed);
    }
    let book = store.load()?;
    let rows: Vec<Vec<String>> = check(&book)
        .into_iter()
        .map(|i| vec![i.kind.to_string(), i.detail])
        .collect();
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
