// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bank-statement CSV import.
//!
//! Amounts come in signed (or as separate debit and credit columns); the sign
//! picks income or expense and the stored amount is its absolute value.

use crate::categorise;
use crate::ledger::{self, Posting};
use crate::models::Transaction;
use crate::store::{Book, UserStore};
use crate::utils::{arg_str, required_str, round_money};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y"];
const NOTE_KEY_CHARS: usize = 60;

/// Which columns of the source file carry what.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub account_id: String,
    pub currency: String,
    pub date_col: String,
    pub amount_col: Option<String>,
    pub debit_col: Option<String>,
    pub credit_col: Option<String>,
    pub desc_col: Option<String>,
    pub invert: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub date: NaiveDate,
    /// Positive is money in.
    pub signed: Decimal,
    pub note: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportOutcome {
    pub read: usize,
    pub dropped: usize,
    pub duplicates: usize,
    pub posted: usize,
    pub categorised: usize,
}

fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.split([' ', 'T']).next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(head, f).ok())
}

/// Bank exports use thousands separators, currency signs and `(1.00)` for
/// negatives. Anything unreadable counts as zero.
fn parse_loose_amount(s: &str) -> Decimal {
    let s = s.trim();
    let (negative, body) = match s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    let value = cleaned.parse::<Decimal>().unwrap_or_default();
    if negative { -value } else { value }
}

/// Reads the source file into signed rows, dropping undated and zero rows.
pub fn read_rows(path: &Path, spec: &ImportSpec) -> Result<(Vec<ImportRow>, usize)> {
    let bytes = std::fs::read(path).with_context(|| format!("Open CSV {}", path.display()))?;
    let body = bytes.strip_prefix(crate::codec::BOM).unwrap_or(&bytes);
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);
    let headers: HashMap<String, usize> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();
    let column = |name: &str| -> Result<usize> {
        headers
            .get(name.trim())
            .copied()
            .ok_or_else(|| anyhow!("Column '{}' not found in {}", name, path.display()))
    };

    let date_i = column(&spec.date_col)?;
    let desc_i = spec.desc_col.as_deref().map(|c| column(c)).transpose()?;
    let split = match (&spec.debit_col, &spec.credit_col) {
        (Some(d), Some(c)) => Some((column(d)?, column(c)?)),
        _ => None,
    };
    let amount_i = match (&split, &spec.amount_col) {
        (Some(_), _) => None,
        (None, Some(a)) => Some(column(a)?),
        (None, None) => {
            return Err(anyhow!(
                "Pass an amount column, or both debit and credit columns"
            ));
        }
    };

    let mut rows = Vec::new();
    let mut dropped = 0;
    for rec in rdr.records() {
        let rec = rec?;
        let cell = |i: usize| rec.get(i).unwrap_or("");
        let signed = match (split, amount_i) {
            (Some((d, c)), _) => parse_loose_amount(cell(c)) - parse_loose_amount(cell(d)),
            (None, Some(a)) => {
                let v = parse_loose_amount(cell(a));
                if spec.invert { -v } else { v }
            }
            (None, None) => Decimal::ZERO,
        };
        let signed = round_money(signed);
        let Some(date) = parse_loose_date(cell(date_i)) else {
            dropped += 1;
            continue;
        };
        if signed.is_zero() {
            dropped += 1;
            continue;
        }
        rows.push(ImportRow {
            date,
            signed,
            note: desc_i.map(|i| cell(i).trim().to_string()).unwrap_or_default(),
        });
    }
    Ok((rows, dropped))
}

fn dedupe_key(date: NaiveDate, signed: Decimal, account_id: &str, note: &str) -> String {
    let note: String = note.chars().take(NOTE_KEY_CHARS).collect();
    format!("{}|{:.2}|{}|{}", date, signed, account_id, note)
}

fn known_key(t: &Transaction) -> String {
    dedupe_key(t.date, t.inflow(), &t.account_id, &t.note)
}

/// Posts the rows that are not already in the book. Re-importing the same
/// file is a no-op.
pub fn commit_rows(
    book: &mut Book,
    spec: &ImportSpec,
    rows: &[ImportRow],
    apply_rules: bool,
) -> crate::error::Result<ImportOutcome> {
    let account = book.account(&spec.account_id)?.account_id.clone();
    let mut seen: HashSet<String> = book.transactions.iter().map(known_key).collect();
    let mut outcome = ImportOutcome {
        read: rows.len(),
        ..ImportOutcome::default()
    };
    for row in rows {
        if !seen.insert(dedupe_key(row.date, row.signed, &account, &row.note)) {
            outcome.duplicates += 1;
            continue;
        }
        let p = Posting::new(&account, row.signed.abs(), row.date)
            .currency(&spec.currency)
            .note(&row.note);
        if row.signed > Decimal::ZERO {
            ledger::post_income(book, p)?;
        } else {
            ledger::post_expense(book, p)?;
        }
        outcome.posted += 1;
    }
    if apply_rules {
        outcome.categorised = categorise::apply_rules(book, false);
    }
    Ok(outcome)
}

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(store, sub),
        _ => Ok(()),
    }
}

fn import_transactions(store: &UserStore, sub: &clap::ArgMatches) -> Result<()> {
    let path = required_str(sub, "path")?;
    let spec = ImportSpec {
        account_id: required_str(sub, "account")?.to_string(),
        currency: arg_str(sub, "currency").unwrap_or_default().to_string(),
        date_col: arg_str(sub, "date-col").unwrap_or("date").to_string(),
        amount_col: arg_str(sub, "amount-col").map(str::to_string),
        debit_col: arg_str(sub, "debit-col").map(str::to_string),
        credit_col: arg_str(sub, "credit-col").map(str::to_string),
        desc_col: arg_str(sub, "desc-col").map(str::to_string),
        invert: sub.get_flag("invert"),
    };
    let (rows, dropped) = read_rows(Path::new(path), &spec)?;
    let dry_run = sub.get_flag("dry-run");
    let apply_rules = sub.get_flag("apply-rules");

    let mut outcome = if dry_run {
        let mut scratch = store.load()?;
        commit_rows(&mut scratch, &spec, &rows, apply_rules)?
    } else {
        store.update(|book| commit_rows(book, &spec, &rows, apply_rules))?
    };
    outcome.dropped = dropped;
    println!(
        "{} {} of {} row(s) from {} ({} duplicate, {} dropped, {} categorised)",
        if dry_run { "Would import" } else { "Imported" },
        outcome.posted,
        outcome.read + outcome.dropped,
        path,
        outcome.duplicates,
        outcome.dropped,
        outcome.categorised
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_amounts() {
        assert_eq!(parse_loose_amount("£1,234.50"), Decimal::new(123450, 2));
        assert_eq!(parse_loose_amount("(12.00)"), Decimal::new(-1200, 2));
        assert_eq!(parse_loose_amount("-3"), Decimal::from(-3));
        assert_eq!(parse_loose_amount("12.00 EUR"), Decimal::new(1200, 2));
        assert_eq!(parse_loose_amount(""), Decimal::ZERO);
    }

    #[test]
    fn loose_dates() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        assert_eq!(parse_loose_date("2025-02-03"), Some(d));
        assert_eq!(parse_loose_date("03/02/2025"), Some(d));
        assert_eq!(parse_loose_date("2025-02-03 10:00:00"), Some(d));
        assert_eq!(parse_loose_date("tomorrow"), None);
    }
}
