// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Credit-card statements: close a cycle, then record payments against it.
//!
//! There is no explicit "closed" flag. The open statement for a card is its
//! most recent row, and a new one may be closed while an older one is unpaid.

use crate::debts::min_due;
use crate::error::{BookError, Result};
use crate::ledger;
use crate::models::{AccountType, Statement};
use crate::store::Book;
use crate::utils::{next_id, round_money, shift_days};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatementTerms {
    pub due_days: i64,
    pub min_pct: Decimal,
    pub min_floor: Decimal,
}

impl Default for StatementTerms {
    fn default() -> Self {
        StatementTerms {
            due_days: 25,
            min_pct: Decimal::from(3),
            min_floor: Decimal::from(25),
        }
    }
}

/// Snapshots what is owed on `card` into a new statement row.
pub fn close_statement(
    book: &mut Book,
    card: &str,
    period_end: NaiveDate,
    period_start: Option<NaiveDate>,
    terms: StatementTerms,
    note: &str,
) -> Result<i64> {
    let acct = book.account(card)?;
    if acct.account_type != AccountType::CreditCard {
        return Err(BookError::WrongAccountType {
            account_id: acct.account_id.clone(),
            expected: AccountType::CreditCard,
            found: acct.account_type,
        });
    }
    let balance = round_money(acct.class().owed(acct.balance));
    let due_date = shift_days(period_end, terms.due_days).ok_or_else(|| {
        BookError::InvalidInput(format!("Due date {} days after {} is out of range", terms.due_days, period_end))
    })?;
    let period_start = match period_start {
        Some(start) => start,
        None => shift_days(period_end, -30).ok_or_else(|| {
            BookError::InvalidInput(format!("Period end {} is out of range", period_end))
        })?,
    };
    let stmt = Statement {
        id: next_id(&book.statements, |s| s.id),
        card_account_id: acct.account_id.clone(),
        period_start,
        period_end,
        statement_balance: balance,
        apr_at_cycle: acct.apr,
        min_due: min_due(balance, terms.min_pct, terms.min_floor),
        due_date,
        paid_amount: Decimal::ZERO,
        paid_date: None,
        carried_balance: balance,
        note: note.trim().to_string(),
    };
    let id = stmt.id;
    info!(statement = id, card = %stmt.card_account_id, %balance, due = %stmt.due_date, "statement closed");
    book.statements.push(stmt);
    Ok(id)
}

/// Most recent date on or before `today` that falls on day `day` of a month.
pub fn last_statement_date(today: NaiveDate, day: u32) -> Option<NaiveDate> {
    let (year, month) = if today.day() >= day {
        (today.year(), today.month())
    } else if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Transfers `amount` from `from_bank` to the statement's card and adds it to
/// the statement's running totals.
pub fn record_cc_payment(
    book: &mut Book,
    stmt_id: i64,
    from_bank: &str,
    amount: Decimal,
    currency: &str,
    when: NaiveDate,
    note: &str,
) -> Result<(i64, i64)> {
    let card = book.statement(stmt_id)?.card_account_id.clone();
    let legs = ledger::transfer(book, from_bank, &card, amount, currency, when, note)?;
    let moved = round_money(amount);
    if let Some(stmt) = book.statements.iter_mut().find(|s| s.id == stmt_id) {
        stmt.paid_amount = round_money(stmt.paid_amount + moved);
        stmt.paid_date = Some(when);
        stmt.carried_balance = (stmt.statement_balance - stmt.paid_amount).max(Decimal::ZERO);
    }
    info!(statement = stmt_id, amount = %moved, "statement payment recorded");
    Ok(legs)
}

/// Highest-numbered statement for `card`.
pub fn latest_open_statement(book: &Book, card: &str) -> Option<i64> {
    let card = card.trim();
    book.statements
        .iter()
        .filter(|s| s.card_account_id == card)
        .map(|s| s.id)
        .max()
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementDue {
    pub id: i64,
    pub card_account_id: String,
    pub due_date: NaiveDate,
    pub min_due: Decimal,
    pub outstanding: Decimal,
}

/// Statements with money still outstanding whose due date is within `days`
/// of `today` (overdue included).
pub fn due_within(book: &Book, today: NaiveDate, days: i64) -> Result<Vec<StatementDue>> {
    let horizon = shift_days(today, days)
        .ok_or_else(|| BookError::InvalidInput(format!("A {}-day window is out of range", days)))?;
    let mut out: Vec<StatementDue> = book
        .statements
        .iter()
        .filter(|s| s.carried_balance > Decimal::ZERO && s.due_date <= horizon)
        .map(|s| StatementDue {
            id: s.id,
            card_account_id: s.card_account_id.clone(),
            due_date: s.due_date,
            min_due: (s.min_due - s.paid_amount).max(Decimal::ZERO),
            outstanding: s.carried_balance,
        })
        .collect();
    out.sort_by_key(|s| (s.due_date, s.id));
    Ok(out)
}
