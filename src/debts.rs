// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Loans, overdrafts and other debts.
//!
//! A debt linked to an account reads its balance from that account and moves
//! money through the ledger. An unlinked debt owns `current_balance` itself.

use crate::error::{BookError, Result};
use crate::ledger::{self, Posting, Reference, monthly_interest};
use crate::models::{Debt, DebtType};
use crate::store::Book;
use crate::utils::{add_months, next_id, round_money};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub const MIN_PAYMENT_FLOOR: Decimal = Decimal::from_parts(25, 0, 0, false, 0);
pub const MIN_PAYMENT_PCT: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// `max(floor, pct% of |balance|)`, rounded to pennies.
pub fn min_due(balance: Decimal, pct: Decimal, floor: Decimal) -> Decimal {
    round_money(floor.max(balance.abs() * pct / Decimal::ONE_HUNDRED))
}

/// An explicit positive minimum wins; otherwise `max(25, 3%)`.
pub fn default_min_payment(balance: Decimal, explicit_min: Option<Decimal>) -> Decimal {
    match explicit_min {
        Some(m) if m > Decimal::ZERO => round_money(m),
        _ => min_due(balance, MIN_PAYMENT_PCT, MIN_PAYMENT_FLOOR),
    }
}

/// First date on or after `today` that falls on `payment_day` (clamped 1..=28).
pub fn next_payment_date(payment_day: u32, today: NaiveDate) -> NaiveDate {
    let day = payment_day.clamp(1, 28);
    let this_month = NaiveDate::from_ymd_opt(today.year(), today.month(), day)
        .unwrap_or(today);
    if this_month >= today {
        return this_month;
    }
    add_months(this_month, 1)
}

/// What is owed on a debt right now.
pub fn live_balance(book: &Book, debt: &Debt) -> Decimal {
    match debt.linked_account().and_then(|id| book.account(id).ok()) {
        Some(acct) => acct.class().owed(acct.balance),
        None => debt.current_balance,
    }
}

#[derive(Debug, Clone)]
pub struct NewDebt {
    pub lender: String,
    pub debt_type: DebtType,
    pub account_id: String,
    pub original_amount: Decimal,
    pub currency: String,
    pub apr: Decimal,
    pub min_payment: Decimal,
    pub payment_day: u32,
    pub note: String,
}

pub fn add_debt(book: &mut Book, d: NewDebt) -> Result<i64> {
    if d.original_amount < Decimal::ZERO {
        return Err(BookError::InvalidAmount(d.original_amount));
    }
    let account_id = d.account_id.trim().to_string();
    if !account_id.is_empty() {
        book.account(&account_id)?;
    }
    let id = next_id(&book.debts, |x| x.id);
    book.debts.push(Debt {
        id,
        lender: d.lender.trim().to_string(),
        debt_type: d.debt_type,
        account_id,
        original_amount: d.original_amount,
        current_balance: d.original_amount,
        currency: d.currency.trim().to_uppercase(),
        apr: d.apr,
        min_payment: d.min_payment,
        payment_day: d.payment_day.clamp(1, 28),
        note: d.note.trim().to_string(),
    });
    Ok(id)
}

/// One month of interest on every non-card debt with a positive APR.
///
/// Calling this twice for the same month charges twice.
pub fn accrue_loan_interest_all(book: &mut Book, when: NaiveDate) -> Result<usize> {
    let mut charged = 0;
    for idx in 0..book.debts.len() {
        let debt = book.debts[idx].clone();
        if !debt.debt_type.accrues_monthly() || debt.apr <= Decimal::ZERO {
            continue;
        }
        let linked = debt
            .linked_account()
            .and_then(|id| book.account(id).ok())
            .map(|a| (a.account_id.clone(), a.class().owed(a.balance), a.currency.clone()));
        let principal = linked
            .as_ref()
            .map(|(_, owed, _)| *owed)
            .unwrap_or(debt.current_balance);
        let interest = monthly_interest(principal, debt.apr);
        if interest <= Decimal::ZERO {
            continue;
        }
        match linked {
            Some((account_id, _, currency)) => {
                ledger::post_expense(
                    book,
                    Posting::new(&account_id, interest, when)
                        .currency(&currency)
                        .category("Interest")
                        .note(&format!("Monthly interest @ {:.2}% APR (loan)", debt.apr))
                        .reference(Reference::new("debts_interest", debt.id)),
                )?;
            }
            None => {
                let row = &mut book.debts[idx];
                row.current_balance = round_money(row.current_balance + interest);
            }
        }
        charged += 1;
    }
    info!(debts = charged, %when, "loan interest accrued");
    Ok(charged)
}

/// What a payment did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DebtPayment {
    /// Linked debt: a ledger transfer into the debt's account.
    Transfer { out_id: i64, in_id: i64 },
    /// Standalone debt: `applied` came off `current_balance` and was logged
    /// as an expense on the paying account.
    Standalone { applied: Decimal, tx_id: i64 },
}

/// Pays `amount` from `from_account` towards debt `debt_id`.
///
/// For a standalone debt the amount is clamped to what is owed, and the audit
/// expense records the clamped figure.
pub fn pay_debt(
    book: &mut Book,
    from_account: &str,
    debt_id: i64,
    amount: Decimal,
    currency: &str,
    when: NaiveDate,
    note: &str,
) -> Result<DebtPayment> {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        return Err(BookError::InvalidAmount(amount));
    }
    let debt = book.debt(debt_id)?.clone();
    book.account(from_account)?;

    if let Some(target) = debt.linked_account() {
        let note = if note.trim().is_empty() { "Debt payment" } else { note };
        let (out_id, in_id) =
            ledger::transfer(book, from_account, target, amount, currency, when, note)?;
        return Ok(DebtPayment::Transfer { out_id, in_id });
    }

    let owed = debt.current_balance.max(Decimal::ZERO);
    if owed.is_zero() {
        return Err(BookError::DebtSettled(debt_id));
    }
    let applied = amount.min(owed);
    let note = if note.trim().is_empty() {
        format!("Payment to {}", debt.lender)
    } else {
        note.to_string()
    };
    let tx_id = ledger::post_expense(
        book,
        Posting::new(from_account, applied, when)
            .currency(currency)
            .category("Debt Payment")
            .note(&note)
            .reference(Reference::new("debts_payment", debt_id)),
    )?;
    if let Some(row) = book.debts.iter_mut().find(|d| d.id == debt_id) {
        row.current_balance = round_money(owed - applied);
    }
    info!(debt = debt_id, %applied, "standalone debt payment");
    Ok(DebtPayment::Standalone { applied, tx_id })
}

#[derive(Debug, Clone, Serialize)]
pub struct DebtLine {
    pub id: i64,
    pub lender: String,
    pub debt_type: DebtType,
    pub apr: Decimal,
    pub balance: Decimal,
    pub min_due: Decimal,
    pub due_date: NaiveDate,
    pub currency: String,
    pub account_id: String,
}

/// Live balance, minimum and next due date for every debt.
pub fn overview(book: &Book, today: NaiveDate) -> Vec<DebtLine> {
    book.debts
        .iter()
        .map(|d| {
            let balance = round_money(live_balance(book, d));
            let currency = match d.currency.as_str() {
                "" => "GBP".to_string(),
                c => c.to_string(),
            };
            DebtLine {
                id: d.id,
                lender: d.lender.clone(),
                debt_type: d.debt_type,
                apr: d.apr,
                balance,
                min_due: default_min_payment(balance, Some(d.min_payment)),
                due_date: next_payment_date(d.payment_day, today),
                currency,
                account_id: d.account_id.clone(),
            }
        })
        .collect()
}
