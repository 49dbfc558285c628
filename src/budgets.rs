// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{BookError, Result};
use crate::models::{Budget, TxKind};
use crate::store::Book;
use crate::utils::{month_of, next_id, round_money};
use rust_decimal::Decimal;
use serde::Serialize;

/// Creates or replaces the budget for `(month, category)`. Returns its id.
pub fn set_budget(
    book: &mut Book,
    month: &str,
    category: &str,
    amount: Decimal,
    currency: &str,
    note: &str,
) -> Result<i64> {
    if amount < Decimal::ZERO {
        return Err(BookError::InvalidAmount(amount));
    }
    let (month, category) = (month.trim(), category.trim());
    if category.is_empty() {
        return Err(BookError::InvalidInput("Budget category must not be empty".into()));
    }
    let currency = match currency.trim() {
        "" => "GBP".to_string(),
        c => c.to_uppercase(),
    };
    if let Some(b) = book
        .budgets
        .iter_mut()
        .find(|b| b.month == month && b.category.eq_ignore_ascii_case(category))
    {
        b.amount = round_money(amount);
        b.currency = currency;
        b.active = true;
        if !note.trim().is_empty() {
            b.note = note.trim().to_string();
        }
        return Ok(b.id);
    }
    let id = next_id(&book.budgets, |b| b.id);
    book.budgets.push(Budget {
        id,
        month: month.to_string(),
        category: category.to_string(),
        amount: round_money(amount),
        currency,
        active: true,
        note: note.trim().to_string(),
    });
    Ok(id)
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub currency: String,
}

/// Active budgets for `month` against the expenses booked in that month.
pub fn report(book: &Book, month: &str) -> Vec<BudgetLine> {
    let month = month.trim();
    let mut out: Vec<BudgetLine> = book
        .budgets
        .iter()
        .filter(|b| b.active && b.month == month)
        .map(|b| {
            let spent: Decimal = book
                .transactions
                .iter()
                .filter(|t| t.kind == TxKind::Expense && month_of(t.date) == month)
                .filter(|t| t.category.eq_ignore_ascii_case(&b.category))
                .map(|t| t.amount)
                .sum();
            BudgetLine {
                category: b.category.clone(),
                budget: b.amount,
                spent: round_money(spent),
                remaining: round_money(b.amount - spent),
                currency: b.currency.clone(),
            }
        })
        .collect();
    out.sort_by(|a, b| a.category.cmp(&b.category));
    out
}
