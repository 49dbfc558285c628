// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{BookError, Result};
use crate::models::{Category, CategoryKind};
use crate::store::Book;
use crate::utils::next_id;

pub const DEFAULT_INCOME: [&str; 5] = ["Salary", "Locum Work", "Freelance", "Investments", "Gifts"];

pub const DEFAULT_EXPENSE: [&str; 15] = [
    "Groceries",
    "Food/Eating Out",
    "Transportation",
    "Petrol",
    "Entertainment",
    "Healthcare",
    "Gifts",
    "Family Support",
    "Rent/Mortgage",
    "Utilities",
    "Subscriptions",
    "Council Tax",
    "Insurance",
    "Loan Payments",
    "Credit Card Payment",
];

/// Fills an empty category table with the defaults. A table that already has
/// rows is left alone. Returns how many were added.
pub fn seed_defaults(book: &mut Book) -> usize {
    if !book.categories.is_empty() {
        return 0;
    }
    let defaults = DEFAULT_INCOME
        .iter()
        .map(|n| (CategoryKind::Income, *n))
        .chain(DEFAULT_EXPENSE.iter().map(|n| (CategoryKind::Expense, *n)));
    for (i, (kind, name)) in defaults.enumerate() {
        book.categories.push(Category {
            id: i as i64 + 1,
            kind,
            name: name.to_string(),
            active: true,
        });
    }
    book.categories.len()
}

pub fn add_category(book: &mut Book, kind: CategoryKind, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BookError::InvalidInput("Category name must not be empty".into()));
    }
    if let Some(existing) = book
        .categories
        .iter()
        .find(|c| c.kind == kind && c.name.eq_ignore_ascii_case(name))
    {
        return Err(BookError::InvalidInput(format!(
            "{} category '{}' already exists (id {})",
            kind.as_str(),
            existing.name,
            existing.id
        )));
    }
    let id = next_id(&book.categories, |c| c.id);
    book.categories.push(Category {
        id,
        kind,
        name: name.to_string(),
        active: true,
    });
    Ok(id)
}
