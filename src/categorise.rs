// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Substring rules that fill in missing transaction categories.

use crate::error::{BookError, Result};
use crate::models::{MatchField, Rule, Transaction, TxKind};
use crate::store::Book;
use crate::utils::next_id;
use tracing::{debug, info};

impl Rule {
    /// An empty needle matches nothing.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if !self.active || self.contains.is_empty() {
            return false;
        }
        let hay = self.match_field.value(tx);
        if self.case_sensitive {
            hay.contains(&self.contains)
        } else {
            hay.to_lowercase().contains(&self.contains.to_lowercase())
        }
    }
}

/// Active rules in evaluation order: `(priority, id)` ascending.
pub fn ordered_rules(rules: &[Rule]) -> Vec<&Rule> {
    let mut out: Vec<&Rule> = rules.iter().filter(|r| r.active).collect();
    out.sort_by_key(|r| (r.priority, r.id));
    out
}

/// Categorises every uncategorised transaction with the first matching rule.
/// Rows that already carry a category are never touched.
///
/// Returns how many rows changed. With `dry_run` the book is left as it was.
pub fn apply_rules(book: &mut Book, dry_run: bool) -> usize {
    let rules: Vec<Rule> = ordered_rules(&book.rules).into_iter().cloned().collect();
    if rules.is_empty() {
        return 0;
    }
    let mut changed = 0;
    for tx in book.transactions.iter_mut().filter(|t| t.is_uncategorised()) {
        let Some(rule) = rules.iter().find(|r| r.matches(tx)) else {
            continue;
        };
        changed += 1;
        debug!(tx = tx.id, rule = rule.id, category = %rule.category, "rule matched");
        if dry_run {
            continue;
        }
        tx.category = rule.category.clone();
        if let Some(kind) = rule.kind {
            tx.kind = kind;
        }
    }
    info!(changed, dry_run, "rules applied");
    changed
}

#[derive(Debug, Clone)]
pub struct NewRule {
    pub priority: i64,
    pub kind: Option<TxKind>,
    pub category: String,
    pub match_field: MatchField,
    pub contains: String,
    pub case_sensitive: bool,
}

pub fn add_rule(book: &mut Book, r: NewRule) -> Result<i64> {
    let category = r.category.trim().to_string();
    if category.is_empty() {
        return Err(BookError::InvalidInput("Rule category must not be empty".into()));
    }
    if r.contains.trim().is_empty() {
        return Err(BookError::InvalidInput("Rule text to match must not be empty".into()));
    }
    let id = next_id(&book.rules, |x| x.id);
    book.rules.push(Rule {
        id,
        active: true,
        priority: r.priority,
        kind: r.kind,
        category,
        match_field: r.match_field,
        contains: r.contains.trim().to_string(),
        case_sensitive: r.case_sensitive,
    });
    Ok(id)
}

pub fn remove_rule(book: &mut Book, id: i64) -> Result<Rule> {
    let idx = book
        .rules
        .iter()
        .position(|r| r.id == id)
        .ok_or(BookError::RuleNotFound(id))?;
    Ok(book.rules.remove(idx))
}
