// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AccountType, ScheduleKind};
use rust_decimal::Decimal;
use thiserror::Error;

/// Failures surfaced by the bookkeeping core.
///
/// Validation variants are raised before any balance or row is touched, so a
/// rejected operation leaves the book exactly as it was loaded.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("Account '{0}' not found")]
    UnknownAccount(String),
    #[error("Amount must be greater than zero (got {0})")]
    InvalidAmount(Decimal),
    #[error("From and to accounts must differ (both '{0}')")]
    SameAccount(String),
    #[error("Recurring {kind} {id} cannot be scheduled: {reason}")]
    UnparseableSchedule {
        kind: ScheduleKind,
        id: i64,
        reason: String,
    },
    #[error("Statement {0} not found")]
    StatementNotFound(i64),
    #[error("Debt {0} not found")]
    DebtNotFound(i64),
    #[error("Debt {0} has no outstanding balance")]
    DebtSettled(i64),
    #[error("Rule {0} not found")]
    RuleNotFound(i64),
    #[error("Account '{account_id}' is a {found} account, expected {expected}")]
    WrongAccountType {
        account_id: String,
        expected: AccountType,
        found: AccountType,
    },
    #[error("{file} line {line}: invalid {column} '{value}'")]
    InvalidField {
        file: &'static str,
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("{0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BookError>;
