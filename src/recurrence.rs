// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rolls recurring incomes and expenses forward to "today".

use crate::error::{BookError, Result};
use crate::ledger::{self, Posting, Reference};
use crate::models::{RecurringSchedule, ScheduleKind};
use crate::store::Book;
use crate::utils::{add_months, next_id, parse_iso_date, shift_days};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    BiMonthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 7] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::BiWeekly,
        Frequency::Monthly,
        Frequency::BiMonthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::BiWeekly => "Bi-Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::BiMonthly => "Bi-Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }

    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date + Duration::days(1),
            Frequency::Weekly => date + Duration::days(7),
            Frequency::BiWeekly => date + Duration::days(14),
            Frequency::Monthly => add_months(date, 1),
            Frequency::BiMonthly => add_months(date, 2),
            Frequency::Quarterly => add_months(date, 3),
            Frequency::Yearly => add_months(date, 12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown frequency '{}'", s))
    }
}

/// Outcome of one rollout pass.
#[derive(Debug, Default, Serialize)]
pub struct RolloutReport {
    /// Ledger entries written.
    pub posted: usize,
    /// Rows whose next due date moved.
    pub advanced: usize,
    /// Rows left alone because their date or frequency is unreadable.
    #[serde(skip)]
    pub skipped: Vec<BookError>,
    /// Rows that stopped part-way because a posting failed.
    #[serde(skip)]
    pub failures: Vec<BookError>,
}

impl RolloutReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty()
    }

    fn merge(&mut self, other: RolloutReport) {
        self.posted += other.posted;
        self.advanced += other.advanced;
        self.skipped.extend(other.skipped);
        self.failures.extend(other.failures);
    }
}

fn schedule_of(kind: ScheduleKind, row: &RecurringSchedule) -> Result<(NaiveDate, Frequency)> {
    let unparseable = |reason: String| BookError::UnparseableSchedule {
        kind,
        id: row.id,
        reason,
    };
    let due = parse_iso_date(&row.next_due_date)
        .ok_or_else(|| unparseable(format!("next_due_date '{}'", row.next_due_date)))?;
    let freq = row.frequency.parse::<Frequency>().map_err(unparseable)?;
    Ok((due, freq))
}

fn post_occurrence(
    book: &mut Book,
    kind: ScheduleKind,
    row: &RecurringSchedule,
    date: NaiveDate,
) -> Result<i64> {
    let p = Posting::new(&row.account_id, row.amount, date)
        .currency(&row.currency)
        .category(&row.label)
        .note(&row.note)
        .reference(Reference::new(kind.ref_table(), row.id));
    match kind {
        ScheduleKind::Expense => ledger::post_expense(book, p),
        ScheduleKind::Income => ledger::post_income(book, p),
    }
}

/// Posts every occurrence due on or before `today` for one schedule table and
/// moves each row's `next_due_date` past `today`.
///
/// A row that fails to post keeps the last date that did post; other rows
/// carry on.
pub fn process_recurring(book: &mut Book, kind: ScheduleKind, today: NaiveDate) -> RolloutReport {
    let mut report = RolloutReport::default();
    for idx in 0..book.schedules(kind).len() {
        let row = book.schedules(kind)[idx].clone();
        let (mut due, freq) = match schedule_of(kind, &row) {
            Ok(s) => s,
            Err(e) => {
                warn!(%kind, id = row.id, error = %e, "skipping recurring row");
                report.skipped.push(e);
                continue;
            }
        };
        let start = due;
        while due <= today {
            match post_occurrence(book, kind, &row, due) {
                Ok(_) => {
                    report.posted += 1;
                    due = freq.advance(due);
                }
                Err(e) => {
                    warn!(%kind, id = row.id, %due, error = %e, "recurring posting failed");
                    report.failures.push(e);
                    break;
                }
            }
        }
        if due != start {
            book.schedules_mut(kind)[idx].next_due_date = due.to_string();
            report.advanced += 1;
        }
    }
    info!(%kind, posted = report.posted, advanced = report.advanced, "recurring rollout");
    report
}

/// Expenses first, then incomes.
pub fn process_all(book: &mut Book, today: NaiveDate) -> RolloutReport {
    let mut report = process_recurring(book, ScheduleKind::Expense, today);
    report.merge(process_recurring(book, ScheduleKind::Income, today));
    report
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub label: String,
    pub amount: Decimal,
    pub currency: String,
    pub frequency: Frequency,
    pub next_due_date: NaiveDate,
    pub account_id: String,
    pub note: String,
}

pub fn add_schedule(book: &mut Book, kind: ScheduleKind, s: NewSchedule) -> Result<i64> {
    if s.amount <= Decimal::ZERO {
        return Err(BookError::InvalidAmount(s.amount));
    }
    let currency = match s.currency.trim() {
        "" => book.account(&s.account_id)?.currency.clone(),
        c => {
            book.account(&s.account_id)?;
            c.to_uppercase()
        }
    };
    let rows = book.schedules_mut(kind);
    let id = next_id(rows, |r| r.id);
    rows.push(RecurringSchedule {
        id,
        label: s.label.trim().to_string(),
        amount: s.amount,
        currency,
        frequency: s.frequency.to_string(),
        next_due_date: s.next_due_date.to_string(),
        account_id: s.account_id.trim().to_string(),
        note: s.note.trim().to_string(),
    });
    Ok(id)
}

#[derive(Debug, Clone, Serialize)]
pub struct Upcoming {
    pub kind: ScheduleKind,
    pub id: i64,
    pub label: String,
    pub amount: Decimal,
    pub currency: String,
    pub due: NaiveDate,
    pub account_id: String,
}

/// Schedule rows whose next due date falls within `days` of `today`
/// (overdue rows included), soonest first.
pub fn upcoming(book: &Book, today: NaiveDate, days: i64) -> Result<Vec<Upcoming>> {
    let horizon = shift_days(today, days)
        .ok_or_else(|| BookError::InvalidInput(format!("A {}-day window is out of range", days)))?;
    let mut out: Vec<Upcoming> = [ScheduleKind::Expense, ScheduleKind::Income]
        .into_iter()
        .flat_map(|kind| {
            book.schedules(kind).iter().filter_map(move |row| {
                let due = parse_iso_date(&row.next_due_date)?;
                (due <= horizon).then(|| Upcoming {
                    kind,
                    id: row.id,
                    label: row.label.clone(),
                    amount: row.amount,
                    currency: row.currency.clone(),
                    due,
                    account_id: row.account_id.clone(),
                })
            })
        })
        .collect();
    out.sort_by_key(|u| (u.due, u.id));
    Ok(out)
}
