// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use clap::ArgMatches;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` overrides
/// the default `billfold=warn`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("billfold=warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Lenient ISO date for stored cells: accepts a trailing time part.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = match s.get(..10) {
        Some(head) if s.len() == 10 || s[10..].starts_with([' ', 'T']) => head,
        _ => return None,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Money is rounded to two places, halves away from zero.
pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, round_money(*d))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Next sequential id: one past the largest id present, 1 for an empty table.
pub fn next_id<T>(rows: &[T], id: impl Fn(&T) -> i64) -> i64 {
    rows.iter().map(id).max().unwrap_or(0).max(0) + 1
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// Calendar month arithmetic; the day is clamped to the target month's end
/// (Jan 31 + 1 month is Feb 28, or Feb 29 in a leap year).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// `date` moved by `days`, or `None` when that leaves the calendar chrono can represent.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    chrono::TimeDelta::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

pub fn month_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Trimmed string argument; blank counts as absent.
pub fn arg_str<'a>(m: &'a ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn required_str<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    arg_str(m, id).ok_or_else(|| anyhow!("--{} must not be empty", id))
}

pub fn decimal_arg(m: &ArgMatches, id: &str) -> Result<Option<Decimal>> {
    arg_str(m, id).map(parse_decimal).transpose()
}

pub fn date_arg(m: &ArgMatches, id: &str) -> Result<Option<NaiveDate>> {
    arg_str(m, id).map(parse_date).transpose()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `--date`, defaulting to today.
pub fn as_of(m: &ArgMatches) -> Result<NaiveDate> {
    Ok(date_arg(m, "date")?.unwrap_or_else(today))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(d(2025, 1, 31), 1), d(2025, 2, 28));
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2025, 3, 31), 1), d(2025, 4, 30));
        assert_eq!(add_months(d(2025, 11, 30), 3), d(2026, 2, 28));
        assert_eq!(add_months(d(2024, 2, 29), 12), d(2025, 2, 28));
    }

    #[test]
    fn shift_days_stays_inside_the_calendar() {
        assert_eq!(shift_days(d(2025, 5, 31), 25), Some(d(2025, 6, 25)));
        assert_eq!(shift_days(d(2025, 5, 31), -30), Some(d(2025, 5, 1)));
        assert_eq!(shift_days(d(2025, 5, 31), 1_000_000_000), None);
        assert_eq!(shift_days(d(2025, 5, 31), i64::MAX), None);
    }

    #[test]
    fn iso_dates_tolerate_time_suffix() {
        assert_eq!(parse_iso_date("2025-02-03"), Some(d(2025, 2, 3)));
        assert_eq!(parse_iso_date("2025-02-03 00:00:00"), Some(d(2025, 2, 3)));
        assert_eq!(parse_iso_date("03/02/2025"), None);
        assert_eq!(parse_iso_date("soon"), None);
    }

    #[test]
    fn round_money_rounds_half_away_from_zero() {
        assert_eq!(round_money("2.345".parse().unwrap()).to_string(), "2.35");
        assert_eq!(round_money("-2.345".parse().unwrap()).to_string(), "-2.35");
    }

    #[test]
    fn next_id_is_one_past_max() {
        assert_eq!(next_id(&[3i64, 9, 4], |v| *v), 10);
        assert_eq!(next_id::<i64>(&[], |v| *v), 1);
    }
}
