// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Flat-file codec shared by every table of a user's book.
//!
//! Files are UTF-8 with a leading byte-order mark, comma separated, one header
//! row. Reading is lenient the way the files have always been treated: a
//! missing or empty file is an empty table, a missing column reads as an empty
//! cell, and the old `limt` spelling of `limit` is accepted. Writing always
//! emits the canonical column order through a temp file and a rename.

use crate::error::{BookError, Result};
use crate::utils::parse_iso_date;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// A file name plus its order-sensitive column list.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub file: &'static str,
    pub columns: &'static [&'static str],
}

/// One data row, addressed by column name.
pub struct Row<'a> {
    file: &'static str,
    line: u64,
    headers: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    pub fn raw(&self, column: &str) -> &'a str {
        self.headers
            .get(column)
            .and_then(|i| self.record.get(*i))
            .unwrap_or("")
    }

    pub fn text(&self, column: &str) -> String {
        let v = self.raw(column).trim();
        if is_null(v) { String::new() } else { v.to_string() }
    }

    pub fn invalid(&self, column: &'static str) -> BookError {
        BookError::InvalidField {
            file: self.file,
            line: self.line,
            column,
            value: self.raw(column).trim().to_string(),
        }
    }

    /// Integer cell; spreadsheet exports sometimes write ids as `12.0`.
    pub fn int(&self, column: &'static str) -> Result<Option<i64>> {
        let v = self.raw(column).trim();
        if is_null(v) {
            return Ok(None);
        }
        if let Ok(n) = v.parse::<i64>() {
            return Ok(Some(n));
        }
        match v.parse::<Decimal>() {
            Ok(d) if d.fract().is_zero() => d.to_i64().map(Some).ok_or_else(|| self.invalid(column)),
            _ => Err(self.invalid(column)),
        }
    }

    pub fn int_or(&self, column: &'static str, default: i64) -> Result<i64> {
        Ok(self.int(column)?.unwrap_or(default))
    }

    pub fn decimal_or(&self, column: &'static str, default: Decimal) -> Result<Decimal> {
        let v = self.raw(column).trim();
        if is_null(v) {
            return Ok(default);
        }
        v.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(v))
            .map_err(|_| self.invalid(column))
    }

    pub fn opt_date(&self, column: &'static str) -> Result<Option<NaiveDate>> {
        let v = self.raw(column).trim();
        if is_null(v) {
            return Ok(None);
        }
        parse_iso_date(v).map(Some).ok_or_else(|| self.invalid(column))
    }

    pub fn date(&self, column: &'static str) -> Result<NaiveDate> {
        self.opt_date(column)?.ok_or_else(|| self.invalid(column))
    }

    pub fn flag(&self, column: &'static str, default: bool) -> Result<bool> {
        let v = self.raw(column).trim();
        if is_null(v) {
            return Ok(default);
        }
        match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "1.0" | "yes" | "y" => Ok(true),
            "false" | "0" | "0.0" | "no" | "n" => Ok(false),
            _ => Err(self.invalid(column)),
        }
    }

    pub fn parse<T: FromStr>(&self, column: &'static str) -> Result<T> {
        self.text(column)
            .parse::<T>()
            .map_err(|_| self.invalid(column))
    }
}

fn is_null(v: &str) -> bool {
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v == "<NA>"
}

fn canonical_header(h: &str) -> String {
    let h = h.trim_start_matches('\u{feff}').trim();
    if h == "limt" { "limit".to_string() } else { h.to_string() }
}

pub fn read_table<T>(
    root: &Path,
    table: &Table,
    parse: impl Fn(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let path = root.join(table.file);
    let bytes = match fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let body = bytes.strip_prefix(BOM).unwrap_or(&bytes);
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);
    let headers: HashMap<String, usize> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (canonical_header(h), i))
        .collect();

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row = Row {
            file: table.file,
            line,
            headers: &headers,
            record: &record,
        };
        out.push(parse(&row)?);
    }
    debug!(file = table.file, rows = out.len(), "loaded table");
    Ok(out)
}

pub fn write_table<T>(
    root: &Path,
    table: &Table,
    rows: &[T],
    render: impl Fn(&T) -> Vec<String>,
) -> Result<()> {
    let mut buf = BOM.to_vec();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        wtr.write_record(table.columns)?;
        for r in rows {
            wtr.write_record(render(r))?;
        }
        wtr.flush()?;
    }
    write_atomic(&root.join(table.file), &buf)?;
    debug!(file = table.file, rows = rows.len(), "wrote table");
    Ok(())
}

/// Replaces `path` with `bytes` so readers never observe a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn flag_cell(v: bool) -> String {
    if v { "True".into() } else { "False".into() }
}

pub fn date_cell(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_default()
}
