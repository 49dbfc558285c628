// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `prefs.json`: a free-form object with a handful of known keys. Unknown
//! keys survive a load/save cycle untouched.

use crate::codec::write_atomic;
use crate::error::{BookError, Result};
use crate::store::UserStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;

pub const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefs {
    pub display_name: String,
    pub base_currency: String,
    pub dashboard_months_back: u32,
    pub include_future_tx: bool,
    pub default_income_account: String,
    pub default_expense_account: String,
    pub week_starts_on: String,
    pub number_format: String,
    pub recurring_autorun: bool,
    pub cc_statement_day: u32,
    pub min_payment_rule: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Prefs {
    fn default() -> Self {
        Prefs {
            display_name: String::new(),
            base_currency: "GBP".into(),
            dashboard_months_back: 6,
            include_future_tx: false,
            default_income_account: String::new(),
            default_expense_account: String::new(),
            week_starts_on: "Mon".into(),
            number_format: "1,234.56".into(),
            recurring_autorun: true,
            cc_statement_day: 25,
            min_payment_rule: "max(25, 3%)".into(),
            extra: Map::new(),
        }
    }
}

impl Prefs {
    pub fn load(store: &UserStore) -> Result<Prefs> {
        let path = store.path(PREFS_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Prefs::default()),
            Err(e) => return Err(e.into()),
        };
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Ok(Prefs::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Day of the month card statements close on; out-of-range values fall back to 25.
    pub fn statement_day(&self) -> u32 {
        match self.cc_statement_day {
            day @ 1..=28 => day,
            _ => 25,
        }
    }

    pub fn save(&self, store: &UserStore) -> Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        write_atomic(&store.path(PREFS_FILE), body.as_bytes())
    }

    /// Sets one key from its textual form. Known keys are type-checked; any
    /// other key is stored as a JSON literal when it parses as one, else as a
    /// string.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut obj = match serde_json::to_value(&*self)? {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        let parsed = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        let typed = match obj.get(key) {
            Some(Value::String(_)) => Value::String(value.to_string()),
            _ => parsed,
        };
        obj.insert(key.to_string(), typed);
        *self = serde_json::from_value(Value::Object(obj))
            .map_err(|e| BookError::InvalidInput(format!("Invalid value for '{}': {}", key, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unknown_keys_survive_round_trip() {
        let dir = tempdir().unwrap();
        let store = UserStore::at(dir.path()).unwrap();
        fs::write(
            store.path(PREFS_FILE),
            r#"{"base_currency":"EUR","theme":"dark"}"#,
        )
        .unwrap();
        let prefs = Prefs::load(&store).unwrap();
        assert_eq!(prefs.base_currency, "EUR");
        assert_eq!(prefs.dashboard_months_back, 6);
        prefs.save(&store).unwrap();
        let raw: Value =
            serde_json::from_str(&fs::read_to_string(store.path(PREFS_FILE)).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
    }

    #[test]
    fn set_type_checks_known_keys() {
        let mut prefs = Prefs::default();
        prefs.set("cc_statement_day", "21").unwrap();
        assert_eq!(prefs.cc_statement_day, 21);
        assert_eq!(prefs.statement_day(), 21);
        prefs.set("cc_statement_day", "31").unwrap();
        assert_eq!(prefs.statement_day(), 25);
        assert!(prefs.set("recurring_autorun", "sometimes").is_err());
        prefs.set("display_name", "42").unwrap();
        assert_eq!(prefs.display_name, "42");
    }
}
