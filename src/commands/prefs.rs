// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Prefs;
use crate::store::UserStore;
use anyhow::{Context, Result};

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let prefs = Prefs::load(store)?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        Some(("set", sub)) => {
            let key = sub
                .get_one::<String>("KEY")
                .map(|s| s.trim())
                .context("KEY is required")?;
            let value = sub
                .get_one::<String>("VALUE")
                .map(|s| s.trim())
                .context("VALUE is required")?;
            let mut prefs = Prefs::load(store)?;
            prefs.set(key, value)?;
            prefs.save(store)?;
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
