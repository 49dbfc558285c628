// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categories;
use crate::models::CategoryKind;
use crate::store::UserStore;
use crate::utils::{arg_str, pretty_table, required_str};
use anyhow::{Result, anyhow};

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind: CategoryKind = required_str(sub, "kind")?
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let name = required_str(sub, "name")?;
            store.update(|book| categories::add_category(book, kind, name))?;
            println!("Added {} category '{}'", kind.as_str(), name);
        }
        Some(("list", sub)) => {
            let book = store.load()?;
            let kind = arg_str(sub, "kind")
                .map(|k| k.parse::<CategoryKind>().map_err(|e| anyhow!(e)))
                .transpose()?;
            let data = book
                .categories
                .iter()
                .filter(|c| kind.is_none_or(|k| c.kind == k))
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.kind.as_str().to_string(),
                        c.name.clone(),
                        if c.active { "yes".into() } else { "no".into() },
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["ID", "Kind", "Name", "Active"], data));
        }
        Some(("seed", _)) => {
            let added = store.update(|book| Ok(categories::seed_defaults(book)))?;
            if added == 0 {
                println!("Categories already present; nothing seeded");
            } else {
                println!("Seeded {} default categories", added);
            }
        }
        _ => {}
    }
    Ok(())
}
