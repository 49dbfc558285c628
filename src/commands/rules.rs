// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categorise::{self, NewRule};
use crate::models::{MatchField, TxKind};
use crate::store::UserStore;
use crate::utils::{arg_str, maybe_print_json, pretty_table, required_str};
use anyhow::{Context, Result, anyhow};

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let match_field: MatchField = arg_str(sub, "field")
                .unwrap_or_default()
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let kind = arg_str(sub, "kind")
                .map(|k| k.parse::<TxKind>().map_err(|e| anyhow!(e)))
                .transpose()?;
            let rule = NewRule {
                priority: sub.get_one::<i64>("priority").copied().unwrap_or(1000),
                kind,
                category: required_str(sub, "category")?.to_string(),
                match_field,
                contains: required_str(sub, "contains")?.to_string(),
                case_sensitive: sub.get_flag("case-sensitive"),
            };
            let summary = format!("'{}' in {} -> {}", rule.contains, match_field, rule.category);
            let id = store.update(|book| categorise::add_rule(book, rule))?;
            println!("Added rule {}: {}", id, summary);
        }
        Some(("list", sub)) => {
            let book = store.load()?;
            let mut rules: Vec<_> = book.rules.iter().collect();
            rules.sort_by_key(|r| (r.priority, r.id));
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rules)? {
                return Ok(());
            }
            let data = rules
                .iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        r.priority.to_string(),
                        if r.active { "yes".into() } else { "no".into() },
                        r.match_field.to_string(),
                        r.contains.clone(),
                        r.category.clone(),
                        r.kind.map(|k| k.to_string()).unwrap_or_default(),
                        if r.case_sensitive { "yes".into() } else { "no".into() },
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["ID", "Priority", "Active", "Field", "Contains", "Category", "Kind", "Case"],
                    data
                )
            );
        }
        Some(("rm", sub)) => {
            let raw = required_str(sub, "id")?;
            let id = raw
                .parse::<i64>()
                .with_context(|| format!("Invalid rule id '{}'", raw))?;
            store.update(|book| categorise::remove_rule(book, id))?;
            println!("Removed rule {}", id);
        }
        Some(("apply", sub)) => {
            let dry_run = sub.get_flag("dry-run");
            let changed = store.update(|book| Ok(categorise::apply_rules(book, dry_run)))?;
            if dry_run {
                println!("Would categorise {} transaction(s)", changed);
            } else {
                println!("Categorised {} transaction(s)", changed);
            }
        }
        _ => {}
    }
    Ok(())
}
