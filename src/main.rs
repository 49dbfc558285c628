// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use billfold::config::Prefs;
use billfold::store::{self, UserStore};
use billfold::{cli, commands, recurrence, utils};

fn open_store(matches: &clap::ArgMatches) -> Result<UserStore> {
    let base = match utils::arg_str(matches, "data-dir") {
        Some(dir) => PathBuf::from(dir),
        None => store::default_base_dir()?,
    };
    let user = utils::arg_str(matches, "user").unwrap_or("guest");
    Ok(UserStore::open(&base, user)?)
}

/// Posts whatever recurring items fell due since the last run.
fn autorun(store: &UserStore) -> Result<()> {
    if !Prefs::load(store)?.recurring_autorun {
        return Ok(());
    }
    let today = utils::today();
    let report = store.update(|book| Ok(recurrence::process_all(book, today)))?;
    if report.posted > 0 || !report.is_clean() {
        commands::recurring::print_report(&report);
    }
    Ok(())
}

fn main() -> Result<()> {
    billfold::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    let store = open_store(&matches)?;

    if !matches!(
        matches.subcommand_name(),
        None | Some("init" | "prefs" | "doctor")
    ) {
        autorun(&store)?;
    }

    match matches.subcommand() {
        Some(("init", _)) => commands::init::handle(&store)?,
        Some(("account", sub)) => commands::accounts::handle(&store, sub)?,
        Some(("category", sub)) => commands::categories::handle(&store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&store, sub)?,
        Some(("interest", sub)) => commands::interest::handle(&store, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(&store, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&store, sub)?,
        Some(("card", sub)) => commands::cards::handle(&store, sub)?,
        Some(("rules", sub)) => commands::rules::handle(&store, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&store, sub)?,
        Some(("import", sub)) => commands::importer::handle(&store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("due", sub)) => commands::due::handle(&store, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&store, sub)?,
        Some(("prefs", sub)) => commands::prefs::handle(&store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
