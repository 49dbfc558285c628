// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::UserStore;
use crate::utils::as_of;
use crate::{debts, ledger};
use anyhow::Result;

pub fn handle(store: &UserStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("cards", sub)) => {
            let date = as_of(sub)?;
            let n = store.update(|book| ledger::accrue_credit_card_interest(book, date))?;
            println!("Charged interest on {} card(s) as of {}", n, date);
        }
        Some(("loans", sub)) => {
            let date = as_of(sub)?;
            let n = store.update(|book| debts::accrue_loan_interest_all(book, date))?;
            println!("Accrued interest on {} debt(s) as of {}", n, date);
        }
        _ => {}
    }
    Ok(())
}
