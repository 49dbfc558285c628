// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod categories;
pub mod categorise;
pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod debts;
pub mod error;
pub mod ledger;
pub mod models;
pub mod recurrence;
pub mod statements;
pub mod store;
pub mod utils;

pub use error::{BookError, Result};

/// Installs the stderr tracing subscriber once per process.
pub fn init_tracing() {
    utils::init_tracing();
    tracing::debug!("billfold tracing initialised");
}
