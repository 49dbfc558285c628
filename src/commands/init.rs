// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categories;
use crate::config::{PREFS_FILE, Prefs};
use crate::store::UserStore;
use anyhow::Result;

pub fn handle(store: &UserStore) -> Result<()> {
    let created = store.ensure_files()?;
    let seeded = store.update(|book| Ok(categories::seed_defaults(book)))?;
    if !store.path(PREFS_FILE).exists() {
        Prefs::default().save(store)?;
    }
    println!(
        "Books ready at {} ({} file(s) created, {} categories seeded)",
        store.root().display(),
        created.len(),
        seeded
    );
    Ok(())
}
