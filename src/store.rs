// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user storage: one directory of flat files per user, loaded whole into a
//! [`Book`], mutated in memory and written back in one pass.
//!
//! Within a process every [`UserStore::update`] holds a lock keyed by the
//! storage root, so two requests for the same user run one after the other.
//! Nothing coordinates separate processes; the last full-file write wins.

use crate::codec::{Table, read_table, write_table};
use crate::error::{BookError, Result};
use crate::models::{
    Account, Budget, Category, Debt, RecurringSchedule, Rule, ScheduleKind, Statement, Transaction,
};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "AlphaVelocity";
const APPLICATION: &str = "billfold";

static UNSAFE_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9._-]").expect("static regex"));

static ROOT_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = Lazy::new(Default::default);

pub const ACCOUNTS: Table = Table {
    file: "accounts.csv",
    columns: &[
        "id", "account_name", "account_type", "account_id", "balance", "currency", "limit", "apr",
        "note",
    ],
};

pub const TRANSACTIONS: Table = Table {
    file: "transactions.csv",
    columns: &[
        "id",
        "date",
        "kind",
        "amount",
        "currency",
        "account_id",
        "counterparty_account_id",
        "category",
        "ref_table",
        "ref_id",
        "note",
    ],
};

pub const RECURRING_EXPENSES: Table = Table {
    file: "recurring_expenses.csv",
    columns: &[
        "id", "expense_type", "amount", "currency", "frequency", "next_due_date", "account_id",
        "note",
    ],
};

pub const RECURRING_INCOMES: Table = Table {
    file: "recurring_incomes.csv",
    columns: &[
        "id", "income_type", "amount", "currency", "frequency", "next_due_date", "account_id",
        "note",
    ],
};

pub const DEBTS: Table = Table {
    file: "debts.csv",
    columns: &[
        "id",
        "lender",
        "debt_type",
        "account_id",
        "original_amount",
        "current_balance",
        "currency",
        "apr",
        "min_payment",
        "payment_day",
        "note",
    ],
};

pub const STATEMENTS: Table = Table {
    file: "credit_card_statements.csv",
    columns: &[
        "id",
        "card_account_id",
        "period_start",
        "period_end",
        "statement_balance",
        "apr_at_cycle",
        "min_due",
        "due_date",
        "paid_amount",
        "paid_date",
        "carried_balance",
        "note",
    ],
};

pub const RULES: Table = Table {
    file: "rules.csv",
    columns: &[
        "id", "active", "priority", "kind", "category", "match_field", "contains", "case_sensitive",
    ],
};

pub const BUDGETS: Table = Table {
    file: "budgets.csv",
    columns: &["id", "month", "category", "amount", "currency", "active", "note"],
};

pub const CATEGORIES: Table = Table {
    file: "categories.csv",
    columns: &["id", "kind", "name", "active"],
};

pub const ALL_TABLES: [&Table; 9] = [
    &ACCOUNTS,
    &TRANSACTIONS,
    &RECURRING_EXPENSES,
    &RECURRING_INCOMES,
    &DEBTS,
    &STATEMENTS,
    &RULES,
    &BUDGETS,
    &CATEGORIES,
];

/// Everything one user owns, held in memory for the length of an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Book {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub recurring_expenses: Vec<RecurringSchedule>,
    pub recurring_incomes: Vec<RecurringSchedule>,
    pub debts: Vec<Debt>,
    pub statements: Vec<Statement>,
    pub rules: Vec<Rule>,
    pub budgets: Vec<Budget>,
    pub categories: Vec<Category>,
}

impl Book {
    pub fn account(&self, account_id: &str) -> Result<&Account> {
        let key = account_id.trim();
        self.accounts
            .iter()
            .find(|a| a.account_id == key)
            .ok_or_else(|| BookError::UnknownAccount(key.to_string()))
    }

    pub fn account_mut(&mut self, account_id: &str) -> Result<&mut Account> {
        let key = account_id.trim();
        self.accounts
            .iter_mut()
            .find(|a| a.account_id == key)
            .ok_or_else(|| BookError::UnknownAccount(key.to_string()))
    }

    pub fn schedules(&self, kind: ScheduleKind) -> &Vec<RecurringSchedule> {
        match kind {
            ScheduleKind::Expense => &self.recurring_expenses,
            ScheduleKind::Income => &self.recurring_incomes,
        }
    }

    pub fn schedules_mut(&mut self, kind: ScheduleKind) -> &mut Vec<RecurringSchedule> {
        match kind {
            ScheduleKind::Expense => &mut self.recurring_expenses,
            ScheduleKind::Income => &mut self.recurring_incomes,
        }
    }

    pub fn debt(&self, id: i64) -> Result<&Debt> {
        self.debts
            .iter()
            .find(|d| d.id == id)
            .ok_or(BookError::DebtNotFound(id))
    }

    pub fn statement(&self, id: i64) -> Result<&Statement> {
        self.statements
            .iter()
            .find(|s| s.id == id)
            .ok_or(BookError::StatementNotFound(id))
    }
}

/// Lower-cases and strips a login name down to a safe directory name.
pub fn user_segment(raw: &str) -> String {
    let s = raw.trim().to_lowercase().replace(' ', "_");
    let s = UNSAFE_SEGMENT.replace_all(&s, "-").into_owned();
    if s.is_empty() { "guest".to_string() } else { s }
}

/// Platform data directory used when no explicit root is configured.
pub fn default_base_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
        BookError::InvalidInput("Could not determine platform-specific data dir".into())
    })?;
    Ok(proj.data_dir().to_path_buf())
}

fn root_lock(root: &Path) -> Arc<Mutex<()>> {
    let mut locks = ROOT_LOCKS.lock().unwrap_or_else(|p| p.into_inner());
    locks.entry(root.to_path_buf()).or_default().clone()
}

/// Handle on one user's storage root.
#[derive(Debug, Clone)]
pub struct UserStore {
    root: PathBuf,
}

impl UserStore {
    /// Opens `<base>/users/<segment>` for `user`, creating it when missing.
    pub fn open(base: &Path, user: &str) -> Result<Self> {
        let root = base.join("users").join(user_segment(user));
        Self::at(&root)
    }

    /// Uses `root` directly as the user's directory.
    pub fn at(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let root = fs::canonicalize(root)?;
        debug!(root = %root.display(), "opened user store");
        Ok(UserStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    pub fn load(&self) -> Result<Book> {
        let root = &self.root;
        Ok(Book {
            accounts: read_table(root, &ACCOUNTS, Account::from_row)?,
            transactions: read_table(root, &TRANSACTIONS, Transaction::from_row)?,
            recurring_expenses: read_table(root, &RECURRING_EXPENSES, |r| {
                RecurringSchedule::from_row(ScheduleKind::Expense, r)
            })?,
            recurring_incomes: read_table(root, &RECURRING_INCOMES, |r| {
                RecurringSchedule::from_row(ScheduleKind::Income, r)
            })?,
            debts: read_table(root, &DEBTS, Debt::from_row)?,
            statements: read_table(root, &STATEMENTS, Statement::from_row)?,
            rules: read_table(root, &RULES, Rule::from_row)?,
            budgets: read_table(root, &BUDGETS, Budget::from_row)?,
            categories: read_table(root, &CATEGORIES, Category::from_row)?,
        })
    }

    /// Writes every table of `book` that differs from `before`.
    pub fn save_changes(&self, before: &Book, book: &Book) -> Result<usize> {
        let root = &self.root;
        let mut written = 0;
        if before.accounts != book.accounts {
            write_table(root, &ACCOUNTS, &book.accounts, Account::to_record)?;
            written += 1;
        }
        if before.transactions != book.transactions {
            write_table(root, &TRANSACTIONS, &book.transactions, Transaction::to_record)?;
            written += 1;
        }
        if before.recurring_expenses != book.recurring_expenses {
            write_table(
                root,
                &RECURRING_EXPENSES,
                &book.recurring_expenses,
                RecurringSchedule::to_record,
            )?;
            written += 1;
        }
        if before.recurring_incomes != book.recurring_incomes {
            write_table(
                root,
                &RECURRING_INCOMES,
                &book.recurring_incomes,
                RecurringSchedule::to_record,
            )?;
            written += 1;
        }
        if before.debts != book.debts {
            write_table(root, &DEBTS, &book.debts, Debt::to_record)?;
            written += 1;
        }
        if before.statements != book.statements {
            write_table(root, &STATEMENTS, &book.statements, Statement::to_record)?;
            written += 1;
        }
        if before.rules != book.rules {
            write_table(root, &RULES, &book.rules, Rule::to_record)?;
            written += 1;
        }
        if before.budgets != book.budgets {
            write_table(root, &BUDGETS, &book.budgets, Budget::to_record)?;
            written += 1;
        }
        if before.categories != book.categories {
            write_table(root, &CATEGORIES, &book.categories, Category::to_record)?;
            written += 1;
        }
        Ok(written)
    }

    /// Creates a header-only file for every table that does not exist yet.
    /// Returns the files created.
    pub fn ensure_files(&self) -> Result<Vec<&'static str>> {
        let lock = root_lock(&self.root);
        let _guard = lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut created = Vec::new();
        for table in ALL_TABLES {
            if !self.path(table.file).exists() {
                write_table(&self.root, table, &[] as &[()], |_| Vec::new())?;
                created.push(table.file);
            }
        }
        Ok(created)
    }

    /// Loads the whole book, applies `f`, and persists once if `f` succeeds.
    /// An error from `f` leaves every file as it was.
    pub fn update<T>(&self, f: impl FnOnce(&mut Book) -> Result<T>) -> Result<T> {
        let lock = root_lock(&self.root);
        let _guard = lock.lock().unwrap_or_else(|p| p.into_inner());
        let before = self.load()?;
        let mut book = before.clone();
        let out = f(&mut book)?;
        let written = self.save_changes(&before, &book)?;
        info!(root = %self.root.display(), tables = written, "book updated");
        Ok(out)
    }
}
