// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::codec::{Row, date_cell, flag_cell};
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which way a balance reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceClass {
    /// Balance is funds held; money arriving increases it.
    Asset,
    /// Balance is the amount owed; money arriving decreases it.
    Liability,
}

impl BalanceClass {
    /// Applies a money movement where a positive `delta` means funds arriving.
    pub fn apply(self, balance: Decimal, delta: Decimal) -> Decimal {
        match self {
            BalanceClass::Asset => balance + delta,
            BalanceClass::Liability => balance - delta,
        }
    }

    pub fn owed(self, balance: Decimal) -> Decimal {
        match self {
            BalanceClass::Asset => -balance,
            BalanceClass::Liability => balance,
        }
    }

    pub fn net_worth(self, balance: Decimal) -> Decimal {
        -self.owed(balance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccountType {
    Current,
    Savings,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Investment,
    Other,
    Loan,
    Overdraft,
}

impl AccountType {
    pub const ALL: [AccountType; 7] = [
        AccountType::Current,
        AccountType::Savings,
        AccountType::CreditCard,
        AccountType::Investment,
        AccountType::Other,
        AccountType::Loan,
        AccountType::Overdraft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Current => "Current",
            AccountType::Savings => "Savings",
            AccountType::CreditCard => "Credit Card",
            AccountType::Investment => "Investment",
            AccountType::Other => "Other",
            AccountType::Loan => "Loan",
            AccountType::Overdraft => "Overdraft",
        }
    }

    pub fn class(&self) -> BalanceClass {
        match self {
            AccountType::CreditCard | AccountType::Loan => BalanceClass::Liability,
            _ => BalanceClass::Asset,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(AccountType::Other);
        }
        AccountType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown account type '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: i64,
    pub account_name: String,
    pub account_type: AccountType,
    pub account_id: String,
    pub balance: Decimal,
    pub currency: String,
    pub limit: Decimal,
    pub apr: Decimal,
    pub note: String,
}

impl Account {
    pub fn class(&self) -> BalanceClass {
        self.account_type.class()
    }

    pub(crate) fn from_row(r: &Row<'_>) -> Result<Self> {
        let id = r.int_or("id", 0)?;
        let mut account_id = r.text("account_id");
        if account_id.is_empty() {
            account_id = id.to_string();
        }
        let account_name = match r.text("account_name") {
            n if n.is_empty() => "Unnamed account".to_string(),
            n => n,
        };
        let currency = match r.text("currency") {
            c if c.is_empty() => "GBP".to_string(),
            c => c.to_uppercase(),
        };
        Ok(Account {
            id,
            account_name,
            account_type: r.parse("account_type")?,
            account_id,
            balance: r.decimal_or("balance", Decimal::ZERO)?,
            currency,
            limit: r.decimal_or("limit", Decimal::ZERO)?,
            apr: r.decimal_or("apr", Decimal::ZERO)?,
            note: r.text("note"),
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.account_name.clone(),
            self.account_type.to_string(),
            self.account_id.clone(),
            self.balance.to_string(),
            self.currency.clone(),
            self.limit.to_string(),
            self.apr.to_string(),
            self.note.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
    Transfer,
    Interest,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
            TxKind::Transfer => "transfer",
            TxKind::Interest => "interest",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            "transfer" => Ok(TxKind::Transfer),
            "interest" => Ok(TxKind::Interest),
            other => Err(format!("unknown transaction kind '{}'", other)),
        }
    }
}

pub const TRANSFER_OUT: &str = "transfer_out";
pub const TRANSFER_IN: &str = "transfer_in";

/// One row of the append-only log. `amount` is always positive; the
/// direction comes from `kind` (and, for transfers, the leg category).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: TxKind,
    pub amount: Decimal,
    pub currency: String,
    pub account_id: String,
    pub counterparty_account_id: String,
    pub category: String,
    pub ref_table: String,
    pub ref_id: String,
    pub note: String,
}

impl Transaction {
    /// Signed movement on `account_id`, positive meaning funds arriving.
    pub fn inflow(&self) -> Decimal {
        match self.kind {
            TxKind::Income => self.amount,
            TxKind::Expense | TxKind::Interest => -self.amount,
            TxKind::Transfer if self.category == TRANSFER_IN => self.amount,
            TxKind::Transfer => -self.amount,
        }
    }

    pub fn is_uncategorised(&self) -> bool {
        self.category.trim().is_empty()
    }

    pub(crate) fn from_row(r: &Row<'_>) -> Result<Self> {
        Ok(Transaction {
            id: r.int_or("id", 0)?,
            date: r.date("date")?,
            kind: r.parse("kind")?,
            amount: r.decimal_or("amount", Decimal::ZERO)?.abs(),
            currency: r.text("currency"),
            account_id: r.text("account_id"),
            counterparty_account_id: r.text("counterparty_account_id"),
            category: r.text("category"),
            ref_table: r.text("ref_table"),
            ref_id: r.text("ref_id"),
            note: r.text("note"),
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.to_string(),
            self.kind.to_string(),
            self.amount.to_string(),
            self.currency.clone(),
            self.account_id.clone(),
            self.counterparty_account_id.clone(),
            self.category.clone(),
            self.ref_table.clone(),
            self.ref_id.clone(),
            self.note.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScheduleKind {
    Expense,
    Income,
}

impl ScheduleKind {
    pub fn label_column(&self) -> &'static str {
        match self {
            ScheduleKind::Expense => "expense_type",
            ScheduleKind::Income => "income_type",
        }
    }

    pub fn ref_table(&self) -> &'static str {
        match self {
            ScheduleKind::Expense => "recurring_expenses",
            ScheduleKind::Income => "recurring_incomes",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleKind::Expense => f.write_str("expense"),
            ScheduleKind::Income => f.write_str("income"),
        }
    }
}

/// A recurring income or expense. `frequency` and `next_due_date` stay as
/// the stored text so a row nobody can interpret is written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringSchedule {
    pub id: i64,
    pub label: String,
    pub amount: Decimal,
    pub currency: String,
    pub frequency: String,
    pub next_due_date: String,
    pub account_id: String,
    pub note: String,
}

impl RecurringSchedule {
    pub(crate) fn from_row(kind: ScheduleKind, r: &Row<'_>) -> Result<Self> {
        let currency = match r.text("currency") {
            c if c.is_empty() => "GBP".to_string(),
            c => c,
        };
        Ok(RecurringSchedule {
            id: r.int_or("id", 0)?,
            label: r.text(kind.label_column()),
            amount: r.decimal_or("amount", Decimal::ZERO)?,
            currency,
            frequency: r.text("frequency"),
            next_due_date: r.text("next_due_date"),
            account_id: r.text("account_id"),
            note: r.text("note"),
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.label.clone(),
            self.amount.to_string(),
            self.currency.clone(),
            self.frequency.clone(),
            self.next_due_date.clone(),
            self.account_id.clone(),
            self.note.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DebtType {
    Loan,
    Overdraft,
    Other,
    CreditCard,
}

impl DebtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtType::Loan => "loan",
            DebtType::Overdraft => "overdraft",
            DebtType::Other => "other",
            DebtType::CreditCard => "credit card",
        }
    }

    /// Card debts accrue through the card account, not the debt table.
    pub fn accrues_monthly(&self) -> bool {
        !matches!(self, DebtType::CreditCard)
    }
}

impl fmt::Display for DebtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "loan" => Ok(DebtType::Loan),
            "overdraft" => Ok(DebtType::Overdraft),
            "other" => Ok(DebtType::Other),
            "credit card" => Ok(DebtType::CreditCard),
            other => Err(format!("unknown debt type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Debt {
    pub id: i64,
    pub lender: String,
    pub debt_type: DebtType,
    /// Empty when the debt tracks its own balance.
    pub account_id: String,
    pub original_amount: Decimal,
    pub current_balance: Decimal,
    pub currency: String,
    pub apr: Decimal,
    /// Zero means "derive from the balance".
    pub min_payment: Decimal,
    pub payment_day: u32,
    pub note: String,
}

impl Debt {
    pub fn linked_account(&self) -> Option<&str> {
        let id = self.account_id.trim();
        if id.is_empty() { None } else { Some(id) }
    }

    pub(crate) fn from_row(r: &Row<'_>) -> Result<Self> {
        let day = r.int_or("payment_day", 1)?.clamp(1, 28);
        Ok(Debt {
            id: r.int_or("id", 0)?,
            lender: r.text("lender"),
            debt_type: r.parse("debt_type")?,
            account_id: r.text("account_id"),
            original_amount: r.decimal_or("original_amount", Decimal::ZERO)?,
            current_balance: r.decimal_or("current_balance", Decimal::ZERO)?,
            currency: r.text("currency"),
            apr: r.decimal_or("apr", Decimal::ZERO)?,
            min_payment: r.decimal_or("min_payment", Decimal::ZERO)?,
            payment_day: day as u32,
            note: r.text("note"),
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.lender.clone(),
            self.debt_type.to_string(),
            self.account_id.clone(),
            self.original_amount.to_string(),
            self.current_balance.to_string(),
            self.currency.clone(),
            self.apr.to_string(),
            self.min_payment.to_string(),
            self.payment_day.to_string(),
            self.note.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub id: i64,
    pub card_account_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub statement_balance: Decimal,
    pub apr_at_cycle: Decimal,
    pub min_due: Decimal,
    pub due_date: NaiveDate,
    pub paid_amount: Decimal,
    pub paid_date: Option<NaiveDate>,
    pub carried_balance: Decimal,
    pub note: String,
}

impl Statement {
    pub(crate) fn from_row(r: &Row<'_>) -> Result<Self> {
        Ok(Statement {
            id: r.int_or("id", 0)?,
            card_account_id: r.text("card_account_id"),
            period_start: r.date("period_start")?,
            period_end: r.date("period_end")?,
            statement_balance: r.decimal_or("statement_balance", Decimal::ZERO)?,
            apr_at_cycle: r.decimal_or("apr_at_cycle", Decimal::ZERO)?,
            min_due: r.decimal_or("min_due", Decimal::ZERO)?,
            due_date: r.date("due_date")?,
            paid_amount: r.decimal_or("paid_amount", Decimal::ZERO)?,
            paid_date: r.opt_date("paid_date")?,
            carried_balance: r.decimal_or("carried_balance", Decimal::ZERO)?,
            note: r.text("note"),
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.card_account_id.clone(),
            self.period_start.to_string(),
            self.period_end.to_string(),
            self.statement_balance.to_string(),
            self.apr_at_cycle.to_string(),
            self.min_due.to_string(),
            self.due_date.to_string(),
            self.paid_amount.to_string(),
            date_cell(self.paid_date),
            self.carried_balance.to_string(),
            self.note.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchField {
    Note,
    Category,
    AccountId,
}

impl MatchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchField::Note => "note",
            MatchField::Category => "category",
            MatchField::AccountId => "account_id",
        }
    }

    pub fn value<'t>(&self, tx: &'t Transaction) -> &'t str {
        match self {
            MatchField::Note => &tx.note,
            MatchField::Category => &tx.category,
            MatchField::AccountId => &tx.account_id,
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "note" => Ok(MatchField::Note),
            "category" => Ok(MatchField::Category),
            "account_id" => Ok(MatchField::AccountId),
            other => Err(format!("unknown match field '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub id: i64,
    pub active: bool,
    pub priority: i64,
    pub kind: Option<TxKind>,
    pub category: String,
    pub match_field: MatchField,
    pub contains: String,
    pub case_sensitive: bool,
}

impl Rule {
    pub(crate) fn from_row(r: &Row<'_>) -> Result<Self> {
        let kind = match r.text("kind") {
            k if k.is_empty() => None,
            k => Some(k.parse().map_err(|_| r.invalid("kind"))?),
        };
        Ok(Rule {
            id: r.int_or("id", 0)?,
            active: r.flag("active", true)?,
            priority: r.int_or("priority", 1000)?,
            kind,
            category: r.text("category"),
            match_field: r.parse("match_field")?,
            contains: r.text("contains"),
            case_sensitive: r.flag("case_sensitive", false)?,
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            flag_cell(self.active),
            self.priority.to_string(),
            self.kind.map(|k| k.to_string()).unwrap_or_default(),
            self.category.clone(),
            self.match_field.to_string(),
            self.contains.clone(),
            flag_cell(self.case_sensitive),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub month: String, // YYYY-MM
    pub category: String,
    pub amount: Decimal,
    pub currency: String,
    pub active: bool,
    pub note: String,
}

impl Budget {
    pub(crate) fn from_row(r: &Row<'_>) -> Result<Self> {
        let currency = match r.text("currency") {
            c if c.is_empty() => "GBP".to_string(),
            c => c,
        };
        Ok(Budget {
            id: r.int_or("id", 0)?,
            month: r.text("month"),
            category: r.text("category"),
            amount: r.decimal_or("amount", Decimal::ZERO)?,
            currency,
            active: r.flag("active", true)?,
            note: r.text("note"),
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.month.clone(),
            self.category.clone(),
            self.amount.to_string(),
            self.currency.clone(),
            flag_cell(self.active),
            self.note.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" | "" => Ok(CategoryKind::Expense),
            other => Err(format!("unknown category kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: i64,
    pub kind: CategoryKind,
    pub name: String,
    pub active: bool,
}

impl Category {
    pub(crate) fn from_row(r: &Row<'_>) -> Result<Self> {
        Ok(Category {
            id: r.int_or("id", 0)?,
            kind: r.parse("kind")?,
            name: r.text("name"),
            active: r.flag("active", true)?,
        })
    }

    pub(crate) fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.kind.as_str().to_string(),
            self.name.clone(),
            flag_cell(self.active),
        ]
    }
}
