// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Account ledger: balances and the transaction log move together.
//!
//! Every posting validates its inputs before touching the [`Book`], so an
//! error leaves balances and the log exactly as they were.

use crate::error::{BookError, Result};
use crate::models::{Account, AccountType, TRANSFER_IN, TRANSFER_OUT, Transaction, TxKind};
use crate::store::Book;
use crate::utils::{next_id, round_money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

/// Back-reference from a posting to the row that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub table: String,
    pub id: String,
}

impl Reference {
    pub fn new(table: &str, id: impl ToString) -> Self {
        Reference {
            table: table.to_string(),
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub account_id: String,
    pub amount: Decimal,
    /// Empty means the account's own currency.
    pub currency: String,
    pub date: NaiveDate,
    pub category: String,
    pub note: String,
    pub reference: Option<Reference>,
}

impl Posting {
    pub fn new(account_id: &str, amount: Decimal, date: NaiveDate) -> Self {
        Posting {
            account_id: account_id.trim().to_string(),
            amount,
            currency: String::new(),
            date,
            category: String::new(),
            note: String::new(),
            reference: None,
        }
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.trim().to_uppercase();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.trim().to_string();
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.note = note.trim().to_string();
        self
    }

    pub fn reference(mut self, reference: Reference) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// Adds an account under the next sequential id. `account_id` must be new.
pub fn open_account(book: &mut Book, mut acct: Account) -> Result<i64> {
    acct.account_id = acct.account_id.trim().to_string();
    if acct.account_id.is_empty() {
        return Err(BookError::InvalidInput("Account id must not be empty".into()));
    }
    if book.account(&acct.account_id).is_ok() {
        return Err(BookError::InvalidInput(format!(
            "Account '{}' already exists",
            acct.account_id
        )));
    }
    acct.id = next_id(&book.accounts, |a| a.id);
    acct.currency = acct.currency.trim().to_uppercase();
    acct.balance = round_money(acct.balance);
    let id = acct.id;
    info!(account = %acct.account_id, kind = %acct.account_type, "account opened");
    book.accounts.push(acct);
    Ok(id)
}

fn check_amount(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(BookError::InvalidAmount(amount));
    }
    Ok(amount)
}

fn currency_for(book: &Book, account_id: &str, requested: &str) -> Result<String> {
    if requested.is_empty() {
        Ok(book.account(account_id)?.currency.clone())
    } else {
        Ok(requested.to_string())
    }
}

/// Moves `delta` (positive = funds arriving) through the account's class.
fn apply_delta(book: &mut Book, account_id: &str, delta: Decimal) -> Result<Decimal> {
    let acct = book.account_mut(account_id)?;
    acct.balance = round_money(acct.class().apply(acct.balance, delta));
    Ok(acct.balance)
}

fn append(book: &mut Book, mut tx: Transaction) -> i64 {
    tx.id = next_id(&book.transactions, |t| t.id);
    let id = tx.id;
    book.transactions.push(tx);
    id
}

fn post(book: &mut Book, kind: TxKind, p: Posting) -> Result<i64> {
    let amount = check_amount(round_money(p.amount))?;
    let currency = currency_for(book, &p.account_id, &p.currency)?;
    let delta = match kind {
        TxKind::Income => amount,
        _ => -amount,
    };
    let balance = apply_delta(book, &p.account_id, delta)?;
    let (ref_table, ref_id) = p
        .reference
        .map(|r| (r.table, r.id))
        .unwrap_or_default();
    let id = append(
        book,
        Transaction {
            id: 0,
            date: p.date,
            kind,
            amount,
            currency,
            account_id: p.account_id.clone(),
            counterparty_account_id: String::new(),
            category: p.category,
            ref_table,
            ref_id,
            note: p.note,
        },
    );
    info!(tx = id, %kind, account = %p.account_id, %amount, %balance, "posted");
    Ok(id)
}

/// Funds arriving on an account: an asset grows, a liability's owed shrinks.
pub fn post_income(book: &mut Book, p: Posting) -> Result<i64> {
    post(book, TxKind::Income, p)
}

/// Funds leaving an account: an asset shrinks, a liability's owed grows.
pub fn post_expense(book: &mut Book, p: Posting) -> Result<i64> {
    post(book, TxKind::Expense, p)
}

/// Two mirrored legs. Returns `(out_id, in_id)`.
pub fn transfer(
    book: &mut Book,
    from: &str,
    to: &str,
    amount: Decimal,
    currency: &str,
    date: NaiveDate,
    note: &str,
) -> Result<(i64, i64)> {
    let (from, to) = (from.trim(), to.trim());
    let amount = check_amount(round_money(amount))?;
    if from == to {
        return Err(BookError::SameAccount(from.to_string()));
    }
    book.account(to)?;
    let currency = currency_for(book, from, &currency.trim().to_uppercase())?;

    apply_delta(book, from, -amount)?;
    apply_delta(book, to, amount)?;

    let leg = |account: &str, counterparty: &str, category: &str| Transaction {
        id: 0,
        date,
        kind: TxKind::Transfer,
        amount,
        currency: currency.clone(),
        account_id: account.to_string(),
        counterparty_account_id: counterparty.to_string(),
        category: category.to_string(),
        ref_table: String::new(),
        ref_id: String::new(),
        note: note.trim().to_string(),
    };
    let out_leg = leg(from, to, TRANSFER_OUT);
    let in_leg = leg(to, from, TRANSFER_IN);
    let out_id = append(book, out_leg);
    let in_id = append(book, in_leg);
    info!(from, to, %amount, "transfer");
    Ok((out_id, in_id))
}

/// `round(principal * apr / 100 / 12, 2)`; zero unless both are positive.
pub fn monthly_interest(principal: Decimal, apr: Decimal) -> Decimal {
    if principal <= Decimal::ZERO || apr <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_money(principal * apr / Decimal::from(1200))
}

/// Charges one month of interest on every credit card that carries a balance.
/// Returns how many cards were charged.
pub fn accrue_credit_card_interest(book: &mut Book, date: NaiveDate) -> Result<usize> {
    let due: Vec<(String, Decimal, Decimal, String)> = book
        .accounts
        .iter()
        .filter(|a| a.account_type == AccountType::CreditCard)
        .filter(|a| a.balance > Decimal::ZERO && a.apr > Decimal::ZERO)
        .map(|a| {
            (
                a.account_id.clone(),
                monthly_interest(a.balance, a.apr),
                a.apr,
                a.currency.clone(),
            )
        })
        .filter(|(_, interest, _, _)| *interest > Decimal::ZERO)
        .collect();

    for (account_id, interest, apr, currency) in &due {
        apply_delta(book, account_id, -*interest)?;
        append(
            book,
            Transaction {
                id: 0,
                date,
                kind: TxKind::Interest,
                amount: *interest,
                currency: currency.clone(),
                account_id: account_id.clone(),
                counterparty_account_id: String::new(),
                category: "interest".into(),
                ref_table: String::new(),
                ref_id: String::new(),
                note: format!("Monthly interest @{}% APR", apr.normalize()),
            },
        );
    }
    info!(cards = due.len(), %date, "credit card interest accrued");
    Ok(due.len())
}

/// Sum of balances with liabilities negated.
pub fn net_worth(book: &Book) -> Decimal {
    book.accounts
        .iter()
        .map(|a| a.class().net_worth(a.balance))
        .sum()
}

/// Gives every transaction stored with a missing id the next free one.
pub fn backfill_transaction_ids(book: &mut Book) -> usize {
    let mut next = next_id(&book.transactions, |t| t.id);
    let mut fixed = 0;
    for tx in book.transactions.iter_mut().filter(|t| t.id <= 0) {
        tx.id = next;
        next += 1;
        fixed += 1;
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn account(id: &str, t: AccountType, balance: &str) -> Account {
        Account {
            id: 0,
            account_name: id.to_uppercase(),
            account_type: t,
            account_id: id.into(),
            balance: dec(balance),
            currency: "GBP".into(),
            limit: Decimal::ZERO,
            apr: Decimal::ZERO,
            note: String::new(),
        }
    }

    fn book() -> Book {
        Book {
            accounts: vec![
                account("bank", AccountType::Current, "100.00"),
                account("card", AccountType::CreditCard, "50.00"),
            ],
            ..Book::default()
        }
    }

    #[test]
    fn rejected_posting_leaves_book_untouched() {
        let mut b = book();
        let before = b.clone();
        let err = post_expense(&mut b, Posting::new("bank", dec("0"), day())).unwrap_err();
        assert!(matches!(err, BookError::InvalidAmount(_)));
        let err = post_income(&mut b, Posting::new("nope", dec("5"), day())).unwrap_err();
        assert!(matches!(err, BookError::UnknownAccount(_)));
        let err = transfer(&mut b, "bank", "nope", dec("5"), "", day(), "").unwrap_err();
        assert!(matches!(err, BookError::UnknownAccount(_)));
        let err = transfer(&mut b, "bank", "bank", dec("5"), "", day(), "").unwrap_err();
        assert!(matches!(err, BookError::SameAccount(_)));
        assert_eq!(b, before);
    }

    #[test]
    fn income_on_card_reduces_owed() {
        let mut b = book();
        post_income(&mut b, Posting::new("card", dec("20"), day())).unwrap();
        assert_eq!(b.account("card").unwrap().balance, dec("30.00"));
        assert_eq!(b.transactions[0].currency, "GBP");
    }

    #[test]
    fn monthly_interest_rounds_to_pennies() {
        assert_eq!(monthly_interest(dec("1000"), dec("24")), dec("20.00"));
        assert_eq!(monthly_interest(dec("123.45"), dec("19.9")), dec("2.05"));
    }

    #[test]
    fn backfill_assigns_fresh_ids() {
        let mut b = book();
        post_income(&mut b, Posting::new("bank", dec("1"), day())).unwrap();
        post_income(&mut b, Posting::new("bank", dec("1"), day())).unwrap();
        b.transactions[0].id = 0;
        assert_eq!(backfill_transaction_ids(&mut b), 1);
        assert_eq!(b.transactions[0].id, 3);
    }
}
