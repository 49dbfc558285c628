// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod budgets;
pub mod cards;
pub mod categories;
pub mod debts;
pub mod doctor;
pub mod due;
pub mod exporter;
pub mod importer;
pub mod init;
pub mod interest;
pub mod prefs;
pub mod recurring;
pub mod reports;
pub mod rules;
pub mod transactions;
