// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repositories over the JSON data store.

pub mod balances;
pub mod transactions;
pub mod wallets;

pub use balances::{BalanceRepository, StoredBalance};
pub use transactions::{FundingTransaction, TransactionRepository, TxKind, TxStatus};
pub use wallets::{WalletRecord, WalletRepository};
