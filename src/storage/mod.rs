// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Storage Module
//!
//! Persistent storage for wallets, transactions and cached balances as
//! JSON documents under the data directory.
//!
//! ## Storage Layout
//!
//! ```text
//! {data}/
//!   wallets/{wallet_id}/
//!     meta.json       # Wallet record (owner, address, encrypted key)
//!     balances.json   # Per-currency cached balances
//!     txs/
//!       {tx_id}.json  # Individual transaction records
//! ```
//!
//! The store performs no in-memory caching: limiter and orchestrator
//! checks re-read from disk on every call.

pub mod paths;
pub mod repository;
pub mod store;

pub use paths::StoragePaths;
pub use repository::{
    BalanceRepository, FundingTransaction, StoredBalance, TransactionRepository, TxKind, TxStatus,
    WalletRecord, WalletRepository,
};
pub use store::{DataStore, StorageError, StorageResult};
