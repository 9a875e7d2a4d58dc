// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The ledger seam between the funding pipeline and durable storage.
//!
//! The limiter and orchestrator consume this trait; production code uses
//! the file-backed [`FundingLedger`], tests substitute in-memory mocks.
//! The orchestrator holds no state across calls — every query goes back
//! to the ledger.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::storage::{
    BalanceRepository, DataStore, FundingTransaction, StorageResult, TransactionRepository,
    WalletRecord, WalletRepository,
};

/// Durable store for wallets, transactions and cached balances.
pub trait Ledger {
    /// Look up a wallet by id.
    fn find_wallet(&self, wallet_id: &str) -> StorageResult<Option<WalletRecord>>;

    /// Look up a transaction by its chain hash.
    fn find_transaction_by_hash(&self, tx_hash: &str) -> StorageResult<Option<FundingTransaction>>;

    /// Persist a new transaction record.
    fn insert_transaction(&self, tx: &FundingTransaction) -> StorageResult<()>;

    /// Persist changes to an existing transaction record.
    fn update_transaction(&self, tx: &FundingTransaction) -> StorageResult<()>;

    /// Sum of Completed funding amounts for a wallet on a UTC calendar day.
    fn sum_completed_funding_amount(
        &self,
        wallet_id: &str,
        currency: &str,
        day_utc: NaiveDate,
    ) -> StorageResult<Decimal>;

    /// Count of funding requests (any status) for a wallet since a point
    /// in time.
    fn count_funding_requests(
        &self,
        wallet_id: &str,
        currency: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<u32>;

    /// Insert or overwrite the cached balance for (wallet, currency).
    fn upsert_balance(
        &self,
        wallet_id: &str,
        currency_code: &str,
        amount: Decimal,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<()>;
}

/// File-backed ledger over the JSON data store.
#[derive(Debug, Clone)]
pub struct FundingLedger {
    store: DataStore,
}

impl FundingLedger {
    /// Create a ledger over an initialized data store.
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Access the underlying store (wallet provisioning, health checks).
    pub fn store(&self) -> &DataStore {
        &self.store
    }
}

impl Ledger for FundingLedger {
    fn find_wallet(&self, wallet_id: &str) -> StorageResult<Option<WalletRecord>> {
        WalletRepository::new(&self.store).find(wallet_id)
    }

    fn find_transaction_by_hash(&self, tx_hash: &str) -> StorageResult<Option<FundingTransaction>> {
        TransactionRepository::new(&self.store).find_by_hash(tx_hash)
    }

    fn insert_transaction(&self, tx: &FundingTransaction) -> StorageResult<()> {
        TransactionRepository::new(&self.store).create(tx)
    }

    fn update_transaction(&self, tx: &FundingTransaction) -> StorageResult<()> {
        TransactionRepository::new(&self.store).update(tx)
    }

    fn sum_completed_funding_amount(
        &self,
        wallet_id: &str,
        currency: &str,
        day_utc: NaiveDate,
    ) -> StorageResult<Decimal> {
        TransactionRepository::new(&self.store).sum_completed_funding_amount(
            wallet_id, currency, day_utc,
        )
    }

    fn count_funding_requests(
        &self,
        wallet_id: &str,
        currency: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<u32> {
        TransactionRepository::new(&self.store).count_funding_requests(wallet_id, currency, since)
    }

    fn upsert_balance(
        &self,
        wallet_id: &str,
        currency_code: &str,
        amount: Decimal,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        BalanceRepository::new(&self.store).upsert(wallet_id, currency_code, amount, updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoragePaths, TxStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn test_ledger() -> (TempDir, FundingLedger) {
        let dir = TempDir::new().expect("temp dir");
        let mut store = DataStore::new(StoragePaths::new(dir.path()));
        store.initialize().expect("initialize");
        (dir, FundingLedger::new(store))
    }

    fn test_wallet(wallet_id: &str) -> WalletRecord {
        let now = Utc::now();
        WalletRecord {
            wallet_id: wallet_id.to_string(),
            owner_user_id: "user-1".to_string(),
            public_address: "0xabc".to_string(),
            encrypted_private_key: "Y3Q=".to_string(),
            key_salt: "c2FsdA==".to_string(),
            key_iv: "aXY=".to_string(),
            is_active: true,
            network: "fuji".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn round_trips_wallet_and_transaction() {
        let (_dir, ledger) = test_ledger();

        let wallet = test_wallet("w1");
        WalletRepository::new(ledger.store())
            .create(&wallet)
            .unwrap();

        let tx = FundingTransaction::new_pending(
            "w1".to_string(),
            "0xhash".to_string(),
            "0xfaucet".to_string(),
            "0xabc".to_string(),
            dec!(0.05),
            "AVAX".to_string(),
            dec!(25000000000),
            None,
        );
        ledger.insert_transaction(&tx).unwrap();

        let found = ledger.find_wallet("w1").unwrap().expect("wallet");
        assert_eq!(found.public_address, "0xabc");

        let found_tx = ledger
            .find_transaction_by_hash("0xhash")
            .unwrap()
            .expect("tx");
        assert_eq!(found_tx.status, TxStatus::Pending);
    }

    #[test]
    fn upsert_balance_is_visible() {
        let (_dir, ledger) = test_ledger();
        let now = Utc::now();

        ledger.upsert_balance("w1", "AVAX", dec!(3.25), now).unwrap();

        let balance = BalanceRepository::new(ledger.store())
            .find("w1", "AVAX")
            .unwrap()
            .expect("balance");
        assert_eq!(balance.amount, dec!(3.25));
    }
}
