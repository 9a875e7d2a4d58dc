// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cached balance repository.
//!
//! Balances are a per-wallet JSON map keyed by currency code, so the
//! at-most-one-row-per-(wallet, currency) invariant holds by construction.
//! The cache is only ever overwritten from a fresh on-chain read after a
//! funding transaction confirms; it is never derived from transaction
//! history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DataStore, StorageResult};

/// Cached balance for one (wallet, currency) pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredBalance {
    /// Owning wallet.
    pub wallet_id: String,
    /// Currency code (e.g. "AVAX").
    pub currency_code: String,
    /// Last known on-chain balance, non-negative.
    pub amount: Decimal,
    /// When the cache was last refreshed from the chain.
    pub updated_at: DateTime<Utc>,
}

/// Repository for cached wallet balances.
pub struct BalanceRepository<'a> {
    store: &'a DataStore,
}

impl<'a> BalanceRepository<'a> {
    /// Create a new BalanceRepository.
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    fn read_map(&self, wallet_id: &str) -> StorageResult<BTreeMap<String, StoredBalance>> {
        let path = self.store.paths().wallet_balances(wallet_id);
        if !self.store.exists(&path) {
            return Ok(BTreeMap::new());
        }
        self.store.read_json(path)
    }

    /// Get the cached balance for a currency, if any.
    pub fn find(&self, wallet_id: &str, currency_code: &str) -> StorageResult<Option<StoredBalance>> {
        Ok(self.read_map(wallet_id)?.remove(currency_code))
    }

    /// List all cached balances for a wallet.
    pub fn list(&self, wallet_id: &str) -> StorageResult<Vec<StoredBalance>> {
        Ok(self.read_map(wallet_id)?.into_values().collect())
    }

    /// Insert or overwrite the balance row for (wallet, currency).
    pub fn upsert(
        &self,
        wallet_id: &str,
        currency_code: &str,
        amount: Decimal,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let mut balances = self.read_map(wallet_id)?;
        balances.insert(
            currency_code.to_string(),
            StoredBalance {
                wallet_id: wallet_id.to_string(),
                currency_code: currency_code.to_string(),
                amount,
                updated_at,
            },
        );
        self.store
            .write_json(self.store.paths().wallet_balances(wallet_id), &balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, DataStore) {
        let dir = TempDir::new().expect("temp dir");
        let mut store = DataStore::new(StoragePaths::new(dir.path()));
        store.initialize().expect("initialize");
        (dir, store)
    }

    #[test]
    fn upsert_creates_then_overwrites() {
        let (_dir, store) = test_store();
        let repo = BalanceRepository::new(&store);
        let now = Utc::now();

        repo.upsert("w1", "AVAX", dec!(1.5), now).unwrap();
        let first = repo.find("w1", "AVAX").unwrap().expect("balance exists");
        assert_eq!(first.amount, dec!(1.5));

        repo.upsert("w1", "AVAX", dec!(2.0), now).unwrap();
        let second = repo.find("w1", "AVAX").unwrap().unwrap();
        assert_eq!(second.amount, dec!(2.0));

        // Still exactly one row for the pair.
        assert_eq!(repo.list("w1").unwrap().len(), 1);
    }

    #[test]
    fn currencies_are_independent() {
        let (_dir, store) = test_store();
        let repo = BalanceRepository::new(&store);
        let now = Utc::now();

        repo.upsert("w1", "AVAX", dec!(1), now).unwrap();
        repo.upsert("w1", "USDC", dec!(100), now).unwrap();

        assert_eq!(repo.list("w1").unwrap().len(), 2);
        assert_eq!(repo.find("w1", "USDC").unwrap().unwrap().amount, dec!(100));
    }

    #[test]
    fn missing_balance_returns_none() {
        let (_dir, store) = test_store();
        let repo = BalanceRepository::new(&store);

        assert!(repo.find("w1", "AVAX").unwrap().is_none());
        assert!(repo.list("w1").unwrap().is_empty());
    }
}
