// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction repository and the stored transaction record.
//!
//! ## Storage Layout
//!
//! Transactions are stored per-wallet in the txs/ directory:
//! ```text
//! {data}/wallets/{wallet_id}/txs/
//!   {id}.json     # Individual transaction record, keyed by internal id
//! ```
//!
//! Records are keyed by internal id rather than chain hash because a
//! record exists before submission returns a hash.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DataStore, StorageError, StorageResult};

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Submitted but not yet confirmed on chain
    #[default]
    Pending,
    /// Confirmed successfully
    Completed,
    /// Reverted or rejected on chain
    Failed,
}

impl TxStatus {
    /// Whether this status is terminal (never overwritten once reached).
    pub fn is_terminal(self) -> bool {
        matches!(self, TxStatus::Completed | TxStatus::Failed)
    }
}

/// What produced the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Faucet funding into a custodial wallet
    Funding,
    /// User-initiated outbound transfer
    Transfer,
}

/// Stored transaction record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FundingTransaction {
    /// Internal identifier (UUID)
    pub id: String,
    /// Wallet this transaction belongs to
    pub wallet_id: String,
    /// Chain transaction hash; None until submission returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Sender address
    pub from_address: String,
    /// Recipient address
    pub to_address: String,
    /// Amount in whole-currency units, non-negative
    pub amount: Decimal,
    /// Currency code (e.g. "AVAX")
    pub currency: String,
    /// Funding or user transfer
    pub kind: TxKind,
    /// Current status
    pub status: TxStatus,
    /// When the request was accepted for submission
    pub created_at: DateTime<Utc>,
    /// Set exactly when the status turns terminal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Block number from the receipt (decimal string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    /// Gas price at submission, in wei
    pub gas_price: Decimal,
    /// Gas consumed per the receipt; zero until confirmed
    pub gas_used: Decimal,
    /// Failure detail when status is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Block explorer URL for the submitted transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl FundingTransaction {
    /// Create a new pending funding transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        wallet_id: String,
        tx_hash: String,
        from_address: String,
        to_address: String,
        amount: Decimal,
        currency: String,
        gas_price: Decimal,
        explorer_url: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            wallet_id,
            tx_hash: Some(tx_hash),
            from_address,
            to_address,
            amount,
            currency,
            kind: TxKind::Funding,
            status: TxStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            block_number: None,
            gas_price,
            gas_used: Decimal::ZERO,
            error_message: None,
            explorer_url,
        }
    }

    /// Mark the transaction completed. Caller must ensure the current
    /// status is not already terminal.
    pub fn mark_completed(&mut self, block_number: u64, gas_used: Decimal) {
        self.status = TxStatus::Completed;
        self.block_number = Some(block_number.to_string());
        self.gas_used = gas_used;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the transaction failed.
    pub fn mark_failed(&mut self, block_number: u64, error: impl Into<String>) {
        self.status = TxStatus::Failed;
        self.block_number = Some(block_number.to_string());
        self.error_message = Some(error.into());
        self.completed_at = Some(Utc::now());
    }
}

/// Repository for transaction records.
pub struct TransactionRepository<'a> {
    store: &'a DataStore,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new TransactionRepository.
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Store a new transaction record.
    pub fn create(&self, tx: &FundingTransaction) -> StorageResult<()> {
        let path = self.store.paths().wallet_tx(&tx.wallet_id, &tx.id);
        if self.store.exists(&path) {
            return Err(StorageError::AlreadyExists(format!("Transaction {}", tx.id)));
        }
        self.store.write_json(path, tx)
    }

    /// Update an existing transaction record.
    pub fn update(&self, tx: &FundingTransaction) -> StorageResult<()> {
        let path = self.store.paths().wallet_tx(&tx.wallet_id, &tx.id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!("Transaction {}", tx.id)));
        }
        self.store.write_json(path, tx)
    }

    /// List all transactions for a wallet, newest first.
    pub fn list_by_wallet(&self, wallet_id: &str) -> StorageResult<Vec<FundingTransaction>> {
        let txs_dir = self.store.paths().wallet_txs_dir(wallet_id);
        if !self.store.exists(&txs_dir) {
            return Ok(Vec::new());
        }

        let mut transactions = Vec::new();
        for stem in self.store.list_files(&txs_dir, "json")? {
            let path = txs_dir.join(format!("{stem}.json"));
            match self.store.read_json::<FundingTransaction>(&path) {
                Ok(tx) => transactions.push(tx),
                Err(e) => {
                    tracing::warn!("Failed to read transaction {}: {}", stem, e);
                }
            }
        }

        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }

    /// Find a transaction by its chain hash, scanning all wallets.
    ///
    /// Funding volume is low enough that a scan is acceptable; the hash
    /// is not known at insert time so it cannot key the file name.
    pub fn find_by_hash(&self, tx_hash: &str) -> StorageResult<Option<FundingTransaction>> {
        let wallets = self.store.list_dirs(self.store.paths().wallets_dir())?;
        for wallet_id in wallets {
            for tx in self.list_by_wallet(&wallet_id)? {
                if tx.tx_hash.as_deref() == Some(tx_hash) {
                    return Ok(Some(tx));
                }
            }
        }
        Ok(None)
    }

    /// Sum of Completed funding amounts for a wallet whose `created_at`
    /// falls on the given UTC calendar day.
    pub fn sum_completed_funding_amount(
        &self,
        wallet_id: &str,
        currency: &str,
        day_utc: NaiveDate,
    ) -> StorageResult<Decimal> {
        let total = self
            .list_by_wallet(wallet_id)?
            .into_iter()
            .filter(|tx| {
                tx.kind == TxKind::Funding
                    && tx.status == TxStatus::Completed
                    && tx.currency == currency
                    && tx.created_at.date_naive() == day_utc
            })
            .map(|tx| tx.amount)
            .sum();
        Ok(total)
    }

    /// Count funding requests of ANY status for a wallet created at or
    /// after `since`. Deliberately broader than the daily sum: the hourly
    /// throttle gates request volume, not funds.
    pub fn count_funding_requests(
        &self,
        wallet_id: &str,
        currency: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<u32> {
        let count = self
            .list_by_wallet(wallet_id)?
            .into_iter()
            .filter(|tx| {
                tx.kind == TxKind::Funding && tx.currency == currency && tx.created_at >= since
            })
            .count();
        Ok(count as u32)
    }
}
