// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Funding orchestrator: the faucet's request pipeline.
//!
//! A funding request walks a fixed gate sequence: wallet lookup,
//! credential check, password verification against the vault, amount
//! bounds, daily and hourly limits, then on-chain submission and a
//! Pending ledger record. The limit checks and the insert run under one
//! process-wide mutex so two concurrent requests cannot both pass a
//! limit that only has room for one.
//!
//! Confirmation is pull-based: [`FundingService::check_funding_status`]
//! reconciles a stored transaction against its chain receipt. Terminal
//! statuses are never overwritten, so reconciliation is idempotent.

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::blockchain::{ChainGateway, NetworkError};
use crate::config::{FaucetConfig, FundingLimits, NATIVE_CURRENCY};
use crate::ledger::Ledger;
use crate::limits::FundingLimiter;
use crate::storage::{FundingTransaction, StorageError, TxStatus, WalletRecord};
use crate::vault::{CryptoError, KeyVault};

/// Which limit a request ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    Daily,
    Hourly,
}

impl std::fmt::Display for LimitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitScope::Daily => write!(f, "daily"),
            LimitScope::Hourly => write!(f, "hourly"),
        }
    }
}

/// Errors from the funding pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FundingError {
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Not authorized to fund this wallet")]
    Unauthorized,

    #[error("Wallet {0} has no encrypted key material")]
    CredentialsMissing(String),

    #[error("Amount must be between {min} and {max}")]
    AmountOutOfRange { min: Decimal, max: Decimal },

    #[error("{scope} funding limit exceeded")]
    LimitExceeded { scope: LimitScope },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Funding failed: {0}")]
    FundingFailed(String),

    #[error("Cryptography error: {0}")]
    Crypto(CryptoError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CryptoError> for FundingError {
    fn from(e: CryptoError) -> Self {
        match e {
            // A failed GCM open means the password does not match the
            // stored key material.
            CryptoError::Decrypt => FundingError::Unauthorized,
            other => FundingError::Crypto(other),
        }
    }
}

/// The faucet funding service over a ledger and a chain gateway.
pub struct FundingService<L: Ledger, G: ChainGateway> {
    ledger: L,
    gateway: G,
    vault: KeyVault,
    limiter: FundingLimiter,
    funder_key_hex: String,
    // Spans the limit checks through the Pending insert so concurrent
    // requests serialize on the check-then-act window.
    funding_lock: Mutex<()>,
}

impl<L: Ledger, G: ChainGateway> FundingService<L, G> {
    /// Assemble the service from its collaborators and configuration.
    pub fn new(ledger: L, gateway: G, config: &FaucetConfig) -> Self {
        Self {
            ledger,
            gateway,
            vault: KeyVault::new(),
            limiter: FundingLimiter::new(config.limits),
            funder_key_hex: config.funder_key_hex.clone(),
            funding_lock: Mutex::new(()),
        }
    }

    /// The configured funding limits.
    pub fn limits(&self) -> FundingLimits {
        self.limiter.limits()
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Request faucet funding into a wallet.
    ///
    /// Returns the Pending transaction record, or the reconciled record
    /// when the transfer confirmed before this call returned.
    pub async fn request_funding(
        &self,
        wallet_id: &str,
        amount: Decimal,
        password: &str,
    ) -> Result<FundingTransaction, FundingError> {
        let wallet = self.load_wallet(wallet_id)?;

        if !wallet.is_active {
            return Err(FundingError::Unauthorized);
        }
        if !wallet.has_credentials() {
            return Err(FundingError::CredentialsMissing(wallet_id.to_string()));
        }

        // Password gate: opening the vault ciphertext proves the caller
        // knows the wallet password. The decrypted key is dropped
        // immediately; the transfer is signed with the faucet's own key.
        self.vault.decrypt(
            &wallet.encrypted_private_key,
            password,
            &wallet.key_salt,
            &wallet.key_iv,
        )?;

        self.limiter
            .check_amount_bounds(amount)
            .map_err(|e| FundingError::AmountOutOfRange {
                min: e.min,
                max: e.max,
            })?;

        let tx = {
            let _guard = self.funding_lock.lock().await;
            let now = chrono::Utc::now();

            let remaining_daily = self.limiter.remaining_daily_limit(
                &self.ledger,
                wallet_id,
                NATIVE_CURRENCY,
                now,
            )?;
            if amount > remaining_daily {
                return Err(FundingError::LimitExceeded {
                    scope: LimitScope::Daily,
                });
            }

            let remaining_hourly = self.limiter.remaining_hourly_requests(
                &self.ledger,
                wallet_id,
                NATIVE_CURRENCY,
                now,
            )?;
            if remaining_hourly == 0 {
                return Err(FundingError::LimitExceeded {
                    scope: LimitScope::Hourly,
                });
            }

            let submitted = self
                .gateway
                .submit_transfer(&self.funder_key_hex, &wallet.public_address, amount)
                .await?;

            info!(
                wallet_id,
                tx_hash = %submitted.tx_hash,
                %amount,
                "Funding transfer submitted"
            );

            let tx = FundingTransaction::new_pending(
                wallet_id.to_string(),
                submitted.tx_hash,
                submitted.from_address,
                wallet.public_address.clone(),
                amount,
                NATIVE_CURRENCY.to_string(),
                submitted.gas_price,
                Some(submitted.explorer_url),
            );

            // The transfer is already on chain; a persistence failure
            // here must surface as its own error, not as a limit or
            // network problem.
            self.ledger
                .insert_transaction(&tx)
                .map_err(|e| FundingError::FundingFailed(e.to_string()))?;
            tx
        };

        // Opportunistic first reconciliation. Failures here are not
        // failures of the request: the record is Pending and a later
        // status check will pick it up.
        match self.reconcile(tx.clone()).await {
            Ok(reconciled) => Ok(reconciled),
            Err(e) => {
                warn!(
                    tx_hash = ?tx.tx_hash,
                    "Initial receipt check failed, returning pending: {e}"
                );
                Ok(tx)
            }
        }
    }

    /// Look up a funding transaction by chain hash and reconcile it
    /// against the network.
    pub async fn check_funding_status(
        &self,
        tx_hash: &str,
    ) -> Result<FundingTransaction, FundingError> {
        let tx = self
            .ledger
            .find_transaction_by_hash(tx_hash)?
            .ok_or_else(|| FundingError::TransactionNotFound(tx_hash.to_string()))?;

        self.reconcile(tx).await
    }

    /// Remaining fundable amount for a wallet today.
    pub fn remaining_daily_limit(&self, wallet_id: &str) -> Result<Decimal, FundingError> {
        self.load_wallet(wallet_id)?;
        Ok(self.limiter.remaining_daily_limit(
            &self.ledger,
            wallet_id,
            NATIVE_CURRENCY,
            chrono::Utc::now(),
        )?)
    }

    /// Remaining funding request slots for a wallet in the trailing hour.
    pub fn remaining_hourly_requests(&self, wallet_id: &str) -> Result<u32, FundingError> {
        self.load_wallet(wallet_id)?;
        Ok(self.limiter.remaining_hourly_requests(
            &self.ledger,
            wallet_id,
            NATIVE_CURRENCY,
            chrono::Utc::now(),
        )?)
    }

    fn load_wallet(&self, wallet_id: &str) -> Result<WalletRecord, FundingError> {
        self.ledger
            .find_wallet(wallet_id)?
            .ok_or_else(|| FundingError::WalletNotFound(wallet_id.to_string()))
    }

    /// Bring a stored transaction up to date with its chain receipt.
    ///
    /// Terminal records are returned unchanged; a missing receipt leaves
    /// the record Pending. A fresh transition to Completed refreshes the
    /// recipient's cached balance.
    async fn reconcile(
        &self,
        mut tx: FundingTransaction,
    ) -> Result<FundingTransaction, FundingError> {
        if tx.status.is_terminal() {
            return Ok(tx);
        }

        let Some(hash) = tx.tx_hash.clone() else {
            return Ok(tx);
        };

        let Some(receipt) = self.gateway.get_receipt(&hash).await? else {
            return Ok(tx);
        };

        if receipt.success {
            tx.mark_completed(receipt.block_number, Decimal::from(receipt.gas_used));
        } else {
            tx.mark_failed(receipt.block_number, "Transaction reverted on chain");
        }
        self.ledger.update_transaction(&tx)?;

        info!(
            tx_hash = %hash,
            status = ?tx.status,
            block = receipt.block_number,
            "Funding transaction reconciled"
        );

        if tx.status == TxStatus::Completed {
            self.refresh_balance(&tx).await;
        }

        Ok(tx)
    }

    /// Refresh the recipient wallet's cached balance after a confirmed
    /// funding. Failures only cost cache freshness, never the reconciled
    /// status, so they are logged and swallowed.
    async fn refresh_balance(&self, tx: &FundingTransaction) {
        let result = async {
            let wallet = self.load_wallet(&tx.wallet_id)?;
            let balance = self.gateway.get_balance(&wallet.public_address).await?;
            self.ledger.upsert_balance(
                &tx.wallet_id,
                NATIVE_CURRENCY,
                balance,
                chrono::Utc::now(),
            )?;
            Ok::<_, FundingError>(())
        }
        .await;

        if let Err(e) = result {
            warn!(wallet_id = %tx.wallet_id, "Balance refresh failed: {e}");
        }
    }
}
