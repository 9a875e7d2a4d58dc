// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet repository.
//!
//! ## Storage Layout
//!
//! Each wallet lives in its own directory:
//! ```text
//! {data}/wallets/{wallet_id}/
//!   meta.json       # Identity, address, encrypted key material
//!   balances.json   # Cached per-currency balances
//!   txs/            # Transaction history
//! ```
//!
//! ## Security
//!
//! The private key is stored only in encrypted form (vault ciphertext +
//! salt + iv) and is never returned by any API response type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DataStore, StorageError, StorageResult};

/// A custodial wallet record stored in meta.json.
///
/// `encrypted_private_key`, `key_salt` and `key_iv` are all present or
/// all empty together; a wallet with empty key material is a placeholder
/// that cannot authorize funding ([`WalletRecord::has_credentials`]).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletRecord {
    /// Unique wallet identifier (UUID).
    pub wallet_id: String,
    /// Identifier of the owning user.
    pub owner_user_id: String,
    /// Public EVM address (0x-prefixed).
    pub public_address: String,
    /// Vault ciphertext of the private key, base64.
    pub encrypted_private_key: String,
    /// Key-derivation salt, base64.
    pub key_salt: String,
    /// Cipher nonce, base64.
    pub key_iv: String,
    /// Whether the wallet may transact.
    pub is_active: bool,
    /// Network tag ("fuji" or "mainnet").
    pub network: String,
    /// When the wallet was created.
    pub created_at: DateTime<Utc>,
    /// When the wallet was last modified (re-keyed or toggled).
    pub updated_at: DateTime<Utc>,
}

impl WalletRecord {
    /// True when the wallet carries usable encrypted key material.
    pub fn has_credentials(&self) -> bool {
        !self.encrypted_private_key.is_empty() && !self.key_salt.is_empty() && !self.key_iv.is_empty()
    }

    /// Check the all-or-none invariant on the credential fields.
    pub fn credentials_consistent(&self) -> bool {
        let empties = [
            self.encrypted_private_key.is_empty(),
            self.key_salt.is_empty(),
            self.key_iv.is_empty(),
        ];
        empties.iter().all(|e| *e) || empties.iter().all(|e| !*e)
    }
}

/// Repository for wallet records.
pub struct WalletRepository<'a> {
    store: &'a DataStore,
}

impl<'a> WalletRepository<'a> {
    /// Create a new WalletRepository.
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Check if a wallet exists.
    pub fn exists(&self, wallet_id: &str) -> bool {
        self.store.exists(self.store.paths().wallet_meta(wallet_id))
    }

    /// Get a wallet by ID, or `None` if absent.
    pub fn find(&self, wallet_id: &str) -> StorageResult<Option<WalletRecord>> {
        let path = self.store.paths().wallet_meta(wallet_id);
        if !self.store.exists(&path) {
            return Ok(None);
        }
        self.store.read_json(path).map(Some)
    }

    /// Create a new wallet.
    ///
    /// Rejects records that violate the credential all-or-none invariant.
    pub fn create(&self, record: &WalletRecord) -> StorageResult<()> {
        if !record.credentials_consistent() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "wallet credential fields must be all present or all empty",
            )));
        }

        let wallet_id = &record.wallet_id;
        if self.exists(wallet_id) {
            return Err(StorageError::AlreadyExists(format!("Wallet {wallet_id}")));
        }

        self.store
            .create_dir(self.store.paths().wallet_txs_dir(wallet_id))?;
        self.store
            .write_json(self.store.paths().wallet_meta(wallet_id), record)
    }

    /// Update a wallet record (re-key or flag change).
    pub fn update(&self, record: &WalletRecord) -> StorageResult<()> {
        if !record.credentials_consistent() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "wallet credential fields must be all present or all empty",
            )));
        }

        let wallet_id = &record.wallet_id;
        if !self.exists(wallet_id) {
            return Err(StorageError::NotFound(format!("Wallet {wallet_id}")));
        }

        self.store
            .write_json(self.store.paths().wallet_meta(wallet_id), record)
    }

    /// List all wallet IDs.
    pub fn list_all_ids(&self) -> StorageResult<Vec<String>> {
        self.store.list_dirs(self.store.paths().wallets_dir())
    }
}
