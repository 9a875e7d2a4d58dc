// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the ledger storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for persistent storage.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the ledger data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Wallet Paths ==========

    /// Directory containing all wallets.
    pub fn wallets_dir(&self) -> PathBuf {
        self.root.join("wallets")
    }

    /// Directory for a specific wallet.
    pub fn wallet_dir(&self, wallet_id: &str) -> PathBuf {
        self.wallets_dir().join(wallet_id)
    }

    /// Path to wallet metadata file (identity, address, encrypted key).
    pub fn wallet_meta(&self, wallet_id: &str) -> PathBuf {
        self.wallet_dir(wallet_id).join("meta.json")
    }

    /// Path to the wallet's cached balances file.
    pub fn wallet_balances(&self, wallet_id: &str) -> PathBuf {
        self.wallet_dir(wallet_id).join("balances.json")
    }

    /// Directory for wallet transaction history.
    pub fn wallet_txs_dir(&self, wallet_id: &str) -> PathBuf {
        self.wallet_dir(wallet_id).join("txs")
    }

    /// Path to a specific transaction record.
    pub fn wallet_tx(&self, wallet_id: &str, tx_id: &str) -> PathBuf {
        self.wallet_txs_dir(wallet_id).join(format!("{tx_id}.json"))
    }
}
