// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Faucet - Funding Service for Custodial Avalanche Wallets
//!
//! This crate provides a rate-limited faucet that funds custodial wallets
//! with native AVAX, gated by the wallet owner's password against the
//! encrypted key vault.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Avalanche C-Chain integration
//! - `funding` - The funding orchestrator
//! - `ledger` - Storage seam consumed by the pipeline
//! - `limits` - Rate and amount limit checks
//! - `storage` - JSON file storage for wallets, transactions, balances
//! - `vault` - Password-based private key encryption

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod funding;
pub mod ledger;
pub mod limits;
pub mod state;
pub mod storage;
pub mod vault;
