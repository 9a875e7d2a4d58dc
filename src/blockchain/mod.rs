// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Blockchain Module
//!
//! Avalanche C-Chain access for the faucet: network constants, unit
//! conversion between whole-currency decimals and wei, and the
//! [`ChainGateway`] seam the funding pipeline talks through.

pub mod gateway;
pub mod types;

pub use gateway::{AvaxGateway, ChainGateway, NetworkError};
pub use types::{
    amount_to_wei, gas_to_decimal, wei_to_amount, AmountError, ChainReceipt, NetworkConfig,
    SubmittedTransfer, AVAX_FUJI, AVAX_MAINNET, NATIVE_DECIMALS,
};
