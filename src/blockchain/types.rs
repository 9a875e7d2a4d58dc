// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types, network constants and unit conversion.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Avalanche network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Avalanche C-Chain Mainnet configuration.
pub const AVAX_MAINNET: NetworkConfig = NetworkConfig {
    name: "Avalanche C-Chain",
    chain_id: 43114,
    rpc_url: "https://api.avax.network/ext/bc/C/rpc",
    explorer_url: "https://snowtrace.io",
};

/// Avalanche Fuji Testnet configuration.
pub const AVAX_FUJI: NetworkConfig = NetworkConfig {
    name: "Avalanche Fuji Testnet",
    chain_id: 43113,
    rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
    explorer_url: "https://testnet.snowtrace.io",
};

/// Decimals of the native token.
pub const NATIVE_DECIMALS: u32 = 18;

/// Result of a successful transfer submission. The transaction is in the
/// network's pending pool, not yet mined.
#[derive(Debug, Clone)]
pub struct SubmittedTransfer {
    /// Transaction hash (0x prefixed)
    pub tx_hash: String,
    /// Sender (faucet) address
    pub from_address: String,
    /// Max fee per gas the transaction was submitted with, in wei
    pub gas_price: Decimal,
    /// Explorer URL for the transaction
    pub explorer_url: String,
}

/// On-chain receipt for a mined transaction.
#[derive(Debug, Clone, Copy)]
pub struct ChainReceipt {
    /// Block number where the transaction was included
    pub block_number: u64,
    /// Gas actually consumed
    pub gas_used: u64,
    /// Whether the transaction succeeded (false = reverted)
    pub success: bool,
}

/// Errors converting between whole-currency decimals and wei.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("amount must not be negative")]
    Negative,

    #[error("amount has more than {NATIVE_DECIMALS} decimal places")]
    TooPrecise,

    #[error("amount out of range")]
    OutOfRange,
}

/// Convert a whole-currency amount (e.g. "0.05" AVAX) to wei.
pub fn amount_to_wei(amount: Decimal) -> Result<U256, AmountError> {
    if amount.is_sign_negative() {
        return Err(AmountError::Negative);
    }

    let scale = Decimal::from(10u64.pow(NATIVE_DECIMALS));
    let scaled = amount.checked_mul(scale).ok_or(AmountError::OutOfRange)?;
    if !scaled.fract().is_zero() {
        return Err(AmountError::TooPrecise);
    }

    let wei = scaled.to_u128().ok_or(AmountError::OutOfRange)?;
    Ok(U256::from(wei))
}

/// Convert a wei balance to a whole-currency amount.
pub fn wei_to_amount(wei: U256) -> Result<Decimal, AmountError> {
    let raw: u128 = wei.try_into().map_err(|_| AmountError::OutOfRange)?;
    let as_i128 = i128::try_from(raw).map_err(|_| AmountError::OutOfRange)?;
    Decimal::try_from_i128_with_scale(as_i128, NATIVE_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|_| AmountError::OutOfRange)
}

/// Lossy u128-to-Decimal for gas figures; saturates on overflow, which
/// real gas prices never reach.
pub fn gas_to_decimal(value: u128) -> Decimal {
    i128::try_from(value)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, 0).ok())
        .unwrap_or(Decimal::MAX)
}
