// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain gateway: the RPC seam between the orchestrator and the network.
//!
//! [`ChainGateway`] is the trait the funding pipeline consumes; the
//! production implementation [`AvaxGateway`] submits EIP-1559 native
//! transfers to the Avalanche C-Chain via alloy. Submission returns once
//! the network accepts the transaction into its pending pool, not once it
//! is mined; confirmation is observed later through [`ChainGateway::get_receipt`].

use std::future::Future;
use std::str::FromStr;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::Address,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use rust_decimal::Decimal;

use super::types::{
    amount_to_wei, gas_to_decimal, wei_to_amount, ChainReceipt, NetworkConfig, SubmittedTransfer,
};

/// HTTP provider type with all fillers (no wallet).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Errors from chain gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction submission failed: {0}")]
    Submission(String),
}

/// RPC operations the funding pipeline needs from the chain.
pub trait ChainGateway {
    /// Submit a native transfer signed with `signing_key_hex`. Resolves
    /// once the network accepts the transaction, which may be before it
    /// is mined.
    fn submit_transfer(
        &self,
        signing_key_hex: &str,
        to_address: &str,
        amount: Decimal,
    ) -> impl Future<Output = Result<SubmittedTransfer, NetworkError>> + Send;

    /// Fetch the receipt for a transaction. `Ok(None)` means not yet
    /// mined, which is the expected steady state while pending; only RPC
    /// transport failures are errors.
    fn get_receipt(
        &self,
        tx_hash: &str,
    ) -> impl Future<Output = Result<Option<ChainReceipt>, NetworkError>> + Send;

    /// Fetch the current native balance of an address.
    fn get_balance(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Decimal, NetworkError>> + Send;
}

/// Avalanche C-Chain gateway over alloy HTTP providers.
pub struct AvaxGateway {
    network: NetworkConfig,
    provider: HttpProvider,
}

impl AvaxGateway {
    /// Create a gateway for the given network.
    pub fn new(network: NetworkConfig) -> Result<Self, NetworkError> {
        let url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| NetworkError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { network, provider })
    }

    /// The network this gateway targets.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Derive the public address controlled by a hex private key.
    pub fn signer_address(signing_key_hex: &str) -> Result<String, NetworkError> {
        let signer = parse_signer(signing_key_hex)?;
        Ok(signer.address().to_string())
    }

    /// Current gas prices: (max_fee_per_gas, max_priority_fee_per_gas).
    async fn get_gas_prices(&self) -> Result<(u128, u128), NetworkError> {
        let block = self
            .provider
            .get_block_by_number(alloy::eips::BlockNumberOrTag::Latest)
            .await
            .map_err(|e| NetworkError::Rpc(format!("Failed to get block: {e}")))?
            .ok_or_else(|| NetworkError::Rpc("No latest block".to_string()))?;

        let base_fee: u128 = block
            .header
            .base_fee_per_gas
            .map(|f| f as u128)
            .unwrap_or(25_000_000_000u128); // 25 gwei default

        // Standard priority fee for Avalanche
        let priority_fee: u128 = 1_500_000_000; // 1.5 gwei

        // Max fee = 2 * base_fee + priority_fee (allows for base fee increase)
        let max_fee = base_fee.saturating_mul(2).saturating_add(priority_fee);

        Ok((max_fee, priority_fee))
    }
}

fn parse_signer(signing_key_hex: &str) -> Result<PrivateKeySigner, NetworkError> {
    let key_bytes = alloy::hex::decode(signing_key_hex.trim_start_matches("0x"))
        .map_err(|e| NetworkError::InvalidKey(e.to_string()))?;
    PrivateKeySigner::from_slice(&key_bytes).map_err(|e| NetworkError::InvalidKey(e.to_string()))
}

impl ChainGateway for AvaxGateway {
    async fn submit_transfer(
        &self,
        signing_key_hex: &str,
        to_address: &str,
        amount: Decimal,
    ) -> Result<SubmittedTransfer, NetworkError> {
        let to_addr = Address::from_str(to_address)
            .map_err(|e| NetworkError::InvalidAddress(e.to_string()))?;
        let amount_wei =
            amount_to_wei(amount).map_err(|e| NetworkError::InvalidAmount(e.to_string()))?;

        let signer = parse_signer(signing_key_hex)?;
        let from_address = signer.address().to_string();
        let wallet = EthereumWallet::from(signer);

        let url: url::Url = self
            .network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| NetworkError::InvalidRpcUrl(e.to_string()))?;
        let signing_provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        let (max_fee_per_gas, priority_fee) = self.get_gas_prices().await?;

        let tx = TransactionRequest::default()
            .to(to_addr)
            .value(amount_wei)
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(priority_fee);

        let pending = signing_provider
            .send_transaction(tx)
            .await
            .map_err(|e| NetworkError::Submission(e.to_string()))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        let explorer_url = format!("{}/tx/{}", self.network.explorer_url, tx_hash);

        Ok(SubmittedTransfer {
            tx_hash,
            from_address,
            gas_price: gas_to_decimal(max_fee_per_gas),
            explorer_url,
        })
    }

    async fn get_receipt(&self, tx_hash: &str) -> Result<Option<ChainReceipt>, NetworkError> {
        let hash = tx_hash
            .parse()
            .map_err(|_| NetworkError::InvalidAddress(format!("Invalid tx hash: {tx_hash}")))?;

        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| NetworkError::Rpc(format!("Failed to get receipt: {e}")))?;

        Ok(receipt.map(|r| ChainReceipt {
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used as u64,
            success: r.status(),
        }))
    }

    async fn get_balance(&self, address: &str) -> Result<Decimal, NetworkError> {
        let addr = Address::from_str(address)
            .map_err(|e| NetworkError::InvalidAddress(e.to_string()))?;

        let balance = self
            .provider
            .get_balance(addr)
            .await
            .map_err(|e| NetworkError::Rpc(e.to_string()))?;

        wei_to_amount(balance).map_err(|e| NetworkError::Rpc(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known hardhat test key, never used with real funds.
    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn signer_address_derivation() {
        let address = AvaxGateway::signer_address(TEST_KEY).unwrap();
        assert_eq!(
            address.to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn signer_address_accepts_0x_prefix() {
        let plain = AvaxGateway::signer_address(TEST_KEY).unwrap();
        let prefixed = AvaxGateway::signer_address(&format!("0x{TEST_KEY}")).unwrap();
        assert_eq!(plain, prefixed);
    }

    #[test]
    fn malformed_key_is_rejected() {
        assert!(matches!(
            AvaxGateway::signer_address("zz-not-hex"),
            Err(NetworkError::InvalidKey(_))
        ));
    }

    #[test]
    fn gateway_builds_for_fuji() {
        let gateway = AvaxGateway::new(super::super::types::AVAX_FUJI).unwrap();
        assert_eq!(gateway.network().chain_id, 43113);
    }
}
