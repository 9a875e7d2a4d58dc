// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Funding endpoints: request faucet funding, check transaction status
//! and inspect the configured limits.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::NATIVE_CURRENCY;
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::{FundingTransaction, TxStatus};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to fund a wallet from the faucet.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FundWalletRequest {
    /// Amount in whole-currency units (e.g. "0.05")
    pub amount: Decimal,
    /// Wallet password, verified against the stored key material
    pub password: String,
}

/// A funding transaction as returned by the API.
///
/// Never exposes the wallet's encrypted key material.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FundingResponse {
    /// Chain transaction hash
    pub tx_hash: String,
    /// Wallet that was funded
    pub wallet_id: String,
    /// Sender (faucet) address
    pub from_address: String,
    /// Recipient address
    pub to_address: String,
    /// Amount in whole-currency units
    pub amount: Decimal,
    /// Currency code
    pub currency: String,
    /// Status: pending, completed, failed
    pub status: String,
    /// When the request was accepted
    pub created_at: String,
    /// When the transaction reached a terminal status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Block number from the receipt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    /// Failure detail when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Block explorer URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl From<FundingTransaction> for FundingResponse {
    fn from(tx: FundingTransaction) -> Self {
        Self {
            tx_hash: tx.tx_hash.unwrap_or_default(),
            wallet_id: tx.wallet_id,
            from_address: tx.from_address,
            to_address: tx.to_address,
            amount: tx.amount,
            currency: tx.currency,
            status: match tx.status {
                TxStatus::Pending => "pending",
                TxStatus::Completed => "completed",
                TxStatus::Failed => "failed",
            }
            .to_string(),
            created_at: tx.created_at.to_rfc3339(),
            completed_at: tx.completed_at.map(|t| t.to_rfc3339()),
            block_number: tx.block_number,
            error_message: tx.error_message,
            explorer_url: tx.explorer_url,
        }
    }
}

/// Query parameters for the limits endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LimitsQuery {
    /// Wallet to compute remaining allowances for
    pub wallet_id: Option<String>,
}

/// Configured faucet limits, with per-wallet remainders when requested.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FundingLimitsResponse {
    /// Minimum amount per funding request
    pub min_amount: Decimal,
    /// Maximum amount per funding request
    pub max_amount: Decimal,
    /// Maximum completed funding per wallet per UTC day
    pub daily_limit: Decimal,
    /// Maximum funding requests per wallet per trailing hour
    pub hourly_limit: u32,
    /// Currency code
    pub currency: String,
    /// Remaining fundable amount today for the queried wallet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_daily_limit: Option<Decimal>,
    /// Remaining request slots this hour for the queried wallet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_hourly_requests: Option<u32>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Request faucet funding into a wallet.
#[utoipa::path(
    post,
    path = "/v1/wallets/{wallet_id}/fund",
    request_body = FundWalletRequest,
    params(("wallet_id" = String, Path, description = "Wallet identifier")),
    tag = "Funding",
    responses(
        (status = 200, description = "Funding submitted", body = FundingResponse),
        (status = 400, description = "Amount out of range or limit exceeded"),
        (status = 403, description = "Wrong password"),
        (status = 404, description = "Wallet not found"),
        (status = 422, description = "Wallet has no key material"),
        (status = 503, description = "Network unavailable")
    )
)]
pub async fn fund_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<String>,
    Json(request): Json<FundWalletRequest>,
) -> Result<Json<FundingResponse>, ApiError> {
    let tx = state
        .service
        .request_funding(&wallet_id, request.amount, &request.password)
        .await?;
    Ok(Json(tx.into()))
}

/// Check the status of a funding transaction by chain hash.
#[utoipa::path(
    get,
    path = "/v1/funding/{tx_hash}",
    params(("tx_hash" = String, Path, description = "Chain transaction hash")),
    tag = "Funding",
    responses(
        (status = 200, description = "Current transaction state", body = FundingResponse),
        (status = 404, description = "Transaction not found"),
        (status = 503, description = "Network unavailable")
    )
)]
pub async fn funding_status(
    State(state): State<AppState>,
    Path(tx_hash): Path<String>,
) -> Result<Json<FundingResponse>, ApiError> {
    let tx = state.service.check_funding_status(&tx_hash).await?;
    Ok(Json(tx.into()))
}

/// The configured faucet limits, optionally with the remaining
/// allowances for one wallet.
#[utoipa::path(
    get,
    path = "/v1/funding/limits",
    params(LimitsQuery),
    tag = "Funding",
    responses(
        (status = 200, description = "Faucet limits", body = FundingLimitsResponse),
        (status = 404, description = "Queried wallet not found")
    )
)]
pub async fn funding_limits(
    State(state): State<AppState>,
    Query(query): Query<LimitsQuery>,
) -> Result<Json<FundingLimitsResponse>, ApiError> {
    let limits = state.service.limits();
    let mut response = FundingLimitsResponse {
        min_amount: limits.min_amount,
        max_amount: limits.max_amount,
        daily_limit: limits.daily_limit,
        hourly_limit: limits.hourly_limit,
        currency: NATIVE_CURRENCY.to_string(),
        remaining_daily_limit: None,
        remaining_hourly_requests: None,
    };

    if let Some(wallet_id) = query.wallet_id {
        response.remaining_daily_limit = Some(state.service.remaining_daily_limit(&wallet_id)?);
        response.remaining_hourly_requests =
            Some(state.service.remaining_hourly_requests(&wallet_id)?);
    }

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn response_hides_key_material_and_formats_status() {
        let mut tx = FundingTransaction::new_pending(
            "w1".to_string(),
            "0xabc".to_string(),
            "0xfaucet".to_string(),
            "0xrecipient".to_string(),
            dec!(0.05),
            NATIVE_CURRENCY.to_string(),
            dec!(25000000000),
            Some("https://testnet.snowtrace.io/tx/0xabc".to_string()),
        );
        tx.mark_completed(42, dec!(21000));

        let response: FundingResponse = tx.into();

        assert_eq!(response.status, "completed");
        assert_eq!(response.block_number.as_deref(), Some("42"));
        assert!(response.completed_at.is_some());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("encrypted_private_key").is_none());
        assert!(json.get("error_message").is_none());
    }

    #[test]
    fn pending_response_omits_terminal_fields() {
        let tx = FundingTransaction::new_pending(
            "w1".to_string(),
            "0xabc".to_string(),
            "0xfaucet".to_string(),
            "0xrecipient".to_string(),
            dec!(0.05),
            NATIVE_CURRENCY.to_string(),
            dec!(25000000000),
            None,
        );
        assert!(tx.created_at <= Utc::now());

        let response: FundingResponse = tx.into();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "pending");
        assert!(json.get("completed_at").is_none());
        assert!(json.get("block_number").is_none());
    }
}
