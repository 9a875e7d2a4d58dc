// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once at startup into
//! an immutable [`FaucetConfig`] that is injected into the orchestrator.
//! Nothing reads ambient process state after boot.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for wallet/transaction storage | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `FAUCET_PRIVATE_KEY` | Hex-encoded faucet signing key (no 0x prefix) | Required |
//! | `FAUCET_NETWORK` | `fuji` or `mainnet` | `fuji` |
//! | `FAUCET_RPC_URL` | RPC endpoint override | Network default |
//! | `FAUCET_MIN_AMOUNT` | Minimum amount per funding request | `0.01` |
//! | `FAUCET_MAX_AMOUNT` | Maximum amount per funding request | `0.1` |
//! | `FAUCET_DAILY_LIMIT` | Maximum completed funding per wallet per UTC day | `0.5` |
//! | `FAUCET_HOURLY_LIMIT` | Maximum funding requests per wallet per hour | `3` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::blockchain::{NetworkConfig, AVAX_FUJI, AVAX_MAINNET};

/// Environment variable name for the storage data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the faucet signing key.
pub const FAUCET_KEY_ENV: &str = "FAUCET_PRIVATE_KEY";

/// Currency code recorded on funding transactions and balances.
pub const NATIVE_CURRENCY: &str = "AVAX";

/// Per-wallet funding limits. Process-wide constants for the lifetime of
/// the service; never mutated after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingLimits {
    /// Smallest amount a single request may ask for.
    pub min_amount: Decimal,
    /// Largest amount a single request may ask for.
    pub max_amount: Decimal,
    /// Maximum total of Completed funding per wallet per UTC calendar day.
    pub daily_limit: Decimal,
    /// Maximum funding requests (any status) per wallet per trailing hour.
    pub hourly_limit: u32,
}

impl Default for FundingLimits {
    fn default() -> Self {
        Self {
            min_amount: Decimal::new(1, 2),  // 0.01
            max_amount: Decimal::new(1, 1),  // 0.1
            daily_limit: Decimal::new(5, 1), // 0.5
            hourly_limit: 3,
        }
    }
}

/// Immutable service configuration assembled at startup.
#[derive(Clone)]
pub struct FaucetConfig {
    /// Funding limits applied to every wallet.
    pub limits: FundingLimits,
    /// Hex-encoded private key of the faucet account (no 0x prefix).
    pub funder_key_hex: String,
    /// Target network.
    pub network: NetworkConfig,
}

// Hand-written so the signing key can never leak through `{:?}`.
impl std::fmt::Debug for FaucetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaucetConfig")
            .field("limits", &self.limits)
            .field("funder_key_hex", &"<redacted>")
            .field("network", &self.network)
            .finish()
    }
}

/// Errors while assembling configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl FaucetConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let funder_key_hex = env::var(FAUCET_KEY_ENV)
            .map_err(|_| ConfigError::Missing(FAUCET_KEY_ENV))?
            .trim()
            .trim_start_matches("0x")
            .to_string();

        let mut network = match env::var("FAUCET_NETWORK").as_deref() {
            Ok("mainnet") => AVAX_MAINNET,
            _ => AVAX_FUJI,
        };
        if let Ok(url) = env::var("FAUCET_RPC_URL") {
            // Read once at boot; leaking keeps NetworkConfig 'static like
            // the built-in network constants.
            network.rpc_url = Box::leak(url.into_boxed_str());
        }

        let defaults = FundingLimits::default();
        let limits = FundingLimits {
            min_amount: decimal_env("FAUCET_MIN_AMOUNT", defaults.min_amount)?,
            max_amount: decimal_env("FAUCET_MAX_AMOUNT", defaults.max_amount)?,
            daily_limit: decimal_env("FAUCET_DAILY_LIMIT", defaults.daily_limit)?,
            hourly_limit: int_env("FAUCET_HOURLY_LIMIT", defaults.hourly_limit)?,
        };

        if limits.min_amount > limits.max_amount {
            return Err(ConfigError::Invalid {
                var: "FAUCET_MIN_AMOUNT",
                reason: "min_amount exceeds max_amount".to_string(),
            });
        }

        Ok(Self {
            limits,
            funder_key_hex,
            network,
        })
    }
}

fn decimal_env(var: &'static str, default: Decimal) -> Result<Decimal, ConfigError> {
    match env::var(var) {
        Ok(raw) => Decimal::from_str(raw.trim()).map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn int_env(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            reason: "expected an unsigned integer".to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn debug_output_redacts_signing_key() {
        let config = FaucetConfig {
            limits: FundingLimits::default(),
            funder_key_hex: "deadbeefcafe".to_string(),
            network: crate::blockchain::AVAX_FUJI,
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("deadbeefcafe"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn default_limits_match_faucet_policy() {
        let limits = FundingLimits::default();
        assert_eq!(limits.min_amount, dec!(0.01));
        assert_eq!(limits.max_amount, dec!(0.1));
        assert_eq!(limits.daily_limit, dec!(0.5));
        assert_eq!(limits.hourly_limit, 3);
    }
}
