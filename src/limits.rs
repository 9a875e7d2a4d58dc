// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rate and amount limiter for faucet funding.
//!
//! Pure read-side policy over the ledger's transaction history. Every
//! check re-evaluates against storage at call time; nothing is cached.
//! Funding volume is low, so correctness wins over latency.
//!
//! The daily and hourly checks deliberately count different things: the
//! daily limit sums Completed funding amounts (a funds throttle), while
//! the hourly limit counts requests of any status in the trailing hour
//! (a request-volume throttle).

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::config::FundingLimits;
use crate::ledger::Ledger;
use crate::storage::StorageResult;

/// Outcome of the per-request amount bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountOutOfRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Read-only limit checks over a ledger.
#[derive(Debug, Clone, Copy)]
pub struct FundingLimiter {
    limits: FundingLimits,
}

impl FundingLimiter {
    /// Create a limiter with the process-wide limits.
    pub fn new(limits: FundingLimits) -> Self {
        Self { limits }
    }

    /// The configured limits.
    pub fn limits(&self) -> FundingLimits {
        self.limits
    }

    /// Check a requested amount against the per-request bounds.
    pub fn check_amount_bounds(&self, amount: Decimal) -> Result<(), AmountOutOfRange> {
        if amount < self.limits.min_amount || amount > self.limits.max_amount {
            return Err(AmountOutOfRange {
                min: self.limits.min_amount,
                max: self.limits.max_amount,
            });
        }
        Ok(())
    }

    /// Remaining fundable amount for the wallet on `as_of`'s UTC calendar
    /// day, floored at zero. Only Completed funding transactions count.
    pub fn remaining_daily_limit<L: Ledger>(
        &self,
        ledger: &L,
        wallet_id: &str,
        currency: &str,
        as_of: DateTime<Utc>,
    ) -> StorageResult<Decimal> {
        let funded_today =
            ledger.sum_completed_funding_amount(wallet_id, currency, as_of.date_naive())?;
        Ok((self.limits.daily_limit - funded_today).max(Decimal::ZERO))
    }

    /// Remaining request slots for the wallet in the trailing hour ending
    /// at `as_of`, floored at zero. Requests of ANY status count.
    pub fn remaining_hourly_requests<L: Ledger>(
        &self,
        ledger: &L,
        wallet_id: &str,
        currency: &str,
        as_of: DateTime<Utc>,
    ) -> StorageResult<u32> {
        let window_start = as_of - Duration::hours(1);
        let requests = ledger.count_funding_requests(wallet_id, currency, window_start)?;
        Ok(self.limits.hourly_limit.saturating_sub(requests))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FundingTransaction, StorageResult, WalletRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::cell::Cell;

    /// Ledger stub with canned policy-query answers; the limiter never
    /// touches the other operations.
    struct StubLedger {
        completed_today: Decimal,
        requests_in_window: u32,
        last_since: Cell<Option<DateTime<Utc>>>,
    }

    impl StubLedger {
        fn new(completed_today: Decimal, requests_in_window: u32) -> Self {
            Self {
                completed_today,
                requests_in_window,
                last_since: Cell::new(None),
            }
        }
    }

    impl Ledger for StubLedger {
        fn find_wallet(&self, _: &str) -> StorageResult<Option<WalletRecord>> {
            unreachable!("limiter does not load wallets")
        }

        fn find_transaction_by_hash(&self, _: &str) -> StorageResult<Option<FundingTransaction>> {
            unreachable!("limiter does not load transactions")
        }

        fn insert_transaction(&self, _: &FundingTransaction) -> StorageResult<()> {
            unreachable!("limiter never writes")
        }

        fn update_transaction(&self, _: &FundingTransaction) -> StorageResult<()> {
            unreachable!("limiter never writes")
        }

        fn sum_completed_funding_amount(
            &self,
            _: &str,
            _: &str,
            _: NaiveDate,
        ) -> StorageResult<Decimal> {
            Ok(self.completed_today)
        }

        fn count_funding_requests(
            &self,
            _: &str,
            _: &str,
            since: DateTime<Utc>,
        ) -> StorageResult<u32> {
            self.last_since.set(Some(since));
            Ok(self.requests_in_window)
        }

        fn upsert_balance(
            &self,
            _: &str,
            _: &str,
            _: Decimal,
            _: DateTime<Utc>,
        ) -> StorageResult<()> {
            unreachable!("limiter never writes")
        }
    }

    fn limiter() -> FundingLimiter {
        FundingLimiter::new(FundingLimits::default())
    }

    #[test]
    fn amount_bounds_accept_inclusive_range() {
        let limiter = limiter();
        assert!(limiter.check_amount_bounds(dec!(0.01)).is_ok());
        assert!(limiter.check_amount_bounds(dec!(0.05)).is_ok());
        assert!(limiter.check_amount_bounds(dec!(0.1)).is_ok());
    }

    #[test]
    fn amount_bounds_reject_outside_range() {
        let limiter = limiter();
        assert!(limiter.check_amount_bounds(dec!(0.009)).is_err());
        assert!(limiter.check_amount_bounds(dec!(0.11)).is_err());
        assert!(limiter.check_amount_bounds(Decimal::ZERO).is_err());
    }

    #[test]
    fn full_daily_limit_when_nothing_funded() {
        let ledger = StubLedger::new(Decimal::ZERO, 0);
        let remaining = limiter()
            .remaining_daily_limit(&ledger, "w1", "AVAX", Utc::now())
            .unwrap();
        assert_eq!(remaining, dec!(0.5));
    }

    #[test]
    fn daily_limit_subtracts_completed_amounts() {
        let ledger = StubLedger::new(dec!(0.3), 0);
        let remaining = limiter()
            .remaining_daily_limit(&ledger, "w1", "AVAX", Utc::now())
            .unwrap();
        assert_eq!(remaining, dec!(0.2));
    }

    #[test]
    fn daily_limit_floors_at_zero() {
        let ledger = StubLedger::new(dec!(0.9), 0);
        let remaining = limiter()
            .remaining_daily_limit(&ledger, "w1", "AVAX", Utc::now())
            .unwrap();
        assert_eq!(remaining, Decimal::ZERO);
    }

    #[test]
    fn hourly_requests_decrease_per_request() {
        for (used, expected) in [(0u32, 3u32), (1, 2), (2, 1), (3, 0), (5, 0)] {
            let ledger = StubLedger::new(Decimal::ZERO, used);
            let remaining = limiter()
                .remaining_hourly_requests(&ledger, "w1", "AVAX", Utc::now())
                .unwrap();
            assert_eq!(remaining, expected, "with {used} requests used");
        }
    }

    #[test]
    fn hourly_window_is_trailing_hour() {
        let ledger = StubLedger::new(Decimal::ZERO, 0);
        let as_of = Utc::now();
        limiter()
            .remaining_hourly_requests(&ledger, "w1", "AVAX", as_of)
            .unwrap();

        assert_eq!(ledger.last_since.get(), Some(as_of - Duration::hours(1)));
    }
}
