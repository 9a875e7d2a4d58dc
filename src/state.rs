// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::AvaxGateway;
use crate::funding::FundingService;
use crate::ledger::FundingLedger;

/// Shared application state: the funding service over the file-backed
/// ledger and the Avalanche gateway.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FundingService<FundingLedger, AvaxGateway>>,
}

impl AppState {
    pub fn new(service: FundingService<FundingLedger, AvaxGateway>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
