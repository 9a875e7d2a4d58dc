// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP API: router assembly and OpenAPI documentation.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod funding;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/wallets/{wallet_id}/fund", post(funding::fund_wallet))
        .route("/funding/limits", get(funding::funding_limits))
        .route("/funding/{tx_hash}", get(funding::funding_status))
        .with_state(state.clone());

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        funding::fund_wallet,
        funding::funding_status,
        funding::funding_limits,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            funding::FundWalletRequest,
            funding::FundingResponse,
            funding::FundingLimitsResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Funding", description = "Faucet funding requests and limits"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{AvaxGateway, AVAX_FUJI};
    use crate::config::{FaucetConfig, FundingLimits};
    use crate::funding::FundingService;
    use crate::ledger::FundingLedger;
    use crate::storage::{DataStore, StoragePaths};
    use tempfile::TempDir;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let dir = TempDir::new().unwrap();
        let mut store = DataStore::new(StoragePaths::new(dir.path()));
        store.initialize().unwrap();

        let config = FaucetConfig {
            limits: FundingLimits::default(),
            funder_key_hex: "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .to_string(),
            network: AVAX_FUJI,
        };
        let gateway = AvaxGateway::new(AVAX_FUJI).unwrap();
        let service = FundingService::new(FundingLedger::new(store), gateway, &config);

        let app = router(AppState::new(service));
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
