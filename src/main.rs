// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;
use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use relational_faucet::api::router;
use relational_faucet::blockchain::AvaxGateway;
use relational_faucet::config::{FaucetConfig, DATA_DIR_ENV};
use relational_faucet::funding::FundingService;
use relational_faucet::ledger::FundingLedger;
use relational_faucet::state::AppState;
use relational_faucet::storage::{DataStore, StoragePaths};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match FaucetConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| "./data".to_string());
    let mut store = DataStore::new(StoragePaths::new(&data_dir));
    if let Err(e) = store.initialize() {
        tracing::error!("Failed to initialize storage at {data_dir}: {e}");
        std::process::exit(1);
    }

    let gateway = match AvaxGateway::new(config.network.clone()) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!("Failed to build chain gateway: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        network = config.network.name,
        rpc = config.network.rpc_url,
        "Faucet targeting network"
    );

    let service = FundingService::new(FundingLedger::new(store), gateway, &config);
    let state = AppState::new(service);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!("Relational Faucet listening on http://{addr} (docs at /docs)");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .expect("Server failed");
}
