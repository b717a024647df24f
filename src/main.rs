// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use chrono::Duration;
use tracing_subscriber::EnvFilter;

use ebyte_academy_server::{
    api::router,
    auth::LocalSessionStore,
    config::{
        ManagerScope, DATA_DIR_ENV, DEFAULT_SESSION_TTL_MINUTES, HOST_ENV, LOG_FORMAT_ENV,
        PORT_ENV, SEED_DEMO_USERS_ENV, SESSION_TTL_ENV,
    },
    seed::seed_demo_users,
    state::AppState,
    storage::{paths::DATA_ROOT, DataStore, StoragePaths},
};

#[tokio::main]
async fn main() {
    init_tracing();

    // Initialize storage (panics if the data directory cannot be created -
    // nothing works without it)
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DATA_ROOT.to_string());
    let mut storage = DataStore::new(StoragePaths::new(&data_dir));
    storage
        .initialize()
        .expect("Failed to initialize data directory");
    tracing::info!(data_dir = %data_dir, "storage initialized");

    // Session store
    let session_ttl = env::var(SESSION_TTL_ENV)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(DEFAULT_SESSION_TTL_MINUTES);
    let sessions = Arc::new(LocalSessionStore::new(
        storage.clone(),
        Duration::minutes(session_ttl),
    ));

    // Optional demo accounts
    if env::var(SEED_DEMO_USERS_ENV).is_ok() {
        match seed_demo_users(&storage, sessions.as_ref()).await {
            Ok(created) => tracing::info!(created, "demo user seeding complete"),
            Err(e) => tracing::error!(error = %e, "demo user seeding failed"),
        }
    }

    let state = AppState::new(storage, sessions).with_manager_scope(ManagerScope::from_env());
    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("eByte Academy server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl_c");
    tracing::info!("shutdown signal received");
}
