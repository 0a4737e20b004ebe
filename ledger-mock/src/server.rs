/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::ledger::MockLedger;

pub fn create_router(ledger: Arc<MockLedger>) -> Router {
    // Allow browser front-ends served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Wallet issuance
        .route("/wallet", get(issue_wallet))

        // Chain endpoints
        .route("/chain", get(get_chain))
        .route("/block/:index", get(get_block))
        .route("/address/:address", get(get_address))

        // Transaction endpoints
        .route("/transactions/sign", post(sign_transaction))
        .route("/transactions/new", post(new_transaction))

        // Block production
        .route("/mint", post(mint))
        .route("/forge", post(forge))

        // Peer endpoints
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve_nodes))

        // Shared state
        .with_state(ledger)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(ledger: Arc<MockLedger>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(ledger);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Mock ledger listening on http://{}", addr);
    log::info!("⛏️  Mint endpoint: POST /mint");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve on an ephemeral loopback port in the background
///
/// Returns the bound address; the server lives until the runtime shuts down.
pub async fn spawn(ledger: Arc<MockLedger>) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(ledger);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Mock ledger stopped: {}", e);
        }
    });

    log::debug!("Mock ledger spawned on http://{}", addr);
    Ok(addr)
}
