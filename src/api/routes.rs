//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket event stream
        .route("/ws", get(ws_handler))
        // Ledger
        .route("/api/ledger", get(handlers::get_ledger_info))
        .route("/api/ledger/balance/{address}", get(handlers::get_balance))
        .route("/api/ledger/deposit", post(handlers::deposit))
        // Transactions
        .route(
            "/api/transactions",
            get(handlers::list_transactions).post(handlers::propose_transaction),
        )
        .route("/api/transactions/{index}", get(handlers::get_transaction))
        .route(
            "/api/transactions/{index}/confirm",
            post(handlers::confirm_transaction),
        )
        .route(
            "/api/transactions/{index}/revoke",
            post(handlers::revoke_confirmation),
        )
        .route(
            "/api/transactions/{index}/execute",
            post(handlers::execute_transaction),
        )
        .with_state(state)
        .layer(cors)
}
