//! REST API module
//!
//! HTTP access to a deployed ledger. Callers name themselves in the request
//! body; there is no signature check.
//!
//! # Endpoints
//!
//! ## Ledger
//! - `GET /api/ledger` - Owners, threshold, address and balance
//! - `GET /api/ledger/balance/:address` - Balance of any account
//! - `POST /api/ledger/deposit` - Fund the custodial account
//!
//! ## Transactions
//! - `GET /api/transactions` - List transactions
//! - `POST /api/transactions` - Propose a transfer
//! - `GET /api/transactions/:index` - Get transaction
//! - `POST /api/transactions/:index/confirm` - Confirm
//! - `POST /api/transactions/:index/revoke` - Revoke confirmation
//! - `POST /api/transactions/:index/execute` - Execute
//!
//! ## WebSocket
//! - `GET /ws` - Ledger events (TransactionCreated, TransactionConfirmed, ...)

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::create_router;
