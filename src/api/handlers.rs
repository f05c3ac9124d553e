//! REST API handlers for ledger operations

use crate::custody::{format_ether, parse_ether, Custodian};
use crate::events::EventBroadcaster;
use crate::ledger::{LedgerError, MultisigLedger, Transaction};
use crate::storage::Storage;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<RwLock<MultisigLedger>>,
    pub storage: Arc<Storage>,
    pub broadcaster: EventBroadcaster,
}

impl ApiState {
    /// Wrap a ledger, wiring its events into a fresh broadcaster
    pub fn new(mut ledger: MultisigLedger, storage: Storage) -> Self {
        let broadcaster = EventBroadcaster::new();
        ledger.subscribe(Box::new(broadcaster.clone()));

        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            storage: Arc::new(storage),
            broadcaster,
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct LedgerInfo {
    pub address: String,
    pub label: Option<String>,
    pub owners: Vec<String>,
    pub threshold: u32,
    pub description: String,
    pub balance: String,
    pub balance_wei: String,
    pub transaction_count: usize,
    pub pending: Vec<usize>,
    pub event_sinks: usize,
    pub live_subscribers: usize,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: String,
    pub balance_wei: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TransactionResponse {
    pub index: usize,
    pub to: String,
    pub value: String,
    pub value_wei: String,
    pub data: String,
    pub proposer: String,
    pub executed: bool,
    pub confirmation_count: usize,
    pub threshold: u32,
    pub confirmed_by: Vec<String>,
    pub status: String,
    pub created_at: String,
    pub executed_at: Option<String>,
}

impl TransactionResponse {
    fn new(index: usize, tx: &Transaction, threshold: u32) -> Self {
        Self {
            index,
            to: tx.to().to_string(),
            value: format_ether(tx.value()),
            value_wei: tx.value().to_string(),
            data: format!("0x{}", hex::encode(tx.data())),
            proposer: tx.proposer().to_string(),
            executed: tx.executed(),
            confirmation_count: tx.confirmation_count(),
            threshold,
            confirmed_by: tx.confirmed_by().iter().map(|s| s.to_string()).collect(),
            status: format!("{:?}", tx.status(threshold)),
            created_at: tx.created_at().to_rfc3339(),
            executed_at: tx.executed_at().map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct DepositRequest {
    pub from: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct ProposeRequest {
    pub caller: String,
    pub to: String,
    pub value: String,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Deserialize)]
pub struct CallerRequest {
    pub caller: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn bad_request(message: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message }))
}

/// Map a rejected ledger call to an HTTP status
pub fn ledger_error(e: LedgerError) -> (StatusCode, Json<ApiError>) {
    let status = match &e {
        LedgerError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
        LedgerError::NotAnOwner(_) => StatusCode::FORBIDDEN,
        LedgerError::InvalidTransaction(_) => StatusCode::NOT_FOUND,
        LedgerError::AlreadyExecuted(_)
        | LedgerError::AlreadyConfirmed { .. }
        | LedgerError::NotConfirmed { .. } => StatusCode::CONFLICT,
        LedgerError::InsufficientConfirmations { .. } => StatusCode::PRECONDITION_FAILED,
        LedgerError::TransferFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::Reentrant | LedgerError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ApiError {
            error: e.to_string(),
        }),
    )
}

/// Write the ledger to disk after a successful mutation
///
/// The in-memory ledger stays authoritative if the write fails.
fn persist(state: &ApiState, ledger: &MultisigLedger) {
    if let Err(e) = state.storage.save(ledger) {
        log::error!("Failed to save ledger: {}", e);
    }
}

fn transaction_response(ledger: &MultisigLedger, index: usize) -> ApiResult<TransactionResponse> {
    let tx = ledger
        .transaction(index)
        .ok_or(LedgerError::InvalidTransaction(index))
        .map_err(ledger_error)?;
    Ok(Json(TransactionResponse::new(index, tx, ledger.threshold())))
}

// ============================================================================
// Ledger Endpoints
// ============================================================================

/// GET /health - Health check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/ledger - Ledger configuration and balance
pub async fn get_ledger_info(State(state): State<ApiState>) -> Json<LedgerInfo> {
    let ledger = state.ledger.read().await;
    let balance = ledger.balance();

    Json(LedgerInfo {
        address: ledger.address().to_string(),
        label: ledger.label().map(|s| s.to_string()),
        owners: ledger.owners().to_vec(),
        threshold: ledger.threshold(),
        description: ledger.description(),
        balance: format_ether(balance),
        balance_wei: balance.to_string(),
        transaction_count: ledger.transaction_count(),
        pending: ledger.pending_indices(),
        event_sinks: ledger.sink_count(),
        live_subscribers: state.broadcaster.subscriber_count(),
        created_at: ledger.created_at().to_rfc3339(),
    })
}

/// GET /api/ledger/balance/{address} - Balance of any account in the book
pub async fn get_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Json<BalanceResponse> {
    let ledger = state.ledger.read().await;
    let balance = ledger.custody().balance_of(&address);

    Json(BalanceResponse {
        address,
        balance: format_ether(balance),
        balance_wei: balance.to_string(),
    })
}

/// POST /api/ledger/deposit - Fund the custodial account
pub async fn deposit(
    State(state): State<ApiState>,
    Json(req): Json<DepositRequest>,
) -> ApiResult<BalanceResponse> {
    let amount = parse_ether(&req.amount).map_err(|e| bad_request(e.to_string()))?;

    let mut ledger = state.ledger.write().await;
    let balance = ledger.deposit(&req.from, amount).map_err(ledger_error)?;
    persist(&state, &ledger);

    Ok(Json(BalanceResponse {
        address: ledger.address().to_string(),
        balance: format_ether(balance),
        balance_wei: balance.to_string(),
    }))
}

// ============================================================================
// Transaction Endpoints
// ============================================================================

/// GET /api/transactions - List all transactions
pub async fn list_transactions(State(state): State<ApiState>) -> Json<Vec<TransactionResponse>> {
    let ledger = state.ledger.read().await;
    let threshold = ledger.threshold();

    Json(
        ledger
            .transactions()
            .iter()
            .enumerate()
            .map(|(i, tx)| TransactionResponse::new(i, tx, threshold))
            .collect(),
    )
}

/// GET /api/transactions/{index} - Get one transaction
pub async fn get_transaction(
    State(state): State<ApiState>,
    Path(index): Path<usize>,
) -> ApiResult<TransactionResponse> {
    let ledger = state.ledger.read().await;
    transaction_response(&ledger, index)
}

/// POST /api/transactions - Propose a transfer
pub async fn propose_transaction(
    State(state): State<ApiState>,
    Json(req): Json<ProposeRequest>,
) -> ApiResult<TransactionResponse> {
    let value = parse_ether(&req.value).map_err(|e| bad_request(e.to_string()))?;
    let data = match req.data.as_deref() {
        Some(d) => hex::decode(d.trim_start_matches("0x"))
            .map_err(|e| bad_request(format!("Invalid data: {}", e)))?,
        None => Vec::new(),
    };

    let mut ledger = state.ledger.write().await;
    let index = ledger
        .propose(&req.caller, &req.to, value, data)
        .map_err(ledger_error)?;
    persist(&state, &ledger);

    transaction_response(&ledger, index)
}

/// POST /api/transactions/{index}/confirm - Confirm a transaction
pub async fn confirm_transaction(
    State(state): State<ApiState>,
    Path(index): Path<usize>,
    Json(req): Json<CallerRequest>,
) -> ApiResult<TransactionResponse> {
    let mut ledger = state.ledger.write().await;
    ledger.confirm(&req.caller, index).map_err(ledger_error)?;
    persist(&state, &ledger);

    transaction_response(&ledger, index)
}

/// POST /api/transactions/{index}/revoke - Revoke a confirmation
pub async fn revoke_confirmation(
    State(state): State<ApiState>,
    Path(index): Path<usize>,
    Json(req): Json<CallerRequest>,
) -> ApiResult<TransactionResponse> {
    let mut ledger = state.ledger.write().await;
    ledger
        .revoke_confirmation(&req.caller, index)
        .map_err(ledger_error)?;
    persist(&state, &ledger);

    transaction_response(&ledger, index)
}

/// POST /api/transactions/{index}/execute - Execute a confirmed transaction
pub async fn execute_transaction(
    State(state): State<ApiState>,
    Path(index): Path<usize>,
    Json(req): Json<CallerRequest>,
) -> ApiResult<TransactionResponse> {
    let mut ledger = state.ledger.write().await;
    ledger.execute(&req.caller, index).map_err(ledger_error)?;
    persist(&state, &ledger);

    transaction_response(&ledger, index)
}
