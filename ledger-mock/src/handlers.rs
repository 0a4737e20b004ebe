/// Axum HTTP handlers for the ledger API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ledger::MockLedger;
use crate::types::*;

/// Shared application state
pub type AppState = Arc<MockLedger>;

/// Custom error type for handlers
///
/// `NotFound` and `MissingValues` answer in plain text, everything else as a
/// `{"message": ...}` record, the same mix the real service produces.
pub enum ApiError {
    NotFound(String),
    MissingValues(String),
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::MissingValues(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::BadRequest(msg) => message(StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => message(StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => message(StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

fn message(status: StatusCode, msg: String) -> Response {
    (status, Json(MessageResponse { message: msg })).into_response()
}

/// Decode a raw JSON body, answering 400 in plain text when fields are missing
fn parse_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        log::debug!("Rejected {} body: {}", what, e);
        ApiError::MissingValues(format!("Missing values for {}", what))
    })
}

/// GET /wallet
pub async fn issue_wallet(
    State(ledger): State<AppState>,
) -> Result<Json<WalletResponse>, ApiError> {
    ledger.record("GET", "/wallet", None);
    if ledger.faults().fail_wallet {
        return Err(ApiError::Internal("Key generation failed".to_string()));
    }
    let (public_address, private_key) = ledger.issue_wallet();
    Ok(Json(WalletResponse {
        message: "New wallet created.".to_string(),
        public_address,
        private_key,
    }))
}

/// GET /chain
pub async fn get_chain(State(ledger): State<AppState>) -> Result<Json<ChainResponse>, ApiError> {
    ledger.record("GET", "/chain", None);
    if ledger.faults().fail_chain {
        return Err(ApiError::Unavailable("Chain temporarily unavailable".to_string()));
    }
    let chain = ledger.chain();
    Ok(Json(ChainResponse {
        length: chain.len(),
        chain,
    }))
}

/// GET /block/{index}
pub async fn get_block(
    State(ledger): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Value>, ApiError> {
    ledger.record("GET", format!("/block/{}", index), None);
    ledger
        .block(index)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Error: Block not found".to_string()))
}

/// GET /address/{address}
pub async fn get_address(
    State(ledger): State<AppState>,
    Path(address): Path<String>,
) -> Json<AddressResponse> {
    ledger.record("GET", format!("/address/{}", address), None);
    Json(ledger.address_view(&address))
}

/// POST /transactions/sign
pub async fn sign_transaction(
    State(ledger): State<AppState>,
    body: String,
) -> Result<Json<SignTransferResponse>, ApiError> {
    ledger.record("POST", "/transactions/sign", Some(&body));
    let faults = ledger.faults();
    if let Some(delay) = faults.sign_delay {
        tokio::time::sleep(delay).await;
    }
    if faults.fail_sign {
        return Err(ApiError::Internal("Error during signing: signer offline".to_string()));
    }

    let req: SignTransferRequest = parse_body(&body, "signing")?;
    let signature = ledger
        .sign(&req)
        .map_err(|e| ApiError::Internal(format!("Error during signing: {}", e)))?;
    Ok(Json(SignTransferResponse { signature }))
}

/// POST /transactions/new
pub async fn new_transaction(
    State(ledger): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    ledger.record("POST", "/transactions/new", Some(&body));
    if ledger.faults().fail_submit {
        return Err(ApiError::Internal("Transaction intake offline".to_string()));
    }

    let req: NewTransactionRequest = parse_body(&body, "transaction")?;
    ledger
        .add_transaction(&req)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Transaction will be added to the next Block.".to_string(),
        }),
    ))
}

/// POST /mint
pub async fn mint(State(ledger): State<AppState>, body: String) -> Result<Json<Value>, ApiError> {
    ledger.record("POST", "/mint", Some(&body));
    let req: MintRequest = parse_body(&body, "minting")?;

    let block = ledger
        .attempt_mint(&req.solver_address, &req.secret_phrase)
        .ok_or_else(|| {
            ApiError::BadRequest("Minting failed. Invalid solution or already solved.".to_string())
        })?;

    Ok(Json(json!({
        "message": "New Block Forged!",
        "block_index": block["index"],
        "transactions": block["transactions"],
        "data_clue": block["data"],
    })))
}

/// POST /forge
pub async fn forge(State(ledger): State<AppState>, body: String) -> Result<Json<Value>, ApiError> {
    ledger.record("POST", "/forge", Some(&body));
    let req: ForgeRequest = parse_body(&body, "forging")?;
    let forger_address = req
        .forger_address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Error: Forger address is required.".to_string()))?;

    let block = ledger.forge(&forger_address).ok_or_else(|| {
        ApiError::BadRequest("Forging failed. No pending transactions.".to_string())
    })?;

    Ok(Json(json!({
        "message": "Transaction Block Forged!",
        "block_index": block["index"],
        "transactions": block["transactions"],
    })))
}

/// POST /nodes/register
pub async fn register_nodes(
    State(ledger): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    ledger.record("POST", "/nodes/register", Some(&body));
    let req: RegisterNodesRequest = parse_body(&body, "node registration")?;
    let nodes = req.nodes.ok_or_else(|| {
        ApiError::MissingValues("Error: Please supply a valid list of nodes".to_string())
    })?;

    let total_nodes = ledger.register_nodes(&nodes);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "New nodes have been added",
            "total_nodes": total_nodes,
        })),
    ))
}

/// GET /nodes/resolve
///
/// The mock never contacts its peers, so its own chain always stays.
pub async fn resolve_nodes(State(ledger): State<AppState>) -> Json<Value> {
    ledger.record("GET", "/nodes/resolve", None);
    Json(json!({
        "message": "Our chain is authoritative",
        "chain": ledger.chain(),
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
