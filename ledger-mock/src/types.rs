/// Ledger API request/response types
///
/// Field names match what the ledger service accepts and returns, so the
/// client under test cannot tell the mock from the real thing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of GET /wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletResponse {
    pub message: String,
    pub public_address: String,
    pub private_key: String,
}

/// Response of GET /chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Value>,
    pub length: usize,
}

/// Response of GET /address/{address}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressResponse {
    pub address: String,
    pub balance: f64,
    pub transaction_count: usize,
    pub transactions: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignTransferRequest {
    pub private_key: String,
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTransferResponse {
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub signature: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintRequest {
    pub solver_address: String,
    pub secret_phrase: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgeRequest {
    #[serde(default)]
    pub forger_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterNodesRequest {
    #[serde(default)]
    pub nodes: Option<Vec<String>>,
}

/// Generic `{"message": ...}` record used for results and errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
