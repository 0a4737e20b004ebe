// Ledger API request/response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ClientError;

/// Seconds since the Unix epoch, fractional part allowed
///
/// Serialized as a bare JSON number. The same value always serializes to the
/// same bytes, which is what lets the sign and submit payloads agree.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transfer amount: finite and strictly positive
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    /// Parse raw form input
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientError::validation("amount is required"));
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ClientError::validation(format!("amount '{}' is not a number", trimmed)))?;
        Self::new(value)
    }

    pub fn new(value: f64) -> Result<Self, ClientError> {
        if !value.is_finite() {
            return Err(ClientError::validation("amount must be a finite number"));
        }
        if value <= 0.0 {
            return Err(ClientError::validation("amount must be greater than zero"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GET /wallet
#[derive(Deserialize)]
pub struct IssuedWallet {
    pub public_address: String,
    pub private_key: String,
}

/// A block as received; only `index` is interpreted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// GET /chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// GET /address/{address}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressView {
    pub address: String,
    pub balance: f64,
    pub transaction_count: usize,
    #[serde(default)]
    pub transactions: Vec<Value>,
}

/// POST /transactions/sign
///
/// No `Debug`: this is the one record that carries the private key.
#[derive(Serialize)]
pub struct SignRequest<'a> {
    pub private_key: &'a str,
    pub sender: &'a str,
    pub recipient: &'a str,
    pub amount: Amount,
    pub timestamp: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct SignResponse {
    pub signature: String,
}

/// POST /transactions/new
#[derive(Debug, Serialize)]
pub struct SubmitRequest<'a> {
    pub sender: &'a str,
    pub recipient: &'a str,
    pub amount: Amount,
    pub signature: &'a str,
    pub timestamp: Timestamp,
}

/// POST /mint
#[derive(Debug, Serialize)]
pub struct MintRequest<'a> {
    pub solver_address: &'a str,
    pub secret_phrase: &'a str,
}

/// POST /forge
#[derive(Debug, Serialize)]
pub struct ForgeRequest<'a> {
    pub forger_address: &'a str,
}

/// POST /nodes/register
#[derive(Debug, Serialize)]
pub struct RegisterNodesRequest<'a> {
    pub nodes: &'a [String],
}

/// Result record returned by state-changing calls
///
/// `message` is human-readable; `status` is only present on services that
/// report the outcome explicitly. Everything else is kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error record of a non-2xx answer
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_rejects_unusable_input() {
        for raw in ["", "   ", "abc", "0", "-3", "NaN", "inf"] {
            let err = Amount::parse(raw).unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)), "{:?} accepted", raw);
        }
        assert_eq!(Amount::parse(" 2.5 ").unwrap().value(), 2.5);
    }

    #[test]
    fn test_block_keeps_unknown_fields() {
        let raw = json!({
            "index": 3,
            "previous_hash": "abc",
            "transactions": [],
            "nonce": 0
        });
        let block: Block = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block.index, 3);
        assert_eq!(block.fields.get("previous_hash"), Some(&json!("abc")));
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn test_action_result_without_status() {
        let result: ActionResult = serde_json::from_value(json!({
            "message": "New Block Forged!",
            "block_index": 4
        }))
        .unwrap();
        assert_eq!(result.status, None);
        assert_eq!(result.extra.get("block_index"), Some(&json!(4)));
    }
}
