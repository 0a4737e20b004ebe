/// In-memory ledger backing the mock server
///
/// Keeps just enough state to answer every ledger call consistently: a chain
/// of JSON blocks, a pending pool, the keys of issued wallets, registered
/// peers, and a journal of every request received. Signatures are keyed
/// SHA-256 digests over the transfer fields, so a submission only verifies
/// when it carries exactly the fields that were signed.

use anyhow::{bail, Result};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::{AddressResponse, NewTransactionRequest, SignTransferRequest};

/// Sender recorded on mint reward transactions
pub const MINT_REWARD_SENDER: &str = "MINT_REWARD";

/// Puzzle solution accepted by `/mint` unless configured otherwise
pub const DEFAULT_MINT_SOLUTION: &str = "GENESIS123";

/// Failures and delays the tests can switch on
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// `/wallet` answers 500
    pub fail_wallet: bool,
    /// `/chain` answers 503
    pub fail_chain: bool,
    /// `/transactions/sign` answers 500
    pub fail_sign: bool,
    /// `/transactions/new` answers 500
    pub fail_submit: bool,
    /// `/transactions/sign` waits this long before answering
    pub sign_delay: Option<Duration>,
}

/// One request as received, body verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<String>,
}

struct LedgerState {
    chain: Vec<Value>,
    pending: Vec<Value>,
    /// address -> private key
    keys: HashMap<String, String>,
    wallets_issued: u64,
    nodes: BTreeSet<String>,
    journal: Vec<RecordedCall>,
    faults: Faults,
}

pub struct MockLedger {
    mint_solution: String,
    state: Mutex<LedgerState>,
}

impl MockLedger {
    pub fn new(mint_solution: impl Into<String>) -> Self {
        let genesis = build_block(
            0,
            "0",
            Vec::new(),
            json!({ "puzzle": "Find the genesis phrase", "clue": "mock ledger" }),
        );

        Self {
            mint_solution: mint_solution.into(),
            state: Mutex::new(LedgerState {
                chain: vec![genesis],
                pending: Vec::new(),
                keys: HashMap::new(),
                wallets_issued: 0,
                nodes: BTreeSet::new(),
                journal: Vec::new(),
                faults: Faults::default(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Journal and fault injection
    // ------------------------------------------------------------------

    pub fn record(&self, method: &'static str, path: impl Into<String>, body: Option<&str>) {
        self.state().journal.push(RecordedCall {
            method,
            path: path.into(),
            body: body.map(str::to_string),
        });
    }

    pub fn journal(&self) -> Vec<RecordedCall> {
        self.state().journal.clone()
    }

    /// Number of requests received for an exact path
    pub fn calls_to(&self, path: &str) -> usize {
        self.state().journal.iter().filter(|c| c.path == path).count()
    }

    pub fn faults(&self) -> Faults {
        self.state().faults.clone()
    }

    pub fn set_faults(&self, faults: Faults) {
        self.state().faults = faults;
    }

    // ------------------------------------------------------------------
    // Ledger operations
    // ------------------------------------------------------------------

    /// Create a key pair and remember it; returns (address, private key)
    pub fn issue_wallet(&self) -> (String, String) {
        let mut state = self.state();
        state.wallets_issued += 1;
        let private_key = sha256_hex(format!("mock-key-{}", state.wallets_issued).as_bytes());
        let address = sha256_hex(format!("mock-address-{}", private_key).as_bytes());
        state.keys.insert(address.clone(), private_key.clone());
        log::info!("Issued wallet {}", address);
        (address, private_key)
    }

    pub fn chain(&self) -> Vec<Value> {
        self.state().chain.clone()
    }

    pub fn block(&self, index: usize) -> Option<Value> {
        self.state().chain.get(index).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.state().pending.len()
    }

    pub fn address_view(&self, address: &str) -> AddressResponse {
        let state = self.state();
        let mut balance = 0.0;
        let mut transactions = Vec::new();

        for block in &state.chain {
            let Some(txs) = block["transactions"].as_array() else {
                continue;
            };
            for tx in txs {
                let amount = tx["amount"].as_f64().unwrap_or(0.0);
                let received = tx["recipient"] == address;
                let sent = tx["sender"] == address;
                if received {
                    balance += amount;
                }
                if sent {
                    balance -= amount;
                }
                if received || sent {
                    transactions.push(tx.clone());
                }
            }
        }

        AddressResponse {
            address: address.to_string(),
            balance,
            transaction_count: transactions.len(),
            transactions,
        }
    }

    /// Sign transfer fields with the supplied private key
    pub fn sign(&self, req: &SignTransferRequest) -> Result<String> {
        if req.private_key.is_empty() {
            bail!("Missing private key");
        }
        Ok(transfer_signature(
            &req.private_key,
            &req.sender,
            &req.recipient,
            req.amount,
            req.timestamp,
        ))
    }

    /// Verify a signed transfer against the sender's key and pool it
    pub fn add_transaction(&self, req: &NewTransactionRequest) -> Result<()> {
        let mut state = self.state();
        let Some(private_key) = state.keys.get(&req.sender) else {
            bail!("Unknown sender");
        };
        let expected = transfer_signature(
            private_key,
            &req.sender,
            &req.recipient,
            req.amount,
            req.timestamp,
        );
        if expected != req.signature {
            log::warn!("Rejected transfer from {}: signature mismatch", req.sender);
            bail!("Invalid transaction.");
        }

        state.pending.push(json!({
            "sender": req.sender,
            "recipient": req.recipient,
            "amount": req.amount,
            "timestamp": req.timestamp,
            "signature": req.signature,
        }));
        Ok(())
    }

    /// Append a reward block if the phrase solves the current puzzle
    pub fn attempt_mint(&self, solver_address: &str, secret_phrase: &str) -> Option<Value> {
        if secret_phrase != self.mint_solution {
            return None;
        }

        let mut state = self.state();
        let reward = json!({
            "sender": MINT_REWARD_SENDER,
            "recipient": solver_address,
            "amount": 1.0,
            "timestamp": now_secs(),
            "signature": Value::Null,
        });
        let mut transactions = vec![reward];
        transactions.append(&mut state.pending);
        let block = append_block(&mut state, transactions);
        log::info!("Minted block #{} for {}", block["index"], solver_address);
        Some(block)
    }

    /// Confirm the pending pool in a new block; `None` if nothing is pending
    pub fn forge(&self, forger_address: &str) -> Option<Value> {
        let mut state = self.state();
        if state.pending.is_empty() {
            return None;
        }
        let transactions = std::mem::take(&mut state.pending);
        let block = append_block(&mut state, transactions);
        log::info!("Forged block #{} for {}", block["index"], forger_address);
        Some(block)
    }

    pub fn register_nodes(&self, nodes: &[String]) -> Vec<String> {
        let mut state = self.state();
        state.nodes.extend(nodes.iter().cloned());
        state.nodes.iter().cloned().collect()
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MINT_SOLUTION)
    }
}

fn append_block(state: &mut LedgerState, transactions: Vec<Value>) -> Value {
    let previous_hash = state
        .chain
        .last()
        .and_then(|b| b["hash"].as_str())
        .unwrap_or("0")
        .to_string();
    let block = build_block(
        state.chain.len() as u64,
        &previous_hash,
        transactions,
        json!({ "puzzle": "Find the next phrase" }),
    );
    state.chain.push(block.clone());
    block
}

fn build_block(index: u64, previous_hash: &str, transactions: Vec<Value>, data: Value) -> Value {
    let mut block = json!({
        "index": index,
        "transactions": transactions,
        "timestamp": now_secs(),
        "previous_hash": previous_hash,
        "data": data,
        "nonce": 0,
    });
    let hash = sha256_hex(block.to_string().as_bytes());
    block["hash"] = Value::String(hash);
    block
}

/// Keyed digest over the canonical (sorted-key) transfer record
fn transfer_signature(
    private_key: &str,
    sender: &str,
    recipient: &str,
    amount: f64,
    timestamp: f64,
) -> String {
    let canonical = json!({
        "amount": amount,
        "recipient": recipient,
        "sender": sender,
        "timestamp": timestamp,
    })
    .to_string();
    sha256_hex(format!("{}:{}", private_key, canonical).as_bytes())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
