//! Common test utilities for ledger client integration tests
//!
//! Every test gets its own mock ledger on an ephemeral loopback port, so
//! tests run in parallel without sharing chain state or request journals.

#![allow(dead_code)]

use std::sync::Arc;

use ledger_client::{ClientConfig, LedgerClient};
use ledger_mock::{Faults, MockLedger, RecordedCall};

pub struct TestLedger {
    pub ledger: Arc<MockLedger>,
    pub client: LedgerClient,
    pub config: ClientConfig,
}

impl TestLedger {
    pub async fn start() -> Self {
        init_logging();

        let ledger = Arc::new(MockLedger::default());
        let addr = ledger_mock::spawn(ledger.clone())
            .await
            .expect("Failed to spawn mock ledger");

        let config = ClientConfig::with_ledger_url(&format!("http://{}", addr));
        let client = LedgerClient::new(&config).expect("Failed to create ledger client");

        Self {
            ledger,
            client,
            config,
        }
    }

    pub fn set_faults(&self, faults: Faults) {
        self.ledger.set_faults(faults);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.ledger.journal()
    }

    pub fn call_count(&self) -> usize {
        self.ledger.journal().len()
    }

    /// Raw body of the last request to `path`
    pub fn last_body(&self, path: &str) -> String {
        self.ledger
            .journal()
            .into_iter()
            .rev()
            .find(|c| c.path == path)
            .and_then(|c| c.body)
            .unwrap_or_else(|| panic!("no request body recorded for {}", path))
    }
}

pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// The `timestamp` token exactly as it appears in a compact JSON body
pub fn timestamp_token(body: &str) -> String {
    let key = "\"timestamp\":";
    let start = body
        .find(key)
        .unwrap_or_else(|| panic!("no timestamp in {}", body))
        + key.len();
    body[start..]
        .chars()
        .take_while(|c| *c != ',' && *c != '}')
        .collect::<String>()
        .trim()
        .to_string()
}
