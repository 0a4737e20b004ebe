/// Mock Ledger Server Library
///
/// An in-memory stand-in for the ledger service, speaking the same HTTP+JSON
/// API. Used by the client's integration tests and runnable standalone.

pub mod handlers;
pub mod ledger;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use ledger::{Faults, MockLedger, RecordedCall, DEFAULT_MINT_SOLUTION, MINT_REWARD_SENDER};
pub use server::{create_router, run_server, spawn};
pub use types::*;
