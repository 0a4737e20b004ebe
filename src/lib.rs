//! Ledger Client: wallets, signed transfers and chain exploration
//!
//! Headless client for an experimental ledger service reached over HTTP+JSON.
//! The ledger does all key generation, signing, mining and validation; this
//! crate owns the client-side protocol around it.
//!
//! # Architecture
//!
//! - **LedgerClient**: typed wrapper over the HTTP calls, one error shape
//! - **WalletSession**: the active address/key pair, in memory only
//! - **TransactionSubmitter**: the sign-then-submit state machine
//! - **Mint/Forge triggers**: single precondition-gated block actions
//! - **ChainExplorer**: cached chain view plus address/block lookups
//! - **Console**: command dispatch table driving the components
//!
//! # Example
//!
//! ```ignore
//! use ledger_client::{ClientConfig, LedgerClient, TransactionSubmitter, WalletSession};
//!
//! let client = LedgerClient::new(&ClientConfig::from_env())?;
//! let mut session = WalletSession::new();
//! session.generate(&client).await?;
//!
//! let receipt = TransactionSubmitter::new(&client)
//!     .submit(&session, "recipient-address", "5")
//!     .await?;
//! println!("{}", receipt.result.message);
//! ```

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod explorer;
pub mod session;
pub mod submitter;
pub mod triggers;
pub mod types;

pub use client::LedgerClient;
pub use config::ClientConfig;
pub use console::{Command, Console, Flow, Status};
pub use error::ClientError;
pub use explorer::{ChainExplorer, Lookup};
pub use session::{Wallet, WalletSession};
pub use submitter::{
    Clock, SignedTransaction, SubmissionPhase, SystemClock, TransactionSubmitter, TransferIntent,
    TransferReceipt,
};
pub use triggers::{forge, mint, ActionReport, BlockOutcome};
pub use types::{ActionResult, AddressView, Amount, Block, ChainSnapshot, Timestamp};

// Common result type
pub type Result<T> = std::result::Result<T, ClientError>;
