//! Wallet session
//!
//! Holds the one active wallet for the lifetime of the process. The only way
//! a key pair enters the session is [`WalletSession::generate`]; there is no
//! import path and nothing is written to disk. The key is dropped with the
//! session.

use std::fmt;

use crate::client::LedgerClient;
use crate::error::ClientError;
use crate::Result;

/// Message shown when an action needs a wallet and none is active
pub const NO_WALLET: &str = "No active wallet. Generate a wallet first.";

/// Address/private-key pair issued by the ledger
pub struct Wallet {
    address: String,
    private_key: String,
}

impl Wallet {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Only for the signing request and the one-time display after issuance
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct WalletSession {
    active: Option<Wallet>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the ledger for a fresh wallet and make it the active one
    ///
    /// On failure the session keeps whatever it had before.
    pub async fn generate(&mut self, client: &LedgerClient) -> Result<&Wallet> {
        let issued = client.issue_wallet().await.map_err(|e| {
            log::warn!("Wallet issuance failed: {}", e);
            e
        })?;

        if issued.public_address.trim().is_empty() || issued.private_key.trim().is_empty() {
            return Err(ClientError::InvalidResponse(
                "wallet issuance returned an empty address or key".into(),
            ));
        }

        log::info!("🔑 New wallet issued: {}", issued.public_address);
        let wallet = self.active.insert(Wallet {
            address: issued.public_address,
            private_key: issued.private_key,
        });
        Ok(wallet)
    }

    pub fn current(&self) -> Option<&Wallet> {
        self.active.as_ref()
    }

    /// The active wallet, or the precondition error every dependent action reports
    pub fn require(&self) -> Result<&Wallet> {
        self.current()
            .ok_or_else(|| ClientError::precondition(NO_WALLET))
    }
}
