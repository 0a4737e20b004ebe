//! Mint and forge actions
//!
//! Both are a single precondition-gated call crediting the active wallet.
//! Whether a block came out of it is decided by [`BlockOutcome::detect`];
//! when it did, the caller refreshes the explorer.

use crate::client::LedgerClient;
use crate::error::ClientError;
use crate::session::WalletSession;
use crate::types::{ActionResult, ForgeRequest, MintRequest};
use crate::Result;

/// Explicit status value a ledger may report for a produced block
pub const STATUS_BLOCK_FORGED: &str = "blockForged";

/// Legacy marker in the mint result message
pub const MINT_FORGED_MARKER: &str = "New Block Forged";

/// Legacy marker in the forge result message
pub const FORGE_FORGED_MARKER: &str = "Forged";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOutcome {
    Forged,
    NoBlock,
}

impl BlockOutcome {
    /// Decide whether a result record reports a new block
    ///
    /// An explicit `status` field wins. Without one, fall back to looking for
    /// `legacy_marker` in the human-readable message.
    pub fn detect(result: &ActionResult, legacy_marker: &str) -> Self {
        let forged = match result.status.as_deref() {
            Some(status) => status == STATUS_BLOCK_FORGED,
            None => result.message.contains(legacy_marker),
        };
        if forged {
            Self::Forged
        } else {
            Self::NoBlock
        }
    }

    pub fn block_produced(&self) -> bool {
        matches!(self, Self::Forged)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActionReport {
    pub outcome: BlockOutcome,
    pub result: ActionResult,
}

/// Submit a puzzle solution, crediting the reward to the active wallet
pub async fn mint(
    client: &LedgerClient,
    session: &WalletSession,
    secret_phrase: &str,
) -> Result<ActionReport> {
    let wallet = session.require()?;
    let secret_phrase = secret_phrase.trim();
    if secret_phrase.is_empty() {
        return Err(ClientError::precondition("Enter a secret phrase."));
    }

    let result = client
        .mint(&MintRequest {
            solver_address: wallet.address(),
            secret_phrase,
        })
        .await?;

    let outcome = BlockOutcome::detect(&result, MINT_FORGED_MARKER);
    if outcome.block_produced() {
        log::info!("⛏️  Mint produced a block for {}", wallet.address());
    }
    Ok(ActionReport { outcome, result })
}

/// Forge a block from pending transactions, crediting fees to the active wallet
pub async fn forge(client: &LedgerClient, session: &WalletSession) -> Result<ActionReport> {
    let wallet = session.require()?;

    let result = client
        .forge(&ForgeRequest {
            forger_address: wallet.address(),
        })
        .await?;

    let outcome = BlockOutcome::detect(&result, FORGE_FORGED_MARKER);
    if outcome.block_produced() {
        log::info!("🔨 Forged a block for {}", wallet.address());
    }
    Ok(ActionReport { outcome, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(value: serde_json::Value) -> ActionResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_legacy_message_markers() {
        let minted = result(json!({"message": "New Block Forged!", "block_index": 2}));
        assert_eq!(BlockOutcome::detect(&minted, MINT_FORGED_MARKER), BlockOutcome::Forged);

        let forged = result(json!({"message": "Transaction Block Forged!"}));
        assert_eq!(BlockOutcome::detect(&forged, FORGE_FORGED_MARKER), BlockOutcome::Forged);
        assert_eq!(BlockOutcome::detect(&forged, MINT_FORGED_MARKER), BlockOutcome::NoBlock);
    }

    #[test]
    fn test_explicit_status_wins() {
        let noop = result(json!({"message": "New Block Forged!", "status": "noop"}));
        assert_eq!(BlockOutcome::detect(&noop, MINT_FORGED_MARKER), BlockOutcome::NoBlock);

        let forged = result(json!({"message": "ok", "status": "blockForged"}));
        assert!(BlockOutcome::detect(&forged, FORGE_FORGED_MARKER).block_produced());
    }
}
