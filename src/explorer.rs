//! Chain explorer
//!
//! Read-only views of the ledger. The chain cache is replaced wholesale on
//! every successful refresh and left untouched on a failed one; failures end
//! up in a banner instead of propagating. Address and block lookups are
//! independent of the cache and follow the same split: the last successful
//! view stays in place when a later lookup fails.

use crate::client::LedgerClient;
use crate::error::ClientError;
use crate::types::{AddressView, Block, ChainSnapshot};

/// Banner shown when the chain cannot be loaded
pub const CHAIN_UNAVAILABLE: &str = "Could not load chain data.";

/// Outcome of one address or block lookup
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Address(AddressView),
    Block(Block),
    Failed(String),
}

pub struct ChainExplorer {
    recent_limit: usize,
    cache: Option<ChainSnapshot>,
    banner: Option<String>,
    /// Last successful lookup; never `Lookup::Failed`
    view: Option<Lookup>,
    lookup_error: Option<String>,
}

impl ChainExplorer {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            recent_limit,
            cache: None,
            banner: None,
            view: None,
            lookup_error: None,
        }
    }

    /// Fetch the full chain and replace the cache
    ///
    /// Returns whether the cache was replaced.
    pub async fn refresh(&mut self, client: &LedgerClient) -> bool {
        match client.fetch_chain().await {
            Ok(snapshot) => {
                log::debug!("Chain refreshed, length {}", snapshot.length);
                self.cache = Some(snapshot);
                self.banner = None;
                true
            }
            Err(e) => {
                log::warn!("Chain refresh failed: {}", e);
                self.banner = Some(format!("{} {}", CHAIN_UNAVAILABLE, e));
                false
            }
        }
    }

    /// Fetch the ledger's view of one address
    pub async fn lookup_address(&mut self, client: &LedgerClient, address: &str) -> Lookup {
        let address = address.trim();
        let lookup = if address.is_empty() {
            Lookup::Failed(ClientError::validation("address is required").to_string())
        } else {
            match client.fetch_address(address).await {
                Ok(view) => Lookup::Address(view),
                Err(e) => {
                    log::warn!("Address lookup for {} failed: {}", address, e);
                    Lookup::Failed(format!("Failed to fetch data for address \"{}\". {}", address, e))
                }
            }
        };
        self.settle(lookup)
    }

    /// Fetch a single block by index
    pub async fn lookup_block(&mut self, client: &LedgerClient, index: u64) -> Lookup {
        let lookup = match client.fetch_block(index).await {
            Ok(block) => Lookup::Block(block),
            Err(e) => {
                log::warn!("Block lookup for #{} failed: {}", index, e);
                Lookup::Failed(format!("Failed to fetch block #{}. {}", index, e))
            }
        };
        self.settle(lookup)
    }

    pub fn snapshot(&self) -> Option<&ChainSnapshot> {
        self.cache.as_ref()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// The last address or block view that loaded successfully
    pub fn last_view(&self) -> Option<&Lookup> {
        self.view.as_ref()
    }

    /// Error of the most recent lookup, cleared by the next successful one
    pub fn lookup_error(&self) -> Option<&str> {
        self.lookup_error.as_deref()
    }

    fn settle(&mut self, lookup: Lookup) -> Lookup {
        match &lookup {
            Lookup::Failed(message) => self.lookup_error = Some(message.clone()),
            found => {
                self.view = Some(found.clone());
                self.lookup_error = None;
            }
        }
        lookup
    }

    /// Most recent blocks, newest first
    pub fn recent_blocks(&self) -> Vec<&Block> {
        match &self.cache {
            Some(snapshot) => snapshot
                .chain
                .iter()
                .rev()
                .take(self.recent_limit)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Text rendering of the recent slice, banner first
    pub fn render_chain(&self) -> String {
        let mut out = String::new();
        if let Some(banner) = &self.banner {
            out.push_str(&format!("[!] {}\n", banner));
        }
        match &self.cache {
            Some(snapshot) => {
                out.push_str(&format!("Chain length: {}\n", snapshot.length));
                for block in self.recent_blocks() {
                    out.push_str(&render_block(block));
                }
            }
            None if self.banner.is_none() => out.push_str("Chain not loaded yet.\n"),
            None => {}
        }
        out
    }
}

pub fn render_block(block: &Block) -> String {
    let body = serde_json::to_string_pretty(block).unwrap_or_else(|_| format!("{:?}", block));
    format!("Block #{}\n{}\n", block.index, body)
}

pub fn render_lookup(lookup: &Lookup) -> String {
    match lookup {
        Lookup::Address(view) => {
            let mut out = format!(
                "Address: {}\nBalance: {}\nTotal Transactions: {}\n",
                view.address, view.balance, view.transaction_count
            );
            if view.transactions.is_empty() {
                out.push_str("No transactions found for this address.\n");
            } else {
                for tx in &view.transactions {
                    let body = serde_json::to_string_pretty(tx).unwrap_or_else(|_| tx.to_string());
                    out.push_str(&body);
                    out.push('\n');
                }
            }
            out
        }
        Lookup::Block(block) => render_block(block),
        Lookup::Failed(message) => format!("Error: {}\n", message),
    }
}
