//! Command dispatch for the interactive console
//!
//! Each user intent is parsed into a [`Command`] and routed to exactly one
//! component operation. Whatever happens, the command ends with one update
//! of the status area; component errors stop here.

use std::fmt;

use serde::Serialize;

use crate::client::LedgerClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::explorer::{render_lookup, ChainExplorer, Lookup, CHAIN_UNAVAILABLE};
use crate::session::WalletSession;
use crate::submitter::TransactionSubmitter;
use crate::triggers::{self, ActionReport};
use crate::types::ActionResult;
use crate::Result;

/// Command names with their usage, in help order
pub const COMMANDS: &[(&str, &str)] = &[
    ("wallet", "generate a new wallet and make it active"),
    ("whoami", "show the active wallet address"),
    ("send <recipient> <amount>", "sign and submit a transfer"),
    ("mint <secret phrase>", "submit a puzzle solution for the mint reward"),
    ("forge", "forge a block from pending transactions"),
    ("chain", "refresh and show the most recent blocks"),
    ("address <address>", "show balance and transactions of an address"),
    ("block <index>", "show a single block"),
    ("peers add <url>...", "register peer nodes with the ledger"),
    ("peers resolve", "ask the ledger to adopt the longest known chain"),
    ("help", "show this list"),
    ("quit", "leave the console"),
];

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    GenerateWallet,
    WhoAmI,
    Send { recipient: String, amount: String },
    Mint { secret_phrase: String },
    Forge,
    RefreshChain,
    Address(String),
    Block(u64),
    AddPeers(Vec<String>),
    ResolvePeers,
    Help,
    Quit,
}

impl Command {
    /// Parse one console line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("wallet", []) => Command::GenerateWallet,
            ("whoami", []) => Command::WhoAmI,
            ("send", [recipient, amount]) => Command::Send {
                recipient: recipient.to_string(),
                amount: amount.to_string(),
            },
            ("mint", _) => Command::Mint {
                secret_phrase: rest.to_string(),
            },
            ("forge", []) => Command::Forge,
            ("chain", []) => Command::RefreshChain,
            ("address", [address]) => Command::Address(address.to_string()),
            ("block", [index]) => Command::Block(index.parse().map_err(|_| {
                ClientError::validation(format!("block index '{}' is not a number", index))
            })?),
            ("peers", ["add", urls @ ..]) => {
                Command::AddPeers(urls.iter().map(|u| u.to_string()).collect())
            }
            ("peers", ["resolve"]) => Command::ResolvePeers,
            ("help", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (other, _) => return Err(ClientError::validation(usage_for(other))),
        };
        Ok(Some(command))
    }
}

fn usage_for(name: &str) -> String {
    match COMMANDS.iter().find(|(usage, _)| usage.split(' ').next() == Some(name)) {
        Some((usage, _)) => format!("usage: {}", usage),
        None => format!("unknown command '{}', try 'help'", name),
    }
}

pub fn help_text() -> String {
    COMMANDS
        .iter()
        .map(|(usage, about)| format!("  {:<28} {}", usage, about))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The single place results and errors are shown
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Empty,
    Info(String),
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Empty => Ok(()),
            Status::Info(text) => write!(f, "{}", text),
            Status::Error(text) => write!(f, "Error: {}", text),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    client: LedgerClient,
    session: WalletSession,
    explorer: ChainExplorer,
    status: Status,
}

impl Console {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: LedgerClient::new(config)?,
            session: WalletSession::new(),
            explorer: ChainExplorer::new(config.recent_blocks),
            status: Status::Empty,
        })
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn explorer(&self) -> &ChainExplorer {
        &self.explorer
    }

    /// Initial chain load, as on opening the page
    pub async fn start(&mut self) {
        self.status = self.refresh_chain().await;
    }

    /// Parse and run one line
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        match Command::parse(line) {
            Ok(Some(command)) => self.dispatch(command).await,
            Ok(None) => Flow::Continue,
            Err(e) => {
                self.status = Status::Error(e.to_string());
                Flow::Continue
            }
        }
    }

    pub async fn dispatch(&mut self, command: Command) -> Flow {
        log::debug!("Dispatching {:?}", command);
        let outcome = match command {
            Command::Quit => return Flow::Quit,
            Command::Help => Ok(help_text()),
            Command::GenerateWallet => self.generate_wallet().await,
            Command::WhoAmI => self
                .session
                .require()
                .map(|wallet| format!("Active wallet: {}", wallet.address())),
            Command::Send { recipient, amount } => self.send(&recipient, &amount).await,
            Command::Mint { secret_phrase } => {
                let report = triggers::mint(&self.client, &self.session, &secret_phrase).await;
                self.after_block_action(report).await
            }
            Command::Forge => {
                let report = triggers::forge(&self.client, &self.session).await;
                self.after_block_action(report).await
            }
            Command::AddPeers(urls) => self.add_peers(urls).await,
            Command::ResolvePeers => self.resolve_peers().await,
            // The explorer keeps its own errors; these only pick the status
            Command::RefreshChain => {
                self.status = self.refresh_chain().await;
                return Flow::Continue;
            }
            Command::Address(address) => {
                let lookup = self.explorer.lookup_address(&self.client, &address).await;
                self.status = lookup_status(&lookup);
                return Flow::Continue;
            }
            Command::Block(index) => {
                let lookup = self.explorer.lookup_block(&self.client, index).await;
                self.status = lookup_status(&lookup);
                return Flow::Continue;
            }
        };

        self.status = match outcome {
            Ok(text) => Status::Info(text),
            Err(e) => {
                if e.is_local() {
                    log::debug!("Command refused: {}", e);
                } else {
                    log::warn!("Command failed: {}", e);
                }
                Status::Error(e.to_string())
            }
        };
        Flow::Continue
    }

    /// Refresh the explorer; a failure reports the banner as an error
    async fn refresh_chain(&mut self) -> Status {
        if self.explorer.refresh(&self.client).await {
            return Status::Info(self.explorer.render_chain());
        }
        match self.explorer.banner() {
            Some(banner) => Status::Error(banner.to_string()),
            None => Status::Error(CHAIN_UNAVAILABLE.to_string()),
        }
    }

    async fn generate_wallet(&mut self) -> Result<String> {
        let wallet = self.session.generate(&self.client).await?;
        Ok(format!(
            "Address: {}\nPrivate key (shown once, keep it safe): {}",
            wallet.address(),
            wallet.private_key()
        ))
    }

    async fn send(&self, recipient: &str, amount: &str) -> Result<String> {
        let mut submitter = TransactionSubmitter::new(&self.client);
        let receipt = submitter.submit(&self.session, recipient, amount).await?;
        Ok(pretty(&receipt.result))
    }

    async fn after_block_action(&mut self, report: Result<ActionReport>) -> Result<String> {
        let report = report?;
        let mut text = pretty(&report.result);
        if report.outcome.block_produced() {
            self.explorer.refresh(&self.client).await;
            text.push_str("\n\n");
            text.push_str(&self.explorer.render_chain());
        }
        Ok(text)
    }

    async fn add_peers(&self, urls: Vec<String>) -> Result<String> {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(ClientError::validation("at least one peer URL is required"));
        }
        let result = self.client.register_nodes(&urls).await?;
        log::info!("Registered {} peer(s)", urls.len());
        Ok(pretty(&result))
    }

    async fn resolve_peers(&mut self) -> Result<String> {
        let result = self.client.resolve_chain().await?;
        let mut text = pretty(&summarize_resolution(&result));
        if chain_replaced(&result) {
            self.explorer.refresh(&self.client).await;
            text.push_str("\n\n");
            text.push_str(&self.explorer.render_chain());
        }
        Ok(text)
    }
}

fn lookup_status(lookup: &Lookup) -> Status {
    match lookup {
        Lookup::Failed(message) => Status::Error(message.clone()),
        found => Status::Info(render_lookup(found)),
    }
}

/// Whether a resolve answer reports that the ledger adopted another chain
pub fn chain_replaced(result: &ActionResult) -> bool {
    result.extra.contains_key("new_chain") || result.message.contains("replaced")
}

/// Resolve answers carry the whole chain; show only its length
fn summarize_resolution(result: &ActionResult) -> ActionResult {
    let mut summary = result.clone();
    for key in ["chain", "new_chain"] {
        if let Some(chain) = summary.extra.remove(key) {
            let length = chain.as_array().map(|blocks| blocks.len()).unwrap_or(0);
            summary
                .extra
                .insert(format!("{}_length", key), serde_json::Value::from(length));
        }
    }
    summary
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable result: {}>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  ").unwrap(), None);
        assert_eq!(
            Command::parse("send B2 5").unwrap(),
            Some(Command::Send {
                recipient: "B2".into(),
                amount: "5".into()
            })
        );
        assert_eq!(
            Command::parse("mint ETERNAL 123").unwrap(),
            Some(Command::Mint {
                secret_phrase: "ETERNAL 123".into()
            })
        );
        assert_eq!(Command::parse("BLOCK 3").unwrap(), Some(Command::Block(3)));
        assert_eq!(
            Command::parse("peers add http://a:5000 http://b:5000").unwrap(),
            Some(Command::AddPeers(vec![
                "http://a:5000".into(),
                "http://b:5000".into()
            ]))
        );
    }

    #[test]
    fn test_parse_errors_show_usage() {
        let err = Command::parse("send B2").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: usage: send <recipient> <amount>");

        let err = Command::parse("teleport").unwrap_err();
        assert!(err.to_string().contains("unknown command 'teleport'"));

        assert!(Command::parse("block tip").is_err());
    }

    #[test]
    fn test_resolution_summary_and_detection() {
        let replaced: ActionResult = serde_json::from_value(json!({
            "message": "Our chain was replaced",
            "new_chain": [{"index": 0}, {"index": 1}]
        }))
        .unwrap();
        assert!(chain_replaced(&replaced));
        let summary = summarize_resolution(&replaced);
        assert_eq!(summary.extra.get("new_chain_length"), Some(&json!(2)));
        assert!(summary.extra.get("new_chain").is_none());

        let kept: ActionResult = serde_json::from_value(json!({
            "message": "Our chain is authoritative",
            "chain": []
        }))
        .unwrap();
        assert!(!chain_replaced(&kept));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Error("boom".into()).to_string(), "Error: boom");
        assert_eq!(Status::Empty.to_string(), "");
    }
}
