/// Mock Ledger Server
///
/// Serves the ledger API from memory for local use of the console.

use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;

use ledger_mock::{run_server, MockLedger, DEFAULT_MINT_SOLUTION};

#[derive(Debug)]
struct Config {
    server_host: String,
    server_port: u16,
    mint_solution: String,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let server_host = env::var("MOCK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("MOCK_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("Invalid MOCK_PORT")?;

        let mint_solution =
            env::var("MOCK_MINT_SOLUTION").unwrap_or_else(|_| DEFAULT_MINT_SOLUTION.to_string());

        Ok(Self {
            server_host,
            server_port,
            mint_solution,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting mock ledger...");

    let config = Config::from_env().context("Failed to load configuration")?;
    log::info!("Mint solution: {}", config.mint_solution);

    let ledger = Arc::new(MockLedger::new(config.mint_solution));

    run_server(ledger, config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
