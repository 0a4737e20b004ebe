//! Console dispatch integration tests
//!
//! Feeds command lines through the dispatch table and checks the status area
//! and the requests the ledger received.

mod common;

use common::TestLedger;
use ledger_client::{Console, Flow, Status};
use ledger_client::Lookup;
use ledger_mock::{Faults, DEFAULT_MINT_SOLUTION};

fn info(console: &Console) -> String {
    match console.status() {
        Status::Info(text) => text.clone(),
        other => panic!("expected info status, got {:?}", other),
    }
}

fn error(console: &Console) -> String {
    match console.status() {
        Status::Error(text) => text.clone(),
        other => panic!("expected error status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_start_loads_chain() {
    let env = TestLedger::start().await;
    let mut console = Console::new(&env.config).unwrap();

    console.start().await;
    assert!(info(&console).starts_with("Chain length: 1\nBlock #0"));
    assert_eq!(env.ledger.calls_to("/chain"), 1);
}

#[tokio::test]
async fn test_wallet_send_forge_session() {
    let env = TestLedger::start().await;
    let mut console = Console::new(&env.config).unwrap();

    assert_eq!(console.handle_line("wallet").await, Flow::Continue);
    let address = console.session().current().unwrap().address().to_string();
    let shown = info(&console);
    assert!(shown.contains(&address));
    assert!(shown.contains(console.session().current().unwrap().private_key()));

    console.handle_line("whoami").await;
    assert_eq!(info(&console), format!("Active wallet: {}", address));

    console.handle_line("send B2 3").await;
    assert!(info(&console).contains("Transaction will be added to the next Block."));
    assert_eq!(env.ledger.pending_count(), 1);

    console.handle_line("forge").await;
    let shown = info(&console);
    assert!(shown.contains("Transaction Block Forged!"));
    // A produced block refreshes the explorer
    assert!(shown.contains("Chain length: 2"));
    assert_eq!(console.explorer().snapshot().unwrap().length, 2);

    console.handle_line("address B2").await;
    assert!(info(&console).contains("Balance: 3"));

    assert_eq!(console.handle_line("quit").await, Flow::Quit);
}

#[tokio::test]
async fn test_mint_refreshes_chain() {
    let env = TestLedger::start().await;
    let mut console = Console::new(&env.config).unwrap();
    console.handle_line("wallet").await;

    console
        .handle_line(&format!("mint {}", DEFAULT_MINT_SOLUTION))
        .await;
    assert!(info(&console).contains("New Block Forged!"));
    assert_eq!(env.ledger.calls_to("/chain"), 1);

    console.handle_line("mint not-it").await;
    assert!(error(&console).contains("Minting failed"));
    assert_eq!(env.ledger.calls_to("/chain"), 1);
}

#[tokio::test]
async fn test_commands_without_wallet_stay_local() {
    let env = TestLedger::start().await;
    let mut console = Console::new(&env.config).unwrap();

    for line in ["send B2 5", "mint GENESIS123", "forge", "whoami"] {
        console.handle_line(line).await;
        assert!(
            error(&console).contains("Generate a wallet first"),
            "{} gave {:?}",
            line,
            console.status()
        );
    }
    assert_eq!(env.call_count(), 0);
}

#[tokio::test]
async fn test_bad_lines_show_usage() {
    let env = TestLedger::start().await;
    let mut console = Console::new(&env.config).unwrap();

    console.handle_line("send B2").await;
    assert!(error(&console).contains("usage: send <recipient> <amount>"));

    console.handle_line("block latest").await;
    assert!(error(&console).contains("block index 'latest'"));

    console.handle_line("peers add").await;
    assert!(error(&console).contains("at least one peer URL"));

    assert_eq!(env.call_count(), 0);
}

#[tokio::test]
async fn test_peer_commands() {
    let env = TestLedger::start().await;
    let mut console = Console::new(&env.config).unwrap();

    console
        .handle_line("peers add http://10.0.0.2:5000 http://10.0.0.3:5000")
        .await;
    let shown = info(&console);
    assert!(shown.contains("New nodes have been added"));
    assert!(shown.contains("http://10.0.0.3:5000"));

    console.handle_line("peers resolve").await;
    let shown = info(&console);
    assert!(shown.contains("Our chain is authoritative"));
    assert!(shown.contains("\"chain_length\": 1"));
    // The chain was kept, so no refresh
    assert_eq!(env.ledger.calls_to("/chain"), 0);
}

#[tokio::test]
async fn test_explorer_failures_reach_status_area() {
    let env = TestLedger::start().await;
    let mut console = Console::new(&env.config).unwrap();
    console.start().await;
    console.handle_line("block 0").await;
    assert!(info(&console).starts_with("Block #0"));

    env.set_faults(Faults {
        fail_chain: true,
        ..Default::default()
    });
    console.handle_line("chain").await;
    let shown = error(&console);
    assert!(shown.starts_with("Could not load chain data."));
    assert!(shown.contains("503"));
    assert_eq!(console.explorer().snapshot().unwrap().length, 1);

    console.handle_line("block 7").await;
    assert!(error(&console).contains("Failed to fetch block #7."));
    assert!(matches!(
        console.explorer().last_view(),
        Some(Lookup::Block(block)) if block.index == 0
    ));

    console.handle_line("address nobody").await;
    assert!(info(&console).contains("No transactions found for this address."));
}

#[tokio::test]
async fn test_start_reports_unavailable_chain() {
    let env = TestLedger::start().await;
    env.set_faults(Faults {
        fail_chain: true,
        ..Default::default()
    });
    let mut console = Console::new(&env.config).unwrap();

    console.start().await;
    assert!(error(&console).contains("Chain temporarily unavailable"));
    assert!(console.explorer().snapshot().is_none());
}
