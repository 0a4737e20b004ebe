use anyhow::Context;
use ledger_client::{ClientConfig, Console, Flow};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // RUST_LOG=debug for request-level output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ClientConfig::from_env();
    let mut console = Console::new(&config).context("Failed to create ledger client")?;

    log::info!("Connecting to ledger at {}", config.ledger_url);
    console.start().await;
    println!("{}", console.status());
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"ledger> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        if console.handle_line(&line).await == Flow::Quit {
            break;
        }
        if !line.trim().is_empty() {
            println!("{}", console.status());
        }
    }

    log::info!("Session closed, wallet discarded");
    Ok(())
}
