//! `realtychat chat` — Interactive or single-message chat through the relay.
//!
//! Runs the same [`Relay`] the gateway uses, with the terminal standing in for
//! the browser. `/end` ends the session; `exit` quits.

use realtychat_config::AppConfig;
use realtychat_core::error::ProviderError;
use realtychat_core::message::ConnectionId;
use realtychat_relay::{ConnectionSession, Relay};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let router = realtychat_providers::router::build_from_config(&config);
    let provider = router
        .default()
        .ok_or_else(|| ProviderError::NotConfigured(config.default_provider.clone()))?;

    let relay = Relay::from_config(provider, &config);
    let mut session = ConnectionSession::new(ConnectionId::from("terminal"));
    let connected = relay.on_connect(&mut session);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = relay.on_message(&mut session, &msg).await;
        eprint!("\r              \r");
        println!("{}", reply.message());
        return Ok(());
    }

    println!();
    println!("  {}", connected.message());
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.effective_model());
    println!("  Window:    {} turns", config.relay.history_window);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/end' to start over, 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "exit" | "quit" => break,
            "/end" => {
                let ended = relay.on_end(&mut session);
                println!("  {}", ended.message());
                println!();
            }
            query => {
                eprint!("  ...");
                let reply = relay.on_message(&mut session, query).await;
                eprint!("\r     \r");
                println!();
                for text in reply.message().lines() {
                    println!("  Assistant > {text}");
                }
                println!();
            }
        }
        prompt()?;
    }

    relay.on_disconnect(&mut session);
    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
