//! `realtychat gateway` — Start the WebSocket relay server.

use realtychat_config::AppConfig;

pub async fn run(
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if let Some(host) = host_override {
        config.gateway.host = host;
    }

    println!("🏠 realtychat Gateway");
    println!("   Listening: ws://{}:{}/ws", config.gateway.host, config.gateway.port);
    println!("   Provider:  {}", config.default_provider);
    println!("   Model:     {}", config.effective_model());

    realtychat_gateway::start(config).await?;

    Ok(())
}
