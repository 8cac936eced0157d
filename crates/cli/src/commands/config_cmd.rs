//! `realtychat config` — Show the effective configuration.

use realtychat_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!(
        "# {}",
        AppConfig::config_dir().join("config.toml").display()
    );
    if config.has_api_key() {
        println!("# api key: set (hidden)");
    }
    println!("{}", config.to_redacted_toml());
    Ok(())
}
