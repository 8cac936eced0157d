//! `realtychat doctor` — Diagnose system health.

use realtychat_config::AppConfig;
use realtychat_core::error::ProviderError;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 realtychat Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ⚠️  No config file, using defaults");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    println!(
        "  ✅ Topic filter: {} keywords ({:?})",
        config.topic.keywords.len(),
        config.topic.match_mode
    );

    let router = realtychat_providers::router::build_from_config(&config);
    match router.default() {
        Some(provider) => match provider.health_check().await {
            Ok(true) => println!(
                "  ✅ Provider '{}' reachable (model {})",
                provider.name(),
                config.effective_model()
            ),
            Ok(false) => {
                println!("  ❌ Provider '{}' answered but is unhealthy", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        None => {
            let err = ProviderError::NotConfigured(config.default_provider.clone());
            println!("  ❌ {err}");
            issues += 1;
        }
    }

    if config.default_provider != "ollama" && !config.has_api_key() {
        println!(
            "  ⚠️  No API key set (REALTYCHAT_API_KEY, OPENAI_API_KEY or OPENROUTER_API_KEY)"
        );
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
