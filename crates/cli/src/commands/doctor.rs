//! `atombot doctor`: Diagnose configuration health.

use std::path::Path;
use std::time::Duration;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 AtomBot Doctor — Diagnostics");
    println!("===============================\n");

    let mut issues = 0;

    let path = super::config_path(config_path);
    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file, using defaults (run `atombot init`)");
        issues += 1;
    }

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config file and re-run doctor.");
            return Ok(());
        }
    };

    println!("  •  Provider: {} ({})", config.provider.kind, config.provider.model);
    match config.assistant.history_window_turns {
        Some(n) => println!("  •  History window: last {n} turns"),
        None => println!("  •  History window: full conversation"),
    }

    let provider = match atombot_providers::build_from_config(&config) {
        Ok(provider) => Some(provider),
        Err(e) => {
            println!("  ❌ Provider: {e}");
            issues += 1;
            None
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
        if let Some(provider) = provider {
            match tokio::time::timeout(Duration::from_secs(10), provider.health_check()).await {
                Ok(Ok(true)) => println!("  ✅ {} reachable", provider.name()),
                Ok(Ok(false)) => {
                    println!("  ❌ {} rejected the health check (check the key)", provider.name());
                    issues += 1;
                }
                Ok(Err(e)) => {
                    println!("  ❌ {} unreachable: {e}", provider.name());
                    issues += 1;
                }
                Err(_) => {
                    println!("  ❌ {} health check timed out", provider.name());
                    issues += 1;
                }
            }
        }
    } else {
        println!("  ⚠️  No API key, replies will fall back (set GEMINI_API_KEY)");
        issues += 1;
    }

    match config.load_program() {
        Ok(program) => {
            let source = config
                .program_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "bundled".into());
            println!("  ✅ Program data loaded ({source})");
            println!(
                "  •  {} pricing plans, {} curriculum days, {} FAQ entries in {} categories",
                program.pricing.len(),
                program.curriculum.len(),
                program.faq.len(),
                program.faq_categories().len()
            );
            let empty = program.empty_sections();
            if !empty.is_empty() {
                println!("  ⚠️  Empty program sections: {}", empty.join(", "));
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Program data invalid: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
