//! `atombot init`: First-time setup.

use atombot_config::{AppConfig, ProgramData};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = super::config_path(config_path);
    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_dir);
    let program_path = config_dir.join("program.toml");

    println!("🤖 AtomBot — First-Time Setup");
    println!("=============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if program_path.exists() {
        println!("  Program data exists: {}", program_path.display());
    } else {
        std::fs::write(&program_path, ProgramData::bundled_toml())?;
        println!("✅ Created program.toml at: {}", program_path.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
    } else {
        let config = AppConfig {
            program_file: Some(program_path.clone()),
            ..AppConfig::default()
        };
        std::fs::write(&config_path, config.to_toml()?)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set GEMINI_API_KEY or add api_key to {}", config_path.display());
        println!("   2. Edit {} with this year's program details", program_path.display());
        println!("   3. Run: atombot chat\n");
    }

    println!("🎉 Setup complete! Run `atombot chat` to start chatting.\n");

    Ok(())
}
