pub mod ask;
pub mod chat;
pub mod context;
pub mod doctor;
pub mod init;

use atombot_config::{AppConfig, ConfigError};
use std::path::{Path, PathBuf};

/// Where the config lives: `--config` or the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config (file + environment overrides).
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    AppConfig::load_with_env(&config_path(explicit))
}

/// Local backends answer without a key.
fn needs_api_key(kind: &str) -> bool {
    !kind.trim().eq_ignore_ascii_case("ollama")
}

/// Replies still work without a key (they fall back), but say why.
pub fn warn_if_no_api_key(config: &AppConfig) {
    if config.has_api_key() || !needs_api_key(&config.provider.kind) {
        return;
    }
    eprintln!();
    eprintln!("  WARNING: No API key configured, every reply will be the fallback message.");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    for var in atombot_config::API_KEY_ENV_VARS {
        eprintln!("    {var}");
    }
    eprintln!();
    eprintln!("  Or add api_key to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    eprintln!("  Get a Gemini key at: https://aistudio.google.com/apikey");
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_needs_no_key_in_any_spelling() {
        for kind in ["ollama", "Ollama", "  OLLAMA "] {
            assert!(!needs_api_key(kind), "{kind:?}");
        }
        assert!(needs_api_key("gemini"));
        assert!(needs_api_key("openai"));
    }
}
