use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Telegram bot token. May be left empty, in which case delivery fails
    /// at send time with a clear error.
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret for webhook signature validation. When unset, all
    /// deliveries are accepted without a signature check.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default = "default_api_base")]
    pub telegram_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            port: default_port(),
            webhook_secret: None,
            telegram_api_base: default_api_base(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Config {
    /// Loads configuration from an optional TOML file, then applies
    /// environment overrides: BOT_TOKEN, PORT, WEBHOOK_SECRET and
    /// TELEGRAM_API_BASE.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        if let Ok(token) = std::env::var("BOT_TOKEN") {
            config.bot_token = token;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }
        if let Ok(secret) = std::env::var("WEBHOOK_SECRET") {
            if !secret.is_empty() {
                config.webhook_secret = Some(secret);
            }
        }
        if let Ok(base) = std::env::var("TELEGRAM_API_BASE") {
            config.telegram_api_base = base;
        }

        Ok(config)
    }
}
