use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::upstream::DEFAULT_BASE_URL;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Gateway runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Bearer credential for the upstream model provider
    pub api_key: String,
    /// Upstream chat-completions base URL
    pub base_url: String,
    /// Upstream model identifier
    pub model: String,
    /// Prebuilt single-page bundle served for non-API routes
    pub static_dir: PathBuf,
    /// Largest accepted request body, in bytes
    pub body_limit: usize,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("OPENAI_API_KEY must be set (environment or .env file)")?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let body_limit = match lookup("BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("BODY_LIMIT_BYTES is not a byte count: {raw}"))?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            api_key,
            base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("build")),
            body_limit,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
