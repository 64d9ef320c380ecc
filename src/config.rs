//! Configuration module
//!
//! Settings come from a TOML file with serde defaults for everything, so an
//! empty file (or none at all) yields a working devnet configuration.
//! Environment variables override the file; validation runs once at startup.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Solana RPC configuration
    #[serde(default)]
    pub rpc: RpcConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Commitment level: processed, confirmed or finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            commitment: default_commitment(),
            timeout_secs: default_rpc_timeout(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_string()
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_rpc_timeout() -> u64 {
    30
}

impl Config {
    /// Load from a TOML file, falling back to defaults when the file does
    /// not exist, then apply environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {path}"))?;
            toml::from_str(&raw).with_context(|| format!("failed to parse config file: {path}"))?
        } else {
            tracing::info!(path = %path, "config file not found, using defaults");
            Self::default()
        };

        if let Ok(url) = std::env::var("SOLANA_RPC_URL") {
            config.rpc.url = url;
        }
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        Ok(config)
    }

    /// Reject configurations that cannot possibly work.
    pub fn validate(&self) -> Result<()> {
        if !self.rpc.url.starts_with("http://") && !self.rpc.url.starts_with("https://") {
            bail!("rpc.url must be an http(s) URL, got {:?}", self.rpc.url);
        }
        if self.rpc.timeout_secs == 0 {
            bail!("rpc.timeout_secs must be greater than zero");
        }
        self.server
            .bind_addr
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("server.bind_addr is not a socket address: {:?}", self.server.bind_addr))?;
        self.commitment()?;
        Ok(())
    }

    /// Parsed commitment level.
    pub fn commitment(&self) -> Result<CommitmentConfig> {
        match self.rpc.commitment.as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => bail!("rpc.commitment must be processed, confirmed or finalized, got {other:?}"),
        }
    }
}
