//! Configuration management for the swap widget
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_RECEIVER_ADDRESS: &str = "2wiiqCs3DeGz1FcvyNuWtDDusJ2QymjfXWEji5QdjtFy";
pub const DEFAULT_TOKEN_MINT: &str = "9vgjUHcRPdBGXDR6UqesCd6CXQDAsv6oCRgBz21nbbgH";
/// 1 SOL buys this many CHE
pub const DEFAULT_EXCHANGE_RATE: u32 = 100;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub network: NetworkConfig,
    pub swap: SwapConfig,
    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub commitment: Commitment,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn to_config(self) -> CommitmentConfig {
        match self {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapConfig {
    pub receiver_address: String,
    /// Mint of the credited token. Not part of the payment leg.
    pub token_mint: String,
    pub exchange_rate: Decimal,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
}

/// Which transaction outcomes are mirrored to the hosting frame
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub notify_success: bool,
    #[serde(default = "default_true")]
    pub notify_failure: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            notify_success: false,
            notify_failure: true,
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_native_symbol() -> String {
    "SOL".to_string()
}

fn default_token_symbol() -> String {
    "CHE".to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Load settings from the file named by `CHEESE_SWAP_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = env::var("CHEESE_SWAP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::from_toml(&config_str)
    }

    /// Parse settings from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(raw);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Built-in devnet constants
    pub fn devnet_defaults() -> Self {
        Self {
            network: NetworkConfig {
                rpc_urls: vec![DEVNET_RPC_URL.to_string()],
                commitment: Commitment::Confirmed,
                request_timeout_ms: default_request_timeout_ms(),
            },
            swap: SwapConfig {
                receiver_address: DEFAULT_RECEIVER_ADDRESS.to_string(),
                token_mint: DEFAULT_TOKEN_MINT.to_string(),
                exchange_rate: Decimal::from(DEFAULT_EXCHANGE_RATE),
                native_symbol: default_native_symbol(),
                token_symbol: default_token_symbol(),
            },
            host: HostConfig::default(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_urls.is_empty() {
            anyhow::bail!("At least one RPC URL must be configured");
        }

        self.receiver()?;
        self.token_mint()?;

        if self.swap.exchange_rate <= Decimal::ZERO {
            anyhow::bail!(
                "Exchange rate must be positive, got {}",
                self.swap.exchange_rate
            );
        }

        if !self.host.notify_failure {
            tracing::warn!("Transaction failures will not be reported to the host frame");
        }

        Ok(())
    }

    /// Fixed address receiving the SOL payment
    pub fn receiver(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.swap.receiver_address)
            .with_context(|| format!("Invalid receiver address: {}", self.swap.receiver_address))
    }

    pub fn token_mint(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.swap.token_mint)
            .with_context(|| format!("Invalid token mint: {}", self.swap.token_mint))
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    lazy_static::lazy_static! {
        static ref ENV_VAR: regex::Regex =
            regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    }

    ENV_VAR
        .replace_all(input, |cap: &regex::Captures| {
            env::var(&cap[1]).unwrap_or_default()
        })
        .into_owned()
}
