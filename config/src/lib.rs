//! Veil Configuration
//!
//! Shared configuration crate for the harness binaries.
//!
//! Handles loading configuration from:
//! 1. VEIL_CONFIG env var (explicit path)
//! 2. ./config.toml (current directory)
//! 3. ~/.veil/config.toml (user home)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use std::{env, fs};
use veil_core::TableConfig;

/// Global config instance for convenience access
pub static GLOBAL_CONFIG: OnceLock<VeilConfig> = OnceLock::new();

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".veil";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";
const DEFAULT_PROGRAM_ID: &str = "PivyP11111111111111111111111111111111111111";
const DEFAULT_COMMITMENT: &str = "confirmed";

const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
const DEFAULT_BATCH_DELAY_MS: u64 = 500;
const DEFAULT_READBACK_ATTEMPTS: u32 = 10;
const DEFAULT_READBACK_INTERVAL_MS: u64 = 500;

const DEFAULT_AIRDROP_LAMPORTS: u64 = 2_000_000_000;

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VeilConfig {
    #[serde(default)]
    pub solana: SolanaConfig,
    #[serde(default)]
    pub table: TableTomlConfig,
    #[serde(default)]
    pub harness: HarnessConfig,
}

/// Solana connection and program configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_program_id")]
    pub program_id: String,
    /// Defaults to the payer when unset
    #[serde(default)]
    pub fee_recipient: Option<String>,
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            program_id: DEFAULT_PROGRAM_ID.into(),
            fee_recipient: None,
            commitment: DEFAULT_COMMITMENT.into(),
        }
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.into()
}
fn default_program_id() -> String {
    DEFAULT_PROGRAM_ID.into()
}
fn default_commitment() -> String {
    DEFAULT_COMMITMENT.into()
}

/// Lookup table lifecycle timing (TOML format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableTomlConfig {
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_readback_attempts")]
    pub readback_attempts: u32,
    #[serde(default = "default_readback_interval")]
    pub readback_interval_ms: u64,
}

impl Default for TableTomlConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            readback_attempts: DEFAULT_READBACK_ATTEMPTS,
            readback_interval_ms: DEFAULT_READBACK_INTERVAL_MS,
        }
    }
}

fn default_settle_delay() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}
fn default_batch_delay() -> u64 {
    DEFAULT_BATCH_DELAY_MS
}
fn default_readback_attempts() -> u32 {
    DEFAULT_READBACK_ATTEMPTS
}
fn default_readback_interval() -> u64 {
    DEFAULT_READBACK_INTERVAL_MS
}

/// Test harness settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Defaults to ~/.config/solana/id.json
    #[serde(default)]
    pub payer_keypair_path: Option<String>,
    /// Airdrop size; also the balance below which an airdrop is requested
    #[serde(default = "default_airdrop_lamports")]
    pub airdrop_lamports: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            payer_keypair_path: None,
            airdrop_lamports: DEFAULT_AIRDROP_LAMPORTS,
        }
    }
}

fn default_airdrop_lamports() -> u64 {
    DEFAULT_AIRDROP_LAMPORTS
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present
fn env_string(key: &str, field: &mut String) {
    if let Ok(v) = env::var(key) {
        *field = v;
    }
}

/// Set Option<String> from env var if present
fn env_option_string(key: &str, field: &mut Option<String>) {
    if let Ok(v) = env::var(key) {
        *field = Some(v);
    }
}

/// Set field from env var if present and parseable
fn env_parse<T: std::str::FromStr>(key: &str, field: &mut T) {
    if let Ok(v) = env::var(key) {
        if let Ok(parsed) = v.parse() {
            *field = parsed;
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl VeilConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::parse_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let mut config = Self::parse_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_file(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check VEIL_CONFIG env var
        if let Ok(path) = env::var("VEIL_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check ./config.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.veil/config.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Solana
        env_string("SOLANA_RPC_URL", &mut self.solana.rpc_url);
        env_string("VEIL_PROGRAM_ID", &mut self.solana.program_id);
        env_option_string("VEIL_FEE_RECIPIENT", &mut self.solana.fee_recipient);
        env_string("VEIL_COMMITMENT", &mut self.solana.commitment);

        // Table
        env_parse("VEIL_SETTLE_DELAY_MS", &mut self.table.settle_delay_ms);
        env_parse("VEIL_BATCH_DELAY_MS", &mut self.table.batch_delay_ms);
        env_parse("VEIL_READBACK_ATTEMPTS", &mut self.table.readback_attempts);

        // Harness
        env_option_string("PAYER_KEYPAIR", &mut self.harness.payer_keypair_path);
        env_parse("VEIL_AIRDROP_LAMPORTS", &mut self.harness.airdrop_lamports);
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        let mut sample = Self::default();
        sample.harness.payer_keypair_path = Some("~/.config/solana/id.json".into());
        toml::to_string_pretty(&sample).unwrap_or_default()
    }

    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.solana.program_id)
            .with_context(|| format!("Invalid program_id: {}", self.solana.program_id))
    }

    /// Configured fee recipient, or `fallback` when none is set
    pub fn fee_recipient_or(&self, fallback: Pubkey) -> Result<Pubkey> {
        match &self.solana.fee_recipient {
            Some(s) => Pubkey::from_str(s).with_context(|| format!("Invalid fee_recipient: {}", s)),
            None => Ok(fallback),
        }
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        parse_commitment(&self.solana.commitment)
    }

    /// Payer keypair path with `~` expanded
    pub fn payer_keypair_path(&self) -> PathBuf {
        let raw = self
            .harness
            .payer_keypair_path
            .clone()
            .unwrap_or_else(|| "~/.config/solana/id.json".into());

        match (raw.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(raw),
        }
    }

    /// Timing for the lookup table builder
    pub fn table_config(&self) -> Result<TableConfig> {
        Ok(TableConfig {
            commitment: self.commitment()?,
            settle_delay: Duration::from_millis(self.table.settle_delay_ms),
            batch_delay: Duration::from_millis(self.table.batch_delay_ms),
            readback_attempts: self.table.readback_attempts,
            readback_interval: Duration::from_millis(self.table.readback_interval_ms),
        })
    }

    /// Get the global config instance, initializing it if necessary.
    ///
    /// Falls back to defaults if loading fails.
    pub fn global() -> &'static VeilConfig {
        GLOBAL_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                log::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Initialize the global config with a specific instance.
    ///
    /// Returns `Err(config)` if already initialized.
    pub fn set_global(config: VeilConfig) -> Result<(), VeilConfig> {
        GLOBAL_CONFIG.set(config)
    }
}

fn parse_commitment(s: &str) -> Result<CommitmentConfig> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "processed" => CommitmentConfig::processed(),
        "confirmed" => CommitmentConfig::confirmed(),
        "finalized" => CommitmentConfig::finalized(),
        other => bail!("Unknown commitment level: {}", other),
    })
}

// ============================================================================
// Tests
// ============================================================================
