//! Neutron configuration

use crate::types::{Address, Timestamp};
use crate::utils::logging::LoggingConfig;
use ::config::{Config, File};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default faucet cooldown: one day
pub const DEFAULT_LOCKTIME: Timestamp = 86_400;

/// Coinbase address used when no miner is configured
pub const DEFAULT_MINER: Address = Address([
    0xc0, 0x14, 0xba, 0x5e, 0xc0, 0x14, 0xba, 0x5e, 0xc0, 0x14, 0xba, 0x5e, 0xc0, 0x14, 0xba,
    0x5e, 0xc0, 0x14, 0xba, 0x5e,
]);

/// Token deployment parameters, in human units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Supply cap
    pub cap: u64,
    /// Block reward minted to the miner on each transfer
    pub reward: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            cap: 100_000_000,
            reward: 50,
        }
    }
}

/// Faucet deployment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetSettings {
    /// Amount handed out per request, in scaled units
    pub amount_allowed: u64,
    /// Cooldown between requests from the same address (seconds)
    pub locktime_secs: Timestamp,
}

impl Default for FaucetSettings {
    fn default() -> Self {
        Self {
            amount_allowed: 25,
            locktime_secs: DEFAULT_LOCKTIME,
        }
    }
}

/// Execution context parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Account credited with block rewards
    pub miner: Address,
    /// Directory holding the state database
    pub data_dir: PathBuf,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            miner: DEFAULT_MINER,
            data_dir: PathBuf::from("./neutron_data"),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutronConfig {
    pub token: TokenConfig,
    pub faucet: FaucetSettings,
    pub chain: ChainConfig,
    pub logging: LoggingConfig,
}

impl NeutronConfig {
    /// Load from `path`, then apply `NEUTRON_*` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Read `path` over the defaults. The format follows the file extension; a
    /// missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) {
        if let Some(cap) = env_parse("NEUTRON_CAP") {
            self.token.cap = cap;
        }

        if let Some(reward) = env_parse("NEUTRON_REWARD") {
            self.token.reward = reward;
        }

        if let Some(amount) = env_parse("NEUTRON_FAUCET_AMOUNT") {
            self.faucet.amount_allowed = amount;
        }

        if let Some(locktime) = env_parse("NEUTRON_FAUCET_LOCKTIME") {
            self.faucet.locktime_secs = locktime;
        }

        if let Some(miner) = env_parse("NEUTRON_MINER") {
            self.chain.miner = miner;
        }

        if let Ok(data_dir) = std::env::var("NEUTRON_DATA_DIR") {
            self.chain.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(level) = std::env::var("NEUTRON_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_deploy_parameters() {
        let config = NeutronConfig::default();
        assert_eq!(config.token.cap, 100_000_000);
        assert_eq!(config.token.reward, 50);
        assert_eq!(config.faucet.amount_allowed, 25);
        assert_eq!(config.faucet.locktime_secs, DEFAULT_LOCKTIME);
        assert_eq!(config.chain.miner, DEFAULT_MINER);
    }

    #[test]
    fn test_load_toml_with_partial_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("neutron.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[token]\ncap = 1000000\n\n[chain]\nminer = \"0x00000000000000000000000000000000000000aa\"\n\n[faucet]\nlocktime_secs = 60"
        )
        .unwrap();

        let config = NeutronConfig::from_file(&path).unwrap();
        assert_eq!(config.token.cap, 1_000_000);
        assert_eq!(config.token.reward, 50);
        assert_eq!(config.faucet.locktime_secs, 60);
        assert_eq!(config.faucet.amount_allowed, 25);
        assert_eq!(config.chain.miner.0[19], 0xaa);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = NeutronConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.token, TokenConfig::default());
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("neutron.toml");
        std::fs::write(&path, "[token]\ncap = \"lots\"\n").unwrap();

        assert!(NeutronConfig::from_file(&path).is_err());
    }
}
