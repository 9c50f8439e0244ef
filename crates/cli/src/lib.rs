pub mod commands;
pub mod logging;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use alloy::primitives::Address;
use sealbid_core::{NetworkConfig, config::SigningDomain};
use serde::Deserialize;
use thiserror::Error;

pub use logging::init_logging;

pub const DEFAULT_CONFIG_PATH: &str = "sealbid.toml";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Debug, Deserialize, PartialEq)]
pub struct CliConfig {
    pub network: NetworkSection,
}

/// Unset fields keep the Sepolia defaults.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NetworkSection {
    pub rpc_url: Option<String>,
    pub contract: String,
    pub chain_id: Option<u64>,
    pub block_interval_secs: Option<u64>,
    pub nominal_duration_blocks: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub call_timeout_secs: Option<u64>,
    pub confirmation_timeout_secs: Option<u64>,
    pub bid_gas_limit: Option<u64>,
    pub finalize_gas_limit: Option<u64>,
    pub gateway_url: Option<String>,
    pub domain_name: Option<String>,
    pub domain_version: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse toml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid contract address {value:?}: {source}")]
    Contract {
        value: String,
        source: alloy::hex::FromHexError,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl CliConfig {
    pub fn network_config(&self) -> Result<NetworkConfig, ConfigError> {
        let section = &self.network;
        let raw = section.contract.trim();
        let contract = Address::from_str(raw).map_err(|source| ConfigError::Contract {
            value: section.contract.clone(),
            source,
        })?;

        let mut config = NetworkConfig::sepolia(contract);
        // A key-backed wallet is pinned to its rpc endpoint.
        config.switch_network = false;

        if let Some(chain_id) = section.chain_id {
            config.chain_id = chain_id;
        }
        if let Some(secs) = section.block_interval_secs {
            config.block_interval = Duration::from_secs(secs);
        }
        if let Some(blocks) = section.nominal_duration_blocks {
            config.nominal_duration_blocks = blocks;
        }
        if let Some(secs) = section.poll_interval_secs {
            config.poll_interval = non_zero_secs(secs, "poll_interval_secs")?;
        }
        if let Some(secs) = section.call_timeout_secs {
            config.call_timeout = non_zero_secs(secs, "call_timeout_secs")?;
        }
        if let Some(secs) = section.confirmation_timeout_secs {
            config.confirmation_timeout = non_zero_secs(secs, "confirmation_timeout_secs")?;
        }
        if section.bid_gas_limit.is_some() {
            config.bid_gas_limit = section.bid_gas_limit;
        }
        if section.finalize_gas_limit.is_some() {
            config.finalize_gas_limit = section.finalize_gas_limit;
        }
        if section.gateway_url.is_some() {
            config.gateway_url = section.gateway_url.clone();
        }
        let defaults = SigningDomain::default();
        config.domain = SigningDomain {
            name: section.domain_name.clone().unwrap_or(defaults.name),
            version: section.domain_version.clone().unwrap_or(defaults.version),
        };

        Ok(config)
    }
}

fn non_zero_secs(secs: u64, field: &'static str) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Zero(field));
    }
    Ok(Duration::from_secs(secs))
}

pub fn load_config(path: impl AsRef<Path>) -> Result<CliConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
