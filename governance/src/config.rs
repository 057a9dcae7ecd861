//! Client configuration with TOML file support.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use shield_types::{parse_address, ChainId};
use shield_utils::LogFormat;

use crate::network::NetworkTable;
use crate::GovernanceError;

/// Environment variables that override a network's contract address.
pub const CONTRACT_ADDRESS_ENV: [(ChainId, &str); 4] = [
    (ChainId::MAINNET, "SHIELD_CONTRACT_ADDRESS_MAINNET"),
    (ChainId::GOERLI, "SHIELD_CONTRACT_ADDRESS_GOERLI"),
    (ChainId::SEPOLIA, "SHIELD_CONTRACT_ADDRESS_SEPOLIA"),
    (ChainId::MONAD_TESTNET, "SHIELD_CONTRACT_ADDRESS_MONAD"),
];

/// Configuration for the governance client.
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// JSON-RPC endpoint of the wallet or node.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Signer account; the endpoint must hold its key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Chain on which proposals and votes must be sent.
    #[serde(default = "default_governance_chain_id")]
    pub governance_chain_id: u64,

    /// Headroom added on top of the node's gas estimate, in percent.
    #[serde(default = "default_gas_margin_percent")]
    pub gas_margin_percent: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Receipt polling interval while waiting for confirmations.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Chain id (decimal string) to governance contract address.
    #[serde(default = "default_networks")]
    pub networks: BTreeMap<String, String>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_governance_chain_id() -> u64 {
    ChainId::MONAD_TESTNET.as_u64()
}

fn default_networks() -> BTreeMap<String, String> {
    NetworkTable::default()
        .iter()
        .map(|(chain, addr)| (chain.to_string(), format!("{addr:#x}")))
        .collect()
}

fn default_gas_margin_percent() -> u64 {
    20
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_token_decimals() -> u8 {
    shield_types::SHIELD_DECIMALS
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GovernanceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Overlay contract addresses from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay contract addresses from an arbitrary variable source.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (chain, var) in CONTRACT_ADDRESS_ENV {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                self.networks.insert(chain.to_string(), value.trim().to_string());
            }
        }
    }

    /// Validate and build the network table.
    pub fn network_table(&self) -> Result<NetworkTable, GovernanceError> {
        let mut table = NetworkTable::new(ChainId::new(self.governance_chain_id));
        for (chain, addr) in &self.networks {
            let id: u64 = chain.parse().map_err(|_| {
                GovernanceError::Config(format!("invalid chain id in [networks]: {chain}"))
            })?;
            let contract = parse_address(addr)
                .map_err(|e| GovernanceError::Config(format!("network {chain}: {e}")))?;
            table.set_contract(ChainId::new(id), contract);
        }
        Ok(table)
    }

    /// The configured signer, if any.
    pub fn signer(&self) -> Result<Option<Address>, GovernanceError> {
        self.account
            .as_deref()
            .map(parse_address)
            .transpose()
            .map_err(|e| GovernanceError::Config(format!("account: {e}")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            account: None,
            governance_chain_id: default_governance_chain_id(),
            gas_margin_percent: default_gas_margin_percent(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            token_decimals: default_token_decimals(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            networks: default_networks(),
        }
    }
}
