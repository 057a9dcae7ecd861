//! Chain identifiers and the networks the client knows by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An EIP-155 chain identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Ethereum mainnet.
    pub const MAINNET: Self = Self(1);
    /// Goerli testnet.
    pub const GOERLI: Self = Self(5);
    /// Sepolia testnet.
    pub const SEPOLIA: Self = Self(11_155_111);
    /// Monad testnet, where the governance contract is deployed.
    pub const MONAD_TESTNET: Self = Self(2023);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Human-readable network name, falling back to the numeric id.
    pub fn name(&self) -> String {
        match *self {
            Self::MAINNET => "Ethereum Mainnet".to_string(),
            Self::GOERLI => "Goerli".to_string(),
            Self::SEPOLIA => "Sepolia".to_string(),
            Self::MONAD_TESTNET => "Monad Testnet".to_string(),
            Self(id) => format!("chain {id}"),
        }
    }

    /// Whether ENS names can be resolved on this network.
    pub fn supports_name_service(&self) -> bool {
        matches!(*self, Self::MAINNET | Self::GOERLI | Self::SEPOLIA)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ethereum_networks_support_ens() {
        assert!(ChainId::MAINNET.supports_name_service());
        assert!(ChainId::GOERLI.supports_name_service());
        assert!(ChainId::SEPOLIA.supports_name_service());
        assert!(!ChainId::MONAD_TESTNET.supports_name_service());
        assert!(!ChainId::new(31337).supports_name_service());
    }

    #[test]
    fn unknown_chain_name_falls_back_to_id() {
        assert_eq!(ChainId::new(999).name(), "chain 999");
        assert_eq!(ChainId::MONAD_TESTNET.name(), "Monad Testnet");
    }
}
