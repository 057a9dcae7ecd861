//! Static mapping of chain id to deployed governance contract.

use std::collections::BTreeMap;

use alloy_primitives::{address, Address};
use shield_types::ChainId;

/// The governance deployment on Monad testnet.
pub const MONAD_TESTNET_CONTRACT: Address = address!("7a791fe5a35131b7d98f854a64e7f94180f27c7b");

/// Which chains have a governance contract, and which one writes must target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkTable {
    contracts: BTreeMap<ChainId, Address>,
    governance_chain: ChainId,
}

impl NetworkTable {
    /// An empty table; every chain is unsupported until an address is added.
    pub fn new(governance_chain: ChainId) -> Self {
        Self {
            contracts: BTreeMap::new(),
            governance_chain,
        }
    }

    pub fn with_contract(mut self, chain: ChainId, contract: Address) -> Self {
        self.set_contract(chain, contract);
        self
    }

    pub fn set_contract(&mut self, chain: ChainId, contract: Address) {
        self.contracts.insert(chain, contract);
    }

    /// The deployed contract on `chain`. The zero address means "not deployed".
    pub fn contract_address(&self, chain: ChainId) -> Option<Address> {
        self.contracts
            .get(&chain)
            .copied()
            .filter(|addr| !addr.is_zero())
    }

    pub fn is_supported(&self, chain: ChainId) -> bool {
        self.contract_address(chain).is_some()
    }

    pub fn governance_chain(&self) -> ChainId {
        self.governance_chain
    }

    /// Display name of the network users must switch to.
    pub fn required_network(&self) -> String {
        self.governance_chain.name()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChainId, Address)> + '_ {
        self.contracts.iter().map(|(c, a)| (*c, *a))
    }
}

impl Default for NetworkTable {
    fn default() -> Self {
        Self::new(ChainId::MONAD_TESTNET)
            .with_contract(ChainId::MAINNET, Address::ZERO)
            .with_contract(ChainId::GOERLI, Address::ZERO)
            .with_contract(ChainId::SEPOLIA, Address::ZERO)
            .with_contract(ChainId::MONAD_TESTNET, MONAD_TESTNET_CONTRACT)
    }
}
