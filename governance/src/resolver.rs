//! Address validation and ENS name resolution.

use alloy_primitives::Address;
use shield_abi::{ens, governance::decode_address};
use shield_rpc::{CallRequest, ChainProvider};
use shield_types::{is_hex_address, parse_address, ChainId};
use tracing::debug;

use crate::error::GovernanceError;

/// Turns user input into an [`Address`].
///
/// Hex addresses are validated locally. Anything else is treated as an ENS
/// name and resolved only on chains with a name service; elsewhere it fails
/// without touching the network.
pub struct AddressResolver<'a, P> {
    provider: &'a P,
}

impl<'a, P: ChainProvider> AddressResolver<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub async fn resolve(
        &self,
        candidate: &str,
        chain: ChainId,
    ) -> Result<Address, GovernanceError> {
        let candidate = candidate.trim();
        if is_hex_address(candidate) {
            return parse_address(candidate)
                .map_err(|e| GovernanceError::InvalidAddress(e.to_string()));
        }
        if !chain.supports_name_service() || candidate.is_empty() {
            return Err(GovernanceError::InvalidAddress(candidate.to_string()));
        }
        match self.lookup(candidate).await {
            Some(addr) => {
                debug!(name = candidate, %addr, chain = %chain, "resolved name");
                Ok(addr)
            }
            None => Err(GovernanceError::InvalidAddress(candidate.to_string())),
        }
    }

    /// Registry → resolver → `addr`. Any failure or zero result is "no match".
    async fn lookup(&self, name: &str) -> Option<Address> {
        let node = ens::namehash(name);
        let raw = self
            .provider
            .call(&CallRequest::new(ens::REGISTRY, ens::resolver(node)))
            .await
            .ok()?;
        let resolver = decode_address(&raw).ok().filter(|a| !a.is_zero())?;
        let raw = self
            .provider
            .call(&CallRequest::new(resolver, ens::addr(node)))
            .await
            .ok()?;
        decode_address(&raw).ok().filter(|a| !a.is_zero())
    }
}
