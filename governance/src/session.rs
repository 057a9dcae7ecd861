//! The connected wallet: provider, signer and chain identity.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use shield_rpc::{CallRequest, ChainProvider, RpcError};
use shield_types::ChainId;

use crate::error::GovernanceError;

/// A provider plus the account that signs writes.
///
/// The session does not cache the chain id: the wallet may switch networks at
/// any time, so every caller that cares reads it fresh.
pub struct ChainSession<P> {
    provider: Arc<P>,
    signer: Option<Address>,
}

impl<P: ChainProvider> ChainSession<P> {
    /// A read-only session.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            signer: None,
        }
    }

    pub fn with_signer(provider: Arc<P>, signer: Address) -> Self {
        Self {
            provider,
            signer: Some(signer),
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn signer(&self) -> Option<Address> {
        self.signer
    }

    pub fn require_signer(&self) -> Result<Address, GovernanceError> {
        self.signer.ok_or(GovernanceError::NotConnected)
    }

    pub async fn chain_id(&self) -> Result<ChainId, RpcError> {
        self.provider.chain_id().await
    }

    /// Native balance in wei.
    pub async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        self.provider.balance(account).await
    }

    /// `eth_call` from the signer, when one is connected.
    pub async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let mut request = CallRequest::new(to, data);
        request.from = self.signer;
        self.provider.call(&request).await
    }
}
