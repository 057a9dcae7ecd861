//! Typed access to the deployed governance contract and its stake token.

use alloy_primitives::{Address, U256};
use shield_abi::governance::{
    self as gov, ProposalCreated, ProposalExecuted, ProposalRecord, VoteCast, VoteInfo,
};
use shield_abi::{codec::address_word, token};
use shield_rpc::{ChainProvider, Log, LogFilter, RpcError};
use shield_types::ChainId;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::GovernanceError;
use crate::network::NetworkTable;
use crate::session::ChainSession;

/// The governance contract on one chain, verified live at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractBinding {
    chain_id: ChainId,
    address: Address,
}

impl ContractBinding {
    /// Look up the deployment for `chain_id` and check that it answers `owner()`.
    pub async fn resolve<P: ChainProvider>(
        session: &ChainSession<P>,
        networks: &NetworkTable,
        chain_id: ChainId,
    ) -> Result<Self, GovernanceError> {
        let address = networks.contract_address(chain_id).ok_or_else(|| {
            GovernanceError::UnsupportedNetwork {
                required: networks.required_network(),
                actual: chain_id,
            }
        })?;
        let binding = Self { chain_id, address };
        let owner = binding.owner(session).await?;
        debug!(chain = %chain_id, contract = %address, %owner, "governance contract bound");
        Ok(binding)
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `owner()`. A revert or an undecodable answer means the address does not
    /// hold the contract; transport failures surface as read errors.
    pub async fn owner<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
    ) -> Result<Address, GovernanceError> {
        let mismatch = |reason: String| GovernanceError::ContractMismatch {
            address: self.address,
            reason,
        };
        let raw = session
            .call(self.address, gov::owner())
            .await
            .map_err(|e| match e {
                RpcError::ExecutionReverted(_) => mismatch(e.to_string()),
                other => GovernanceError::from_read(other),
            })?;
        gov::decode_address(&raw).map_err(|e| mismatch(format!("owner() returned {e}")))
    }

    pub async fn shield_token<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
    ) -> Result<TokenBinding, GovernanceError> {
        let raw = self.read(session, gov::shield_token()).await?;
        Ok(TokenBinding {
            address: gov::decode_address(&raw)?,
        })
    }

    pub async fn get_proposal<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        proposal_id: U256,
    ) -> Result<ProposalRecord, GovernanceError> {
        let raw = self.read(session, gov::get_proposal(proposal_id)).await?;
        Ok(ProposalRecord::decode(&raw)?)
    }

    pub async fn get_vote<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        proposal_id: U256,
        voter: Address,
    ) -> Result<VoteInfo, GovernanceError> {
        let raw = self.read(session, gov::get_vote(proposal_id, voter)).await?;
        Ok(VoteInfo::decode(&raw)?)
    }

    pub async fn is_scammer<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        account: Address,
    ) -> Result<bool, GovernanceError> {
        let raw = self.read(session, gov::is_scammer(account)).await?;
        Ok(gov::decode_bool(&raw)?)
    }

    pub async fn proposal_count<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
    ) -> Result<U256, GovernanceError> {
        let raw = self.read(session, gov::proposal_count()).await?;
        Ok(gov::decode_uint(&raw)?)
    }

    /// Every `ProposalCreated` event, oldest first.
    pub async fn proposal_created_events<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
    ) -> Result<Vec<ProposalCreated>, GovernanceError> {
        let filter = LogFilter::new(self.address).event(gov::proposal_created_topic());
        let logs = self.logs(session, &filter).await?;
        decode_all(&logs, ProposalCreated::decode)
    }

    /// `VoteCast` events emitted for `voter`, using the indexed voter topic.
    pub async fn vote_cast_events<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        voter: Address,
    ) -> Result<Vec<VoteCast>, GovernanceError> {
        let filter = LogFilter::new(self.address)
            .event(gov::vote_cast_topic())
            .topic(2, address_word(voter));
        let logs = self.logs(session, &filter).await?;
        decode_all(&logs, VoteCast::decode)
    }

    pub async fn proposal_executed_events<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
    ) -> Result<Vec<ProposalExecuted>, GovernanceError> {
        let filter = LogFilter::new(self.address).event(gov::proposal_executed_topic());
        let logs = self.logs(session, &filter).await?;
        decode_all(&logs, ProposalExecuted::decode)
    }

    async fn read<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        data: Vec<u8>,
    ) -> Result<Vec<u8>, GovernanceError> {
        session
            .call(self.address, data)
            .await
            .map_err(GovernanceError::from_read)
    }

    async fn logs<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        filter: &LogFilter,
    ) -> Result<Vec<Log>, GovernanceError> {
        session
            .provider()
            .get_logs(filter)
            .await
            .map_err(GovernanceError::from_read)
    }
}

fn decode_all<T>(
    logs: &[Log],
    decode: impl Fn(&[alloy_primitives::B256], &[u8]) -> Result<T, shield_abi::AbiError>,
) -> Result<Vec<T>, GovernanceError> {
    logs.iter()
        .map(|log| decode(&log.topics, &log.data).map_err(GovernanceError::from))
        .collect()
}

/// The SHIELD stake token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenBinding {
    address: Address,
}

impl TokenBinding {
    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn balance_of<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        account: Address,
    ) -> Result<U256, GovernanceError> {
        let raw = session
            .call(self.address, token::balance_of(account))
            .await
            .map_err(GovernanceError::from_read)?;
        Ok(gov::decode_uint(&raw)?)
    }

    pub async fn allowance<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        owner: Address,
        spender: Address,
    ) -> Result<U256, GovernanceError> {
        let raw = session
            .call(self.address, token::allowance(owner, spender))
            .await
            .map_err(GovernanceError::from_read)?;
        Ok(gov::decode_uint(&raw)?)
    }
}

/// The session's binding, re-resolved whenever the chain id changes.
///
/// Check-and-replace runs under one async lock, so a caller can never get a
/// binding for a chain other than the one just read from the session.
#[derive(Default)]
pub struct BindingCache {
    current: Mutex<Option<ContractBinding>>,
}

impl BindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get<P: ChainProvider>(
        &self,
        session: &ChainSession<P>,
        networks: &NetworkTable,
    ) -> Result<ContractBinding, GovernanceError> {
        let mut current = self.current.lock().await;
        let chain_id = session
            .chain_id()
            .await
            .map_err(GovernanceError::from_read)?;
        if let Some(binding) = *current {
            if binding.chain_id == chain_id {
                return Ok(binding);
            }
            debug!(from = %binding.chain_id, to = %chain_id, "chain changed, dropping binding");
            *current = None;
        }
        let binding = ContractBinding::resolve(session, networks, chain_id).await?;
        *current = Some(binding);
        Ok(binding)
    }

    /// The cached binding, if any, without touching the chain.
    pub async fn peek(&self) -> Option<ContractBinding> {
        *self.current.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_nullables::{NullChain, ProviderCall, GOVERNANCE_ADDRESS, OWNER_ADDRESS};
    use std::sync::Arc;

    fn networks() -> NetworkTable {
        NetworkTable::default().with_contract(ChainId::MONAD_TESTNET, GOVERNANCE_ADDRESS)
    }

    #[tokio::test]
    async fn binding_is_verified_with_owner() {
        let chain = Arc::new(NullChain::new());
        let session = ChainSession::new(chain.clone());
        let binding = ContractBinding::resolve(&session, &networks(), ChainId::MONAD_TESTNET)
            .await
            .unwrap();
        assert_eq!(binding.address(), GOVERNANCE_ADDRESS);
        assert_eq!(binding.owner(&session).await.unwrap(), OWNER_ADDRESS);
    }

    #[tokio::test]
    async fn undeployed_contract_is_a_mismatch() {
        let chain = Arc::new(NullChain::new());
        chain.undeploy_governance();
        let session = ChainSession::new(chain.clone());
        let err = ContractBinding::resolve(&session, &networks(), ChainId::MONAD_TESTNET)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::ContractMismatch { address, .. } if address == GOVERNANCE_ADDRESS
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_not_a_mismatch() {
        let chain = Arc::new(NullChain::new());
        chain.fail_reads(true);
        let session = ChainSession::new(chain.clone());
        let err = ContractBinding::resolve(&session, &networks(), ChainId::MONAD_TESTNET)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Read(msg) if msg.contains("unreachable")));
    }

    #[tokio::test]
    async fn unknown_chain_is_unsupported() {
        let chain = Arc::new(NullChain::with_chain_id(ChainId::SEPOLIA));
        let session = ChainSession::new(chain.clone());
        let err = BindingCache::new().get(&session, &networks()).await.unwrap_err();
        assert_eq!(
            err,
            GovernanceError::UnsupportedNetwork {
                required: "Monad Testnet".into(),
                actual: ChainId::SEPOLIA,
            }
        );
    }

    #[tokio::test]
    async fn cache_is_reused_until_chain_changes() {
        let chain = Arc::new(NullChain::new());
        let session = ChainSession::new(chain.clone());
        let table = networks().with_contract(ChainId::SEPOLIA, GOVERNANCE_ADDRESS);
        let cache = BindingCache::new();

        cache.get(&session, &table).await.unwrap();
        chain.clear_calls();
        cache.get(&session, &table).await.unwrap();
        assert_eq!(chain.calls(), vec![ProviderCall::ChainId]);

        chain.set_chain_id(ChainId::SEPOLIA);
        let binding = cache.get(&session, &table).await.unwrap();
        assert_eq!(binding.chain_id(), ChainId::SEPOLIA);
        assert_eq!(cache.peek().await, Some(binding));
    }

    #[tokio::test]
    async fn switching_to_unsupported_chain_drops_binding() {
        let chain = Arc::new(NullChain::new());
        let session = ChainSession::new(chain.clone());
        let cache = BindingCache::new();
        cache.get(&session, &networks()).await.unwrap();

        chain.set_chain_id(ChainId::MAINNET);
        assert!(cache.get(&session, &networks()).await.is_err());
        assert_eq!(cache.peek().await, None);
    }
}
