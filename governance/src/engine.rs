//! Core governance engine: scam reports, quadratic votes and their read models.
//!
//! Every write follows the same path: check the wallet and network, resolve
//! the contract binding, estimate gas with a safety margin, send, and hand
//! back a [`PendingTransaction`] without waiting for it to be mined.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use shield_abi::{governance as gov, token};
use shield_rpc::{CallRequest, ChainProvider, TransactionReceipt, TransactionRequest};
use shield_types::{ChainId, Proposal, TokenAmount, TxHash, Vote, VoteRecord, VotingStats};
use shield_utils::StatsCounter;
use tracing::{debug, info, warn};

use crate::binding::{BindingCache, ContractBinding, TokenBinding};
use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::network::NetworkTable;
use crate::projection;
use crate::reputation::{ReputationScorer, ScamAssessment};
use crate::resolver::AddressResolver;
use crate::session::ChainSession;
use crate::stats::VotingStatsAggregator;

pub const DEFAULT_GAS_MARGIN_PERCENT: u64 = 20;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Names of the engine's activity counters.
pub mod counters {
    pub const PROPOSALS_SUBMITTED: &str = "proposals_submitted";
    pub const VOTES_CAST: &str = "votes_cast";
    pub const APPROVALS_SENT: &str = "approvals_sent";
    pub const PROPOSALS_EXECUTED: &str = "proposals_executed";
    pub const READ_ERRORS_SUPPRESSED: &str = "read_errors_suppressed";

    pub const ALL: [&str; 5] = [
        PROPOSALS_SUBMITTED,
        VOTES_CAST,
        APPROVALS_SENT,
        PROPOSALS_EXECUTED,
        READ_ERRORS_SUPPRESSED,
    ];
}

/// A broadcast transaction that may not be mined yet.
pub struct PendingTransaction<P> {
    hash: TxHash,
    provider: Arc<P>,
    poll_interval: Duration,
}

impl<P> fmt::Debug for PendingTransaction<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl<P: ChainProvider> PendingTransaction<P> {
    pub fn new(hash: TxHash, provider: Arc<P>, poll_interval: Duration) -> Self {
        Self {
            hash,
            provider,
            poll_interval,
        }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Poll until the transaction is `confirmations` blocks deep (at least 1).
    ///
    /// There is no internal timeout; wrap in `tokio::time::timeout` if needed.
    pub async fn wait(&self, confirmations: u64) -> Result<TransactionReceipt, GovernanceError> {
        let confirmations = confirmations.max(1);
        loop {
            let receipt = self
                .provider
                .transaction_receipt(self.hash)
                .await
                .map_err(GovernanceError::from_read)?;
            if let Some(receipt) = receipt {
                if !receipt.status {
                    warn!(tx = %self.hash, block = receipt.block_number, "transaction reverted");
                    return Err(GovernanceError::Reverted { tx_hash: self.hash });
                }
                let head = self
                    .provider
                    .block_number()
                    .await
                    .map_err(GovernanceError::from_read)?;
                if head.saturating_add(1) >= receipt.block_number.saturating_add(confirmations) {
                    debug!(tx = %self.hash, block = receipt.block_number, head, "confirmed");
                    return Ok(receipt);
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// The client-side governance engine over one wallet session.
pub struct GovernanceEngine<P> {
    session: ChainSession<P>,
    networks: NetworkTable,
    bindings: BindingCache,
    gas_margin_percent: u64,
    poll_interval: Duration,
    token_decimals: u8,
    stats: StatsCounter,
}

impl<P: ChainProvider> GovernanceEngine<P> {
    pub fn new(session: ChainSession<P>, networks: NetworkTable) -> Self {
        Self {
            session,
            networks,
            bindings: BindingCache::new(),
            gas_margin_percent: DEFAULT_GAS_MARGIN_PERCENT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            token_decimals: shield_types::SHIELD_DECIMALS,
            stats: StatsCounter::new(&counters::ALL),
        }
    }

    /// Build an engine from configuration; the signer comes from `account`.
    pub fn from_config(
        provider: Arc<P>,
        config: &GovernanceConfig,
    ) -> Result<Self, GovernanceError> {
        let session = match config.signer()? {
            Some(signer) => ChainSession::with_signer(provider, signer),
            None => ChainSession::new(provider),
        };
        Ok(Self::new(session, config.network_table()?)
            .with_gas_margin(config.gas_margin_percent)
            .with_poll_interval(config.poll_interval())
            .with_token_decimals(config.token_decimals))
    }

    pub fn with_gas_margin(mut self, percent: u64) -> Self {
        self.gas_margin_percent = percent;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_token_decimals(mut self, decimals: u8) -> Self {
        self.token_decimals = decimals;
        self
    }

    pub fn session(&self) -> &ChainSession<P> {
        &self.session
    }

    pub fn networks(&self) -> &NetworkTable {
        &self.networks
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    pub fn token_decimals(&self) -> u8 {
        self.token_decimals
    }

    /// The governance contract on the session's current chain.
    pub async fn binding(&self) -> Result<ContractBinding, GovernanceError> {
        self.bindings.get(&self.session, &self.networks).await
    }

    /// Re-run the liveness check against the current chain without raising.
    pub async fn verify_contract(&self) -> bool {
        let chain_id = match self.session.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "could not read chain id");
                return false;
            }
        };
        match ContractBinding::resolve(&self.session, &self.networks, chain_id).await {
            Ok(_) => true,
            Err(e) => {
                warn!(chain = %chain_id, error = %e, "contract verification failed");
                false
            }
        }
    }

    /// Resolve user input (hex address or ENS name) on the current chain.
    pub async fn resolve(&self, candidate: &str) -> Result<Address, GovernanceError> {
        let chain = self
            .session
            .chain_id()
            .await
            .map_err(GovernanceError::from_read)?;
        AddressResolver::new(self.session.provider().as_ref())
            .resolve(candidate, chain)
            .await
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// File a scam report as a new proposal.
    pub async fn submit_proposal(
        &self,
        suspicious_address: &str,
        description: &str,
        evidence: &str,
    ) -> Result<PendingTransaction<P>, GovernanceError> {
        let (signer, chain) = self.write_context().await?;
        let suspicious = AddressResolver::new(self.session.provider().as_ref())
            .resolve(suspicious_address, chain)
            .await?;
        let balance = self
            .session
            .balance(signer)
            .await
            .map_err(GovernanceError::from_write)?;
        if balance.is_zero() {
            return Err(GovernanceError::InsufficientFunds);
        }

        let binding = self.binding().await?;
        let data = gov::submit_proposal(suspicious, description, evidence);
        let pending = self.send(signer, binding.address(), data).await?;
        self.stats.increment(counters::PROPOSALS_SUBMITTED);
        info!(tx = %pending.hash(), %suspicious, reporter = %signer, "scam report submitted");
        Ok(pending)
    }

    /// Same as [`submit_proposal`](Self::submit_proposal).
    pub async fn report_scam(
        &self,
        suspicious_address: &str,
        description: &str,
        evidence: &str,
    ) -> Result<PendingTransaction<P>, GovernanceError> {
        self.submit_proposal(suspicious_address, description, evidence)
            .await
    }

    pub async fn submit_scam_report(
        &self,
        suspicious_address: &str,
        description: &str,
        evidence_url: &str,
    ) -> Result<TxHash, GovernanceError> {
        Ok(self
            .submit_proposal(suspicious_address, description, evidence_url)
            .await?
            .hash())
    }

    /// Stake `tokens` on a proposal, approving the governance contract first
    /// if its allowance is short.
    pub async fn cast_vote(
        &self,
        proposal_id: U256,
        support: bool,
        tokens: TokenAmount,
    ) -> Result<PendingTransaction<P>, GovernanceError> {
        let (signer, _) = self.write_context().await?;
        self.ensure_allowance(tokens).await?;

        let binding = self.binding().await?;
        let data = gov::cast_vote(proposal_id, support, tokens.raw());
        let pending = self.send(signer, binding.address(), data).await?;
        self.stats.increment(counters::VOTES_CAST);
        info!(
            tx = %pending.hash(),
            proposal = %proposal_id,
            support,
            tokens = %tokens.format_units(self.token_decimals),
            power = self.vote_power(tokens),
            "vote cast"
        );
        Ok(pending)
    }

    pub async fn cast_quadratic_vote(
        &self,
        proposal_id: U256,
        support: bool,
        tokens: TokenAmount,
    ) -> Result<TxHash, GovernanceError> {
        Ok(self.cast_vote(proposal_id, support, tokens).await?.hash())
    }

    /// Approve exactly `tokens` and wait for one confirmation, unless the
    /// current allowance already covers them.
    ///
    /// Returns the approval receipt when one was sent.
    pub async fn ensure_allowance(
        &self,
        tokens: TokenAmount,
    ) -> Result<Option<TransactionReceipt>, GovernanceError> {
        if !self.needs_approval(tokens).await? {
            return Ok(None);
        }
        let receipt = self.approve(tokens).await?.wait(1).await?;
        Ok(Some(receipt))
    }

    pub async fn needs_approval(&self, tokens: TokenAmount) -> Result<bool, GovernanceError> {
        let signer = self.session.require_signer()?;
        let allowance = self.token_allowance(signer).await?;
        debug!(%signer, allowance = %allowance, needed = %tokens, "allowance check");
        Ok(allowance < tokens)
    }

    /// Send `approve(governance, tokens)` on the SHIELD token.
    pub async fn approve(
        &self,
        tokens: TokenAmount,
    ) -> Result<PendingTransaction<P>, GovernanceError> {
        let (signer, _) = self.write_context().await?;
        let binding = self.binding().await?;
        let token = self.token(&binding).await?;
        let data = token::approve(binding.address(), tokens.raw());
        let pending = self.send(signer, token.address(), data).await?;
        self.stats.increment(counters::APPROVALS_SENT);
        info!(
            tx = %pending.hash(),
            spender = %binding.address(),
            amount = %tokens,
            "approval sent"
        );
        Ok(pending)
    }

    /// Settle a proposal. Eligibility is decided by the contract.
    pub async fn execute_proposal(
        &self,
        proposal_id: U256,
    ) -> Result<PendingTransaction<P>, GovernanceError> {
        let (signer, _) = self.write_context().await?;
        let binding = self.binding().await?;
        let pending = self
            .send(signer, binding.address(), gov::execute_proposal(proposal_id))
            .await?;
        self.stats.increment(counters::PROPOSALS_EXECUTED);
        info!(tx = %pending.hash(), proposal = %proposal_id, "execution sent");
        Ok(pending)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub async fn get_proposal(&self, proposal_id: U256) -> Result<Proposal, GovernanceError> {
        let binding = self.binding().await?;
        let record = binding.get_proposal(&self.session, proposal_id).await?;
        Ok(projection::proposal(proposal_id, record))
    }

    pub async fn get_vote(
        &self,
        proposal_id: U256,
        voter: Address,
    ) -> Result<VoteRecord, GovernanceError> {
        let binding = self.binding().await?;
        let info = binding.get_vote(&self.session, proposal_id, voter).await?;
        Ok(projection::vote_record(info))
    }

    /// Every vote `voter` has cast, oldest first.
    pub async fn vote_history(&self, voter: Address) -> Result<Vec<Vote>, GovernanceError> {
        let binding = self.binding().await?;
        let events = binding.vote_cast_events(&self.session, voter).await?;
        Ok(events
            .iter()
            .map(|e| projection::vote(e, self.token_decimals))
            .collect())
    }

    pub async fn proposal_count(&self) -> Result<U256, GovernanceError> {
        self.binding().await?.proposal_count(&self.session).await
    }

    /// Rebuild every proposal from its creation event plus a live read.
    pub async fn try_list_proposals(&self) -> Result<Vec<Proposal>, GovernanceError> {
        let binding = self.binding().await?;
        let created = binding.proposal_created_events(&self.session).await?;
        let mut proposals = Vec::with_capacity(created.len());
        for event in &created {
            let live = binding.get_proposal(&self.session, event.proposal_id).await?;
            proposals.push(projection::merge(event, &live));
        }
        debug!(count = proposals.len(), "proposals reconstructed");
        Ok(proposals)
    }

    /// Like [`try_list_proposals`](Self::try_list_proposals), but a read
    /// failure yields an empty list.
    pub async fn list_proposals(&self) -> Vec<Proposal> {
        match self.try_list_proposals().await {
            Ok(proposals) => proposals,
            Err(e) => {
                warn!(error = %e, "failed to list proposals");
                self.stats.increment(counters::READ_ERRORS_SUPPRESSED);
                Vec::new()
            }
        }
    }

    pub async fn get_scam_reports(&self) -> Vec<Proposal> {
        self.list_proposals().await
    }

    /// Proposals filed by the connected signer; empty without one.
    pub async fn user_reports(&self) -> Result<Vec<Proposal>, GovernanceError> {
        let Some(signer) = self.session.signer() else {
            return Ok(Vec::new());
        };
        let proposals = self.try_list_proposals().await?;
        Ok(proposals.into_iter().filter(|p| p.reporter == signer).collect())
    }

    pub async fn is_scam_address(&self, candidate: &str) -> Result<bool, GovernanceError> {
        let account = self.resolve(candidate).await?;
        self.binding().await?.is_scammer(&self.session, account).await
    }

    /// [`is_scam_address`](Self::is_scam_address), with any failure read as "not flagged".
    pub async fn check_scam_address(&self, candidate: &str) -> bool {
        match self.is_scam_address(candidate).await {
            Ok(flagged) => flagged,
            Err(e) => {
                warn!(address = candidate, error = %e, "scam check failed");
                self.stats.increment(counters::READ_ERRORS_SUPPRESSED);
                false
            }
        }
    }

    pub async fn shield_balance(&self, account: Address) -> Result<TokenAmount, GovernanceError> {
        let binding = self.binding().await?;
        let token = self.token(&binding).await?;
        Ok(TokenAmount::new(token.balance_of(&self.session, account).await?))
    }

    /// What `owner` has approved the governance contract to spend.
    pub async fn token_allowance(&self, owner: Address) -> Result<TokenAmount, GovernanceError> {
        let binding = self.binding().await?;
        let token = self.token(&binding).await?;
        let raw = token.allowance(&self.session, owner, binding.address()).await?;
        Ok(TokenAmount::new(raw))
    }

    /// Advisory vote weight for display; the contract's own figure is authoritative.
    pub fn vote_power(&self, tokens: TokenAmount) -> f64 {
        tokens.quadratic_power(self.token_decimals)
    }

    pub async fn scam_score(&self, address: Address) -> f64 {
        ReputationScorer::new(self).score_of(address).await
    }

    pub async fn assess(&self, address: Address) -> ScamAssessment {
        ReputationScorer::new(self).assess(address).await
    }

    pub async fn voting_accuracy(&self, voter: Address) -> Result<VotingStats, GovernanceError> {
        VotingStatsAggregator::new(self).stats_of(voter).await
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Signer, then chain id, then the network table. Nothing else is read
    /// until all three pass.
    async fn write_context(&self) -> Result<(Address, ChainId), GovernanceError> {
        let signer = self.session.require_signer()?;
        let chain = self
            .session
            .chain_id()
            .await
            .map_err(GovernanceError::from_write)?;
        if chain != self.networks.governance_chain() || !self.networks.is_supported(chain) {
            return Err(GovernanceError::UnsupportedNetwork {
                required: self.networks.required_network(),
                actual: chain,
            });
        }
        Ok((signer, chain))
    }

    async fn token(&self, binding: &ContractBinding) -> Result<TokenBinding, GovernanceError> {
        binding.shield_token(&self.session).await
    }

    async fn send(
        &self,
        from: Address,
        to: Address,
        data: Vec<u8>,
    ) -> Result<PendingTransaction<P>, GovernanceError> {
        let provider = self.session.provider();
        let estimate = provider
            .estimate_gas(&CallRequest::new(to, data.clone()).with_from(from))
            .await
            .map_err(GovernanceError::from_write)?;
        let gas = gas_with_margin(estimate, self.gas_margin_percent);
        let gas_price = provider
            .gas_price()
            .await
            .map_err(GovernanceError::from_write)?;
        let request = TransactionRequest::new(from, to, data)
            .gas(gas)
            .gas_price(gas_price);
        let hash = provider
            .send_transaction(&request)
            .await
            .map_err(GovernanceError::from_write)?;
        debug!(tx = %hash, %to, gas = %gas, gas_price = %gas_price, "transaction sent");
        Ok(PendingTransaction::new(hash, Arc::clone(provider), self.poll_interval))
    }
}

/// `estimate * (100 + margin) / 100`.
pub fn gas_with_margin(estimate: U256, margin_percent: u64) -> U256 {
    let factor = U256::from(100u64).saturating_add(U256::from(margin_percent));
    estimate.saturating_mul(factor) / U256::from(100u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_margin_is_applied() {
        assert_eq!(
            gas_with_margin(U256::from(100_000u64), 20),
            U256::from(120_000u64)
        );
        assert_eq!(gas_with_margin(U256::from(21_000u64), 0), U256::from(21_000u64));
        // Integer division truncates.
        assert_eq!(gas_with_margin(U256::from(7u64), 20), U256::from(8u64));
    }

    #[test]
    fn huge_margin_saturates() {
        let factor = U256::from(u64::MAX) + U256::from(100u64);
        assert_eq!(
            gas_with_margin(U256::from(100_000u64), u64::MAX),
            U256::from(1_000u64) * factor
        );
        assert_eq!(gas_with_margin(U256::MAX, u64::MAX), U256::MAX / U256::from(100u64));
    }

    #[test]
    fn counters_are_distinct() {
        let mut names = counters::ALL.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), counters::ALL.len());
    }
}
