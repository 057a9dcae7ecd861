//! Voter accuracy: how often a voter sided with the executed outcome.

use std::collections::HashMap;

use alloy_primitives::Address;
use shield_abi::governance::{ProposalExecuted, VoteCast};
use shield_rpc::ChainProvider;
use shield_types::VotingStats;

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;

/// Count `voter`'s votes on executed proposals and the share that matched
/// the outcome. Votes on proposals that were never executed are ignored.
pub fn compute(votes: &[VoteCast], executions: &[ProposalExecuted], voter: Address) -> VotingStats {
    let outcomes: HashMap<_, _> = executions
        .iter()
        .map(|e| (e.proposal_id, e.passed))
        .collect();

    let mut total = 0u64;
    let mut correct = 0u64;
    for vote in votes.iter().filter(|v| v.voter == voter) {
        if let Some(&passed) = outcomes.get(&vote.proposal_id) {
            total += 1;
            if vote.support == passed {
                correct += 1;
            }
        }
    }

    let accuracy = if total == 0 {
        0
    } else {
        (correct as f64 / total as f64 * 100.0).round() as u32
    };
    VotingStats {
        total_votes: total,
        accuracy,
    }
}

pub struct VotingStatsAggregator<'a, P: ChainProvider> {
    engine: &'a GovernanceEngine<P>,
}

impl<'a, P: ChainProvider> VotingStatsAggregator<'a, P> {
    pub fn new(engine: &'a GovernanceEngine<P>) -> Self {
        Self { engine }
    }

    pub async fn stats_of(&self, voter: Address) -> Result<VotingStats, GovernanceError> {
        let binding = self.engine.binding().await?;
        let session = self.engine.session();
        let votes = binding.vote_cast_events(session, voter).await?;
        let executions = binding.proposal_executed_events(session).await?;
        Ok(compute(&votes, &executions, voter))
    }
}
