//! Scam-report proposals and the votes cast on them.
//!
//! These are projections of contract state, never authoritative copies.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::TokenAmount;

/// Client-side view of a proposal's lifecycle.
///
/// `Approved` and `Rejected` are terminal: nothing moves a proposal back to `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Open for voting.
    Active,
    /// Executed with more support than opposition.
    Approved,
    /// Executed without a majority in support.
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scam report submitted on-chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Monotonic id assigned by the contract.
    pub id: U256,
    pub reporter: Address,
    pub suspicious_address: Address,
    pub description: String,
    /// Evidence URL or free-form reference.
    pub evidence: String,
    pub votes_for: TokenAmount,
    pub votes_against: TokenAmount,
    pub is_active: bool,
}

impl Proposal {
    pub fn status(&self) -> ProposalStatus {
        if self.is_active {
            ProposalStatus::Active
        } else if self.votes_for > self.votes_against {
            ProposalStatus::Approved
        } else {
            ProposalStatus::Rejected
        }
    }
}

/// One account's stake in one proposal, as cast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: U256,
    pub voter: Address,
    pub support: bool,
    pub tokens: TokenAmount,
    /// Advisory quadratic weight, `sqrt(tokens)` in human units.
    pub power: f64,
}

impl Vote {
    pub fn new(
        proposal_id: U256,
        voter: Address,
        support: bool,
        tokens: TokenAmount,
        decimals: u8,
    ) -> Self {
        Self {
            proposal_id,
            voter,
            support,
            tokens,
            power: tokens.quadratic_power(decimals),
        }
    }
}

/// The contract's `getVote` record for a (proposal, voter) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub has_voted: bool,
    pub support: bool,
    pub tokens: TokenAmount,
    /// Power as accounted on-chain; authoritative over the client-side estimate.
    pub power: U256,
}

/// A voter's track record against executed proposal outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingStats {
    /// Votes on proposals that have an executed outcome.
    pub total_votes: u64,
    /// Percentage of those votes that matched the outcome, rounded.
    pub accuracy: u32,
}
