//! Read-model projections: contract records and events to domain values.

use alloy_primitives::U256;
use shield_abi::governance::{ProposalCreated, ProposalRecord, VoteCast, VoteInfo};
use shield_types::{Proposal, TokenAmount, Vote, VoteRecord};

/// A proposal as stored on chain, with its id.
pub fn proposal(id: U256, record: ProposalRecord) -> Proposal {
    Proposal {
        id,
        reporter: record.reporter,
        suspicious_address: record.suspicious_address,
        description: record.description,
        evidence: record.evidence,
        votes_for: TokenAmount::new(record.votes_for),
        votes_against: TokenAmount::new(record.votes_against),
        is_active: record.is_active,
    }
}

/// Identity and text from the creation event, tallies and liveness from the
/// current contract state.
pub fn merge(event: &ProposalCreated, live: &ProposalRecord) -> Proposal {
    Proposal {
        id: event.proposal_id,
        reporter: event.reporter,
        suspicious_address: event.suspicious_address,
        description: event.description.clone(),
        evidence: event.evidence.clone(),
        votes_for: TokenAmount::new(live.votes_for),
        votes_against: TokenAmount::new(live.votes_against),
        is_active: live.is_active,
    }
}

/// A cast vote from its `VoteCast` event, with advisory power in human units.
pub fn vote(event: &VoteCast, decimals: u8) -> Vote {
    Vote::new(
        event.proposal_id,
        event.voter,
        event.support,
        TokenAmount::new(event.tokens),
        decimals,
    )
}

pub fn vote_record(info: VoteInfo) -> VoteRecord {
    VoteRecord {
        has_voted: info.has_voted,
        support: info.support,
        tokens: TokenAmount::new(info.tokens),
        power: info.power,
    }
}
