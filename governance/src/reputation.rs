//! Scam-likelihood score derived from quadratic vote tallies.
//!
//! For every proposal naming the address, with `pf = sqrt(votes_for)` and
//! `pa = sqrt(votes_against)` in whole tokens, the proposal contributes
//! `(pf - pa) / (pf + pa) * 100`, or `0` when nobody voted. The score is the
//! mean of those contributions clamped to `[0, 100]`.

use alloy_primitives::Address;
use shield_rpc::ChainProvider;
use shield_types::{Proposal, SHIELD_DECIMALS};
use tracing::warn;

use crate::engine::{counters, GovernanceEngine};

/// Outcome of a score lookup that distinguishes "no evidence" from "could not
/// read the chain".
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScamAssessment {
    Scored(f64),
    Unknown,
}

impl ScamAssessment {
    /// The score, with `Unknown` collapsed to `0`.
    pub fn score(&self) -> f64 {
        match self {
            Self::Scored(s) => *s,
            Self::Unknown => 0.0,
        }
    }
}

/// Score `address` against a set of proposals, using 18-decimal tokens.
pub fn score(proposals: &[Proposal], address: Address) -> f64 {
    score_with_decimals(proposals, address, SHIELD_DECIMALS)
}

pub fn score_with_decimals(proposals: &[Proposal], address: Address, decimals: u8) -> f64 {
    let ratios: Vec<f64> = proposals
        .iter()
        .filter(|p| p.suspicious_address == address)
        .map(|p| {
            let pf = p.votes_for.quadratic_power(decimals);
            let pa = p.votes_against.quadratic_power(decimals);
            if pf + pa == 0.0 {
                0.0
            } else {
                (pf - pa) / (pf + pa) * 100.0
            }
        })
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    if mean.is_nan() {
        return 0.0;
    }
    mean.clamp(0.0, 100.0)
}

/// Reads current proposals through the engine and scores addresses.
pub struct ReputationScorer<'a, P: ChainProvider> {
    engine: &'a GovernanceEngine<P>,
}

impl<'a, P: ChainProvider> ReputationScorer<'a, P> {
    pub fn new(engine: &'a GovernanceEngine<P>) -> Self {
        Self { engine }
    }

    /// Score in `[0, 100]`; `0` when nothing can be read.
    pub async fn score_of(&self, address: Address) -> f64 {
        self.assess(address).await.score()
    }

    pub async fn assess(&self, address: Address) -> ScamAssessment {
        match self.engine.try_list_proposals().await {
            Ok(proposals) => ScamAssessment::Scored(score_with_decimals(
                &proposals,
                address,
                self.engine.token_decimals(),
            )),
            Err(e) => {
                warn!(%address, error = %e, "could not read proposals, score unknown");
                self.engine.stats().increment(counters::READ_ERRORS_SUPPRESSED);
                ScamAssessment::Unknown
            }
        }
    }
}
