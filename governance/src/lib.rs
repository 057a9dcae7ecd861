//! Client-side governance for community scam reporting.
//!
//! Users file reports against suspicious addresses as proposals on a
//! governance contract, then stake SHIELD tokens for or against them. Vote
//! weight is the square root of the stake. Passed proposals flag the address
//! on chain.
//!
//! All state lives on chain; this crate only reads, projects and submits.

pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod network;
pub mod projection;
pub mod reputation;
pub mod resolver;
pub mod session;
pub mod stats;

pub use binding::{BindingCache, ContractBinding, TokenBinding};
pub use config::GovernanceConfig;
pub use engine::{GovernanceEngine, PendingTransaction};
pub use error::GovernanceError;
pub use network::NetworkTable;
pub use reputation::{ReputationScorer, ScamAssessment};
pub use resolver::AddressResolver;
pub use session::ChainSession;
pub use stats::VotingStatsAggregator;
