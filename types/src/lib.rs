//! Domain types for the SHIELD governance client.
//!
//! Everything here is a plain value: chain identifiers, token amounts in the
//! smallest unit, and the proposal/vote projections reconstructed from the
//! governance contract. Nothing in this crate talks to a chain.

pub mod address;
pub mod amount;
pub mod error;
pub mod network;
pub mod proposal;

pub use address::{is_hex_address, parse_address};
pub use amount::{TokenAmount, SHIELD_DECIMALS};
pub use error::ShieldError;
pub use network::ChainId;
pub use proposal::{Proposal, ProposalStatus, Vote, VoteRecord, VotingStats};

pub use alloy_primitives::{Address, B256, U256};

/// Transaction hashes are plain 32-byte words.
pub type TxHash = B256;
