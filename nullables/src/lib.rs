//! Nullable infrastructure for deterministic testing.
//!
//! Following the "A-frame architecture" pattern, the chain is abstracted
//! behind the `ChainProvider` trait. This crate provides an in-memory
//! implementation that:
//! - Runs the governance contract, the SHIELD token and ENS deterministically
//! - Can be controlled programmatically (chain id, balances, failures)
//! - Records every provider call for assertions
//! - Never touches the network
//!
//! Usage: hand a `NullChain` to the governance engine in place of an
//! `HttpProvider`.

pub mod chain;
mod contracts;

pub use chain::{NullChain, ProviderCall, GOVERNANCE_ADDRESS, OWNER_ADDRESS, TOKEN_ADDRESS};
