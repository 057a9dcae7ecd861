//! JSON-RPC transport to an Ethereum-compatible node or wallet endpoint.
//!
//! - [`ChainProvider`]: the async boundary the governance engine is written against
//! - [`HttpProvider`]: JSON-RPC 2.0 over HTTP via `reqwest`
//! - [`RpcError`]: provider errors classified once, at this boundary, into
//!   tagged variants (user rejection, insufficient funds, revert, ...)

pub mod error;
pub mod hexutil;
pub mod http;
pub mod provider;
pub mod types;

pub use error::RpcError;
pub use http::HttpProvider;
pub use provider::ChainProvider;
pub use types::{BlockTag, CallRequest, Log, LogFilter, TransactionReceipt, TransactionRequest};
