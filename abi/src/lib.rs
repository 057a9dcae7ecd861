//! Solidity ABI codec for the contracts the client talks to.
//!
//! - [`codec`]: selectors, event topics and head/tail encoding of the static
//!   and `string` types these contracts use
//! - [`governance`]: the quadratic-voting governance contract
//! - [`token`]: the SHIELD stake token (ERC-20 subset)
//! - [`ens`]: ENS registry and resolver lookups
//!
//! Only the types the contracts need are supported; this is not a general ABI
//! implementation.

pub mod codec;
pub mod ens;
pub mod error;
pub mod governance;
pub mod token;

pub use codec::{
    decode, encode, encode_call, event_topic, selector, split_call, ParamType, Token, TokenReader,
};
pub use error::AbiError;
