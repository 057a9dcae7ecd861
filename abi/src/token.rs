//! SHIELD stake token: the ERC-20 subset the voting flow needs.

use alloy_primitives::{Address, U256};

use crate::codec::{encode_call, Token};

pub mod signatures {
    pub const BALANCE_OF: &str = "balanceOf(address)";
    pub const ALLOWANCE: &str = "allowance(address,address)";
    pub const APPROVE: &str = "approve(address,uint256)";
}

pub fn balance_of(account: Address) -> Vec<u8> {
    encode_call(signatures::BALANCE_OF, &[Token::Address(account)])
}

pub fn allowance(owner: Address, spender: Address) -> Vec<u8> {
    encode_call(
        signatures::ALLOWANCE,
        &[Token::Address(owner), Token::Address(spender)],
    )
}

pub fn approve(spender: Address, amount: U256) -> Vec<u8> {
    encode_call(
        signatures::APPROVE,
        &[Token::Address(spender), Token::Uint(amount)],
    )
}
