//! ENS name resolution: registry → resolver → address.

use alloy_primitives::{address, keccak256, Address, B256};

use crate::codec::{encode_call, Token};

/// The ENS registry, deployed at the same address on mainnet, Goerli and Sepolia.
pub const REGISTRY: Address = address!("00000000000c2e074ec69a0dfb2997ba6c7d2e1e");

pub mod signatures {
    pub const RESOLVER: &str = "resolver(bytes32)";
    pub const ADDR: &str = "addr(bytes32)";
}

/// EIP-137 namehash. Labels are lowercased; full UTS-46 normalisation is not applied.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.to_lowercase().as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }
    node
}

/// `resolver(bytes32 node)` on the registry.
pub fn resolver(node: B256) -> Vec<u8> {
    encode_call(signatures::RESOLVER, &[Token::FixedBytes(node)])
}

/// `addr(bytes32 node)` on a resolver.
pub fn addr(node: B256) -> Vec<u8> {
    encode_call(signatures::ADDR, &[Token::FixedBytes(node)])
}
