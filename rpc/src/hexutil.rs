//! Hex "quantity" and "data" encodings used on the JSON-RPC wire.

use alloy_primitives::{Address, B256, U256};

use crate::error::RpcError;

/// Encode a quantity: `0x`-prefixed, no leading zeros, `0x0` for zero.
pub fn quantity(value: U256) -> String {
    if value.is_zero() {
        "0x0".to_string()
    } else {
        format!("0x{value:x}")
    }
}

pub fn quantity_u64(value: u64) -> String {
    format!("0x{value:x}")
}

/// Encode unformatted data as `0x`-prefixed hex.
pub fn data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn parse_quantity(s: &str) -> Result<U256, RpcError> {
    let body = strip(s)?;
    if body.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(body, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("bad quantity {s}: {e}")))
}

pub fn parse_quantity_u64(s: &str) -> Result<u64, RpcError> {
    let body = strip(s)?;
    if body.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(body, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("bad quantity {s}: {e}")))
}

pub fn parse_data(s: &str) -> Result<Vec<u8>, RpcError> {
    hex::decode(strip(s)?).map_err(|e| RpcError::InvalidResponse(format!("bad hex data: {e}")))
}

pub fn parse_b256(s: &str) -> Result<B256, RpcError> {
    let bytes = parse_data(s)?;
    if bytes.len() != 32 {
        return Err(RpcError::InvalidResponse(format!("expected 32-byte hash, got {s}")));
    }
    Ok(B256::from_slice(&bytes))
}

pub fn parse_address(s: &str) -> Result<Address, RpcError> {
    let bytes = parse_data(s)?;
    if bytes.len() != 20 {
        return Err(RpcError::InvalidResponse(format!("expected address, got {s}")));
    }
    Ok(Address::from_slice(&bytes))
}

fn strip(s: &str) -> Result<&str, RpcError> {
    s.strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing 0x prefix: {s}")))
}
