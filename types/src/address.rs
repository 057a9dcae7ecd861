//! EVM address parsing with EIP-55 checksum validation.

use alloy_primitives::Address;

use crate::error::ShieldError;

/// Whether `candidate` has the shape of a hex address: `0x` followed by 40 hex digits.
///
/// Shape only; the checksum is checked by [`parse_address`].
pub fn is_hex_address(candidate: &str) -> bool {
    match hex_body(candidate) {
        Some(body) => body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parse a hex address.
///
/// All-lowercase and all-uppercase bodies are accepted as is. A mixed-case
/// body is treated as an EIP-55 checksum and must match it.
pub fn parse_address(candidate: &str) -> Result<Address, ShieldError> {
    if !is_hex_address(candidate) {
        return Err(ShieldError::InvalidAddress(candidate.to_string()));
    }
    let body = hex_body(candidate).unwrap_or_default();
    let normalized = format!("0x{body}");

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());

    let parsed = if has_lower && has_upper {
        Address::parse_checksummed(&normalized, None).ok()
    } else {
        normalized.to_ascii_lowercase().parse::<Address>().ok()
    };
    parsed.ok_or_else(|| ShieldError::InvalidAddress(candidate.to_string()))
}

fn hex_body(candidate: &str) -> Option<&str> {
    candidate
        .strip_prefix("0x")
        .or_else(|| candidate.strip_prefix("0X"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address::from_slice(&[
            0xde, 0xad, 0xbe, 0xef, 0x5a, 0xfe, 0xc0, 0xde, 0x12, 0x34, 0xab, 0xcd, 0xef, 0x01,
            0x23, 0x45, 0x67, 0x89, 0xfa, 0xce,
        ])
    }

    #[test]
    fn hex_shape_detection() {
        assert!(is_hex_address(&sample().to_checksum(None)));
        assert!(is_hex_address("0x0000000000000000000000000000000000000000"));
        assert!(!is_hex_address("vitalik.eth"));
        assert!(!is_hex_address("0x1234"));
        assert!(!is_hex_address("deadbeef5afec0de1234abcdef0123456789face"));
        assert!(!is_hex_address("0xZZadbeef5afec0de1234abcdef0123456789face"));
    }

    #[test]
    fn lowercase_and_uppercase_parse() {
        let lower = "0xdeadbeef5afec0de1234abcdef0123456789face";
        assert_eq!(parse_address(lower).unwrap(), sample());
        let upper = "0xDEADBEEF5AFEC0DE1234ABCDEF0123456789FACE";
        assert_eq!(parse_address(upper).unwrap(), sample());
    }

    #[test]
    fn valid_checksum_parses() {
        let checksummed = sample().to_checksum(None);
        assert_eq!(parse_address(&checksummed).unwrap(), sample());
    }

    #[test]
    fn broken_checksum_is_rejected() {
        let checksummed = sample().to_checksum(None);
        let mut chars: Vec<char> = checksummed.chars().collect();
        let pos = chars
            .iter()
            .skip(2)
            .position(|c| c.is_ascii_alphabetic())
            .unwrap()
            + 2;
        chars[pos] = if chars[pos].is_ascii_uppercase() {
            chars[pos].to_ascii_lowercase()
        } else {
            chars[pos].to_ascii_uppercase()
        };
        let broken: String = chars.into_iter().collect();
        assert!(matches!(
            parse_address(&broken),
            Err(ShieldError::InvalidAddress(_))
        ));
    }

    #[test]
    fn non_address_is_rejected() {
        assert!(parse_address("scammer.eth").is_err());
        assert!(parse_address("").is_err());
    }
}
