//! Head/tail ABI encoding for `address`, `uint256`, `bool`, `bytes32` and `string`.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::error::AbiError;

const WORD: usize = 32;

/// A single ABI value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(U256),
    Bool(bool),
    FixedBytes(B256),
    String(String),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Self::String(_))
    }
}

/// The ABI type of a value to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Uint,
    Bool,
    FixedBytes,
    String,
}

/// Compute the Solidity function selector (first 4 bytes of keccak256(signature)).
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Compute an event's topic-0 (keccak256 of its canonical signature).
pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// Encode a value tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word(U256::from((head_len + tail.len()) as u64)));
            if let Token::String(s) = token {
                tail.extend_from_slice(&uint_word(U256::from(s.len() as u64)));
                tail.extend_from_slice(s.as_bytes());
                let padding = (WORD - s.len() % WORD) % WORD;
                tail.resize(tail.len() + padding, 0);
            }
        } else {
            head.extend_from_slice(&static_word(token));
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encode a call: selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&encode(tokens));
    data
}

/// Split calldata into its selector and argument bytes.
pub fn split_call(data: &[u8]) -> Result<([u8; 4], &[u8]), AbiError> {
    if data.len() < 4 {
        return Err(AbiError::ShortData {
            needed: 4,
            have: data.len(),
        });
    }
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&data[..4]);
    Ok((sel, &data[4..]))
}

/// Decode a value tuple of the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let word = read_word(data, i * WORD)?;
        let token = match ty {
            ParamType::Address => Token::Address(Address::from_slice(&word[12..])),
            ParamType::Uint => Token::Uint(U256::from_be_bytes(word)),
            ParamType::FixedBytes => Token::FixedBytes(B256::from(word)),
            ParamType::Bool => Token::Bool(decode_bool_word(&word)?),
            ParamType::String => {
                let offset = word_to_usize(&word)?;
                let len = word_to_usize(&read_word(data, offset)?)?;
                let start = offset
                    .checked_add(WORD)
                    .ok_or(AbiError::OffsetOutOfBounds(offset))?;
                let end = start
                    .checked_add(len)
                    .ok_or(AbiError::OffsetOutOfBounds(start))?;
                if end > data.len() {
                    return Err(AbiError::ShortData {
                        needed: end,
                        have: data.len(),
                    });
                }
                let s = std::str::from_utf8(&data[start..end]).map_err(|_| AbiError::InvalidUtf8)?;
                Token::String(s.to_string())
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// Sequential typed access to decoded tokens.
pub struct TokenReader {
    tokens: std::vec::IntoIter<Token>,
}

impl TokenReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
        }
    }

    /// Decode `data` with `types` and wrap the result.
    pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Self, AbiError> {
        decode(types, data).map(Self::new)
    }

    pub fn address(&mut self) -> Result<Address, AbiError> {
        match self.tokens.next() {
            Some(Token::Address(a)) => Ok(a),
            _ => Err(AbiError::UnexpectedType { expected: "address" }),
        }
    }

    pub fn uint(&mut self) -> Result<U256, AbiError> {
        match self.tokens.next() {
            Some(Token::Uint(u)) => Ok(u),
            _ => Err(AbiError::UnexpectedType { expected: "uint256" }),
        }
    }

    pub fn boolean(&mut self) -> Result<bool, AbiError> {
        match self.tokens.next() {
            Some(Token::Bool(b)) => Ok(b),
            _ => Err(AbiError::UnexpectedType { expected: "bool" }),
        }
    }

    pub fn fixed_bytes(&mut self) -> Result<B256, AbiError> {
        match self.tokens.next() {
            Some(Token::FixedBytes(b)) => Ok(b),
            _ => Err(AbiError::UnexpectedType { expected: "bytes32" }),
        }
    }

    pub fn string(&mut self) -> Result<String, AbiError> {
        match self.tokens.next() {
            Some(Token::String(s)) => Ok(s),
            _ => Err(AbiError::UnexpectedType { expected: "string" }),
        }
    }
}

/// Left-pad an address into a 32-byte word (topics and static slots).
pub fn address_word(addr: Address) -> B256 {
    let mut bytes = [0u8; WORD];
    bytes[12..].copy_from_slice(addr.as_slice());
    B256::from(bytes)
}

/// Decode an address from an indexed topic.
pub fn topic_address(topic: &B256) -> Address {
    Address::from_slice(&topic[12..])
}

/// Decode a uint256 from an indexed topic.
pub fn topic_uint(topic: &B256) -> U256 {
    U256::from_be_bytes(topic.0)
}

fn uint_word(value: U256) -> [u8; WORD] {
    value.to_be_bytes::<WORD>()
}

fn static_word(token: &Token) -> [u8; WORD] {
    match token {
        Token::Address(a) => address_word(*a).0,
        Token::Uint(u) => uint_word(*u),
        Token::Bool(b) => uint_word(U256::from(*b as u8)),
        Token::FixedBytes(b) => b.0,
        Token::String(_) => [0u8; WORD],
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<[u8; WORD], AbiError> {
    let end = offset
        .checked_add(WORD)
        .ok_or(AbiError::OffsetOutOfBounds(offset))?;
    if end > data.len() {
        return Err(AbiError::ShortData {
            needed: end,
            have: data.len(),
        });
    }
    let mut word = [0u8; WORD];
    word.copy_from_slice(&data[offset..end]);
    Ok(word)
}

fn word_to_usize(word: &[u8; WORD]) -> Result<usize, AbiError> {
    let value = U256::from_be_bytes(*word);
    if value > U256::from(u32::MAX) {
        return Err(AbiError::OffsetOutOfBounds(usize::MAX));
    }
    Ok(value.as_limbs()[0] as usize)
}

fn decode_bool_word(word: &[u8; WORD]) -> Result<bool, AbiError> {
    if word[..WORD - 1].iter().any(|&b| b != 0) {
        return Err(AbiError::InvalidBool);
    }
    match word[WORD - 1] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(AbiError::InvalidBool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_selectors() {
        // verified against solc output
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("approve(address,uint256)")), "095ea7b3");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
        assert_eq!(hex::encode(selector("owner()")), "8da5cb5b");
    }

    #[test]
    fn known_event_topic() {
        assert_eq!(
            hex::encode(event_topic("Transfer(address,address,uint256)")),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn static_tuple_layout() {
        let data = encode(&[
            Token::Address(Address::repeat_byte(0x11)),
            Token::Uint(U256::from(42u64)),
            Token::Bool(true),
        ]);
        assert_eq!(data.len(), 96);
        assert_eq!(&data[..12], &[0u8; 12]);
        assert_eq!(&data[12..32], Address::repeat_byte(0x11).as_slice());
        assert_eq!(data[63], 42);
        assert_eq!(data[95], 1);
    }

    #[test]
    fn string_uses_offset_and_padding() {
        let data = encode(&[Token::Uint(U256::from(7u64)), Token::String("hello".into())]);
        // head: uint, offset(64); tail: len(5), "hello" padded to 32
        assert_eq!(data.len(), 4 * WORD);
        assert_eq!(data[63], 64);
        assert_eq!(data[95], 5);
        assert_eq!(&data[96..101], b"hello");
        assert!(data[101..].iter().all(|&b| b == 0));
    }

    #[test]
    fn mixed_tuple_decodes() {
        let tokens = vec![
            Token::Address(Address::repeat_byte(0xaa)),
            Token::String("phishing site".into()),
            Token::String(String::new()),
            Token::Uint(U256::from(10u64).pow(U256::from(19u64))),
            Token::Bool(false),
        ];
        let data = encode(&tokens);
        let types = [
            ParamType::Address,
            ParamType::String,
            ParamType::String,
            ParamType::Uint,
            ParamType::Bool,
        ];
        assert_eq!(decode(&types, &data).unwrap(), tokens);
    }

    #[test]
    fn truncated_data_is_an_error() {
        let data = encode(&[Token::String("evidence".into())]);
        let err = decode(&[ParamType::String], &data[..40]).unwrap_err();
        assert!(matches!(err, AbiError::ShortData { .. }));
    }

    #[test]
    fn bool_word_must_be_zero_or_one() {
        let mut data = encode(&[Token::Uint(U256::from(2u64))]);
        assert_eq!(decode(&[ParamType::Bool], &data), Err(AbiError::InvalidBool));
        data[31] = 1;
        assert_eq!(decode(&[ParamType::Bool], &data), Ok(vec![Token::Bool(true)]));
    }

    #[test]
    fn reader_reports_type_mismatch() {
        let mut reader = TokenReader::new(vec![Token::Bool(true)]);
        assert_eq!(
            reader.address(),
            Err(AbiError::UnexpectedType { expected: "address" })
        );
    }

    #[test]
    fn split_call_requires_selector() {
        assert!(split_call(&[0x01, 0x02]).is_err());
        let call = encode_call("owner()", &[]);
        let (sel, args) = split_call(&call).unwrap();
        assert_eq!(sel, selector("owner()"));
        assert!(args.is_empty());
    }
}
