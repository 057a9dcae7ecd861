//! Request and response shapes for the `eth_*` methods the client uses.

use alloy_primitives::{Address, B256, U256};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::RpcError;
use crate::hexutil;

/// A read-only call (`eth_call`) or a gas estimate (`eth_estimateGas`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Vec<u8>,
}

impl CallRequest {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            from: None,
            to,
            data,
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(from) = self.from {
            obj.insert("from".into(), json!(from.to_string()));
        }
        obj.insert("to".into(), json!(self.to.to_string()));
        obj.insert("data".into(), json!(hexutil::data(&self.data)));
        Value::Object(obj)
    }
}

/// A transaction for the endpoint to sign and broadcast (`eth_sendTransaction`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
    pub gas: Option<U256>,
    pub gas_price: Option<U256>,
}

impl TransactionRequest {
    pub fn new(from: Address, to: Address, data: Vec<u8>) -> Self {
        Self {
            from,
            to,
            data,
            gas: None,
            gas_price: None,
        }
    }

    pub fn gas(mut self, gas: U256) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn gas_price(mut self, price: U256) -> Self {
        self.gas_price = Some(price);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("from".into(), json!(self.from.to_string()));
        obj.insert("to".into(), json!(self.to.to_string()));
        obj.insert("data".into(), json!(hexutil::data(&self.data)));
        if let Some(gas) = self.gas {
            obj.insert("gas".into(), json!(hexutil::quantity(gas)));
        }
        if let Some(price) = self.gas_price {
            obj.insert("gasPrice".into(), json!(hexutil::quantity(price)));
        }
        Value::Object(obj)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockTag {
    Earliest,
    Latest,
    Number(u64),
}

impl BlockTag {
    pub fn to_json(self) -> Value {
        match self {
            Self::Earliest => json!("earliest"),
            Self::Latest => json!("latest"),
            Self::Number(n) => json!(hexutil::quantity_u64(n)),
        }
    }

    fn admits(self, block: u64, lower_bound: bool) -> bool {
        match self {
            Self::Earliest => lower_bound || block == 0,
            Self::Latest => true,
            Self::Number(n) if lower_bound => block >= n,
            Self::Number(n) => block <= n,
        }
    }
}

/// An `eth_getLogs` filter over one contract.
///
/// `topics[i] == None` matches any value at position `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub topics: Vec<Option<B256>>,
    pub from_block: BlockTag,
    pub to_block: BlockTag,
}

impl LogFilter {
    /// All logs of `address` from genesis to the head.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            topics: Vec::new(),
            from_block: BlockTag::Earliest,
            to_block: BlockTag::Latest,
        }
    }

    pub fn event(self, topic0: B256) -> Self {
        self.topic(0, topic0)
    }

    pub fn topic(mut self, index: usize, value: B256) -> Self {
        if self.topics.len() <= index {
            self.topics.resize(index + 1, None);
        }
        self.topics[index] = Some(value);
        self
    }

    pub fn from_block(mut self, tag: BlockTag) -> Self {
        self.from_block = tag;
        self
    }

    pub fn to_block(mut self, tag: BlockTag) -> Self {
        self.to_block = tag;
        self
    }

    /// Node-side matching rules, for in-memory providers.
    pub fn matches(&self, log: &Log) -> bool {
        if log.address != self.address {
            return false;
        }
        if let Some(block) = log.block_number {
            if !self.from_block.admits(block, true) || !self.to_block.admits(block, false) {
                return false;
            }
        }
        self.topics.iter().enumerate().all(|(i, want)| match want {
            None => true,
            Some(want) => log.topics.get(i) == Some(want),
        })
    }

    pub fn to_json(&self) -> Value {
        let topics: Vec<Value> = self
            .topics
            .iter()
            .map(|t| match t {
                Some(t) => json!(t.to_string()),
                None => Value::Null,
            })
            .collect();
        json!({
            "address": self.address.to_string(),
            "topics": topics,
            "fromBlock": self.from_block.to_json(),
            "toBlock": self.to_block.to_json(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    /// `true` when the transaction executed without reverting.
    pub status: bool,
    pub gas_used: U256,
}

// Wire shapes. Everything arrives as hex strings.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLog {
    address: String,
    topics: Vec<String>,
    data: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    log_index: Option<String>,
}

impl TryFrom<RawLog> for Log {
    type Error = RpcError;

    fn try_from(raw: RawLog) -> Result<Self, RpcError> {
        Ok(Self {
            address: hexutil::parse_address(&raw.address)?,
            topics: raw
                .topics
                .iter()
                .map(|t| hexutil::parse_b256(t))
                .collect::<Result<_, _>>()?,
            data: hexutil::parse_data(&raw.data)?,
            block_number: raw
                .block_number
                .as_deref()
                .map(hexutil::parse_quantity_u64)
                .transpose()?,
            transaction_hash: raw
                .transaction_hash
                .as_deref()
                .map(hexutil::parse_b256)
                .transpose()?,
            log_index: raw
                .log_index
                .as_deref()
                .map(hexutil::parse_quantity_u64)
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawReceipt {
    transaction_hash: String,
    block_number: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    gas_used: Option<String>,
}

impl TryFrom<RawReceipt> for TransactionReceipt {
    type Error = RpcError;

    fn try_from(raw: RawReceipt) -> Result<Self, RpcError> {
        // Pre-Byzantium receipts carry no status; treat them as successful.
        let status = match raw.status.as_deref() {
            Some(s) => !hexutil::parse_quantity(s)?.is_zero(),
            None => true,
        };
        Ok(Self {
            transaction_hash: hexutil::parse_b256(&raw.transaction_hash)?,
            block_number: hexutil::parse_quantity_u64(&raw.block_number)?,
            status,
            gas_used: raw
                .gas_used
                .as_deref()
                .map(hexutil::parse_quantity)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}
