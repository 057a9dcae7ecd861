//! JSON-RPC 2.0 over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use shield_types::{ChainId, TxHash};
use tracing::{debug, trace};

use crate::error::RpcError;
use crate::hexutil;
use crate::provider::ChainProvider;
use crate::types::{
    CallRequest, Log, LogFilter, RawLog, RawReceipt, TransactionReceipt, TransactionRequest,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider backed by an HTTP JSON-RPC endpoint.
///
/// `eth_sendTransaction` is forwarded as-is, so the endpoint must manage the
/// sender's key (a wallet bridge, or a dev node with unlocked accounts).
pub struct HttpProvider {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| RpcError::Unreachable(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and return its `result` (possibly `null`).
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(id, method, "rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout(format!("{method}: {e}"))
                } else if e.is_connect() {
                    RpcError::Unreachable(format!("connection failed: {e}"))
                } else {
                    RpcError::Unreachable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(RpcError::Unreachable(format!(
                "endpoint returned HTTP {}",
                response.status()
            )));
        }

        let parsed: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        if let Some(err) = parsed.error {
            debug!(method, code = err.code, message = %err.message, "rpc error");
            // Revert reasons sometimes arrive only in `data`.
            let message = match err.data {
                Some(Value::String(data)) if !err.message.contains(&data) => {
                    format!("{} ({data})", err.message)
                }
                _ => err.message,
            };
            return Err(RpcError::from_error_object(err.code, &message));
        }

        Ok(parsed.result)
    }

    async fn request_str(&self, method: &str, params: Value) -> Result<String, RpcError> {
        match self.request(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(RpcError::InvalidResponse(format!(
                "{method}: expected string, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl ChainProvider for HttpProvider {
    async fn chain_id(&self) -> Result<ChainId, RpcError> {
        let s = self.request_str("eth_chainId", json!([])).await?;
        hexutil::parse_quantity_u64(&s).map(ChainId::new)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let s = self.request_str("eth_blockNumber", json!([])).await?;
        hexutil::parse_quantity_u64(&s)
    }

    async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        let s = self
            .request_str("eth_getBalance", json!([account.to_string(), "latest"]))
            .await?;
        hexutil::parse_quantity(&s)
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError> {
        let s = self
            .request_str("eth_call", json!([request.to_json(), "latest"]))
            .await?;
        hexutil::parse_data(&s)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<U256, RpcError> {
        let s = self
            .request_str("eth_estimateGas", json!([request.to_json()]))
            .await?;
        hexutil::parse_quantity(&s)
    }

    async fn gas_price(&self) -> Result<U256, RpcError> {
        let s = self.request_str("eth_gasPrice", json!([])).await?;
        hexutil::parse_quantity(&s)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, RpcError> {
        let value = self.request("eth_getLogs", json!([filter.to_json()])).await?;
        let raw: Vec<RawLog> = serde_json::from_value(value)
            .map_err(|e| RpcError::InvalidResponse(format!("eth_getLogs: {e}")))?;
        raw.into_iter().map(Log::try_from).collect()
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, RpcError> {
        let s = self
            .request_str("eth_sendTransaction", json!([request.to_json()]))
            .await?;
        hexutil::parse_b256(&s)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let value = self
            .request("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        let raw: RawReceipt = serde_json::from_value(value)
            .map_err(|e| RpcError::InvalidResponse(format!("eth_getTransactionReceipt: {e}")))?;
        TransactionReceipt::try_from(raw).map(Some)
    }
}
