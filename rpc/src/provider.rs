//! The provider boundary.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use shield_types::{ChainId, TxHash};

use crate::error::RpcError;
use crate::types::{CallRequest, Log, LogFilter, TransactionReceipt, TransactionRequest};

/// The chain operations the governance client needs from a node or wallet.
///
/// Signing happens behind `send_transaction`: the endpoint owns the key for
/// `request.from` and may refuse ([`RpcError::UserRejected`]).
#[async_trait]
pub trait ChainProvider: Send + Sync {
    async fn chain_id(&self) -> Result<ChainId, RpcError>;

    async fn block_number(&self) -> Result<u64, RpcError>;

    /// Native-currency balance in wei.
    async fn balance(&self, account: Address) -> Result<U256, RpcError>;

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError>;

    async fn estimate_gas(&self, request: &CallRequest) -> Result<U256, RpcError>;

    async fn gas_price(&self) -> Result<U256, RpcError>;

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, RpcError>;

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, RpcError>;

    /// `None` until the transaction is mined.
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError>;
}
