//! RPC error types and the single place provider errors are classified.

use thiserror::Error;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Geth's code for `eth_call`/`eth_estimateGas` reverts.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("request rejected by user: {0}")]
    UserRejected(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("execution reverted: {0}")]
    ExecutionReverted(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Classify a JSON-RPC error object.
    ///
    /// Wallets and nodes disagree on codes, so the message is consulted too.
    pub fn from_error_object(code: i64, message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if code == USER_REJECTED_CODE
            || lower.contains("user rejected")
            || lower.contains("user denied")
            || lower.contains("action_rejected")
        {
            Self::UserRejected(message.to_string())
        } else if lower.contains("insufficient funds") {
            Self::InsufficientFunds(message.to_string())
        } else if code == EXECUTION_REVERTED_CODE || lower.contains("execution reverted") {
            Self::ExecutionReverted(message.to_string())
        } else {
            Self::Rpc {
                code,
                message: message.to_string(),
            }
        }
    }

    /// Timeouts and connection failures; the caller may choose to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip1193_rejection_code() {
        assert!(matches!(
            RpcError::from_error_object(4001, "MetaMask Tx Signature: rejected"),
            RpcError::UserRejected(_)
        ));
    }

    #[test]
    fn rejection_by_message() {
        assert!(matches!(
            RpcError::from_error_object(-32603, "User denied transaction signature."),
            RpcError::UserRejected(_)
        ));
        assert!(matches!(
            RpcError::from_error_object(
                -32000,
                "user rejected transaction (action=\"sendTransaction\", code=ACTION_REJECTED)"
            ),
            RpcError::UserRejected(_)
        ));
    }

    #[test]
    fn insufficient_funds_message() {
        assert!(matches!(
            RpcError::from_error_object(-32000, "insufficient funds for gas * price + value"),
            RpcError::InsufficientFunds(_)
        ));
    }

    #[test]
    fn revert_by_code_or_message() {
        assert!(matches!(
            RpcError::from_error_object(3, "execution reverted: not owner"),
            RpcError::ExecutionReverted(_)
        ));
        assert!(matches!(
            RpcError::from_error_object(-32015, "Execution reverted"),
            RpcError::ExecutionReverted(_)
        ));
    }

    #[test]
    fn everything_else_keeps_code() {
        assert_eq!(
            RpcError::from_error_object(-32601, "method not found"),
            RpcError::Rpc {
                code: -32601,
                message: "method not found".into()
            }
        );
    }

    #[test]
    fn transient_errors() {
        assert!(RpcError::Timeout("x".into()).is_transient());
        assert!(RpcError::Unreachable("x".into()).is_transient());
        assert!(!RpcError::UserRejected("x".into()).is_transient());
    }
}
