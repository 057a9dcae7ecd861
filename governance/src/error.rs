use alloy_primitives::Address;
use shield_abi::AbiError;
use shield_rpc::RpcError;
use shield_types::{ChainId, TxHash};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GovernanceError {
    #[error("request cancelled in wallet")]
    UserCancelled,

    #[error("unsupported network {actual}: switch to {required}")]
    UnsupportedNetwork { required: String, actual: ChainId },

    #[error("no governance contract at {address}: {reason}")]
    ContractMismatch { address: Address, reason: String },

    #[error("insufficient funds for gas")]
    InsufficientFunds,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("no wallet connected")]
    NotConnected,

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("read failed: {0}")]
    Read(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GovernanceError {
    /// Classify a provider error raised while preparing or sending a transaction.
    pub fn from_write(err: RpcError) -> Self {
        match err {
            RpcError::UserRejected(_) => Self::UserCancelled,
            RpcError::InsufficientFunds(_) => Self::InsufficientFunds,
            other => Self::SubmissionFailed(other.to_string()),
        }
    }

    /// Classify a provider error raised by a read.
    pub fn from_read(err: RpcError) -> Self {
        Self::Read(err.to_string())
    }
}

impl From<AbiError> for GovernanceError {
    fn from(err: AbiError) -> Self {
        Self::Read(format!("undecodable response: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_errors_map_to_taxonomy() {
        assert_eq!(
            GovernanceError::from_write(RpcError::UserRejected("denied".into())),
            GovernanceError::UserCancelled
        );
        assert_eq!(
            GovernanceError::from_write(RpcError::InsufficientFunds("gas".into())),
            GovernanceError::InsufficientFunds
        );
        assert!(matches!(
            GovernanceError::from_write(RpcError::ExecutionReverted("not active".into())),
            GovernanceError::SubmissionFailed(msg) if msg.contains("not active")
        ));
    }

    #[test]
    fn read_errors_keep_message() {
        let err = GovernanceError::from_read(RpcError::Unreachable("refused".into()));
        assert!(matches!(err, GovernanceError::Read(msg) if msg.contains("refused")));
    }
}
