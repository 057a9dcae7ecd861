use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("ABI data too short: need {needed} bytes, have {have}")]
    ShortData { needed: usize, have: usize },

    #[error("ABI offset {0} out of bounds")]
    OffsetOutOfBounds(usize),

    #[error("invalid bool word")]
    InvalidBool,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("expected {expected} token")]
    UnexpectedType { expected: &'static str },

    #[error("log is missing topic {0}")]
    MissingTopic(usize),

    #[error("log topic does not match {0}")]
    TopicMismatch(&'static str),

    #[error("unknown function selector 0x{0}")]
    UnknownSelector(String),
}
