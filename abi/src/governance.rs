//! Quadratic-voting governance contract: calls, return values and events.

use alloy_primitives::{Address, B256, U256};

use crate::codec::{
    address_word, encode, encode_call, event_topic, topic_address, topic_uint, ParamType, Token,
    TokenReader,
};
use crate::error::AbiError;

/// Canonical function and event signatures.
pub mod signatures {
    pub const OWNER: &str = "owner()";
    pub const SHIELD_TOKEN: &str = "shieldToken()";
    pub const GET_PROPOSAL: &str = "getProposal(uint256)";
    pub const GET_VOTE: &str = "getVote(uint256,address)";
    pub const IS_SCAMMER: &str = "isScammer(address)";
    pub const PROPOSAL_COUNT: &str = "proposalCount()";
    pub const SUBMIT_PROPOSAL: &str = "submitProposal(address,string,string)";
    pub const CAST_VOTE: &str = "castVote(uint256,bool,uint256)";
    pub const EXECUTE_PROPOSAL: &str = "executeProposal(uint256)";

    pub const PROPOSAL_CREATED: &str = "ProposalCreated(uint256,address,address,string,string)";
    pub const VOTE_CAST: &str = "VoteCast(uint256,address,bool,uint256,uint256)";
    pub const PROPOSAL_EXECUTED: &str = "ProposalExecuted(uint256,bool)";
}

// ── Calls ───────────────────────────────────────────────────────────────

pub fn owner() -> Vec<u8> {
    encode_call(signatures::OWNER, &[])
}

pub fn shield_token() -> Vec<u8> {
    encode_call(signatures::SHIELD_TOKEN, &[])
}

pub fn get_proposal(proposal_id: U256) -> Vec<u8> {
    encode_call(signatures::GET_PROPOSAL, &[Token::Uint(proposal_id)])
}

pub fn get_vote(proposal_id: U256, voter: Address) -> Vec<u8> {
    encode_call(
        signatures::GET_VOTE,
        &[Token::Uint(proposal_id), Token::Address(voter)],
    )
}

pub fn is_scammer(account: Address) -> Vec<u8> {
    encode_call(signatures::IS_SCAMMER, &[Token::Address(account)])
}

pub fn proposal_count() -> Vec<u8> {
    encode_call(signatures::PROPOSAL_COUNT, &[])
}

pub fn submit_proposal(suspicious_address: Address, description: &str, evidence: &str) -> Vec<u8> {
    encode_call(
        signatures::SUBMIT_PROPOSAL,
        &[
            Token::Address(suspicious_address),
            Token::String(description.to_string()),
            Token::String(evidence.to_string()),
        ],
    )
}

pub fn cast_vote(proposal_id: U256, support: bool, tokens: U256) -> Vec<u8> {
    encode_call(
        signatures::CAST_VOTE,
        &[Token::Uint(proposal_id), Token::Bool(support), Token::Uint(tokens)],
    )
}

pub fn execute_proposal(proposal_id: U256) -> Vec<u8> {
    encode_call(signatures::EXECUTE_PROPOSAL, &[Token::Uint(proposal_id)])
}

// ── Return values ───────────────────────────────────────────────────────

/// Return of `getProposal(uint256)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRecord {
    pub reporter: Address,
    pub suspicious_address: Address,
    pub description: String,
    pub evidence: String,
    pub votes_for: U256,
    pub votes_against: U256,
    pub is_active: bool,
}

const PROPOSAL_RECORD: [ParamType; 7] = [
    ParamType::Address,
    ParamType::Address,
    ParamType::String,
    ParamType::String,
    ParamType::Uint,
    ParamType::Uint,
    ParamType::Bool,
];

impl ProposalRecord {
    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        let mut r = TokenReader::decode(&PROPOSAL_RECORD, data)?;
        Ok(Self {
            reporter: r.address()?,
            suspicious_address: r.address()?,
            description: r.string()?,
            evidence: r.string()?,
            votes_for: r.uint()?,
            votes_against: r.uint()?,
            is_active: r.boolean()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode(&[
            Token::Address(self.reporter),
            Token::Address(self.suspicious_address),
            Token::String(self.description.clone()),
            Token::String(self.evidence.clone()),
            Token::Uint(self.votes_for),
            Token::Uint(self.votes_against),
            Token::Bool(self.is_active),
        ])
    }
}

/// Return of `getVote(uint256,address)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteInfo {
    pub has_voted: bool,
    pub support: bool,
    pub tokens: U256,
    pub power: U256,
}

impl VoteInfo {
    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        let mut r = TokenReader::decode(
            &[ParamType::Bool, ParamType::Bool, ParamType::Uint, ParamType::Uint],
            data,
        )?;
        Ok(Self {
            has_voted: r.boolean()?,
            support: r.boolean()?,
            tokens: r.uint()?,
            power: r.uint()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode(&[
            Token::Bool(self.has_voted),
            Token::Bool(self.support),
            Token::Uint(self.tokens),
            Token::Uint(self.power),
        ])
    }
}

/// Decode a single `address` return value.
pub fn decode_address(data: &[u8]) -> Result<Address, AbiError> {
    TokenReader::decode(&[ParamType::Address], data)?.address()
}

/// Decode a single `uint256` return value.
pub fn decode_uint(data: &[u8]) -> Result<U256, AbiError> {
    TokenReader::decode(&[ParamType::Uint], data)?.uint()
}

/// Decode a single `bool` return value.
pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    TokenReader::decode(&[ParamType::Bool], data)?.boolean()
}

// ── Events ──────────────────────────────────────────────────────────────

pub fn proposal_created_topic() -> B256 {
    event_topic(signatures::PROPOSAL_CREATED)
}

pub fn vote_cast_topic() -> B256 {
    event_topic(signatures::VOTE_CAST)
}

pub fn proposal_executed_topic() -> B256 {
    event_topic(signatures::PROPOSAL_EXECUTED)
}

fn expect_topic(topics: &[B256], index: usize) -> Result<&B256, AbiError> {
    topics.get(index).ok_or(AbiError::MissingTopic(index))
}

fn check_signature(topics: &[B256], expected: B256, name: &'static str) -> Result<(), AbiError> {
    if *expect_topic(topics, 0)? != expected {
        return Err(AbiError::TopicMismatch(name));
    }
    Ok(())
}

/// `ProposalCreated(uint256 indexed proposalId, address indexed reporter,
/// address indexed suspiciousAddress, string description, string evidence)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalCreated {
    pub proposal_id: U256,
    pub reporter: Address,
    pub suspicious_address: Address,
    pub description: String,
    pub evidence: String,
}

impl ProposalCreated {
    pub fn decode(topics: &[B256], data: &[u8]) -> Result<Self, AbiError> {
        check_signature(topics, proposal_created_topic(), "ProposalCreated")?;
        let mut r = TokenReader::decode(&[ParamType::String, ParamType::String], data)?;
        Ok(Self {
            proposal_id: topic_uint(expect_topic(topics, 1)?),
            reporter: topic_address(expect_topic(topics, 2)?),
            suspicious_address: topic_address(expect_topic(topics, 3)?),
            description: r.string()?,
            evidence: r.string()?,
        })
    }

    pub fn encode(&self) -> (Vec<B256>, Vec<u8>) {
        let topics = vec![
            proposal_created_topic(),
            B256::from(self.proposal_id.to_be_bytes::<32>()),
            address_word(self.reporter),
            address_word(self.suspicious_address),
        ];
        let data = encode(&[
            Token::String(self.description.clone()),
            Token::String(self.evidence.clone()),
        ]);
        (topics, data)
    }
}

/// `VoteCast(uint256 indexed proposalId, address indexed voter, bool support,
/// uint256 tokens, uint256 power)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteCast {
    pub proposal_id: U256,
    pub voter: Address,
    pub support: bool,
    pub tokens: U256,
    pub power: U256,
}

impl VoteCast {
    pub fn decode(topics: &[B256], data: &[u8]) -> Result<Self, AbiError> {
        check_signature(topics, vote_cast_topic(), "VoteCast")?;
        let mut r =
            TokenReader::decode(&[ParamType::Bool, ParamType::Uint, ParamType::Uint], data)?;
        Ok(Self {
            proposal_id: topic_uint(expect_topic(topics, 1)?),
            voter: topic_address(expect_topic(topics, 2)?),
            support: r.boolean()?,
            tokens: r.uint()?,
            power: r.uint()?,
        })
    }

    pub fn encode(&self) -> (Vec<B256>, Vec<u8>) {
        let topics = vec![
            vote_cast_topic(),
            B256::from(self.proposal_id.to_be_bytes::<32>()),
            address_word(self.voter),
        ];
        let data = encode(&[
            Token::Bool(self.support),
            Token::Uint(self.tokens),
            Token::Uint(self.power),
        ]);
        (topics, data)
    }
}

/// `ProposalExecuted(uint256 indexed proposalId, bool passed)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalExecuted {
    pub proposal_id: U256,
    pub passed: bool,
}

impl ProposalExecuted {
    pub fn decode(topics: &[B256], data: &[u8]) -> Result<Self, AbiError> {
        check_signature(topics, proposal_executed_topic(), "ProposalExecuted")?;
        let mut r = TokenReader::decode(&[ParamType::Bool], data)?;
        Ok(Self {
            proposal_id: topic_uint(expect_topic(topics, 1)?),
            passed: r.boolean()?,
        })
    }

    pub fn encode(&self) -> (Vec<B256>, Vec<u8>) {
        let topics = vec![
            proposal_executed_topic(),
            B256::from(self.proposal_id.to_be_bytes::<32>()),
        ];
        (topics, encode(&[Token::Bool(self.passed)]))
    }
}
