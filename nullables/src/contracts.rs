//! In-memory behaviour of the governance contract, the stake token and ENS.
//!
//! Execution either applies fully and returns the emitted events, or fails
//! with a revert reason and leaves the state untouched.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, B256, U256};
use shield_abi::codec::{selector, split_call, ParamType, TokenReader};
use shield_abi::governance::{
    signatures as gov_sig, ProposalCreated, ProposalExecuted, ProposalRecord, VoteCast, VoteInfo,
};
use shield_abi::token::signatures as token_sig;
use shield_abi::{encode, ens, AbiError, Token};

/// An event produced by a successful execution, before it is placed in a block.
#[derive(Clone, Debug)]
pub(crate) struct EmittedLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug)]
pub(crate) struct Contracts {
    pub governance: Address,
    pub token: Address,
    pub owner: Address,
    pub ens_resolver: Address,
    pub deployed: bool,
    pub proposals: Vec<ProposalRecord>,
    pub votes: HashMap<(U256, Address), VoteInfo>,
    pub scammers: HashSet<Address>,
    pub token_balances: HashMap<Address, U256>,
    pub allowances: HashMap<(Address, Address), U256>,
    pub ens_names: HashMap<B256, Address>,
}

/// A revert reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Revert(pub String);

impl From<AbiError> for Revert {
    fn from(e: AbiError) -> Self {
        Self(e.to_string())
    }
}

impl From<&str> for Revert {
    fn from(reason: &str) -> Self {
        Self(reason.to_string())
    }
}

impl Contracts {
    pub fn new(governance: Address, token: Address, owner: Address) -> Self {
        Self {
            governance,
            token,
            owner,
            ens_resolver: Address::repeat_byte(0xe5),
            deployed: true,
            proposals: Vec::new(),
            votes: HashMap::new(),
            scammers: HashSet::new(),
            token_balances: HashMap::new(),
            allowances: HashMap::new(),
            ens_names: HashMap::new(),
        }
    }

    /// Answer an `eth_call`. Calls to addresses without code return empty data.
    pub fn read(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, Revert> {
        let (sel, args) = split_call(data)?;
        if to == self.governance && self.deployed {
            self.read_governance(sel, args)
        } else if to == self.token {
            self.read_token(sel, args)
        } else if to == ens::REGISTRY {
            let node = args_reader(&[ParamType::FixedBytes], args)?.fixed_bytes()?;
            let resolver = if self.ens_names.contains_key(&node) {
                self.ens_resolver
            } else {
                Address::ZERO
            };
            Ok(encode(&[Token::Address(resolver)]))
        } else if to == self.ens_resolver {
            let node = args_reader(&[ParamType::FixedBytes], args)?.fixed_bytes()?;
            let addr = self.ens_names.get(&node).copied().unwrap_or(Address::ZERO);
            Ok(encode(&[Token::Address(addr)]))
        } else {
            Ok(Vec::new())
        }
    }

    fn read_governance(&self, sel: [u8; 4], args: &[u8]) -> Result<Vec<u8>, Revert> {
        if sel == selector(gov_sig::OWNER) {
            Ok(encode(&[Token::Address(self.owner)]))
        } else if sel == selector(gov_sig::SHIELD_TOKEN) {
            Ok(encode(&[Token::Address(self.token)]))
        } else if sel == selector(gov_sig::PROPOSAL_COUNT) {
            Ok(encode(&[Token::Uint(U256::from(self.proposals.len() as u64))]))
        } else if sel == selector(gov_sig::GET_PROPOSAL) {
            let id = args_reader(&[ParamType::Uint], args)?.uint()?;
            Ok(self.proposal(id)?.encode())
        } else if sel == selector(gov_sig::GET_VOTE) {
            let mut r = args_reader(&[ParamType::Uint, ParamType::Address], args)?;
            let id = r.uint()?;
            let voter = r.address()?;
            Ok(self.votes.get(&(id, voter)).copied().unwrap_or_default().encode())
        } else if sel == selector(gov_sig::IS_SCAMMER) {
            let account = args_reader(&[ParamType::Address], args)?.address()?;
            Ok(encode(&[Token::Bool(self.scammers.contains(&account))]))
        } else {
            Err("unknown selector".into())
        }
    }

    fn read_token(&self, sel: [u8; 4], args: &[u8]) -> Result<Vec<u8>, Revert> {
        if sel == selector(token_sig::BALANCE_OF) {
            let account = args_reader(&[ParamType::Address], args)?.address()?;
            Ok(encode(&[Token::Uint(self.token_balance(account))]))
        } else if sel == selector(token_sig::ALLOWANCE) {
            let mut r = args_reader(&[ParamType::Address, ParamType::Address], args)?;
            let owner = r.address()?;
            let spender = r.address()?;
            Ok(encode(&[Token::Uint(self.allowance(owner, spender))]))
        } else {
            Err("unknown selector".into())
        }
    }

    /// Apply a transaction from `from`.
    pub fn execute(
        &mut self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Vec<EmittedLog>, Revert> {
        let (sel, args) = split_call(data)?;
        if to == self.governance && self.deployed {
            if sel == selector(gov_sig::SUBMIT_PROPOSAL) {
                let mut r = args_reader(
                    &[ParamType::Address, ParamType::String, ParamType::String],
                    args,
                )?;
                let suspicious = r.address()?;
                let description = r.string()?;
                let evidence = r.string()?;
                let id = self.create_proposal(from, suspicious, description, evidence);
                return Ok(vec![self.proposal_created_log(id)]);
            }
            if sel == selector(gov_sig::CAST_VOTE) {
                let mut r =
                    args_reader(&[ParamType::Uint, ParamType::Bool, ParamType::Uint], args)?;
                let id = r.uint()?;
                let support = r.boolean()?;
                let tokens = r.uint()?;
                return self.cast_vote(from, id, support, tokens);
            }
            if sel == selector(gov_sig::EXECUTE_PROPOSAL) {
                let id = args_reader(&[ParamType::Uint], args)?.uint()?;
                return self.execute_proposal(id);
            }
        } else if to == self.token && sel == selector(token_sig::APPROVE) {
            let mut r = args_reader(&[ParamType::Address, ParamType::Uint], args)?;
            let spender = r.address()?;
            let amount = r.uint()?;
            self.allowances.insert((from, spender), amount);
            return Ok(Vec::new());
        }
        Err("unsupported call".into())
    }

    pub fn create_proposal(
        &mut self,
        reporter: Address,
        suspicious_address: Address,
        description: String,
        evidence: String,
    ) -> U256 {
        let id = U256::from(self.proposals.len() as u64);
        self.proposals.push(ProposalRecord {
            reporter,
            suspicious_address,
            description,
            evidence,
            votes_for: U256::ZERO,
            votes_against: U256::ZERO,
            is_active: true,
        });
        id
    }

    pub fn proposal_created_log(&self, id: U256) -> EmittedLog {
        let record = &self.proposals[id.as_limbs()[0] as usize];
        let (topics, data) = ProposalCreated {
            proposal_id: id,
            reporter: record.reporter,
            suspicious_address: record.suspicious_address,
            description: record.description.clone(),
            evidence: record.evidence.clone(),
        }
        .encode();
        self.governance_log(topics, data)
    }

    fn cast_vote(
        &mut self,
        voter: Address,
        id: U256,
        support: bool,
        tokens: U256,
    ) -> Result<Vec<EmittedLog>, Revert> {
        if tokens.is_zero() {
            return Err("zero tokens".into());
        }
        if !self.proposal(id)?.is_active {
            return Err("proposal not active".into());
        }
        if self.votes.get(&(id, voter)).is_some_and(|v| v.has_voted) {
            return Err("already voted".into());
        }
        let balance = self.token_balance(voter);
        if balance < tokens {
            return Err("ERC20: transfer amount exceeds balance".into());
        }
        let allowance = self.allowance(voter, self.governance);
        if allowance < tokens {
            return Err("ERC20: insufficient allowance".into());
        }

        self.token_balances.insert(voter, balance - tokens);
        self.allowances.insert((voter, self.governance), allowance - tokens);
        let governance = self.governance;
        *self.token_balances.entry(governance).or_default() += tokens;

        let power = isqrt(tokens);
        let record = self.proposal_mut(id)?;
        if support {
            record.votes_for += tokens;
        } else {
            record.votes_against += tokens;
        }
        self.votes.insert(
            (id, voter),
            VoteInfo {
                has_voted: true,
                support,
                tokens,
                power,
            },
        );

        let (topics, data) = VoteCast {
            proposal_id: id,
            voter,
            support,
            tokens,
            power,
        }
        .encode();
        Ok(vec![self.governance_log(topics, data)])
    }

    fn execute_proposal(&mut self, id: U256) -> Result<Vec<EmittedLog>, Revert> {
        let record = self.proposal_mut(id)?;
        if !record.is_active {
            return Err("proposal already executed".into());
        }
        record.is_active = false;
        let passed = record.votes_for > record.votes_against;
        let suspicious = record.suspicious_address;
        if passed {
            self.scammers.insert(suspicious);
        }
        let (topics, data) = ProposalExecuted {
            proposal_id: id,
            passed,
        }
        .encode();
        Ok(vec![self.governance_log(topics, data)])
    }

    pub fn token_balance(&self, account: Address) -> U256 {
        self.token_balances.get(&account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    fn proposal(&self, id: U256) -> Result<&ProposalRecord, Revert> {
        index(id, self.proposals.len())
            .and_then(|i| self.proposals.get(i))
            .ok_or_else(|| Revert::from("proposal does not exist"))
    }

    fn proposal_mut(&mut self, id: U256) -> Result<&mut ProposalRecord, Revert> {
        index(id, self.proposals.len())
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or_else(|| Revert::from("proposal does not exist"))
    }

    fn governance_log(&self, topics: Vec<B256>, data: Vec<u8>) -> EmittedLog {
        EmittedLog {
            address: self.governance,
            topics,
            data,
        }
    }
}

fn args_reader(types: &[ParamType], args: &[u8]) -> Result<TokenReader, Revert> {
    Ok(TokenReader::decode(types, args)?)
}

fn index(id: U256, len: usize) -> Option<usize> {
    (id < U256::from(len as u64)).then(|| id.as_limbs()[0] as usize)
}

/// Integer square root (floor), as the contract computes vote power.
pub(crate) fn isqrt(n: U256) -> U256 {
    if n < U256::from(2u64) {
        return n;
    }
    let mut x = n;
    let mut y = (x >> 1) + (x & U256::from(1u64));
    while y < x {
        x = y;
        y = (x + n / x) >> 1;
    }
    x
}

/// Calldata selector helper for matching recorded calls.
pub(crate) fn call_selector(data: &[u8]) -> [u8; 4] {
    split_call(data).map(|(s, _)| s).unwrap_or_default()
}
