//! Nullable chain: an in-memory JSON-RPC provider.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use alloy_primitives::{address, Address, B256, U256};
use async_trait::async_trait;
use shield_abi::ens;
use shield_rpc::{
    CallRequest, ChainProvider, Log, LogFilter, RpcError, TransactionReceipt, TransactionRequest,
};
use shield_types::{ChainId, TxHash};

use crate::contracts::{call_selector, Contracts, EmittedLog};

/// Where the governance contract lives on the simulated chain.
pub const GOVERNANCE_ADDRESS: Address = address!("7a791fe5a35131b7d98f854a64e7f94180f27c7b");

/// The SHIELD token the governance contract reports via `shieldToken()`.
pub const TOKEN_ADDRESS: Address = address!("5e1d000000000000000000000000000000000001");

/// Owner returned by `owner()`.
pub const OWNER_ADDRESS: Address = address!("0000000000000000000000000000000000000a11");

/// One provider method invocation, as observed by the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderCall {
    ChainId,
    BlockNumber,
    Balance(Address),
    Call { to: Address, selector: [u8; 4] },
    EstimateGas { to: Address, selector: [u8; 4] },
    GasPrice,
    GetLogs { address: Address, topic0: Option<B256> },
    SendTransaction { to: Address, selector: [u8; 4] },
    TransactionReceipt(TxHash),
}

impl ProviderCall {
    /// Whether the call went to the chain's name service (registry or resolver).
    pub fn is_name_service(&self, resolver: Address) -> bool {
        matches!(self, Self::Call { to, .. } if *to == ens::REGISTRY || *to == resolver)
    }
}

struct ChainState {
    chain_id: ChainId,
    block_number: u64,
    gas_price: U256,
    gas_estimate: U256,
    native_balances: HashMap<Address, U256>,
    contracts: Contracts,
    logs: Vec<Log>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    sent: Vec<TransactionRequest>,
    calls: Vec<ProviderCall>,
    reject_signatures: bool,
    fail_reads: bool,
    revert_approvals: bool,
    next_tx: u64,
}

/// A deterministic chain that runs the governance contract, the SHIELD token
/// and ENS in memory.
///
/// - every transaction is mined immediately in its own block
/// - every provider call is recorded in order (see [`NullChain::calls`])
/// - failures (signature rejection, unreachable reads, reverting approvals)
///   are switched on programmatically
///
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullChain {
    state: Mutex<ChainState>,
}

impl NullChain {
    /// A fresh chain on Monad testnet with the governance contract deployed.
    pub fn new() -> Self {
        Self::with_chain_id(ChainId::MONAD_TESTNET)
    }

    pub fn with_chain_id(chain_id: ChainId) -> Self {
        Self {
            state: Mutex::new(ChainState {
                chain_id,
                block_number: 1,
                gas_price: U256::from(1_000_000_000u64),
                gas_estimate: U256::from(100_000u64),
                native_balances: HashMap::new(),
                contracts: Contracts::new(GOVERNANCE_ADDRESS, TOKEN_ADDRESS, OWNER_ADDRESS),
                logs: Vec::new(),
                receipts: HashMap::new(),
                sent: Vec::new(),
                calls: Vec::new(),
                reject_signatures: false,
                fail_reads: false,
                revert_approvals: false,
                next_tx: 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ── Knobs ───────────────────────────────────────────────────────────

    /// Switch the chain the endpoint reports, as a wallet network switch would.
    pub fn set_chain_id(&self, chain_id: ChainId) {
        self.state().chain_id = chain_id;
    }

    /// Set an account's native balance (wei).
    pub fn fund(&self, account: Address, wei: U256) {
        self.state().native_balances.insert(account, wei);
    }

    /// Set an account's SHIELD token balance (smallest unit).
    pub fn mint(&self, account: Address, amount: U256) {
        self.state().contracts.token_balances.insert(account, amount);
    }

    pub fn set_allowance(&self, owner: Address, spender: Address, amount: U256) {
        self.state().contracts.allowances.insert((owner, spender), amount);
    }

    pub fn set_gas_estimate(&self, gas: U256) {
        self.state().gas_estimate = gas;
    }

    pub fn set_gas_price(&self, price: U256) {
        self.state().gas_price = price;
    }

    /// Refuse every signature request with EIP-1193 code 4001.
    pub fn reject_signatures(&self, reject: bool) {
        self.state().reject_signatures = reject;
    }

    /// Make `eth_call` and `eth_getLogs` fail as if the endpoint were down.
    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Mine `approve` transactions with status 0.
    pub fn revert_approvals(&self, revert: bool) {
        self.state().revert_approvals = revert;
    }

    /// Remove the governance contract's code; reads at its address return `0x`.
    pub fn undeploy_governance(&self) {
        self.state().contracts.deployed = false;
    }

    /// Register an ENS name.
    pub fn register_name(&self, name: &str, target: Address) {
        self.state().contracts.ens_names.insert(ens::namehash(name), target);
    }

    pub fn mark_scammer(&self, account: Address) {
        self.state().contracts.scammers.insert(account);
    }

    /// Create a proposal directly, emitting `ProposalCreated` in a new block.
    pub fn seed_proposal(
        &self,
        reporter: Address,
        suspicious_address: Address,
        description: &str,
        evidence: &str,
    ) -> U256 {
        let mut state = self.state();
        let id = state.contracts.create_proposal(
            reporter,
            suspicious_address,
            description.to_string(),
            evidence.to_string(),
        );
        let log = state.contracts.proposal_created_log(id);
        state.block_number += 1;
        let block = state.block_number;
        state.append_logs(vec![log], block, B256::ZERO);
        id
    }

    // ── Inspection ──────────────────────────────────────────────────────

    /// Every provider call so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Every transaction that reached `eth_sendTransaction` and was signed.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    pub fn token_balance(&self, account: Address) -> U256 {
        self.state().contracts.token_balance(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.state().contracts.allowance(owner, spender)
    }

    pub fn ens_resolver(&self) -> Address {
        self.state().contracts.ens_resolver
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState {
    fn record(&mut self, call: ProviderCall) {
        self.calls.push(call);
    }

    fn check_reads(&self) -> Result<(), RpcError> {
        if self.fail_reads {
            return Err(RpcError::Unreachable("connection refused".into()));
        }
        Ok(())
    }

    fn append_logs(&mut self, emitted: Vec<EmittedLog>, block: u64, tx: TxHash) {
        for log in emitted {
            let log_index = self.logs.len() as u64;
            self.logs.push(Log {
                address: log.address,
                topics: log.topics,
                data: log.data,
                block_number: Some(block),
                transaction_hash: Some(tx),
                log_index: Some(log_index),
            });
        }
    }

    fn next_hash(&mut self) -> TxHash {
        let n = self.next_tx;
        self.next_tx += 1;
        B256::from(U256::from(n).to_be_bytes::<32>())
    }
}

#[async_trait]
impl ChainProvider for NullChain {
    async fn chain_id(&self) -> Result<ChainId, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::ChainId);
        Ok(state.chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::BlockNumber);
        Ok(state.block_number)
    }

    async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::Balance(account));
        Ok(state.native_balances.get(&account).copied().unwrap_or_default())
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::Call {
            to: request.to,
            selector: call_selector(&request.data),
        });
        state.check_reads()?;
        state
            .contracts
            .read(request.to, &request.data)
            .map_err(|revert| RpcError::ExecutionReverted(revert.0))
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<U256, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::EstimateGas {
            to: request.to,
            selector: call_selector(&request.data),
        });
        // Dry-run on a copy so a reverting call fails here, as on a real node.
        let from = request.from.unwrap_or_default();
        let mut scratch = state.contracts.clone();
        scratch
            .execute(from, request.to, &request.data)
            .map_err(|revert| RpcError::ExecutionReverted(revert.0))?;
        Ok(state.gas_estimate)
    }

    async fn gas_price(&self) -> Result<U256, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::GasPrice);
        Ok(state.gas_price)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::GetLogs {
            address: filter.address,
            topic0: filter.topics.first().copied().flatten(),
        });
        state.check_reads()?;
        Ok(state.logs.iter().filter(|log| filter.matches(log)).cloned().collect())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, RpcError> {
        let mut state = self.state();
        let selector = call_selector(&request.data);
        state.record(ProviderCall::SendTransaction {
            to: request.to,
            selector,
        });
        if state.reject_signatures {
            return Err(RpcError::from_error_object(
                4001,
                "MetaMask Tx Signature: User denied transaction signature.",
            ));
        }
        let funds = state.native_balances.get(&request.from).copied().unwrap_or_default();
        let cost = request
            .gas
            .unwrap_or_default()
            .saturating_mul(request.gas_price.unwrap_or_default());
        if funds.is_zero() || funds < cost {
            return Err(RpcError::from_error_object(
                -32000,
                "insufficient funds for gas * price + value",
            ));
        }
        state.sent.push(request.clone());

        let hash = state.next_hash();
        state.block_number += 1;
        let block = state.block_number;

        let is_approval = request.to == state.contracts.token
            && selector == shield_abi::selector(shield_abi::token::signatures::APPROVE);
        let outcome = if is_approval && state.revert_approvals {
            Err(())
        } else {
            state
                .contracts
                .execute(request.from, request.to, &request.data)
                .map_err(|_| ())
        };
        let status = match outcome {
            Ok(logs) => {
                state.append_logs(logs, block, hash);
                true
            }
            Err(()) => false,
        };

        let receipt = TransactionReceipt {
            transaction_hash: hash,
            block_number: block,
            status,
            gas_used: state.gas_estimate,
        };
        state.receipts.insert(hash, receipt);
        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let mut state = self.state();
        state.record(ProviderCall::TransactionReceipt(hash));
        Ok(state.receipts.get(&hash).cloned())
    }
}
