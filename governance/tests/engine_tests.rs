use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use shield_abi::{governance as gov, token};
use shield_governance::engine::counters;
use shield_governance::{
    ChainSession, GovernanceConfig, GovernanceEngine, GovernanceError, NetworkTable,
    ScamAssessment,
};
use shield_nullables::{NullChain, ProviderCall, GOVERNANCE_ADDRESS, TOKEN_ADDRESS};
use shield_types::{ChainId, ProposalStatus, TokenAmount, VotingStats, SHIELD_DECIMALS};

fn user() -> Address {
    Address::repeat_byte(0x01)
}

fn other_voter() -> Address {
    Address::repeat_byte(0x02)
}

fn suspect() -> Address {
    Address::repeat_byte(0xba)
}

fn hex(addr: Address) -> String {
    format!("{addr:#x}")
}

fn tokens(whole: u64) -> TokenAmount {
    TokenAmount::from_whole(whole, SHIELD_DECIMALS)
}

fn one_ether() -> U256 {
    U256::from(1_000_000_000_000_000_000u128)
}

fn engine_for(chain: &Arc<NullChain>, signer: Address) -> GovernanceEngine<NullChain> {
    chain.fund(signer, one_ether());
    chain.mint(signer, tokens(1_000).raw());
    GovernanceEngine::new(
        ChainSession::with_signer(Arc::clone(chain), signer),
        NetworkTable::default(),
    )
    .with_poll_interval(Duration::from_millis(5))
}

fn setup() -> (Arc<NullChain>, GovernanceEngine<NullChain>) {
    let chain = Arc::new(NullChain::new());
    let engine = engine_for(&chain, user());
    (chain, engine)
}

async fn report(engine: &GovernanceEngine<NullChain>, target: Address) {
    engine
        .submit_proposal(&hex(target), "wallet drainer", "https://evidence.example/1")
        .await
        .unwrap()
        .wait(1)
        .await
        .unwrap();
}

async fn vote(engine: &GovernanceEngine<NullChain>, id: u64, support: bool, amount: TokenAmount) {
    engine
        .cast_vote(U256::from(id), support, amount)
        .await
        .unwrap()
        .wait(1)
        .await
        .unwrap();
}

// ── Submission ─────────────────────────────────────────────────────────

#[tokio::test]
async fn report_then_vote_scores_hundred() {
    let (_chain, engine) = setup();
    report(&engine, suspect()).await;
    vote(&engine, 0, true, tokens(10)).await;

    assert_eq!(engine.scam_score(suspect()).await, 100.0);
    assert_eq!(engine.assess(suspect()).await, ScamAssessment::Scored(100.0));

    let proposals = engine.list_proposals().await;
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].suspicious_address, suspect());
    assert_eq!(proposals[0].reporter, user());
    assert_eq!(proposals[0].votes_for, tokens(10));
    assert_eq!(proposals[0].status(), ProposalStatus::Active);
}

#[tokio::test]
async fn submission_applies_gas_margin_and_node_gas_price() {
    let (chain, engine) = setup();
    chain.set_gas_estimate(U256::from(200_000u64));
    chain.set_gas_price(U256::from(3_000_000_000u64));
    let pending = engine
        .submit_proposal(&hex(suspect()), "phishing site", "ipfs://bafy")
        .await
        .unwrap();

    let sent = chain.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, user());
    assert_eq!(sent[0].to, GOVERNANCE_ADDRESS);
    assert_eq!(sent[0].gas, Some(U256::from(240_000u64)));
    assert_eq!(sent[0].gas_price, Some(U256::from(3_000_000_000u64)));
    assert_eq!(
        sent[0].data,
        gov::submit_proposal(suspect(), "phishing site", "ipfs://bafy")
    );

    let receipt = pending.wait(1).await.unwrap();
    assert!(receipt.status);
    assert_eq!(receipt.transaction_hash, pending.hash());
    assert_eq!(engine.stats().get(counters::PROPOSALS_SUBMITTED), 1);
}

#[tokio::test]
async fn submission_requires_a_signer() {
    let chain = Arc::new(NullChain::new());
    let engine = GovernanceEngine::new(ChainSession::new(chain.clone()), NetworkTable::default());
    let err = engine
        .submit_proposal(&hex(suspect()), "x", "y")
        .await
        .unwrap_err();
    assert_eq!(err, GovernanceError::NotConnected);
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn unsupported_chain_only_reads_chain_id() {
    let chain = Arc::new(NullChain::with_chain_id(ChainId::new(137)));
    let engine = engine_for(&chain, user());
    let err = engine
        .submit_proposal(&hex(suspect()), "x", "y")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GovernanceError::UnsupportedNetwork {
            required: "Monad Testnet".into(),
            actual: ChainId::new(137),
        }
    );
    assert_eq!(chain.calls(), vec![ProviderCall::ChainId]);
}

#[tokio::test]
async fn listed_but_undeployed_chain_is_unsupported() {
    let chain = Arc::new(NullChain::with_chain_id(ChainId::SEPOLIA));
    let engine = engine_for(&chain, user());
    let err = engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::UnsupportedNetwork { actual, .. } if actual == ChainId::SEPOLIA
    ));
}

#[tokio::test]
async fn name_on_governance_chain_fails_without_name_service_call() {
    let (chain, engine) = setup();
    let err = engine
        .submit_proposal("scammer.eth", "x", "y")
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidAddress(_)));
    let resolver = chain.ens_resolver();
    assert!(!chain.calls().iter().any(|c| c.is_name_service(resolver)));
    assert!(chain.sent_transactions().is_empty());
}

#[tokio::test]
async fn malformed_hex_is_invalid() {
    let (_chain, engine) = setup();
    let err = engine
        .submit_proposal("0x1234", "x", "y")
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidAddress(_)));
}

#[tokio::test]
async fn empty_wallet_is_rejected_before_sending() {
    let chain = Arc::new(NullChain::new());
    let engine = GovernanceEngine::new(
        ChainSession::with_signer(chain.clone(), user()),
        NetworkTable::default(),
    );
    let err = engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap_err();
    assert_eq!(err, GovernanceError::InsufficientFunds);
    assert!(!chain
        .calls()
        .iter()
        .any(|c| matches!(c, ProviderCall::SendTransaction { .. })));
}

#[tokio::test]
async fn balance_below_gas_cost_is_insufficient_funds() {
    let (chain, engine) = setup();
    chain.fund(user(), U256::from(1_000u64));
    let err = engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap_err();
    assert_eq!(err, GovernanceError::InsufficientFunds);
    assert!(chain
        .calls()
        .iter()
        .any(|c| matches!(c, ProviderCall::SendTransaction { .. })));
    assert!(chain.sent_transactions().is_empty());
}

#[tokio::test]
async fn rejected_signature_is_user_cancelled() {
    let (chain, engine) = setup();
    chain.reject_signatures(true);
    let err = engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap_err();
    assert_eq!(err, GovernanceError::UserCancelled);
    assert!(chain.sent_transactions().is_empty());
}

#[tokio::test]
async fn missing_contract_is_a_mismatch() {
    let (chain, engine) = setup();
    chain.undeploy_governance();
    let err = engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::ContractMismatch { address, .. } if address == GOVERNANCE_ADDRESS
    ));
    assert!(!engine.verify_contract().await);
}

#[tokio::test]
async fn unreachable_node_is_a_read_error_not_a_mismatch() {
    let (chain, engine) = setup();
    chain.fail_reads(true);
    let err = engine.binding().await.unwrap_err();
    assert!(matches!(err, GovernanceError::Read(_)));
    let err = engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap_err();
    assert!(!matches!(err, GovernanceError::ContractMismatch { .. }));
    assert!(!engine.verify_contract().await);
}

#[tokio::test]
async fn network_switch_is_detected_on_next_write() {
    let (chain, engine) = setup();
    report(&engine, suspect()).await;
    assert!(engine.verify_contract().await);

    chain.set_chain_id(ChainId::MAINNET);
    let err = engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap_err();
    assert!(matches!(err, GovernanceError::UnsupportedNetwork { .. }));
}

// ── Voting ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_precedes_vote_when_allowance_is_short() {
    let (chain, engine) = setup();
    let id = chain.seed_proposal(other_voter(), suspect(), "rug pull", "https://e");
    let amount = TokenAmount::new(U256::from(100u64));
    assert!(engine.needs_approval(amount).await.unwrap());

    vote(&engine, 0, true, amount).await;

    let sent = chain.sent_transactions();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, TOKEN_ADDRESS);
    assert_eq!(sent[0].data, token::approve(GOVERNANCE_ADDRESS, U256::from(100u64)));
    assert_eq!(sent[1].to, GOVERNANCE_ADDRESS);
    assert_eq!(sent[1].data, gov::cast_vote(id, true, U256::from(100u64)));

    // The approval receipt is read before the vote is estimated.
    let calls = chain.calls();
    let receipt_at = calls
        .iter()
        .position(|c| matches!(c, ProviderCall::TransactionReceipt(_)))
        .unwrap();
    let vote_estimate_at = calls
        .iter()
        .position(|c| {
            matches!(c, ProviderCall::EstimateGas { to, .. } if *to == GOVERNANCE_ADDRESS)
        })
        .unwrap();
    assert!(receipt_at < vote_estimate_at);
    assert_eq!(engine.stats().get(counters::APPROVALS_SENT), 1);
    assert_eq!(engine.stats().get(counters::VOTES_CAST), 1);
}

#[tokio::test]
async fn sufficient_allowance_skips_approval() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "rug pull", "https://e");
    chain.set_allowance(user(), GOVERNANCE_ADDRESS, tokens(50).raw());

    assert!(engine.ensure_allowance(tokens(5)).await.unwrap().is_none());
    vote(&engine, 0, false, tokens(5)).await;

    let sent = chain.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, GOVERNANCE_ADDRESS);
    assert_eq!(engine.token_allowance(user()).await.unwrap(), tokens(45));
}

#[tokio::test]
async fn reverted_approval_blocks_vote() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "rug pull", "https://e");
    chain.revert_approvals(true);

    let err = engine
        .cast_vote(U256::ZERO, true, tokens(3))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, GovernanceError::Reverted { .. }));

    let sent = chain.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, TOKEN_ADDRESS);
}

#[tokio::test]
async fn second_vote_on_same_proposal_fails() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "rug pull", "https://e");
    vote(&engine, 0, true, tokens(1)).await;

    let err = engine.cast_vote(U256::ZERO, true, tokens(1)).await.err().unwrap();
    assert!(matches!(err, GovernanceError::SubmissionFailed(_)));
}

#[tokio::test]
async fn vote_record_reports_on_chain_power() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "rug pull", "https://e");
    vote(&engine, 0, true, tokens(4)).await;

    let record = engine.get_vote(U256::ZERO, user()).await.unwrap();
    assert!(record.has_voted);
    assert!(record.support);
    assert_eq!(record.tokens, tokens(4));
    // sqrt(4e18) = 2e9
    assert_eq!(record.power, U256::from(2_000_000_000u64));
    assert_eq!(engine.vote_power(tokens(4)), 2.0);
    assert_eq!(chain.token_balance(user()), tokens(996).raw());
}

#[tokio::test]
async fn vote_history_lists_only_own_votes() {
    let chain = Arc::new(NullChain::new());
    let alice = engine_for(&chain, user());
    let bob = engine_for(&chain, other_voter());
    chain.seed_proposal(other_voter(), suspect(), "first", "https://1");
    chain.seed_proposal(other_voter(), Address::repeat_byte(0xcd), "second", "https://2");

    vote(&alice, 1, false, tokens(9)).await;
    vote(&bob, 0, true, tokens(1)).await;
    vote(&alice, 0, true, tokens(1)).await;

    let history = alice.vote_history(user()).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].proposal_id, U256::from(1u64));
    assert!(!history[0].support);
    assert_eq!(history[0].power, 3.0);
    assert!(history.iter().all(|v| v.voter == user()));
}

// ── Execution and flags ────────────────────────────────────────────────

#[tokio::test]
async fn executed_proposal_flags_address() {
    let (_chain, engine) = setup();
    report(&engine, suspect()).await;
    vote(&engine, 0, true, tokens(9)).await;
    assert!(!engine.is_scam_address(&hex(suspect())).await.unwrap());

    engine
        .execute_proposal(U256::ZERO)
        .await
        .unwrap()
        .wait(1)
        .await
        .unwrap();

    assert!(engine.is_scam_address(&hex(suspect())).await.unwrap());
    assert!(engine.check_scam_address(&hex(suspect())).await);
    let proposal = engine.get_proposal(U256::ZERO).await.unwrap();
    assert_eq!(proposal.status(), ProposalStatus::Approved);
    assert_eq!(engine.proposal_count().await.unwrap(), U256::from(1u64));
}

#[tokio::test]
async fn flag_set_on_chain_is_visible() {
    let (chain, engine) = setup();
    let flagged = Address::repeat_byte(0xee);
    chain.mark_scammer(flagged);
    assert!(engine.is_scam_address(&hex(flagged)).await.unwrap());
    assert!(!engine.is_scam_address(&hex(suspect())).await.unwrap());
}

#[tokio::test]
async fn scam_check_swallows_bad_input() {
    let (_chain, engine) = setup();
    assert!(!engine.check_scam_address("not an address").await);
    assert_eq!(engine.stats().get(counters::READ_ERRORS_SUPPRESSED), 1);
}

#[tokio::test]
async fn names_resolve_on_chains_with_a_name_service() {
    let chain = Arc::new(NullChain::with_chain_id(ChainId::MAINNET));
    chain.register_name("drainer.eth", suspect());
    let engine = GovernanceEngine::new(ChainSession::new(chain.clone()), NetworkTable::default());
    assert_eq!(engine.resolve("drainer.eth").await.unwrap(), suspect());
    assert!(matches!(
        engine.resolve("unknown.eth").await,
        Err(GovernanceError::InvalidAddress(_))
    ));
}

// ── Read models ────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_is_idempotent_with_unique_ids() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "first", "https://1");
    chain.seed_proposal(other_voter(), Address::repeat_byte(0xcd), "second", "https://2");
    report(&engine, suspect()).await;

    let first = engine.list_proposals().await;
    let second = engine.list_proposals().await;
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    let mut ids: Vec<U256> = first.iter().map(|p| p.id).collect();
    ids.dedup();
    assert_eq!(ids, vec![U256::ZERO, U256::from(1u64), U256::from(2u64)]);
}

#[tokio::test]
async fn user_reports_filter_by_reporter() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "theirs", "https://1");
    report(&engine, Address::repeat_byte(0xcd)).await;

    let mine = engine.user_reports().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].reporter, user());
    assert_eq!(mine[0].suspicious_address, Address::repeat_byte(0xcd));

    let anonymous =
        GovernanceEngine::new(ChainSession::new(chain.clone()), NetworkTable::default());
    assert!(anonymous.user_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_chain_degrades_listing_and_score() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "first", "https://1");
    chain.fail_reads(true);

    assert!(engine.list_proposals().await.is_empty());
    assert!(engine.try_list_proposals().await.is_err());
    assert_eq!(engine.assess(suspect()).await, ScamAssessment::Unknown);
    assert_eq!(engine.scam_score(suspect()).await, 0.0);
    assert_eq!(engine.stats().get(counters::READ_ERRORS_SUPPRESSED), 3);
}

#[tokio::test]
async fn unknown_address_scores_zero() {
    let (_chain, engine) = setup();
    report(&engine, suspect()).await;
    assert_eq!(engine.scam_score(Address::repeat_byte(0x77)).await, 0.0);
    // No votes yet on the report itself.
    assert_eq!(engine.scam_score(suspect()).await, 0.0);
}

#[tokio::test]
async fn accuracy_ignores_unexecuted_proposals() {
    let (chain, engine) = setup();
    chain.seed_proposal(other_voter(), suspect(), "first", "https://1");
    vote(&engine, 0, true, tokens(1)).await;

    assert_eq!(
        engine.voting_accuracy(user()).await.unwrap(),
        VotingStats {
            total_votes: 0,
            accuracy: 0
        }
    );
}

#[tokio::test]
async fn accuracy_counts_matching_outcomes() {
    let chain = Arc::new(NullChain::new());
    let alice = engine_for(&chain, user());
    let bob = engine_for(&chain, other_voter());
    chain.seed_proposal(other_voter(), suspect(), "first", "https://1");
    chain.seed_proposal(other_voter(), Address::repeat_byte(0xcd), "second", "https://2");

    vote(&alice, 0, true, tokens(1)).await;
    vote(&alice, 1, true, tokens(1)).await;
    vote(&bob, 1, false, tokens(4)).await;
    for id in [0u64, 1] {
        alice
            .execute_proposal(U256::from(id))
            .await
            .unwrap()
            .wait(1)
            .await
            .unwrap();
    }

    assert_eq!(
        alice.voting_accuracy(user()).await.unwrap(),
        VotingStats {
            total_votes: 2,
            accuracy: 50
        }
    );
    assert_eq!(
        alice.voting_accuracy(other_voter()).await.unwrap(),
        VotingStats {
            total_votes: 1,
            accuracy: 100
        }
    );
}

// ── Configuration ──────────────────────────────────────────────────────

#[tokio::test]
async fn engine_from_config_uses_account_and_margin() {
    let chain = Arc::new(NullChain::new());
    chain.fund(user(), one_ether());
    let config = GovernanceConfig {
        account: Some(hex(user())),
        gas_margin_percent: 50,
        poll_interval_ms: 5,
        ..GovernanceConfig::default()
    };
    let engine = GovernanceEngine::from_config(chain.clone(), &config).unwrap();
    assert_eq!(engine.session().signer(), Some(user()));

    engine.submit_proposal(&hex(suspect()), "x", "y").await.unwrap();
    assert_eq!(chain.sent_transactions()[0].gas, Some(U256::from(150_000u64)));
}

#[test]
fn bad_account_in_config_is_rejected() {
    let chain = Arc::new(NullChain::new());
    let config = GovernanceConfig {
        account: Some("0xnope".into()),
        ..GovernanceConfig::default()
    };
    assert!(matches!(
        GovernanceEngine::from_config(chain, &config),
        Err(GovernanceError::Config(_))
    ));
}
