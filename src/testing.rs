// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Test utilities and fake implementations
//!
//! In-memory stand-ins for every [`crate::traits`] seam, so the transfer
//! phases can be driven through success and failure paths without a chain or
//! the attestation service:
//!
//! - [`FakeChain`]: one network's stablecoin, TokenMessenger and
//!   MessageTransmitter, with switchable failures and call counters
//! - [`FakeAttestationProvider`]: scripted attestation responses per message hash
//! - [`FakeClock`]: records sleeps instead of waiting

use alloy_primitives::{keccak256, Address, Bytes, Log, TxHash, B256, U256};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::contracts::MessageSent;
use crate::error::{Result, TransferError};
use crate::network::{NetworkConfig, NetworkId};
use crate::protocol::{AttestationLookup, BurnMessage, DomainId, MessageHeader};
use crate::traits::{
    AttestationProvider, Clock, MessageTransmitterGateway, StablecoinGateway,
    TokenMessengerGateway, TxReceipt,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Fake Chain
// ============================================================================

/// How a simulated RPC call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeRpcFailure {
    /// Provider answered 429
    RateLimited,
    /// The call reverted
    Revert,
    /// Connection-level failure
    Transport,
}

impl FakeRpcFailure {
    fn to_error(self) -> TransferError {
        match self {
            Self::RateLimited => TransferError::RateLimitExceeded {
                retry_after_seconds: 1,
            },
            Self::Revert => TransferError::ContractCall("execution reverted".to_string()),
            Self::Transport => TransferError::Provider("connection reset by peer".to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct ChainState {
    balance: U256,
    allowance: U256,
    decimals_failure: bool,
    allowance_failure: Option<FakeRpcFailure>,
    balance_failure: Option<FakeRpcFailure>,
    balance_delay: Option<Duration>,
    approve_failure: Option<FakeRpcFailure>,
    approve_reverts: bool,
    burn_failure: Option<FakeRpcFailure>,
    burn_reverts: bool,
    burn_delay: Option<Duration>,
    omit_message_sent: bool,
    receive_reverts: bool,
    used_nonces: HashSet<B256>,
    next_nonce: u64,
    tx_count: u64,
    approve_calls: usize,
    allowance_calls: usize,
    balance_calls: usize,
    burn_calls: usize,
    receive_calls: usize,
    last_message: Option<Bytes>,
    minted: U256,
}

impl ChainState {
    fn next_tx_hash(&mut self, network: NetworkId) -> TxHash {
        self.tx_count += 1;
        keccak256(format!("{network}:{}", self.tx_count))
    }
}

/// A single network's CCTP contracts held in memory.
///
/// Clones share state, so a test can keep one handle for assertions and hand
/// another to the code under test.
///
/// A burn emits a well-formed v1 `MessageSent` log; receiving a message marks
/// its nonce as used, so receiving it again reverts.
#[derive(Clone, Debug)]
pub struct FakeChain {
    config: NetworkConfig,
    state: Arc<Mutex<ChainState>>,
}

impl FakeChain {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(ChainState {
                next_nonce: 1,
                ..ChainState::default()
            })),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn set_balance(&self, balance: U256) {
        lock(&self.state).balance = balance;
    }

    pub fn set_allowance(&self, allowance: U256) {
        lock(&self.state).allowance = allowance;
    }

    /// Nonce the next burn message carries.
    pub fn set_next_nonce(&self, nonce: u64) {
        lock(&self.state).next_nonce = nonce;
    }

    pub fn fail_decimals(&self) {
        lock(&self.state).decimals_failure = true;
    }

    pub fn fail_allowance(&self, failure: FakeRpcFailure) {
        lock(&self.state).allowance_failure = Some(failure);
    }

    pub fn fail_balance(&self, failure: FakeRpcFailure) {
        lock(&self.state).balance_failure = Some(failure);
    }

    /// Makes `balance_of` take `delay` before answering.
    pub fn delay_balance(&self, delay: Duration) {
        lock(&self.state).balance_delay = Some(delay);
    }

    pub fn fail_approve(&self, failure: FakeRpcFailure) {
        lock(&self.state).approve_failure = Some(failure);
    }

    /// Approvals are mined but revert.
    pub fn revert_approve(&self) {
        lock(&self.state).approve_reverts = true;
    }

    pub fn fail_burn(&self, failure: FakeRpcFailure) {
        lock(&self.state).burn_failure = Some(failure);
    }

    pub fn revert_burn(&self) {
        lock(&self.state).burn_reverts = true;
    }

    /// Makes `deposit_for_burn` take `delay` before the burn lands.
    pub fn delay_burn(&self, delay: Duration) {
        lock(&self.state).burn_delay = Some(delay);
    }

    /// Burns succeed but emit no `MessageSent` log.
    pub fn omit_message_sent(&self) {
        lock(&self.state).omit_message_sent = true;
    }

    pub fn revert_receive(&self) {
        lock(&self.state).receive_reverts = true;
    }

    pub fn mark_nonce_used(&self, key: B256) {
        lock(&self.state).used_nonces.insert(key);
    }

    /// Clears every configured failure and delay.
    pub fn heal(&self) {
        let mut state = lock(&self.state);
        state.decimals_failure = false;
        state.allowance_failure = None;
        state.balance_failure = None;
        state.balance_delay = None;
        state.approve_failure = None;
        state.approve_reverts = false;
        state.burn_failure = None;
        state.burn_reverts = false;
        state.burn_delay = None;
        state.omit_message_sent = false;
        state.receive_reverts = false;
    }

    pub fn current_balance(&self) -> U256 {
        lock(&self.state).balance
    }

    pub fn current_allowance(&self) -> U256 {
        lock(&self.state).allowance
    }

    /// Total minted by received messages.
    pub fn minted(&self) -> U256 {
        lock(&self.state).minted
    }

    pub fn approve_calls(&self) -> usize {
        lock(&self.state).approve_calls
    }

    pub fn allowance_calls(&self) -> usize {
        lock(&self.state).allowance_calls
    }

    pub fn balance_calls(&self) -> usize {
        lock(&self.state).balance_calls
    }

    pub fn burn_calls(&self) -> usize {
        lock(&self.state).burn_calls
    }

    pub fn receive_calls(&self) -> usize {
        lock(&self.state).receive_calls
    }

    /// Message bytes emitted by the most recent burn.
    pub fn last_message(&self) -> Option<Bytes> {
        lock(&self.state).last_message.clone()
    }

    fn token_log(&self) -> Log {
        Log::new_unchecked(self.config.stablecoin_contract, vec![], Bytes::new())
    }
}

#[async_trait]
impl StablecoinGateway for FakeChain {
    fn network(&self) -> NetworkId {
        self.config.id
    }

    fn address(&self) -> Address {
        self.config.stablecoin_contract
    }

    async fn allowance(&self, _owner: Address, _spender: Address) -> Result<U256> {
        let mut state = lock(&self.state);
        state.allowance_calls += 1;
        match state.allowance_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(state.allowance),
        }
    }

    async fn approve(&self, _owner: Address, _spender: Address, amount: U256) -> Result<TxReceipt> {
        let mut state = lock(&self.state);
        state.approve_calls += 1;
        if let Some(failure) = state.approve_failure {
            return Err(failure.to_error());
        }

        let tx_hash = state.next_tx_hash(self.config.id);
        let success = !state.approve_reverts;
        if success {
            state.allowance = amount;
        }

        Ok(TxReceipt {
            tx_hash,
            success,
            logs: if success { vec![self.token_log()] } else { vec![] },
        })
    }

    async fn balance_of(&self, _account: Address) -> Result<U256> {
        let delay = {
            let mut state = lock(&self.state);
            state.balance_calls += 1;
            state.balance_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = lock(&self.state);
        match state.balance_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(state.balance),
        }
    }

    async fn decimals(&self) -> Result<u8> {
        if lock(&self.state).decimals_failure {
            return Err(FakeRpcFailure::Revert.to_error());
        }
        Ok(6)
    }

    async fn transfer(&self, _owner: Address, _to: Address, amount: U256) -> Result<TxReceipt> {
        let mut state = lock(&self.state);
        let tx_hash = state.next_tx_hash(self.config.id);
        let success = state.balance >= amount;
        if success {
            state.balance -= amount;
        }

        Ok(TxReceipt {
            tx_hash,
            success,
            logs: vec![],
        })
    }
}

#[async_trait]
impl TokenMessengerGateway for FakeChain {
    async fn deposit_for_burn(
        &self,
        owner: Address,
        amount: U256,
        destination_domain: DomainId,
        mint_recipient: B256,
        burn_token: Address,
    ) -> Result<TxReceipt> {
        let delay = {
            let mut state = lock(&self.state);
            state.burn_calls += 1;
            state.burn_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        if let Some(failure) = state.burn_failure {
            return Err(failure.to_error());
        }

        let tx_hash = state.next_tx_hash(self.config.id);
        // Same checks as the TokenMessenger: funds and allowance must cover the burn.
        if state.burn_reverts || state.balance < amount || state.allowance < amount {
            return Ok(TxReceipt {
                tx_hash,
                success: false,
                logs: vec![],
            });
        }

        state.balance -= amount;
        state.allowance -= amount;

        let nonce = state.next_nonce;
        state.next_nonce += 1;

        let message = MessageHeader {
            version: 0,
            source_domain: self.config.domain_id,
            destination_domain,
            nonce,
            sender: self.config.token_messenger.into_word(),
            recipient: self.config.token_messenger.into_word(),
            destination_caller: B256::ZERO,
            body: BurnMessage {
                version: 0,
                burn_token,
                mint_recipient: Address::from_word(mint_recipient),
                amount,
                message_sender: owner,
            }
            .encode(),
        }
        .encode();
        state.last_message = Some(message.clone());

        let mut logs = vec![self.token_log()];
        if !state.omit_message_sent {
            logs.push(Log {
                address: self.config.message_transmitter,
                data: MessageSent { message }.encode_log_data(),
            });
        }

        Ok(TxReceipt {
            tx_hash,
            success: true,
            logs,
        })
    }
}

#[async_trait]
impl MessageTransmitterGateway for FakeChain {
    fn network(&self) -> NetworkId {
        self.config.id
    }

    async fn receive_message(
        &self,
        _caller: Address,
        message: Bytes,
        attestation: Bytes,
    ) -> Result<TxReceipt> {
        let mut state = lock(&self.state);
        state.receive_calls += 1;

        let tx_hash = state.next_tx_hash(self.config.id);
        let header = MessageHeader::decode(&message);
        let accepted = match &header {
            Some(header) => {
                !state.receive_reverts
                    && !attestation.is_empty()
                    && header.destination_domain == self.config.domain_id
                    && state.used_nonces.insert(header.used_nonce_key())
            }
            None => false,
        };

        if accepted {
            if let Some(burn) = header.and_then(|h| h.burn_message()) {
                state.minted += burn.amount;
            }
        }

        Ok(TxReceipt {
            tx_hash,
            success: accepted,
            logs: vec![],
        })
    }

    async fn is_nonce_used(&self, key: B256) -> Result<bool> {
        Ok(lock(&self.state).used_nonces.contains(&key))
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

#[derive(Debug)]
struct Script {
    responses: VecDeque<Result<AttestationLookup>>,
    calls: usize,
}

/// A fake attestation provider returning scripted responses.
///
/// Each hash has its own queue of responses, consumed one per call. Once a
/// queue is empty (or for a hash never scripted) every call answers the
/// fallback, [`AttestationLookup::NotFound`] unless changed with
/// [`FakeAttestationProvider::set_fallback`].
#[derive(Clone, Debug)]
pub struct FakeAttestationProvider {
    scripts: Arc<Mutex<HashMap<B256, Script>>>,
    fallback: Arc<Mutex<AttestationLookup>>,
}

impl Default for FakeAttestationProvider {
    fn default() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            fallback: Arc::new(Mutex::new(AttestationLookup::NotFound)),
        }
    }
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for hashes whose script is exhausted or missing.
    pub fn set_fallback(&self, lookup: AttestationLookup) {
        *lock(&self.fallback) = lookup;
    }

    /// Configure a sequence of responses for a message hash.
    pub fn add_response_sequence(&self, message_hash: B256, responses: Vec<Result<AttestationLookup>>) {
        lock(&self.scripts).insert(
            message_hash,
            Script {
                responses: responses.into(),
                calls: 0,
            },
        );
    }

    /// Configure an immediate complete response.
    pub fn add_complete_response(&self, message_hash: B256, attestation: Bytes) {
        self.add_response_sequence(message_hash, vec![Ok(AttestationLookup::Complete(attestation))]);
    }

    /// `pending` responses before the attestation completes.
    pub fn add_pending_then_complete(&self, message_hash: B256, pending: usize, attestation: Bytes) {
        let mut responses: Vec<_> = (0..pending).map(|_| Ok(AttestationLookup::Pending)).collect();
        responses.push(Ok(AttestationLookup::Complete(attestation)));
        self.add_response_sequence(message_hash, responses);
    }

    /// Configure a hash the service never learns about.
    pub fn add_always_not_found(&self, message_hash: B256) {
        self.add_response_sequence(message_hash, vec![]);
    }

    /// Number of lookups made for a message hash.
    pub fn call_count(&self, message_hash: B256) -> usize {
        lock(&self.scripts)
            .get(&message_hash)
            .map(|script| script.calls)
            .unwrap_or(0)
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_attestation(&self, message_hash: B256) -> Result<AttestationLookup> {
        let fallback = lock(&self.fallback).clone();
        let mut scripts = lock(&self.scripts);
        let script = scripts.entry(message_hash).or_insert_with(|| Script {
            responses: VecDeque::new(),
            calls: 0,
        });
        script.calls += 1;

        script.responses.pop_front().unwrap_or(Ok(fallback))
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that records sleeps and returns immediately.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *lock(&self.current_time) += duration;
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        lock(&self.sleep_log).iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        lock(&self.sleep_log).len()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleep_log).clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        lock(&self.sleep_log).push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *lock(&self.current_time)
    }
}
