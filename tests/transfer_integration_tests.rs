// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Integration tests for the transfer client using fake implementations
//!
//! Every phase runs against in-memory chains and a scripted attestation
//! service, so failure paths can be asserted by counting the calls that did
//! (or did not) happen.

use alloy_primitives::{address, Address, Bytes, U256};
use cctp_transfer::testing::{FakeAttestationProvider, FakeChain, FakeClock, FakeRpcFailure};
use cctp_transfer::{
    AttestationLookup, AttestationState, BalanceFetchFailure, DomainId, NetworkConfig, NetworkId,
    NetworkRegistry, PollingConfig, TransferClient, TransferError, TransferRequest, TransferStatus,
};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const OWNER: Address = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
const RECIPIENT: Address = address!("8ba1f109551bD432803012645Ac136ddd64DBA72");
const RELAYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// 100 USDC in base units
const HUNDRED: u64 = 100_000_000;

struct Harness {
    client: TransferClient,
    source: FakeChain,
    destination: FakeChain,
    attestation: FakeAttestationProvider,
    clock: FakeClock,
}

fn harness() -> Harness {
    let attestation = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    let source = FakeChain::new(NetworkConfig::for_network(NetworkId::Sepolia));
    let destination = FakeChain::new(NetworkConfig::for_network(NetworkId::ArbitrumSepolia));

    let client = TransferClient::builder()
        .registry(Arc::new(NetworkRegistry::testnets()))
        .attestation_provider(Arc::new(attestation.clone()))
        .clock(Arc::new(clock.clone()))
        .build()
        .with_balance_gateway(Arc::new(source.clone()))
        .with_balance_gateway(Arc::new(destination.clone()));

    Harness {
        client,
        source,
        destination,
        attestation,
        clock,
    }
}

fn request(amount: &str) -> TransferRequest {
    TransferRequest::builder()
        .amount(amount)
        .from_network(NetworkId::Sepolia)
        .to_network(NetworkId::ArbitrumSepolia)
        .recipient(RECIPIENT)
        .build()
}

fn attestation_bytes() -> Bytes {
    Bytes::from(vec![0xab; 65])
}

// ============================================================================
// Quote
// ============================================================================

#[test]
fn test_quote_is_one_to_one() {
    let quote = harness()
        .client
        .get_quote("100", NetworkId::Sepolia, NetworkId::ArbitrumSepolia)
        .unwrap();

    assert_eq!(quote.input_amount, "100");
    assert_eq!(quote.output_amount, "100");
    assert_eq!(quote.estimated_time, "15-20 minutes");
    assert_eq!(quote.fees, "0.005");
    assert_eq!(quote.bridge_fee, "0");
}

#[rstest]
#[case("0.000001")]
#[case("250.5")]
#[case("1000000")]
fn test_quote_output_matches_input(#[case] amount: &str) {
    let quote = harness()
        .client
        .get_quote(amount, NetworkId::BaseSepolia, NetworkId::Sepolia)
        .unwrap();

    assert_eq!(quote.output_amount, quote.input_amount);
    assert_eq!(quote.bridge_fee, "0");
}

#[test]
fn test_quote_rejects_mainnet_on_testnet_registry() {
    let err = harness()
        .client
        .get_quote("100", NetworkId::Ethereum, NetworkId::ArbitrumSepolia)
        .unwrap_err();

    assert!(matches!(err, TransferError::UnsupportedNetwork { .. }));
    assert!(!err.is_retryable());
}

// ============================================================================
// Burn
// ============================================================================

#[tokio::test]
async fn test_burn_with_sufficient_allowance_skips_approval() {
    let h = harness();
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.set_balance(U256::from(HUNDRED));

    let transfer = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap();

    assert_eq!(h.source.approve_calls(), 0);
    assert_eq!(h.source.burn_calls(), 1);
    assert_eq!(transfer.status(), TransferStatus::Pending);
    assert_eq!(transfer.amount(), Some(U256::from(HUNDRED)));
    assert_eq!(transfer.source_domain(), Some(DomainId::Ethereum));
    assert_eq!(h.source.last_message().as_ref(), Some(transfer.message_bytes()));
}

#[tokio::test]
async fn test_burn_short_by_ten_units_never_burns() {
    let h = harness();
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.set_balance(U256::from(HUNDRED - 10));

    let err = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransferError::InsufficientBalance { required, available }
            if required == U256::from(HUNDRED) && available == U256::from(HUNDRED - 10)
    ));
    assert_eq!(err.shortfall(), Some(U256::from(10)));
    assert_eq!(h.source.burn_calls(), 0);
}

#[tokio::test]
async fn test_repeated_burns_never_reapprove() {
    let h = harness();
    h.source.set_allowance(U256::from(2 * HUNDRED));
    h.source.set_balance(U256::from(2 * HUNDRED));

    for _ in 0..2 {
        h.client
            .initiate_burn(&request("100"), OWNER, &h.source)
            .await
            .unwrap();
    }

    assert_eq!(h.source.approve_calls(), 0);
    assert_eq!(h.source.burn_calls(), 2);
}

#[tokio::test]
async fn test_approval_then_burn() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));

    h.client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap();

    assert_eq!(h.source.approve_calls(), 1);
    assert_eq!(h.source.burn_calls(), 1);
    // One wait before the new allowance was seen
    assert_eq!(h.clock.sleep_count(), 1);
    assert_eq!(h.clock.total_sleep_time(), Duration::from_secs(1));
}

#[tokio::test]
async fn test_retry_after_failed_burn_reuses_approval() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));
    h.source.fail_burn(FakeRpcFailure::Transport);

    let err = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::BurnFailure { .. }));
    assert!(err.is_retryable());

    h.source.heal();
    h.client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap();

    assert_eq!(h.source.approve_calls(), 1);
    assert_eq!(h.source.burn_calls(), 2);
}

#[tokio::test]
async fn test_reverted_approval_stops_before_burn() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));
    h.source.revert_approve();

    let err = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::ApprovalFailure { .. }));
    assert_eq!(h.source.burn_calls(), 0);
}

#[tokio::test]
async fn test_reverted_burn_is_retryable() {
    let h = harness();
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.set_balance(U256::from(HUNDRED));
    h.source.revert_burn();

    let err = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::BurnFailure { .. }));
    assert!(err.is_retryable());
    assert_eq!(h.source.current_balance(), U256::from(HUNDRED));
}

#[tokio::test]
async fn test_burn_without_message_sent_log() {
    let h = harness();
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.set_balance(U256::from(HUNDRED));
    h.source.omit_message_sent();

    let err = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::MessageLogNotFound { logs: 1, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_burn_rejects_gateway_for_other_network() {
    let h = harness();

    let err = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.destination)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidConfig(_)));
    assert_eq!(h.destination.burn_calls(), 0);
}

#[rstest]
#[case("0")]
#[case("-5")]
#[case("1.0000001")]
#[case("abc")]
#[tokio::test]
async fn test_burn_rejects_bad_amounts(#[case] amount: &str) {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));

    let err = h
        .client
        .initiate_burn(&request(amount), OWNER, &h.source)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidAmount { .. }));
    assert_eq!(h.source.approve_calls(), 0);
    assert_eq!(h.source.burn_calls(), 0);
}

// ============================================================================
// Attestation
// ============================================================================

#[tokio::test]
async fn test_attestation_gives_up_after_twenty_attempts() {
    let h = harness();
    let message_hash = alloy_primitives::B256::repeat_byte(0x11);
    h.attestation.add_always_not_found(message_hash);

    let err = h
        .client
        .fetch_attestation(message_hash, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::AttestationTimeout { attempts: 20 }));
    assert!(err.is_retryable());
    assert_eq!(h.attestation.call_count(message_hash), 20);
    assert_eq!(h.clock.sleep_count(), 19);
    assert!(h.clock.sleeps().iter().all(|d| *d == Duration::from_secs(30)));
}

#[tokio::test]
async fn test_attestation_for_real_burn() {
    let h = harness();
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.set_balance(U256::from(HUNDRED));

    let transfer = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap();
    h.attestation
        .add_pending_then_complete(transfer.message_hash(), 2, attestation_bytes());

    assert_eq!(
        h.client.transfer_status(transfer.message_hash()).await.unwrap(),
        AttestationState::Pending
    );

    let attestation = h
        .client
        .fetch_attestation(transfer.message_hash(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(attestation, attestation_bytes());
    assert_eq!(h.attestation.call_count(transfer.message_hash()), 3);
}

#[tokio::test(start_paused = true)]
async fn test_attestation_wait_can_be_cancelled() {
    let attestation = FakeAttestationProvider::new();
    let client = TransferClient::builder()
        .registry(Arc::new(NetworkRegistry::testnets()))
        .attestation_provider(Arc::new(attestation.clone()))
        .build();
    let message_hash = alloy_primitives::B256::repeat_byte(0x22);
    attestation.add_always_not_found(message_hash);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(45)).await;
        trigger.cancel();
    });

    let err = client
        .fetch_attestation(message_hash, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Cancelled));
    assert_eq!(attestation.call_count(message_hash), 2);
}

// ============================================================================
// Mint
// ============================================================================

async fn attested_message(h: &Harness) -> (Bytes, Bytes) {
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.set_balance(U256::from(HUNDRED));
    let transfer = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap();
    (transfer.message_bytes().clone(), attestation_bytes())
}

#[tokio::test]
async fn test_mint_then_replay_fails_fast() {
    let h = harness();
    let (message, attestation) = attested_message(&h).await;

    let tx_hash = h
        .client
        .complete_mint(&message, &attestation, NetworkId::ArbitrumSepolia, RELAYER, &h.destination)
        .await
        .unwrap();
    assert!(!tx_hash.is_zero());
    assert_eq!(h.destination.minted(), U256::from(HUNDRED));

    let err = h
        .client
        .complete_mint(&message, &attestation, NetworkId::ArbitrumSepolia, RELAYER, &h.destination)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::MintFailure { .. }));
    assert!(!err.is_retryable());
    assert_eq!(h.destination.receive_calls(), 1);
}

#[tokio::test]
async fn test_mint_rejects_message_for_another_domain() {
    let h = harness();
    let (message, attestation) = attested_message(&h).await;
    let base = FakeChain::new(NetworkConfig::for_network(NetworkId::BaseSepolia));

    let err = h
        .client
        .complete_mint(&message, &attestation, NetworkId::BaseSepolia, RELAYER, &base)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::MintFailure { .. }));
    assert_eq!(base.receive_calls(), 0);
}

#[tokio::test]
async fn test_mint_rejects_gateway_for_other_network() {
    let h = harness();
    let (message, attestation) = attested_message(&h).await;

    let err = h
        .client
        .complete_mint(&message, &attestation, NetworkId::ArbitrumSepolia, RELAYER, &h.source)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidConfig(_)));
    assert_eq!(h.source.receive_calls(), 0);
}

#[tokio::test]
async fn test_mint_rejects_empty_attestation() {
    let h = harness();
    let (message, _) = attested_message(&h).await;

    let err = h
        .client
        .complete_mint(&message, &Bytes::new(), NetworkId::ArbitrumSepolia, RELAYER, &h.destination)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::MintFailure { .. }));
    assert_eq!(h.destination.receive_calls(), 0);
}

#[tokio::test]
async fn test_reverted_mint() {
    let h = harness();
    let (message, attestation) = attested_message(&h).await;
    h.destination.revert_receive();

    let err = h
        .client
        .complete_mint(&message, &attestation, NetworkId::ArbitrumSepolia, RELAYER, &h.destination)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::MintFailure { .. }));
    assert_eq!(h.destination.receive_calls(), 1);
    assert_eq!(h.destination.minted(), U256::ZERO);
}

#[tokio::test]
async fn test_complete_transfer_requires_attestation() {
    let h = harness();
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.set_balance(U256::from(HUNDRED));
    let mut transfer = h
        .client
        .initiate_burn(&request("100"), OWNER, &h.source)
        .await
        .unwrap();

    let err = h
        .client
        .complete_transfer(&mut transfer, RELAYER, &h.destination)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransferError::InvalidTransition {
            from: TransferStatus::Pending,
            to: TransferStatus::Completed
        }
    ));
    assert_eq!(transfer.status(), TransferStatus::Pending);
    assert_eq!(h.destination.receive_calls(), 0);
}

// ============================================================================
// Full transfer
// ============================================================================

#[tokio::test]
async fn test_execute_transfer_end_to_end() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));
    h.attestation
        .set_fallback(AttestationLookup::Complete(attestation_bytes()));

    let transfer = h
        .client
        .execute_transfer(
            &request("100"),
            OWNER,
            &h.source,
            RELAYER,
            &h.destination,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(transfer.status(), TransferStatus::Completed);
    assert_eq!(transfer.attestation(), Some(&attestation_bytes()));
    assert!(transfer.destination_tx_hash().is_some());
    assert_eq!(h.source.current_balance(), U256::ZERO);
    assert_eq!(h.destination.minted(), U256::from(HUNDRED));
    assert_eq!(h.attestation.call_count(transfer.message_hash()), 1);
}

#[tokio::test]
async fn test_execute_transfer_cancelled_before_burn() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h
        .client
        .execute_transfer(&request("100"), OWNER, &h.source, RELAYER, &h.destination, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Cancelled));
    assert_eq!(h.source.approve_calls(), 0);
    assert_eq!(h.source.burn_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_execute_transfer_cancelled_while_burn_unconfirmed() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));
    h.source.set_allowance(U256::from(HUNDRED));
    h.source.delay_burn(Duration::from_secs(3600));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let err = h
        .client
        .execute_transfer(&request("100"), OWNER, &h.source, RELAYER, &h.destination, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(3600));
    assert_eq!(h.source.burn_calls(), 1);
    assert_eq!(h.destination.receive_calls(), 0);
}

#[tokio::test]
async fn test_execute_transfer_rejects_same_network() {
    let h = harness();
    let request = TransferRequest::builder()
        .amount("100")
        .from_network(NetworkId::Sepolia)
        .to_network(NetworkId::Sepolia)
        .recipient(RECIPIENT)
        .build();

    let err = h
        .client
        .execute_transfer(&request, OWNER, &h.source, RELAYER, &h.source, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidRequest(_)));
    assert_eq!(h.source.burn_calls(), 0);
}

// ============================================================================
// Balances
// ============================================================================

#[tokio::test]
async fn test_balance_read() {
    let h = harness();
    h.destination.set_balance(U256::from(1_234_560u64));

    let reading = h
        .client
        .get_usdc_balance(&RECIPIENT.to_string(), "arbitrumSepolia", &CancellationToken::new())
        .await;

    assert_eq!(reading.amount, "1.23456");
    assert!(!reading.degraded);
}

#[tokio::test]
async fn test_balance_reverted_call_reads_zero() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));
    h.source.fail_balance(FakeRpcFailure::Revert);

    let reading = h
        .client
        .get_usdc_balance(&OWNER.to_string(), "sepolia", &CancellationToken::new())
        .await;

    assert_eq!(reading.amount, "0.00");
    assert!(reading.degraded);
    assert_eq!(reading.reason, Some(BalanceFetchFailure::CallException));
}

#[rstest]
#[case(FakeRpcFailure::RateLimited, BalanceFetchFailure::RateLimited)]
#[case(FakeRpcFailure::Transport, BalanceFetchFailure::NetworkError)]
#[tokio::test]
async fn test_balance_failures_are_classified(
    #[case] failure: FakeRpcFailure,
    #[case] reason: BalanceFetchFailure,
) {
    let h = harness();
    h.source.fail_balance(failure);

    let reading = h
        .client
        .get_usdc_balance(&OWNER.to_string(), "sepolia", &CancellationToken::new())
        .await;

    assert_eq!(reading.amount, "0.00");
    assert_eq!(reading.reason, Some(reason));
}

#[tokio::test(start_paused = true)]
async fn test_slow_balance_read_times_out() {
    let h = harness();
    h.source.set_balance(U256::from(HUNDRED));
    h.source.delay_balance(Duration::from_secs(11));

    let started = tokio::time::Instant::now();
    let reading = h
        .client
        .get_usdc_balance(&OWNER.to_string(), "sepolia", &CancellationToken::new())
        .await;

    assert_eq!(reading.amount, "0.00");
    assert_eq!(reading.reason, Some(BalanceFetchFailure::Timeout));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));
}

#[tokio::test]
async fn test_balance_unknown_network_reads_zero() {
    let h = harness();

    let reading = h
        .client
        .get_usdc_balance(
            "0x742d35cc6634c0532925a3b844bc9e7595f8fa0d",
            "solana",
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(reading.amount, "0.00");
    assert_eq!(reading.reason, Some(BalanceFetchFailure::UnsupportedNetwork));
    insta::assert_snapshot!(
        serde_json::to_string(&reading).unwrap(),
        @r#"{"address":"0x742d35cc6634c0532925a3b844bc9e7595f8fa0d","network":"solana","amount":"0.00","degraded":true,"reason":"unsupported-network"}"#
    );
}

#[tokio::test]
async fn test_custom_polling_is_honored() {
    let attestation = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    let client = TransferClient::builder()
        .registry(Arc::new(NetworkRegistry::testnets()))
        .attestation_provider(Arc::new(attestation.clone()))
        .clock(Arc::new(clock.clone()))
        .polling(PollingConfig::default().with_max_attempts(3).with_poll_interval_secs(5))
        .build();
    let message_hash = alloy_primitives::B256::repeat_byte(0x33);

    let err = client
        .fetch_attestation(message_hash, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::AttestationTimeout { attempts: 3 }));
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(10));
}
