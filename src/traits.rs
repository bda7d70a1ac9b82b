// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Core trait abstractions for transfer operations.
//!
//! Every phase talks to the outside world through these traits: the three
//! on-chain gateways, the attestation oracle and the clock. Production
//! implementations live in [`crate::providers`]; fakes for tests live in
//! [`crate::testing`].
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use cctp_transfer::traits::AttestationProvider;
//! use cctp_transfer::{AttestationLookup, Result};
//! use alloy_primitives::B256;
//!
//! struct AlwaysPending;
//!
//! #[async_trait::async_trait]
//! impl AttestationProvider for AlwaysPending {
//!     async fn get_attestation(&self, _message_hash: B256) -> Result<AttestationLookup> {
//!         Ok(AttestationLookup::Pending)
//!     }
//! }
//! ```

use alloy_primitives::{Address, Bytes, Log, TxHash, B256, U256};
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::network::NetworkId;
use crate::protocol::{AttestationLookup, DomainId};

/// A confirmed transaction, reduced to what the transfer phases inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// `false` when the transaction was mined but reverted
    pub success: bool,
    pub logs: Vec<Log>,
}

/// The USDC contract on one network, bound to a signing capability.
///
/// Writes wait for on-chain confirmation before returning.
#[async_trait]
pub trait StablecoinGateway: Send + Sync {
    /// Network this gateway is connected to.
    fn network(&self) -> NetworkId;

    /// Address of the token contract.
    fn address(&self) -> Address;

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;

    /// Submits `approve(spender, amount)` from `owner` and waits for the receipt.
    async fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<TxReceipt>;

    async fn balance_of(&self, account: Address) -> Result<U256>;

    async fn decimals(&self) -> Result<u8>;

    async fn transfer(&self, owner: Address, to: Address, amount: U256) -> Result<TxReceipt>;
}

/// The TokenMessenger contract on a source network.
#[async_trait]
pub trait TokenMessengerGateway: Send + Sync {
    /// Submits `depositForBurn` from `owner` and waits for the receipt.
    async fn deposit_for_burn(
        &self,
        owner: Address,
        amount: U256,
        destination_domain: DomainId,
        mint_recipient: B256,
        burn_token: Address,
    ) -> Result<TxReceipt>;
}

/// The MessageTransmitter contract on a destination network.
#[async_trait]
pub trait MessageTransmitterGateway: Send + Sync {
    fn network(&self) -> NetworkId;

    /// Submits `receiveMessage(message, attestation)` from `caller` and waits
    /// for the receipt.
    async fn receive_message(
        &self,
        caller: Address,
        message: Bytes,
        attestation: Bytes,
    ) -> Result<TxReceipt>;

    /// Whether `usedNonces[key]` is set, i.e. the message was already received.
    async fn is_nonce_used(&self, key: B256) -> Result<bool>;
}

/// Trait for attestation retrieval from Circle's Iris API.
///
/// Implementations report a missing attestation as
/// [`AttestationLookup::NotFound`] rather than an error, so pollers can tell
/// "not yet" apart from a failed request.
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Performs a single lookup for `message_hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP request fails
    /// - The API rate limits the caller or returns an unexpected status
    /// - The response cannot be parsed
    async fn get_attestation(&self, message_hash: B256) -> Result<AttestationLookup>;
}

/// Trait for time-based operations.
///
/// Lets tests step through polling loops without waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);

    fn now(&self) -> Instant;
}
