// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Tracing span helpers for transfer operations
//!
//! Span names are static (`cctp_transfer.*`) and carry structured attributes
//! only. Phase spans declare empty `error.*` fields that
//! [`record_error`] / [`record_error_with_context`] fill in on failure, plus an
//! `otel.status_code` that flips to `ERROR`.
//!
//! # Example
//!
//! ```rust,no_run
//! use cctp_transfer::spans;
//! use alloy_primitives::B256;
//! use tracing::Instrument;
//!
//! # async fn example() {
//! let span = spans::fetch_attestation(&B256::ZERO, 20, 30);
//! async {
//!     // custom polling logic
//! }
//! .instrument(span)
//! .await;
//! # }
//! ```

use alloy_primitives::{Address, B256};
use tracing::Span;

use crate::network::NetworkId;

/// Span for the whole burn phase: allowance, approval, balance, burn, extraction.
///
/// Children: gateway calls
#[inline]
pub fn initiate_burn(
    from_network: NetworkId,
    to_network: NetworkId,
    owner: &Address,
    recipient: &Address,
    amount: &str,
) -> Span {
    tracing::info_span!(
        "cctp_transfer.initiate_burn",
        from_network = %from_network,
        to_network = %to_network,
        owner = %owner,
        recipient = %recipient,
        amount = amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for polling the attestation service with retries.
///
/// Children: cctp_transfer.attestation_attempt (one per request)
#[inline]
pub fn fetch_attestation(message_hash: &B256, max_attempts: u32, poll_interval_secs: u64) -> Span {
    tracing::info_span!(
        "cctp_transfer.fetch_attestation",
        message_hash = %message_hash,
        max_attempts = max_attempts,
        poll_interval_secs = poll_interval_secs,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for one attestation request.
#[inline]
pub fn attestation_attempt(attempt: u32, max_attempts: u32) -> Span {
    tracing::debug_span!(
        "cctp_transfer.attestation_attempt",
        attempt = attempt,
        max_attempts = max_attempts,
    )
}

/// Span for submitting `receiveMessage` on the destination network.
#[inline]
pub fn complete_mint(
    to_network: NetworkId,
    caller: &Address,
    message_len: usize,
    attestation_len: usize,
) -> Span {
    tracing::info_span!(
        "cctp_transfer.complete_mint",
        to_network = %to_network,
        caller = %caller,
        message_len_bytes = message_len,
        attestation_len_bytes = attestation_len,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for a single timeout-bounded balance read.
#[inline]
pub fn read_balance(network: &str, address: &str, timeout_ms: u64) -> Span {
    tracing::debug_span!(
        "cctp_transfer.read_balance",
        network = network,
        address = address,
        timeout_ms = timeout_ms,
        reason = tracing::field::Empty,
    )
}

/// Span for a full burn, attest and mint run.
///
/// Children: the three phase spans
#[inline]
pub fn execute_transfer(from_network: NetworkId, to_network: NetworkId, amount: &str) -> Span {
    tracing::info_span!(
        "cctp_transfer.execute_transfer",
        from_network = %from_network,
        to_network = %to_network,
        amount = amount,
        message_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Record error attributes on the current span.
///
/// `error.type` is the text before the first `:` of the error message.
pub fn record_error<E: std::error::Error>(error: &E) {
    let message = error.to_string();
    let current_span = Span::current();
    current_span.record(
        "error.type",
        message.split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.context", source.to_string().as_str());
    }
}

/// Record error attributes with custom context on the current span.
///
/// # Example
///
/// ```rust,no_run
/// use cctp_transfer::spans;
///
/// spans::record_error_with_context(
///     "MessageLogNotFound",
///     "MessageSent event not found in transaction logs",
///     Some("Transaction contained 3 logs"),
/// );
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
