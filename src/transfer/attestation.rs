// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Bytes, B256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

use super::PollingConfig;
use crate::error::{Result, TransferError};
use crate::protocol::{AttestationLookup, AttestationState};
use crate::spans;
use crate::traits::{AttestationProvider, Clock};

/// Polls the attestation service for the signature over a burn message.
#[derive(Clone)]
pub struct AttestationClient {
    provider: Arc<dyn AttestationProvider>,
    clock: Arc<dyn Clock>,
    polling: PollingConfig,
}

impl AttestationClient {
    pub fn new(
        provider: Arc<dyn AttestationProvider>,
        clock: Arc<dyn Clock>,
        polling: PollingConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            polling,
        }
    }

    pub fn polling(&self) -> PollingConfig {
        self.polling
    }

    /// Blocks until the attestation for `message_hash` is available.
    ///
    /// Makes at most `max_attempts` requests with `poll_interval_secs` between
    /// consecutive ones. `404`, pending and erroring responses count as an
    /// attempt and are retried. A rate-limited request waits the service's
    /// `Retry-After` instead, capped at what is left of the polling budget.
    ///
    /// # Errors
    ///
    /// - `AttestationFailed` as soon as the service reports the attestation
    ///   as failed
    /// - `AttestationTimeout` once every attempt is used up (retryable: the
    ///   service remembers the burn)
    /// - `Cancelled` if `cancel` fires first
    pub async fn fetch_attestation(
        &self,
        message_hash: B256,
        cancel: &CancellationToken,
    ) -> Result<Bytes> {
        let span = spans::fetch_attestation(
            &message_hash,
            self.polling.max_attempts,
            self.polling.poll_interval_secs,
        );

        async move {
            let result = self.poll(message_hash, cancel).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn poll(&self, message_hash: B256, cancel: &CancellationToken) -> Result<Bytes> {
        let max_attempts = self.polling.max_attempts;

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(self.cancelled(attempt));
            }

            let lookup = tokio::select! {
                _ = cancel.cancelled() => return Err(self.cancelled(attempt)),
                lookup = self
                    .provider
                    .get_attestation(message_hash)
                    .instrument(spans::attestation_attempt(attempt, max_attempts)) => lookup,
            };

            let mut delay = self.polling.poll_interval();
            match lookup {
                Ok(AttestationLookup::Complete(attestation)) => {
                    info!(
                        attempt,
                        attestation_len = attestation.len(),
                        event = "attestation_complete"
                    );
                    return Ok(attestation);
                }
                Ok(AttestationLookup::NotFound) => {
                    debug!(attempt, event = "attestation_not_found");
                }
                Ok(AttestationLookup::Pending) => {
                    debug!(attempt, event = "attestation_pending");
                }
                Ok(AttestationLookup::Failed) => {
                    error!(attempt, event = "attestation_failed_status");
                    return Err(TransferError::AttestationFailed { message_hash });
                }
                Err(TransferError::RateLimitExceeded {
                    retry_after_seconds,
                }) => {
                    delay = self.rate_limit_delay(retry_after_seconds, attempt);
                    warn!(
                        attempt,
                        retry_after_seconds,
                        delay_secs = delay.as_secs(),
                        event = "attestation_rate_limited"
                    );
                }
                Err(e) => {
                    warn!(attempt, error = %e, event = "attestation_request_failed");
                }
            }

            if attempt < max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(self.cancelled(attempt)),
                    _ = self.clock.sleep(delay) => {}
                }
            }
        }

        error!(
            attempts = max_attempts,
            total_timeout_secs = self.polling.total_timeout_secs(),
            event = "attestation_timeout"
        );
        Err(TransferError::AttestationTimeout {
            attempts: max_attempts,
        })
    }

    /// `Retry-After`, but no longer than the intervals left after `attempt`.
    fn rate_limit_delay(&self, retry_after_seconds: u64, attempt: u32) -> Duration {
        let intervals_left = self.polling.max_attempts.saturating_sub(attempt);
        let remaining = self.polling.poll_interval() * intervals_left;
        Duration::from_secs(retry_after_seconds).min(remaining)
    }

    fn cancelled(&self, attempt: u32) -> TransferError {
        info!(attempt, event = "attestation_poll_cancelled");
        TransferError::Cancelled
    }

    /// Single, non-blocking status check for UI polling.
    ///
    /// Errors from the service are returned as-is; only the loop in
    /// [`AttestationClient::fetch_attestation`] treats them as retryable.
    pub async fn transfer_status(&self, message_hash: B256) -> Result<AttestationState> {
        let lookup = self.provider.get_attestation(message_hash).await?;
        let state = AttestationState::from(&lookup);
        debug!(message_hash = %message_hash, state = ?state, event = "transfer_status_checked");
        Ok(state)
    }
}
