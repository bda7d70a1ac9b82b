// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Circle Iris API attestation provider implementation.

use alloy_primitives::B256;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, trace};
use url::Url;

use crate::error::{Result, TransferError};
use crate::protocol::{AttestationLookup, AttestationResponse};
use crate::traits::AttestationProvider;
use crate::transfer::{ATTESTATION_PATH, IRIS_API, IRIS_API_SANDBOX};

/// Seconds to back off when a 429 carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 300;

/// Attestation provider backed by Circle's Iris API.
///
/// # Examples
///
/// ```rust,no_run
/// use cctp_transfer::providers::IrisAttestationProvider;
/// use cctp_transfer::traits::AttestationProvider;
/// use alloy_primitives::B256;
///
/// # async fn example() -> Result<(), cctp_transfer::TransferError> {
/// let provider = IrisAttestationProvider::sandbox().with_api_key("my-key");
/// let lookup = provider.get_attestation(B256::ZERO).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a provider for the given API base URL, e.g. `https://iris-api.circle.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            client: Client::new(),
        }
    }

    pub fn production() -> Self {
        Self::new(IRIS_API)
    }

    /// Circle's sandbox environment, which attests testnet burns.
    pub fn sandbox() -> Self {
        Self::new(IRIS_API_SANDBOX)
    }

    /// Sends `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/v1/attestations/0x{hash}`
    pub fn attestation_url(&self, message_hash: B256) -> Result<Url> {
        let raw = format!(
            "{}{ATTESTATION_PATH}{message_hash}",
            self.base_url.trim_end_matches('/')
        );
        Url::parse(&raw).map_err(|e| TransferError::InvalidUrl {
            reason: format!("{raw}: {e}"),
        })
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    #[instrument(skip(self), fields(message_hash = %message_hash))]
    async fn get_attestation(&self, message_hash: B256) -> Result<AttestationLookup> {
        let url = self.attestation_url(message_hash)?;
        trace!(url = %url, event = "attestation_request_sent");

        let mut request = self.client.get(url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status_code = response.status();
        trace!(status_code = %status_code, event = "attestation_response_received");

        if status_code == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            debug!(
                retry_after_seconds = retry_after,
                event = "attestation_rate_limited"
            );
            return Err(TransferError::RateLimitExceeded {
                retry_after_seconds: retry_after,
            });
        }

        if status_code == StatusCode::NOT_FOUND {
            debug!(event = "attestation_not_found");
            return Ok(AttestationLookup::NotFound);
        }

        if !status_code.is_success() {
            debug!(status_code = %status_code, event = "attestation_request_failed");
            return Err(TransferError::AttestationRequest {
                status: status_code.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed: AttestationResponse = serde_json::from_slice(&body)?;
        debug!(status = ?parsed.status, event = "attestation_response_parsed");

        Ok(parsed.into_lookup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attestation_url() {
        let provider = IrisAttestationProvider::sandbox();
        let url = provider.attestation_url(B256::repeat_byte(0xab)).unwrap();
        insta::assert_snapshot!(
            url.as_str(),
            @"https://iris-api-sandbox.circle.com/v1/attestations/0xabababababababababababababababababababababababababababababababab"
        );
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let provider = IrisAttestationProvider::new("https://iris-api.circle.com/");
        let url = provider.attestation_url(B256::ZERO).unwrap();
        assert!(url
            .as_str()
            .starts_with("https://iris-api.circle.com/v1/attestations/0x0000"));
    }

    #[test]
    fn test_invalid_base_url() {
        let provider = IrisAttestationProvider::new("not a url");
        assert!(matches!(
            provider.attestation_url(B256::ZERO),
            Err(TransferError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_api_key_is_optional() {
        assert!(IrisAttestationProvider::production().api_key.is_none());
        let provider = IrisAttestationProvider::production().with_api_key("secret");
        assert_eq!(provider.api_key.as_deref(), Some("secret"));
        assert_eq!(provider.base_url(), IRIS_API);
    }
}
