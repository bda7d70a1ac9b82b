// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::time::Duration;

use bon::Builder;
use url::Url;

use crate::error::{Result, TransferError};
use crate::network::NetworkId;

/// Circle Iris API environment URLs
///
/// See <https://developers.circle.com/stablecoins/cctp-apis>
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

/// CCTP v1 attestation API path, followed by the `0x`-prefixed message hash
pub const ATTESTATION_PATH: &str = "/v1/attestations/";

/// Hard ceiling on a single balance read.
pub const DEFAULT_BALANCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocks a sent transaction must be buried under before its receipt counts.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// How long a sent transaction may take to reach [`DEFAULT_CONFIRMATIONS`].
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable names read by [`ClientConfig::from_env`].
pub const ATTESTATION_API_URL_VAR: &str = "ATTESTATION_API_URL";
pub const CIRCLE_API_KEY_VAR: &str = "CIRCLE_API_KEY";

/// Configuration for attestation polling behavior.
///
/// # Examples
///
/// ```rust
/// use cctp_transfer::PollingConfig;
///
/// // 20 attempts, 30 seconds apart
/// let config = PollingConfig::default();
///
/// let config = PollingConfig::default()
///     .with_max_attempts(5)
///     .with_poll_interval_secs(2);
/// assert_eq!(config.total_timeout_secs(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Maximum number of requests before giving up.
    pub max_attempts: u32,
    /// Seconds to wait between requests.
    pub poll_interval_secs: u64,
}

impl Default for PollingConfig {
    /// 20 attempts at 30 second intervals, a ceiling of about ten minutes.
    fn default() -> Self {
        Self {
            max_attempts: 20,
            poll_interval_secs: 30,
        }
    }
}

impl PollingConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// `max_attempts * poll_interval_secs`
    pub fn total_timeout_secs(&self) -> u64 {
        self.max_attempts as u64 * self.poll_interval_secs
    }
}

/// Everything needed to wire a [`TransferClient`](crate::TransferClient)
/// against live services.
///
/// # Example
///
/// ```rust
/// use cctp_transfer::{ClientConfig, NetworkId, PollingConfig};
///
/// let config = ClientConfig::builder()
///     .api_key("my-key")
///     .polling(PollingConfig::default().with_max_attempts(40))
///     .build()
///     .with_rpc_url(NetworkId::Sepolia, "https://ethereum-sepolia-rpc.publicnode.com")
///     .unwrap();
///
/// assert!(config.rpc_urls.contains_key(&NetworkId::Sepolia));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClientConfig {
    #[builder(into, default = IRIS_API_SANDBOX.to_string())]
    pub attestation_api_url: String,
    /// Sent as a bearer token on attestation requests when set.
    #[builder(into)]
    pub api_key: Option<String>,
    #[builder(default)]
    pub polling: PollingConfig,
    #[builder(default = DEFAULT_BALANCE_TIMEOUT)]
    pub balance_timeout: Duration,
    /// Confirmations awaited for approve, burn and mint transactions.
    #[builder(default = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,
    /// Ceiling on waiting for those confirmations.
    #[builder(default = DEFAULT_RECEIPT_TIMEOUT)]
    pub receipt_timeout: Duration,
    #[builder(default)]
    pub rpc_urls: BTreeMap<NetworkId, Url>,
}

impl ClientConfig {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// - `ATTESTATION_API_URL`: attestation service base URL (default: Circle sandbox)
    /// - `CIRCLE_API_KEY`: optional bearer credential
    /// - `<NETWORK>_RPC_URL`: RPC endpoint per network, e.g. `ARBITRUM_SEPOLIA_RPC_URL`
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, event = "dotenv_not_loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] against an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut rpc_urls = BTreeMap::new();
        for network in NetworkId::ALL {
            let key = format!("{}_RPC_URL", network.env_prefix());
            if let Some(raw) = non_empty(&key) {
                rpc_urls.insert(network, parse_url(&key, &raw)?);
            }
        }

        let attestation_api_url = match non_empty(ATTESTATION_API_URL_VAR) {
            Some(raw) => parse_url(ATTESTATION_API_URL_VAR, &raw)?
                .as_str()
                .trim_end_matches('/')
                .to_string(),
            None => IRIS_API_SANDBOX.to_string(),
        };

        Ok(Self {
            attestation_api_url,
            api_key: non_empty(CIRCLE_API_KEY_VAR),
            polling: PollingConfig::default(),
            balance_timeout: DEFAULT_BALANCE_TIMEOUT,
            confirmations: DEFAULT_CONFIRMATIONS,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            rpc_urls,
        })
    }

    pub fn with_rpc_url(mut self, network: NetworkId, url: &str) -> Result<Self> {
        let url = parse_url(network.env_prefix(), url)?;
        self.rpc_urls.insert(network, url);
        Ok(self)
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|e| TransferError::InvalidUrl {
        reason: format!("{key}: {e}"),
    })
}
