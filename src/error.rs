// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Error types for cross-chain transfers.
//!
//! Every phase of a transfer (quote, burn, attestation, mint) surfaces a typed
//! [`TransferError`]. Balance reads are the exception: they never fail, and
//! downgrade any error into a [`BalanceFetchFailure`] reason on the reading.

use alloy_primitives::{TxHash, B256, U256};
use serde::Serialize;
use thiserror::Error;

use crate::protocol::TransferStatus;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Network not supported: {network}")]
    UnsupportedNetwork { network: String },

    #[error("Approval failed: {reason}")]
    ApprovalFailure { reason: String },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: U256 },

    #[error("Burn failed: {reason}")]
    BurnFailure { reason: String },

    #[error("MessageSent event not found in transaction {tx_hash} ({logs} logs)")]
    MessageLogNotFound { tx_hash: TxHash, logs: usize },

    #[error("Timeout waiting for attestation after {attempts} attempts")]
    AttestationTimeout { attempts: u32 },

    #[error("Attestation failed for message {message_hash}")]
    AttestationFailed { message_hash: B256 },

    #[error("Mint failed: {reason}")]
    MintFailure { reason: String },

    #[error("Invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid transfer status transition from {from} to {to}")]
    InvalidTransition {
        from: TransferStatus,
        to: TransferStatus,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Attestation service returned HTTP {status}")]
    AttestationRequest { status: u16 },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransferError {
    /// Whether re-invoking the failed phase can succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ApprovalFailure { .. }
                | Self::BurnFailure { .. }
                | Self::AttestationTimeout { .. }
                | Self::RateLimitExceeded { .. }
                | Self::Provider(_)
                | Self::Network(_)
        )
    }

    /// Shortfall carried by an [`TransferError::InsufficientBalance`] error.
    pub fn shortfall(&self) -> Option<U256> {
        match self {
            Self::InsufficientBalance {
                required,
                available,
            } => Some(required.saturating_sub(*available)),
            _ => None,
        }
    }

    pub(crate) fn unsupported(network: impl ToString) -> Self {
        Self::UnsupportedNetwork {
            network: network.to_string(),
        }
    }
}

/// Why a balance read was downgraded to a zero reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceFetchFailure {
    Timeout,
    RateLimited,
    CallException,
    NetworkError,
    UnsupportedNetwork,
    InvalidAddress,
    Cancelled,
}

impl BalanceFetchFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate-limited",
            Self::CallException => "call-exception",
            Self::NetworkError => "network-error",
            Self::UnsupportedNetwork => "unsupported-network",
            Self::InvalidAddress => "invalid-address",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BalanceFetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TransferError> for BalanceFetchFailure {
    fn from(error: &TransferError) -> Self {
        match error {
            TransferError::RateLimitExceeded { .. } => Self::RateLimited,
            TransferError::Provider(_) | TransferError::Network(_) => Self::NetworkError,
            TransferError::UnsupportedNetwork { .. } => Self::UnsupportedNetwork,
            TransferError::InvalidAddress(_) => Self::InvalidAddress,
            TransferError::Cancelled => Self::Cancelled,
            _ => Self::CallException,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransferError::ApprovalFailure {
            reason: "rpc".into()
        }
        .is_retryable());
        assert!(TransferError::BurnFailure {
            reason: "rpc".into()
        }
        .is_retryable());
        assert!(TransferError::AttestationTimeout { attempts: 20 }.is_retryable());

        assert!(!TransferError::unsupported("goerli").is_retryable());
        assert!(!TransferError::MessageLogNotFound {
            tx_hash: TxHash::ZERO,
            logs: 0
        }
        .is_retryable());
        assert!(!TransferError::MintFailure {
            reason: "already minted".into()
        }
        .is_retryable());
        assert!(!TransferError::AttestationFailed {
            message_hash: B256::ZERO
        }
        .is_retryable());
        assert!(!TransferError::InsufficientBalance {
            required: U256::from(10),
            available: U256::ZERO
        }
        .is_retryable());
    }

    #[test]
    fn test_shortfall() {
        let error = TransferError::InsufficientBalance {
            required: U256::from(1_000_000u64),
            available: U256::from(999_990u64),
        };
        assert_eq!(error.shortfall(), Some(U256::from(10)));
        assert_eq!(TransferError::Cancelled.shortfall(), None);
    }

    #[test]
    fn test_error_messages() {
        insta::assert_snapshot!(
            TransferError::unsupported("goerli").to_string(),
            @"Network not supported: goerli"
        );
        insta::assert_snapshot!(
            TransferError::InsufficientBalance {
                required: U256::from(100),
                available: U256::from(90),
            }
            .to_string(),
            @"Insufficient balance: required 100, available 90"
        );
        insta::assert_snapshot!(
            TransferError::AttestationTimeout { attempts: 20 }.to_string(),
            @"Timeout waiting for attestation after 20 attempts"
        );
    }

    #[test]
    fn test_balance_failure_mapping() {
        assert_eq!(
            BalanceFetchFailure::from(&TransferError::RateLimitExceeded {
                retry_after_seconds: 1
            }),
            BalanceFetchFailure::RateLimited
        );
        assert_eq!(
            BalanceFetchFailure::from(&TransferError::Provider("connection reset".into())),
            BalanceFetchFailure::NetworkError
        );
        assert_eq!(
            BalanceFetchFailure::from(&TransferError::ContractCall("execution reverted".into())),
            BalanceFetchFailure::CallException
        );
        assert_eq!(BalanceFetchFailure::Timeout.to_string(), "timeout");
        assert_eq!(
            serde_json::to_string(&BalanceFetchFailure::CallException).unwrap(),
            "\"call-exception\""
        );
    }
}
