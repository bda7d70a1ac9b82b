// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Request, quote and result types exchanged with callers.

use std::fmt;

use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use bon::Builder;
use serde::{Deserialize, Serialize};

use super::{DomainId, MessageHeader};
use crate::error::{BalanceFetchFailure, Result, TransferError};
use crate::network::NetworkId;

/// Progress of a transfer after the burn has been confirmed.
///
/// Ordered: a status only ever moves to a greater one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Attested,
    Completed,
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Attested => "attested",
            Self::Completed => "completed",
        })
    }
}

/// A caller's request to move `amount` of USDC between two networks.
///
/// # Example
///
/// ```rust
/// use cctp_transfer::{NetworkId, TransferRequest};
/// use alloy_primitives::address;
///
/// let request = TransferRequest::builder()
///     .amount("100")
///     .from_network(NetworkId::Sepolia)
///     .to_network(NetworkId::ArbitrumSepolia)
///     .recipient(address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d"))
///     .build();
/// assert_eq!(request.amount, "100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Decimal string in whole tokens, e.g. `"12.5"`
    #[builder(into)]
    pub amount: String,
    pub from_network: NetworkId,
    pub to_network: NetworkId,
    pub recipient: Address,
}

/// Indicative quote. CCTP burns and mints 1:1, so only time and gas vary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuote {
    pub from_network: NetworkId,
    pub to_network: NetworkId,
    pub input_amount: String,
    pub output_amount: String,
    pub estimated_time: String,
    pub fees: String,
    pub bridge_fee: String,
}

/// Record of one transfer, created once the burn is confirmed.
///
/// Fields are private so the status can only advance through
/// [`TransferResult::record_attestation`] and [`TransferResult::record_mint`]:
/// `attested` always carries a non-empty attestation and `completed` always
/// carries a destination transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    from_network: NetworkId,
    to_network: NetworkId,
    source_tx_hash: TxHash,
    message_hash: B256,
    message_bytes: Bytes,
    attestation: Option<Bytes>,
    destination_tx_hash: Option<TxHash>,
    status: TransferStatus,
}

impl TransferResult {
    /// Creates a pending result from a confirmed burn.
    pub fn pending(
        from_network: NetworkId,
        to_network: NetworkId,
        source_tx_hash: TxHash,
        message_hash: B256,
        message_bytes: Bytes,
    ) -> Self {
        Self {
            from_network,
            to_network,
            source_tx_hash,
            message_hash,
            message_bytes,
            attestation: None,
            destination_tx_hash: None,
            status: TransferStatus::Pending,
        }
    }

    /// Moves `pending` to `attested`.
    pub fn record_attestation(&mut self, attestation: Bytes) -> Result<()> {
        self.ensure_transition(TransferStatus::Attested)?;
        if attestation.is_empty() {
            return Err(TransferError::InvalidRequest(
                "attestation must not be empty".to_string(),
            ));
        }

        self.attestation = Some(attestation);
        self.status = TransferStatus::Attested;
        Ok(())
    }

    /// Moves `attested` to `completed`.
    pub fn record_mint(&mut self, destination_tx_hash: TxHash) -> Result<()> {
        self.ensure_transition(TransferStatus::Completed)?;
        if destination_tx_hash.is_zero() {
            return Err(TransferError::InvalidRequest(
                "destination transaction hash must not be zero".to_string(),
            ));
        }

        self.destination_tx_hash = Some(destination_tx_hash);
        self.status = TransferStatus::Completed;
        Ok(())
    }

    fn ensure_transition(&self, to: TransferStatus) -> Result<()> {
        let expected_from = match to {
            TransferStatus::Pending => None,
            TransferStatus::Attested => Some(TransferStatus::Pending),
            TransferStatus::Completed => Some(TransferStatus::Attested),
        };

        if expected_from == Some(self.status) {
            Ok(())
        } else {
            Err(TransferError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn from_network(&self) -> NetworkId {
        self.from_network
    }

    pub fn to_network(&self) -> NetworkId {
        self.to_network
    }

    pub fn source_tx_hash(&self) -> TxHash {
        self.source_tx_hash
    }

    /// keccak256 of the message bytes; the attestation lookup key.
    pub fn message_hash(&self) -> B256 {
        self.message_hash
    }

    pub fn message_bytes(&self) -> &Bytes {
        &self.message_bytes
    }

    pub fn attestation(&self) -> Option<&Bytes> {
        self.attestation.as_ref()
    }

    pub fn destination_tx_hash(&self) -> Option<TxHash> {
        self.destination_tx_hash
    }

    /// Decoded message header, when the bytes are a well-formed v1 message.
    pub fn message(&self) -> Option<MessageHeader> {
        MessageHeader::decode(&self.message_bytes)
    }

    pub fn nonce(&self) -> Option<u64> {
        self.message().map(|message| message.nonce)
    }

    pub fn source_domain(&self) -> Option<DomainId> {
        self.message().map(|message| message.source_domain)
    }

    /// Burned amount in smallest units, read from the message body.
    pub fn amount(&self) -> Option<U256> {
        self.message()
            .and_then(|message| message.burn_message())
            .map(|burn| burn.amount)
    }
}

/// Stablecoin balance for display.
///
/// A failed read still yields a reading: `amount` is `"0.00"`, `degraded` is
/// set and `reason` says why, so a real zero can be told apart from an
/// unknown balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReading {
    pub address: String,
    pub network: String,
    pub amount: String,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BalanceFetchFailure>,
}

impl BalanceReading {
    /// Sentinel amount reported when the balance could not be read.
    pub const UNKNOWN_AMOUNT: &'static str = "0.00";

    pub fn available(address: impl Into<String>, network: impl Into<String>, amount: String) -> Self {
        Self {
            address: address.into(),
            network: network.into(),
            amount,
            degraded: false,
            reason: None,
        }
    }

    pub fn degraded(
        address: impl Into<String>,
        network: impl Into<String>,
        reason: BalanceFetchFailure,
    ) -> Self {
        Self {
            address: address.into(),
            network: network.into(),
            amount: Self::UNKNOWN_AMOUNT.to_string(),
            degraded: true,
            reason: Some(reason),
        }
    }
}
