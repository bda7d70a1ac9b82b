// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer, Serialize};

/// Body of a `200` response from `GET /v1/attestations/{messageHash}`.
///
/// The attestation is a hex string (with or without `0x`). Circle's Iris API
/// sometimes returns the literal string `"PENDING"` in the attestation field
/// instead of `null`; that is treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    #[serde(default)]
    pub status: Option<AttestationStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

impl AttestationResponse {
    /// Collapses the response into what the poller acts on.
    ///
    /// A body carrying attestation bytes counts as complete unless the status
    /// explicitly says otherwise.
    pub fn into_lookup(self) -> AttestationLookup {
        match (self.status, self.attestation) {
            (Some(AttestationStatus::Failed), _) => AttestationLookup::Failed,
            (Some(AttestationStatus::Complete) | None, Some(bytes)) if !bytes.is_empty() => {
                AttestationLookup::Complete(bytes)
            }
            _ => AttestationLookup::Pending,
        }
    }
}

fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

/// Represents the status reported by the attestation service.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}

/// Outcome of a single attestation lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationLookup {
    /// HTTP 404: the oracle has not seen the burn yet.
    NotFound,
    /// The oracle knows the message but has not signed it yet.
    Pending,
    Complete(Bytes),
    Failed,
}

/// Coarse attestation state reported to UI pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationState {
    Pending,
    Attested,
    Failed,
}

impl From<&AttestationLookup> for AttestationState {
    fn from(lookup: &AttestationLookup) -> Self {
        match lookup {
            AttestationLookup::NotFound | AttestationLookup::Pending => Self::Pending,
            AttestationLookup::Complete(_) => Self::Attested,
            AttestationLookup::Failed => Self::Failed,
        }
    }
}
