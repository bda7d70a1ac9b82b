// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCTP protocol types and definitions
//!
//! This module contains the protocol-level types used across every transfer
//! phase: domain identifiers, fixed-point amounts, the v1 message format,
//! attestation responses and the transfer state machine.

mod amount;
mod attestation;
mod domain_id;
mod message;
mod transfer;

pub use amount::{TokenAmount, USDC_DECIMALS};
pub use attestation::{AttestationLookup, AttestationResponse, AttestationState, AttestationStatus};
pub use domain_id::{DomainId, InvalidDomainId};
pub use message::{BurnMessage, MessageHeader};
pub use transfer::{
    BalanceReading, TransferQuote, TransferRequest, TransferResult, TransferStatus,
};
