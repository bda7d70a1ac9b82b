// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! The phases of a cross-chain transfer.
//!
//! A transfer is a saga over two chains and the attestation service:
//!
//! 1. [`TransferQuoter`] validates the route and amount
//! 2. [`BurnInitiator`] approves if needed and burns on the source chain
//! 3. [`AttestationClient`] polls for the signature over the burn message
//! 4. [`MintCompleter`] submits message and attestation on the destination chain
//!
//! [`BalanceReader`] sits beside them as a display-only path that never fails.
//! [`TransferClient`] wires everything together behind one API.

mod attestation;
mod balance;
mod burn;
mod client;
mod config;
mod mint;
mod quote;

pub use attestation::AttestationClient;
pub use balance::BalanceReader;
pub use burn::{BurnInitiator, BurnStage};
pub use client::TransferClient;
pub use config::{
    ClientConfig, PollingConfig, ATTESTATION_API_URL_VAR, ATTESTATION_PATH, CIRCLE_API_KEY_VAR,
    DEFAULT_BALANCE_TIMEOUT, DEFAULT_CONFIRMATIONS, DEFAULT_RECEIPT_TIMEOUT, IRIS_API, IRIS_API_SANDBOX,
};
pub use mint::MintCompleter;
pub use quote::{TransferQuoter, BRIDGE_FEE, ESTIMATED_GAS_FEE, ESTIMATED_TIME};

use tracing::warn;

use crate::protocol::USDC_DECIMALS;
use crate::traits::StablecoinGateway;

/// Token decimals as reported by the contract, or 6 if the call fails.
pub(crate) async fn resolve_decimals<G>(gateway: &G) -> u8
where
    G: StablecoinGateway + ?Sized,
{
    match gateway.decimals().await {
        Ok(decimals) => decimals,
        Err(e) => {
            warn!(
                error = %e,
                fallback = USDC_DECIMALS,
                event = "decimals_fallback"
            );
            USDC_DECIMALS
        }
    }
}
