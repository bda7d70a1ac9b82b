// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, TransferError};
use crate::network::{NetworkId, NetworkRegistry};
use crate::protocol::{TokenAmount, TransferQuote, USDC_DECIMALS};

/// Typical v1 attestation latency with standard finality.
pub const ESTIMATED_TIME: &str = "15-20 minutes";

/// Indicative gas cost of approve plus burn plus mint, in USDC.
pub const ESTIMATED_GAS_FEE: &str = "0.005";

/// CCTP charges no protocol fee on v1 standard transfers.
pub const BRIDGE_FEE: &str = "0";

/// Produces indicative quotes.
///
/// Burns mint 1:1, so a quote never prices the amount; it validates the route
/// and the amount, and attaches the fixed time and gas estimates.
#[derive(Debug, Clone)]
pub struct TransferQuoter {
    registry: Arc<NetworkRegistry>,
}

impl TransferQuoter {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        Self { registry }
    }

    /// Quotes moving `amount` (a decimal string of whole tokens) between two networks.
    ///
    /// # Errors
    ///
    /// - `UnsupportedNetwork` if either network is missing from the registry
    /// - `InvalidRequest` if both sides are the same network
    /// - `InvalidAmount` if the amount is malformed or zero
    pub fn get_quote(
        &self,
        amount: &str,
        from_network: NetworkId,
        to_network: NetworkId,
    ) -> Result<TransferQuote> {
        self.registry.get(from_network)?;
        self.registry.get(to_network)?;

        if from_network == to_network {
            return Err(TransferError::InvalidRequest(format!(
                "source and destination are both {from_network}"
            )));
        }

        let parsed = TokenAmount::parse(amount, USDC_DECIMALS)?;
        if parsed.is_zero() {
            return Err(TransferError::InvalidAmount {
                amount: amount.to_string(),
                reason: "amount must be greater than zero".to_string(),
            });
        }

        let amount = amount.trim().to_string();
        debug!(
            from_network = %from_network,
            to_network = %to_network,
            amount = %amount,
            event = "quote_computed"
        );

        Ok(TransferQuote {
            from_network,
            to_network,
            input_amount: amount.clone(),
            output_amount: amount,
            estimated_time: ESTIMATED_TIME.to_string(),
            fees: ESTIMATED_GAS_FEE.to_string(),
            bridge_fee: BRIDGE_FEE.to_string(),
        })
    }
}
