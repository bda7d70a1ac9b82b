// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{keccak256, Address, Bytes, U256};
use alloy_sol_types::SolEvent;
use tracing::{debug, error, info, warn, Instrument};

use super::resolve_decimals;
use crate::contracts::MessageSent;
use crate::error::{Result, TransferError};
use crate::network::{NetworkConfig, NetworkRegistry};
use crate::protocol::{TokenAmount, TransferRequest, TransferResult};
use crate::spans;
use crate::traits::{Clock, StablecoinGateway, TokenMessengerGateway, TxReceipt};

/// Re-reads of the allowance after an approval confirms.
const ALLOWANCE_VISIBILITY_ATTEMPTS: u32 = 5;
const ALLOWANCE_VISIBILITY_INTERVAL: Duration = Duration::from_secs(1);

/// Steps of [`BurnInitiator::initiate_burn`], logged as they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BurnStage {
    NotStarted,
    AllowanceChecked,
    Approved,
    BalanceVerified,
    BurnSubmitted,
    BurnConfirmed,
    MessageExtracted,
}

impl BurnStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::AllowanceChecked => "allowance_checked",
            Self::Approved => "approved",
            Self::BalanceVerified => "balance_verified",
            Self::BurnSubmitted => "burn_submitted",
            Self::BurnConfirmed => "burn_confirmed",
            Self::MessageExtracted => "message_extracted",
        }
    }

    fn enter(self) {
        debug!(stage = self.as_str(), event = "burn_stage_reached");
    }
}

/// Runs the source-chain half of a transfer: allowance, optional approval,
/// balance check, `depositForBurn`, and extraction of the emitted message.
///
/// Nothing is retried here. Allowance and balance are re-read on every call,
/// so re-invoking after a retryable failure never approves twice and never
/// burns without funds.
#[derive(Clone)]
pub struct BurnInitiator {
    registry: Arc<NetworkRegistry>,
    clock: Arc<dyn Clock>,
}

impl BurnInitiator {
    pub fn new(registry: Arc<NetworkRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Burns `request.amount` on the source network for `owner`.
    ///
    /// `gateway` must be bound to `request.from_network` and able to sign for
    /// `owner`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedNetwork` if either network is not in the registry
    /// - `InvalidRequest` / `InvalidAddress` / `InvalidAmount` for malformed requests
    /// - `InvalidConfig` if the gateway is bound to another network or token
    /// - `ApprovalFailure` if the allowance cannot be read or the approval fails (retryable)
    /// - `InsufficientBalance` if the balance is below the amount; no burn is sent
    /// - `BurnFailure` if the burn cannot be submitted or reverts (retryable)
    /// - `MessageLogNotFound` if the burn receipt has no `MessageSent` log
    pub async fn initiate_burn<G>(
        &self,
        request: &TransferRequest,
        owner: Address,
        gateway: &G,
    ) -> Result<TransferResult>
    where
        G: StablecoinGateway + TokenMessengerGateway + ?Sized,
    {
        let span = spans::initiate_burn(
            request.from_network,
            request.to_network,
            &owner,
            &request.recipient,
            &request.amount,
        );

        async move {
            let result = self.run(request, owner, gateway).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run<G>(
        &self,
        request: &TransferRequest,
        owner: Address,
        gateway: &G,
    ) -> Result<TransferResult>
    where
        G: StablecoinGateway + TokenMessengerGateway + ?Sized,
    {
        BurnStage::NotStarted.enter();

        let source = self.registry.get(request.from_network)?;
        let destination = self.registry.get(request.to_network)?;
        validate_request(request, source, gateway)?;

        let mint_recipient = request.recipient.into_word();
        let decimals = resolve_decimals(gateway).await;
        let amount = TokenAmount::parse(&request.amount, decimals)?;
        if amount.is_zero() {
            return Err(TransferError::InvalidAmount {
                amount: request.amount.clone(),
                reason: "amount must be greater than zero".to_string(),
            });
        }
        let required = amount.raw();

        let allowance = gateway
            .allowance(owner, source.token_messenger)
            .await
            .map_err(|e| TransferError::ApprovalFailure {
                reason: format!("allowance read failed: {e}"),
            })?;
        BurnStage::AllowanceChecked.enter();

        if allowance < required {
            self.approve(gateway, owner, source, required).await?;
            BurnStage::Approved.enter();
        } else {
            debug!(
                allowance = %allowance,
                required = %required,
                event = "approval_skipped"
            );
        }

        let available = gateway
            .balance_of(owner)
            .await
            .map_err(|e| TransferError::BurnFailure {
                reason: format!("balance read failed: {e}"),
            })?;
        if available < required {
            warn!(
                required = %required,
                available = %available,
                shortfall = %(required - available),
                event = "insufficient_balance"
            );
            return Err(TransferError::InsufficientBalance {
                required,
                available,
            });
        }
        BurnStage::BalanceVerified.enter();

        info!(
            amount = %amount,
            destination_domain = %destination.domain_id,
            mint_recipient = %mint_recipient,
            event = "burn_transaction_initiated"
        );
        BurnStage::BurnSubmitted.enter();
        let receipt = gateway
            .deposit_for_burn(
                owner,
                required,
                destination.domain_id,
                mint_recipient,
                source.stablecoin_contract,
            )
            .await
            .map_err(|e| TransferError::BurnFailure {
                reason: e.to_string(),
            })?;

        if !receipt.success {
            return Err(TransferError::BurnFailure {
                reason: format!("burn transaction {} reverted", receipt.tx_hash),
            });
        }
        BurnStage::BurnConfirmed.enter();

        let message_bytes = extract_message(&receipt)?;
        let message_hash = keccak256(&message_bytes);
        BurnStage::MessageExtracted.enter();

        info!(
            tx_hash = %receipt.tx_hash,
            message_hash = %message_hash,
            message_length_bytes = message_bytes.len(),
            event = "message_sent_event_extracted"
        );

        Ok(TransferResult::pending(
            request.from_network,
            request.to_network,
            receipt.tx_hash,
            message_hash,
            message_bytes,
        ))
    }

    async fn approve<G>(
        &self,
        gateway: &G,
        owner: Address,
        source: &NetworkConfig,
        required: U256,
    ) -> Result<()>
    where
        G: StablecoinGateway + ?Sized,
    {
        info!(
            spender = %source.token_messenger,
            amount = %required,
            event = "approval_required"
        );

        let receipt = gateway
            .approve(owner, source.token_messenger, required)
            .await
            .map_err(|e| TransferError::ApprovalFailure {
                reason: e.to_string(),
            })?;

        if !receipt.success {
            return Err(TransferError::ApprovalFailure {
                reason: format!("approval transaction {} reverted", receipt.tx_hash),
            });
        }

        info!(tx_hash = %receipt.tx_hash, event = "approval_confirmed");
        self.await_allowance(gateway, owner, source.token_messenger, required)
            .await;
        Ok(())
    }

    /// Waits until the node serving reads reports the new allowance.
    ///
    /// Gives up quietly; a burn against a stale allowance reverts and surfaces
    /// as a retryable `BurnFailure`.
    async fn await_allowance<G>(&self, gateway: &G, owner: Address, spender: Address, required: U256)
    where
        G: StablecoinGateway + ?Sized,
    {
        for attempt in 1..=ALLOWANCE_VISIBILITY_ATTEMPTS {
            self.clock.sleep(ALLOWANCE_VISIBILITY_INTERVAL).await;

            match gateway.allowance(owner, spender).await {
                Ok(allowance) if allowance >= required => {
                    debug!(attempt, event = "allowance_visible");
                    return;
                }
                Ok(allowance) => {
                    debug!(attempt, allowance = %allowance, event = "allowance_not_visible");
                }
                Err(e) => {
                    debug!(attempt, error = %e, event = "allowance_recheck_failed");
                }
            }
        }

        warn!(
            attempts = ALLOWANCE_VISIBILITY_ATTEMPTS,
            event = "allowance_visibility_timeout"
        );
    }
}

fn validate_request<G>(request: &TransferRequest, source: &NetworkConfig, gateway: &G) -> Result<()>
where
    G: StablecoinGateway + ?Sized,
{
    if request.from_network == request.to_network {
        return Err(TransferError::InvalidRequest(format!(
            "source and destination are both {}",
            request.from_network
        )));
    }

    if request.recipient.is_zero() {
        return Err(TransferError::InvalidAddress(
            "recipient must not be the zero address".to_string(),
        ));
    }

    let bound = StablecoinGateway::network(gateway);
    if bound != source.id {
        return Err(TransferError::InvalidConfig(format!(
            "gateway is bound to {bound}, transfer starts on {}",
            source.id
        )));
    }

    if gateway.address() != source.stablecoin_contract {
        return Err(TransferError::InvalidConfig(format!(
            "gateway token {} does not match {} stablecoin {}",
            gateway.address(),
            source.id,
            source.stablecoin_contract
        )));
    }

    Ok(())
}

/// Pulls the message bytes out of the `MessageSent` log of a burn receipt.
fn extract_message(receipt: &TxReceipt) -> Result<Bytes> {
    let log = receipt
        .logs
        .iter()
        .find(|log| log.topics().first() == Some(&MessageSent::SIGNATURE_HASH))
        .ok_or_else(|| {
            spans::record_error_with_context(
                "MessageLogNotFound",
                "MessageSent event not found in transaction logs",
                Some(&format!(
                    "Transaction contained {} logs but none matched MessageSent signature",
                    receipt.logs.len()
                )),
            );
            error!(
                tx_hash = %receipt.tx_hash,
                available_logs = receipt.logs.len(),
                event = "message_sent_event_not_found"
            );
            TransferError::MessageLogNotFound {
                tx_hash: receipt.tx_hash,
                logs: receipt.logs.len(),
            }
        })?;

    let decoded = MessageSent::abi_decode_data(&log.data.data)?;
    Ok(decoded.0)
}
