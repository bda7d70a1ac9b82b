// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Alloy-based chain gateway implementation.

use std::time::Duration;

use alloy_json_rpc::RpcError;
use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{PendingTransactionError, Provider, WatchTxError};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::contracts::{MessageTransmitterContract, StablecoinContract, TokenMessengerContract};
use crate::error::{Result, TransferError};
use crate::network::{NetworkConfig, NetworkId};
use crate::protocol::DomainId;
use crate::transfer::{DEFAULT_CONFIRMATIONS, DEFAULT_RECEIPT_TIMEOUT};
use crate::traits::{
    MessageTransmitterGateway, StablecoinGateway, TokenMessengerGateway, TxReceipt,
};

/// JSON-RPC error code several providers use for "limit exceeded".
const RPC_LIMIT_EXCEEDED: i64 = -32005;

/// Fallback back-off when a provider rate limits without saying for how long.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Production gateway for all three CCTP contracts on one network.
///
/// Writes are sent through the wrapped provider, so it must carry a wallet
/// for the addresses that sign (see `ProviderBuilder::wallet`). Read-only use
/// (balances, nonce checks) works with a plain HTTP provider.
///
/// Each write waits for [`DEFAULT_CONFIRMATIONS`] blocks and gives up after
/// [`DEFAULT_RECEIPT_TIMEOUT`] unless overridden.
///
/// # Examples
///
/// ```rust,no_run
/// use cctp_transfer::providers::AlloyChainGateway;
/// use cctp_transfer::{NetworkConfig, NetworkId};
/// use alloy_provider::ProviderBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new()
///     .connect_http("https://ethereum-sepolia-rpc.publicnode.com".parse()?);
///
/// let gateway = AlloyChainGateway::new(&NetworkConfig::for_network(NetworkId::Sepolia), provider);
/// # Ok(())
/// # }
/// ```
pub struct AlloyChainGateway<P>
where
    P: Provider<Ethereum> + Clone,
{
    network: NetworkId,
    provider: P,
    stablecoin: StablecoinContract<P>,
    token_messenger: TokenMessengerContract<P>,
    message_transmitter: MessageTransmitterContract<P>,
    confirmations: u64,
    receipt_timeout: Duration,
}

impl<P> AlloyChainGateway<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(config: &NetworkConfig, provider: P) -> Self {
        Self {
            network: config.id,
            stablecoin: StablecoinContract::new(config.stablecoin_contract, provider.clone()),
            token_messenger: TokenMessengerContract::new(config.token_messenger, provider.clone()),
            message_transmitter: MessageTransmitterContract::new(
                config.message_transmitter,
                provider.clone(),
            ),
            provider,
            confirmations: DEFAULT_CONFIRMATIONS,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }

    async fn send_and_confirm(&self, tx_request: TransactionRequest) -> Result<TxReceipt> {
        let pending_tx = self
            .provider
            .send_transaction(tx_request)
            .await
            .map_err(map_rpc_error)?;
        let tx_hash = *pending_tx.tx_hash();

        debug!(
            tx_hash = %tx_hash,
            network = %self.network,
            event = "transaction_sent"
        );

        let receipt = pending_tx
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
            .map_err(|e| map_pending_error(e, tx_hash, self.receipt_timeout))?;
        let receipt = to_tx_receipt(&receipt);

        debug!(
            tx_hash = %receipt.tx_hash,
            success = receipt.success,
            logs = receipt.logs.len(),
            network = %self.network,
            event = "transaction_confirmed"
        );

        Ok(receipt)
    }
}

fn to_tx_receipt(receipt: &TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: receipt.transaction_hash,
        success: ReceiptResponse::status(receipt),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
    }
}

/// Maps a JSON-RPC failure, singling out rate limiting.
fn map_rpc_error(error: RpcError<TransportErrorKind>) -> TransferError {
    match &error {
        RpcError::ErrorResp(payload)
            if payload.code == 429 || payload.code == RPC_LIMIT_EXCEEDED =>
        {
            TransferError::RateLimitExceeded {
                retry_after_seconds: DEFAULT_RETRY_AFTER_SECS,
            }
        }
        RpcError::Transport(TransportErrorKind::HttpError(http)) if http.status == 429 => {
            TransferError::RateLimitExceeded {
                retry_after_seconds: DEFAULT_RETRY_AFTER_SECS,
            }
        }
        // The node answered: the call itself failed (revert, bad input).
        RpcError::ErrorResp(_) => TransferError::ContractCall(error.to_string()),
        _ => TransferError::Provider(error.to_string()),
    }
}

fn map_contract_error(error: alloy_contract::Error) -> TransferError {
    match error {
        alloy_contract::Error::TransportError(rpc) => map_rpc_error(rpc),
        other => TransferError::ContractCall(other.to_string()),
    }
}

/// A receipt wait that times out maps to a retryable provider error.
fn map_pending_error(
    error: PendingTransactionError,
    tx_hash: B256,
    timeout: Duration,
) -> TransferError {
    match error {
        PendingTransactionError::TransportError(rpc) => map_rpc_error(rpc),
        PendingTransactionError::TxWatcher(WatchTxError::Timeout) => TransferError::Provider(
            format!("transaction {tx_hash} not confirmed within {}s", timeout.as_secs()),
        ),
        other => TransferError::Provider(other.to_string()),
    }
}

#[async_trait]
impl<P> StablecoinGateway for AlloyChainGateway<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    fn network(&self) -> NetworkId {
        self.network
    }

    fn address(&self) -> Address {
        self.stablecoin.address()
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.stablecoin
            .allowance(owner, spender)
            .await
            .map_err(map_contract_error)
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<TxReceipt> {
        let tx = self.stablecoin.approve_transaction(owner, spender, amount);
        self.send_and_confirm(tx).await
    }

    async fn balance_of(&self, account: Address) -> Result<U256> {
        self.stablecoin
            .balance_of(account)
            .await
            .map_err(map_contract_error)
    }

    async fn decimals(&self) -> Result<u8> {
        self.stablecoin.decimals().await.map_err(map_contract_error)
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn transfer(&self, owner: Address, to: Address, amount: U256) -> Result<TxReceipt> {
        let tx = self.stablecoin.transfer_transaction(owner, to, amount);
        self.send_and_confirm(tx).await
    }
}

#[async_trait]
impl<P> TokenMessengerGateway for AlloyChainGateway<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    #[instrument(skip(self), fields(network = %self.network))]
    async fn deposit_for_burn(
        &self,
        owner: Address,
        amount: U256,
        destination_domain: DomainId,
        mint_recipient: B256,
        burn_token: Address,
    ) -> Result<TxReceipt> {
        let tx = self.token_messenger.deposit_for_burn_transaction(
            owner,
            amount,
            destination_domain,
            mint_recipient,
            burn_token,
        );
        self.send_and_confirm(tx).await
    }
}

#[async_trait]
impl<P> MessageTransmitterGateway for AlloyChainGateway<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    fn network(&self) -> NetworkId {
        self.network
    }

    #[instrument(skip(self, message, attestation), fields(network = %self.network))]
    async fn receive_message(
        &self,
        caller: Address,
        message: Bytes,
        attestation: Bytes,
    ) -> Result<TxReceipt> {
        let tx = self
            .message_transmitter
            .receive_message_transaction(caller, message, attestation);
        self.send_and_confirm(tx).await
    }

    async fn is_nonce_used(&self, key: B256) -> Result<bool> {
        let used = self
            .message_transmitter
            .used_nonces(key)
            .await
            .map_err(map_contract_error)?;
        Ok(!used.is_zero())
    }
}
