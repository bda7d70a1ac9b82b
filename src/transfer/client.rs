// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, TxHash, B256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use bon::bon;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument, Span};

use super::{
    AttestationClient, BalanceReader, BurnInitiator, ClientConfig, MintCompleter, PollingConfig,
    TransferQuoter, DEFAULT_BALANCE_TIMEOUT,
};
use crate::error::{Result, TransferError};
use crate::network::{NetworkConfig, NetworkId, NetworkRegistry};
use crate::protocol::{AttestationState, BalanceReading, TransferQuote, TransferRequest, TransferResult};
use crate::providers::{AlloyChainGateway, IrisAttestationProvider, TokioClock};
use crate::spans;
use crate::traits::{
    AttestationProvider, Clock, MessageTransmitterGateway, StablecoinGateway,
    TokenMessengerGateway,
};

/// Entry point for the UI layer.
///
/// Holds the injected [`NetworkRegistry`] and the attestation and balance
/// plumbing. Chain gateways that sign (source for the burn, destination for
/// the mint) are passed per call, since each side is usually a different
/// wallet.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cctp_transfer::testing::{FakeAttestationProvider, FakeClock};
/// use cctp_transfer::{NetworkId, NetworkRegistry, TransferClient};
///
/// let client = TransferClient::builder()
///     .registry(Arc::new(NetworkRegistry::testnets()))
///     .attestation_provider(Arc::new(FakeAttestationProvider::new()))
///     .clock(Arc::new(FakeClock::new()))
///     .build();
///
/// let quote = client
///     .get_quote("100", NetworkId::Sepolia, NetworkId::ArbitrumSepolia)
///     .unwrap();
/// assert_eq!(quote.output_amount, "100");
/// ```
#[derive(Clone)]
pub struct TransferClient {
    registry: Arc<NetworkRegistry>,
    quoter: TransferQuoter,
    burner: BurnInitiator,
    attestation: AttestationClient,
    minter: MintCompleter,
    balances: BalanceReader,
}

#[bon]
impl TransferClient {
    #[builder]
    pub fn new(
        registry: Arc<NetworkRegistry>,
        attestation_provider: Arc<dyn AttestationProvider>,
        #[builder(default = Arc::new(TokioClock) as Arc<dyn Clock>)] clock: Arc<dyn Clock>,
        #[builder(default)] polling: PollingConfig,
        #[builder(default = DEFAULT_BALANCE_TIMEOUT)] balance_timeout: Duration,
    ) -> Self {
        Self {
            quoter: TransferQuoter::new(registry.clone()),
            burner: BurnInitiator::new(registry.clone(), clock.clone()),
            attestation: AttestationClient::new(attestation_provider, clock, polling),
            minter: MintCompleter::new(registry.clone()),
            balances: BalanceReader::new(registry.clone()).with_timeout(balance_timeout),
            registry,
        }
    }

    /// Wires the production stack from `config`.
    ///
    /// Every network in `registry` with an RPC URL in `config` gets a
    /// read-only alloy gateway for balance reads. Networks without one read
    /// as degraded `unsupported-network` balances. Signing gateways built by
    /// the caller should apply [`ClientConfig::confirmations`] and
    /// [`ClientConfig::receipt_timeout`] with
    /// [`AlloyChainGateway::with_confirmations`] and
    /// [`AlloyChainGateway::with_receipt_timeout`].
    pub fn connect(config: &ClientConfig, registry: Arc<NetworkRegistry>) -> Self {
        let mut iris = IrisAttestationProvider::new(config.attestation_api_url.clone());
        if let Some(api_key) = &config.api_key {
            iris = iris.with_api_key(api_key.clone());
        }

        let mut client = Self::builder()
            .registry(registry.clone())
            .attestation_provider(Arc::new(iris))
            .polling(config.polling)
            .balance_timeout(config.balance_timeout)
            .build();

        for (network, url) in &config.rpc_urls {
            let Ok(network_config) = registry.get(*network) else {
                info!(network = %network, event = "rpc_url_ignored");
                continue;
            };

            let provider: DynProvider<Ethereum> =
                ProviderBuilder::new().connect_http(url.clone()).erased();
            let gateway = AlloyChainGateway::new(network_config, provider)
                .with_confirmations(config.confirmations)
                .with_receipt_timeout(config.receipt_timeout);
            client = client.with_balance_gateway(Arc::new(gateway));
        }

        info!(
            networks = client.registry.network_ids().len(),
            attestation_api_url = %config.attestation_api_url,
            event = "transfer_client_connected"
        );
        client
    }

    /// Adds the gateway balance reads use for its network.
    pub fn with_balance_gateway(mut self, gateway: Arc<dyn StablecoinGateway>) -> Self {
        self.balances = self.balances.with_gateway(gateway);
        self
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn polling(&self) -> PollingConfig {
        self.attestation.polling()
    }

    pub fn get_quote(
        &self,
        amount: &str,
        from_network: NetworkId,
        to_network: NetworkId,
    ) -> Result<TransferQuote> {
        self.quoter.get_quote(amount, from_network, to_network)
    }

    /// See [`BurnInitiator::initiate_burn`].
    pub async fn initiate_burn<G>(
        &self,
        request: &TransferRequest,
        owner: Address,
        gateway: &G,
    ) -> Result<TransferResult>
    where
        G: StablecoinGateway + TokenMessengerGateway + ?Sized,
    {
        self.burner.initiate_burn(request, owner, gateway).await
    }

    /// See [`AttestationClient::fetch_attestation`].
    pub async fn fetch_attestation(
        &self,
        message_hash: B256,
        cancel: &CancellationToken,
    ) -> Result<Bytes> {
        self.attestation.fetch_attestation(message_hash, cancel).await
    }

    pub async fn transfer_status(&self, message_hash: B256) -> Result<AttestationState> {
        self.attestation.transfer_status(message_hash).await
    }

    /// See [`MintCompleter::complete_mint`].
    pub async fn complete_mint<G>(
        &self,
        message: &Bytes,
        attestation: &Bytes,
        to_network: NetworkId,
        caller: Address,
        gateway: &G,
    ) -> Result<TxHash>
    where
        G: MessageTransmitterGateway + ?Sized,
    {
        self.minter
            .complete_mint(message, attestation, to_network, caller, gateway)
            .await
    }

    /// Mints an `attested` transfer and moves it to `completed`.
    pub async fn complete_transfer<G>(
        &self,
        transfer: &mut TransferResult,
        caller: Address,
        gateway: &G,
    ) -> Result<TxHash>
    where
        G: MessageTransmitterGateway + ?Sized,
    {
        self.minter.complete_transfer(transfer, caller, gateway).await
    }

    /// Never fails; see [`BalanceReader`].
    pub async fn get_usdc_balance(
        &self,
        address: &str,
        network: &str,
        cancel: &CancellationToken,
    ) -> BalanceReading {
        self.balances.get_usdc_balance(address, network, cancel).await
    }

    pub fn get_supported_networks(&self) -> Vec<NetworkId> {
        self.registry.network_ids()
    }

    pub fn get_network_config(&self, network: NetworkId) -> Result<&NetworkConfig> {
        self.registry.get(network)
    }

    /// Runs a whole transfer: validate, burn, wait for the attestation, mint.
    ///
    /// Phases run strictly in order. `cancel` interrupts any phase, including
    /// a burn or mint still waiting for its receipt; a transaction already
    /// submitted is not rolled back. On error the caller can resume from the
    /// failed phase with the individual methods.
    pub async fn execute_transfer<S, D>(
        &self,
        request: &TransferRequest,
        owner: Address,
        source: &S,
        caller: Address,
        destination: &D,
        cancel: &CancellationToken,
    ) -> Result<TransferResult>
    where
        S: StablecoinGateway + TokenMessengerGateway + ?Sized,
        D: MessageTransmitterGateway + ?Sized,
    {
        let span = spans::execute_transfer(request.from_network, request.to_network, &request.amount);

        async move {
            let result = self
                .run_transfer(request, owner, source, caller, destination, cancel)
                .await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_transfer<S, D>(
        &self,
        request: &TransferRequest,
        owner: Address,
        source: &S,
        caller: Address,
        destination: &D,
        cancel: &CancellationToken,
    ) -> Result<TransferResult>
    where
        S: StablecoinGateway + TokenMessengerGateway + ?Sized,
        D: MessageTransmitterGateway + ?Sized,
    {
        self.get_quote(&request.amount, request.from_network, request.to_network)?;
        ensure_active(cancel)?;

        let mut transfer = until_cancelled(
            cancel,
            "burn",
            self.initiate_burn(request, owner, source),
        )
        .await?;
        Span::current().record("message_hash", transfer.message_hash().to_string().as_str());

        let attestation = self
            .fetch_attestation(transfer.message_hash(), cancel)
            .await?;
        transfer.record_attestation(attestation)?;
        ensure_active(cancel)?;

        until_cancelled(
            cancel,
            "mint",
            self.complete_transfer(&mut transfer, caller, destination),
        )
        .await?;

        info!(
            source_tx_hash = %transfer.source_tx_hash(),
            destination_tx_hash = ?transfer.destination_tx_hash(),
            event = "transfer_completed"
        );
        Ok(transfer)
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        info!(event = "transfer_cancelled");
        return Err(TransferError::Cancelled);
    }
    Ok(())
}

/// Drives `phase` unless `cancel` fires first.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    phase: &'static str,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!(phase, event = "transfer_cancelled");
            Err(TransferError::Cancelled)
        }
        result = future => result,
    }
}
