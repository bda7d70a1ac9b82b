// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument, Span};

use super::{resolve_decimals, DEFAULT_BALANCE_TIMEOUT};
use crate::error::{BalanceFetchFailure, TransferError};
use crate::network::{NetworkId, NetworkRegistry};
use crate::protocol::{BalanceReading, TokenAmount};
use crate::spans;
use crate::traits::StablecoinGateway;

/// Reads stablecoin balances for display.
///
/// Reads never fail. Each one is raced against a timeout and the caller's
/// cancellation token; anything other than a clean answer becomes a degraded
/// `"0.00"` reading with a [`BalanceFetchFailure`] reason, logged at `warn`.
#[derive(Clone)]
pub struct BalanceReader {
    registry: Arc<NetworkRegistry>,
    gateways: HashMap<NetworkId, Arc<dyn StablecoinGateway>>,
    timeout: Duration,
}

impl BalanceReader {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        Self {
            registry,
            gateways: HashMap::new(),
            timeout: DEFAULT_BALANCE_TIMEOUT,
        }
    }

    /// Registers the read gateway for the network it is bound to.
    pub fn with_gateway(mut self, gateway: Arc<dyn StablecoinGateway>) -> Self {
        self.gateways.insert(gateway.network(), gateway);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Balance of `address` on `network`, both as supplied by the UI.
    pub async fn get_usdc_balance(
        &self,
        address: &str,
        network: &str,
        cancel: &CancellationToken,
    ) -> BalanceReading {
        let network_id = match network.parse::<NetworkId>() {
            Ok(id) => id,
            Err(_) => {
                return self.degrade(address, network, BalanceFetchFailure::UnsupportedNetwork)
            }
        };

        match address.trim().parse::<Address>() {
            Ok(owner) => self.read(owner, network_id, cancel).await,
            Err(_) => self.degrade(address, network, BalanceFetchFailure::InvalidAddress),
        }
    }

    /// Balance of `owner` on `network`.
    pub async fn read(
        &self,
        owner: Address,
        network: NetworkId,
        cancel: &CancellationToken,
    ) -> BalanceReading {
        let address = owner.to_string();
        let span = spans::read_balance(
            network.as_str(),
            &address,
            self.timeout.as_millis() as u64,
        );

        async move {
            match self.try_read(owner, network, cancel).await {
                Ok(amount) => {
                    debug!(amount = %amount, event = "balance_read");
                    BalanceReading::available(address, network.as_str(), amount.to_string())
                }
                Err(reason) => {
                    Span::current().record("reason", reason.as_str());
                    self.degrade(&address, network.as_str(), reason)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_read(
        &self,
        owner: Address,
        network: NetworkId,
        cancel: &CancellationToken,
    ) -> Result<TokenAmount, BalanceFetchFailure> {
        let config = self
            .registry
            .get(network)
            .map_err(|e| BalanceFetchFailure::from(&e))?;

        if config.stablecoin_contract.is_zero() {
            debug!(event = "stablecoin_address_missing");
            return Err(BalanceFetchFailure::InvalidAddress);
        }

        let gateway = self.gateways.get(&network).ok_or_else(|| {
            debug!(event = "balance_gateway_missing");
            BalanceFetchFailure::UnsupportedNetwork
        })?;

        if gateway.address() != config.stablecoin_contract {
            debug!(
                expected = %config.stablecoin_contract,
                actual = %gateway.address(),
                event = "stablecoin_address_mismatch"
            );
            return Err(BalanceFetchFailure::InvalidAddress);
        }

        let read = async {
            let balance = gateway.balance_of(owner).await?;
            let decimals = resolve_decimals(gateway.as_ref()).await;
            Ok::<_, TransferError>(TokenAmount::from_raw(balance, decimals))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(BalanceFetchFailure::Cancelled),
            outcome = tokio::time::timeout(self.timeout, read) => match outcome {
                Ok(Ok(amount)) => Ok(amount),
                Ok(Err(e)) => {
                    debug!(error = %e, event = "balance_call_failed");
                    Err(BalanceFetchFailure::from(&e))
                }
                Err(_) => Err(BalanceFetchFailure::Timeout),
            },
        }
    }

    fn degrade(&self, address: &str, network: &str, reason: BalanceFetchFailure) -> BalanceReading {
        warn!(
            address = address,
            network = network,
            reason = %reason,
            event = "balance_read_degraded"
        );
        BalanceReading::degraded(address, network, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkConfig;
    use crate::testing::FakeChain;
    use alloy_primitives::U256;
    use rstest::rstest;

    const OWNER: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d";

    fn reader_with(chain: FakeChain) -> BalanceReader {
        BalanceReader::new(Arc::new(NetworkRegistry::testnets())).with_gateway(Arc::new(chain))
    }

    #[tokio::test]
    async fn test_reads_balance() {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::Sepolia));
        chain.set_balance(U256::from(12_500_000u64));

        let reading = reader_with(chain)
            .get_usdc_balance(OWNER, "sepolia", &CancellationToken::new())
            .await;

        assert_eq!(reading.amount, "12.50");
        assert!(!reading.degraded);
        assert_eq!(reading.reason, None);
    }

    #[tokio::test]
    async fn test_decimals_failure_falls_back_to_six() {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::Sepolia));
        chain.set_balance(U256::from(1_000_000u64));
        chain.fail_decimals();

        let reading = reader_with(chain)
            .get_usdc_balance(OWNER, "sepolia", &CancellationToken::new())
            .await;

        assert_eq!(reading.amount, "1.00");
        assert!(!reading.degraded);
    }

    #[rstest]
    #[case(OWNER, "goerli", BalanceFetchFailure::UnsupportedNetwork)]
    #[case(OWNER, "ethereum", BalanceFetchFailure::UnsupportedNetwork)]
    #[case(OWNER, "baseSepolia", BalanceFetchFailure::UnsupportedNetwork)]
    #[case("0x1234", "sepolia", BalanceFetchFailure::InvalidAddress)]
    #[tokio::test]
    async fn test_degraded_without_call(
        #[case] address: &str,
        #[case] network: &str,
        #[case] reason: BalanceFetchFailure,
    ) {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::Sepolia));
        let reader = reader_with(chain.clone());

        let reading = reader
            .get_usdc_balance(address, network, &CancellationToken::new())
            .await;

        assert_eq!(reading.amount, "0.00");
        assert!(reading.degraded);
        assert_eq!(reading.reason, Some(reason));
        assert_eq!(chain.balance_calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_contract_address_degrades() {
        let mut config = NetworkConfig::for_network(NetworkId::Sepolia);
        config.stablecoin_contract = Address::ZERO;
        let registry = Arc::new(NetworkRegistry::from_configs([config.clone()]));
        let reader = BalanceReader::new(registry).with_gateway(Arc::new(FakeChain::new(config)));

        let reading = reader
            .get_usdc_balance(OWNER, "sepolia", &CancellationToken::new())
            .await;

        assert_eq!(reading.reason, Some(BalanceFetchFailure::InvalidAddress));
        assert_eq!(reading.amount, "0.00");
    }

    #[tokio::test]
    async fn test_gateway_bound_to_other_contract_degrades() {
        let mut config = NetworkConfig::for_network(NetworkId::Sepolia);
        config.stablecoin_contract = Address::repeat_byte(0xaa);
        let registry = Arc::new(NetworkRegistry::from_configs([config]));

        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::Sepolia));
        chain.set_balance(U256::from(5_000_000u64));
        let reader = BalanceReader::new(registry).with_gateway(Arc::new(chain.clone()));

        let reading = reader
            .get_usdc_balance(OWNER, "sepolia", &CancellationToken::new())
            .await;

        assert!(reading.degraded);
        assert_eq!(reading.amount, "0.00");
        assert_eq!(reading.reason, Some(BalanceFetchFailure::InvalidAddress));
        assert_eq!(chain.balance_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_read_degrades() {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::Sepolia));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let reading = reader_with(chain).get_usdc_balance(OWNER, "sepolia", &cancel).await;

        assert_eq!(reading.reason, Some(BalanceFetchFailure::Cancelled));
    }
}
