// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use alloy_chains::NamedChain;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::addresses::*;
use crate::error::{Result, TransferError};
use crate::protocol::DomainId;

/// Networks the transfer client knows how to reach.
///
/// The serialized form is the camelCase name used by the dashboard
/// (`"sepolia"`, `"arbitrumSepolia"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkId {
    Ethereum,
    Avalanche,
    Optimism,
    Arbitrum,
    Base,
    Polygon,
    Sepolia,
    AvalancheFuji,
    OptimismSepolia,
    ArbitrumSepolia,
    BaseSepolia,
    PolygonAmoy,
}

impl NetworkId {
    pub const ALL: [NetworkId; 12] = [
        Self::Ethereum,
        Self::Avalanche,
        Self::Optimism,
        Self::Arbitrum,
        Self::Base,
        Self::Polygon,
        Self::Sepolia,
        Self::AvalancheFuji,
        Self::OptimismSepolia,
        Self::ArbitrumSepolia,
        Self::BaseSepolia,
        Self::PolygonAmoy,
    ];

    /// The dashboard-facing identifier, also accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Avalanche => "avalanche",
            Self::Optimism => "optimism",
            Self::Arbitrum => "arbitrum",
            Self::Base => "base",
            Self::Polygon => "polygon",
            Self::Sepolia => "sepolia",
            Self::AvalancheFuji => "avalancheFuji",
            Self::OptimismSepolia => "optimismSepolia",
            Self::ArbitrumSepolia => "arbitrumSepolia",
            Self::BaseSepolia => "baseSepolia",
            Self::PolygonAmoy => "polygonAmoy",
        }
    }

    /// Prefix of the `<PREFIX>_RPC_URL` environment variable for this network.
    pub const fn env_prefix(self) -> &'static str {
        match self {
            Self::Ethereum => "ETHEREUM",
            Self::Avalanche => "AVALANCHE",
            Self::Optimism => "OPTIMISM",
            Self::Arbitrum => "ARBITRUM",
            Self::Base => "BASE",
            Self::Polygon => "POLYGON",
            Self::Sepolia => "SEPOLIA",
            Self::AvalancheFuji => "AVALANCHE_FUJI",
            Self::OptimismSepolia => "OPTIMISM_SEPOLIA",
            Self::ArbitrumSepolia => "ARBITRUM_SEPOLIA",
            Self::BaseSepolia => "BASE_SEPOLIA",
            Self::PolygonAmoy => "POLYGON_AMOY",
        }
    }

    pub const fn named_chain(self) -> NamedChain {
        match self {
            Self::Ethereum => NamedChain::Mainnet,
            Self::Avalanche => NamedChain::Avalanche,
            Self::Optimism => NamedChain::Optimism,
            Self::Arbitrum => NamedChain::Arbitrum,
            Self::Base => NamedChain::Base,
            Self::Polygon => NamedChain::Polygon,
            Self::Sepolia => NamedChain::Sepolia,
            Self::AvalancheFuji => NamedChain::AvalancheFuji,
            Self::OptimismSepolia => NamedChain::OptimismSepolia,
            Self::ArbitrumSepolia => NamedChain::ArbitrumSepolia,
            Self::BaseSepolia => NamedChain::BaseSepolia,
            Self::PolygonAmoy => NamedChain::PolygonAmoy,
        }
    }

    pub const fn is_testnet(self) -> bool {
        matches!(
            self,
            Self::Sepolia
                | Self::AvalancheFuji
                | Self::OptimismSepolia
                | Self::ArbitrumSepolia
                | Self::BaseSepolia
                | Self::PolygonAmoy
        )
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|network| network.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TransferError::unsupported(s))
    }
}

/// Identifiers and contract addresses for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub id: NetworkId,
    pub chain_id: u64,
    pub domain_id: DomainId,
    pub name: String,
    pub token_messenger: Address,
    pub message_transmitter: Address,
    pub stablecoin_contract: Address,
}

impl NetworkConfig {
    /// The built-in CCTP v1 deployment for `id`.
    pub fn for_network(id: NetworkId) -> Self {
        use NetworkId::*;

        let (domain_id, name, token_messenger, message_transmitter, stablecoin_contract) = match id
        {
            Ethereum => (
                DomainId::Ethereum,
                "Ethereum",
                ETHEREUM_TOKEN_MESSENGER_ADDRESS,
                ETHEREUM_MESSAGE_TRANSMITTER_ADDRESS,
                ETHEREUM_USDC_ADDRESS,
            ),
            Avalanche => (
                DomainId::Avalanche,
                "Avalanche C-Chain",
                AVALANCHE_TOKEN_MESSENGER_ADDRESS,
                AVALANCHE_MESSAGE_TRANSMITTER_ADDRESS,
                AVALANCHE_USDC_ADDRESS,
            ),
            Optimism => (
                DomainId::Optimism,
                "OP Mainnet",
                OPTIMISM_TOKEN_MESSENGER_ADDRESS,
                OPTIMISM_MESSAGE_TRANSMITTER_ADDRESS,
                OPTIMISM_USDC_ADDRESS,
            ),
            Arbitrum => (
                DomainId::Arbitrum,
                "Arbitrum One",
                ARBITRUM_TOKEN_MESSENGER_ADDRESS,
                ARBITRUM_MESSAGE_TRANSMITTER_ADDRESS,
                ARBITRUM_USDC_ADDRESS,
            ),
            Base => (
                DomainId::Base,
                "Base",
                BASE_TOKEN_MESSENGER_ADDRESS,
                BASE_MESSAGE_TRANSMITTER_ADDRESS,
                BASE_USDC_ADDRESS,
            ),
            Polygon => (
                DomainId::Polygon,
                "Polygon PoS",
                POLYGON_TOKEN_MESSENGER_ADDRESS,
                POLYGON_MESSAGE_TRANSMITTER_ADDRESS,
                POLYGON_USDC_ADDRESS,
            ),
            Sepolia => (
                DomainId::Ethereum,
                "Ethereum Sepolia",
                TESTNET_TOKEN_MESSENGER_ADDRESS,
                TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
                SEPOLIA_USDC_ADDRESS,
            ),
            AvalancheFuji => (
                DomainId::Avalanche,
                "Avalanche Fuji",
                TESTNET_TOKEN_MESSENGER_ADDRESS,
                TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
                AVALANCHE_FUJI_USDC_ADDRESS,
            ),
            OptimismSepolia => (
                DomainId::Optimism,
                "OP Sepolia",
                TESTNET_TOKEN_MESSENGER_ADDRESS,
                TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
                OPTIMISM_SEPOLIA_USDC_ADDRESS,
            ),
            ArbitrumSepolia => (
                DomainId::Arbitrum,
                "Arbitrum Sepolia",
                TESTNET_TOKEN_MESSENGER_ADDRESS,
                ARBITRUM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS,
                ARBITRUM_SEPOLIA_USDC_ADDRESS,
            ),
            BaseSepolia => (
                DomainId::Base,
                "Base Sepolia",
                TESTNET_TOKEN_MESSENGER_ADDRESS,
                TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
                BASE_SEPOLIA_USDC_ADDRESS,
            ),
            PolygonAmoy => (
                DomainId::Polygon,
                "Polygon Amoy",
                TESTNET_TOKEN_MESSENGER_ADDRESS,
                TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
                POLYGON_AMOY_USDC_ADDRESS,
            ),
        };

        Self {
            id,
            chain_id: id.named_chain() as u64,
            domain_id,
            name: name.to_string(),
            token_messenger,
            message_transmitter,
            stablecoin_contract,
        }
    }
}

/// Immutable table of the networks a client may transfer between.
///
/// Built once at startup and shared by reference (usually behind an `Arc`)
/// with every component. Tests substitute their own table via
/// [`NetworkRegistry::from_configs`].
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: BTreeMap<NetworkId, NetworkConfig>,
}

impl NetworkRegistry {
    pub fn from_configs(configs: impl IntoIterator<Item = NetworkConfig>) -> Self {
        Self {
            networks: configs
                .into_iter()
                .map(|config| (config.id, config))
                .collect(),
        }
    }

    pub fn testnets() -> Self {
        Self::from_ids(NetworkId::ALL.into_iter().filter(|id| id.is_testnet()))
    }

    pub fn mainnets() -> Self {
        Self::from_ids(NetworkId::ALL.into_iter().filter(|id| !id.is_testnet()))
    }

    pub fn all() -> Self {
        Self::from_ids(NetworkId::ALL)
    }

    fn from_ids(ids: impl IntoIterator<Item = NetworkId>) -> Self {
        Self::from_configs(ids.into_iter().map(NetworkConfig::for_network))
    }

    /// Returns the configuration for `id`, or `UnsupportedNetwork`.
    pub fn get(&self, id: NetworkId) -> Result<&NetworkConfig> {
        self.networks
            .get(&id)
            .ok_or_else(|| TransferError::unsupported(id))
    }

    pub fn contains(&self, id: NetworkId) -> bool {
        self.networks.contains_key(&id)
    }

    pub fn network_ids(&self) -> Vec<NetworkId> {
        self.networks.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sepolia", NetworkId::Sepolia)]
    #[case("arbitrumSepolia", NetworkId::ArbitrumSepolia)]
    #[case("ARBITRUMSEPOLIA", NetworkId::ArbitrumSepolia)]
    #[case(" base ", NetworkId::Base)]
    fn test_parse_network_id(#[case] input: &str, #[case] expected: NetworkId) {
        assert_eq!(input.parse::<NetworkId>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_network() {
        let err = "goerli".parse::<NetworkId>().unwrap_err();
        assert!(matches!(err, TransferError::UnsupportedNetwork { network } if network == "goerli"));
    }

    #[test]
    fn test_network_id_serde_matches_display() {
        for id in NetworkId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{id}\""));
        }
    }

    #[rstest]
    #[case(NetworkId::Sepolia, 11_155_111, DomainId::Ethereum)]
    #[case(NetworkId::ArbitrumSepolia, 421_614, DomainId::Arbitrum)]
    #[case(NetworkId::BaseSepolia, 84_532, DomainId::Base)]
    #[case(NetworkId::Ethereum, 1, DomainId::Ethereum)]
    #[case(NetworkId::Arbitrum, 42_161, DomainId::Arbitrum)]
    fn test_builtin_configs(
        #[case] id: NetworkId,
        #[case] chain_id: u64,
        #[case] domain: DomainId,
    ) {
        let config = NetworkConfig::for_network(id);
        assert_eq!(config.chain_id, chain_id);
        assert_eq!(config.domain_id, domain);
        assert!(!config.token_messenger.is_zero());
        assert!(!config.message_transmitter.is_zero());
        assert!(!config.stablecoin_contract.is_zero());
    }

    #[test]
    fn test_testnets_share_token_messenger() {
        let registry = NetworkRegistry::testnets();
        assert!(registry
            .iter()
            .all(|config| config.token_messenger == TESTNET_TOKEN_MESSENGER_ADDRESS));
        assert_eq!(
            registry
                .get(NetworkId::ArbitrumSepolia)
                .unwrap()
                .message_transmitter,
            ARBITRUM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS
        );
    }

    #[test]
    fn test_registry_presets_partition_networks() {
        let testnets = NetworkRegistry::testnets();
        let mainnets = NetworkRegistry::mainnets();
        assert_eq!(testnets.network_ids().len() + mainnets.network_ids().len(), 12);
        assert!(testnets.contains(NetworkId::Sepolia));
        assert!(!testnets.contains(NetworkId::Ethereum));
        assert!(matches!(
            testnets.get(NetworkId::Ethereum),
            Err(TransferError::UnsupportedNetwork { .. })
        ));
    }

    #[test]
    fn test_custom_registry() {
        let registry =
            NetworkRegistry::from_configs([NetworkConfig::for_network(NetworkId::Sepolia)]);
        assert_eq!(registry.network_ids(), vec![NetworkId::Sepolia]);
        assert!(registry.get(NetworkId::BaseSepolia).is_err());
    }
}
