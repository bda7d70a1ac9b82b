// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! # cctp-transfer
//!
//! Cross-chain USDC transfers over Circle's Cross-Chain Transfer Protocol
//! (CCTP v1), packaged as the client a wallet or dashboard UI talks to.
//!
//! A transfer burns on the source chain, waits for Circle's attestation of the
//! burn message, and mints on the destination chain. This crate exposes each
//! phase separately, so a UI can persist progress and resume, and also runs
//! them end to end.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cctp_transfer::providers::AlloyChainGateway;
//! use cctp_transfer::{
//!     ClientConfig, NetworkId, NetworkRegistry, TransferClient, TransferError, TransferRequest,
//! };
//! use alloy_provider::ProviderBuilder;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(NetworkRegistry::testnets());
//! let client = TransferClient::connect(&ClientConfig::from_env()?, registry.clone());
//!
//! let quote = client.get_quote("100", NetworkId::Sepolia, NetworkId::ArbitrumSepolia)?;
//! println!("arrives in {}", quote.estimated_time);
//!
//! let source = AlloyChainGateway::new(
//!     registry.get(NetworkId::Sepolia)?,
//!     ProviderBuilder::new().connect_http("http://localhost:8545".parse()?),
//! );
//! let destination = AlloyChainGateway::new(
//!     registry.get(NetworkId::ArbitrumSepolia)?,
//!     ProviderBuilder::new().connect_http("http://localhost:8546".parse()?),
//! );
//!
//! let request = TransferRequest::builder()
//!     .amount("100")
//!     .from_network(NetworkId::Sepolia)
//!     .to_network(NetworkId::ArbitrumSepolia)
//!     .recipient("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d".parse()?)
//!     .build();
//! let owner = "0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d".parse()?;
//!
//! match client
//!     .execute_transfer(&request, owner, &source, owner, &destination, &CancellationToken::new())
//!     .await
//! {
//!     Ok(transfer) => println!("minted in {:?}", transfer.destination_tx_hash()),
//!     Err(e) if e.is_retryable() => println!("retry later: {e}"),
//!     Err(TransferError::InsufficientBalance { required, available }) => {
//!         println!("need {required}, have {available}")
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`TransferClient`] - quote, burn, attestation, mint and balance operations
//! - [`NetworkRegistry`], [`NetworkConfig`] and [`NetworkId`] - the supported networks
//! - [`TransferError`] and [`Result`] - typed failures per phase
//! - [`traits`] - the seams to chains, the attestation service and time;
//!   [`providers`] holds the production implementations and [`testing`] the fakes

mod contracts;
mod error;
mod network;
mod protocol;
mod transfer;

pub mod providers;
pub mod testing;
pub mod traits;

// Public module for advanced users who need custom instrumentation
pub mod spans;

pub use contracts::{MessageTransmitterContract, StablecoinContract, TokenMessengerContract};
pub use error::{BalanceFetchFailure, Result, TransferError};
pub use network::addresses;
pub use network::{NetworkConfig, NetworkId, NetworkRegistry};
pub use protocol::{
    AttestationLookup, AttestationResponse, AttestationState, AttestationStatus, BalanceReading,
    BurnMessage, DomainId, InvalidDomainId, MessageHeader, TokenAmount, TransferQuote,
    TransferRequest, TransferResult, TransferStatus, USDC_DECIMALS,
};
pub use transfer::{
    AttestationClient, BalanceReader, BurnInitiator, BurnStage, ClientConfig, MintCompleter,
    PollingConfig, TransferClient, TransferQuoter, ATTESTATION_PATH, BRIDGE_FEE,
    DEFAULT_BALANCE_TIMEOUT, DEFAULT_CONFIRMATIONS, DEFAULT_RECEIPT_TIMEOUT, ESTIMATED_GAS_FEE, ESTIMATED_TIME, IRIS_API, IRIS_API_SANDBOX,
};
