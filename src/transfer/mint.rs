// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, TxHash};
use tracing::{info, warn, Instrument};

use crate::error::{Result, TransferError};
use crate::network::{NetworkId, NetworkRegistry};
use crate::protocol::{MessageHeader, TransferResult, TransferStatus};
use crate::spans;
use crate::traits::MessageTransmitterGateway;

/// Submits an attested message to the destination MessageTransmitter.
///
/// Before sending, the message is decoded and checked against the destination
/// network, and the transmitter's `usedNonces` is consulted so an already
/// received message fails fast instead of reverting on-chain.
#[derive(Debug, Clone)]
pub struct MintCompleter {
    registry: Arc<NetworkRegistry>,
}

impl MintCompleter {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        Self { registry }
    }

    /// Calls `receiveMessage(message, attestation)` on `to_network` and returns
    /// the confirmed transaction hash.
    ///
    /// `gateway` must be bound to `to_network` and sign for `caller`; this is
    /// a different signer from the one that burned on the source network.
    ///
    /// # Errors
    ///
    /// - `UnsupportedNetwork` if `to_network` is not in the registry
    /// - `InvalidConfig` if the gateway is bound to another network
    /// - `MintFailure` if the message or attestation is unusable, the message
    ///   was already received, or the transaction fails or reverts. Only
    ///   messages between the EVM domains 0, 1, 2, 3, 6 and 7 decode, so a
    ///   message burned on a non-EVM domain such as Noble (4) is rejected
    ///   here
    /// - RPC errors from the nonce lookup are returned unchanged
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
        let span = spans::complete_mint(to_network, &caller, message.len(), attestation.len());

        async move {
            let result = self
                .run(message, attestation, to_network, caller, gateway)
                .await;
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
        message: &Bytes,
        attestation: &Bytes,
        to_network: NetworkId,
        caller: Address,
        gateway: &G,
    ) -> Result<TxHash>
    where
        G: MessageTransmitterGateway + ?Sized,
    {
        let destination = self.registry.get(to_network)?;

        let bound = gateway.network();
        if bound != destination.id {
            return Err(TransferError::InvalidConfig(format!(
                "gateway is bound to {bound}, mint targets {}",
                destination.id
            )));
        }

        if attestation.is_empty() {
            return Err(mint_failure("attestation is empty"));
        }

        let header = MessageHeader::decode(message).ok_or_else(|| {
            mint_failure("message is not a CCTP v1 message between EVM domains 0, 1, 2, 3, 6 and 7")
        })?;

        if header.destination_domain != destination.domain_id {
            return Err(mint_failure(format!(
                "message is addressed to {}, {} is {}",
                header.destination_domain, destination.id, destination.domain_id
            )));
        }

        if gateway.is_nonce_used(header.used_nonce_key()).await? {
            warn!(
                source_domain = %header.source_domain,
                nonce = header.nonce,
                event = "message_already_received"
            );
            return Err(mint_failure(format!(
                "nonce {} from {} was already received",
                header.nonce, header.source_domain
            )));
        }

        info!(
            caller = %caller,
            nonce = header.nonce,
            event = "mint_transaction_initiated"
        );

        let receipt = gateway
            .receive_message(caller, message.clone(), attestation.clone())
            .await
            .map_err(|e| mint_failure(e.to_string()))?;

        if !receipt.success {
            return Err(mint_failure(format!(
                "receiveMessage transaction {} reverted",
                receipt.tx_hash
            )));
        }

        info!(tx_hash = %receipt.tx_hash, event = "mint_transaction_confirmed");
        Ok(receipt.tx_hash)
    }

    /// Mints an attested transfer and moves it to `completed`.
    pub async fn complete_transfer<G>(
        &self,
        transfer: &mut TransferResult,
        caller: Address,
        gateway: &G,
    ) -> Result<TxHash>
    where
        G: MessageTransmitterGateway + ?Sized,
    {
        let attestation = match (transfer.status(), transfer.attestation()) {
            (TransferStatus::Attested, Some(attestation)) => attestation.clone(),
            (status, _) => {
                return Err(TransferError::InvalidTransition {
                    from: status,
                    to: TransferStatus::Completed,
                })
            }
        };

        let tx_hash = self
            .complete_mint(
                transfer.message_bytes(),
                &attestation,
                transfer.to_network(),
                caller,
                gateway,
            )
            .await?;

        transfer.record_mint(tx_hash)?;
        Ok(tx_hash)
    }
}

fn mint_failure(reason: impl Into<String>) -> TransferError {
    TransferError::MintFailure {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkConfig;
    use crate::protocol::DomainId;
    use crate::testing::FakeChain;
    use alloy_primitives::B256;

    fn message_to(destination: DomainId, nonce: u64) -> Bytes {
        MessageHeader {
            version: 0,
            source_domain: DomainId::Ethereum,
            destination_domain: destination,
            nonce,
            sender: B256::ZERO,
            recipient: B256::ZERO,
            destination_caller: B256::ZERO,
            body: Bytes::new(),
        }
        .encode()
    }

    fn completer() -> MintCompleter {
        MintCompleter::new(Arc::new(NetworkRegistry::testnets()))
    }

    #[tokio::test]
    async fn test_undecodable_message() {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::ArbitrumSepolia));

        let err = completer()
            .complete_mint(
                &Bytes::from(vec![0u8; 12]),
                &Bytes::from(vec![1]),
                NetworkId::ArbitrumSepolia,
                Address::ZERO,
                &chain,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::MintFailure { .. }));
        assert_eq!(chain.receive_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_evm_source_domain_is_rejected() {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::ArbitrumSepolia));
        let mut message = vec![0u8; MessageHeader::SIZE];
        message[4..8].copy_from_slice(&4u32.to_be_bytes());
        message[8..12].copy_from_slice(&3u32.to_be_bytes());

        let err = completer()
            .complete_mint(
                &Bytes::from(message),
                &Bytes::from(vec![1]),
                NetworkId::ArbitrumSepolia,
                Address::ZERO,
                &chain,
            )
            .await
            .unwrap_err();

        insta::assert_snapshot!(
            err.to_string(),
            @"Mint failed: message is not a CCTP v1 message between EVM domains 0, 1, 2, 3, 6 and 7"
        );
        assert_eq!(chain.receive_calls(), 0);
    }

    #[tokio::test]
    async fn test_used_nonce_is_checked_before_sending() {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::ArbitrumSepolia));
        let message = message_to(DomainId::Arbitrum, 9);
        let key = MessageHeader::decode(&message).unwrap().used_nonce_key();
        chain.mark_nonce_used(key);

        let err = completer()
            .complete_mint(
                &message,
                &Bytes::from(vec![1]),
                NetworkId::ArbitrumSepolia,
                Address::ZERO,
                &chain,
            )
            .await
            .unwrap_err();

        insta::assert_snapshot!(
            err.to_string(),
            @"Mint failed: nonce 9 from 0 (Ethereum) was already received"
        );
        assert_eq!(chain.receive_calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_transfer_marks_completed() {
        let chain = FakeChain::new(NetworkConfig::for_network(NetworkId::ArbitrumSepolia));
        let message = message_to(DomainId::Arbitrum, 1);
        let mut transfer = TransferResult::pending(
            NetworkId::Sepolia,
            NetworkId::ArbitrumSepolia,
            TxHash::repeat_byte(1),
            alloy_primitives::keccak256(&message),
            message,
        );
        transfer.record_attestation(Bytes::from(vec![1])).unwrap();

        let tx_hash = completer()
            .complete_transfer(&mut transfer, Address::ZERO, &chain)
            .await
            .unwrap();

        assert_eq!(transfer.status(), TransferStatus::Completed);
        assert_eq!(transfer.destination_tx_hash(), Some(tx_hash));
    }
}
