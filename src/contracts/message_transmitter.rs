// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! MessageTransmitter contract bindings and wrapper
//!
//! On the source chain the transmitter emits `MessageSent`; on the destination
//! chain `receiveMessage` verifies the attestation and mints.

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};
use MessageTransmitter::MessageTransmitterInstance;

pub use MessageTransmitter::MessageSent;

/// The CCTP v1 Message Transmitter contract wrapper
pub struct MessageTransmitterContract<P: Provider<Ethereum>> {
    instance: MessageTransmitterInstance<P>,
}

impl<P: Provider<Ethereum>> MessageTransmitterContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "message_transmitter_contract_initialized"
        );
        Self {
            instance: MessageTransmitterInstance::new(address, provider),
        }
    }

    /// Unsigned `receiveMessage(message, attestation)` transaction.
    pub fn receive_message_transaction(
        &self,
        from_address: Address,
        message: Bytes,
        attestation: Bytes,
    ) -> TransactionRequest {
        info!(
            from_address = %from_address,
            message_len = message.len(),
            attestation_len = attestation.len(),
            contract_address = %self.instance.address(),
            event = "receive_message_transaction_created"
        );

        self.instance
            .receiveMessage(message, attestation)
            .from(from_address)
            .into_transaction_request()
    }

    /// Value of `usedNonces[key]`; non-zero once the message was received.
    pub async fn used_nonces(&self, key: B256) -> Result<U256, alloy_contract::Error> {
        let result = self.instance.usedNonces(key).call().await?;

        debug!(
            nonce_key = %key,
            used = %result,
            contract_address = %self.instance.address(),
            event = "used_nonce_checked"
        );

        Ok(result)
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract MessageTransmitter {
        event MessageSent(bytes message);

        function receiveMessage(bytes calldata message, bytes calldata attestation)
            external
            returns (bool success);

        function usedNonces(bytes32 sourceAndNonce) external view returns (uint256);
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{b256, keccak256};
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn test_message_sent_topic() {
        assert_eq!(MessageSent::SIGNATURE_HASH, keccak256(b"MessageSent(bytes)"));
        assert_eq!(
            MessageSent::SIGNATURE_HASH,
            b256!("8c5261668696ce22758910d05bab8f186d6eb247ceac2af2e82c7dc17669b036")
        );
    }

    #[test]
    fn test_message_sent_data_decodes() {
        let event = MessageSent {
            message: Bytes::from(vec![0xab; 248]),
        };
        let log_data = event.encode_log_data();

        let decoded = MessageSent::abi_decode_data(&log_data.data).unwrap();
        assert_eq!(decoded.0, Bytes::from(vec![0xab; 248]));
    }

    #[test]
    fn test_receive_message_selector() {
        assert_eq!(
            MessageTransmitter::receiveMessageCall::SELECTOR,
            [0x57, 0xec, 0xfd, 0x28]
        );
    }
}
