// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! TokenMessenger contract bindings and wrapper
//!
//! The CCTP v1 TokenMessenger burns USDC on the source chain and emits the
//! cross-chain message through the local MessageTransmitter.

use alloy_network::Ethereum;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};
use TokenMessenger::TokenMessengerInstance;

use crate::protocol::DomainId;

/// The CCTP v1 Token Messenger contract wrapper
pub struct TokenMessengerContract<P: Provider<Ethereum>> {
    instance: TokenMessengerInstance<P>,
}

impl<P: Provider<Ethereum>> TokenMessengerContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "token_messenger_contract_initialized"
        );
        Self {
            instance: TokenMessengerInstance::new(address, provider),
        }
    }

    /// Unsigned `depositForBurn` transaction.
    ///
    /// `mint_recipient` is the destination address left-padded to 32 bytes.
    pub fn deposit_for_burn_transaction(
        &self,
        from_address: Address,
        amount: U256,
        destination_domain: DomainId,
        mint_recipient: B256,
        burn_token: Address,
    ) -> TransactionRequest {
        info!(
            from_address = %from_address,
            mint_recipient = %mint_recipient,
            destination_domain = %destination_domain,
            burn_token = %burn_token,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "deposit_for_burn_transaction_created"
        );

        self.instance
            .depositForBurn(
                amount,
                destination_domain.as_u32(),
                mint_recipient,
                burn_token,
            )
            .from(from_address)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract TokenMessenger {
        function depositForBurn(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken
        ) external returns (uint64 nonce);
    }
);
