// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCTP v1 message format types
//!
//! The `MessageSent` event emitted by a burn carries a packed message: a fixed
//! header followed by the burn message body.
//!
//! Reference: <https://developers.circle.com/stablecoins/message-format>

use alloy_primitives::{keccak256, Address, Bytes, FixedBytes, B256, U256};

use super::DomainId;

/// CCTP v1 Message Header
///
/// # Format
///
/// - version: uint32 (4 bytes)
/// - sourceDomain: uint32 (4 bytes)
/// - destinationDomain: uint32 (4 bytes)
/// - nonce: uint64 (8 bytes)
/// - sender: bytes32 (32 bytes)
/// - recipient: bytes32 (32 bytes)
/// - destinationCaller: bytes32 (32 bytes)
/// - messageBody: dynamic bytes
///
/// Total fixed size: 4 + 4 + 4 + 8 + 32 + 32 + 32 = 116 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    pub source_domain: DomainId,
    pub destination_domain: DomainId,
    pub nonce: u64,
    /// Sending contract (the source TokenMessenger), padded to 32 bytes
    pub sender: FixedBytes<32>,
    /// Receiving contract (the destination TokenMessenger), padded to 32 bytes
    pub recipient: FixedBytes<32>,
    /// Address authorized to call receiveMessage on destination (0 = anyone)
    pub destination_caller: FixedBytes<32>,
    pub body: Bytes,
}

impl MessageHeader {
    /// Size of the fixed part of the message in bytes
    pub const SIZE: usize = 116;

    /// Encodes the message, header and body, in packed form.
    pub fn encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::SIZE + self.body.len());

        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.source_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.destination_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
        bytes.extend_from_slice(&self.body);

        Bytes::from(bytes)
    }

    /// Decodes a message
    ///
    /// Returns `None` if the bytes are shorter than [`MessageHeader::SIZE`]
    /// or if either domain is not one of the EVM domains [`DomainId`] knows.
    /// Messages to or from Noble (4) and Solana (5) do not decode.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        let version = u32::from_be_bytes(bytes[0..4].try_into().ok()?);
        let source_domain = DomainId::from_u32(u32::from_be_bytes(bytes[4..8].try_into().ok()?))?;
        let destination_domain =
            DomainId::from_u32(u32::from_be_bytes(bytes[8..12].try_into().ok()?))?;
        let nonce = u64::from_be_bytes(bytes[12..20].try_into().ok()?);
        let sender = FixedBytes::from_slice(&bytes[20..52]);
        let recipient = FixedBytes::from_slice(&bytes[52..84]);
        let destination_caller = FixedBytes::from_slice(&bytes[84..116]);
        let body = Bytes::copy_from_slice(&bytes[Self::SIZE..]);

        Some(Self {
            version,
            source_domain,
            destination_domain,
            nonce,
            sender,
            recipient,
            destination_caller,
            body,
        })
    }

    /// Key of this message in the destination MessageTransmitter's
    /// `usedNonces` mapping: `keccak256(abi.encodePacked(sourceDomain, nonce))`.
    pub fn used_nonce_key(&self) -> B256 {
        let mut packed = [0u8; 12];
        packed[..4].copy_from_slice(&self.source_domain.as_u32().to_be_bytes());
        packed[4..].copy_from_slice(&self.nonce.to_be_bytes());
        keccak256(packed)
    }

    /// Decodes the body as a burn message, if it is one.
    pub fn burn_message(&self) -> Option<BurnMessage> {
        BurnMessage::decode(&self.body)
    }
}

/// CCTP v1 Burn Message Body
///
/// # Format
///
/// - version: uint32 (4 bytes)
/// - burnToken: bytes32 (32 bytes)
/// - mintRecipient: bytes32 (32 bytes)
/// - amount: uint256 (32 bytes)
/// - messageSender: bytes32 (32 bytes)
///
/// Total size: 132 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnMessage {
    pub version: u32,
    pub burn_token: Address,
    pub mint_recipient: Address,
    pub amount: U256,
    pub message_sender: Address,
}

impl BurnMessage {
    pub const SIZE: usize = 132;

    pub fn encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::SIZE);

        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(self.burn_token.into_word().as_slice());
        bytes.extend_from_slice(self.mint_recipient.into_word().as_slice());
        bytes.extend_from_slice(&self.amount.to_be_bytes::<32>());
        bytes.extend_from_slice(self.message_sender.into_word().as_slice());

        Bytes::from(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        Some(Self {
            version: u32::from_be_bytes(bytes[0..4].try_into().ok()?),
            burn_token: Address::from_word(FixedBytes::from_slice(&bytes[4..36])),
            mint_recipient: Address::from_word(FixedBytes::from_slice(&bytes[36..68])),
            amount: U256::from_be_slice(&bytes[68..100]),
            message_sender: Address::from_word(FixedBytes::from_slice(&bytes[100..132])),
        })
    }
}
