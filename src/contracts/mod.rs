// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCTP contract bindings
//!
//! Alloy `sol!` bindings plus thin instrumented wrappers for the three
//! contracts a transfer touches:
//!
//! - [`StablecoinContract`]: USDC allowance, approval, balance, decimals
//! - [`TokenMessengerContract`]: `depositForBurn` on the source chain
//! - [`MessageTransmitterContract`]: `MessageSent` on the source chain,
//!   `receiveMessage` and `usedNonces` on the destination chain

mod message_transmitter;
mod stablecoin;
mod token_messenger;

pub use message_transmitter::{MessageSent, MessageTransmitterContract};
pub use stablecoin::StablecoinContract;
pub use token_messenger::TokenMessengerContract;
