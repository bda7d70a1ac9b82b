// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Network registry and contract addresses
//!
//! This module contains the per-network identifiers the transfer client needs:
//! native chain id, CCTP domain id, and the TokenMessenger, MessageTransmitter
//! and USDC contract addresses.

pub mod addresses;
mod registry;

pub use registry::{NetworkConfig, NetworkId, NetworkRegistry};
