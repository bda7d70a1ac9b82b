// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Production implementations of the [`crate::traits`] seams.
//!
//! These talk to real chains through alloy, to Circle's Iris API over HTTP,
//! and to the Tokio timer. Tests use the fakes in [`crate::testing`] instead.

mod alloy;
mod iris;
mod tokio_clock;

pub use self::alloy::AlloyChainGateway;
pub use self::iris::IrisAttestationProvider;
pub use self::tokio_clock::TokioClock;
