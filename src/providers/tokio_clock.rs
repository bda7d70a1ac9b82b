// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Tokio-based clock.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// Real-time [`Clock`] backed by `tokio::time::sleep`.
///
/// Under `#[tokio::test(start_paused = true)]` its sleeps auto-advance, so
/// the attestation poller can be driven through a full schedule instantly.
///
/// ```rust
/// use cctp_transfer::providers::TokioClock;
///
/// let clock = TokioClock;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_advances_paused_time() {
        let clock = TokioClock;
        let start = clock.now();

        clock.sleep(Duration::from_secs(30)).await;

        assert!(clock.now().duration_since(start) >= Duration::from_secs(30));
    }
}
