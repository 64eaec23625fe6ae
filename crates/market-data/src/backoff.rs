//! Exponential backoff for rate-limited upstream calls.
//!
//! A single [`Backoff`] is owned by a [`CachedFetcher`](crate::fetch::CachedFetcher)
//! and shared by every endpoint that fetcher serves: a 429 from one upstream
//! lengthens the wait applied to the next 429 from any other. Any non-429
//! response resets the delay to its floor.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::warn;

/// Delay applied to the first retry.
pub const DEFAULT_BACKOFF_FLOOR: Duration = Duration::from_millis(1000);

/// Upper bound of the delay.
pub const DEFAULT_BACKOFF_CEILING: Duration = Duration::from_millis(60_000);

/// Retries allowed for one request before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Backoff configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    pub floor: Duration,
    pub ceiling: Duration,
    /// `None` retries forever at the ceiling.
    pub max_retries: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            floor: DEFAULT_BACKOFF_FLOOR,
            ceiling: DEFAULT_BACKOFF_CEILING,
            max_retries: Some(DEFAULT_MAX_RETRIES),
        }
    }
}

/// Shared retry delay, kept within `[floor, ceiling]`.
pub struct Backoff {
    current: Mutex<Duration>,
    config: BackoffConfig,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        let ceiling = config.ceiling.max(config.floor);
        let config = BackoffConfig { ceiling, ..config };
        Self {
            current: Mutex::new(config.floor),
            config,
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Duration> {
        self.current.lock().unwrap_or_else(|poisoned| {
            warn!("Backoff mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Take the delay to wait before the next retry and double the stored
    /// delay, capped at the ceiling.
    pub fn next_delay(&self) -> Duration {
        let mut current = self.lock_current();
        let delay = *current;
        *current = (delay * 2).min(self.config.ceiling);
        delay
    }

    /// Return to the floor after a response that was not rate limited.
    pub fn reset(&self) {
        *self.lock_current() = self.config.floor;
    }

    pub fn current(&self) -> Duration {
        *self.lock_current()
    }

    /// Whether another retry is allowed after `retries` have already been made.
    pub fn allows_retry(&self, retries: u32) -> bool {
        match self.config.max_retries {
            Some(max) => retries < max,
            None => true,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}
