//! Service-level tuning knobs.

use std::time::Duration;

/// How the command dispatcher serializes and retries per-course mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Total attempts (first try included) when the store reports a version conflict.
    pub max_attempts: u32,
    /// Upper bound on waiting for another mutation of the same course to finish.
    pub lock_timeout: Duration,
}

impl DispatchConfig {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
        }
    }
}
