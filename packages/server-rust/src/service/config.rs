use std::time::Duration;

use super::retry::RetryPolicy;

/// Server-level configuration for the operation pipeline.
///
/// Controls concurrency limits and the retry policy wrapped around dispatch.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of concurrent operations before load shedding.
    pub max_concurrent_operations: u32,
    /// Total attempts per operation, including the first one.
    pub retry_max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl ServerConfig {
    /// Builds the fixed-delay retry policy described by this configuration.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_operations: 1000,
            retry_max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::retry::Backoff;

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.max_concurrent_operations, 1000);
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1000);
    }

    #[test]
    fn default_retry_policy_is_three_fixed_one_second_attempts() {
        let policy = ServerConfig::default().retry_policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(), Backoff::Fixed(Duration::from_secs(1)));
    }
}
