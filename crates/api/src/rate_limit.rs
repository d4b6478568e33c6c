//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Limits estimate requests per peer IP using tower_governor. Requires the
//! service to run with `into_make_service_with_connect_info::<SocketAddr>()`.

use governor::middleware::StateInformationMiddleware;
use serde::Deserialize;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config keyed by peer IP, emitting X-RateLimit-* headers
pub type DefaultGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether the limiter is installed at all
    pub enabled: bool,
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Burst size (max requests that can be made immediately)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_second: 1,
            burst_size: 10,
        }
    }
}

impl RateLimitConfig {
    /// Tighter limits for exposed deployments
    pub fn strict() -> Self {
        Self {
            enabled: true,
            per_second: 4,
            burst_size: 2,
        }
    }
}

/// Build the governor config; zero rates are rejected
pub fn create_governor_config(
    config: &RateLimitConfig,
) -> anyhow::Result<Arc<DefaultGovernorConfig>> {
    let governor = GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "invalid rate limit: per_second={} burst_size={} (both must be non-zero)",
                config.per_second,
                config.burst_size
            )
        })?;
    Ok(Arc::new(governor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.per_second, 1);
        assert_eq!(config.burst_size, 10);
    }

    #[test]
    fn test_create_governor_config() {
        assert!(create_governor_config(&RateLimitConfig::strict()).is_ok());
    }

    #[test]
    fn test_zero_burst_rejected() {
        let config = RateLimitConfig {
            burst_size: 0,
            ..Default::default()
        };
        assert!(create_governor_config(&config).is_err());
    }
}
