//! Engine configuration.
//!
//! Configuration is resolved once at process startup and handed to [`UuidEngine`]; the engine
//! never reads environment variables while serving calls.
//!
//! [`UuidEngine`]: crate::UuidEngine

use crate::error::{UuidError, UuidResult};
use crate::source::HashStrategy;

/// Environment variable selecting the [`HashStrategy`] (`digest` or `mixing`).
pub const ENV_HASH_STRATEGY: &str = "UUIDFORGE_HASH";

/// Environment variable overriding [`EngineConfig::latency_smoothing`].
pub const ENV_LATENCY_SMOOTHING: &str = "UUIDFORGE_LATENCY_SMOOTHING";

/// Weight of the newest sample in the latency moving average.
pub const DEFAULT_LATENCY_SMOOTHING: f64 = 0.1;

/// Engine configuration resolved at startup.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EngineConfig {
    hash_strategy: HashStrategy,
    latency_smoothing: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_strategy: HashStrategy::Digest,
            latency_smoothing: DEFAULT_LATENCY_SMOOTHING,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration, rejecting a smoothing factor outside `(0, 1]`.
    pub fn new(hash_strategy: HashStrategy, latency_smoothing: f64) -> UuidResult<Self> {
        if !(latency_smoothing > 0.0 && latency_smoothing <= 1.0) {
            return Err(UuidError::InvalidLatencySmoothing(
                latency_smoothing.to_string(),
            ));
        }
        Ok(Self {
            hash_strategy,
            latency_smoothing,
        })
    }

    /// Reads overrides from the process environment, falling back to defaults for unset
    /// variables.
    pub fn from_env() -> UuidResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, falling back to defaults for missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> UuidResult<Self> {
        let defaults = Self::default();
        let hash_strategy = match lookup(ENV_HASH_STRATEGY) {
            Some(value) => value.parse()?,
            None => defaults.hash_strategy,
        };
        let latency_smoothing = match lookup(ENV_LATENCY_SMOOTHING) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| UuidError::InvalidLatencySmoothing(value))?,
            None => defaults.latency_smoothing,
        };
        Self::new(hash_strategy, latency_smoothing)
    }

    pub fn hash_strategy(&self) -> HashStrategy {
        self.hash_strategy
    }

    pub fn latency_smoothing(&self) -> f64 {
        self.latency_smoothing
    }
}
