//! Default engine and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::engine::{BatchResult, GeneratedRecord, GenerationConfig};
use crate::error::UuidResult;
use crate::format::UuidFormat;
use crate::stats::StatsSnapshot;
use crate::validate::ValidationResult;
use inner::GlobalEngine;

/// Returns the lock handle of process-wide global engine, creating one if none exists.
///
/// A panic while the lock was held leaves the engine usable, so poisoning is ignored.
fn lock_global_engine() -> sync::MutexGuard<'static, GlobalEngine> {
    static G: sync::OnceLock<sync::Mutex<GlobalEngine>> = sync::OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .unwrap_or_else(sync::PoisonError::into_inner)
}

/// Generates one UUID with the global engine.
///
/// The global engine reads its configuration from the environment on first use (see
/// [`EngineConfig::from_env`](crate::EngineConfig::from_env)). On Unix, it is recreated when the
/// process ID changes (i.e., upon process forks) so that forked processes do not share version 1
/// clock state or random streams.
///
/// # Examples
///
/// ```rust
/// use uuidforge::{generate_uuid, GenerationConfig, Version};
///
/// let record = generate_uuid(&GenerationConfig::new(Version::V1))?;
/// println!("{}", record.uuid); // e.g. "c232ab00-9414-11ec-b3c8-9f6bdeced846"
/// # Ok::<(), uuidforge::UuidError>(())
/// ```
pub fn generate_uuid(config: &GenerationConfig) -> UuidResult<GeneratedRecord> {
    lock_global_engine().get_mut().generate(config)
}

/// Generates a batch of UUIDs with the global engine.
///
/// # Examples
///
/// ```rust
/// use uuidforge::{generate_batch, GenerationConfig};
///
/// let batch = generate_batch(&GenerationConfig::default().with_count(10))?;
/// assert_eq!(batch.total_generated, 10);
/// # Ok::<(), uuidforge::UuidError>(())
/// ```
pub fn generate_batch(config: &GenerationConfig) -> UuidResult<BatchResult> {
    lock_global_engine().get_mut().generate_batch(config)
}

/// Validates UUID text, counting the attempt in the global statistics.
pub fn validate_uuid(text: &str) -> ValidationResult {
    lock_global_engine().get_mut().validate(text)
}

/// Re-renders UUID text in `format`.
///
/// # Examples
///
/// ```rust
/// use uuidforge::{format_uuid, UuidFormat};
///
/// let text = format_uuid("550E8400E29B41D4A716446655440000", UuidFormat::Braces)?;
/// assert_eq!(text, "{550e8400-e29b-41d4-a716-446655440000}");
/// # Ok::<(), uuidforge::UuidError>(())
/// ```
pub fn format_uuid(text: &str, format: UuidFormat) -> UuidResult<String> {
    lock_global_engine().get_mut().format_uuid(text, format)
}

/// Returns a snapshot of the global statistics.
pub fn stats() -> StatsSnapshot {
    lock_global_engine().get_mut().stats()
}

pub fn reset_stats() {
    lock_global_engine().get_mut().reset_stats()
}

mod inner {
    use crate::config::EngineConfig;
    use crate::engine::UuidEngine;

    /// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub struct GlobalEngine {
        #[cfg(unix)]
        pid: u32,
        engine: UuidEngine,
    }

    impl Default for GlobalEngine {
        fn default() -> Self {
            let config = EngineConfig::from_env().unwrap_or_else(|err| {
                tracing::warn!(%err, "ignoring invalid engine configuration");
                EngineConfig::default()
            });
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                engine: UuidEngine::with_config(config),
            }
        }
    }

    impl GlobalEngine {
        /// Returns a mutable reference to the inner [`UuidEngine`] instance, reseting the engine
        /// on Unix if the process ID has changed.
        pub fn get_mut(&mut self) -> &mut UuidEngine {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                *self = Default::default();
            }
            &mut self.engine
        }
    }
}
