//! Stateful generation engine

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{ClockState, StdSystemTime, TimeFields, TimeSource, TimestampClock};
use crate::config::EngineConfig;
use crate::encoder::{Encoded, Encoder};
use crate::error::{UuidError, UuidResult};
use crate::format::{self, UuidFormat};
use crate::source::{ByteSource, RandSource, RandomSource, Security};
use crate::stats::{Stats, StatsSnapshot};
use crate::validate::{self, ValidationResult};
use crate::{Uuid, Version};

/// Largest number of UUIDs a single batch produces; larger requests are clamped.
pub const MAX_BATCH_SIZE: usize = 1000;

/// What to generate.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    pub version: Version,
    pub format: UuidFormat,
    /// Batch size; ignored by [`UuidEngine::generate`]
    pub count: usize,
    /// Namespace UUID or one of `dns`, `url`, `oid` and `x500`; v3 and v5 only
    pub namespace: Option<String>,
    /// v3 and v5 only
    pub name: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            version: Version::V4,
            format: UuidFormat::Standard,
            count: 1,
            namespace: None,
            name: None,
        }
    }
}

impl GenerationConfig {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: UuidFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_name(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self.name = Some(name.into());
        self
    }
}

/// A generated UUID with the metadata describing how it was made.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecord {
    /// UUID rendered in `format`
    pub uuid: String,
    pub version: Version,
    pub format: UuidFormat,
    #[serde(flatten)]
    pub time_fields: Option<TimeFields>,
    pub generated_at: DateTime<Utc>,
    /// Set when the UUID was produced with a weak randomness or hashing primitive
    pub degraded: bool,
}

/// Output of [`UuidEngine::generate_batch`].
#[derive(Clone, PartialEq, Debug)]
pub struct BatchResult {
    pub uuids: Vec<GeneratedRecord>,
    pub total_generated: usize,
    /// Wall time spent producing the whole batch
    pub generation_time: Duration,
}

/// Owns the byte source, the version 1 clock and the statistics.
///
/// # Examples
///
/// ```rust
/// use uuidforge::{GenerationConfig, UuidEngine, UuidFormat, Version};
///
/// let mut engine = UuidEngine::new();
/// let config = GenerationConfig::new(Version::V5)
///     .with_name("dns", "example.com")
///     .with_format(UuidFormat::Braces);
/// let record = engine.generate(&config)?;
/// assert_eq!(record.uuid, "{0afe21b6-d5ef-519e-8ac3-9e7ad18d6f73}");
/// # Ok::<(), uuidforge::UuidError>(())
/// ```
#[derive(Debug)]
pub struct UuidEngine<R = RandomSource, T = StdSystemTime> {
    source: ByteSource<R>,
    clock: TimestampClock<T>,
    stats: Stats,
}

impl UuidEngine {
    /// Creates an engine with the default configuration and the best available randomness.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_sources(RandomSource::detect(), StdSystemTime, config)
    }
}

impl Default for UuidEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandSource, T: TimeSource> UuidEngine<R, T> {
    /// Creates an engine from explicit randomness and time sources.
    pub fn with_sources(rng: R, time: T, config: EngineConfig) -> Self {
        Self {
            source: ByteSource::new(rng, config.hash_strategy()),
            clock: TimestampClock::new(time),
            stats: Stats::new(config.latency_smoothing()),
        }
    }

    /// Generates one UUID; `config.count` is ignored.
    pub fn generate(&mut self, config: &GenerationConfig) -> UuidResult<GeneratedRecord> {
        let encoder = self.encoder(config)?;
        Ok(self.generate_with(&encoder, config.format))
    }

    /// Generates `config.count` UUIDs, clamped to [`MAX_BATCH_SIZE`].
    ///
    /// Version 1 UUIDs in a batch carry strictly increasing timestamps.
    pub fn generate_batch(&mut self, config: &GenerationConfig) -> UuidResult<BatchResult> {
        if config.count == 0 {
            return Err(self.reject(UuidError::InvalidCount));
        }
        let count = config.count.min(MAX_BATCH_SIZE);
        if count < config.count {
            tracing::debug!(requested = config.count, count, "clamped batch size");
        }
        let encoder = self.encoder(config)?;

        let started = Instant::now();
        let uuids: Vec<_> = (0..count)
            .map(|_| self.generate_with(&encoder, config.format))
            .collect();
        let generation_time = started.elapsed();
        self.stats.record_batch(uuids.len(), generation_time);

        Ok(BatchResult {
            total_generated: uuids.len(),
            uuids,
            generation_time,
        })
    }

    /// Validates `text`, counting the attempt and any failure.
    pub fn validate(&mut self, text: &str) -> ValidationResult {
        let result = validate::validate(text);
        self.stats.record_validation(result.is_valid);
        result
    }

    /// Re-renders UUID text written in any supported format.
    pub fn format_uuid(&mut self, text: &str, format: UuidFormat) -> UuidResult<String> {
        match format::normalize(text).parse::<Uuid>() {
            Ok(uuid) => Ok(format::format(&uuid, format)),
            Err(err) => Err(self.reject(err.into())),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Reports the strength of the primitives backing this engine.
    pub fn security(&self) -> Security {
        self.source.security()
    }

    /// Returns the version 1 clock state, if any version 1 UUID has been generated.
    pub fn clock_state(&self) -> Option<&ClockState> {
        self.clock.state()
    }

    fn encoder<'a>(&mut self, config: &'a GenerationConfig) -> UuidResult<Encoder<'a>> {
        Encoder::from_config(config).map_err(|err| self.reject(err))
    }

    fn reject(&mut self, err: UuidError) -> UuidError {
        tracing::debug!(%err, "rejected request");
        self.stats.record_error();
        err
    }

    fn generate_with(&mut self, encoder: &Encoder, format: UuidFormat) -> GeneratedRecord {
        let started = Instant::now();
        let Encoded { uuid, time_fields } = encoder.encode(&mut self.source, &mut self.clock);
        let record = GeneratedRecord {
            uuid: format::format(&uuid, format),
            version: encoder.version(),
            format,
            time_fields,
            generated_at: Utc::now(),
            degraded: encoder.is_degraded(self.source.security()),
        };
        self.stats.record_generation(started.elapsed());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationConfig, UuidEngine, MAX_BATCH_SIZE};
    use crate::clock::TimeSource;
    use crate::config::EngineConfig;
    use crate::error::UuidError;
    use crate::source::{FallbackRandomSource, HashStrategy, RandSource};
    use crate::{validate, Uuid, UuidFormat, Version};

    struct FixedTime(u64);

    impl TimeSource for FixedTime {
        fn unix_ts_ms(&mut self) -> u64 {
            self.0
        }
    }

    fn engine() -> UuidEngine {
        UuidEngine::new()
    }

    /// Generates every supported version
    #[test]
    fn generates_every_supported_version() {
        let mut e = engine();
        for version in [Version::V1, Version::V4] {
            let r = e.generate(&GenerationConfig::new(version)).unwrap();
            assert_eq!(r.version, version);
            let v = validate(&r.uuid);
            assert!(v.is_valid);
            assert_eq!(v.version, Some(version));
            assert_eq!(r.time_fields.is_some(), version == Version::V1);
        }
        for version in [Version::V3, Version::V5] {
            let config = GenerationConfig::new(version).with_name("url", "https://example.com/");
            let r = e.generate(&config).unwrap();
            assert_eq!(validate(&r.uuid).version, Some(version));
        }
        let nil = e.generate(&GenerationConfig::new(Version::Nil)).unwrap();
        assert_eq!(nil.uuid, Uuid::NIL.to_string());
        assert_eq!(e.stats().generated_count, 5);
    }

    /// Round-trips generated UUIDs through hyphenless text
    #[test]
    fn round_trips_generated_uuids_through_hyphenless_text() {
        let mut e = engine();
        let configs = [
            GenerationConfig::new(Version::V1),
            GenerationConfig::new(Version::V3).with_name("dns", "example.com"),
            GenerationConfig::new(Version::V4),
            GenerationConfig::new(Version::V5).with_name("url", "https://example.com/"),
        ];
        for config in &configs {
            for r in e.generate_batch(&config.clone().with_count(50)).unwrap().uuids {
                let bare = e.format_uuid(&r.uuid, UuidFormat::NoHyphens).unwrap();
                assert_eq!(bare.len(), 32);
                assert_eq!(e.format_uuid(&bare, UuidFormat::Standard).unwrap(), r.uuid);
            }
        }
        assert_eq!(e.stats().error_count, 0);
    }

    /// Renders records in requested format
    #[test]
    fn renders_records_in_requested_format() {
        let mut e = engine();
        let config = GenerationConfig::new(Version::V5)
            .with_name("dns", "example.com")
            .with_format(UuidFormat::Uppercase);
        let r = e.generate(&config).unwrap();
        assert_eq!(r.uuid, "0AFE21B6-D5EF-519E-8AC3-9E7AD18D6F73");
        assert_eq!(r.format, UuidFormat::Uppercase);
    }

    /// Produces unique batch
    #[test]
    fn produces_unique_batch() {
        use std::collections::HashSet;
        let mut e = engine();
        for version in [Version::V1, Version::V4] {
            let config = GenerationConfig::new(version).with_count(MAX_BATCH_SIZE);
            let batch = e.generate_batch(&config).unwrap();
            assert_eq!(batch.total_generated, MAX_BATCH_SIZE);
            let s: HashSet<&str> = batch.uuids.iter().map(|r| r.uuid.as_str()).collect();
            assert_eq!(s.len(), MAX_BATCH_SIZE);
        }
    }

    /// Orders version 1 batch by timestamp
    #[test]
    fn orders_version_1_batch_by_timestamp() {
        let mut e = UuidEngine::with_sources(
            FallbackRandomSource::new(),
            FixedTime(1_700_000_000_000),
            EngineConfig::default(),
        );
        let batch = e
            .generate_batch(&GenerationConfig::new(Version::V1).with_count(100))
            .unwrap();
        let mut prev = 0;
        for r in &batch.uuids {
            let fs = r.time_fields.unwrap();
            assert!(fs.timestamp > prev);
            prev = fs.timestamp;
        }
        let state = e.clock_state().unwrap();
        assert_eq!(state.last_timestamp, prev);
    }

    /// Clamps oversized batch
    #[test]
    fn clamps_oversized_batch() {
        let mut e = engine();
        let batch = e
            .generate_batch(&GenerationConfig::default().with_count(5_000))
            .unwrap();
        assert_eq!(batch.uuids.len(), MAX_BATCH_SIZE);
        assert_eq!(batch.total_generated, MAX_BATCH_SIZE);
    }

    /// Rejects empty batch and bad requests
    #[test]
    fn rejects_empty_batch_and_bad_requests() {
        let mut e = engine();
        assert!(matches!(
            e.generate_batch(&GenerationConfig::default().with_count(0)),
            Err(UuidError::InvalidCount)
        ));
        assert!(matches!(
            e.generate(&GenerationConfig::new(Version::V3)),
            Err(UuidError::MissingNamespace(Version::V3))
        ));
        assert!(matches!(
            e.generate_batch(&GenerationConfig::new(Version::V2).with_count(3)),
            Err(UuidError::UnsupportedVersion(_))
        ));
        let snap = e.stats();
        assert_eq!(snap.error_count, 3);
        assert_eq!(snap.generated_count, 0);
    }

    /// Counts validations
    #[test]
    fn counts_validations() {
        let mut e = engine();
        assert!(e.validate("550e8400-e29b-41d4-a716-446655440000").is_valid);
        assert!(!e.validate("nope").is_valid);
        let snap = e.stats();
        assert_eq!(snap.validated_count, 2);
        assert_eq!(snap.error_count, 1);

        e.reset_stats();
        assert_eq!(e.stats(), Default::default());
    }

    /// Reformats text between formats
    #[test]
    fn reformats_text_between_formats() {
        let mut e = engine();
        assert_eq!(
            e.format_uuid("{550E8400-E29B-41D4-A716-446655440000}", UuidFormat::NoHyphens)
                .unwrap(),
            "550e8400e29b41d4a716446655440000"
        );
        assert!(e.format_uuid("xyz", UuidFormat::Standard).is_err());
        assert_eq!(e.stats().error_count, 1);
    }

    /// Flags records from fallback randomness as degraded
    #[test]
    fn flags_records_from_fallback_randomness_as_degraded() {
        let rng = FallbackRandomSource::new();
        assert!(rng.is_degraded());
        let mut e = UuidEngine::with_sources(rng, FixedTime(1), EngineConfig::default());
        assert!(e.security().is_degraded());
        assert!(e.generate(&GenerationConfig::new(Version::V4)).unwrap().degraded);
        let v5 = GenerationConfig::new(Version::V5).with_name("dns", "a");
        assert!(!e.generate(&v5).unwrap().degraded);
        assert!(!e.generate(&GenerationConfig::new(Version::Nil)).unwrap().degraded);
    }

    /// Flags records from mixing hash as degraded
    #[test]
    fn flags_records_from_mixing_hash_as_degraded() {
        let config = EngineConfig::new(HashStrategy::Mixing, 0.5).unwrap();
        let mut e = UuidEngine::with_config(config);
        let v3 = GenerationConfig::new(Version::V3).with_name("oid", "1.2.3");
        assert!(e.generate(&v3).unwrap().degraded);
        assert!(!e.generate(&GenerationConfig::new(Version::V4)).unwrap().degraded);
    }

    /// Deserializes config with defaults
    #[test]
    fn deserializes_config_with_defaults() {
        let config: GenerationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GenerationConfig::default());

        let config: GenerationConfig = serde_json::from_str(
            r#"{"version":"v5","format":"no-hyphens","count":3,"namespace":"dns","name":"a"}"#,
        )
        .unwrap();
        assert_eq!(config.version, Version::V5);
        assert_eq!(config.format, UuidFormat::NoHyphens);
        assert_eq!(config.count, 3);
    }

    /// Serializes record as camel case
    #[test]
    fn serializes_record_as_camel_case() {
        let mut e = engine();
        let r = e.generate(&GenerationConfig::new(Version::V1)).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["version"], "v1");
        assert!(json["generatedAt"].is_string());
        assert!(json["clockSequence"].is_u64());
        assert!(json["timestamp"].is_u64());
    }
}
