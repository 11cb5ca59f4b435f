//! RFC 4122 UUID generation, formatting and validation
//!
//! ```rust
//! use uuidforge::{generate_uuid, validate_uuid, GenerationConfig, UuidFormat, Version};
//!
//! let config = GenerationConfig::new(Version::V4).with_format(UuidFormat::Braces);
//! let record = generate_uuid(&config)?;
//! println!("{}", record.uuid); // e.g. "{2ca4b2ce-6c13-40d4-bccf-37d222820f6f}"
//!
//! let result = validate_uuid(&record.uuid);
//! assert!(result.is_valid);
//! assert_eq!(result.version, Some(Version::V4));
//! # Ok::<(), uuidforge::UuidError>(())
//! ```
//!
//! See [RFC 4122](https://www.rfc-editor.org/rfc/rfc4122).
//!
//! # Versions
//!
//! - Version 1 packs a 60-bit count of 100-nanosecond intervals since 1582-10-15, a 14-bit
//!   clock sequence and a 48-bit node id. The node id is random with the multicast bit set, as
//!   RFC 4122 section 4.5 allows. Consecutive version 1 UUIDs from one engine carry strictly
//!   increasing timestamps within each millisecond.
//! - Versions 3 and 5 hash a namespace UUID followed by a name. Version 3 uses SHA-1 and
//!   version 5 uses SHA-256, so version 3 values differ from the MD5-based ones RFC 4122
//!   describes.
//! - Version 4 fills 122 bits from a cryptographically secure generator.
//! - The nil UUID is all zeros.
//!
//! When the operating system random source is unavailable, the engine falls back to a
//! time-seeded generator and marks every record that depends on it as `degraded`.
//!
//! # Formats
//!
//! Every UUID can be rendered in the formats listed by [`UuidFormat`], and [`normalize`] turns
//! any of them back into the lowercase hyphenated form:
//!
//! ```rust
//! use uuidforge::{format, normalize, Uuid, UuidFormat};
//!
//! let uuid: Uuid = normalize("{550E8400-E29B-41D4-A716-446655440000}").parse()?;
//! assert_eq!(format(&uuid, UuidFormat::NoHyphens), "550e8400e29b41d4a716446655440000");
//! # Ok::<(), uuidforge::ParseError>(())
//! ```
//!
//! # Crate features
//!
//! Default features:
//!
//! - `global_gen`: enables the process-wide default engine behind [`generate_uuid`] and the
//!   other entry point functions, as well as the `uuidforge` command.
//!
//! Optional features:
//!
//! - `uuid`: enables conversion from/to [uuid]::Uuid.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{ParseError, Uuid, Variant, Version};

mod error;
pub use error::{UuidError, UuidResult};

pub mod clock;
pub use clock::{NodeId, TimeFields, TimestampClock};

pub mod source;
pub use source::{ByteSource, HashStrategy, RandomSource, Security};

pub mod config;
pub use config::EngineConfig;

pub mod encoder;

pub mod format;
pub use format::{detect, format, normalize, UuidFormat};

mod validate;
pub use validate::{validate, ValidationResult};

pub mod stats;
pub use stats::StatsSnapshot;

pub mod engine;
pub use engine::{BatchResult, GeneratedRecord, GenerationConfig, UuidEngine, MAX_BATCH_SIZE};

mod export;
pub use export::{export_uuids, ExportFormat};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{
    format_uuid, generate_batch, generate_uuid, reset_stats, stats, validate_uuid,
};
