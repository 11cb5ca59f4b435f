//! Per-version UUID encoders

use crate::clock::{TimeFields, TimeSource, TimestampClock};
use crate::engine::GenerationConfig;
use crate::error::{UuidError, UuidResult};
use crate::format;
use crate::source::{ByteSource, HashAlgorithm, RandSource, Security, Strength};
use crate::{Uuid, Version};

/// A validated generation request, one variant per supported version.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Encoder<'a> {
    /// Time-based
    V1,
    /// Name-based; `version` is either [`Version::V3`] or [`Version::V5`]
    NameBased {
        version: Version,
        namespace: Uuid,
        name: &'a str,
    },
    /// Random
    V4,
    Nil,
}

/// Output of [`Encoder::encode`].
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Encoded {
    pub uuid: Uuid,
    /// Populated for version 1 UUIDs only
    pub time_fields: Option<TimeFields>,
}

impl<'a> Encoder<'a> {
    /// Selects the encoder for `config`, checking the inputs it needs.
    pub fn from_config(config: &'a GenerationConfig) -> UuidResult<Self> {
        match config.version {
            Version::V1 => Ok(Self::V1),
            Version::V4 => Ok(Self::V4),
            Version::Nil => Ok(Self::Nil),
            version @ (Version::V3 | Version::V5) => {
                let namespace = config
                    .namespace
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .ok_or(UuidError::MissingNamespace(version))?;
                let name = config
                    .name
                    .as_deref()
                    .filter(|e| !e.is_empty())
                    .ok_or(UuidError::MissingName(version))?;
                Ok(Self::NameBased {
                    version,
                    namespace: parse_namespace(namespace)?,
                    name,
                })
            }
            Version::V2 => Err(UuidError::UnsupportedVersion(Version::V2.to_string())),
        }
    }

    pub fn version(&self) -> Version {
        match self {
            Self::V1 => Version::V1,
            Self::NameBased { version, .. } => *version,
            Self::V4 => Version::V4,
            Self::Nil => Version::Nil,
        }
    }

    /// Returns true if this encoder depends on a primitive that `security` reports as weak.
    pub fn is_degraded(&self, security: Security) -> bool {
        match self {
            Self::V1 | Self::V4 => security.randomness == Strength::Weak,
            Self::NameBased { .. } => security.hashing == Strength::Weak,
            Self::Nil => false,
        }
    }

    /// Produces one UUID.
    pub fn encode<R: RandSource, T: TimeSource>(
        &self,
        source: &mut ByteSource<R>,
        clock: &mut TimestampClock<T>,
    ) -> Encoded {
        match self {
            Self::V1 => {
                let fs = clock.tick(source);
                Encoded {
                    uuid: Uuid::from_fields_v1(fs.timestamp, fs.clock_sequence, fs.node.0),
                    time_fields: Some(fs),
                }
            }
            Self::NameBased {
                version,
                namespace,
                name,
            } => {
                let mut data = Vec::with_capacity(16 + name.len());
                data.extend_from_slice(namespace.as_bytes());
                data.extend_from_slice(name.as_bytes());
                let digest = source.keyed_hash(hash_algorithm(*version), &data);
                Encoded {
                    uuid: Uuid::from_digest(version.nibble(), &digest),
                    time_fields: None,
                }
            }
            Self::V4 => {
                let mut bytes = [0u8; 16];
                source.fill_bytes(&mut bytes);
                Encoded {
                    uuid: Uuid::from_random_bytes(bytes),
                    time_fields: None,
                }
            }
            Self::Nil => Encoded {
                uuid: Uuid::NIL,
                time_fields: None,
            },
        }
    }
}

/// v3 hashes with SHA-1 and v5 with SHA-256.
const fn hash_algorithm(version: Version) -> HashAlgorithm {
    match version {
        Version::V5 => HashAlgorithm::Sha256,
        _ => HashAlgorithm::Sha1,
    }
}

/// Parses a namespace given as UUID text in any supported format, or as one of the well-known
/// names `dns`, `url`, `oid` and `x500`.
pub fn parse_namespace(text: &str) -> UuidResult<Uuid> {
    match text.trim().to_ascii_lowercase().as_str() {
        "dns" => Ok(Uuid::NAMESPACE_DNS),
        "url" => Ok(Uuid::NAMESPACE_URL),
        "oid" => Ok(Uuid::NAMESPACE_OID),
        "x500" => Ok(Uuid::NAMESPACE_X500),
        _ => format::normalize(text)
            .parse()
            .map_err(|_| UuidError::InvalidNamespace(text.to_owned())),
    }
}
