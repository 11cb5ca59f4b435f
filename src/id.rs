use std::{fmt, str};

use fstr::FStr;
use serde::{Deserialize, Serialize};

use crate::error::UuidError;

/// Represents a Universally Unique IDentifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Name space for fully-qualified domain names (6ba7b810-9dad-11d1-80b4-00c04fd430c8)
    pub const NAMESPACE_DNS: Self = Self([
        0x6b, 0xa7, 0xb8, 0x10, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30,
        0xc8,
    ]);

    /// Name space for URLs (6ba7b811-9dad-11d1-80b4-00c04fd430c8)
    pub const NAMESPACE_URL: Self = Self([
        0x6b, 0xa7, 0xb8, 0x11, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30,
        0xc8,
    ]);

    /// Name space for ISO OIDs (6ba7b812-9dad-11d1-80b4-00c04fd430c8)
    pub const NAMESPACE_OID: Self = Self([
        0x6b, 0xa7, 0xb8, 0x12, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30,
        0xc8,
    ]);

    /// Name space for X.500 DNs (6ba7b814-9dad-11d1-80b4-00c04fd430c8)
    pub const NAMESPACE_X500: Self = Self([
        0x6b, 0xa7, 0xb8, 0x14, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30,
        0xc8,
    ]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Creates a UUID byte array from UUIDv1 field values.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` is not a 60-bit integer or `clock_seq` is not a 14-bit integer.
    pub const fn from_fields_v1(timestamp: u64, clock_seq: u16, node: [u8; 6]) -> Self {
        if timestamp >= 1 << 60 || clock_seq >= 1 << 14 {
            panic!("invalid field value");
        }

        Self([
            (timestamp >> 24) as u8,
            (timestamp >> 16) as u8,
            (timestamp >> 8) as u8,
            timestamp as u8,
            (timestamp >> 40) as u8,
            (timestamp >> 32) as u8,
            0x10 | (timestamp >> 56) as u8,
            (timestamp >> 48) as u8,
            0x80 | (clock_seq >> 8) as u8,
            clock_seq as u8,
            node[0],
            node[1],
            node[2],
            node[3],
            node[4],
            node[5],
        ])
    }

    /// Creates a name-based UUID from the leading 16 bytes of a digest, overwriting the version
    /// nibble with `version` and the variant bits with `10`.
    ///
    /// # Panics
    ///
    /// Panics if `digest` is shorter than 16 bytes or `version` does not fit in four bits.
    pub fn from_digest(version: u8, digest: &[u8]) -> Self {
        assert!(version < 16, "`version` must be a 4-bit integer");
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        bytes[6] = (version << 4) | (bytes[6] & 0x0f);
        bytes[8] = 0x80 | (bytes[8] & 0x3f);
        Self(bytes)
    }

    /// Creates a UUIDv4 from 16 random bytes.
    pub const fn from_random_bytes(mut bytes: [u8; 16]) -> Self {
        bytes[6] = 0x40 | (bytes[6] >> 4);
        bytes[8] = 0x80 | (bytes[8] >> 2);
        Self(bytes)
    }

    /// Returns the `(timestamp, clock_seq, node)` triple laid out in the UUIDv1 field positions.
    ///
    /// The result is meaningful only if the UUID is a version 1 UUID; the version and variant
    /// bits are masked out regardless.
    pub const fn fields_v1(&self) -> (u64, u16, [u8; 6]) {
        let b = &self.0;
        let timestamp = ((b[6] as u64 & 0x0f) << 56)
            | ((b[7] as u64) << 48)
            | ((b[4] as u64) << 40)
            | ((b[5] as u64) << 32)
            | ((b[0] as u64) << 24)
            | ((b[1] as u64) << 16)
            | ((b[2] as u64) << 8)
            | b[3] as u64;
        let clock_seq = ((b[8] as u16 & 0x3f) << 8) | b[9] as u16;
        (
            timestamp,
            clock_seq,
            [b[10], b[11], b[12], b[13], b[14], b[15]],
        )
    }

    /// Returns the version field, or `None` if the nibble does not name a known version.
    ///
    /// The Nil UUID reports [`Version::Nil`].
    pub fn version(&self) -> Option<Version> {
        if *self == Self::NIL {
            return Some(Version::Nil);
        }
        Version::from_nibble(self.0[6] >> 4)
    }

    /// Returns the variant field.
    pub const fn variant(&self) -> Variant {
        Variant::from_nibble(self.0[8] >> 4)
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuidforge::Uuid;
    ///
    /// let x = "550e8400-e29b-41d4-a716-446655440000".parse::<Uuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "550e8400-e29b-41d4-a716-446655440000");
    /// # Ok::<(), uuidforge::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [0u8; 36];
        let mut buf_iter = buffer.iter_mut();
        for (i, e) in self.0.iter().enumerate() {
            let e = *e as usize;
            if let Some(d) = buf_iter.next() {
                *d = DIGITS[e >> 4];
            }
            if let Some(d) = buf_iter.next() {
                *d = DIGITS[e & 15];
            }
            if i == 3 || i == 5 || i == 7 || i == 9 {
                if let Some(d) = buf_iter.next() {
                    *d = b'-';
                }
            }
        }
        match FStr::from_inner(buffer) {
            Ok(s) => s,
            Err(_) => unreachable!("buffer holds ASCII hex digits and hyphens only"),
        }
    }
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        let mut dst = [0u8; 16];
        let mut iter = src.chars();
        for (i, e) in dst.iter_mut().enumerate() {
            let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            *e = (hi << 4) | lo;
            if (i == 3 || i == 5 || i == 7 || i == 9) && iter.next().ok_or(ERR)? != '-' {
                return Err(ERR);
            }
        }
        if iter.next().is_none() {
            Ok(Self(dst))
        } else {
            Err(ERR)
        }
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Error parsing an invalid string representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid string representation")
    }
}

impl std::error::Error for ParseError {}

/// UUID versions known to this crate.
///
/// [`Version::V2`] (DCE security) is recognized when validating but cannot be generated.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Version {
    #[serde(rename = "nil")]
    Nil,
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2")]
    V2,
    #[serde(rename = "v3")]
    V3,
    #[serde(rename = "v4")]
    V4,
    #[serde(rename = "v5")]
    V5,
}

impl Version {
    /// Maps a version nibble to a version; `0` is not a version on its own.
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            4 => Some(Self::V4),
            5 => Some(Self::V5),
            _ => None,
        }
    }

    /// Returns the version nibble; `0` for Nil.
    pub const fn nibble(self) -> u8 {
        match self {
            Self::Nil => 0,
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
            Self::V5 => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
            Self::V4 => "v4",
            Self::V5 => "v5",
        }
    }

    /// Returns true for versions that derive the UUID from a namespace and a name.
    pub const fn is_name_based(self) -> bool {
        matches!(self, Self::V3 | Self::V5)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl str::FromStr for Version {
    type Err = UuidError;

    /// Accepts `v1`, `1`, `V1`, `nil`, and so on.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let lower = src.trim().to_ascii_lowercase();
        let digits = lower.strip_prefix('v').unwrap_or(&lower);
        match digits {
            "nil" => Ok(Self::Nil),
            "1" => Ok(Self::V1),
            "2" => Ok(Self::V2),
            "3" => Ok(Self::V3),
            "4" => Ok(Self::V4),
            "5" => Ok(Self::V5),
            _ => Err(UuidError::UnsupportedVersion(src.to_owned())),
        }
    }
}

/// The variant field, determined by the leading bits of byte 8.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// `0xxx`: reserved for NCS backward compatibility
    Ncs,
    /// `10xx`: the layout this crate generates
    Rfc4122,
    /// `110x`: reserved for Microsoft backward compatibility
    Microsoft,
    /// `111x`: reserved for future definition
    Future,
}

impl Variant {
    /// Maps the high nibble of byte 8 to a variant.
    pub const fn from_nibble(nibble: u8) -> Self {
        if nibble & 0b1000 == 0 {
            Self::Ncs
        } else if nibble & 0b0100 == 0 {
            Self::Rfc4122
        } else if nibble & 0b0010 == 0 {
            Self::Microsoft
        } else {
            Self::Future
        }
    }
}

mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }

}
