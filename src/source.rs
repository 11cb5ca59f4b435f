//! Random bytes and digests consumed by the encoders

use std::{fmt, str};

use rand::rngs::{adapter::ReseedingRng, OsRng};
use rand::{RngCore, SeedableRng};
use rand_chacha::{ChaCha12Core, ChaCha8Rng};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::UuidError;

/// A trait that defines the minimum random number generator interface for the encoders.
pub trait RandSource {
    /// Fills `dest` with random data.
    fn fill_bytes(&mut self, dest: &mut [u8]);

    /// Returns the next random `u16`.
    fn next_u16(&mut self) -> u16 {
        let mut bytes = [0u8; 2];
        self.fill_bytes(&mut bytes);
        u16::from_be_bytes(bytes)
    }

    /// Returns true if the source is not cryptographically secure.
    fn is_degraded(&self) -> bool {
        false
    }
}

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
}

/// ChaCha12 reseeded from the operating system, the strategy [`rand::rngs::ThreadRng`] uses.
pub struct SecureRandomSource(ReseedingRng<ChaCha12Core, OsRng>);

impl SecureRandomSource {
    /// Seeds a new generator from the operating system, failing if it cannot provide entropy.
    pub fn new() -> Result<Self, rand::Error> {
        let core = ChaCha12Core::from_rng(OsRng)?;
        Ok(Self(ReseedingRng::new(core, 1024 * 64, OsRng)))
    }
}

impl RandSource for SecureRandomSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
}

impl fmt::Debug for SecureRandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureRandomSource")
    }
}

/// ChaCha8 seeded from the wall clock and the process id.
///
/// Predictable by anyone who can guess the seed; used only when the operating system offers no
/// entropy.
pub struct FallbackRandomSource(ChaCha8Rng);

impl FallbackRandomSource {
    pub fn new() -> Self {
        use std::time;
        let nanos = time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);
        let seed = nanos ^ (u64::from(std::process::id()) << 32);
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for FallbackRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandSource for FallbackRandomSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn is_degraded(&self) -> bool {
        true
    }
}

impl fmt::Debug for FallbackRandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FallbackRandomSource")
    }
}

/// The random number generator selected once at startup.
#[derive(Debug)]
pub enum RandomSource {
    Secure(SecureRandomSource),
    Fallback(FallbackRandomSource),
}

impl RandomSource {
    /// Probes the operating system entropy source and picks the secure generator if it works.
    pub fn detect() -> Self {
        match SecureRandomSource::new() {
            Ok(rng) => Self::Secure(rng),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "secure random number generator unavailable; using time-seeded fallback"
                );
                Self::Fallback(FallbackRandomSource::new())
            }
        }
    }
}

impl RandSource for RandomSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            Self::Secure(rng) => rng.fill_bytes(dest),
            Self::Fallback(rng) => rng.fill_bytes(dest),
        }
    }

    fn is_degraded(&self) -> bool {
        match self {
            Self::Secure(rng) => rng.is_degraded(),
            Self::Fallback(rng) => rng.is_degraded(),
        }
    }
}

/// Digest families used by the name-based encoders.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Returns the digest length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }
}

/// How [`ByteSource::keyed_hash`] computes digests.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashStrategy {
    /// SHA-1 / SHA-256 from the RustCrypto crates
    #[default]
    Digest,
    /// A deterministic but non-cryptographic mixing function; name-based UUIDs produced with it
    /// do not match those of any other implementation
    Mixing,
}

impl HashStrategy {
    /// Hashes `data`, returning as many bytes as `algorithm` would.
    pub fn hash(self, algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
        match (self, algorithm) {
            (Self::Digest, HashAlgorithm::Sha1) => Sha1::digest(data).to_vec(),
            (Self::Digest, HashAlgorithm::Sha256) => Sha256::digest(data).to_vec(),
            (Self::Mixing, _) => mix(data, algorithm.output_len()),
        }
    }
}

impl str::FromStr for HashStrategy {
    type Err = UuidError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        match src.trim().to_ascii_lowercase().as_str() {
            "digest" => Ok(Self::Digest),
            "mixing" => Ok(Self::Mixing),
            _ => Err(UuidError::UnsupportedHashStrategy(src.to_owned())),
        }
    }
}

/// Multiplicative string hash run once per 32-bit output lane, each lane with its own seed.
fn mix(data: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 3);
    let mut lane = 0u32;
    while out.len() < len {
        let mut h = 0x811c_9dc5 ^ lane.wrapping_mul(0x9e37_79b9);
        for &b in data {
            h = (h << 5).wrapping_sub(h).wrapping_add(u32::from(b));
        }
        h ^= h >> 16;
        h = h.wrapping_mul(0x85eb_ca6b);
        h ^= h >> 13;
        out.extend_from_slice(&h.to_be_bytes());
        lane += 1;
    }
    out.truncate(len);
    out
}

/// Strength of one of the primitives behind a [`ByteSource`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strength {
    Strong,
    Weak,
}

/// Reports whether the engine is running on fallback primitives.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub struct Security {
    pub randomness: Strength,
    pub hashing: Strength,
}

impl Security {
    pub fn is_degraded(&self) -> bool {
        self.randomness == Strength::Weak || self.hashing == Strength::Weak
    }
}

/// Supplies random bytes and digests to the encoders.
#[derive(Debug)]
pub struct ByteSource<R> {
    rng: R,
    hashing: HashStrategy,
}

impl<R: RandSource> ByteSource<R> {
    pub fn new(rng: R, hashing: HashStrategy) -> Self {
        if hashing == HashStrategy::Mixing {
            tracing::warn!("name-based UUIDs will use a non-cryptographic mixing function");
        }
        Self { rng, hashing }
    }

    /// Returns `n` random bytes.
    pub fn random_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; n];
        self.rng.fill_bytes(&mut bytes);
        bytes
    }

    /// Computes a digest of `data`. The same input and algorithm always yield the same output.
    pub fn keyed_hash(&self, algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
        self.hashing.hash(algorithm, data)
    }

    pub fn security(&self) -> Security {
        Security {
            randomness: if self.rng.is_degraded() {
                Strength::Weak
            } else {
                Strength::Strong
            },
            hashing: match self.hashing {
                HashStrategy::Digest => Strength::Strong,
                HashStrategy::Mixing => Strength::Weak,
            },
        }
    }
}

impl<R: RandSource> RandSource for ByteSource<R> {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn is_degraded(&self) -> bool {
        self.rng.is_degraded()
    }
}
