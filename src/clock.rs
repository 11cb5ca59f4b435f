//! Timestamp, clock sequence and node state for version 1 UUIDs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::source::RandSource;

/// Milliseconds between the Gregorian reform (1582-10-15T00:00:00Z) and the Unix epoch.
pub const UUID_EPOCH_OFFSET_MS: u64 = 12_219_292_800_000;

/// Number of 100-nanosecond ticks per millisecond.
pub const TICKS_PER_MS: u64 = 10_000;

const MAX_CLOCK_SEQ: u16 = (1 << 14) - 1;

/// A trait that defines the minimum system clock interface for [`TimestampClock`].
pub trait TimeSource {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&mut self) -> u64;
}

/// [`TimeSource`] backed by [`std::time::SystemTime`].
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&mut self) -> u64 {
        use std::time;
        time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

/// A 48-bit node identifier.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct NodeId(pub [u8; 6]);

impl NodeId {
    /// Draws a random node id with the multicast bit set, marking it as not derived from a real
    /// IEEE 802 address.
    pub fn random(rng: &mut impl RandSource) -> Self {
        let mut bytes = [0u8; 6];
        rng.fill_bytes(&mut bytes);
        bytes[0] |= 0x01;
        Self(bytes)
    }

    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for NodeId {
    /// Formats the node as colon-separated lowercase hex octets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The time-based fields carried by a version 1 UUID.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFields {
    /// 60-bit count of 100-nanosecond ticks since 1582-10-15T00:00:00Z
    pub timestamp: u64,
    pub clock_sequence: u16,
    pub node: NodeId,
}

impl TimeFields {
    /// Converts the timestamp to a calendar date, truncated to milliseconds.
    ///
    /// Returns `None` for timestamps before the Unix epoch or beyond chrono's range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let unix_ms = (self.timestamp / TICKS_PER_MS).checked_sub(UUID_EPOCH_OFFSET_MS)?;
        DateTime::from_timestamp_millis(i64::try_from(unix_ms).ok()?)
    }
}

/// Mutable state of a running clock.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ClockState {
    /// Last timestamp handed out, in 100-nanosecond ticks
    pub last_timestamp: u64,
    pub clock_sequence: u16,
    pub node: NodeId,
}

impl ClockState {
    fn init(rng: &mut impl RandSource) -> Self {
        Self {
            last_timestamp: 0,
            clock_sequence: rng.next_u16() & MAX_CLOCK_SEQ,
            node: NodeId::random(rng),
        }
    }
}

/// Produces version 1 timestamps, clock sequences and the node id.
///
/// The clock is uninitialized until its first tick, which draws the node id and the initial
/// clock sequence. Within one millisecond consecutive ticks advance the timestamp by one
/// 100-nanosecond step, so up to 10,000 distinct timestamps are available per millisecond.
/// When the timestamp cannot advance (the system clock moved backwards, or the millisecond is
/// exhausted) the clock sequence is re-randomized as RFC 4122 section 4.1.5 prescribes.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TimestampClock<T> {
    state: Option<ClockState>,
    time: T,
}

impl<T: TimeSource> TimestampClock<T> {
    /// Creates an uninitialized clock.
    pub const fn new(time: T) -> Self {
        Self { state: None, time }
    }

    /// Returns the current state, or `None` before the first tick.
    pub fn state(&self) -> Option<&ClockState> {
        self.state.as_ref()
    }

    /// Advances the clock using the current time.
    pub fn tick(&mut self, rng: &mut impl RandSource) -> TimeFields {
        let unix_ts_ms = self.time.unix_ts_ms();
        self.tick_core(unix_ts_ms, rng)
    }

    /// Advances the clock to the given Unix timestamp in milliseconds.
    pub fn tick_core(&mut self, unix_ts_ms: u64, rng: &mut impl RandSource) -> TimeFields {
        let timestamp = (unix_ts_ms + UUID_EPOCH_OFFSET_MS) * TICKS_PER_MS;
        let state = self.state.get_or_insert_with(|| ClockState::init(&mut *rng));

        if timestamp > state.last_timestamp {
            state.last_timestamp = timestamp;
        } else if timestamp / TICKS_PER_MS == state.last_timestamp / TICKS_PER_MS
            && state.last_timestamp % TICKS_PER_MS < TICKS_PER_MS - 1
        {
            state.last_timestamp += 1;
        } else {
            state.clock_sequence = rng.next_u16() & MAX_CLOCK_SEQ;
            state.last_timestamp = timestamp;
            tracing::trace!(
                clock_sequence = state.clock_sequence,
                "timestamp did not advance; clock sequence re-randomized"
            );
        }

        TimeFields {
            timestamp: state.last_timestamp,
            clock_sequence: state.clock_sequence,
            node: state.node,
        }
    }
}
