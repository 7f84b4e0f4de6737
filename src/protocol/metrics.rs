
use std::sync::atomic::{AtomicU64, Ordering};

use super::PacketType;

/// Track codec metrics without external dependencies.
pub(crate) struct Metrics;

static ENCODED_PACKETS: AtomicU64 = AtomicU64::new(0);
static DECODED_PACKETS: AtomicU64 = AtomicU64::new(0);
static ENCODED_BYTES: AtomicU64 = AtomicU64::new(0);
static DECODED_BYTES: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

const TYPE_SLOTS: usize = 16;

struct PacketTypeCounters {
    encoded: [AtomicU64; TYPE_SLOTS],
    decoded: [AtomicU64; TYPE_SLOTS],
}

static PACKET_COUNTERS: PacketTypeCounters = PacketTypeCounters::new();

impl PacketTypeCounters {
    const fn new() -> Self {
        Self {
            encoded: [const { AtomicU64::new(0) }; TYPE_SLOTS],
            decoded: [const { AtomicU64::new(0) }; TYPE_SLOTS],
        }
    }

    fn increment(&self, direction: Direction, packet_type: PacketType) {
        let slot = usize::from(packet_type.as_nibble());
        let counters = match direction {
            Direction::Encoded => &self.encoded,
            Direction::Decoded => &self.decoded,
        };
        counters[slot].fetch_add(1, Ordering::Relaxed);
    }

    fn load_all(&self, direction: Direction) -> [u64; TYPE_SLOTS] {
        let counters = match direction {
            Direction::Encoded => &self.encoded,
            Direction::Decoded => &self.decoded,
        };
        std::array::from_fn(|slot| counters[slot].load(Ordering::Relaxed))
    }
}

/// Which way a packet passed through the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Produced by `encode`
    Encoded,
    /// Produced by `decode`
    Decoded,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_packet(direction: Direction, packet_type: PacketType, bytes: usize) {
        let bytes = u64::try_from(bytes).unwrap_or(u64::MAX);
        match direction {
            Direction::Encoded => {
                ENCODED_PACKETS.fetch_add(1, Ordering::Relaxed);
                ENCODED_BYTES.fetch_add(bytes, Ordering::Relaxed);
            }
            Direction::Decoded => {
                DECODED_PACKETS.fetch_add(1, Ordering::Relaxed);
                DECODED_BYTES.fetch_add(bytes, Ordering::Relaxed);
            }
        }
        PACKET_COUNTERS.increment(direction, packet_type);
    }

    #[inline]
    pub(crate) fn record_error() {
        ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            encoded_packets: ENCODED_PACKETS.load(Ordering::Relaxed),
            decoded_packets: DECODED_PACKETS.load(Ordering::Relaxed),
            encoded_bytes: ENCODED_BYTES.load(Ordering::Relaxed),
            decoded_bytes: DECODED_BYTES.load(Ordering::Relaxed),
            total_errors: ERROR_COUNT.load(Ordering::Relaxed),
            encoded_by_type: PACKET_COUNTERS.load_all(Direction::Encoded),
            decoded_by_type: PACKET_COUNTERS.load_all(Direction::Decoded),
        }
    }
}

/// Lightweight snapshot of the codec counters.
#[derive(Default, Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    /// Packets produced by `encode`
    pub encoded_packets: u64,
    /// Packets accepted by `decode`
    pub decoded_packets: u64,
    /// Bytes produced by `encode`
    pub encoded_bytes: u64,
    /// Bytes of packets accepted by `decode`
    pub decoded_bytes: u64,
    /// Failed encode or decode calls
    pub total_errors: u64,
    encoded_by_type: [u64; TYPE_SLOTS],
    decoded_by_type: [u64; TYPE_SLOTS],
}

impl MetricsSnapshot {
    /// Number of packets of `packet_type` seen in `direction` when the
    /// snapshot was taken.
    #[must_use]
    pub fn packets_of(&self, direction: Direction, packet_type: PacketType) -> u64 {
        let slot = usize::from(packet_type.as_nibble());
        match direction {
            Direction::Encoded => self.encoded_by_type[slot],
            Direction::Decoded => self.decoded_by_type[slot],
        }
    }

    /// Mean encoded packet size in bytes.
    #[must_use]
    pub fn avg_encoded_size(&self) -> Option<u64> {
        average(self.encoded_bytes, self.encoded_packets)
    }

    /// Mean decoded packet size in bytes.
    #[must_use]
    pub fn avg_decoded_size(&self) -> Option<u64> {
        average(self.decoded_bytes, self.decoded_packets)
    }
}

/// Current process-wide codec counters.
#[must_use]
pub fn metrics_snapshot() -> MetricsSnapshot {
    Metrics::totals()
}

fn average(total: u64, count: u64) -> Option<u64> {
    if count == 0 {
        return None;
    }
    Some(total / count)
}
