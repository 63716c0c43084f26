//! The store facade: a read-only projection of the persistent channel store.
//!
//! `hyacoustic-model` only defines the contract. An actual backing store
//! (the persisted, log-structured channel database) is an external
//! collaborator; see `hyacoustic::memstore` for an in-memory implementation
//! used by tests and examples.

use crate::result::Result;
use std::collections::HashMap;

/// Opaque handle to an open channel. Bound to one logical channel for the
/// lifetime of the reader that opened it; the store closes it on drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub u64);

/// Opaque handle to an open channel's parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamHandle(pub u64);

/// The four-way result of a time-indexed lookup within a channel.
///
/// All consumers depend on this split: an exact hit, a position strictly
/// between two recorded indices, before all data, or after all data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindStatus {
    /// An entry with exactly this timestamp exists at this index.
    Exact(u32),
    /// No entry has this exact timestamp; it falls between these two
    /// indices (left < right, left's time < target < right's time).
    Between(u32, u32),
    /// The timestamp precedes all recorded data.
    Less,
    /// The timestamp follows all recorded data.
    Greater,
}

/// A scalar parameter value as read from a channel's parameter set.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    I64(i64),
    F64(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::F64(v) => Some(*v),
            ParamValue::I64(v) => Some(*v as f64),
            ParamValue::Str(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::I64(v) => Some(*v),
            ParamValue::F64(v) => Some(*v as i64),
            ParamValue::Str(_) => None,
        }
    }
}

/// Read-only projection of the persistent channel store consumed by the
/// acoustic read path.
///
/// Implementations are expected to be reentrant for read operations; the
/// core assumes `read`/`range`/`find`/`mod_count`/`param_get` may be called
/// freely from any thread holding a reference, though an individual
/// `AcousticReader` built atop a `Store` is itself single-threaded (see
/// `hyacoustic-core`).
pub trait Store: Send + Sync {
    /// Opens a channel by (project, track, channel name), yielding a handle.
    fn open_channel(&self, project: &str, track: &str, channel_name: &str) -> Result<ChannelHandle>;

    /// Reads raw bytes and the timestamp (microseconds) at `index`.
    /// Returns `Ok(None)` if there is no data at that index.
    fn read(&self, handle: ChannelHandle, index: u32) -> Result<Option<(Vec<u8>, i64)>>;

    /// Returns the byte size of the data at `index`, without reading it.
    fn data_size(&self, handle: ChannelHandle, index: u32) -> Result<Option<usize>>;

    /// Returns the timestamp (microseconds) at `index`.
    fn data_time(&self, handle: ChannelHandle, index: u32) -> Result<Option<i64>>;

    /// Returns the `(first, last)` index range recorded in the channel, or
    /// `None` if the channel is empty.
    fn range(&self, handle: ChannelHandle) -> Result<Option<(u32, u32)>>;

    /// Finds the index (or surrounding indices) closest to `time_us`.
    fn find(&self, handle: ChannelHandle, time_us: i64) -> Result<FindStatus>;

    /// An opaque, monotonically non-decreasing counter. Any change signals
    /// that the underlying dataset may have grown.
    fn mod_count(&self, handle: ChannelHandle) -> Result<u64>;

    /// Whether the channel's producer may still append to it.
    fn writable(&self, handle: ChannelHandle) -> Result<bool>;

    /// Opens the channel's parameter set.
    fn param_open(&self, handle: ChannelHandle) -> Result<ParamHandle>;

    /// Reads the requested parameter keys from an open parameter handle.
    fn param_get(&self, handle: ParamHandle, keys: &[&str]) -> Result<HashMap<String, ParamValue>>;

    /// Closes a channel handle. Safe to call more than once.
    fn close(&self, handle: ChannelHandle);

    /// Returns a stable URI identifying this store instance, used as the
    /// leading component of cache keys.
    fn uri(&self) -> String;
}

/// The cache interface consumed by the read path: a content-addressed,
/// shared, advisory store for computed results.
///
/// Entries are immutable once written under a given key; a reader never
/// rewrites an existing key with different content semantics. Cache read
/// failures are treated as misses; cache write failures are logged and
/// ignored (the cache is advisory, never a source of truth).
pub trait Cache: Send + Sync {
    /// Stores `buf` under `key`/`detail`.
    fn set(&self, key: &str, detail: &str, buf: &[u8]) -> Result<()>;

    /// Stores a header/payload pair under `key`/`detail`.
    fn set2(&self, key: &str, detail: &str, header: &[u8], payload: &[u8]) -> Result<()>;

    /// Looks up `key`/`detail`. Returns `None` on a miss.
    fn get(&self, key: &str, detail: &str) -> Result<Option<Vec<u8>>>;

    /// Looks up a header/payload pair under `key`/`detail`. Returns `None` on
    /// a miss, or if the stored header length does not match `header_len`.
    fn get2(&self, key: &str, detail: &str, header_len: usize) -> Result<Option<(Vec<u8>, Vec<u8>)>>;
}
