//! An in-memory [`Store`] and [`Cache`] implementation for tests and
//! examples. Not part of the read-path contract itself — a real deployment
//! backs these traits with a persisted, log-structured channel database;
//! see `hyacoustic_model::store` for the contract those stores must satisfy.

use hyacoustic_model::{ChannelHandle, Error, FindStatus, ParamHandle, ParamValue, Result, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Channel {
    entries: Vec<(Vec<u8>, i64)>,
    params: HashMap<String, ParamValue>,
    writable: bool,
}

#[derive(Default)]
struct Inner {
    channels: HashMap<(String, String, String), Channel>,
    next_handle: u64,
    handle_keys: HashMap<u64, (String, String, String)>,
    cache: HashMap<(String, String), (Vec<u8>, Vec<u8>)>,
}

/// An in-memory channel store and result cache, keyed by `(project, track,
/// channel_name)`. Construct with [`MemStore::new`], populate with
/// [`MemStore::create_channel`] and [`MemStore::append`], then hand an
/// `Arc<MemStore>` to one or more readers.
pub struct MemStore {
    uri: String,
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::with_uri("memstore://local")
    }

    pub fn with_uri(uri: impl Into<String>) -> Self {
        MemStore { uri: uri.into(), inner: Mutex::new(Inner::default()) }
    }

    /// Declares a channel with the given parameter set, open for writing.
    pub fn create_channel(
        &self,
        project: &str,
        track: &str,
        name: &str,
        params: HashMap<String, ParamValue>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.channels.insert(
            (project.to_string(), track.to_string(), name.to_string()),
            Channel { entries: Vec::new(), params, writable: true },
        );
    }

    /// Appends one block of raw bytes at `time_us`. Entries must be appended
    /// in non-decreasing time order; this is a test fixture, not a general
    /// store, and does not re-sort.
    pub fn append(&self, project: &str, track: &str, name: &str, bytes: Vec<u8>, time_us: i64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(channel) = inner.channels.get_mut(&(project.to_string(), track.to_string(), name.to_string())) {
            channel.entries.push((bytes, time_us));
        }
    }

    /// Marks a channel closed to further writes, as a producer would on
    /// finishing a track.
    pub fn close_for_writing(&self, project: &str, track: &str, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(channel) = inner.channels.get_mut(&(project.to_string(), track.to_string(), name.to_string())) {
            channel.writable = false;
        }
    }

    fn key_for(&self, handle: ChannelHandle) -> Result<(String, String, String)> {
        let inner = self.inner.lock().unwrap();
        inner
            .handle_keys
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| Error::Store(StoreError::Io("unknown channel handle".into())))
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl hyacoustic_model::Store for MemStore {
    fn open_channel(&self, project: &str, track: &str, channel_name: &str) -> Result<ChannelHandle> {
        let mut inner = self.inner.lock().unwrap();
        let key = (project.to_string(), track.to_string(), channel_name.to_string());
        if !inner.channels.contains_key(&key) {
            return Err(Error::Store(StoreError::TrackNotFound(channel_name.to_string())));
        }
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.handle_keys.insert(handle, key);
        Ok(ChannelHandle(handle))
    }

    fn read(&self, handle: ChannelHandle, index: u32) -> Result<Option<(Vec<u8>, i64)>> {
        let key = self.key_for(handle)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.channels.get(&key).and_then(|c| c.entries.get(index as usize).cloned()))
    }

    fn data_size(&self, handle: ChannelHandle, index: u32) -> Result<Option<usize>> {
        Ok(self.read(handle, index)?.map(|(bytes, _)| bytes.len()))
    }

    fn data_time(&self, handle: ChannelHandle, index: u32) -> Result<Option<i64>> {
        Ok(self.read(handle, index)?.map(|(_, time)| time))
    }

    fn range(&self, handle: ChannelHandle) -> Result<Option<(u32, u32)>> {
        let key = self.key_for(handle)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .channels
            .get(&key)
            .filter(|c| !c.entries.is_empty())
            .map(|c| (0u32, c.entries.len() as u32 - 1)))
    }

    fn find(&self, handle: ChannelHandle, time_us: i64) -> Result<FindStatus> {
        let key = self.key_for(handle)?;
        let inner = self.inner.lock().unwrap();
        let Some(channel) = inner.channels.get(&key) else {
            return Ok(FindStatus::Less);
        };
        for (i, (_, t)) in channel.entries.iter().enumerate() {
            if *t == time_us {
                return Ok(FindStatus::Exact(i as u32));
            }
            if *t > time_us {
                return if i == 0 {
                    Ok(FindStatus::Less)
                } else {
                    Ok(FindStatus::Between(i as u32 - 1, i as u32))
                };
            }
        }
        Ok(FindStatus::Greater)
    }

    fn mod_count(&self, handle: ChannelHandle) -> Result<u64> {
        let key = self.key_for(handle)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.channels.get(&key).map(|c| c.entries.len() as u64).unwrap_or(0))
    }

    fn writable(&self, handle: ChannelHandle) -> Result<bool> {
        let key = self.key_for(handle)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.channels.get(&key).map(|c| c.writable).unwrap_or(false))
    }

    fn param_open(&self, handle: ChannelHandle) -> Result<ParamHandle> {
        Ok(ParamHandle(handle.0))
    }

    fn param_get(&self, handle: ParamHandle, keys: &[&str]) -> Result<HashMap<String, ParamValue>> {
        let inner = self.inner.lock().unwrap();
        let key = inner
            .handle_keys
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| Error::Store(StoreError::Io("unknown parameter handle".into())))?;
        let channel = inner
            .channels
            .get(&key)
            .ok_or_else(|| Error::Store(StoreError::Io("unknown parameter handle".into())))?;
        Ok(keys
            .iter()
            .filter_map(|k| channel.params.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn close(&self, handle: ChannelHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.handle_keys.remove(&handle.0);
    }

    fn uri(&self) -> String {
        self.uri.clone()
    }
}

impl hyacoustic_model::Cache for MemStore {
    fn set(&self, key: &str, detail: &str, buf: &[u8]) -> Result<()> {
        self.set2(key, detail, &[], buf)
    }

    fn set2(&self, key: &str, detail: &str, header: &[u8], payload: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.cache.insert((key.to_string(), detail.to_string()), (header.to_vec(), payload.to_vec()));
        Ok(())
    }

    fn get(&self, key: &str, detail: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get2(key, detail, 0)?.map(|(_, payload)| payload))
    }

    fn get2(&self, key: &str, detail: &str, header_len: usize) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cache
            .get(&(key.to_string(), detail.to_string()))
            .filter(|(header, _)| header.len() == header_len)
            .cloned())
    }
}
