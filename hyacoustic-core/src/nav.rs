//! Reads navigation fixes off a `Store` channel, adapting it to the
//! [`NavSource`] the quality estimator consumes.
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-nav-data.c`: a
//! navigation parameter (position, heading, depth, …) is read by index as a
//! `(time, value)` pair through the same store interface an acoustic
//! channel uses, not a separate navigation subsystem. Navigation
//! *smoothing* stays out of scope; this is a thin, one-value-per-index read.

use crate::quality::NavSource;
use hyacoustic_dsp::decode_nav_value;
use hyacoustic_model::{ChannelHandle, Error, FindStatus, Result, Store};
use std::sync::Arc;

/// One navigation channel opened through a [`Store`].
pub struct StoreNavSource {
    store: Arc<dyn Store>,
    handle: ChannelHandle,
}

impl StoreNavSource {
    pub fn open(store: Arc<dyn Store>, project: &str, track: &str, channel_name: &str) -> Result<Self> {
        let handle = store
            .open_channel(project, track, channel_name)
            .map_err(|_| Error::ChannelNotFound(channel_name.to_string()))?;

        if store.range(handle)?.is_none() {
            store.close(handle);
            return Err(Error::Empty);
        }

        Ok(StoreNavSource { store, handle })
    }

    /// The decoded scalar value at `index`, or `None` if there is no
    /// sample there.
    pub fn value_at(&self, index: u32) -> Result<Option<f64>> {
        match self.store.read(self.handle, index)? {
            Some((bytes, _)) => decode_nav_value(&bytes).map(Some).map_err(|_| Error::CorruptData),
            None => Ok(None),
        }
    }
}

impl NavSource for StoreNavSource {
    fn find(&self, time_us: i64) -> Result<FindStatus> {
        self.store.find(self.handle, time_us)
    }

    fn time_at(&self, index: u32) -> Result<Option<i64>> {
        self.store.data_time(self.handle, index)
    }
}

impl Drop for StoreNavSource {
    fn drop(&mut self) {
        self.store.close(self.handle);
    }
}
