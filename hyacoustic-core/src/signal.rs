//! The signal registry: tracks the ordered sequence of emitted-signal images
//! for a data channel and resolves "which image applies to data index *i*".
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-acoustic-data.c`
//! (`hyscan_acoustic_data_load_signals` / `hyscan_acoustic_data_find_signal`).
//! Append-only: once an image is in the registry its bytes and matched-filter
//! state are never mutated.

use hyacoustic_dsp::MatchedFilter;
use hyacoustic_model::{ChannelHandle, Complex, FindStatus, Result, Store};
use std::sync::Arc;

/// One emitted-signal image, stamped with the data-channel index from which
/// it becomes active.
#[derive(Debug, Clone)]
pub struct SignalImage {
    pub activation_time_us: i64,
    pub activation_index: u32,
    pub samples: Vec<Complex>,
    pub filter: MatchedFilter,
}

/// Ordered, append-only sequence of [`SignalImage`]s for one data channel.
///
/// Owns its signal-channel handle and closes it on drop (or earlier, once
/// the producer marks the channel closed during `refresh`).
pub struct SignalRegistry {
    store: Arc<dyn Store>,
    handle: Option<ChannelHandle>,
    images: Vec<SignalImage>,
    last_loaded: Option<u32>,
    mod_count: u64,
    closed: bool,
}

impl SignalRegistry {
    pub fn new(store: Arc<dyn Store>, handle: ChannelHandle) -> Self {
        SignalRegistry {
            store,
            handle: Some(handle),
            images: Vec::new(),
            last_loaded: None,
            mod_count: 0,
            closed: false,
        }
    }

    /// An empty registry with no backing signal channel: convolution is
    /// permanently off, `refresh` and `find` are no-ops.
    pub fn none(store: Arc<dyn Store>) -> Self {
        SignalRegistry {
            store,
            handle: None,
            images: Vec::new(),
            last_loaded: None,
            mod_count: 0,
            closed: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn has_channel(&self) -> bool {
        self.handle.is_some()
    }

    /// Refreshes the registry from the store: loads any images appended
    /// since the last refresh. Safe to call from every read path — it
    /// short-circuits on an unchanged mod-count.
    pub fn refresh(&mut self, data_handle: ChannelHandle) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let Some(signal_handle) = self.handle else {
            return Ok(());
        };

        let current_mod_count = self.store.mod_count(signal_handle)?;
        if current_mod_count == self.mod_count {
            return Ok(());
        }

        let Some((first, last)) = self.store.range(signal_handle)? else {
            return Ok(());
        };

        let start = self.last_loaded.map(|i| i + 1).unwrap_or(first).max(first);

        for index in start..=last {
            let Some((bytes, time)) = self.store.read(signal_handle, index)? else {
                break;
            };
            let samples = hyacoustic_dsp::decode_complex(&bytes).map_err(|_| hyacoustic_model::Error::CorruptData)?;

            let activation_index = match self.store.find(data_handle, time)? {
                FindStatus::Exact(i) => i,
                FindStatus::Between(_, right) => right,
                FindStatus::Less => {
                    let Some((data_first, _)) = self.store.range(data_handle)? else {
                        break;
                    };
                    data_first
                }
                FindStatus::Greater => break,
            };

            let filter = MatchedFilter::new(&samples);
            self.images.push(SignalImage {
                activation_time_us: time,
                activation_index,
                samples,
                filter,
            });
            self.last_loaded = Some(index);
            log::trace!("signal registry loaded image at index {index} (activation {activation_index})");
        }

        self.mod_count = current_mod_count;

        if !self.store.writable(signal_handle)? {
            self.closed = true;
            self.store.close(signal_handle);
            self.handle = None;
            log::debug!(
                "signal channel closed; registry frozen with {} images",
                self.images.len()
            );
        }

        Ok(())
    }

    /// Returns the image with the greatest `activation_index <= index`, or
    /// `None` if the registry is empty (which is not an error: an empty
    /// registry just means "no convolution, no error").
    pub fn find(&self, index: u32) -> Option<&SignalImage> {
        self.images
            .iter()
            .rev()
            .find(|image| image.activation_index <= index)
    }
}

impl Drop for SignalRegistry {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.store.close(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyacoustic_model::{ParamValue, StoreError};
    use std::collections::HashMap;

    struct NullStore;
    impl Store for NullStore {
        fn open_channel(&self, _: &str, _: &str, _: &str) -> Result<ChannelHandle> {
            unimplemented!()
        }
        fn read(&self, _: ChannelHandle, _: u32) -> Result<Option<(Vec<u8>, i64)>> {
            Ok(None)
        }
        fn data_size(&self, _: ChannelHandle, _: u32) -> Result<Option<usize>> {
            Ok(None)
        }
        fn data_time(&self, _: ChannelHandle, _: u32) -> Result<Option<i64>> {
            Ok(None)
        }
        fn range(&self, _: ChannelHandle) -> Result<Option<(u32, u32)>> {
            Ok(None)
        }
        fn find(&self, _: ChannelHandle, _: i64) -> Result<FindStatus> {
            Ok(FindStatus::Less)
        }
        fn mod_count(&self, _: ChannelHandle) -> Result<u64> {
            Ok(0)
        }
        fn writable(&self, _: ChannelHandle) -> Result<bool> {
            Ok(true)
        }
        fn param_open(&self, _: ChannelHandle) -> Result<hyacoustic_model::ParamHandle> {
            unimplemented!()
        }
        fn param_get(&self, _: hyacoustic_model::ParamHandle, _: &[&str]) -> Result<HashMap<String, ParamValue>> {
            Err(hyacoustic_model::Error::Store(StoreError::MissingKey("x".into())))
        }
        fn close(&self, _: ChannelHandle) {}
        fn uri(&self) -> String {
            "null://".into()
        }
    }

    fn image(activation_index: u32) -> SignalImage {
        SignalImage {
            activation_time_us: 0,
            activation_index,
            samples: vec![Complex::new(1.0, 0.0), Complex::new(0.0, 1.0)],
            filter: MatchedFilter::new(&[Complex::new(1.0, 0.0), Complex::new(0.0, 1.0)]),
        }
    }

    #[test]
    fn s4_find_resolves_boundary_by_activation_index() {
        let mut registry = SignalRegistry::none(Arc::new(NullStore));
        registry.images.push(image(0));
        registry.images.push(image(100));

        assert_eq!(registry.find(99).unwrap().activation_index, 0);
        assert_eq!(registry.find(100).unwrap().activation_index, 100);
        assert_eq!(registry.find(10_000).unwrap().activation_index, 100);
    }

    #[test]
    fn empty_registry_has_no_image() {
        let registry = SignalRegistry::none(Arc::new(NullStore));
        assert!(registry.find(0).is_none());
    }

    #[test]
    fn refresh_on_closed_registry_is_a_no_op() {
        let mut registry = SignalRegistry::none(Arc::new(NullStore));
        registry.refresh(ChannelHandle(0)).unwrap();
        assert!(registry.is_empty());
    }
}
