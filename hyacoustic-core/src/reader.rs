//! The acoustic reader: the central state machine of the read path. Opens one
//! data channel plus its signal and TVG siblings, exposes `real`/`complex`/
//! `amplitude`/`tvg`/`size_time` by index, interposing the result cache and
//! the transform pipeline.
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-acoustic-data.c`
//! in structure (construction sequence, cache-key scope, pipeline steps);
//! the buffer-reuse-by-borrow and handle-teardown discipline mirrors
//! `examples/danielway-nexrad`'s `nexrad-data` channel readers.

use crate::signal::SignalRegistry;
use hyacoustic_dsp::{amplitude_from_complex, byte_size_to_elements, decode_complex, decode_real, encode_complex, encode_real, real_to_complex};
use hyacoustic_model::cache_key::{self, CacheHeader, CacheKind, CACHE_DATA_MAGIC, CACHE_META_MAGIC};
use hyacoustic_model::{
    params, AcousticInfo, AntennaOffset, Cache, ChannelHandle, ChannelKind, Complex, Discretization,
    Error, FindStatus, ParamHandle, Result, SourceType, Store,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Adapts an open `(Store, ParamHandle)` pair to [`hyacoustic_model::params::ParamSource`].
struct StoreParamSource<'a> {
    store: &'a dyn Store,
    handle: ParamHandle,
}

impl<'a> params::ParamSource for StoreParamSource<'a> {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, hyacoustic_model::ParamValue>> {
        self.store.param_get(self.handle, keys)
    }
}

/// The central acoustic read-path state machine: one open data channel plus
/// its optional signal and TVG siblings.
///
/// Not `Sync`: a reader's internal buffers and cache-key scratch are
/// single-owner and mutated by every read call, matching `spec.md` §5's
/// per-thread-reader contract. `_not_sync` pins this at the type level.
pub struct AcousticReader {
    store: Arc<dyn Store>,
    cache: Option<Arc<dyn Cache>>,

    data_handle: ChannelHandle,
    tvg_handle: Option<ChannelHandle>,

    source: SourceType,
    channel: u32,
    is_noise: bool,

    offset: AntennaOffset,
    info: AcousticInfo,

    registry: SignalRegistry,
    convolve_enabled: bool,
    convolve_scale: f32,

    scope: String,
    current_time_us: i64,

    real_buf: Vec<f32>,
    complex_buf: Vec<Complex>,
    amplitude_buf: Vec<f32>,
    tvg_buf: Vec<f32>,

    _not_sync: std::marker::PhantomData<std::cell::Cell<()>>,
}

const BASE_SCALE_UNIT: f32 = cache_key::BASE_SCALE_UNIT;

impl AcousticReader {
    /// Opens `(source, channel)` (or its noise variant, if `noise` is set)
    /// within `(project, track)`. `cache` is optional: a reader with no cache
    /// still functions, just without memoisation.
    pub fn open(
        store: Arc<dyn Store>,
        cache: Option<Arc<dyn Cache>>,
        project: &str,
        track: &str,
        source: SourceType,
        channel: u32,
        noise: bool,
    ) -> Result<Self> {
        if !source.is_sonar() {
            return Err(Error::UnsupportedSource);
        }

        let data_kind = if noise { ChannelKind::Noise } else { ChannelKind::Data };
        let data_name = hyacoustic_model::channel_name(source, channel, data_kind);
        let signal_name = hyacoustic_model::channel_name(source, channel, ChannelKind::Signal);
        let tvg_name = hyacoustic_model::channel_name(source, channel, ChannelKind::Tvg);

        let data_handle = store
            .open_channel(project, track, &data_name)
            .map_err(|_| Error::ChannelNotFound(data_name.clone()))?;

        if store.range(data_handle)?.is_none() {
            store.close(data_handle);
            return Err(Error::Empty);
        }

        let param_handle = store.param_open(data_handle)?;
        let param_source = StoreParamSource { store: store.as_ref(), handle: param_handle };
        let offset = params::load_antenna_offset(
            &param_source,
            hyacoustic_model::schema::ANTENNA_OFFSET_SCHEMA_ID,
            hyacoustic_model::schema::ANTENNA_OFFSET_SCHEMA_VERSION,
        )?;
        let info = params::load_acoustic_info(&param_source)?;

        let registry = match store.open_channel(project, track, &signal_name) {
            Ok(signal_handle) => {
                let signal_param_handle = store.param_open(signal_handle)?;
                let signal_param_source = StoreParamSource { store: store.as_ref(), handle: signal_param_handle };
                match params::check_signal_params(
                    &signal_param_source,
                    hyacoustic_model::schema::SIGNAL_SCHEMA_ID,
                    hyacoustic_model::schema::SIGNAL_SCHEMA_VERSION,
                    info.sample_rate_hz,
                ) {
                    Ok(()) => SignalRegistry::new(Arc::clone(&store), signal_handle),
                    Err(err) => {
                        log::warn!("signal channel {signal_name} failed parameter checks: {err}");
                        store.close(signal_handle);
                        SignalRegistry::none(Arc::clone(&store))
                    }
                }
            }
            Err(_) => SignalRegistry::none(Arc::clone(&store)),
        };

        let tvg_handle = match store.open_channel(project, track, &tvg_name) {
            Ok(tvg_handle) => {
                let tvg_param_handle = store.param_open(tvg_handle)?;
                let tvg_param_source = StoreParamSource { store: store.as_ref(), handle: tvg_param_handle };
                match params::check_tvg_params(
                    &tvg_param_source,
                    hyacoustic_model::schema::TVG_SCHEMA_ID,
                    hyacoustic_model::schema::TVG_SCHEMA_VERSION,
                    info.sample_rate_hz,
                ) {
                    Ok(()) => Some(tvg_handle),
                    Err(err) => {
                        log::warn!("tvg channel {tvg_name} failed parameter checks: {err}");
                        store.close(tvg_handle);
                        None
                    }
                }
            }
            Err(_) => None,
        };

        let convolve_scale = default_scale(info.discretization);
        let scope = cache_key::acoustic_scope(&store.uri(), project, track, source_tag(source), channel);

        log::debug!(
            "opened acoustic reader: scope={scope} discretization={:?} has_signal={} has_tvg={}",
            info.discretization,
            registry.has_channel(),
            tvg_handle.is_some()
        );

        Ok(AcousticReader {
            store,
            cache,
            data_handle,
            tvg_handle,
            source,
            channel,
            is_noise: noise,
            offset,
            info,
            registry,
            convolve_enabled: true,
            convolve_scale,
            scope,
            current_time_us: 0,
            real_buf: Vec::new(),
            complex_buf: Vec::new(),
            amplitude_buf: Vec::new(),
            tvg_buf: Vec::new(),
            _not_sync: std::marker::PhantomData,
        })
    }

    /// `(n_points, time_us)` for `index`, cached under kind `MTA`.
    pub fn size_time(&mut self, index: u32) -> Result<(u32, i64)> {
        let key = self.render_key(CacheKind::Mta, index);
        if let Some(cache) = &self.cache {
            if let Ok(Some((hdr_bytes, _))) = cache.get2(&key, "", CacheHeader::SIZE) {
                if let Some(hdr) = CacheHeader::from_bytes(&hdr_bytes) {
                    if hdr.magic == CACHE_META_MAGIC {
                        return Ok((hdr.n_points, hdr.time_us));
                    }
                }
            }
        }

        let time = self
            .store
            .data_time(self.data_handle, index)?
            .ok_or(Error::OutOfRange { index })?;
        let size = self
            .store
            .data_size(self.data_handle, index)?
            .ok_or(Error::OutOfRange { index })?;
        let n_points = byte_size_to_elements(size, self.info.discretization);

        let hdr = CacheHeader::new_meta(n_points, time);
        self.store_cache2(&key, "", &hdr.to_bytes(), &[]);

        Ok((n_points, time))
    }

    /// Real samples at `index`. Requires `Discretization::Real`.
    pub fn real(&mut self, index: u32) -> Result<&[f32]> {
        if self.info.discretization != Discretization::Real {
            return Err(Error::WrongKind("real"));
        }

        let key = self.render_key(CacheKind::Rel, index);
        if self.try_fill_real_from_cache(&key)? {
            return Ok(&self.real_buf);
        }

        let (bytes, time) = self.read_raw(index)?;
        self.current_time_us = time;
        self.real_buf = decode_real(&bytes).map_err(|_| Error::CorruptData)?;

        let hdr = CacheHeader::new_data(self.real_buf.len() as u32, time);
        self.store_cache2(&key, "", &hdr.to_bytes(), &encode_real(&self.real_buf));

        Ok(&self.real_buf)
    }

    /// Complex (quadrature) samples at `index`, optionally convolved against
    /// the active emitted-signal image. Requires discretization ≠ `Amplitude`.
    pub fn complex(&mut self, index: u32) -> Result<&[Complex]> {
        if self.info.discretization == Discretization::Amplitude {
            return Err(Error::WrongKind("complex"));
        }

        self.registry.refresh(self.data_handle)?;

        let kind = if self.convolve_enabled { CacheKind::Qcv } else { CacheKind::Qnc };
        let key = self.render_key(kind, index);
        if self.try_fill_complex_from_cache(&key)? {
            return Ok(&self.complex_buf);
        }

        self.fill_complex_pipeline(index)?;

        let hdr = CacheHeader::new_data(self.complex_buf.len() as u32, self.current_time_us);
        self.store_cache2(&key, "", &hdr.to_bytes(), &encode_complex(&self.complex_buf));

        Ok(&self.complex_buf)
    }

    /// Amplitude (magnitude) samples at `index`.
    pub fn amplitude(&mut self, index: u32) -> Result<&[f32]> {
        self.registry.refresh(self.data_handle)?;

        let kind = if self.convolve_enabled { CacheKind::Acv } else { CacheKind::Anc };
        let key = self.render_key(kind, index);
        if self.try_fill_real_from_cache(&key)? {
            return Ok(self.amplitude_buf_from_real());
        }

        if self.info.discretization == Discretization::Amplitude {
            let (bytes, time) = self.read_raw(index)?;
            self.current_time_us = time;
            self.amplitude_buf = decode_real(&bytes).map_err(|_| Error::CorruptData)?;
        } else {
            let complex_kind = if self.convolve_enabled { CacheKind::Qcv } else { CacheKind::Qnc };
            let complex_key = self.render_key(complex_kind, index);
            if !self.try_fill_complex_from_cache(&complex_key)? {
                self.fill_complex_pipeline(index)?;
            }
            self.amplitude_buf = amplitude_from_complex(&self.complex_buf);
        }

        let hdr = CacheHeader::new_data(self.amplitude_buf.len() as u32, self.current_time_us);
        self.store_cache2(&key, "", &hdr.to_bytes(), &encode_real(&self.amplitude_buf));

        Ok(&self.amplitude_buf)
    }

    /// Time-varying gain coefficients at `index`. Requires a TVG channel.
    pub fn tvg(&mut self, index: u32) -> Result<&[f32]> {
        let tvg_handle = self.tvg_handle.ok_or(Error::Unavailable("tvg channel not present"))?;

        let key = self.render_key(CacheKind::Tvg, index);
        if self.try_fill_tvg_from_cache(&key)? {
            return Ok(&self.tvg_buf);
        }

        let t = self
            .store
            .data_time(self.data_handle, index)?
            .ok_or(Error::OutOfRange { index })?;

        let tvg_index = match self.store.find(tvg_handle, t)? {
            FindStatus::Exact(i) => i,
            FindStatus::Between(l, _) => l,
            FindStatus::Greater => {
                let (_, last) = self
                    .store
                    .range(tvg_handle)?
                    .ok_or(Error::Unavailable("tvg channel is empty"))?;
                last
            }
            FindStatus::Less => return Err(Error::Unavailable("no tvg block precedes this index")),
        };

        let (bytes, time) = self
            .store
            .read(tvg_handle, tvg_index)?
            .ok_or(Error::Unavailable("tvg block missing"))?;
        self.tvg_buf = decode_real(&bytes).map_err(|_| Error::CorruptData)?;

        let hdr = CacheHeader::new_data(self.tvg_buf.len() as u32, time);
        self.store_cache2(&key, "", &hdr.to_bytes(), &encode_real(&self.tvg_buf));

        Ok(&self.tvg_buf)
    }

    /// The emitted-signal image governing `index`, if any.
    pub fn signal_image(&mut self, index: u32) -> Result<Option<(&[Complex], i64)>> {
        self.registry.refresh(self.data_handle)?;
        Ok(self
            .registry
            .find(index)
            .map(|image| (image.samples.as_slice(), image.activation_time_us)))
    }

    /// Updates convolution on/off and (when `user_scale` is positive) the
    /// user-controlled scale component.
    pub fn set_convolve(&mut self, enabled: bool, user_scale: Option<f32>) {
        self.convolve_enabled = enabled;
        if let Some(scale) = user_scale {
            if scale > 0.0 {
                self.convolve_scale = scale * discretization_multiplier(self.info.discretization);
            }
        }
    }

    pub fn range(&self) -> Result<Option<(u32, u32)>> {
        self.store.range(self.data_handle)
    }

    pub fn find(&self, time_us: i64) -> Result<FindStatus> {
        self.store.find(self.data_handle, time_us)
    }

    pub fn mod_count(&self) -> Result<u64> {
        self.store.mod_count(self.data_handle)
    }

    pub fn writable(&self) -> Result<bool> {
        self.store.writable(self.data_handle)
    }

    pub fn info(&self) -> AcousticInfo {
        self.info
    }

    pub fn offset(&self) -> AntennaOffset {
        self.offset
    }

    pub fn discretization(&self) -> Discretization {
        self.info.discretization
    }

    pub fn has_tvg(&self) -> bool {
        self.tvg_handle.is_some()
    }

    pub fn is_noise(&self) -> bool {
        self.is_noise
    }

    pub fn source(&self) -> SourceType {
        self.source
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// The reader's stable cache-scope string, unique per
    /// `(store, project, track, source, channel)` — doubles as the
    /// identity token consumers use to tell two readers of the same
    /// parameter apart.
    pub fn token(&self) -> &str {
        &self.scope
    }

    fn render_key(&self, kind: CacheKind, index: u32) -> String {
        let scale = if self.convolve_enabled { self.convolve_scale as u32 } else { 0 };
        cache_key::render_key(&self.scope, kind, scale, index)
    }

    fn read_raw(&self, index: u32) -> Result<(Vec<u8>, i64)> {
        self.store.read(self.data_handle, index)?.ok_or(Error::OutOfRange { index })
    }

    /// §4.5.1: the internal read pipeline up to "primary buffer filled".
    fn fill_complex_pipeline(&mut self, index: u32) -> Result<()> {
        let (bytes, time) = self.read_raw(index)?;
        if bytes.len() % self.info.discretization.element_size() != 0 {
            return Err(Error::CorruptData);
        }
        self.current_time_us = time;

        self.complex_buf = match self.info.discretization {
            Discretization::Real => {
                let real = decode_real(&bytes).map_err(|_| Error::CorruptData)?;
                real_to_complex(&real, self.info.carrier_freq_hz, self.info.sample_rate_hz)
            }
            Discretization::Complex => decode_complex(&bytes).map_err(|_| Error::CorruptData)?,
            Discretization::Amplitude => return Err(Error::WrongKind("complex")),
        };

        if self.convolve_enabled {
            if let Some(image) = self.registry.find(index) {
                let scale = self.convolve_scale / BASE_SCALE_UNIT;
                image.filter.convolve(&mut self.complex_buf, scale);
            }
        }

        Ok(())
    }

    fn try_fill_real_from_cache(&mut self, key: &str) -> Result<bool> {
        let Some(cache) = &self.cache else { return Ok(false) };
        match cache.get2(key, "", CacheHeader::SIZE) {
            Ok(Some((hdr_bytes, payload))) => {
                if let Some(hdr) = CacheHeader::from_bytes(&hdr_bytes) {
                    if hdr.validates(CACHE_DATA_MAGIC, payload.len(), 4) {
                        if let Ok(samples) = decode_real(&payload) {
                            self.real_buf = samples;
                            self.current_time_us = hdr.time_us;
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            }
            Ok(None) => Ok(false),
            Err(err) => {
                log::warn!("cache read failed for {key}: {err}");
                Ok(false)
            }
        }
    }

    fn try_fill_tvg_from_cache(&mut self, key: &str) -> Result<bool> {
        let Some(cache) = &self.cache else { return Ok(false) };
        match cache.get2(key, "", CacheHeader::SIZE) {
            Ok(Some((hdr_bytes, payload))) => {
                if let Some(hdr) = CacheHeader::from_bytes(&hdr_bytes) {
                    if hdr.validates(CACHE_DATA_MAGIC, payload.len(), 4) {
                        if let Ok(samples) = decode_real(&payload) {
                            self.tvg_buf = samples;
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            }
            Ok(None) => Ok(false),
            Err(err) => {
                log::warn!("cache read failed for {key}: {err}");
                Ok(false)
            }
        }
    }

    fn try_fill_complex_from_cache(&mut self, key: &str) -> Result<bool> {
        let Some(cache) = &self.cache else { return Ok(false) };
        match cache.get2(key, "", CacheHeader::SIZE) {
            Ok(Some((hdr_bytes, payload))) => {
                if let Some(hdr) = CacheHeader::from_bytes(&hdr_bytes) {
                    if hdr.validates(CACHE_DATA_MAGIC, payload.len(), 8) {
                        if let Ok(samples) = decode_complex(&payload) {
                            self.complex_buf = samples;
                            self.current_time_us = hdr.time_us;
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            }
            Ok(None) => Ok(false),
            Err(err) => {
                log::warn!("cache read failed for {key}: {err}");
                Ok(false)
            }
        }
    }

    fn amplitude_buf_from_real(&mut self) -> &[f32] {
        self.amplitude_buf = std::mem::take(&mut self.real_buf);
        &self.amplitude_buf
    }

    fn store_cache2(&self, key: &str, detail: &str, header: &[u8], payload: &[u8]) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.set2(key, detail, header, payload) {
                log::warn!("cache write failed for {key}: {err}");
            }
        }
    }
}

impl Drop for AcousticReader {
    fn drop(&mut self) {
        if let Some(handle) = self.tvg_handle.take() {
            self.store.close(handle);
        }
        self.store.close(self.data_handle);
    }
}

/// Capability shared by every reader that exposes amplitude-derived data
/// over a time-indexed channel, letting consumers (the quality estimator,
/// future reader variants) work against one interface rather than the
/// concrete [`AcousticReader`] type.
pub trait AmplitudeSource {
    fn token(&self) -> &str;
    fn offset(&self) -> AntennaOffset;
    fn info(&self) -> AcousticInfo;
    fn writable(&self) -> Result<bool>;
    fn mod_count(&self) -> Result<u64>;
    fn range(&self) -> Result<Option<(u32, u32)>>;
    fn find(&self, time_us: i64) -> Result<FindStatus>;
    fn size_time(&mut self, index: u32) -> Result<(u32, i64)>;
    fn amplitude(&mut self, index: u32) -> Result<&[f32]>;
}

impl AmplitudeSource for AcousticReader {
    fn token(&self) -> &str {
        AcousticReader::token(self)
    }
    fn offset(&self) -> AntennaOffset {
        AcousticReader::offset(self)
    }
    fn info(&self) -> AcousticInfo {
        AcousticReader::info(self)
    }
    fn writable(&self) -> Result<bool> {
        AcousticReader::writable(self)
    }
    fn mod_count(&self) -> Result<u64> {
        AcousticReader::mod_count(self)
    }
    fn range(&self) -> Result<Option<(u32, u32)>> {
        AcousticReader::range(self)
    }
    fn find(&self, time_us: i64) -> Result<FindStatus> {
        AcousticReader::find(self, time_us)
    }
    fn size_time(&mut self, index: u32) -> Result<(u32, i64)> {
        AcousticReader::size_time(self, index)
    }
    fn amplitude(&mut self, index: u32) -> Result<&[f32]> {
        AcousticReader::amplitude(self, index)
    }
}

fn discretization_multiplier(discretization: Discretization) -> f32 {
    if discretization == Discretization::Real { 2.0 } else { 1.0 }
}

fn default_scale(discretization: Discretization) -> f32 {
    BASE_SCALE_UNIT * discretization_multiplier(discretization)
}

fn source_tag(source: SourceType) -> &'static str {
    match source {
        SourceType::SideScanStarboard => "1",
        SourceType::SideScanPort => "2",
        SourceType::Echosounder => "3",
        SourceType::ForwardLook => "4",
        SourceType::LookAround => "5",
        SourceType::Profiler => "6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyacoustic_model::{ParamValue, StoreError};
    use std::collections::HashMap as Map;
    use std::sync::Mutex;

    /// A tiny in-memory `Store` fixture used only by this module's tests.
    struct FakeStore {
        channels: Mutex<HashMap<String, Vec<(Vec<u8>, i64)>>>,
        params: HashMap<&'static str, Map<String, ParamValue>>,
        next_handle: Mutex<u64>,
        handle_names: Mutex<HashMap<u64, String>>,
    }

    impl FakeStore {
        fn new() -> Self {
            let mut params = HashMap::new();

            let mut data_params = Map::new();
            data_params.insert("/schema/id".into(), ParamValue::I64(hyacoustic_model::schema::ANTENNA_OFFSET_SCHEMA_ID));
            data_params.insert("/schema/version".into(), ParamValue::I64(hyacoustic_model::schema::ANTENNA_OFFSET_SCHEMA_VERSION));
            data_params.insert("/position/x".into(), ParamValue::F64(0.0));
            data_params.insert("/position/y".into(), ParamValue::F64(0.0));
            data_params.insert("/position/z".into(), ParamValue::F64(0.0));
            data_params.insert("/position/psi".into(), ParamValue::F64(0.0));
            data_params.insert("/position/gamma".into(), ParamValue::F64(0.0));
            data_params.insert("/position/theta".into(), ParamValue::F64(0.0));
            data_params.insert("/data/type".into(), ParamValue::Str("real".into()));
            data_params.insert("/data/sample-rate".into(), ParamValue::F64(1_000_000.0));
            data_params.insert("/data/carrier-frequency".into(), ParamValue::F64(250_000.0));
            data_params.insert("/data/bandwidth".into(), ParamValue::F64(1000.0));
            data_params.insert("/antenna/h-aperture".into(), ParamValue::F64(1.0));
            data_params.insert("/antenna/v-aperture".into(), ParamValue::F64(1.0));
            data_params.insert("/antenna/frequency".into(), ParamValue::F64(250_000.0));
            data_params.insert("/antenna/bandwidth".into(), ParamValue::F64(1000.0));
            data_params.insert("/adc/vref".into(), ParamValue::F64(5.0));
            data_params.insert("/adc/offset".into(), ParamValue::I64(0));
            params.insert("ss-starboard-1", data_params);

            FakeStore {
                channels: Mutex::new(HashMap::new()),
                params,
                next_handle: Mutex::new(0),
                handle_names: Mutex::new(HashMap::new()),
            }
        }

        fn push(&self, name: &str, bytes: Vec<u8>, time: i64) {
            self.channels.lock().unwrap().entry(name.to_string()).or_default().push((bytes, time));
        }
    }

    impl Store for FakeStore {
        fn open_channel(&self, _project: &str, _track: &str, channel_name: &str) -> Result<ChannelHandle> {
            if !self.params.contains_key(channel_name) && !self.channels.lock().unwrap().contains_key(channel_name) {
                return Err(Error::Store(StoreError::TrackNotFound(channel_name.into())));
            }
            let mut next = self.next_handle.lock().unwrap();
            let handle = ChannelHandle(*next);
            *next += 1;
            self.handle_names.lock().unwrap().insert(handle.0, channel_name.to_string());
            Ok(handle)
        }

        fn read(&self, handle: ChannelHandle, index: u32) -> Result<Option<(Vec<u8>, i64)>> {
            let name = self.handle_names.lock().unwrap()[&handle.0].clone();
            let channels = self.channels.lock().unwrap();
            Ok(channels.get(&name).and_then(|v| v.get(index as usize).cloned()))
        }

        fn data_size(&self, handle: ChannelHandle, index: u32) -> Result<Option<usize>> {
            Ok(self.read(handle, index)?.map(|(b, _)| b.len()))
        }

        fn data_time(&self, handle: ChannelHandle, index: u32) -> Result<Option<i64>> {
            Ok(self.read(handle, index)?.map(|(_, t)| t))
        }

        fn range(&self, handle: ChannelHandle) -> Result<Option<(u32, u32)>> {
            let name = self.handle_names.lock().unwrap()[&handle.0].clone();
            let channels = self.channels.lock().unwrap();
            Ok(channels.get(&name).filter(|v| !v.is_empty()).map(|v| (0, v.len() as u32 - 1)))
        }

        fn find(&self, handle: ChannelHandle, time_us: i64) -> Result<FindStatus> {
            let name = self.handle_names.lock().unwrap()[&handle.0].clone();
            let channels = self.channels.lock().unwrap();
            let Some(entries) = channels.get(&name) else { return Ok(FindStatus::Less) };
            for (i, (_, t)) in entries.iter().enumerate() {
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
            let name = self.handle_names.lock().unwrap()[&handle.0].clone();
            let channels = self.channels.lock().unwrap();
            Ok(channels.get(&name).map(|v| v.len() as u64).unwrap_or(0))
        }

        fn writable(&self, _handle: ChannelHandle) -> Result<bool> {
            Ok(true)
        }

        fn param_open(&self, handle: ChannelHandle) -> Result<ParamHandle> {
            Ok(ParamHandle(handle.0))
        }

        fn param_get(&self, handle: ParamHandle, keys: &[&str]) -> Result<HashMap<String, ParamValue>> {
            let name = self.handle_names.lock().unwrap()[&handle.0].clone();
            let map = self.params.get(name.as_str()).cloned().unwrap_or_default();
            Ok(keys.iter().filter_map(|k| map.get(*k).map(|v| (k.to_string(), v.clone()))).collect())
        }

        fn close(&self, _handle: ChannelHandle) {}

        fn uri(&self) -> String {
            "fake://".into()
        }
    }

    fn open_real_reader() -> AcousticReader {
        let store = Arc::new(FakeStore::new());
        store.push("ss-starboard-1", hyacoustic_dsp::encode_real(&[1.0, 0.0, -1.0, 0.0]), 100);
        AcousticReader::open(
            store,
            None,
            "P",
            "T",
            SourceType::SideScanStarboard,
            1,
            false,
        )
        .unwrap()
    }

    #[test]
    fn s1_complex_synthesis_through_reader() {
        let mut reader = open_real_reader();
        reader.set_convolve(false, None);
        let complex = reader.complex(0).unwrap();
        assert!((complex[0].re - 0.0).abs() < 1e-5);
        assert!((complex[0].im - 1.0).abs() < 1e-5);
    }

    #[test]
    fn size_time_reports_element_count_and_timestamp() {
        let mut reader = open_real_reader();
        let (n, t) = reader.size_time(0).unwrap();
        assert_eq!(n, 4);
        assert_eq!(t, 100);
    }

    #[test]
    fn real_on_complex_discretization_is_rejected() {
        let mut reader = open_real_reader();
        reader.info.discretization = Discretization::Complex;
        assert!(matches!(reader.real(0), Err(Error::WrongKind(_))));
    }

    #[test]
    fn out_of_range_index_is_surfaced() {
        let mut reader = open_real_reader();
        assert!(matches!(reader.real(5), Err(Error::OutOfRange { index: 5 })));
    }

    #[test]
    fn tvg_without_channel_is_unavailable() {
        let mut reader = open_real_reader();
        assert!(matches!(reader.tvg(0), Err(Error::Unavailable(_))));
    }

    #[test]
    fn cache_round_trip_returns_identical_amplitude() {
        struct MemCache(Mutex<HashMap<(String, String), (Vec<u8>, Vec<u8>)>>);
        impl Cache for MemCache {
            fn set(&self, _key: &str, _detail: &str, _buf: &[u8]) -> Result<()> {
                Ok(())
            }
            fn set2(&self, key: &str, detail: &str, header: &[u8], payload: &[u8]) -> Result<()> {
                self.0.lock().unwrap().insert((key.into(), detail.into()), (header.to_vec(), payload.to_vec()));
                Ok(())
            }
            fn get(&self, _key: &str, _detail: &str) -> Result<Option<Vec<u8>>> {
                Ok(None)
            }
            fn get2(&self, key: &str, detail: &str, header_len: usize) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
                Ok(self.0.lock().unwrap().get(&(key.into(), detail.into())).filter(|(h, _)| h.len() == header_len).cloned())
            }
        }

        let store = Arc::new(FakeStore::new());
        store.push("ss-starboard-1", hyacoustic_dsp::encode_real(&[1.0, 0.0, -1.0, 0.0]), 100);
        let cache = Arc::new(MemCache(Mutex::new(HashMap::new())));
        let mut reader = AcousticReader::open(
            store,
            Some(cache),
            "P",
            "T",
            SourceType::SideScanStarboard,
            1,
            false,
        )
        .unwrap();

        let first: Vec<f32> = reader.amplitude(0).unwrap().to_vec();
        let second: Vec<f32> = reader.amplitude(0).unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn acoustic_reader_is_usable_through_the_amplitude_source_capability_trait() {
        fn read_first_amplitude(source: &mut dyn AmplitudeSource) -> f32 {
            source.amplitude(0).unwrap()[0]
        }

        let mut reader = open_real_reader();
        assert_eq!(read_first_amplitude(&mut reader), 1.0);
        assert!(!reader.token().is_empty());
    }
}
