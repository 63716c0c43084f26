//! Forward-look reader: composes two acoustic readers (`source =
//! ForwardLook`, channels 1 and 2) and computes per-sample direction of
//! arrival from their phase-coherent complex samples.
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-forward-look-data.c`.

use crate::reader::AcousticReader;
use hyacoustic_dsp::doa_point;
use hyacoustic_model::cache_key::{self, CacheHeader, CACHE_DATA_MAGIC};
use hyacoustic_model::{Cache, DoaPoint, Error, FindStatus, Result, SourceType, Store};
use std::sync::Arc;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawDoaPoint {
    angle: f64,
    distance: f64,
    amplitude: f32,
    _pad: f32,
}

fn encode_doa(points: &[DoaPoint]) -> Vec<u8> {
    points
        .iter()
        .flat_map(|p| {
            RawDoaPoint { angle: p.angle, distance: p.distance, amplitude: p.amplitude, _pad: 0.0 }
                .as_bytes()
                .to_vec()
        })
        .collect()
}

fn decode_doa(bytes: &[u8]) -> Option<Vec<DoaPoint>> {
    let raw = <[RawDoaPoint]>::ref_from_bytes(bytes).ok()?;
    Some(
        raw.iter()
            .map(|r| DoaPoint { angle: r.angle, distance: r.distance, amplitude: r.amplitude })
            .collect(),
    )
}

/// Pairs two [`AcousticReader`]s opened on `ForwardLook` channels 1 and 2 to
/// produce interferometric direction-of-arrival points.
pub struct ForwardLookReader {
    channel1: AcousticReader,
    channel2: AcousticReader,
    cache: Option<Arc<dyn Cache>>,
    uri: String,
    project: String,
    track: String,

    antenna_base: f64,
    carrier_freq_hz: f64,
    sample_rate_hz: f64,
    sound_velocity: f64,
    wavelength: f64,
    alpha: f64,

    doa_buf: Vec<DoaPoint>,
}

const DEFAULT_SOUND_VELOCITY: f64 = 1500.0;

impl ForwardLookReader {
    pub fn open(
        store: Arc<dyn Store>,
        cache: Option<Arc<dyn Cache>>,
        project: &str,
        track: &str,
    ) -> Result<Self> {
        let channel1 = AcousticReader::open(
            Arc::clone(&store),
            cache.clone(),
            project,
            track,
            SourceType::ForwardLook,
            1,
            false,
        )?;
        let channel2 = AcousticReader::open(
            Arc::clone(&store),
            cache.clone(),
            project,
            track,
            SourceType::ForwardLook,
            2,
            false,
        )?;

        let offset1 = channel1.offset();
        let offset2 = channel2.offset();
        let info1 = channel1.info();
        let info2 = channel2.info();

        let antenna_base = offset2.forward() - offset1.forward();
        if antenna_base == 0.0 {
            return Err(Error::BadGeometry("forward-look channels share the same antenna position".into()));
        }
        if (info1.carrier_freq_hz - info2.carrier_freq_hz).abs() > 0.1 {
            return Err(Error::BadGeometry("forward-look channels have mismatched carrier frequencies".into()));
        }
        if (info1.sample_rate_hz - info2.sample_rate_hz).abs() > 0.1 {
            return Err(Error::BadGeometry("forward-look channels have mismatched sample rates".into()));
        }

        let carrier_freq_hz = info1.carrier_freq_hz;
        let sample_rate_hz = info1.sample_rate_hz;
        let sound_velocity = DEFAULT_SOUND_VELOCITY;
        let wavelength = sound_velocity / carrier_freq_hz;
        let alpha = hyacoustic_dsp::fov_half_angle(sound_velocity, antenna_base.abs(), carrier_freq_hz);

        Ok(ForwardLookReader {
            uri: store.uri(),
            project: project.to_string(),
            track: track.to_string(),
            channel1,
            channel2,
            cache,
            antenna_base,
            carrier_freq_hz,
            sample_rate_hz,
            sound_velocity,
            wavelength,
            alpha,
            doa_buf: Vec::new(),
        })
    }

    /// Sets the sound velocity used for `wavelength`/`alpha` and as the cache
    /// detail key for [`Self::doa`]. Ignored if `v <= 0`.
    pub fn set_sound_velocity(&mut self, v: f64) {
        if v > 0.0 {
            self.sound_velocity = v;
            self.wavelength = v / self.carrier_freq_hz;
            self.alpha = hyacoustic_dsp::fov_half_angle(v, self.antenna_base.abs(), self.carrier_freq_hz);
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn size_time(&mut self, index: u32) -> Result<(u32, i64)> {
        self.channel1.size_time(index)
    }

    pub fn range(&self) -> Result<Option<(u32, u32)>> {
        self.channel1.range()
    }

    pub fn find(&self, time_us: i64) -> Result<FindStatus> {
        self.channel1.find(time_us)
    }

    pub fn mod_count(&self) -> Result<u64> {
        self.channel1.mod_count()
    }

    pub fn writable(&self) -> Result<bool> {
        self.channel1.writable()
    }

    /// Per-sample direction-of-arrival tuples at `index`. Requires channel 2
    /// to carry a sample with identical timestamp to channel 1's at `index`.
    pub fn doa(&mut self, index: u32) -> Result<&[DoaPoint]> {
        let key = cache_key::forward_look_key(&self.uri, &self.project, &self.track, index);
        let detail = cache_key::sound_velocity_detail(self.sound_velocity);

        if let Some(cache) = &self.cache {
            if let Ok(Some((hdr_bytes, payload))) = cache.get2(&key, &detail, CacheHeader::SIZE) {
                if let Some(hdr) = CacheHeader::from_bytes(&hdr_bytes) {
                    if hdr.validates(CACHE_DATA_MAGIC, payload.len(), std::mem::size_of::<RawDoaPoint>()) {
                        if let Some(points) = decode_doa(&payload) {
                            self.doa_buf = points;
                            return Ok(&self.doa_buf);
                        }
                    }
                }
            }
        }

        let complex1: Vec<_> = self.channel1.complex(index)?.to_vec();
        let t1 = self
            .channel1
            .size_time(index)
            .map(|(_, t)| t)
            .unwrap_or(0);

        let index2 = match self.channel2.find(t1)? {
            FindStatus::Exact(i) => i,
            _ => return Err(Error::Unavailable("no timestamp-matched sample on channel 2")),
        };

        let complex2: Vec<_> = self.channel2.complex(index2)?.to_vec();

        let n = complex1.len().min(complex2.len());
        self.doa_buf = (0..n)
            .map(|k| {
                doa_point(
                    complex1[k],
                    complex2[k],
                    k,
                    self.wavelength,
                    self.antenna_base,
                    self.sound_velocity,
                    self.sample_rate_hz,
                )
            })
            .collect();

        if let Some(cache) = &self.cache {
            let hdr = CacheHeader::new_data(self.doa_buf.len() as u32, t1);
            if let Err(err) = cache.set2(&key, &detail, &hdr.to_bytes(), &encode_doa(&self.doa_buf)) {
                log::warn!("cache write failed for {key}: {err}");
            }
        }

        Ok(&self.doa_buf)
    }
}
