//! Quality estimator: pairs a signal acoustic reader with a noise acoustic
//! reader and a navigation data source to compute per-index SNR → quality
//! vectors.
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-data-estimator.c`.

use crate::reader::AcousticReader;
use hyacoustic_dsp::quality_math::{apply_tvg, noise_sigma, quality_from_snr, rolling_mean, snr_db, suppress_leak};
use hyacoustic_model::{Error, FindStatus, Result};
use std::sync::Arc;

/// A source of navigation fixes, indexed the same way a [`Store`] channel is:
/// by time-lookup and by-index timestamp/position read.
pub trait NavSource: Send + Sync {
    fn find(&self, time_us: i64) -> Result<FindStatus>;
    fn time_at(&self, index: u32) -> Result<Option<i64>>;
}

/// Tunable parameters of the quality estimator, with the literal defaults
/// from the acoustic-quality contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityConfig {
    /// Rolling-mean window applied to the signal amplitude buffer.
    pub smooth_window: usize,
    /// Rolling-mean window applied while accumulating noise magnitude.
    pub samples_window: usize,
    /// Number of noise pings averaged into a single noise-sigma vector.
    pub time_window: u32,
    pub min_quality: u32,
    pub max_quality: u32,
    /// Upper bound (in multiples of mean nav inter-arrival) on acceptable
    /// navigation staleness.
    pub max_navig_delay: f64,
    /// Number of trailing nav samples averaged for the inter-arrival mean.
    pub navig_mean_window: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            smooth_window: 10,
            samples_window: 100,
            time_window: 4,
            min_quality: 0,
            max_quality: 255,
            max_navig_delay: 10.0,
            navig_mean_window: 10,
        }
    }
}

/// Composes a signal reader, a noise reader, and a navigation source to
/// produce per-index data-quality vectors.
pub struct QualityEstimator {
    signal: AcousticReader,
    noise: AcousticReader,
    nav: Arc<dyn NavSource>,
    config: QualityConfig,

    last_noise_index: Option<u32>,
    sigma_buf: Vec<f64>,
    quality_buf: Vec<u32>,
}

impl QualityEstimator {
    pub fn new(signal: AcousticReader, noise: AcousticReader, nav: Arc<dyn NavSource>, config: QualityConfig) -> Self {
        QualityEstimator {
            signal,
            noise,
            nav,
            config,
            last_noise_index: None,
            sigma_buf: Vec::new(),
            quality_buf: Vec::new(),
        }
    }

    /// Per-sample quality vector for the signal ping at `index`, in
    /// `[min_quality, max_quality]`.
    pub fn acoustic_quality(&mut self, index: u32) -> Result<&[u32]> {
        let leak_len = match self.signal.signal_image(index)? {
            Some((samples, _)) => samples.len(),
            None => 0,
        };

        let mut working: Vec<f32> = self.signal.amplitude(index)?.to_vec();

        if self.signal.has_tvg() {
            let tvg: Vec<f32> = self.signal.tvg(index)?.to_vec();
            apply_tvg(&mut working, &tvg);
        }

        if leak_len > working.len() {
            return Err(Error::Unavailable("leak length exceeds ping length"));
        }
        suppress_leak(&mut working, leak_len);

        let len = working.len();
        let smooth_end = len.saturating_sub(self.config.smooth_window + 1).max(leak_len);
        let smoothed = rolling_mean(&working, self.config.smooth_window, leak_len, smooth_end);

        let (_, signal_time) = self.signal.size_time(index)?;
        let noise_index = match self.noise.find(signal_time)? {
            FindStatus::Exact(i) => i,
            _ => return Err(Error::Unavailable("no noise ping at matching timestamp")),
        };

        if self.last_noise_index != Some(noise_index) {
            self.sigma_buf = self.compute_sigma(noise_index, leak_len, len)?;
            self.last_noise_index = Some(noise_index);
        }
        let sigma = &self.sigma_buf;

        let mut snr = vec![0.0f64; len];
        let mut smooth_snr = vec![0.0f64; len];
        for k in leak_len..len {
            let s = sigma.get(k).copied().unwrap_or(0.0);
            snr[k] = snr_db(working[k], s);
            smooth_snr[k] = snr_db(smoothed[k], s);
        }

        let max_snr = smooth_snr[leak_len..len].iter().cloned().fold(f64::MIN, f64::max).max(0.0);
        let coef = if max_snr > 0.0 {
            (self.config.max_quality - self.config.min_quality) as f64 / max_snr
        } else {
            0.0
        };

        self.quality_buf = (0..len)
            .map(|k| quality_from_snr(snr[k], max_snr, coef, self.config.min_quality, self.config.max_quality))
            .collect();

        Ok(&self.quality_buf)
    }

    /// Accumulates the Rayleigh noise-sigma vector over the `time_window`
    /// noise pings ending at `noise_index`.
    fn compute_sigma(&mut self, noise_index: u32, leak_len: usize, len: usize) -> Result<Vec<f64>> {
        let start = noise_index.saturating_sub(self.config.time_window.saturating_sub(1));
        let ping_count = (noise_index - start + 1) as usize;

        let mut accumulated = vec![0.0f64; len];
        for j in start..=noise_index {
            let mut amps: Vec<f32> = self.noise.amplitude(j)?.to_vec();
            if self.noise.has_tvg() {
                let tvg: Vec<f32> = self.noise.tvg(j)?.to_vec();
                apply_tvg(&mut amps, &tvg);
            }
            let smoothed = rolling_mean(&amps, self.config.samples_window, leak_len, amps.len());
            for k in leak_len..len.min(smoothed.len()) {
                accumulated[k] += smoothed[k] as f64;
            }
        }

        Ok((0..len)
            .map(|k| noise_sigma(accumulated[k], self.config.samples_window, ping_count))
            .collect())
    }

    /// Quality of the navigation fix nearest `signal_time_us`, in
    /// `[0, max_quality]` based on how stale the matched fix is.
    pub fn navig_quality(&self, signal_time_us: i64) -> Result<u32> {
        let left_index = match self.nav.find(signal_time_us)? {
            FindStatus::Exact(i) => i,
            _ => return Err(Error::Unavailable("no navigation fix at matching timestamp")),
        };

        if left_index <= self.config.navig_mean_window {
            return Ok(0);
        }

        let window = self.config.navig_mean_window;
        let mut deltas = Vec::with_capacity(window as usize);
        for i in (left_index - window + 1)..=left_index {
            let t_curr = self.nav.time_at(i)?.ok_or(Error::Unavailable("nav sample missing"))?;
            let t_prev = self.nav.time_at(i - 1)?.ok_or(Error::Unavailable("nav sample missing"))?;
            deltas.push((t_curr - t_prev) as f64);
        }
        let mean_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;

        let nav_time = self.nav.time_at(left_index)?.ok_or(Error::Unavailable("nav sample missing"))?;
        let last_interval = (signal_time_us - nav_time) as f64;

        if mean_delta <= 0.0 {
            return Ok(self.config.max_quality);
        }

        let coef = (self.config.max_quality - self.config.min_quality) as f64 / (self.config.max_navig_delay * mean_delta);
        let quality = self.config.max_quality as f64 - coef * last_interval;
        Ok(quality.max(0.0) as u32)
    }
}
