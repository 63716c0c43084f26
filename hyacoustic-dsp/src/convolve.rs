//! Matched-filter convolution against an emitted-signal image.
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-acoustic-data.c`,
//! which owns one `HyScanConvolution` object per signal image and convolves
//! a block of complex samples against it on demand, scaled by
//! `conv_scale / CONV_SCALE`. The FIR kernel here is the image itself,
//! reversed and conjugated, applied as a direct (non-FFT) correlation — the
//! implementation detail `spec.md` explicitly leaves open; the contract is
//! same-length in/out, in-place overwrite, linear scale.

use hyacoustic_model::Complex;

/// Owns one matched-filter kernel derived from a signal image.
///
/// An image with fewer than two samples is "convolution-inert": its lookup
/// still succeeds, but [`MatchedFilter::convolve`] is a no-op, matching
/// `spec.md` §4.3 step 5.
#[derive(Debug, Clone)]
pub struct MatchedFilter {
    /// Reversed, conjugated kernel; empty when the filter is inert.
    kernel: Vec<Complex>,
}

impl MatchedFilter {
    /// Builds a matched filter from a signal image. Images with fewer than
    /// two points produce an inert filter.
    pub fn new(image: &[Complex]) -> Self {
        if image.len() < 2 {
            return MatchedFilter { kernel: Vec::new() };
        }
        let kernel = image
            .iter()
            .rev()
            .map(|c| Complex::new(c.re, -c.im))
            .collect();
        MatchedFilter { kernel }
    }

    pub fn is_inert(&self) -> bool {
        self.kernel.is_empty()
    }

    /// Convolves `samples` in place with this filter's kernel, scaled
    /// linearly by `scale`. A no-op (returns `false`) if the filter is inert;
    /// otherwise returns `true`. Same-length in/out.
    pub fn convolve(&self, samples: &mut [Complex], scale: f32) -> bool {
        if self.is_inert() || samples.is_empty() {
            return false;
        }

        let n = samples.len();
        let k = self.kernel.len();
        let input: Vec<Complex> = samples.to_vec();
        let center = k / 2;

        for (i, out) in samples.iter_mut().enumerate() {
            let mut acc = Complex::ZERO;
            for (j, kern) in self.kernel.iter().enumerate() {
                let src_idx = i as isize + j as isize - center as isize;
                if src_idx < 0 || src_idx as usize >= n {
                    continue;
                }
                let s = input[src_idx as usize];
                acc.re += s.re * kern.re - s.im * kern.im;
                acc.im += s.re * kern.im + s.im * kern.re;
            }
            out.re = acc.re * scale;
            out.im = acc.im * scale;
        }

        true
    }
}
