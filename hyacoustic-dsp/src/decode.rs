//! Decoding of raw channel bytes into typed sample buffers, and the
//! real→complex synthesis used when a channel's discretization is `Real`.

use hyacoustic_model::{Complex, Discretization};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("sample data is corrupt: size is not a multiple of the element size")]
    Corrupt,
}

/// Decodes raw little-endian bytes into real `f32` samples.
pub fn decode_real(bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
    if bytes.len() % 4 != 0 {
        return Err(DecodeError::Corrupt);
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
        .collect())
}

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawComplex {
    re: f32,
    im: f32,
}

/// Decodes raw little-endian bytes into complex samples (re, im pairs).
pub fn decode_complex(bytes: &[u8]) -> Result<Vec<Complex>, DecodeError> {
    if bytes.len() % 8 != 0 {
        return Err(DecodeError::Corrupt);
    }
    let raw = <[RawComplex]>::ref_from_bytes(bytes).map_err(|_| DecodeError::Corrupt)?;
    Ok(raw.iter().map(|c| Complex::new(c.re, c.im)).collect())
}

/// Decodes raw little-endian bytes into TVG coefficients (`f32`).
pub fn decode_tvg(bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
    decode_real(bytes)
}

/// Decodes a single navigation value: one little-endian `f64`.
pub fn decode_nav_value(bytes: &[u8]) -> Result<f64, DecodeError> {
    let arr: [u8; 8] = bytes.try_into().map_err(|_| DecodeError::Corrupt)?;
    Ok(f64::from_le_bytes(arr))
}

/// Serialises a navigation value back to little-endian bytes, for test
/// fixtures and cache writes.
pub fn encode_nav_value(value: f64) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Synthesises complex (quadrature) samples from real samples by multiplying
/// each real sample by `(sin(phi), cos(phi))`, with phase step
/// `2*pi*carrier_freq/sample_rate` starting at `phi = 0`.
///
/// `spec.md` §4.5 "complex" pipeline step 3 and testable property 3: for the
/// first sample, `re == real[0]*sin(0) == 0` and `im == real[0]*cos(0) ==
/// real[0]`.
pub fn real_to_complex(real: &[f32], carrier_freq_hz: f64, sample_rate_hz: f64) -> Vec<Complex> {
    let phase_step = 2.0 * std::f64::consts::PI * carrier_freq_hz / sample_rate_hz;
    let mut phi = 0.0f64;
    let mut out = Vec::with_capacity(real.len());
    for &sample in real {
        let (sin_phi, cos_phi) = phi.sin_cos();
        out.push(Complex::new(
            sample * sin_phi as f32,
            sample * cos_phi as f32,
        ));
        phi += phase_step;
    }
    out
}

/// Computes per-element amplitude (`sqrt(re^2 + im^2)`) from complex samples.
pub fn amplitude_from_complex(complex: &[Complex]) -> Vec<f32> {
    complex.iter().map(|c| c.amplitude()).collect()
}

/// Converts a byte size to an element count for the given discretization.
pub fn byte_size_to_elements(bytes: usize, discretization: Discretization) -> u32 {
    (bytes / discretization.element_size()) as u32
}

/// Serialises real samples back to little-endian bytes, for cache writes.
pub fn encode_real(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Serialises complex samples back to little-endian `(re, im)` byte pairs.
pub fn encode_complex(samples: &[Complex]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|c| RawComplex { re: c.re, im: c.im }.as_bytes().to_vec())
        .collect()
}
