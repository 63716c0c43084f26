//! Direction-of-arrival math shared by `hyacoustic-core::forward_look`.
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-forward-look-data.c`.

use hyacoustic_model::{Complex, DoaPoint};

/// Field-of-view half-angle: `|asin(v / (2*base*freq))|`.
pub fn fov_half_angle(sound_velocity: f64, antenna_base: f64, carrier_freq_hz: f64) -> f64 {
    (sound_velocity / (2.0 * antenna_base * carrier_freq_hz)).asin().abs()
}

/// Computes one DOA point for a pair of phase-coherent complex samples at
/// range bin `k`.
pub fn doa_point(
    c1: Complex,
    c2: Complex,
    k: usize,
    wavelength: f64,
    antenna_base: f64,
    sound_velocity: f64,
    sample_rate_hz: f64,
) -> DoaPoint {
    let conj_mul = c1.mul_conj(c2);
    let phase = conj_mul.phase() as f64;
    let angle = (phase * wavelength / (2.0 * std::f64::consts::PI * antenna_base)).asin();
    let distance = k as f64 * sound_velocity / (2.0 * sample_rate_hz);
    let amplitude = c1.amplitude() * c2.amplitude();
    DoaPoint {
        angle,
        distance,
        amplitude,
    }
}
