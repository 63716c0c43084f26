//!
//! # hyacoustic-dsp
//! Matched-filter convolution and the complex/amplitude/DOA/quality math
//! used by `hyacoustic-core`'s stateful readers. Every function here is a
//! pure transform over sample buffers — no channel I/O, no caching.
//!

pub mod convolve;
pub mod decode;
pub mod doa;
pub mod quality_math;
pub mod result;

pub use convolve::MatchedFilter;
pub use decode::{
    amplitude_from_complex, byte_size_to_elements, decode_complex, decode_nav_value, decode_real,
    decode_tvg, encode_complex, encode_nav_value, encode_real, real_to_complex, DecodeError,
};
pub use doa::{doa_point, fov_half_angle};
