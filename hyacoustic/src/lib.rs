#![forbid(unsafe_code)]
#![warn(clippy::correctness)]

//! # hyacoustic
//!
//! The hydroacoustic acoustic read path: given a persistent channel of raw
//! sonar samples plus auxiliary channels (emitted-signal images, time-varying
//! gain, a paired receive channel for interferometry), produces real,
//! complex, and amplitude samples, TVG coefficients, direction-of-arrival
//! tuples, and per-sample quality values — on demand, per index.
//!
//! This crate re-exports [`hyacoustic_model`]'s `Store`/`Cache` traits and
//! [`hyacoustic_core`]'s readers, and provides [`memstore`], an in-memory
//! implementation of both traits for tests and examples.

pub mod memstore;
pub mod prelude;
pub mod result;

pub use hyacoustic_core::{
    forward_look::ForwardLookReader,
    nav::StoreNavSource,
    quality::{NavSource, QualityConfig, QualityEstimator},
    reader::{AcousticReader, AmplitudeSource},
    signal::{SignalImage, SignalRegistry},
};
pub use hyacoustic_model::{
    AcousticInfo, AntennaOffset, Cache, ChannelHandle, ChannelKind, Complex, Discretization,
    DoaPoint, FindStatus, NavFix, ParamHandle, ParamValue, SourceType, Store,
};
pub use result::{Error, Result};
