//!
//! # hyacoustic-core
//! The stateful read path: the signal registry, the acoustic reader state
//! machine, and the two derived readers (forward-look DOA, quality
//! estimator) composed on top of it.
//!
//! Every reader here is single-threaded; the recommended pattern is one
//! reader per thread, sharing one [`hyacoustic_model::Store`] and one
//! [`hyacoustic_model::Cache`].
//!

pub mod forward_look;
pub mod nav;
pub mod quality;
pub mod reader;
pub mod result;
pub mod signal;

pub use forward_look::ForwardLookReader;
pub use nav::StoreNavSource;
pub use quality::{NavSource, QualityConfig, QualityEstimator};
pub use reader::{AcousticReader, AmplitudeSource};
pub use result::{Error, Result};
pub use signal::{SignalImage, SignalRegistry};
