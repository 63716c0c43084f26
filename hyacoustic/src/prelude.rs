//! Convenient re-exports for common usage patterns.
//!
//! ```no_run
//! use hyacoustic::prelude::*;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<()> {
//! let store: Arc<dyn Store> = Arc::new(MemStore::new());
//! let mut reader = AcousticReader::open(store, None, "P", "T", SourceType::SideScanStarboard, 1, false)?;
//! let _amplitude = reader.amplitude(0)?;
//! # Ok(())
//! # }
//! ```

pub use crate::memstore::MemStore;
pub use crate::{Error, Result};
pub use hyacoustic_core::{
    AcousticReader, AmplitudeSource, ForwardLookReader, NavSource, QualityConfig, QualityEstimator,
    StoreNavSource,
};
pub use hyacoustic_model::{
    AcousticInfo, AntennaOffset, Cache, ChannelKind, Complex, Discretization, DoaPoint, FindStatus,
    NavFix, SourceType, Store,
};
