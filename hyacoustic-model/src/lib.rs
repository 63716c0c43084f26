//!
//! # hyacoustic-model
//! Core data model for the hydroacoustic acoustic read path: the channel
//! store and cache traits consumed by `hyacoustic-core`, the parameter
//! loader, and the value types (`AntennaOffset`, `AcousticInfo`,
//! `Discretization`, `Complex`, `DoaPoint`) shared across the workspace.
//!
//! This crate has no persisted-storage implementation of its own — `Store`
//! and `Cache` are traits only. `hyacoustic` provides an in-memory
//! implementation for tests and examples.
//!

pub mod cache_key;
pub mod params;
pub mod result;
pub mod schema;
pub mod store;
pub mod types;

pub use result::{Error, Result, StoreError};
pub use store::{Cache, ChannelHandle, FindStatus, ParamHandle, ParamValue, Store};
pub use types::{
    AcousticInfo, AntennaOffset, ChannelKind, Complex, Discretization, DoaPoint, NavFix,
    SourceType, channel_name,
};
