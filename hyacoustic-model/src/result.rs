//!
//! Contains the Result and Error types for hydroacoustic read-path operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy shared across `hyacoustic-model`, `hyacoustic-dsp`, and
/// `hyacoustic-core`. Every fallible operation in the read path surfaces one of
/// these variants, either directly or wrapped via `#[from]`.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("store error")]
    Store(#[from] StoreError),
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("channel has no data")]
    Empty,
    #[error("bad channel parameters: {0}")]
    BadParams(String),
    #[error("source is not a sonar source")]
    UnsupportedSource,
    #[error("operation not supported for this discretization: {0}")]
    WrongKind(&'static str),
    #[error("index {index} is out of range")]
    OutOfRange { index: u32 },
    #[error("required data unavailable: {0}")]
    Unavailable(&'static str),
    #[error("sample data is corrupt: size is not a multiple of the element size")]
    CorruptData,
    #[error("incompatible channel geometry: {0}")]
    BadGeometry(String),
}

/// Errors surfaced by a [`crate::store::Store`] implementation.
#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("underlying store IO error: {0}")]
    Io(String),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("track not found: {0}")]
    TrackNotFound(String),
    #[error("channel schema mismatch: expected {expected_id}/{expected_version}, got {actual_id}/{actual_version}")]
    SchemaMismatch {
        expected_id: u64,
        expected_version: u64,
        actual_id: u64,
        actual_version: u64,
    },
    #[error("missing parameter key: {0}")]
    MissingKey(String),
    #[error("channel data rate does not match expected rate within tolerance: expected {expected} Hz, got {actual} Hz")]
    RateMismatch { expected: f64, actual: f64 },
}
