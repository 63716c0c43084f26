//!
//! Contains the Result and Error types for hydroacoustic signal-processing
//! operations. Mirrors `hyacoustic_model::result` but scoped to the
//! decode/convolution layer; `From<DecodeError>` lets callers propagate a
//! corrupt-sample condition into the shared taxonomy.
//!

pub use crate::decode::DecodeError;
use hyacoustic_model::Error as ModelError;

impl From<DecodeError> for ModelError {
    fn from(_: DecodeError) -> Self {
        ModelError::CorruptData
    }
}
