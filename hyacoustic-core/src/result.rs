//!
//! Re-exports the shared [`hyacoustic_model::Error`]/[`hyacoustic_model::Result`]
//! taxonomy. Every stateful reader in this crate surfaces one of its variants.
//!

pub use hyacoustic_model::{Error, Result};
