//!
//! Re-exports the shared error taxonomy so callers of the facade crate never
//! need to depend on `hyacoustic-model` directly.
//!

pub use hyacoustic_model::{Error, Result};
