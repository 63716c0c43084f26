//! Schema identifiers: opaque 64-bit (id, version) pairs specific to the
//! persisted format. The core only ever compares them for equality; their
//! numeric values are arbitrary but fixed so producers and consumers agree.

pub const ACOUSTIC_SCHEMA_ID: i64 = 0x41435553; // "ACUS"
pub const ACOUSTIC_SCHEMA_VERSION: i64 = 1;

pub const SIGNAL_SCHEMA_ID: i64 = 0x5349474e; // "SIGN"
pub const SIGNAL_SCHEMA_VERSION: i64 = 1;

pub const TVG_SCHEMA_ID: i64 = 0x54564700; // "TVG\0"
pub const TVG_SCHEMA_VERSION: i64 = 1;

pub const LOG_SCHEMA_ID: i64 = 0x4c4f4700; // "LOG\0"
pub const LOG_SCHEMA_VERSION: i64 = 1;

pub const PROJECT_INFO_SCHEMA_ID: i64 = 0x50524a49; // "PRJI"
pub const PROJECT_INFO_SCHEMA_VERSION: i64 = 1;

pub const TRACK_INFO_SCHEMA_ID: i64 = 0x54524b49; // "TRKI"
pub const TRACK_INFO_SCHEMA_VERSION: i64 = 1;

/// Antenna offset schema: shared by every channel type that carries a
/// `/position/*` block.
pub const ANTENNA_OFFSET_SCHEMA_ID: i64 = 0x504f5349; // "POSI"
pub const ANTENNA_OFFSET_SCHEMA_VERSION: i64 = 1;
