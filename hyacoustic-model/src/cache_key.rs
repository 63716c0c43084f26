//! Bit-exact cache header layout and cache key grammar, shared by every
//! producer/consumer of the result cache (§6 of the acoustic read path
//! contract).

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Cache header magic for a data payload (`REL`/`QCV`/`QNC`/`ACV`/`ANC`/`TVG`).
pub const CACHE_DATA_MAGIC: u32 = 0xf97603e8;
/// Cache header magic for a metadata payload (`MTA`).
pub const CACHE_META_MAGIC: u32 = 0x1e4a8071;

/// `base_scale_unit`: fixed divisor used solely to keep convolution scale
/// factors integer-friendly in cache keys. Never changes.
pub const BASE_SCALE_UNIT: f32 = 100.0;

/// Fixed 16-byte, little-endian cache entry header: `{magic, n_points, time_us}`.
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CacheHeader {
    pub magic: u32,
    pub n_points: u32,
    pub time_us: i64,
}

impl CacheHeader {
    pub const SIZE: usize = std::mem::size_of::<CacheHeader>();

    pub fn new_data(n_points: u32, time_us: i64) -> Self {
        CacheHeader {
            magic: CACHE_DATA_MAGIC,
            n_points,
            time_us,
        }
    }

    pub fn new_meta(n_points: u32, time_us: i64) -> Self {
        CacheHeader {
            magic: CACHE_META_MAGIC,
            n_points,
            time_us,
        }
    }

    pub fn to_bytes(&self) -> [u8; CacheHeader::SIZE] {
        let mut out = [0u8; CacheHeader::SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<CacheHeader> {
        CacheHeader::read_from_bytes(bytes).ok()
    }

    /// Validates a cache entry against its payload: the magic must match the
    /// expected kind and `n_points` must equal `payload.len() / element_size`.
    /// Any mismatch means the entry is corrupt and must be treated as a miss.
    pub fn validates(&self, expected_magic: u32, payload_len: usize, element_size: usize) -> bool {
        self.magic == expected_magic && payload_len / element_size == self.n_points as usize
            && payload_len % element_size == 0
    }
}

/// The data-class/convolution-state tag embedded in a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// Real samples.
    Rel,
    /// Complex samples, convolution on.
    Qcv,
    /// Complex samples, convolution off.
    Qnc,
    /// Amplitude, derived from convolved complex.
    Acv,
    /// Amplitude, derived from non-convolved complex.
    Anc,
    /// Time-varying gain coefficients.
    Tvg,
    /// Size/time metadata.
    Mta,
}

impl CacheKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKind::Rel => "REL",
            CacheKind::Qcv => "QCV",
            CacheKind::Qnc => "QNC",
            CacheKind::Acv => "ACV",
            CacheKind::Anc => "ANC",
            CacheKind::Tvg => "TVG",
            CacheKind::Mta => "MTA",
        }
    }
}

/// Builds the stable per-reader cache-key scope:
/// `"ACOUSTIC.<store-uri>.<proj>.<track>.<source>.<chan>"`.
pub fn acoustic_scope(uri: &str, project: &str, track: &str, source: &str, channel: u32) -> String {
    format!("ACOUSTIC.{uri}.{project}.{track}.{source}.{channel}")
}

/// Renders the full cache key: `"<scope>.<kind>.<conv-scale-as-int>.<index>"`.
/// `conv_scale` is `0` when convolution is off; otherwise the integer form of
/// the current scale. No floating-point representation ever enters a key.
pub fn render_key(scope: &str, kind: CacheKind, conv_scale: u32, index: u32) -> String {
    format!("{scope}.{}.{conv_scale}.{index}", kind.as_str())
}

/// Builds the forward-look primary cache key:
/// `"FORWARDLOOK.<uri>.<proj>.<track>.<index>"`. The sound-velocity detail is
/// kept out of the key proper and passed as the cache's `detail` component.
pub fn forward_look_key(uri: &str, project: &str, track: &str, index: u32) -> String {
    format!("FORWARDLOOK.{uri}.{project}.{track}.{index}")
}

/// Renders the forward-look detail key: the ASCII representation of the
/// sound velocity as a double.
pub fn sound_velocity_detail(sound_velocity: f64) -> String {
    format!("{sound_velocity}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips_through_bytes() {
        let h = CacheHeader::new_data(42, 123456);
        let bytes = h.to_bytes();
        assert_eq!(bytes.len(), 16);
        let back = CacheHeader::from_bytes(&bytes).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn header_rejects_mismatched_n_points() {
        let h = CacheHeader::new_data(3, 0);
        // payload holds 4 complex samples (32 bytes), header claims 3.
        assert!(!h.validates(CACHE_DATA_MAGIC, 32, 8));
        assert!(h.validates(CACHE_DATA_MAGIC, 24, 8));
    }

    #[test]
    fn cache_key_grammar_matches_spec_example() {
        let scope = acoustic_scope("db://uri", "P", "T", "2", 1);
        let key = render_key(&scope, CacheKind::Acv, 200, 42);
        assert_eq!(key, "ACOUSTIC.db://uri.P.T.2.1.ACV.200.42");
    }

    #[test]
    fn forward_look_key_has_no_channel_component() {
        let key = forward_look_key("db://uri", "P", "T", 7);
        assert_eq!(key, "FORWARDLOOK.db://uri.P.T.7");
    }
}
