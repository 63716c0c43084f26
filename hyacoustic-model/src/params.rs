//! Parameter loader: validates a channel's schema id/version against the
//! expected one and extracts typed configuration.
//!
//! Grounded on `examples/original_source/hyscancore/hyscan-core-params.c`,
//! which reads a flat key namespace (`/schema/id`, `/position/x`, …) out of
//! an open parameter handle. Here that handle is anything implementing
//! [`ParamSource`] — in practice a [`crate::store::Store`] plus an open
//! [`crate::store::ParamHandle`].

use crate::result::{Error, Result, StoreError};
use crate::store::ParamValue;
use crate::types::{AcousticInfo, AntennaOffset, Discretization};
use std::collections::HashMap;

/// Something that can answer `param_get` queries for a single open
/// parameter handle. Implemented by adapters over [`crate::store::Store`].
pub trait ParamSource {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, ParamValue>>;
}

fn require_f64(map: &HashMap<String, ParamValue>, key: &str) -> Result<f64> {
    map.get(key)
        .and_then(ParamValue::as_f64)
        .ok_or_else(|| Error::Store(StoreError::MissingKey(key.to_string())))
}

fn require_i64(map: &HashMap<String, ParamValue>, key: &str) -> Result<i64> {
    map.get(key)
        .and_then(ParamValue::as_i64)
        .ok_or_else(|| Error::Store(StoreError::MissingKey(key.to_string())))
}

fn check_schema(map: &HashMap<String, ParamValue>, expected_id: i64, expected_version: i64) -> Result<()> {
    let id = require_i64(map, "/schema/id")?;
    let version = require_i64(map, "/schema/version")?;
    if id != expected_id || version != expected_version {
        return Err(Error::Store(StoreError::SchemaMismatch {
            expected_id: expected_id as u64,
            expected_version: expected_version as u64,
            actual_id: id as u64,
            actual_version: version as u64,
        }));
    }
    Ok(())
}

/// Loads and validates the antenna offset from an open parameter handle.
pub fn load_antenna_offset(
    source: &dyn ParamSource,
    expected_schema_id: i64,
    expected_schema_version: i64,
) -> Result<AntennaOffset> {
    let keys = [
        "/schema/id",
        "/schema/version",
        "/position/x",
        "/position/y",
        "/position/z",
        "/position/psi",
        "/position/gamma",
        "/position/theta",
    ];
    let map = source.get(&keys)?;
    check_schema(&map, expected_schema_id, expected_schema_version)?;

    Ok(AntennaOffset {
        x: require_f64(&map, "/position/x")?,
        y: require_f64(&map, "/position/y")?,
        z: require_f64(&map, "/position/z")?,
        psi: require_f64(&map, "/position/psi")?,
        gamma: require_f64(&map, "/position/gamma")?,
        theta: require_f64(&map, "/position/theta")?,
    })
}

fn discretization_from_tag(tag: &str) -> Result<Discretization> {
    match tag {
        "real" => Ok(Discretization::Real),
        "complex" => Ok(Discretization::Complex),
        "amplitude" => Ok(Discretization::Amplitude),
        other => Err(Error::BadParams(format!("unknown data type tag: {other}"))),
    }
}

/// Loads the full acoustic-channel parameter block.
pub fn load_acoustic_info(source: &dyn ParamSource) -> Result<AcousticInfo> {
    let keys = [
        "/data/type",
        "/data/sample-rate",
        "/data/carrier-frequency",
        "/data/bandwidth",
        "/antenna/h-aperture",
        "/antenna/v-aperture",
        "/antenna/frequency",
        "/antenna/bandwidth",
        "/adc/vref",
        "/adc/offset",
    ];
    let map = source.get(&keys)?;

    let tag = match map.get("/data/type") {
        Some(ParamValue::Str(s)) => s.clone(),
        _ => return Err(Error::Store(StoreError::MissingKey("/data/type".to_string()))),
    };

    Ok(AcousticInfo {
        discretization: discretization_from_tag(&tag)?,
        sample_rate_hz: require_f64(&map, "/data/sample-rate")?,
        carrier_freq_hz: require_f64(&map, "/data/carrier-frequency")?,
        bandwidth_hz: require_f64(&map, "/data/bandwidth")?,
        antenna_h_aperture: require_f64(&map, "/antenna/h-aperture")?,
        antenna_v_aperture: require_f64(&map, "/antenna/v-aperture")?,
        antenna_freq_hz: require_f64(&map, "/antenna/frequency")?,
        antenna_bandwidth_hz: require_f64(&map, "/antenna/bandwidth")?,
        adc_vref: require_f64(&map, "/adc/vref")?,
        adc_offset: require_i64(&map, "/adc/offset")? as i32,
    })
}

/// Verifies a signal channel's schema and that its rate matches the data
/// rate within 1 Hz, and that its data type is complex-float.
pub fn check_signal_params(
    source: &dyn ParamSource,
    expected_schema_id: i64,
    expected_schema_version: i64,
    expected_rate: f64,
) -> Result<()> {
    let keys = ["/schema/id", "/schema/version", "/data/sample-rate", "/data/type"];
    let map = source.get(&keys)?;
    check_schema(&map, expected_schema_id, expected_schema_version)?;

    let rate = require_f64(&map, "/data/sample-rate")?;
    if (rate - expected_rate).abs() > 1.0 {
        return Err(Error::Store(StoreError::RateMismatch {
            expected: expected_rate,
            actual: rate,
        }));
    }

    if let Some(ParamValue::Str(tag)) = map.get("/data/type") {
        if tag != "complex" {
            return Err(Error::BadParams(format!(
                "signal channel data type must be complex, got {tag}"
            )));
        }
    }

    Ok(())
}

/// Verifies a TVG channel's schema and rate, analogous to
/// [`check_signal_params`].
pub fn check_tvg_params(
    source: &dyn ParamSource,
    expected_schema_id: i64,
    expected_schema_version: i64,
    expected_rate: f64,
) -> Result<()> {
    let keys = ["/schema/id", "/schema/version", "/data/sample-rate"];
    let map = source.get(&keys)?;
    check_schema(&map, expected_schema_id, expected_schema_version)?;

    let rate = require_f64(&map, "/data/sample-rate")?;
    if (rate - expected_rate).abs() > 1.0 {
        return Err(Error::Store(StoreError::RateMismatch {
            expected: expected_rate,
            actual: rate,
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource(HashMap<String, ParamValue>);

    impl ParamSource for FakeSource {
        fn get(&self, keys: &[&str]) -> Result<HashMap<String, ParamValue>> {
            Ok(keys
                .iter()
                .filter_map(|k| self.0.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect())
        }
    }

    fn offset_fixture() -> FakeSource {
        let mut m = HashMap::new();
        m.insert("/schema/id".into(), ParamValue::I64(1));
        m.insert("/schema/version".into(), ParamValue::I64(1));
        m.insert("/position/x".into(), ParamValue::F64(1.0));
        m.insert("/position/y".into(), ParamValue::F64(2.0));
        m.insert("/position/z".into(), ParamValue::F64(3.0));
        m.insert("/position/psi".into(), ParamValue::F64(0.1));
        m.insert("/position/gamma".into(), ParamValue::F64(0.2));
        m.insert("/position/theta".into(), ParamValue::F64(0.3));
        FakeSource(m)
    }

    #[test]
    fn loads_matching_schema() {
        let src = offset_fixture();
        let offset = load_antenna_offset(&src, 1, 1).unwrap();
        assert_eq!(offset.x, 1.0);
        assert_eq!(offset.theta, 0.3);
    }

    #[test]
    fn rejects_schema_mismatch() {
        let src = offset_fixture();
        let err = load_antenna_offset(&src, 2, 1).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::SchemaMismatch { .. })));
    }

    #[test]
    fn rate_mismatch_beyond_one_hz_is_rejected() {
        let mut m = HashMap::new();
        m.insert("/schema/id".into(), ParamValue::I64(5));
        m.insert("/schema/version".into(), ParamValue::I64(1));
        m.insert("/data/sample-rate".into(), ParamValue::F64(100_002.0));
        m.insert("/data/type".into(), ParamValue::Str("complex".into()));
        let src = FakeSource(m);
        let err = check_signal_params(&src, 5, 1, 100_000.0).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::RateMismatch { .. })));
    }

    #[test]
    fn rate_within_one_hz_is_accepted() {
        let mut m = HashMap::new();
        m.insert("/schema/id".into(), ParamValue::I64(5));
        m.insert("/schema/version".into(), ParamValue::I64(1));
        m.insert("/data/sample-rate".into(), ParamValue::F64(100_000.5));
        m.insert("/data/type".into(), ParamValue::Str("complex".into()));
        let src = FakeSource(m);
        check_signal_params(&src, 5, 1, 100_000.0).unwrap();
    }
}
