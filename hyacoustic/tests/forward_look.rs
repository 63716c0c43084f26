//! End-to-end forward-look DOA exercise against the in-memory store: S3
//! (field-of-view), S7 (in-phase pair), and the timestamp-pairing invariant
//! from `spec.md` §8.

use hyacoustic::prelude::*;
use hyacoustic_dsp::encode_complex;
use hyacoustic_model::{schema, ParamValue};
use std::collections::HashMap;
use std::sync::Arc;

fn channel_params(x: f64, sample_rate: f64, carrier: f64) -> HashMap<String, ParamValue> {
    let mut m = HashMap::new();
    m.insert("/schema/id".into(), ParamValue::I64(schema::ANTENNA_OFFSET_SCHEMA_ID));
    m.insert("/schema/version".into(), ParamValue::I64(schema::ANTENNA_OFFSET_SCHEMA_VERSION));
    m.insert("/position/x".into(), ParamValue::F64(x));
    m.insert("/position/y".into(), ParamValue::F64(0.0));
    m.insert("/position/z".into(), ParamValue::F64(0.0));
    m.insert("/position/psi".into(), ParamValue::F64(0.0));
    m.insert("/position/gamma".into(), ParamValue::F64(0.0));
    m.insert("/position/theta".into(), ParamValue::F64(0.0));
    m.insert("/data/type".into(), ParamValue::Str("complex".into()));
    m.insert("/data/sample-rate".into(), ParamValue::F64(sample_rate));
    m.insert("/data/carrier-frequency".into(), ParamValue::F64(carrier));
    m.insert("/data/bandwidth".into(), ParamValue::F64(1000.0));
    m.insert("/antenna/h-aperture".into(), ParamValue::F64(1.0));
    m.insert("/antenna/v-aperture".into(), ParamValue::F64(1.0));
    m.insert("/antenna/frequency".into(), ParamValue::F64(carrier));
    m.insert("/antenna/bandwidth".into(), ParamValue::F64(1000.0));
    m.insert("/adc/vref".into(), ParamValue::F64(5.0));
    m.insert("/adc/offset".into(), ParamValue::I64(0));
    m
}

fn build_store(base: f64, sample_rate: f64, carrier: f64) -> Arc<MemStore> {
    let store = Arc::new(MemStore::new());
    store.create_channel("P", "T", "forward-look-1", channel_params(0.0, sample_rate, carrier));
    store.create_channel("P", "T", "forward-look-2", channel_params(base, sample_rate, carrier));
    store
}

#[test]
fn zero_base_is_rejected_at_construction() {
    let store = build_store(0.0, 100_000.0, 100_000.0);
    let err = ForwardLookReader::open(store, None, "P", "T").unwrap_err();
    assert!(matches!(err, Error::BadGeometry(_)));
}

#[test]
fn s3_alpha_matches_spec_example_end_to_end() {
    let store = build_store(0.06, 100_000.0, 100_000.0);
    let mut reader = ForwardLookReader::open(store, None, "P", "T").unwrap();
    reader.set_sound_velocity(1500.0);
    assert!((reader.alpha() - 0.12532783f64).abs() < 1e-6);
}

#[test]
fn s7_in_phase_pair_has_zero_angle_and_product_amplitude_end_to_end() {
    let store = build_store(0.06, 100_000.0, 100_000.0);
    store.append("P", "T", "forward-look-1", encode_complex(&[Complex::new(2.0, 0.0)]), 100);
    store.append("P", "T", "forward-look-2", encode_complex(&[Complex::new(2.0, 0.0)]), 100);

    let mut reader = ForwardLookReader::open(store, None, "P", "T").unwrap();
    let points = reader.doa(0).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].angle, 0.0);
    assert_eq!(points[0].amplitude, 4.0);
}

#[test]
fn mismatched_timestamps_are_unavailable() {
    let store = build_store(0.06, 100_000.0, 100_000.0);
    store.append("P", "T", "forward-look-1", encode_complex(&[Complex::new(1.0, 0.0)]), 100);
    store.append("P", "T", "forward-look-2", encode_complex(&[Complex::new(1.0, 0.0)]), 999);

    let mut reader = ForwardLookReader::open(store, None, "P", "T").unwrap();
    assert!(matches!(reader.doa(0), Err(Error::Unavailable(_))));
}

#[test]
fn doa_result_is_cached_per_sound_velocity() {
    let store = Arc::new(MemStore::new());
    store.create_channel("P", "T", "forward-look-1", channel_params(0.0, 100_000.0, 100_000.0));
    store.create_channel("P", "T", "forward-look-2", channel_params(0.06, 100_000.0, 100_000.0));
    store.append(
        "P",
        "T",
        "forward-look-1",
        encode_complex(&[Complex::new(2.0, 1.0), Complex::new(1.0, 1.0)]),
        100,
    );
    store.append(
        "P",
        "T",
        "forward-look-2",
        encode_complex(&[Complex::new(1.0, 2.0), Complex::new(1.0, 1.0)]),
        100,
    );

    let mut reader =
        ForwardLookReader::open(Arc::clone(&store), Some(store.clone()), "P", "T").unwrap();

    let at_1500 = reader.doa(0).unwrap().to_vec();
    reader.set_sound_velocity(1450.0);
    let at_1450 = reader.doa(0).unwrap().to_vec();

    // Distance at range bin 1 scales with sound velocity; the two
    // detail-keyed cache entries must not collide.
    assert_ne!(at_1500[1].distance, at_1450[1].distance);
}

#[test]
fn mismatched_carrier_frequency_is_bad_geometry() {
    let store = Arc::new(MemStore::new());
    store.create_channel("P", "T", "forward-look-1", channel_params(0.0, 100_000.0, 100_000.0));
    store.create_channel("P", "T", "forward-look-2", channel_params(0.06, 100_000.0, 100_500.0));
    let err = ForwardLookReader::open(store, None, "P", "T").unwrap_err();
    assert!(matches!(err, Error::BadGeometry(_)));
}
