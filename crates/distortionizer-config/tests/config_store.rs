use std::fs;

use distortionizer_config::{ConfigError, ConfigStore, HmdConfig};
use distortionizer_core::{Channel, Eye, ScreenSize, Term};
use distortionizer_session::{CalibrationSession, Command, Direction};
use serde_json::{json, Value};
use tempfile::{tempdir, NamedTempFile};

fn block(center: [f64; 2], coeffs: &[f64]) -> Value {
    json!({ "center_x": center[0], "center_y": center[1], "coeffs": coeffs })
}

fn sample_document() -> Value {
    let awkward = 0.1 + 0.2;
    json!({
        "tracking_to_eye_transform": [
            {
                "intrinsics": [[1.2000000000000002, 0.0, 0.012345678901234567], [0.0, 1.08, -3.3e-17], [0.0, 0.0, 1.0]],
                "distortion": block([0.012345678901234567, -3.3e-17], &[awkward, 0.07, 1e-9]),
                "distortion_blue": block([0.012345678901234567, -3.3e-17], &[0.25, -0.011, 5e-324]),
                "distortion_red": block([0.012345678901234567, -3.3e-17], &[0.2, 0.01, 0.001, 0.0]),
                "extrinsics": [[1.0, 0.0, 0.0, -0.0315], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]]
            },
            {
                "intrinsics": [[1.2, 0.0, -0.01], [0.0, 1.08, 0.002], [0.0, 0.0, 1.0]],
                "distortion": block([-0.01, 0.002], &[0.31, 0.07, 0.0]),
                "distortion_blue": block([-0.01, 0.002], &[0.33, 0.07, 0.0]),
                "distortion_red": block([-0.01, 0.002], &[0.29, 0.07, 0.0])
            }
        ],
        "manufacturer": "HTC",
        "lighthouse_config": { "modelNormals": [[0, 0, 1]] }
    })
}

fn write_sample() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), serde_json::to_string_pretty(&sample_document()).unwrap()).unwrap();
    file
}

fn bits(record: &distortionizer_session::CalibrationRecord) -> Vec<u64> {
    record
        .eyes
        .iter()
        .flat_map(|eye| {
            eye.center
                .iter()
                .chain(eye.intrinsics.iter().flatten())
                .chain(eye.green.iter())
                .chain(eye.blue.iter())
                .chain(eye.red.iter())
                .map(|v| v.to_bits())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn save_then_load_is_bit_exact() {
    let file = write_sample();
    let mut store = ConfigStore::new(file.path());
    let mut session = CalibrationSession::new(ScreenSize::default());
    store.load_into(&mut session).unwrap();
    let loaded = session.export_record();

    store.save_from(&session).unwrap();

    let mut again = CalibrationSession::new(ScreenSize::default());
    ConfigStore::new(file.path()).load_into(&mut again).unwrap();
    assert_eq!(bits(&again.export_record()), bits(&loaded));
    assert_eq!(
        again.coefficients().value(Eye::Left, Channel::Green, Term::First),
        0.1 + 0.2
    );
    assert_eq!(
        again.coefficients().value(Eye::Left, Channel::Blue, Term::Third),
        5e-324
    );
}

#[test]
fn load_derives_centers_from_intrinsics() {
    let file = write_sample();
    let mut session = CalibrationSession::new(ScreenSize::default());
    ConfigStore::new(file.path()).load_into(&mut session).unwrap();

    let right = session.cop(Eye::Right);
    assert!((right.x - (1620.0 - 16.2)).abs() < 1e-9);
    assert!((right.y - 601.2).abs() < 1e-9);
}

#[test]
fn unknown_fields_survive_a_tuning_pass() {
    let file = write_sample();
    let mut store = ConfigStore::new(file.path());
    let mut session = CalibrationSession::new(ScreenSize::default());
    store.load_into(&mut session).unwrap();

    session.apply(Command::AdjustCoefficient(Direction::Reset)).unwrap();
    store.save_from(&session).unwrap();

    let saved: Value = serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    assert_eq!(saved["manufacturer"], "HTC");
    assert_eq!(saved["lighthouse_config"]["modelNormals"][0][2], 1);
    let left = &saved["tracking_to_eye_transform"][0];
    assert_eq!(left["extrinsics"][0][3], -0.0315);
    assert_eq!(left["distortion_red"]["coeffs"].as_array().unwrap().len(), 4);
    assert_eq!(left["distortion_red"]["coeffs"][0], 0.0);
    // Centers are written from the intrinsics offsets.
    assert_eq!(left["distortion_blue"]["center_x"], 0.012345678901234567);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("HMD_Config.json");
    let mut store = ConfigStore::new(&path);
    match store.load() {
        Err(ConfigError::MissingConfigFile { path: reported }) => assert_eq!(reported, path),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn malformed_file_leaves_session_untouched() {
    let mut document = sample_document();
    document["tracking_to_eye_transform"][1]["distortion_blue"]
        .as_object_mut()
        .unwrap()
        .remove("center_y");
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), document.to_string()).unwrap();

    let mut session = CalibrationSession::new(ScreenSize::default());
    session.apply(Command::AdjustCoefficient(Direction::Increase)).unwrap();
    let before = session.export_record();

    let err = ConfigStore::new(file.path())
        .load_into(&mut session)
        .unwrap_err();
    match err {
        ConfigError::MalformedConfigRecord { field, .. } => {
            assert_eq!(field, "tracking_to_eye_transform[1].distortion_blue.center_y")
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(session.export_record(), before);
}

#[test]
fn save_without_template_writes_fresh_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.json");
    let mut session = CalibrationSession::new(ScreenSize::default());
    session.apply(Command::AdjustCoefficient(Direction::Increase)).unwrap();

    ConfigStore::new(&path).save_from(&session).unwrap();

    let document = HmdConfig::from_json_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document.to_record(), session.export_record());
}

#[test]
fn non_finite_record_is_never_written() {
    let file = write_sample();
    let before = fs::read_to_string(file.path()).unwrap();
    let mut store = ConfigStore::new(file.path());
    let mut record = store.load().unwrap();
    record.eyes[0].green[0] = f64::NAN;

    let err = store.save(&record).unwrap_err();
    assert!(matches!(err, ConfigError::Session(_)));
    assert!(err.to_string().contains("eyes[0].green[0]"));
    assert_eq!(fs::read_to_string(file.path()).unwrap(), before);

    let mut session = CalibrationSession::new(ScreenSize::default());
    store.load_into(&mut session).unwrap();
    store.save_from(&session).unwrap();
}
