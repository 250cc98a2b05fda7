//! SteamVR-style calibration document.
//!
//! ```json
//! {
//!   "tracking_to_eye_transform": [
//!     {
//!       "intrinsics": [[1.2, 0.0, 0.01], [0.0, 1.08, 0.0], [0.0, 0.0, 1.0]],
//!       "distortion":      { "center_x": 0.01, "center_y": 0.0, "coeffs": [0.2, 0.05, 0.0] },
//!       "distortion_blue": { "center_x": 0.01, "center_y": 0.0, "coeffs": [0.21, 0.05, 0.0] },
//!       "distortion_red":  { "center_x": 0.01, "center_y": 0.0, "coeffs": [0.19, 0.05, 0.0] }
//!     },
//!     { "...": "right eye" }
//!   ]
//! }
//! ```
//!
//! Index 0 is the left eye. Every other key, at any of these levels, is kept
//! in `extra` and written back unchanged.

use distortionizer_core::{Channel, Eye, Real, Selector};
use distortionizer_session::{CalibrationRecord, EyeRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ConfigError;

const ROOT: &str = "tracking_to_eye_transform";
const BLOCKS: [&str; 3] = ["distortion", "distortion_blue", "distortion_red"];

/// Radial distortion block of one color channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistortionBlock {
    pub center_x: Real,
    pub center_y: Real,
    /// At least three entries; only the first three are calibrated.
    pub coeffs: Vec<Real>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DistortionBlock {
    fn new(center: [Real; 2], coeffs: [Real; 3]) -> Self {
        Self {
            center_x: center[0],
            center_y: center[1],
            coeffs: coeffs.to_vec(),
            extra: Map::new(),
        }
    }

    /// First three coefficients; missing entries read as zero.
    fn radial(&self) -> [Real; 3] {
        let mut k = [0.0; 3];
        for (dst, src) in k.iter_mut().zip(&self.coeffs) {
            *dst = *src;
        }
        k
    }
}

/// Parameters of one eye.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeTransform {
    pub intrinsics: [[Real; 3]; 3],
    pub distortion: DistortionBlock,
    pub distortion_blue: DistortionBlock,
    pub distortion_red: DistortionBlock,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EyeTransform {
    pub fn block(&self, channel: Channel) -> &DistortionBlock {
        match channel {
            Channel::Green => &self.distortion,
            Channel::Blue => &self.distortion_blue,
            Channel::Red => &self.distortion_red,
        }
    }

    pub fn block_mut(&mut self, channel: Channel) -> &mut DistortionBlock {
        match channel {
            Channel::Green => &mut self.distortion,
            Channel::Blue => &mut self.distortion_blue,
            Channel::Red => &mut self.distortion_red,
        }
    }

    fn from_record(rec: &EyeRecord) -> Self {
        Self {
            intrinsics: rec.intrinsics,
            distortion: DistortionBlock::new(rec.center, rec.green),
            distortion_blue: DistortionBlock::new(rec.center, rec.blue),
            distortion_red: DistortionBlock::new(rec.center, rec.red),
            extra: Map::new(),
        }
    }

    fn to_record(&self) -> EyeRecord {
        EyeRecord {
            center: [self.distortion.center_x, self.distortion.center_y],
            intrinsics: self.intrinsics,
            green: self.distortion.radial(),
            blue: self.distortion_blue.radial(),
            red: self.distortion_red.radial(),
        }
    }

    fn apply_record(&mut self, rec: &EyeRecord) {
        self.intrinsics = rec.intrinsics;
        for channel in Channel::EVERY {
            let block = self.block_mut(channel);
            block.center_x = rec.center[0];
            block.center_y = rec.center[1];
            if block.coeffs.len() < 3 {
                block.coeffs.resize(3, 0.0);
            }
            block.coeffs[..3].copy_from_slice(rec.coefficients(channel));
        }
    }
}

/// Whole calibration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmdConfig {
    pub tracking_to_eye_transform: Vec<EyeTransform>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HmdConfig {
    /// Minimal document holding only what `record` describes.
    pub fn from_record(record: &CalibrationRecord) -> Self {
        Self {
            tracking_to_eye_transform: record.eyes.iter().map(EyeTransform::from_record).collect(),
            extra: Map::new(),
        }
    }

    /// Parse and validate a document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MalformedConfigRecord`] naming the first missing or
    /// mistyped field, e.g. `tracking_to_eye_transform[1].distortion_red.coeffs`.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| ConfigError::malformed("<document>", e.to_string()))?;
        check_schema(&root)?;
        serde_json::from_value(root).map_err(|e| ConfigError::malformed(ROOT, e.to_string()))
    }

    pub fn to_json_string_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn eye(&self, eye: Eye) -> &EyeTransform {
        &self.tracking_to_eye_transform[eye.index()]
    }

    pub fn to_record(&self) -> CalibrationRecord {
        CalibrationRecord {
            eyes: [
                self.eye(Eye::Left).to_record(),
                self.eye(Eye::Right).to_record(),
            ],
        }
    }

    /// Overwrite the calibrated values with `record`, keeping everything
    /// else.
    pub fn apply_record(&mut self, record: &CalibrationRecord) {
        for eye in Eye::BOTH {
            self.tracking_to_eye_transform[eye.index()].apply_record(record.eye(eye));
        }
    }
}

fn check_schema(root: &Value) -> Result<(), ConfigError> {
    let eyes = root
        .get(ROOT)
        .ok_or_else(|| ConfigError::malformed(ROOT, "is missing"))?
        .as_array()
        .ok_or_else(|| ConfigError::malformed(ROOT, "is not an array"))?;
    if eyes.len() != 2 {
        return Err(ConfigError::malformed(
            ROOT,
            format!("has {} entries, expected 2", eyes.len()),
        ));
    }

    for (i, eye) in eyes.iter().enumerate() {
        let path = format!("{ROOT}[{i}]");
        let intrinsics = member(eye, &path, "intrinsics")?;
        let rows = array_of_len(intrinsics, &format!("{path}.intrinsics"), 3, 3)?;
        for (r, row) in rows.iter().enumerate() {
            let row_path = format!("{path}.intrinsics[{r}]");
            let cols = array_of_len(row, &row_path, 3, 3)?;
            for (c, v) in cols.iter().enumerate() {
                number(v, &format!("{row_path}[{c}]"))?;
            }
        }

        for name in BLOCKS {
            let block_path = format!("{path}.{name}");
            let block = member(eye, &path, name)?;
            for key in ["center_x", "center_y"] {
                number(member(block, &block_path, key)?, &format!("{block_path}.{key}"))?;
            }
            let coeffs_path = format!("{block_path}.coeffs");
            let coeffs = member(block, &block_path, "coeffs")?;
            let coeffs = array_of_len(coeffs, &coeffs_path, 3, usize::MAX)?;
            for (j, v) in coeffs.iter().enumerate() {
                number(v, &format!("{coeffs_path}[{j}]"))?;
            }
        }
    }
    Ok(())
}

fn member<'a>(value: &'a Value, path: &str, key: &str) -> Result<&'a Value, ConfigError> {
    let object = value
        .as_object()
        .ok_or_else(|| ConfigError::malformed(path, "is not an object"))?;
    object
        .get(key)
        .ok_or_else(|| ConfigError::malformed(format!("{path}.{key}"), "is missing"))
}

fn array_of_len<'a>(
    value: &'a Value,
    path: &str,
    min: usize,
    max: usize,
) -> Result<&'a Vec<Value>, ConfigError> {
    let items = value
        .as_array()
        .ok_or_else(|| ConfigError::malformed(path, "is not an array"))?;
    if items.len() < min || items.len() > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("at least {min}")
        };
        return Err(ConfigError::malformed(
            path,
            format!("has {} entries, expected {expected}", items.len()),
        ));
    }
    Ok(items)
}

fn number(value: &Value, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(ConfigError::malformed(path, "is not a number"))
    }
}
