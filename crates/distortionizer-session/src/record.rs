use distortionizer_core::{Channel, Eye, Real, Selector};

use crate::SessionError;

/// Persisted parameters of one eye.
///
/// `center` mirrors the intrinsics center offsets (`[0][2]`, `[1][2]`) on
/// export. On load it is validated but otherwise unused: the live center of
/// projection is always derived from `intrinsics`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeRecord {
    pub center: [Real; 2],
    /// Row-major 3×3 intrinsics.
    pub intrinsics: [[Real; 3]; 3],
    pub green: [Real; 3],
    pub blue: [Real; 3],
    pub red: [Real; 3],
}

impl EyeRecord {
    pub fn coefficients(&self, channel: Channel) -> &[Real; 3] {
        match channel {
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
            Channel::Red => &self.red,
        }
    }

    pub fn coefficients_mut(&mut self, channel: Channel) -> &mut [Real; 3] {
        match channel {
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
            Channel::Red => &mut self.red,
        }
    }
}

impl Default for EyeRecord {
    fn default() -> Self {
        Self {
            center: [0.0; 2],
            intrinsics: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            green: [0.0; 3],
            blue: [0.0; 3],
            red: [0.0; 3],
        }
    }
}

/// Plain calibration record exchanged with the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationRecord {
    pub eyes: [EyeRecord; 2],
}

impl CalibrationRecord {
    pub fn eye(&self, eye: Eye) -> &EyeRecord {
        &self.eyes[eye.index()]
    }

    pub fn eye_mut(&mut self, eye: Eye) -> &mut EyeRecord {
        &mut self.eyes[eye.index()]
    }

    /// Reject records holding NaN or infinite values.
    ///
    /// # Errors
    ///
    /// [`SessionError::MalformedRecord`] naming the first offending field,
    /// e.g. `eyes[1].intrinsics[0][2]`.
    pub fn validate(&self) -> Result<(), SessionError> {
        for eye in Eye::BOTH {
            let rec = self.eye(eye);
            let i = eye.index();
            for (j, v) in rec.center.iter().enumerate() {
                check(*v, || format!("eyes[{i}].center[{j}]"))?;
            }
            for (r, row) in rec.intrinsics.iter().enumerate() {
                for (c, v) in row.iter().enumerate() {
                    check(*v, || format!("eyes[{i}].intrinsics[{r}][{c}]"))?;
                }
            }
            for channel in Channel::EVERY {
                for (j, v) in rec.coefficients(channel).iter().enumerate() {
                    check(*v, || format!("eyes[{i}].{channel}[{j}]"))?;
                }
            }
        }
        Ok(())
    }
}

fn check(value: Real, field: impl FnOnce() -> String) -> Result<(), SessionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SessionError::MalformedRecord { field: field() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_valid() {
        assert!(CalibrationRecord::default().validate().is_ok());
    }

    #[test]
    fn reports_offending_field() {
        let mut record = CalibrationRecord::default();
        record.eye_mut(Eye::Right).coefficients_mut(Channel::Blue)[2] = f64::NAN;
        let err = record.validate().unwrap_err();
        assert_eq!(
            err,
            SessionError::MalformedRecord {
                field: "eyes[1].blue[2]".into()
            }
        );

        let mut record = CalibrationRecord::default();
        record.eyes[0].intrinsics[1][2] = f64::INFINITY;
        assert!(record
            .validate()
            .unwrap_err()
            .to_string()
            .contains("eyes[0].intrinsics[1][2]"));
    }
}
