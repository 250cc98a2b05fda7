use std::fs;
use std::path::{Path, PathBuf};

use distortionizer_core::pattern::PatternOptions;
use distortionizer_core::{CoefficientOrdering, Real, ScreenSize};
use distortionizer_session::{valid_step, SessionOptions};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, DEFAULT_CONFIG_FILE};

/// Console settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub screen_width: u32,
    pub screen_height: u32,
    /// Initial step size.
    pub step: Real,
    pub ordering: CoefficientOrdering,
    /// Calibration document read on start-up and by `load`/`save`.
    pub config_path: PathBuf,
    pub pattern: PatternOptions,
}

impl Default for AppSettings {
    fn default() -> Self {
        let screen = ScreenSize::default();
        Self {
            screen_width: screen.width,
            screen_height: screen.height,
            step: SessionOptions::default().initial_step,
            ordering: CoefficientOrdering::Disabled,
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            pattern: PatternOptions::default(),
        }
    }
}

impl AppSettings {
    /// Read settings from a JSON file. Out-of-range values are bounded as
    /// in [`Self::sanitized`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&text)?;
        Ok(settings.sanitized())
    }

    /// Copy with a usable step size and a drawable pattern layout.
    pub fn sanitized(&self) -> Self {
        Self {
            step: valid_step(self.step),
            pattern: self.pattern.sanitized(),
            ..self.clone()
        }
    }

    pub fn screen(&self) -> ScreenSize {
        ScreenSize::new(self.screen_width, self.screen_height)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            initial_step: self.step,
            ordering: self.ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{ "screen_width": 1920, "ordering": "descending" }"#).unwrap();
        assert_eq!(settings.screen(), ScreenSize::new(1920, 1200));
        assert_eq!(settings.ordering, CoefficientOrdering::Descending);
        assert_eq!(settings.step, 1e-3);
        assert_eq!(settings.config_path, PathBuf::from("HMD_Config.json"));
        assert_eq!(settings.pattern.grid_spacing, 40.0);
    }

    #[test]
    fn session_options_follow_settings() {
        let settings = AppSettings {
            step: 0.01,
            ordering: CoefficientOrdering::StrictlyDescending,
            ..AppSettings::default()
        };
        let options = settings.session_options();
        assert_eq!(options.initial_step, 0.01);
        assert_eq!(options.ordering, CoefficientOrdering::StrictlyDescending);
    }

    #[test]
    fn sanitized_bounds_step_and_pattern() {
        let settings = AppSettings {
            step: -0.5,
            pattern: PatternOptions {
                grid_spacing: 0.01,
                circle_fractions: vec![0.3, 1e6],
            },
            ..AppSettings::default()
        }
        .sanitized();
        assert_eq!(settings.step, 1e-3);
        assert_eq!(settings.pattern.grid_spacing, 1.0);
        assert_eq!(settings.pattern.circle_fractions, vec![0.3]);
    }

    #[test]
    fn loaded_settings_are_sanitized() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{ "step": 0, "pattern": { "grid_spacing": 1e-9, "circle_fractions": [0.7] } }"#,
        )
        .unwrap();
        let settings = AppSettings::load(file.path()).unwrap();
        assert_eq!(settings.step, 1e-3);
        assert_eq!(settings.pattern.grid_spacing, 1.0);
    }
}
