use std::fs;
use std::path::{Path, PathBuf};

use distortionizer_session::{CalibrationRecord, CalibrationSession};
use log::info;

use crate::{ConfigError, HmdConfig};

/// File name used when no path is configured.
pub const DEFAULT_CONFIG_FILE: &str = "HMD_Config.json";

/// File-backed calibration document.
///
/// The last document read is kept as a template, so a save after a load
/// only rewrites the calibrated values.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    template: Option<HmdConfig>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingConfigFile`] if the file does not exist.
    /// - [`ConfigError::MalformedConfigRecord`] for a missing or mistyped
    ///   field.
    /// - [`ConfigError::Io`] if the file cannot be read.
    pub fn load(&mut self) -> Result<CalibrationRecord, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::MissingConfigFile {
                path: self.path.clone(),
            });
        }
        let text = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document = HmdConfig::from_json_str(&text)?;
        let record = document.to_record();
        record.validate()?;
        self.template = Some(document);
        info!("loaded calibration from {}", self.path.display());
        Ok(record)
    }

    /// Write `record`, merged into the last loaded document if there is one.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Session`] if `record` holds a non-finite value;
    ///   neither the file nor the template is touched.
    /// - [`ConfigError::Io`] if the file cannot be written.
    pub fn save(&mut self, record: &CalibrationRecord) -> Result<(), ConfigError> {
        record.validate()?;
        let document = self
            .template
            .get_or_insert_with(|| HmdConfig::from_record(record));
        document.apply_record(record);
        let text = document.to_json_string_pretty()?;
        fs::write(&self.path, text).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("saved calibration to {}", self.path.display());
        Ok(())
    }

    /// Load the document into `session`. On error the session is untouched.
    pub fn load_into(&mut self, session: &mut CalibrationSession) -> Result<(), ConfigError> {
        let record = self.load()?;
        session.load_record(&record)?;
        Ok(())
    }

    pub fn save_from(&mut self, session: &CalibrationSession) -> Result<(), ConfigError> {
        self.save(&session.export_record())
    }
}
