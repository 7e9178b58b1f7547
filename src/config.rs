use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::TcxError;

const CONFIG_DIR_NAME: &str = "tcxride";
const CONFIG_FILE_NAME: &str = "config.json";

/// Gap, in seconds, at or above which a reported gap is kept as-is instead of
/// being filled with interpolated samples.
pub const DEFAULT_HIGH_WATER_MARK_S: i64 = 25;

/// What to do with field text that does not parse as a number.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedNumberPolicy {
    /// Use zero for the field.
    #[default]
    Zero,
    /// Reuse the last value parsed for the same field in the current activity.
    LastKnown,
    /// Use zero and mark the activity invalid.
    Reject,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DecoderConfig {
    /// Fill sub-threshold gaps with one-second interpolated samples
    pub smart_recording: bool,
    /// Gap threshold for smart recording, non-positive values fall back to the default
    pub high_water_mark_s: i64,
    pub malformed_numbers: MalformedNumberPolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            smart_recording: true,
            high_water_mark_s: DEFAULT_HIGH_WATER_MARK_S,
            malformed_numbers: MalformedNumberPolicy::Zero,
        }
    }
}

impl DecoderConfig {
    /// Returns a copy with the high-water mark forced into its valid range.
    pub fn normalized(mut self) -> Self {
        self.high_water_mark_s = self.normalized_hwm();
        self
    }

    /// Upper bound on the number of samples synthesized for a single gap.
    pub fn synthesis_cap(&self) -> usize {
        usize::try_from(self.normalized_hwm())
            .unwrap_or(usize::MAX)
            .saturating_mul(300)
    }

    pub(crate) fn normalized_hwm(&self) -> i64 {
        if self.high_water_mark_s <= 0 {
            DEFAULT_HIGH_WATER_MARK_S
        } else {
            self.high_water_mark_s
        }
    }

    pub fn default_path() -> Result<PathBuf, TcxError> {
        Ok(dirs::config_dir()
            .ok_or(TcxError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Loads the config stored in the user's config directory, falling back
    /// to defaults when no file has been saved yet.
    pub fn from_local_file() -> Result<Self, TcxError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, TcxError> {
        if !config_path.exists() {
            debug!("No config file at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let file = std::fs::File::open(config_path)
            .map_err(|e| TcxError::ConfigIOError { source: e })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| TcxError::ConfigSerializeError { source: e })?;
        Ok(config.normalized())
    }

    pub fn save(&self) -> Result<(), TcxError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), TcxError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TcxError::ConfigIOError { source: e })?;
            }
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| TcxError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| TcxError::ConfigSerializeError { source: e })
    }
}
