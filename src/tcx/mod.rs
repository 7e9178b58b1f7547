pub mod accumulator;
pub mod decoder;
pub mod derive;
pub mod element;
pub mod number;
pub mod resample;
pub mod segmenter;
pub mod source;
pub mod timestamp;

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub use decoder::TcxDecoder;
pub use source::{TagEventHandler, decode_file, decode_reader, decode_str};

pub const DEVICE_TYPE: &str = "Garmin";
pub const FILE_FORMAT: &str = "Garmin Training Centre (tcx)";
pub const RECORDING_INTERVAL_S: f64 = 1.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Sport {
    Bike,
    Run,
    Swim,
    /// Declared as "Other", may still turn out to be a pool swim
    Other,
    #[default]
    Unknown,
}

impl Sport {
    pub fn from_attribute(sport: Option<&str>) -> Self {
        match sport {
            Some("Biking") => Sport::Bike,
            Some("Running") => Sport::Run,
            Some("Other") => Sport::Other,
            _ => Sport::Unknown,
        }
    }
}

/// One emitted point of the uniform series.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Sample {
    /// Seconds since the activity start
    pub secs: f64,
    pub cadence: f64,
    pub heart_rate: f64,
    /// Cumulative distance in km
    pub distance_km: f64,
    pub speed_kph: f64,
    pub torque_nm: f64,
    pub power_w: f64,
    pub altitude_m: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub headwind_kph: f64,
    pub run_cadence: f64,
    pub lap: u32,
}

impl Sample {
    /// A reading of exactly (0, 0) means the device had no fix.
    pub fn has_bad_gps(&self) -> bool {
        self.latitude == 0. && self.longitude == 0.
    }
}

/// Problems that make an activity unreliable without stopping the decode.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ActivityIssue {
    MissingStartTime,
    InvalidStartTime { value: String },
    InvalidTimestamp { value: String },
    MalformedNumber { element: String, text: String },
}

impl ActivityIssue {
    /// Whether the issue makes the activity unusable as a whole.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ActivityIssue::InvalidTimestamp { .. })
    }
}

/// Activity-level metadata handed to consumers alongside the samples.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityInfo {
    pub sport: Sport,
    pub start_time: Option<DateTime<Local>>,
    pub recording_interval_s: f64,
    pub device_type: String,
    pub file_format: String,
    pub issues: Vec<ActivityIssue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub sport: Sport,
    pub start_time: Option<DateTime<Local>>,
    pub recording_interval_s: f64,
    pub device_type: String,
    pub file_format: String,
    pub samples: Vec<Sample>,
    pub issues: Vec<ActivityIssue>,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            sport: Sport::Unknown,
            start_time: None,
            recording_interval_s: RECORDING_INTERVAL_S,
            device_type: DEVICE_TYPE.to_string(),
            file_format: FILE_FORMAT.to_string(),
            samples: Vec::new(),
            issues: Vec::new(),
        }
    }
}

impl Activity {
    pub fn new(sport: Sport) -> Self {
        Self {
            sport,
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ActivityIssue::is_fatal)
    }

    pub fn info(&self) -> ActivityInfo {
        ActivityInfo {
            sport: self.sport,
            start_time: self.start_time,
            recording_interval_s: self.recording_interval_s,
            device_type: self.device_type.clone(),
            file_format: self.file_format.clone(),
            issues: self.issues.clone(),
        }
    }

    /// Number of distinct laps that produced at least one sample.
    pub fn lap_count(&self) -> usize {
        self.samples.iter().map(|s| s.lap).dedup().count()
    }

    pub fn duration_s(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.secs - first.secs,
            _ => 0.,
        }
    }

    /// Whether sample timestamps never go backwards.
    pub fn is_time_ordered(&self) -> bool {
        self.samples
            .iter()
            .tuple_windows()
            .all(|(a, b)| b.secs >= a.secs)
    }
}
