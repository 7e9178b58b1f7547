use std::collections::HashMap;

use chrono::{DateTime, Local};
use log::warn;

use crate::config::MalformedNumberPolicy;

use super::ActivityIssue;
use super::element::Field;
use super::number::{meters_to_km, mps_to_kph, parse_decimal};

/// Distance value meaning "not reported by this trackpoint".
pub const DISTANCE_UNSET: f64 = -1.0;

/// Scratch state for the Trackpoint currently being read.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSample {
    pub time: Option<DateTime<Local>>,
    pub cadence: f64,
    pub heart_rate: f64,
    /// Cumulative distance in km, [`DISTANCE_UNSET`] until parsed or derived
    pub distance_km: f64,
    pub speed_kph: f64,
    pub torque_nm: f64,
    pub power_w: f64,
    pub altitude_m: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub run_cadence: f64,
    pub headwind_kph: f64,
}

impl Default for RawSample {
    fn default() -> Self {
        Self {
            time: None,
            cadence: 0.,
            heart_rate: 0.,
            distance_km: DISTANCE_UNSET,
            speed_kph: 0.,
            torque_nm: 0.,
            power_w: 0.,
            altitude_m: 0.,
            longitude: 0.,
            latitude: 0.,
            run_cadence: 0.,
            headwind_kph: 0.,
        }
    }
}

impl RawSample {
    pub fn has_distance(&self) -> bool {
        self.distance_km >= 0.
    }

    pub fn has_bad_gps(&self) -> bool {
        self.latitude == 0. && self.longitude == 0.
    }

    fn field_mut(&mut self, field: Field) -> &mut f64 {
        match field {
            Field::Distance => &mut self.distance_km,
            Field::Power => &mut self.power_w,
            Field::Speed => &mut self.speed_kph,
            Field::RunCadence => &mut self.run_cadence,
            Field::HeartRate => &mut self.heart_rate,
            Field::Cadence => &mut self.cadence,
            Field::Altitude => &mut self.altitude_m,
            Field::Longitude => &mut self.longitude,
            Field::Latitude => &mut self.latitude,
        }
    }
}

/// Collects field text into the sample under construction.
pub struct FieldAccumulator {
    current: RawSample,
    policy: MalformedNumberPolicy,
    /// Last value successfully parsed per field, in file units
    last_parsed: HashMap<Field, f64>,
}

impl FieldAccumulator {
    pub fn new(policy: MalformedNumberPolicy) -> Self {
        Self {
            current: RawSample::default(),
            policy,
            last_parsed: HashMap::new(),
        }
    }

    /// Forgets per-activity parse history. Altitude carries over.
    pub fn start_activity(&mut self) {
        self.last_parsed.clear();
    }

    /// Resets the scratch sample for a new Trackpoint, keeping the running altitude.
    pub fn start_trackpoint(&mut self) {
        self.current = RawSample {
            altitude_m: self.current.altitude_m,
            ..RawSample::default()
        };
    }

    pub fn current(&self) -> &RawSample {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut RawSample {
        &mut self.current
    }

    pub fn set_time(&mut self, time: DateTime<Local>) {
        self.current.time = Some(time);
    }

    /// Parses `text` into `field`.
    ///
    /// Unparsable text is resolved through the configured policy; the only
    /// error is a rejected number under [`MalformedNumberPolicy::Reject`].
    pub fn apply(&mut self, field: Field, element: &str, text: &str) -> Result<(), ActivityIssue> {
        let value = match parse_decimal(text) {
            Some(value) => {
                self.last_parsed.insert(field, value);
                value
            }
            None => {
                warn!(
                    "Malformed number {:?} in <{}>, applying {:?} policy",
                    text, element, self.policy
                );
                match self.policy {
                    MalformedNumberPolicy::Zero => 0.,
                    MalformedNumberPolicy::LastKnown => {
                        self.last_parsed.get(&field).copied().unwrap_or(0.)
                    }
                    MalformedNumberPolicy::Reject => {
                        self.store(field, 0.);
                        return Err(ActivityIssue::MalformedNumber {
                            element: element.to_string(),
                            text: text.to_string(),
                        });
                    }
                }
            }
        };
        self.store(field, value);
        Ok(())
    }

    fn store(&mut self, field: Field, value: f64) {
        let converted = match field {
            // zero altitude readings are device noise, keep the running value
            Field::Altitude if value == 0. => return,
            Field::Distance => meters_to_km(value),
            Field::Speed => mps_to_kph(value),
            _ => value,
        };
        *self.current.field_mut(field) = converted;
    }
}
