use log::{debug, info, warn};

use crate::config::DecoderConfig;

use super::accumulator::FieldAccumulator;
use super::derive::derive_motion;
use super::element::ElementKind;
use super::number::{meters_to_km, parse_decimal};
use super::resample::ResamplePolicy;
use super::segmenter::{ActivitySegmenter, LapState};
use super::source::{TagEventHandler, attribute};
use super::timestamp::{parse_timestamp, secs_between};
use super::{Activity, ActivityIssue, Sample, Sport};

/// Push-driven decoder turning markup events into activities.
///
/// One decoder handles one input stream. Activities are finalized when the
/// next Activity opens or when [`TcxDecoder::finish`] is called.
pub struct TcxDecoder {
    policy: ResamplePolicy,
    accumulator: FieldAccumulator,
    current: Option<ActivitySegmenter>,
    finished: Vec<Activity>,
    text: String,
    in_trackpoint: bool,
    in_heart_rate: bool,
}

impl TcxDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        let config = config.normalized();
        Self {
            policy: ResamplePolicy::new(&config),
            accumulator: FieldAccumulator::new(config.malformed_numbers),
            current: None,
            finished: Vec::new(),
            text: String::new(),
            in_trackpoint: false,
            in_heart_rate: false,
        }
    }

    /// Activities completed so far, not including the one still open.
    pub fn activities(&self) -> &[Activity] {
        &self.finished
    }

    pub fn finish(mut self) -> Vec<Activity> {
        self.finalize_current();
        info!(
            "Decoded {} activities with {} samples",
            self.finished.len(),
            self.finished.iter().map(|a| a.samples.len()).sum::<usize>()
        );
        self.finished
    }

    fn finalize_current(&mut self) {
        if let Some(segmenter) = self.current.take() {
            self.finished.push(segmenter.finish());
        }
        self.in_trackpoint = false;
        self.in_heart_rate = false;
    }

    fn open_trackpoint(&mut self) {
        match &self.current {
            Some(segmenter) if segmenter.state() == LapState::InLap => {
                self.accumulator.start_trackpoint();
                self.in_trackpoint = true;
            }
            _ => warn!("Ignoring trackpoint outside of a lap"),
        }
    }

    fn close_trackpoint(&mut self) {
        if !self.in_trackpoint {
            warn!("Ignoring trackpoint close without a matching open");
            return;
        }
        self.in_trackpoint = false;
        self.in_heart_rate = false;
        let Some(segmenter) = self.current.as_mut() else {
            return;
        };

        let mut raw = self.accumulator.current().clone();
        let Some(time) = raw.time.or(segmenter.last_time()) else {
            warn!("Ignoring trackpoint without a usable time");
            return;
        };
        let origin = segmenter.anchor(time);
        let delta_s = segmenter
            .last_time()
            .map_or(0, |last| secs_between(&last, &time));

        derive_motion(&mut raw, segmenter.last_distance_km(), delta_s as f64);
        let bad_gps = raw.has_bad_gps();
        segmenter.observe_swim(bad_gps, raw.distance_km);

        let sample = Sample {
            secs: secs_between(&origin, &time) as f64,
            cadence: raw.cadence,
            heart_rate: raw.heart_rate,
            distance_km: raw.distance_km,
            speed_kph: raw.speed_kph,
            torque_nm: raw.torque_nm,
            power_w: raw.power_w,
            altitude_m: raw.altitude_m,
            longitude: raw.longitude,
            latitude: raw.latitude,
            headwind_kph: raw.headwind_kph,
            run_cadence: raw.run_cadence,
            lap: segmenter.lap(),
        };
        segmenter.emit(sample, bad_gps, &self.policy);
        segmenter.advance_clock(time, raw.distance_km);
    }

    fn close_field(&mut self, kind: ElementKind, name: &str) {
        let Some(segmenter) = self.current.as_mut() else {
            return;
        };

        if !self.in_trackpoint {
            // lap summary values, only the ones the pause fill needs
            match (kind, segmenter.state()) {
                (ElementKind::TotalTimeSeconds, LapState::InLap) => {
                    if let Some(secs) = parse_decimal(&self.text) {
                        segmenter.set_lap_duration(secs);
                    }
                }
                (ElementKind::DistanceMeters, LapState::InLap) => {
                    if let Some(meters) = parse_decimal(&self.text) {
                        segmenter.set_lap_distance(meters_to_km(meters));
                    }
                }
                _ => {}
            }
            return;
        }

        match kind {
            ElementKind::Time => match parse_timestamp(&self.text) {
                Some(time) => self.accumulator.set_time(time),
                None => segmenter.record_issue(ActivityIssue::InvalidTimestamp {
                    value: self.text.clone(),
                }),
            },
            ElementKind::Value if !self.in_heart_rate => {}
            _ => {
                if let Some(field) = kind.trackpoint_field() {
                    if let Err(issue) = self.accumulator.apply(field, name, &self.text) {
                        segmenter.record_issue(issue);
                    }
                }
            }
        }
    }
}

impl TagEventHandler for TcxDecoder {
    fn open_element(&mut self, name: &str, attributes: &[(String, String)]) {
        self.text.clear();
        match ElementKind::from_name(name) {
            ElementKind::Activity => {
                self.finalize_current();
                let sport = Sport::from_attribute(attribute(attributes, "Sport"));
                self.accumulator.start_activity();
                self.current = Some(ActivitySegmenter::new(sport));
            }
            ElementKind::Lap => match self.current.as_mut() {
                Some(segmenter) => segmenter.open_lap(attribute(attributes, "StartTime")),
                None => warn!("Ignoring lap outside of an activity"),
            },
            ElementKind::Trackpoint => self.open_trackpoint(),
            ElementKind::HeartRateBpm => self.in_heart_rate = true,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn close_element(&mut self, name: &str) {
        match ElementKind::from_name(name) {
            ElementKind::Trackpoint => self.close_trackpoint(),
            ElementKind::Lap => match self.current.as_mut() {
                Some(segmenter) => segmenter.close_lap(&self.policy),
                None => debug!("Ignoring lap close outside of an activity"),
            },
            ElementKind::HeartRateBpm => self.in_heart_rate = false,
            ElementKind::Activity | ElementKind::Other => {}
            kind => self.close_field(kind, name),
        }
    }
}
