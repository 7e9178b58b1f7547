use chrono::{DateTime, Duration, Local};
use log::{debug, warn};

use super::derive::SwimDetector;
use super::resample::{Emission, ResamplePolicy, interpolate};
use super::timestamp::{parse_timestamp, secs_between};
use super::{Activity, ActivityIssue, Sample, Sport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LapState {
    AwaitingFirstLap,
    InLap,
    BetweenLaps,
}

/// Tracks one activity while it is being decoded: its laps, the running
/// clock used for derivation, and the samples emitted so far.
#[derive(Debug)]
pub struct ActivitySegmenter {
    activity: Activity,
    state: LapState,
    lap: u32,
    swim: SwimDetector,
    /// Time the sample offsets are measured from
    origin: Option<DateTime<Local>>,
    /// Time and distance of the previous trackpoint
    last_time: Option<DateTime<Local>>,
    last_distance_km: f64,
    lap_secs: f64,
    lap_distance_km: Option<f64>,
    lap_has_trackpoints: bool,
}

impl ActivitySegmenter {
    pub fn new(sport: Sport) -> Self {
        debug!("Starting {:?} activity", sport);
        Self {
            activity: Activity::new(sport),
            state: LapState::AwaitingFirstLap,
            lap: 0,
            swim: SwimDetector::new(sport),
            origin: None,
            last_time: None,
            last_distance_km: 0.,
            lap_secs: 0.,
            lap_distance_km: None,
            lap_has_trackpoints: false,
        }
    }

    pub fn state(&self) -> LapState {
        self.state
    }

    pub fn lap(&self) -> u32 {
        self.lap
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn is_swim(&self) -> bool {
        self.swim.is_swim()
    }

    pub fn last_time(&self) -> Option<DateTime<Local>> {
        self.last_time
    }

    pub fn last_distance_km(&self) -> f64 {
        self.last_distance_km
    }

    pub fn record_issue(&mut self, issue: ActivityIssue) {
        warn!("Activity issue: {:?}", issue);
        self.activity.issues.push(issue);
    }

    /// Handles a Lap open. The first lap's start time becomes the activity start.
    pub fn open_lap(&mut self, start_time: Option<&str>) {
        if self.state == LapState::AwaitingFirstLap {
            match start_time.map(|value| (value, parse_timestamp(value))) {
                Some((_, Some(time))) => {
                    self.activity.start_time = Some(time);
                    self.origin = Some(time);
                    self.last_time = Some(time);
                }
                Some((value, None)) => self.record_issue(ActivityIssue::InvalidStartTime {
                    value: value.to_string(),
                }),
                None => self.record_issue(ActivityIssue::MissingStartTime),
            }
            self.last_distance_km = 0.;
        }
        self.lap += 1;
        self.lap_secs = 0.;
        self.lap_distance_km = None;
        self.lap_has_trackpoints = false;
        self.state = LapState::InLap;
        debug!("Lap {} opened", self.lap);
    }

    pub fn set_lap_duration(&mut self, secs: f64) {
        self.lap_secs = secs;
    }

    pub fn set_lap_distance(&mut self, distance_km: f64) {
        self.lap_distance_km = Some(distance_km);
    }

    /// Handles a Lap close, filling swim pauses with zero-valued samples.
    pub fn close_lap(&mut self, policy: &ResamplePolicy) {
        if self.state != LapState::InLap {
            warn!("Ignoring lap close outside of a lap");
            return;
        }
        self.state = LapState::BetweenLaps;

        // a pause lap reports no distance and carries no trackpoints
        let is_pause = self.lap_distance_km == Some(0.) && !self.lap_has_trackpoints;
        if !(self.swim.is_swim() && is_pause && policy.smart_recording()) {
            return;
        }

        let pause_s = self.lap_secs.round().max(0.);
        let count = (pause_s as usize).min(policy.cap());
        let clock_s = match (self.origin, self.last_time) {
            (Some(origin), Some(last)) => secs_between(&origin, &last) as f64,
            _ => 0.,
        };
        let base_s = self
            .activity
            .samples
            .last()
            .map_or(clock_s, |s| s.secs.max(clock_s));
        debug!("Filling {}s swim pause in lap {}", count, self.lap);

        let (distance_km, lap) = (self.last_distance_km, self.lap);
        self.activity
            .samples
            .extend((1..=count).map(|i| Sample {
                secs: base_s + i as f64,
                distance_km,
                lap,
                ..Default::default()
            }));
        if let Some(last) = self.last_time {
            let advance =
                |secs: i64| Duration::try_seconds(secs).and_then(|d| last.checked_add_signed(d));
            let next = advance(pause_s as i64).or_else(|| {
                warn!(
                    "Swim pause of {}s in lap {} overruns the clock, advancing it by {}s",
                    pause_s, self.lap, count
                );
                i64::try_from(count).ok().and_then(advance)
            });
            self.last_time = Some(next.unwrap_or(last));
        }
    }

    /// Offset origin for a trackpoint at `time`, anchoring the activity on
    /// it when the first lap carried no usable start time.
    pub fn anchor(&mut self, time: DateTime<Local>) -> DateTime<Local> {
        *self.origin.get_or_insert_with(|| {
            self.last_time.get_or_insert(time);
            time
        })
    }

    /// Feeds the swim classifier, re-tagging the activity when it flips.
    pub fn observe_swim(&mut self, bad_gps: bool, distance_km: f64) {
        if self.swim.observe(bad_gps, distance_km) {
            self.activity.sport = Sport::Swim;
        }
    }

    pub fn advance_clock(&mut self, time: DateTime<Local>, distance_km: f64) {
        self.lap_has_trackpoints = true;
        self.last_time = Some(time);
        self.last_distance_km = distance_km;
    }

    /// Appends a completed trackpoint, resampling against the previous sample.
    pub fn emit(&mut self, sample: Sample, bad_gps: bool, policy: &ResamplePolicy) {
        let Some(prev) = self.activity.samples.last().cloned() else {
            self.activity.samples.push(sample);
            return;
        };

        let delta_s = (sample.secs - prev.secs).round() as i64;
        let is_swim = self.swim.is_swim();
        match policy.plan(delta_s, is_swim) {
            Emission::Raw => self.activity.samples.push(sample),
            Emission::Interpolate { count } => {
                if count < delta_s as usize {
                    warn!(
                        "Gap of {}s at {}s exceeds the synthesis cap, truncating to {} samples",
                        delta_s, prev.secs, count
                    );
                }
                let bad_gps = bad_gps || prev.has_bad_gps();
                self.activity
                    .samples
                    .extend(interpolate(prev, sample, delta_s, count, bad_gps, is_swim));
            }
            Emission::Skip if delta_s < 0 => warn!(
                "Dropping trackpoint at {}s, earlier than previous sample at {}s",
                sample.secs, prev.secs
            ),
            Emission::Skip => debug!("Dropping repeated trackpoint at {}s", sample.secs),
        }
    }

    pub fn finish(self) -> Activity {
        debug!(
            "Finished {:?} activity with {} laps and {} samples",
            self.activity.sport,
            self.lap,
            self.activity.samples.len()
        );
        self.activity
    }
}
