use crate::config::DecoderConfig;

use super::Sample;

/// Interpolated speed and cadence below this snap to zero.
pub const NOISE_FLOOR: f64 = 0.35;

/// How the next trackpoint enters the series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emission {
    /// Append the trackpoint as reported
    Raw,
    /// Replace the trackpoint with `count` one-second samples ending at it
    Interpolate { count: usize },
    /// Drop the trackpoint, it would move the clock backwards or nowhere
    Skip,
}

/// Gaps below the high-water mark are filled with one-second samples. Larger
/// gaps are kept as reported, except for pool swims.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResamplePolicy {
    smart_recording: bool,
    high_water_mark_s: i64,
    cap: usize,
}

impl ResamplePolicy {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            smart_recording: config.smart_recording,
            high_water_mark_s: config.normalized_hwm(),
            cap: config.synthesis_cap(),
        }
    }

    pub fn smart_recording(&self) -> bool {
        self.smart_recording
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Decides how a trackpoint `delta_s` seconds after the previous sample is emitted.
    pub fn plan(&self, delta_s: i64, is_swim: bool) -> Emission {
        if delta_s < 0 {
            return Emission::Skip;
        }
        if !self.smart_recording
            || delta_s == 1
            || (delta_s >= self.high_water_mark_s && !is_swim)
        {
            return Emission::Raw;
        }
        if delta_s == 0 {
            return Emission::Skip;
        }
        Emission::Interpolate {
            count: (delta_s as usize).min(self.cap),
        }
    }
}

fn lerp(from: f64, to: f64, weight: f64) -> f64 {
    from + (to - from) * weight
}

fn floor_noise(value: f64) -> f64 {
    if value > NOISE_FLOOR { value } else { 0. }
}

/// Synthesizes `count` samples at one-second spacing after `prev`, blending
/// towards `curr` with weight `i / delta_s`.
///
/// With `bad_gps` set the position is zeroed instead of blended. Swims keep
/// the current speed across the run. Every sample carries `curr`'s lap.
pub fn interpolate(
    prev: Sample,
    curr: Sample,
    delta_s: i64,
    count: usize,
    bad_gps: bool,
    is_swim: bool,
) -> impl Iterator<Item = Sample> {
    let delta = delta_s as f64;
    (1..=count).map(move |i| {
        let weight = i as f64 / delta;
        let speed_kph = if is_swim {
            curr.speed_kph
        } else {
            lerp(prev.speed_kph, curr.speed_kph, weight)
        };
        let (latitude, longitude) = if bad_gps {
            (0., 0.)
        } else {
            (
                lerp(prev.latitude, curr.latitude, weight),
                lerp(prev.longitude, curr.longitude, weight),
            )
        };

        Sample {
            secs: prev.secs + i as f64,
            cadence: floor_noise(lerp(prev.cadence, curr.cadence, weight)),
            heart_rate: lerp(prev.heart_rate, curr.heart_rate, weight),
            distance_km: lerp(prev.distance_km, curr.distance_km, weight),
            speed_kph: floor_noise(speed_kph),
            torque_nm: lerp(prev.torque_nm, curr.torque_nm, weight),
            power_w: lerp(prev.power_w, curr.power_w, weight),
            altitude_m: lerp(prev.altitude_m, curr.altitude_m, weight),
            longitude,
            latitude,
            headwind_kph: curr.headwind_kph,
            run_cadence: lerp(prev.run_cadence, curr.run_cadence, weight),
            lap: curr.lap,
        }
    })
}
