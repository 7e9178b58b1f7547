// Integration tests decoding the sample files in tcx_samples/
//
// Each sample exercises one recording style:
// 1. bike_smart_recording.tcx - GPS ride with smart-recording gaps, one above the high-water mark
// 2. pool_swim.tcx - "Other" activity without GPS that turns into a pool swim with a pause lap
// 3. multi_activity.tcx - three back-to-back activities, one of them missing its start time

use std::path::Path;

use tcxride::{
    Activity, ActivityIssue, DecodeOutput, DecoderConfig, Sport, decode_file, write_activities,
};

fn decode_sample(name: &str, config: DecoderConfig) -> Vec<Activity> {
    let path = Path::new("tcx_samples").join(name);
    decode_file(&path, config).expect("Failed to decode sample file")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Every sample timestamp is non-decreasing and synthesized runs are one second apart
fn assert_uniform_clock(activity: &Activity) {
    assert!(activity.is_time_ordered(), "timestamps went backwards");
    for sample in &activity.samples {
        assert_eq!(sample.secs.fract(), 0., "offsets are whole seconds");
    }
}

#[test]
fn test_bike_smart_recording() {
    let activities = decode_sample("bike_smart_recording.tcx", DecoderConfig::default());
    assert_eq!(activities.len(), 1);

    let bike = &activities[0];
    assert_eq!(bike.sport, Sport::Bike);
    assert!(bike.is_valid());
    assert_eq!(bike.device_type, "Garmin");
    assert_eq!(bike.recording_interval_s, 1.0);
    assert_uniform_clock(bike);

    let secs: Vec<f64> = bike.samples.iter().map(|s| s.secs).collect();
    assert_eq!(
        secs,
        vec![0., 1., 2., 3., 4., 5., 40., 41., 42., 43.]
    );
    assert_eq!(bike.lap_count(), 2);
    assert!(bike.samples[..7].iter().all(|s| s.lap == 1));
    assert!(bike.samples[7..].iter().all(|s| s.lap == 2));

    // raw values, speed converted from m/s
    assert_close(bike.samples[0].speed_kph, 18.);
    assert_close(bike.samples[0].power_w, 150.);
    assert_close(bike.samples[0].heart_rate, 120.);

    // midpoint of the 4s gap between t=1 and t=5
    let mid = &bike.samples[3];
    assert_close(mid.speed_kph, 27.);
    assert_close(mid.heart_rate, 126.);
    assert_close(mid.power_w, 200.);
    assert_close(mid.cadence, 86.);
    assert_close(mid.distance_km, 0.025);
    assert_close(mid.latitude, 45.5003);
    assert_close(mid.longitude, -122.6);

    // the 35s gap is above the high-water mark and passes through untouched
    assert_close(bike.samples[6].speed_kph, 25.2);
    assert_close(bike.samples[6].distance_km, 0.3);
}

#[test]
fn test_bike_zero_altitude_keeps_running_value() {
    let bike = decode_sample("bike_smart_recording.tcx", DecoderConfig::default()).remove(0);
    let altitudes: Vec<f64> = bike.samples.iter().map(|s| s.altitude_m).collect();
    assert_eq!(
        altitudes,
        vec![100., 100., 101., 102., 103., 104., 104., 104., 107., 110.]
    );
}

#[test]
fn test_bike_without_smart_recording() {
    let config = DecoderConfig {
        smart_recording: false,
        ..Default::default()
    };
    let bike = decode_sample("bike_smart_recording.tcx", config).remove(0);
    let secs: Vec<f64> = bike.samples.iter().map(|s| s.secs).collect();
    assert_eq!(secs, vec![0., 1., 5., 40., 41., 43.]);
}

#[test]
fn test_bike_with_higher_water_mark() {
    let config = DecoderConfig {
        high_water_mark_s: 50,
        ..Default::default()
    };
    let bike = decode_sample("bike_smart_recording.tcx", config).remove(0);
    assert_eq!(bike.samples.len(), 44);
    assert_uniform_clock(&bike);
    for pair in bike.samples[5..=40].windows(2) {
        assert_eq!(pair[1].secs - pair[0].secs, 1.);
    }
}

#[test]
fn test_pool_swim() {
    let activities = decode_sample("pool_swim.tcx", DecoderConfig::default());
    assert_eq!(activities.len(), 1);

    let swim = &activities[0];
    assert_eq!(swim.sport, Sport::Swim);
    assert_uniform_clock(swim);
    assert_eq!(swim.samples.len(), 76);
    assert_eq!(swim.samples[0].secs, 20.);
    assert_eq!(swim.samples[75].secs, 95.);

    // first length, swim speed stays at the derived per-length value
    assert!(swim.samples[..21].iter().all(|s| s.lap == 1));
    assert!(
        swim.samples[1..21]
            .iter()
            .all(|s| (s.speed_kph - 4.5).abs() < 1e-6)
    );
    assert_close(swim.samples[10].heart_rate, 120.);

    // pause lap filled with zero samples at the last distance
    let pause = &swim.samples[21..36];
    assert_eq!(pause[0].secs, 41.);
    assert_eq!(pause[14].secs, 55.);
    assert!(pause.iter().all(|s| s.lap == 2
        && s.speed_kph == 0.
        && s.heart_rate == 0.
        && (s.distance_km - 0.05).abs() < 1e-9));

    // the 40s gap after the pause is still interpolated for swims
    let last_length = &swim.samples[36..];
    assert_eq!(last_length.len(), 40);
    assert!(last_length.iter().all(|s| s.lap == 3
        && s.latitude == 0.
        && s.longitude == 0.
        && (s.speed_kph - 2.25).abs() < 1e-6));
    assert_close(last_length[39].distance_km, 0.075);
}

#[test]
fn test_pool_swim_without_smart_recording() {
    let config = DecoderConfig {
        smart_recording: false,
        ..Default::default()
    };
    let swim = decode_sample("pool_swim.tcx", config).remove(0);
    assert_eq!(swim.sport, Sport::Swim);
    let secs: Vec<f64> = swim.samples.iter().map(|s| s.secs).collect();
    assert_eq!(secs, vec![20., 40., 95.]);
}

#[test]
fn test_multi_activity() {
    let activities = decode_sample("multi_activity.tcx", DecoderConfig::default());
    assert_eq!(activities.len(), 3);

    let run = &activities[0];
    assert_eq!(run.sport, Sport::Run);
    assert!(run.is_valid());
    assert_eq!(run.samples.len(), 3);
    assert_close(run.samples[0].speed_kph, 0.);
    assert_close(run.samples[1].speed_kph, 10.8);
    assert_close(run.samples[2].speed_kph, 10.8);
    assert_close(run.samples[2].run_cadence, 86.);

    let ride = &activities[1];
    assert_eq!(ride.sport, Sport::Bike);
    assert!(!ride.is_valid());
    assert_eq!(ride.issues, vec![ActivityIssue::MissingStartTime]);
    assert_eq!(ride.start_time, None);
    assert_eq!(ride.samples.len(), 4);
    assert_close(ride.samples[3].distance_km, 0.015);

    // distance with a real GPS fix is not a swim
    let other = &activities[2];
    assert_eq!(other.sport, Sport::Other);
    assert!(other.is_valid());
    assert_eq!(other.samples.len(), 2);
    assert_close(other.samples[1].speed_kph, 36.);

    for activity in &activities {
        assert_uniform_clock(activity);
    }
}

#[test]
fn test_multi_activity_json_lines() {
    let activities = decode_sample("multi_activity.tcx", DecoderConfig::default());
    let mut buffer = Vec::new();
    write_activities(&mut buffer, &activities).expect("Failed to write JSON Lines");

    let lines: Vec<DecodeOutput> = String::from_utf8(buffer)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect();
    assert_eq!(lines.len(), 3 + 3 + 4 + 2);

    let starts = lines
        .iter()
        .filter(|line| matches!(line, DecodeOutput::ActivityStart(_)))
        .count();
    assert_eq!(starts, 3);
    assert!(matches!(
        &lines[4],
        DecodeOutput::ActivityStart(info) if info.sport == Sport::Bike && !info.issues.is_empty()
    ));
}
