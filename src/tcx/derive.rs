use log::debug;

use super::Sport;
use super::accumulator::RawSample;

/// Fills in whichever of speed or distance the trackpoint did not report.
///
/// `last_distance_km` and `delta_s` refer to the previous trackpoint (or the
/// lap start for the first one). A trackpoint carrying neither ends up with
/// zero speed and the previous distance.
pub fn derive_motion(sample: &mut RawSample, last_distance_km: f64, delta_s: f64) {
    if sample.speed_kph != 0. && sample.has_distance() {
        return;
    }

    if sample.speed_kph == 0. && sample.distance_km > 0. {
        let delta_km = (sample.distance_km - last_distance_km).max(0.);
        if delta_s > 0. {
            sample.speed_kph = delta_km / delta_s * 3600.;
        }
    } else if !sample.has_distance() {
        sample.distance_km = last_distance_km + delta_s * sample.speed_kph / 3600.;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SwimState {
    NotSwim,
    MaybeSwim,
    Swim,
}

/// Decides once per activity whether an "Other" activity is a pool swim.
#[derive(Clone, Copy, Debug)]
pub struct SwimDetector {
    state: SwimState,
}

impl SwimDetector {
    pub fn new(sport: Sport) -> Self {
        let state = match sport {
            Sport::Other => SwimState::MaybeSwim,
            Sport::Swim => SwimState::Swim,
            _ => SwimState::NotSwim,
        };
        Self { state }
    }

    pub fn is_swim(&self) -> bool {
        self.state == SwimState::Swim
    }

    /// Feeds one derived trackpoint, returns true on the trackpoint that
    /// triggers the reclassification.
    pub fn observe(&mut self, bad_gps: bool, distance_km: f64) -> bool {
        if self.state == SwimState::MaybeSwim && bad_gps && distance_km > 0. {
            debug!("Distance without GPS fix, treating activity as a pool swim");
            self.state = SwimState::Swim;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcx::accumulator::DISTANCE_UNSET;
    use proptest::prelude::*;

    #[test]
    fn test_speed_from_distance() {
        let mut sample = RawSample {
            distance_km: 1.1,
            ..Default::default()
        };
        derive_motion(&mut sample, 1.0, 10.);
        assert!((sample.speed_kph - 36.).abs() < 1e-9);
        assert!((sample.distance_km - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_speed_clamped_on_backwards_distance() {
        let mut sample = RawSample {
            distance_km: 0.9,
            ..Default::default()
        };
        derive_motion(&mut sample, 1.0, 5.);
        assert_eq!(sample.speed_kph, 0.);
    }

    #[test]
    fn test_speed_left_alone_without_elapsed_time() {
        let mut sample = RawSample {
            distance_km: 2.0,
            ..Default::default()
        };
        derive_motion(&mut sample, 1.0, 0.);
        assert_eq!(sample.speed_kph, 0.);
    }

    #[test]
    fn test_distance_from_speed() {
        let mut sample = RawSample {
            speed_kph: 36.,
            ..Default::default()
        };
        derive_motion(&mut sample, 2.0, 10.);
        assert!((sample.distance_km - 2.1).abs() < 1e-12);
        assert_eq!(sample.speed_kph, 36.);
    }

    #[test]
    fn test_neither_reported_holds_distance() {
        let mut sample = RawSample::default();
        assert_eq!(sample.distance_km, DISTANCE_UNSET);
        derive_motion(&mut sample, 3.25, 4.);
        assert_eq!(sample.distance_km, 3.25);
        assert_eq!(sample.speed_kph, 0.);
    }

    #[test]
    fn test_both_reported_untouched() {
        let mut sample = RawSample {
            distance_km: 5.,
            speed_kph: 20.,
            ..Default::default()
        };
        derive_motion(&mut sample, 4., 1.);
        assert_eq!(sample.distance_km, 5.);
        assert_eq!(sample.speed_kph, 20.);
    }

    #[test]
    fn test_swim_classification_is_sticky() {
        let mut detector = SwimDetector::new(Sport::Other);
        assert!(!detector.is_swim());
        assert!(!detector.observe(true, 0.));
        assert!(!detector.observe(false, 0.05));
        assert!(detector.observe(true, 0.05));
        assert!(detector.is_swim());
        // later valid GPS does not undo it, and it never fires twice
        assert!(!detector.observe(false, 0.1));
        assert!(!detector.observe(true, 0.2));
        assert!(detector.is_swim());
    }

    #[test]
    fn test_only_other_can_become_swim() {
        for sport in [Sport::Bike, Sport::Run, Sport::Unknown] {
            let mut detector = SwimDetector::new(sport);
            assert!(!detector.observe(true, 1.0));
            assert!(!detector.is_swim());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_derived_speed_matches_distance_rate(
            last_km in 0.0f64..100.0,
            step_km in -1.0f64..1.0,
            delta_s in 1i64..600,
        ) {
            let distance_km = last_km + step_km;
            prop_assume!(distance_km > 0.);
            let mut sample = RawSample { distance_km, ..Default::default() };
            derive_motion(&mut sample, last_km, delta_s as f64);

            let expected = ((distance_km - last_km) / delta_s as f64 * 3600.).max(0.);
            prop_assert!(sample.speed_kph >= 0.);
            prop_assert!((sample.speed_kph - expected).abs() < 1e-6);
        }
    }
}
