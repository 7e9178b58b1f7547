/// Numeric scratch fields a Trackpoint element can fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Distance,
    Power,
    Speed,
    RunCadence,
    HeartRate,
    Cadence,
    Altitude,
    Longitude,
    Latitude,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Activity,
    Lap,
    Trackpoint,
    HeartRateBpm,
    Time,
    TotalTimeSeconds,
    DistanceMeters,
    Watts,
    Speed,
    RunCadence,
    Value,
    Cadence,
    AltitudeMeters,
    LongitudeDegrees,
    LatitudeDegrees,
    Other,
}

impl ElementKind {
    /// Resolves a tag name, ignoring any namespace prefix (`ns3:Watts`).
    pub fn from_name(name: &str) -> Self {
        let local = name.rsplit(':').next().unwrap_or(name);
        match local {
            "Activity" => ElementKind::Activity,
            "Lap" => ElementKind::Lap,
            "Trackpoint" => ElementKind::Trackpoint,
            "HeartRateBpm" => ElementKind::HeartRateBpm,
            "Time" => ElementKind::Time,
            "TotalTimeSeconds" => ElementKind::TotalTimeSeconds,
            "DistanceMeters" => ElementKind::DistanceMeters,
            "Watts" => ElementKind::Watts,
            "Speed" => ElementKind::Speed,
            "RunCadence" => ElementKind::RunCadence,
            "Value" => ElementKind::Value,
            "Cadence" => ElementKind::Cadence,
            "AltitudeMeters" => ElementKind::AltitudeMeters,
            "LongitudeDegrees" => ElementKind::LongitudeDegrees,
            "LatitudeDegrees" => ElementKind::LatitudeDegrees,
            _ => ElementKind::Other,
        }
    }

    /// Scratch field this element writes when it closes inside a Trackpoint.
    pub fn trackpoint_field(self) -> Option<Field> {
        match self {
            ElementKind::DistanceMeters => Some(Field::Distance),
            ElementKind::Watts => Some(Field::Power),
            ElementKind::Speed => Some(Field::Speed),
            ElementKind::RunCadence => Some(Field::RunCadence),
            ElementKind::Value => Some(Field::HeartRate),
            ElementKind::Cadence => Some(Field::Cadence),
            ElementKind::AltitudeMeters => Some(Field::Altitude),
            ElementKind::LongitudeDegrees => Some(Field::Longitude),
            ElementKind::LatitudeDegrees => Some(Field::Latitude),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names() {
        assert_eq!(ElementKind::from_name("Activity"), ElementKind::Activity);
        assert_eq!(ElementKind::from_name("Trackpoint"), ElementKind::Trackpoint);
        assert_eq!(ElementKind::from_name("AltitudeMeters"), ElementKind::AltitudeMeters);
        assert_eq!(ElementKind::from_name("Creator"), ElementKind::Other);
    }

    #[test]
    fn test_prefixed_extension_names() {
        assert_eq!(ElementKind::from_name("ns3:Watts"), ElementKind::Watts);
        assert_eq!(ElementKind::from_name("ax:Speed"), ElementKind::Speed);
        assert_eq!(ElementKind::from_name("ns3:RunCadence"), ElementKind::RunCadence);
        assert_eq!(ElementKind::from_name("ns3:AvgSpeed"), ElementKind::Other);
    }

    #[test]
    fn test_trackpoint_fields() {
        assert_eq!(ElementKind::Value.trackpoint_field(), Some(Field::HeartRate));
        assert_eq!(ElementKind::Time.trackpoint_field(), None);
        assert_eq!(ElementKind::Lap.trackpoint_field(), None);
    }
}
