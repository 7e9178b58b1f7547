use uom::si::f64::{Length, Velocity};
use uom::si::length::{kilometer, meter};
use uom::si::velocity::{kilometer_per_hour, meter_per_second};

/// Parses a decimal number written with a `.` radix point.
///
/// The parse never consults the host locale, so `"46,5"` is rejected instead
/// of being read as 46.5. Non-finite values are rejected as well.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn meters_to_km(meters: f64) -> f64 {
    Length::new::<meter>(meters).get::<kilometer>()
}

pub fn mps_to_kph(mps: f64) -> f64 {
    Velocity::new::<meter_per_second>(mps).get::<kilometer_per_hour>()
}
