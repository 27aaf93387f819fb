//! Great-circle distance between telemetry fixes.

use toll_client::TelemetryReading;

/// Mean Earth radius (IUGG), in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two `(latitude, longitude)` points in degrees.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lat2) = (from.0.to_radians(), to.0.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (to.1 - from.1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Distance travelled between two readings, in kilometres.
pub fn distance_between(prev: &TelemetryReading, next: &TelemetryReading) -> f64 {
    haversine_km(
        (prev.latitude, prev.longitude),
        (next.latitude, next.longitude),
    )
}

/// True if the reading's coordinates are a valid WGS84 position.
pub fn is_valid_position(reading: &TelemetryReading) -> bool {
    reading.latitude.is_finite()
        && reading.longitude.is_finite()
        && reading.latitude.abs() <= 90.0
        && reading.longitude.abs() <= 180.0
}
