//! Flat-earth bearing and distance between GPS fixes
//!
//! Treats the earth as locally planar: one degree of latitude is a fixed
//! [`KM_PER_DEGREE`], one degree of longitude shrinks by the cosine of the latitude.
//! Good for inter-sample distances (meters to a few kilometers), degrades over long
//! spans and near the poles.

use crate::types::{EnuVec, GeoPoint, GPS_MULT};

/// Surface length of one degree of latitude (km)
pub const KM_PER_DEGREE: f64 = 111.3;

/// Surface length of one degree of latitude (cm)
pub const CM_PER_DEGREE: f64 = KM_PER_DEGREE * 100_000.0;

/// Centimeters per kilometer, used for home distance output
pub const CM_PER_KM: f64 = 100_000.0;

/// Signed coordinate delta `b - a` in degrees, widened so extreme inputs cannot overflow
fn delta_deg(a: i32, b: i32) -> f64 {
    (b as i64 - a as i64) as f64 / GPS_MULT as f64
}

/// Compass bearing from `from` to `to` in whole degrees (0 = north, 90 = east)
///
/// Planar approximation, not a geodesic initial course. The angle is truncated
/// towards zero before wrapping into [0, 359]. Identical points give 0.
pub fn bearing(from: &GeoPoint, to: &GeoPoint) -> u16 {
    let d_lon = delta_deg(from.lon, to.lon);
    let d_lat = delta_deg(from.lat, to.lat);
    let deg = d_lon.atan2(d_lat).to_degrees() as i32;
    ((deg + 360) % 360) as u16
}

/// Horizontal distance between two fixes in centimeters, altitude ignored
pub fn distance_2d(a: &GeoPoint, b: &GeoPoint) -> u32 {
    // Width of a one-degree cell at the mean latitude of both points
    let mean_lat = (a.lat as f64 + b.lat as f64) / 2.0 / GPS_MULT as f64;
    let lon_scale = mean_lat.to_radians().cos();

    let dx = lon_scale * CM_PER_DEGREE * delta_deg(a.lon, b.lon).abs();
    let dy = CM_PER_DEGREE * delta_deg(a.lat, b.lat).abs();

    (dx * dx + dy * dy).sqrt() as u32
}

/// Distance between two fixes in centimeters, including the altitude difference
///
/// The horizontal part is split into two axis-aligned legs measured from `a`: east
/// with latitude held at `a.lat`, north with longitude held at `a.lon`. This differs
/// slightly from `distance_2d(a, b)` (the cosine is taken at `a.lat` rather than the
/// mean) and is kept as is so recorded odometer totals stay reproducible.
pub fn distance_3d(a: &GeoPoint, b: &GeoPoint) -> u32 {
    let dx = distance_2d(a, &GeoPoint::new(a.lat, b.lon, a.alt)) as f64;
    let dy = distance_2d(a, &GeoPoint::new(b.lat, a.lon, a.alt)) as f64;
    let da = (a.alt - b.alt).abs() * 100.0;

    (dx * dx + dy * dy + da * da).sqrt() as u32
}

/// Signed local displacement from `a` to `b` in meters (east, north, up)
///
/// Uses the same leg decomposition as [`distance_3d`], so its norm matches that
/// distance up to integer truncation.
pub fn displacement_enu(a: &GeoPoint, b: &GeoPoint) -> EnuVec {
    let m_per_degree = CM_PER_DEGREE / 100.0;
    let lon_scale = (a.lat as f64 / GPS_MULT as f64).to_radians().cos();

    let east = lon_scale * m_per_degree * delta_deg(a.lon, b.lon);
    let north = m_per_degree * delta_deg(a.lat, b.lat);
    let up = b.alt - a.alt;

    EnuVec::new(east, north, up)
}
