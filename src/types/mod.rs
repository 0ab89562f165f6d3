pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};

/// Fixed-point scale for latitude/longitude (1e-7 degree resolution)
pub const GPS_MULT: i32 = 10_000_000;

/// A GPS position with fixed-point horizontal coordinates
///
/// Latitude and longitude are degrees multiplied by [`GPS_MULT`]; altitude is meters.
/// Range is the caller's responsibility, see [`GeoPoint::is_in_range`].
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: i32,
    pub lon: i32,
    pub alt: f64,
}

impl GeoPoint {
    pub fn new(lat: i32, lon: i32, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    /// Build from floating degrees, rounding to the nearest fixed-point step
    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat: degrees_to_fixed(lat_deg),
            lon: degrees_to_fixed(lon_deg),
            alt: alt_m,
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        fixed_to_degrees(self.lat)
    }

    pub fn longitude_deg(&self) -> f64 {
        fixed_to_degrees(self.lon)
    }

    /// Same position with a different altitude
    pub fn with_alt(self, alt: f64) -> Self {
        Self { alt, ..self }
    }

    /// Whether lat/lon lie inside [-90, 90] x [-180, 180] degrees
    pub fn is_in_range(&self) -> bool {
        let lat_max = 90 * GPS_MULT as i64;
        let lon_max = 180 * GPS_MULT as i64;
        (self.lat as i64).abs() <= lat_max && (self.lon as i64).abs() <= lon_max
    }
}

/// Convert floating degrees to the fixed-point representation
pub fn degrees_to_fixed(deg: f64) -> i32 {
    (deg * GPS_MULT as f64).round() as i32
}

/// Convert a fixed-point coordinate back to floating degrees
pub fn fixed_to_degrees(value: i32) -> f64 {
    value as f64 / GPS_MULT as f64
}

/// Edge-triggered "new GPS sample" bits, one per consumer
///
/// The GPS driver raises every bit when a fix arrives; each consumer clears only its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewSampleFlags(pub u8);

impl NewSampleFlags {
    pub const ODOMETER: u8 = 0b0000_0001;
    pub const WIND: u8 = 0b0000_0010;
    pub const AGL: u8 = 0b0000_0100;
    pub const ALL: u8 = Self::ODOMETER | Self::WIND | Self::AGL;

    pub fn raise(&mut self, bits: u8) {
        self.0 |= bits;
    }

    pub fn is_set(&self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    /// Clear `bit` and report whether it was set
    pub fn take(&mut self, bit: u8) -> bool {
        let was_set = self.is_set(bit);
        self.0 &= !bit;
        was_set
    }
}

/// Latest GPS sample as published by the GPS driver
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GpsData {
    pub latitude: i32,
    pub longitude: i32,
    /// meters
    pub altitude: f64,
    /// knots
    pub ground_speed: f64,
    pub new_sample: NewSampleFlags,
}

impl GpsData {
    /// Publish a fresh fix and raise all new-sample bits
    pub fn publish(&mut self, position: GeoPoint, ground_speed: f64) {
        self.latitude = position.lat;
        self.longitude = position.lon;
        self.altitude = position.alt;
        self.ground_speed = ground_speed;
        self.new_sample.raise(NewSampleFlags::ALL);
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude, self.altitude)
    }
}

/// Configured home position; only meaningful while `valid` is set
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct HomeReference {
    pub lat: i32,
    pub lon: i32,
    pub valid: bool,
}

impl HomeReference {
    pub fn new(lat: i32, lon: i32) -> Self {
        Self {
            lat,
            lon,
            valid: true,
        }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(degrees_to_fixed(lat_deg), degrees_to_fixed(lon_deg))
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon, 0.0)
    }
}

/// Navigation outputs written by the odometer step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightState {
    /// Cumulative travelled distance in centimeters
    pub odometer: u64,
    /// Degrees, 0-359
    pub home_bearing: u16,
    /// Kilometers
    pub home_distance: f64,
}

impl FlightState {
    pub fn odometer_m(&self) -> f64 {
        self.odometer as f64 / 100.0
    }

    pub fn odometer_km(&self) -> f64 {
        self.odometer as f64 / 100_000.0
    }

    pub fn reset_odometer(&mut self) {
        self.odometer = 0;
    }
}
