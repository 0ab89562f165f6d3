use crate::odometer::Odometer;
use crate::types::{FlightState, GpsData, HomeReference};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LiveStatus {
    pub timestamp: f64,
    pub uptime_seconds: u64,
    pub gps_fixes: u64,
    // Odometer
    pub odometer_km: f64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
    // GPS data
    pub gps_lat: f64,
    pub gps_lon: f64,
    pub gps_alt: f64,
    pub gps_speed_knots: f64,
    // Home
    pub home_valid: bool,
    pub home_bearing: u16,
    pub home_distance_km: f64,
}

impl LiveStatus {
    pub fn new() -> Self {
        Self {
            timestamp: current_timestamp(),
            ..Default::default()
        }
    }

    /// Refresh from the latest odometer step
    pub fn update(
        &mut self,
        odometer: &Odometer,
        gps: &GpsData,
        home: &HomeReference,
        flight: &FlightState,
    ) {
        let position = gps.position();
        self.timestamp = current_timestamp();
        self.odometer_km = flight.odometer_km();
        self.accepted_steps = odometer.accepted_steps();
        self.rejected_steps = odometer.rejected_steps();
        self.gps_lat = position.latitude_deg();
        self.gps_lon = position.longitude_deg();
        self.gps_alt = position.alt;
        self.gps_speed_knots = gps.ground_speed;
        self.home_valid = home.valid;
        self.home_bearing = flight.home_bearing;
        self.home_distance_km = flight.home_distance;
    }

    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
