//! Recorded GPS tracks and offline replay through the odometer

use crate::config::OdometerConfig;
use crate::error::{OdoResult, OdometerError};
use crate::navigation::displacement_enu;
use crate::odometer::{Odometer, RejectReason, StepOutcome};
use crate::types::{FlightState, GeoPoint, GpsData, HomeReference};
use flate2::read::GzDecoder;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One recorded fix, coordinates in floating degrees
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackFix {
    pub timestamp: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// meters
    #[serde(default)]
    pub altitude: f64,
    /// knots
    pub ground_speed: f64,
}

impl TrackFix {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::from_degrees(self.latitude, self.longitude, self.altitude)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrackHome {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackLog {
    #[serde(default)]
    pub home: Option<TrackHome>,
    pub fixes: Vec<TrackFix>,
}

impl TrackLog {
    pub fn from_reader<R: Read>(reader: R) -> OdoResult<Self> {
        let log: TrackLog = serde_json::from_reader(reader)?;
        if log.fixes.is_empty() {
            return Err(OdometerError::EmptyTrack);
        }
        Ok(log)
    }

    /// Load a `.json` or gzip-compressed `.json.gz` track
    pub fn load(path: &Path) -> OdoResult<Self> {
        let file = File::open(path)?;
        if path.extension().map(|e| e == "gz").unwrap_or(false) {
            Self::from_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            Self::from_reader(BufReader::new(file))
        }
    }

    pub fn home_reference(&self) -> HomeReference {
        self.home
            .map(|h| HomeReference::from_degrees(h.lat, h.lon))
            .unwrap_or_default()
    }
}

/// Outcome of replaying a whole track
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub fixes: usize,
    pub accepted_steps: u64,
    pub rejected_below_min_speed: u64,
    pub rejected_speed_mismatch: u64,
    pub odometer_cm: u64,
    pub odometer_km: f64,
    pub max_step_cm: u32,
    /// First-to-last fix displacement (east, north, up) in meters
    pub net_displacement_m: [f64; 3],
    pub home_bearing: Option<u16>,
    pub home_distance_km: Option<f64>,
    pub duration_s: f64,
}

/// Run every fix of `log` through a fresh odometer, one step per fix
pub fn replay_track(log: &TrackLog, config: OdometerConfig) -> ReplaySummary {
    let mut odometer = Odometer::new(config);
    let mut gps = GpsData::default();
    let mut flight = FlightState::default();
    let home = log.home_reference();

    let mut below_min = 0u64;
    let mut mismatch = 0u64;
    let mut max_step_cm = 0u32;

    for fix in &log.fixes {
        gps.publish(fix.position(), fix.ground_speed);
        match odometer.step(&mut gps, &home, &mut flight) {
            StepOutcome::Accepted { distance_cm, .. } => {
                max_step_cm = max_step_cm.max(distance_cm);
            }
            StepOutcome::Rejected { reason, .. } => match reason {
                RejectReason::BelowMinSpeed => below_min += 1,
                RejectReason::SpeedMismatch => mismatch += 1,
            },
            StepOutcome::FirstFix | StepOutcome::NoSample => {}
        }
    }

    let (net_displacement_m, duration_s) = match (log.fixes.first(), log.fixes.last()) {
        (Some(first), Some(last)) => {
            let enu = displacement_enu(&first.position(), &last.position());
            ([enu.x, enu.y, enu.z], last.timestamp - first.timestamp)
        }
        _ => ([0.0; 3], 0.0),
    };

    if mismatch > 0 {
        warn!(
            "replay: {} of {} steps rejected for speed mismatch",
            mismatch,
            log.fixes.len().saturating_sub(1)
        );
    }
    info!(
        "replay: {} fixes, odometer {:.3} km",
        log.fixes.len(),
        flight.odometer_km()
    );

    ReplaySummary {
        fixes: log.fixes.len(),
        accepted_steps: odometer.accepted_steps(),
        rejected_below_min_speed: below_min,
        rejected_speed_mismatch: mismatch,
        odometer_cm: flight.odometer,
        odometer_km: flight.odometer_km(),
        max_step_cm,
        net_displacement_m,
        home_bearing: home.valid.then_some(flight.home_bearing),
        home_distance_km: home.valid.then_some(flight.home_distance),
        duration_s,
    }
}
