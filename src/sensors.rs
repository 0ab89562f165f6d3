use crate::config::MPS_TO_KNOTS;
use crate::navigation::KM_PER_DEGREE;
use crate::track::TrackFix;
use tokio::sync::mpsc::Sender;
use tokio::time::{interval, Duration};

/// Deterministic GPS stand-in: holds position for a while, then travels on a fixed heading
///
/// Adds a small sinusoidal wobble to position and speed so the odometer filter sees
/// realistic jitter.
#[derive(Clone, Debug)]
pub struct MockGpsSource {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    heading_rad: f64,
    speed_mps: f64,
    period_s: f64,
    stationary_fixes: u64,
    seq: u64,
}

impl MockGpsSource {
    pub fn new(latitude: f64, longitude: f64, heading_deg: f64, speed_mps: f64, period_s: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 500.0,
            heading_rad: heading_deg.to_radians(),
            speed_mps,
            period_s,
            stationary_fixes: 5,
            seq: 0,
        }
    }

    /// Number of initial fixes reported at rest
    pub fn with_stationary_fixes(mut self, count: u64) -> Self {
        self.stationary_fixes = count;
        self
    }

    pub fn next_fix(&mut self) -> TrackFix {
        let seq = self.seq as f64;
        let moving = self.seq >= self.stationary_fixes;
        self.seq += 1;

        let speed = if moving {
            (self.speed_mps + (seq * 0.5).sin() * 0.3).max(0.0)
        } else {
            0.0
        };

        // Advance along the heading on the flat-earth grid
        let step_m = speed * self.period_s;
        let north = step_m * self.heading_rad.cos();
        let east = step_m * self.heading_rad.sin();
        let m_per_degree = KM_PER_DEGREE * 1000.0;
        self.latitude += north / m_per_degree;
        self.longitude += east / (m_per_degree * self.latitude.to_radians().cos());
        self.altitude += (seq * 0.2).sin() * 0.5;

        // Receiver noise on the reported position, about a meter
        let wobble = (seq * 1.7).sin() * 1.0 / m_per_degree;

        TrackFix {
            timestamp: seq * self.period_s,
            latitude: self.latitude + wobble,
            longitude: self.longitude,
            altitude: self.altitude,
            ground_speed: speed * MPS_TO_KNOTS,
        }
    }
}

pub async fn gps_loop(tx: Sender<TrackFix>, mut source: MockGpsSource, period: Duration) {
    let mut interval = interval(period);
    let mut sample_count = 0u64;

    loop {
        interval.tick().await;

        let fix = source.next_fix();
        match tx.try_send(fix) {
            Ok(_) => {
                sample_count += 1;
                log::trace!("[gps] {} fixes", sample_count);
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(_)) => {
                log::info!("[gps] Channel closed after {} fixes", sample_count);
                break;
            }
            Err(tokio::sync::mpsc::error::TrySendError::Full(_)) => {
                // Channel full, drop this fix
            }
        }
    }
}
