//! Odometer filter thresholds and unit conversions

use crate::error::{OdoResult, OdometerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Knots to kilometers per hour
pub const KNOTS_TO_KPH: f64 = 1.852;

/// Meters per second to knots
pub const MPS_TO_KNOTS: f64 = 1.94384449;

/// Reported ground speed must exceed this for a step to count (1 km/h in knots)
pub const ODO_MIN_SPEED_KNOTS: f64 = 1.0 / KNOTS_TO_KPH;

/// Calculated and reported speed must agree within this (10 km/h in knots)
pub const ODO_MAX_SPEED_DIFF_KNOTS: f64 = 10.0 / KNOTS_TO_KPH;

/// Default interval between odometer samples (1 Hz GPS)
pub const DEFAULT_SAMPLE_PERIOD_S: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdometerConfig {
    /// Ground speed (knots) at or below which steps are treated as GPS jitter
    pub min_speed_knots: f64,
    /// Largest tolerated gap (knots) between calculated and reported speed, exclusive
    pub max_speed_diff_knots: f64,
    pub mps_to_knots: f64,
    /// Time between consecutive samples, used to turn step distance into speed
    pub sample_period_s: f64,
}

impl Default for OdometerConfig {
    fn default() -> Self {
        Self {
            min_speed_knots: ODO_MIN_SPEED_KNOTS,
            max_speed_diff_knots: ODO_MAX_SPEED_DIFF_KNOTS,
            mps_to_knots: MPS_TO_KNOTS,
            sample_period_s: DEFAULT_SAMPLE_PERIOD_S,
        }
    }
}

impl OdometerConfig {
    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> OdoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> OdoResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> OdoResult<()> {
        if !self.min_speed_knots.is_finite() || self.min_speed_knots < 0.0 {
            return Err(OdometerError::InvalidConfig(format!(
                "min_speed_knots must be finite and >= 0, got {}",
                self.min_speed_knots
            )));
        }
        if !self.max_speed_diff_knots.is_finite() || self.max_speed_diff_knots <= 0.0 {
            return Err(OdometerError::InvalidConfig(format!(
                "max_speed_diff_knots must be finite and > 0, got {}",
                self.max_speed_diff_knots
            )));
        }
        if !self.mps_to_knots.is_finite() || self.mps_to_knots <= 0.0 {
            return Err(OdometerError::InvalidConfig(format!(
                "mps_to_knots must be finite and > 0, got {}",
                self.mps_to_knots
            )));
        }
        if !self.sample_period_s.is_finite() || self.sample_period_s <= 0.0 {
            return Err(OdometerError::InvalidConfig(format!(
                "sample_period_s must be finite and > 0, got {}",
                self.sample_period_s
            )));
        }
        Ok(())
    }
}
