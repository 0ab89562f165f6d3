//! Travel-distance accumulator driven by GPS samples
//!
//! One [`Odometer::step`] per new GPS sample. Each step refreshes the home
//! bearing/distance, measures the 3D distance from the previous fix and adds it to
//! the odometer only when the speed implied by that distance agrees with the
//! receiver's reported ground speed. Rejected steps still move the reference fix.

use crate::config::OdometerConfig;
use crate::navigation::{bearing, distance_2d, distance_3d, CM_PER_KM};
use crate::types::{FlightState, GeoPoint, GpsData, HomeReference, NewSampleFlags};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Previous-fix tracking state
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum OdometerState {
    /// No fix seen yet
    #[default]
    Uninitialized,
    /// Last fix seen, counted or not
    Tracking(GeoPoint),
}

/// Why a step's distance was left out of the odometer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Reported ground speed at or below the minimum (standing still, GPS jitter)
    BelowMinSpeed,
    /// Calculated and reported speed disagree by the tolerance or more (fix outlier)
    SpeedMismatch,
}

/// Result of a single odometer step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// The odometer sample bit was not raised
    NoSample,
    /// First fix; nothing to measure against yet
    FirstFix,
    Accepted {
        distance_cm: u32,
        calc_speed_knots: u16,
    },
    Rejected {
        distance_cm: u32,
        calc_speed_knots: u16,
        reason: RejectReason,
    },
}

pub struct Odometer {
    config: OdometerConfig,
    state: OdometerState,
    accepted_steps: u64,
    rejected_steps: u64,
}

impl Odometer {
    pub fn new(config: OdometerConfig) -> Self {
        Self {
            config,
            state: OdometerState::Uninitialized,
            accepted_steps: 0,
            rejected_steps: 0,
        }
    }

    pub fn config(&self) -> &OdometerConfig {
        &self.config
    }

    pub fn state(&self) -> &OdometerState {
        &self.state
    }

    pub fn accepted_steps(&self) -> u64 {
        self.accepted_steps
    }

    pub fn rejected_steps(&self) -> u64 {
        self.rejected_steps
    }

    /// Forget the previous fix; the next step starts tracking afresh
    pub fn reset(&mut self) {
        self.state = OdometerState::Uninitialized;
        self.accepted_steps = 0;
        self.rejected_steps = 0;
    }

    /// Process the current GPS sample if its odometer bit is raised
    ///
    /// Consumes only [`NewSampleFlags::ODOMETER`]; other consumers' bits are kept.
    pub fn step(
        &mut self,
        gps: &mut GpsData,
        home: &HomeReference,
        flight: &mut FlightState,
    ) -> StepOutcome {
        if !gps.new_sample.take(NewSampleFlags::ODOMETER) {
            return StepOutcome::NoSample;
        }

        let current = gps.position();
        if !current.is_in_range() {
            warn!(
                "GPS fix out of range: lat={} lon={} (fixed-point)",
                current.lat, current.lon
            );
        }

        if home.valid {
            let home_pos = home.position();
            flight.home_bearing = bearing(&home_pos, &current);
            flight.home_distance = distance_2d(&current, &home_pos) as f64 / CM_PER_KM;
        }

        let outcome = match self.state {
            OdometerState::Uninitialized => {
                debug!("odometer: first fix at {:?}", current);
                StepOutcome::FirstFix
            }
            OdometerState::Tracking(previous) => {
                let distance_cm = distance_3d(&previous, &current);
                let calc_speed_knots = self.calculated_speed_knots(distance_cm);

                match self.check_speed(calc_speed_knots, gps.ground_speed) {
                    Ok(()) => {
                        flight.odometer = flight.odometer.saturating_add(distance_cm as u64);
                        self.accepted_steps += 1;
                        debug!(
                            "odometer: +{} cm (calc {} kn, gps {:.2} kn), total {} cm",
                            distance_cm, calc_speed_knots, gps.ground_speed, flight.odometer
                        );
                        StepOutcome::Accepted {
                            distance_cm,
                            calc_speed_knots,
                        }
                    }
                    Err(reason) => {
                        self.rejected_steps += 1;
                        debug!(
                            "odometer: rejected {} cm ({:?}, calc {} kn, gps {:.2} kn)",
                            distance_cm, reason, calc_speed_knots, gps.ground_speed
                        );
                        StepOutcome::Rejected {
                            distance_cm,
                            calc_speed_knots,
                            reason,
                        }
                    }
                }
            }
        };

        self.state = OdometerState::Tracking(current);
        outcome
    }

    /// Speed implied by covering `distance_cm` in one sample period, truncated to whole knots
    pub fn calculated_speed_knots(&self, distance_cm: u32) -> u16 {
        (distance_cm as f64 * self.config.mps_to_knots / 100.0 / self.config.sample_period_s)
            as u16
    }

    fn check_speed(&self, calc_speed_knots: u16, ground_speed: f64) -> Result<(), RejectReason> {
        if !(ground_speed > self.config.min_speed_knots) {
            return Err(RejectReason::BelowMinSpeed);
        }
        if !((calc_speed_knots as f64 - ground_speed).abs() < self.config.max_speed_diff_knots) {
            return Err(RejectReason::SpeedMismatch);
        }
        Ok(())
    }
}

impl Default for Odometer {
    fn default() -> Self {
        Self::new(OdometerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BASE_LAT: f64 = 46.0;
    const BASE_LON: f64 = 7.0;

    fn base() -> GeoPoint {
        GeoPoint::from_degrees(BASE_LAT, BASE_LON, 800.0)
    }

    /// 100 m north of `base()` under the flat-earth model
    fn hundred_m_north() -> GeoPoint {
        GeoPoint::from_degrees(BASE_LAT + 100.0 / 111_300.0, BASE_LON, 800.0)
    }

    fn feed(
        odo: &mut Odometer,
        gps: &mut GpsData,
        flight: &mut FlightState,
        position: GeoPoint,
        ground_speed: f64,
    ) -> StepOutcome {
        gps.publish(position, ground_speed);
        odo.step(gps, &HomeReference::default(), flight)
    }

    fn test_config() -> OdometerConfig {
        OdometerConfig {
            min_speed_knots: 2.0,
            max_speed_diff_knots: 5.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_sample_flag_is_noop() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        let outcome = odo.step(&mut gps, &HomeReference::default(), &mut flight);
        assert_eq!(outcome, StepOutcome::NoSample);
        assert_eq!(*odo.state(), OdometerState::Uninitialized);
        assert_eq!(flight, FlightState::default());
    }

    #[test]
    fn test_first_fix_starts_tracking() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        let outcome = feed(&mut odo, &mut gps, &mut flight, base(), 10.0);
        assert_eq!(outcome, StepOutcome::FirstFix);
        assert_eq!(*odo.state(), OdometerState::Tracking(base()));
        assert_eq!(flight.odometer, 0);

        // Only the odometer bit is consumed
        assert!(!gps.new_sample.is_set(NewSampleFlags::ODOMETER));
        assert!(gps.new_sample.is_set(NewSampleFlags::WIND));
        assert!(gps.new_sample.is_set(NewSampleFlags::AGL));
    }

    #[test]
    fn test_step_consumes_flag_once() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        feed(&mut odo, &mut gps, &mut flight, base(), 10.0);
        gps.latitude = hundred_m_north().lat;
        let outcome = odo.step(&mut gps, &HomeReference::default(), &mut flight);
        assert_eq!(outcome, StepOutcome::NoSample);
        assert_eq!(*odo.state(), OdometerState::Tracking(base()));
    }

    #[test]
    fn test_hundred_meters_accepted() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        feed(&mut odo, &mut gps, &mut flight, base(), 194.0);
        let outcome = feed(&mut odo, &mut gps, &mut flight, hundred_m_north(), 194.0);

        assert_eq!(
            outcome,
            StepOutcome::Accepted {
                distance_cm: 10_000,
                calc_speed_knots: 194,
            }
        );
        assert_eq!(flight.odometer, 10_000);
        assert_eq!(odo.accepted_steps(), 1);
    }

    #[test]
    fn test_stationary_jitter_rejected() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState {
            odometer: 5_000,
            ..Default::default()
        };

        feed(&mut odo, &mut gps, &mut flight, base(), 0.2);
        let outcome = feed(&mut odo, &mut gps, &mut flight, base(), 0.2);

        assert!(matches!(
            outcome,
            StepOutcome::Rejected {
                distance_cm: 0,
                reason: RejectReason::BelowMinSpeed,
                ..
            }
        ));
        assert_eq!(flight.odometer, 5_000);
        assert_eq!(odo.rejected_steps(), 1);
    }

    #[test]
    fn test_min_speed_threshold_is_exclusive() {
        let mut odo = Odometer::new(test_config());
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        feed(&mut odo, &mut gps, &mut flight, base(), 2.0);
        let at_threshold = feed(&mut odo, &mut gps, &mut flight, base(), 2.0);
        assert!(matches!(
            at_threshold,
            StepOutcome::Rejected {
                reason: RejectReason::BelowMinSpeed,
                ..
            }
        ));

        let above = feed(&mut odo, &mut gps, &mut flight, base(), 2.5);
        assert!(matches!(above, StepOutcome::Accepted { distance_cm: 0, .. }));
    }

    #[test]
    fn test_speed_diff_threshold_is_exclusive() {
        let mut odo = Odometer::new(test_config());
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        // Calculated speed for the 100 m step is 194 kn; 194 - 189 = 5.0 exactly
        feed(&mut odo, &mut gps, &mut flight, base(), 189.0);
        let at_threshold = feed(&mut odo, &mut gps, &mut flight, hundred_m_north(), 189.0);
        assert!(matches!(
            at_threshold,
            StepOutcome::Rejected {
                calc_speed_knots: 194,
                reason: RejectReason::SpeedMismatch,
                ..
            }
        ));
        assert_eq!(flight.odometer, 0);

        let inside = feed(&mut odo, &mut gps, &mut flight, base(), 189.5);
        assert!(matches!(inside, StepOutcome::Accepted { .. }));
        assert_eq!(flight.odometer, 10_000);
    }

    #[test]
    fn test_rejected_step_still_moves_reference() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        feed(&mut odo, &mut gps, &mut flight, base(), 194.0);
        // Outlier: reported speed far from the calculated 194 kn
        let outlier = feed(&mut odo, &mut gps, &mut flight, hundred_m_north(), 20.0);
        assert!(matches!(
            outlier,
            StepOutcome::Rejected {
                reason: RejectReason::SpeedMismatch,
                ..
            }
        ));
        assert_eq!(*odo.state(), OdometerState::Tracking(hundred_m_north()));

        // Measured from the rejected fix, not from base()
        let back = feed(&mut odo, &mut gps, &mut flight, base(), 194.0);
        assert!(matches!(back, StepOutcome::Accepted { distance_cm: 10_000, .. }));
        assert_eq!(flight.odometer, 10_000);
    }

    #[test]
    fn test_odometer_is_monotonic() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();
        let speeds = [0.1, 194.0, 3.0, 194.0, 500.0, 194.0, 0.0, 194.0];

        let mut last_total = flight.odometer;
        for (i, speed) in speeds.iter().enumerate() {
            let position = if i % 2 == 0 { base() } else { hundred_m_north() };
            feed(&mut odo, &mut gps, &mut flight, position, *speed);
            assert!(flight.odometer >= last_total);
            last_total = flight.odometer;
        }
        assert_eq!(odo.accepted_steps() + odo.rejected_steps(), speeds.len() as u64 - 1);
    }

    #[test]
    fn test_altitude_counts_towards_distance() {
        let mut odo = Odometer::new(OdometerConfig {
            max_speed_diff_knots: 1.0,
            ..Default::default()
        });
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        feed(&mut odo, &mut gps, &mut flight, base(), 19.0);
        // 10 m straight climb -> 1000 cm -> 19.4 kn -> 19 kn
        let climb = feed(&mut odo, &mut gps, &mut flight, base().with_alt(810.0), 19.0);
        assert_eq!(
            climb,
            StepOutcome::Accepted {
                distance_cm: 1_000,
                calc_speed_knots: 19,
            }
        );
    }

    #[test]
    fn test_sample_period_scales_calculated_speed() {
        let one_hz = Odometer::default();
        let five_hz = Odometer::new(OdometerConfig {
            sample_period_s: 0.2,
            ..Default::default()
        });
        assert_eq!(one_hz.calculated_speed_knots(10_000), 194);
        assert_eq!(five_hz.calculated_speed_knots(10_000), 971);
    }

    #[test]
    fn test_home_north_of_current() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();
        let home = HomeReference::from_degrees(BASE_LAT + 1000.0 / 111_300.0, BASE_LON);

        gps.publish(base(), 0.0);
        odo.step(&mut gps, &home, &mut flight);

        // Bearing is measured from home towards the current position
        assert_eq!(flight.home_bearing, 180);
        assert_relative_eq!(flight.home_distance, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_home_invalid_leaves_outputs() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState {
            home_bearing: 42,
            home_distance: 3.5,
            ..Default::default()
        };
        let mut home = HomeReference::from_degrees(BASE_LAT + 0.01, BASE_LON);
        home.valid = false;

        gps.publish(base(), 0.0);
        odo.step(&mut gps, &home, &mut flight);
        assert_eq!(flight.home_bearing, 42);
        assert_eq!(flight.home_distance, 3.5);
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut odo = Odometer::default();
        let mut gps = GpsData::default();
        let mut flight = FlightState::default();

        feed(&mut odo, &mut gps, &mut flight, base(), 194.0);
        feed(&mut odo, &mut gps, &mut flight, hundred_m_north(), 194.0);
        odo.reset();

        assert_eq!(*odo.state(), OdometerState::Uninitialized);
        assert_eq!(odo.accepted_steps(), 0);
        let outcome = feed(&mut odo, &mut gps, &mut flight, base(), 194.0);
        assert_eq!(outcome, StepOutcome::FirstFix);
        assert_eq!(flight.odometer, 10_000);
    }
}
