//! GPS odometer and home navigation
//!
//! Flat-earth bearing/distance between fixed-point GPS fixes, a per-sample odometer
//! that only counts steps whose implied speed matches the receiver's ground speed,
//! and home bearing/distance reporting.

pub mod config;
pub mod error;
pub mod live_status;
pub mod navigation;
pub mod odometer;
pub mod sensors;
pub mod track;
pub mod types;

pub use config::OdometerConfig;
pub use error::{OdoResult, OdometerError};
pub use navigation::{bearing, displacement_enu, distance_2d, distance_3d};
pub use odometer::{Odometer, OdometerState, RejectReason, StepOutcome};
pub use types::{FlightState, GeoPoint, GpsData, HomeReference, NewSampleFlags, GPS_MULT};
