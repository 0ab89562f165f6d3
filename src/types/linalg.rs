//! Fixed-size vector types for local navigation
//!
//! Keeps the ENU frame dimension checked at compile time.

use nalgebra::SVector;

// ===== Frame Dimensions =====
pub const ENU_DIM: usize = 3; // (east, north, up)

/// Local East-North-Up displacement in meters
pub type EnuVec = SVector<f64, ENU_DIM>;
