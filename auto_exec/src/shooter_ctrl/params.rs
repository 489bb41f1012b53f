//! Shooter control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for shooter control
#[derive(Deserialize, Debug, Clone)]
pub struct ShooterParams {

    /// Flywheel velocity held for the whole routine, in encoder ticks per
    /// second
    pub flywheel_tps: f64,

    /// Intake roller power, in the range [-1, 1]
    pub intake_pwr: f64,
}
