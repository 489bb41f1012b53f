//! Simulated path executor parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated path executor
#[derive(Deserialize, Debug, Clone)]
pub struct SimExecutorParams {

    /// Linear speed along a segment in inches per second
    pub speed_ips: f64,

    /// Turn rate in degrees per second
    pub turn_rate_dps: f64,

    /// Segments which would take longer than this to drive are reported as
    /// a stall.
    pub max_segment_time_s: f64,
}
