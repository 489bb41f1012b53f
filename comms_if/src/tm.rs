//! # Routine Telemetry
//!
//! The routine produces one [`RoutineTm`] snapshot per cycle. Telemetry transports and displays
//! consume it as a plain key-value mapping through [`RoutineTm::entries`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::eqpt::shooter::ShooterDems;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the routine at the end of a cycle.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoutineTm {
    /// Number of the cycle which produced this snapshot.
    pub cycle: u64,

    /// Index of the active sequencer state.
    pub state_index: usize,

    /// Name of the active sequencer state.
    pub state_name: String,

    /// Overall status of the routine.
    pub status: RunStatus,

    /// Robot position along the field X axis in inches.
    pub x_in: f64,

    /// Robot position along the field Y axis in inches.
    pub y_in: f64,

    /// Robot heading in degrees.
    pub heading_deg: f64,

    /// Time since the active state was entered (or its timer was last reset).
    pub phase_time_s: f64,

    /// Time since the routine started.
    pub routine_time_s: f64,

    /// Current shooter demands.
    pub shooter: ShooterDems,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Overall status of a routine run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunStatus {
    /// The routine has not been stepped yet.
    NotStarted,

    /// The routine is executing.
    Running,

    /// The final state's motion finished, the routine is over.
    Complete,

    /// The path executor failed, the routine was abandoned.
    Aborted,

    /// The driver cancelled the routine.
    Cancelled,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoutineTm {
    /// The snapshot as an ordered list of key-value pairs.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Path State", self.state_index.to_string()),
            ("State Name", self.state_name.clone()),
            ("Status", self.status.to_string()),
            ("X", format!("{:.3}", self.x_in)),
            ("Y", format!("{:.3}", self.y_in)),
            ("Heading", format!("{:.2}", self.heading_deg)),
            ("Phase Time", format!("{:.3}", self.phase_time_s)),
            ("Routine Time", format!("{:.3}", self.routine_time_s)),
            ("Flywheel", format!("{:.0}", self.shooter.flywheel_tps)),
            ("Transfer", format!("{:?}", self.shooter.transfer)),
        ]
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        RunStatus::NotStarted
    }
}

impl RunStatus {
    /// Returns true if the routine will not do any more work.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RunStatus::Complete | RunStatus::Aborted | RunStatus::Cancelled
        )
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::NotStarted => write!(f, "NotStarted"),
            RunStatus::Running => write!(f, "Running"),
            RunStatus::Complete => write!(f, "Complete"),
            RunStatus::Aborted => write!(f, "Aborted"),
            RunStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}
