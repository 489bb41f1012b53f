//! # Path Executor interface
//!
//! The path executor is the motion subsystem which drives the robot along a [`Segment`]. It is
//! owned by the driver loop, which updates it once per cycle and forwards the segment commands
//! produced by the sequencer. The sequencer itself only ever sees the executor's busy flag and
//! fault state, passed in through a [`crate::seq::Tick`].
//!
//! [`SimExecutor`] provides a kinematic stand-in for running routines without a robot.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod sim;

pub use params::SimExecutorParams;
pub use sim::SimExecutor;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::plan::{FieldPose, Segment};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait PathExecutor {
    /// Advance motion execution to the given time. Called once at the start of each cycle.
    fn update(&mut self, now_s: f64);

    /// Begin driving along the given segment, replacing any segment currently being followed.
    ///
    /// If `reset_pose` is set the executor's pose estimate is reset to the start of the segment,
    /// this is done for the first segment of a routine.
    fn follow_segment(&mut self, segment: &Segment, reset_pose: bool);

    /// Returns true while a segment is being followed.
    fn is_busy(&self) -> bool;

    /// The current estimate of the robot's pose.
    fn pose(&self) -> FieldPose;

    /// A hard failure of the executor, if one has occured.
    fn fault(&self) -> Option<ExecutorFault>;

    /// Stop all motion immediately.
    fn halt(&mut self);
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Hard failures of the path executor, from which the routine cannot recover.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutorFault {
    #[error("Motion stalled while following segment {0:?}")]
    Stalled(String),

    #[error("The path executor is unavailable: {0}")]
    Unavailable(String),
}
