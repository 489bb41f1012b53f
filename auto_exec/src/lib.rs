//! # Autonomous routine library.
//!
//! This library allows other crates in the workspace, and the `auto_exec` binary, to access the
//! items defined inside the autonomous routine crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Executable parameters
pub mod params;

/// Path executor interface - drives the robot along segments, plus a simulated implementation
pub mod path_exec;

/// Segment plan - the named motion segments a routine is made of
pub mod plan;

/// Routine runner - the per-cycle driver loop around the sequencer
pub mod runner;

/// Motion sequencer - steps a routine through its states
pub mod seq;

/// Shooter control - converts action triggers into shooter demands
pub mod shooter_ctrl;
