//! # Communications interface crate.
//!
//! Provides the interface structures exchanged between the routine executable and its
//! collaborators: demands for the shooting mechanism and the per-cycle telemetry snapshot.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Demand definitions for equipment (like the shooter)
pub mod eqpt;

/// Telemetry definitions
pub mod tm;
