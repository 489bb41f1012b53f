//! # Field configuration
//!
//! The numeric data a [`super::SegmentPlan`] is built from. Distances are in inches in the field
//! frame, headings are in degrees.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    /// Pose the robot is placed in before the routine starts.
    pub start_pose: PoseSpec,

    /// The segments of the plan, in the order they are driven.
    pub segments: Vec<SegmentSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoseSpec {
    pub x_in: f64,
    pub y_in: f64,
    pub heading_deg: f64,
}

/// A straight segment between two points, with the heading interpolated linearly from
/// `start_heading_deg` to `end_heading_deg`.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentSpec {
    pub name: String,

    /// Start point as `[x, y]`
    pub start_in: [f64; 2],

    /// End point as `[x, y]`
    pub end_in: [f64; 2],

    pub start_heading_deg: f64,

    pub end_heading_deg: f64,
}
