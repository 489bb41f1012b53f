//! # Routine Parameters
//!
//! A routine file holds the field configuration the segment plan is built from, and the
//! declarative list of sequencer states which drive it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::plan::FieldConfig;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RoutineParams {
    pub name: String,

    /// States of the routine, in execution order. The last state must be a `finish` state.
    pub states: Vec<StateSpec>,

    pub field: FieldConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateSpec {
    /// Name used in logs and telemetry, defaults to `S<index>`.
    #[serde(default)]
    pub name: Option<String>,

    pub kind: StateKindSpec,

    /// Segment commanded on entry to the state.
    #[serde(default)]
    pub segment: Option<String>,

    /// Segment commanded once the entry segment has finished, timed holds only.
    #[serde(default)]
    pub follow_on: Option<String>,

    /// Time after which the begin action fires, timed holds only.
    #[serde(default)]
    pub begin_s: Option<f64>,

    /// Time after which the end action fires and the state is left, timed holds only.
    #[serde(default)]
    pub end_s: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKindSpec {
    Transit,
    TimedHold,
    Finish,
}
