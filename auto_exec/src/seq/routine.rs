//! # Routine definition
//!
//! A [`Routine`] is the compiled form of a [`RoutineParams`]: the segment plan together with the
//! list of states, where every segment name has been resolved to a [`SegmentId`] in the plan.
//! All configuration checks happen here, before the routine starts, so that the sequencer never
//! has to deal with a bad reference while running.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use log::info;

use super::params::{RoutineParams, StateKindSpec, StateSpec};
use crate::plan::{Alliance, PlanError, SegmentId, SegmentPlan};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Routine {
    name: String,
    plan: SegmentPlan,
    states: Vec<StateDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateDef {
    pub name: String,
    pub kind: StateKind,
}

/// Time window of a timed hold. Both times are measured on the phase timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldWindow {
    pub begin_s: f64,
    pub end_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateKind {
    /// Left as soon as the path executor is idle.
    Transit { entry: Option<SegmentId> },

    /// Held until the end of the window, regardless of motion.
    TimedHold {
        entry: Option<SegmentId>,
        follow_on: Option<SegmentId>,
        window: HoldWindow,
    },

    /// The last state, the routine completes when the path executor is idle.
    Finish { entry: Option<SegmentId> },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutineError {
    #[error("Invalid segment plan: {0}")]
    Plan(#[from] PlanError),

    #[error("The routine has no states")]
    NoStates,

    #[error("The last state ({0}) must be a finish state")]
    LastStateNotFinish(String),

    #[error("State {0} is a finish state but is not the last state")]
    FinishNotLast(String),

    #[error("Timed hold {0} needs both begin_s and end_s")]
    MissingWindow(String),

    #[error("Timed hold {name} has an invalid window ({begin_s} s, {end_s} s), expected 0 <= begin_s < end_s")]
    InvalidWindow { name: String, begin_s: f64, end_s: f64 },

    #[error("State {0} has a follow_on segment, only timed holds may have one")]
    UnexpectedFollowOn(String),

    #[error("State {state} references an unknown segment: {source}")]
    UnknownSegment { state: String, source: PlanError },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Routine {
    /// Build the segment plan for the given alliance and compile the routine against it.
    pub fn from_params(params: &RoutineParams, alliance: Alliance) -> Result<Self, RoutineError> {
        let plan = SegmentPlan::build(&params.field, alliance)?;

        Self::compile(params, plan)
    }

    /// Compile the routine's states against an already built plan.
    pub fn compile(params: &RoutineParams, plan: SegmentPlan) -> Result<Self, RoutineError> {
        if params.states.is_empty() {
            return Err(RoutineError::NoStates);
        }

        let last_index = params.states.len() - 1;
        let mut states = Vec::with_capacity(params.states.len());

        for (index, spec) in params.states.iter().enumerate() {
            let name = spec
                .name
                .clone()
                .unwrap_or_else(|| format!("S{}", index));

            let kind = compile_state(&name, spec, &plan)?;

            match kind {
                StateKind::Finish { .. } if index != last_index => {
                    return Err(RoutineError::FinishNotLast(name))
                }
                StateKind::Transit { .. } | StateKind::TimedHold { .. } if index == last_index => {
                    return Err(RoutineError::LastStateNotFinish(name))
                }
                _ => (),
            }

            states.push(StateDef { name, kind });
        }

        info!(
            "Routine {} ({} alliance) compiled with {} states over {} segments",
            params.name,
            plan.alliance(),
            states.len(),
            plan.len()
        );

        Ok(Self {
            name: params.name.clone(),
            plan,
            states,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plan(&self) -> &SegmentPlan {
        &self.plan
    }

    pub fn state(&self, index: usize) -> Option<&StateDef> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[StateDef] {
        &self.states
    }

    /// Number of states in the routine.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateKind {
    /// The segment commanded on entry to the state.
    pub fn entry(&self) -> Option<SegmentId> {
        match self {
            StateKind::Transit { entry }
            | StateKind::TimedHold { entry, .. }
            | StateKind::Finish { entry } => *entry,
        }
    }
}

impl Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateKind::Transit { .. } => write!(f, "Transit"),
            StateKind::TimedHold { .. } => write!(f, "TimedHold"),
            StateKind::Finish { .. } => write!(f, "Finish"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn compile_state(
    name: &str,
    spec: &StateSpec,
    plan: &SegmentPlan,
) -> Result<StateKind, RoutineError> {
    let resolve = |seg_name: &Option<String>| -> Result<Option<SegmentId>, RoutineError> {
        match seg_name {
            Some(n) => plan
                .id(n)
                .map(Some)
                .map_err(|source| RoutineError::UnknownSegment {
                    state: String::from(name),
                    source,
                }),
            None => Ok(None),
        }
    };

    let entry = resolve(&spec.segment)?;

    if spec.kind != StateKindSpec::TimedHold && spec.follow_on.is_some() {
        return Err(RoutineError::UnexpectedFollowOn(String::from(name)));
    }

    Ok(match spec.kind {
        StateKindSpec::Transit => StateKind::Transit { entry },
        StateKindSpec::Finish => StateKind::Finish { entry },
        StateKindSpec::TimedHold => {
            let (begin_s, end_s) = match (spec.begin_s, spec.end_s) {
                (Some(b), Some(e)) => (b, e),
                _ => return Err(RoutineError::MissingWindow(String::from(name))),
            };

            // Written so that NaNs fail the check
            let valid = begin_s.is_finite() && end_s.is_finite() && begin_s >= 0.0 && begin_s < end_s;
            if !valid {
                return Err(RoutineError::InvalidWindow {
                    name: String::from(name),
                    begin_s,
                    end_s,
                });
            }

            StateKind::TimedHold {
                entry,
                follow_on: resolve(&spec.follow_on)?,
                window: HoldWindow { begin_s, end_s },
            }
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn close() -> RoutineParams {
        util::params::parse(include_str!("../../../params/routines/close.toml")).unwrap()
    }

    fn parse(states: &str) -> RoutineParams {
        let doc = format!(
            "name = \"test\"\n{}\n\
            [field.start_pose]\nx_in = 0.0\ny_in = 0.0\nheading_deg = 0.0\n\
            [[field.segments]]\nname = \"a\"\nstart_in = [0.0, 0.0]\nend_in = [10.0, 0.0]\n\
            start_heading_deg = 0.0\nend_heading_deg = 0.0\n",
            states
        );
        util::params::parse(&doc).unwrap()
    }

    #[test]
    fn test_compile_close() {
        let routine = Routine::from_params(&close(), Alliance::Blue).unwrap();
        let plan = routine.plan();

        assert_eq!(routine.name(), "close");
        assert_eq!(routine.len(), 9);

        assert_eq!(
            routine.state(0).unwrap().kind,
            StateKind::TimedHold {
                entry: Some(plan.id("shoot_preload").unwrap()),
                follow_on: None,
                window: HoldWindow {
                    begin_s: 8.0,
                    end_s: 13.0
                },
            }
        );
        assert_eq!(routine.state(1).unwrap().kind, StateKind::Transit { entry: None });
        assert_eq!(
            routine.state(3).unwrap().kind,
            StateKind::TimedHold {
                entry: Some(plan.id("intake_field_1").unwrap()),
                follow_on: Some(plan.id("shoot_field_1").unwrap()),
                window: HoldWindow {
                    begin_s: 8.0,
                    end_s: 13.0
                },
            }
        );
        assert_eq!(
            routine.state(8).unwrap().kind,
            StateKind::Finish {
                entry: Some(plan.id("strafe_off_line").unwrap())
            }
        );
        assert_eq!(routine.state(8).unwrap().name, "strafe_off_line");
        assert!(routine.state(9).is_none());
    }

    #[test]
    fn test_default_names() {
        let routine = Routine::from_params(
            &parse("[[states]]\nkind = \"transit\"\n[[states]]\nkind = \"finish\"\nsegment = \"a\"\n"),
            Alliance::Blue,
        )
        .unwrap();

        assert_eq!(routine.state(0).unwrap().name, "S0");
        assert_eq!(routine.state(1).unwrap().name, "S1");
    }

    #[test]
    fn test_unknown_segment() {
        let err = Routine::from_params(
            &parse("[[states]]\nname = \"go\"\nkind = \"transit\"\nsegment = \"b\"\n[[states]]\nkind = \"finish\"\n"),
            Alliance::Blue,
        )
        .unwrap_err();

        assert_eq!(
            err,
            RoutineError::UnknownSegment {
                state: String::from("go"),
                source: PlanError::MissingSegment(String::from("b"))
            }
        );
    }

    #[test]
    fn test_structure_errors() {
        let mut params = parse("[[states]]\nkind = \"finish\"\n");
        params.states.clear();
        assert_eq!(
            Routine::from_params(&params, Alliance::Blue).unwrap_err(),
            RoutineError::NoStates
        );

        assert_eq!(
            Routine::from_params(&parse("[[states]]\nkind = \"transit\"\n"), Alliance::Blue)
                .unwrap_err(),
            RoutineError::LastStateNotFinish(String::from("S0"))
        );

        assert_eq!(
            Routine::from_params(
                &parse("[[states]]\nkind = \"finish\"\n[[states]]\nkind = \"finish\"\n"),
                Alliance::Blue
            )
            .unwrap_err(),
            RoutineError::FinishNotLast(String::from("S0"))
        );

        assert_eq!(
            Routine::from_params(
                &parse("[[states]]\nkind = \"transit\"\nfollow_on = \"a\"\n[[states]]\nkind = \"finish\"\n"),
                Alliance::Blue
            )
            .unwrap_err(),
            RoutineError::UnexpectedFollowOn(String::from("S0"))
        );
    }

    #[test]
    fn test_window_errors() {
        assert_eq!(
            Routine::from_params(
                &parse("[[states]]\nkind = \"timed_hold\"\nbegin_s = 8.0\n[[states]]\nkind = \"finish\"\n"),
                Alliance::Blue
            )
            .unwrap_err(),
            RoutineError::MissingWindow(String::from("S0"))
        );

        assert_eq!(
            Routine::from_params(
                &parse("[[states]]\nkind = \"timed_hold\"\nbegin_s = 13.0\nend_s = 8.0\n[[states]]\nkind = \"finish\"\n"),
                Alliance::Blue
            )
            .unwrap_err(),
            RoutineError::InvalidWindow {
                name: String::from("S0"),
                begin_s: 13.0,
                end_s: 8.0
            }
        );

        assert!(Routine::from_params(
            &parse("[[states]]\nkind = \"timed_hold\"\nbegin_s = -1.0\nend_s = 8.0\n[[states]]\nkind = \"finish\"\n"),
            Alliance::Blue
        )
        .is_err());
    }
}
