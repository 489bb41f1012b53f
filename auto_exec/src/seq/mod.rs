//! # Motion Sequencer
//!
//! The [`Sequencer`] steps a compiled [`Routine`] through its states, one call to
//! [`Sequencer::advance`] per cycle. It does no I/O of its own: the path executor's busy and
//! fault flags come in through a [`Tick`], and the segment to command along with any action
//! triggers go back out in a [`Step`] for the driver loop to act on.
//!
//! States come in three kinds:
//!
//! - `Transit` - command the entry segment (if any) and move on once the executor is idle.
//! - `TimedHold` - command the entry segment, then the follow-on segment once the entry motion is
//!   done, and hold for a fixed window on the phase timer. The begin action fires once the phase
//!   timer passes `begin_s` and the end action once it passes `end_s`, after which the state is
//!   left. Finishing the motion early does not end the hold.
//! - `Finish` - the last state, the routine completes once the executor is idle.
//!
//! A state's exit conditions are first checked on the cycle after it was entered, so that the
//! executor has had a chance to report busy on the segment it was just given.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod routine;

pub use params::{RoutineParams, StateKindSpec, StateSpec};
pub use routine::{HoldWindow, Routine, RoutineError, StateDef, StateKind};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{convert::Infallible, fmt::Display};

use comms_if::tm::RunStatus;
use log::{debug, error, info, warn};
use util::{module::State, time::Timer};

use crate::{path_exec::ExecutorFault, plan::SegmentId};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sequencer input for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Current time in seconds, on the same base for every tick.
    pub now_s: f64,

    /// Whether the path executor is following a segment.
    pub executor_busy: bool,

    /// Hard fault reported by the path executor.
    pub executor_fault: Option<ExecutorFault>,
}

/// A request for the path executor to follow a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCmd {
    pub segment: SegmentId,

    /// Set only on the first command of the routine.
    pub reset_pose: bool,
}

/// A one-shot action fired inside a timed hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTrigger {
    /// Index of the state the trigger fired in.
    pub state_index: usize,

    pub kind: ActionKind,
}

/// Result of one call to [`Sequencer::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// State index after the step.
    pub state_index: usize,

    /// Triggers fired during the step, in firing order.
    pub triggers: Vec<ActionTrigger>,

    /// Segment to forward to the path executor.
    pub command: Option<SegmentCmd>,

    /// True if a state transition occured during the step.
    pub transitioned: bool,

    pub status: RoutineStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub state_index: usize,
    pub state_name: String,
    pub phase_time_s: f64,
    pub routine_time_s: f64,
    pub status: RoutineStatus,
}

pub struct Sequencer {
    routine: Routine,

    state_index: usize,

    status: RoutineStatus,

    /// Time since the active state was entered, or since its follow-on segment was commanded.
    phase_timer: Timer,

    /// Time since the first cycle.
    routine_timer: Timer,

    /// Time of the latest tick.
    now_s: f64,

    visit: VisitRecord,

    /// Set once any segment has been commanded.
    first_cmd_issued: bool,
}

/// Record of what has happened during the current visit to a state.
#[derive(Debug, Default, Clone, Copy)]
struct VisitRecord {
    /// The timed hold window is running. This is set on entry to holds without a follow-on, and
    /// when the follow-on is commanded for holds with one.
    armed: bool,

    begin_fired: bool,

    end_fired: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Begin,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoutineStatus {
    NotStarted,
    Running,

    /// The finish state's motion is done.
    Complete,

    /// The path executor reported a fault, the routine cannot continue.
    Aborted(ExecutorFault),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Sequencer {
    pub fn new(routine: Routine) -> Self {
        Self {
            routine,
            state_index: 0,
            status: RoutineStatus::NotStarted,
            phase_timer: Timer::default(),
            routine_timer: Timer::default(),
            now_s: 0.0,
            visit: VisitRecord::default(),
            first_cmd_issued: false,
        }
    }

    /// Step the sequencer by one cycle.
    ///
    /// The first call enters the first state. Once the routine has completed or aborted further
    /// calls change nothing and return an empty step.
    pub fn advance(&mut self, tick: &Tick) -> Step {
        let mut step = Step {
            state_index: self.state_index,
            triggers: Vec::new(),
            command: None,
            transitioned: false,
            status: self.status.clone(),
        };

        if self.status.is_finished() {
            return step;
        }

        self.now_s = tick.now_s;

        if let Some(ref fault) = tick.executor_fault {
            error!(
                "Routine {} aborted in {}: {}",
                self.routine.name(),
                self.state_name(),
                fault
            );
            self.status = RoutineStatus::Aborted(fault.clone());
            step.status = self.status.clone();
            return step;
        }

        match self.status {
            RoutineStatus::NotStarted => {
                info!("Starting routine {}", self.routine.name());
                self.status = RoutineStatus::Running;
                self.routine_timer.reset(tick.now_s);
                self.enter(0, &mut step);
            }
            _ => self.step_state(tick, &mut step),
        }

        step.state_index = self.state_index;
        step.status = self.status.clone();

        step
    }

    pub fn state_index(&self) -> usize {
        self.state_index
    }

    pub fn state_name(&self) -> &str {
        self.routine
            .state(self.state_index)
            .map(|s| s.name.as_str())
            .unwrap_or("")
    }

    pub fn status(&self) -> &RoutineStatus {
        &self.status
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    /// Phase timer value at the latest tick.
    pub fn phase_time_s(&self) -> f64 {
        match self.status {
            RoutineStatus::NotStarted => 0.0,
            _ => self.phase_timer.elapsed_s(self.now_s),
        }
    }

    /// Routine timer value at the latest tick.
    pub fn routine_time_s(&self) -> f64 {
        match self.status {
            RoutineStatus::NotStarted => 0.0,
            _ => self.routine_timer.elapsed_s(self.now_s),
        }
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            state_index: self.state_index,
            state_name: String::from(self.state_name()),
            phase_time_s: self.phase_time_s(),
            routine_time_s: self.routine_time_s(),
            status: self.status.clone(),
        }
    }

    /// Evaluate the active state's exit conditions.
    fn step_state(&mut self, tick: &Tick, step: &mut Step) {
        let kind = match self.routine.state(self.state_index) {
            Some(s) => s.kind,
            None => return,
        };

        match kind {
            StateKind::Transit { .. } => {
                if !tick.executor_busy {
                    self.transition(step);
                }
            }
            StateKind::TimedHold {
                follow_on, window, ..
            } => {
                if !self.visit.armed {
                    match follow_on {
                        Some(id) if !tick.executor_busy => {
                            self.command(id, step);
                            self.visit.armed = true;
                            self.phase_timer.reset(tick.now_s);
                        }
                        // Entry motion still running
                        _ => return,
                    }
                }

                let phase_time_s = self.phase_timer.elapsed_s(tick.now_s);

                if phase_time_s > window.begin_s && !self.visit.begin_fired {
                    self.visit.begin_fired = true;
                    self.fire(ActionKind::Begin, phase_time_s, step);
                }

                if phase_time_s > window.end_s && !self.visit.end_fired {
                    self.visit.end_fired = true;
                    self.fire(ActionKind::End, phase_time_s, step);
                    self.transition(step);
                }
            }
            StateKind::Finish { .. } => {
                if !tick.executor_busy {
                    self.status = RoutineStatus::Complete;
                    info!(
                        "Routine {} complete after {:.3} s",
                        self.routine.name(),
                        self.routine_time_s()
                    );
                }
            }
        }
    }

    fn transition(&mut self, step: &mut Step) {
        let next = self.state_index + 1;

        if next >= self.routine.len() {
            // Compilation guarantees the last state is a finish state
            warn!(
                "State {} has no successor, completing routine",
                self.state_name()
            );
            self.status = RoutineStatus::Complete;
            return;
        }

        let from = self.state_index;
        let from_name = String::from(self.state_name());

        self.enter(next, step);
        step.transitioned = true;

        info!(
            "S{} ({}) -> S{} ({}) at {:.3} s",
            from,
            from_name,
            self.state_index,
            self.state_name(),
            self.routine_time_s()
        );
    }

    /// Enter the given state, commanding its entry segment.
    fn enter(&mut self, index: usize, step: &mut Step) {
        self.state_index = index;
        self.phase_timer.reset(self.now_s);
        self.visit = VisitRecord::default();

        let kind = match self.routine.state(index) {
            Some(s) => s.kind,
            None => return,
        };

        if let StateKind::TimedHold {
            follow_on: None, ..
        } = kind
        {
            self.visit.armed = true;
        }

        if let Some(id) = kind.entry() {
            self.command(id, step);
        }
    }

    fn command(&mut self, segment: SegmentId, step: &mut Step) {
        let reset_pose = !self.first_cmd_issued;
        self.first_cmd_issued = true;

        debug!(
            "{} commanding segment {} (reset pose: {})",
            self.state_name(),
            self.routine
                .plan()
                .get(segment)
                .map(|s| s.name())
                .unwrap_or("?"),
            reset_pose
        );

        step.command = Some(SegmentCmd {
            segment,
            reset_pose,
        });
    }

    fn fire(&mut self, kind: ActionKind, phase_time_s: f64, step: &mut Step) {
        info!(
            "{} action fired in {} at {:.3} s",
            kind,
            self.state_name(),
            phase_time_s
        );

        step.triggers.push(ActionTrigger {
            state_index: self.state_index,
            kind,
        });
    }
}

impl State for Sequencer {
    type InputData = Tick;
    type OutputData = Step;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let step = self.advance(input_data);

        Ok((step, self.status_report()))
    }
}

impl RoutineStatus {
    /// True once the routine has completed or aborted.
    pub fn is_finished(&self) -> bool {
        matches!(self, RoutineStatus::Complete | RoutineStatus::Aborted(_))
    }

    pub fn run_status(&self) -> RunStatus {
        match self {
            RoutineStatus::NotStarted => RunStatus::NotStarted,
            RoutineStatus::Running => RunStatus::Running,
            RoutineStatus::Complete => RunStatus::Complete,
            RoutineStatus::Aborted(_) => RunStatus::Aborted,
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Begin => write!(f, "Begin"),
            ActionKind::End => write!(f, "End"),
        }
    }
}
