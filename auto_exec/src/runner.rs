//! # Routine Runner
//!
//! The runner is the driver loop around the [`Sequencer`]. Each call to
//! [`RoutineRunner::cycle`] updates the path executor, steps the sequencer, hands any action
//! triggers to the [`ActionSink`], forwards segment commands to the executor and produces the
//! cycle's [`RoutineTm`] snapshot.
//!
//! Cancellation is checked at the start of each cycle, before the sequencer is stepped. Once
//! cancelled, completed or aborted, the executor and actuators are halted and the sequencer is not
//! stepped again.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use comms_if::tm::{RoutineTm, RunStatus};
use log::{debug, info, warn};
use util::module::State;

use crate::{
    path_exec::PathExecutor,
    plan::SegmentId,
    seq::{ActionTrigger, SegmentCmd, Sequencer, Tick},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Consumer of the sequencer's action triggers, i.e. the robot's actuators.
pub trait ActionSink {
    /// Act on a trigger. Called once per trigger, in firing order.
    fn on_trigger(&mut self, trigger: &ActionTrigger);

    /// Stop all actuators.
    fn halt(&mut self);

    /// Add the sink's own data to the cycle's telemetry.
    fn fill_tm(&self, _tm: &mut RoutineTm) {}
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle used to cancel a running routine, possibly from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

pub struct RoutineRunner<E, A> {
    seq: Sequencer,
    executor: E,
    actions: A,

    cancel: CancelToken,

    /// The routine is cancelled once its routine time exceeds this.
    max_duration_s: Option<f64>,

    cancelled: bool,

    /// Set once the executor and actuators have been halted at the end of the routine.
    halted: bool,

    num_cycles: u64,

    last_tm: RoutineTm,
}

/// Output of one runner cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub tm: RoutineTm,
    pub triggers: Vec<ActionTrigger>,
    pub command: Option<SegmentCmd>,
    pub transitioned: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("The sequencer commanded segment {0:?} which is not in the plan")]
    UnknownSegment(SegmentId),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl<E, A> RoutineRunner<E, A>
where
    E: PathExecutor,
    A: ActionSink,
{
    pub fn new(seq: Sequencer, executor: E, actions: A) -> Self {
        Self {
            seq,
            executor,
            actions,
            cancel: CancelToken::new(),
            max_duration_s: None,
            cancelled: false,
            halted: false,
            num_cycles: 0,
            last_tm: RoutineTm::default(),
        }
    }

    /// Cancel the routine once it has run for longer than the given time.
    pub fn with_max_duration(mut self, max_duration_s: f64) -> Self {
        self.max_duration_s = Some(max_duration_s);
        self
    }

    /// Get a token which can be used to cancel this runner.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one cycle of the routine at the given time.
    pub fn cycle(&mut self, now_s: f64) -> Result<CycleReport, RunnerError> {
        let mut report = CycleReport {
            tm: self.last_tm.clone(),
            triggers: Vec::new(),
            command: None,
            transitioned: false,
        };

        // ---- TERMINATION ----

        if self.is_finished() {
            return Ok(report);
        }

        if self.cancel.is_cancelled() {
            info!(
                "Routine cancelled in S{} ({})",
                self.seq.state_index(),
                self.seq.state_name()
            );
            self.cancelled = true;
            self.halt();

            self.last_tm = self.build_tm();
            report.tm = self.last_tm.clone();
            return Ok(report);
        }

        // ---- PATH EXECUTOR ----

        self.executor.update(now_s);

        let tick = Tick {
            now_s,
            executor_busy: self.executor.is_busy(),
            executor_fault: self.executor.fault(),
        };

        // ---- SEQUENCER ----

        let (step, _) = match self.seq.proc(&tick) {
            Ok(o) => o,
            Err(e) => match e {},
        };

        // ---- ACTIONS ----

        for trigger in step.triggers.iter() {
            self.actions.on_trigger(trigger);
        }

        if let Some(cmd) = step.command {
            let segment = self
                .seq
                .routine()
                .plan()
                .get(cmd.segment)
                .ok_or(RunnerError::UnknownSegment(cmd.segment))?;

            self.executor.follow_segment(segment, cmd.reset_pose);
        }

        if step.status.is_finished() {
            self.halt();
        }

        // ---- LIMITS ----

        if let Some(max_s) = self.max_duration_s {
            if !step.status.is_finished() && self.seq.routine_time_s() > max_s {
                warn!(
                    "Routine has run for {:.3} s, more than the limit of {:.3} s, cancelling",
                    self.seq.routine_time_s(),
                    max_s
                );
                self.cancel.cancel();
            }
        }

        // ---- TELEMETRY ----

        self.num_cycles += 1;
        self.last_tm = self.build_tm();

        report.tm = self.last_tm.clone();
        report.triggers = step.triggers;
        report.command = step.command;
        report.transitioned = step.transitioned;

        Ok(report)
    }

    /// True once the routine has completed, aborted, or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.cancelled || self.seq.status().is_finished()
    }

    pub fn run_status(&self) -> RunStatus {
        if self.cancelled {
            RunStatus::Cancelled
        } else {
            self.seq.status().run_status()
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    /// Number of cycles in which the sequencer was stepped.
    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    fn halt(&mut self) {
        if self.halted {
            return;
        }

        debug!("Halting path executor and actuators");
        self.executor.halt();
        self.actions.halt();
        self.halted = true;
    }

    fn build_tm(&self) -> RoutineTm {
        let pose = self.executor.pose();

        let mut tm = RoutineTm {
            cycle: self.num_cycles,
            state_index: self.seq.state_index(),
            state_name: String::from(self.seq.state_name()),
            status: self.run_status(),
            x_in: pose.x_in(),
            y_in: pose.y_in(),
            heading_deg: pose.heading_deg(),
            phase_time_s: self.seq.phase_time_s(),
            routine_time_s: self.seq.routine_time_s(),
            ..Default::default()
        };

        self.actions.fill_tm(&mut tm);

        tm
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        path_exec::{ExecutorFault, SimExecutor, SimExecutorParams},
        plan::Alliance,
        seq::{ActionKind, Routine, RoutineParams},
        shooter_ctrl::{ShooterCtrl, ShooterParams},
    };
    use comms_if::eqpt::shooter::ShooterDems;

    const CYCLE_PERIOD_S: f64 = 0.1;

    fn runner(alliance: Alliance) -> RoutineRunner<SimExecutor, ShooterCtrl> {
        let params: RoutineParams =
            util::params::parse(include_str!("../../params/routines/close.toml")).unwrap();
        let routine = Routine::from_params(&params, alliance).unwrap();

        let executor = SimExecutor::new(
            SimExecutorParams {
                speed_ips: 30.0,
                turn_rate_dps: 180.0,
                max_segment_time_s: 10.0,
            },
            routine.plan().start_pose(),
        );
        let shooter = ShooterCtrl::new(ShooterParams {
            flywheel_tps: 4200.0,
            intake_pwr: 1.0,
        });

        RoutineRunner::new(Sequencer::new(routine), executor, shooter)
    }

    fn run(runner: &mut RoutineRunner<SimExecutor, ShooterCtrl>, from: u64, to: u64) -> Vec<CycleReport> {
        (from..to)
            .map(|i| runner.cycle(i as f64 * CYCLE_PERIOD_S).unwrap())
            .collect()
    }

    #[test]
    fn test_close_routine() {
        let mut runner = runner(Alliance::Blue);

        let reports = run(&mut runner, 0, 2000);

        assert!(runner.is_finished());
        assert_eq!(runner.run_status(), RunStatus::Complete);
        assert_eq!(runner.sequencer().state_index(), 8);
        assert_eq!(runner.actions().num_discharges(), 3);
        assert_eq!(runner.actions().dems(), ShooterDems::stopped());
        assert!(!runner.executor().is_busy());

        // Ends at the end of the strafe off the line
        let tm = &reports.last().unwrap().tm;
        assert_eq!(tm.status, RunStatus::Complete);
        assert!((tm.x_in - 56.996).abs() < 1e-6);
        assert!((tm.y_in - 115.401).abs() < 1e-6);

        let begins = reports
            .iter()
            .flat_map(|r| r.triggers.iter())
            .filter(|t| t.kind == ActionKind::Begin)
            .count();
        assert_eq!(begins, 3);

        // Only the first command resets the pose
        let cmds: Vec<SegmentCmd> = reports.iter().filter_map(|r| r.command).collect();
        assert_eq!(cmds.len(), 8);
        assert!(cmds[0].reset_pose);
        assert!(cmds[1..].iter().all(|c| !c.reset_pose));

        // Feeding while a report says so
        let feeding = reports
            .iter()
            .find(|r| r.tm.shooter.is_discharging())
            .unwrap();
        assert_eq!(feeding.tm.state_index, 0);
        assert!(feeding.tm.phase_time_s > 8.0);
    }

    #[test]
    fn test_red_routine() {
        let mut runner = runner(Alliance::Red);

        let reports = run(&mut runner, 0, 2000);
        let tm = &reports.last().unwrap().tm;

        assert_eq!(tm.status, RunStatus::Complete);
        assert!((tm.x_in - (144.0 - 56.996)).abs() < 1e-6);
        assert!((tm.y_in - 115.401).abs() < 1e-6);
    }

    #[test]
    fn test_cancel() {
        let mut runner = runner(Alliance::Blue);
        let token = runner.cancel_token();

        run(&mut runner, 0, 50);
        assert_eq!(runner.run_status(), RunStatus::Running);

        token.cancel();
        let report = runner.cycle(5.0).unwrap();
        assert_eq!(report.tm.status, RunStatus::Cancelled);
        assert!(runner.is_finished());
        assert!(!runner.executor().is_busy());
        assert_eq!(runner.actions().dems(), ShooterDems::stopped());

        // Nothing is stepped after cancellation
        let cycles = runner.num_cycles();
        let report = runner.cycle(20.0).unwrap();
        assert_eq!(runner.num_cycles(), cycles);
        assert!(report.triggers.is_empty());
        assert_eq!(report.tm.status, RunStatus::Cancelled);
    }

    #[test]
    fn test_max_duration() {
        let mut runner = runner(Alliance::Blue).with_max_duration(5.0);

        run(&mut runner, 0, 100);

        assert_eq!(runner.run_status(), RunStatus::Cancelled);
        assert!(runner.sequencer().routine_time_s() > 5.0);
        assert!(runner.sequencer().routine_time_s() < 5.3);
    }

    #[test]
    fn test_fault_aborts() {
        let mut runner = runner(Alliance::Blue);

        run(&mut runner, 0, 5);
        runner
            .executor_mut()
            .inject_fault(ExecutorFault::Unavailable(String::from("drive offline")));

        let report = runner.cycle(0.5).unwrap();
        assert_eq!(report.tm.status, RunStatus::Aborted);
        assert_eq!(runner.run_status(), RunStatus::Aborted);
        assert_eq!(runner.actions().dems(), ShooterDems::stopped());
        assert!(runner.is_finished());
    }
}
