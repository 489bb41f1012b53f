//! Simulated path executor
//!
//! Moves the robot along each commanded segment at a constant speed, with the heading following
//! the segment's heading interpolation. The time to drive a segment is the longer of the time to
//! cover its length at `speed_ips` and the time to make its heading change at `turn_rate_dps`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, error, warn};
use util::maths::clamp;

use super::{ExecutorFault, PathExecutor, SimExecutorParams};
use crate::plan::{FieldPose, Segment};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SimExecutor {
    params: SimExecutorParams,

    /// Executing mode
    mode: SimMode,

    pose: FieldPose,

    /// Time of the last call to `update`
    last_update_s: Option<f64>,
}

struct ActiveSegment {
    segment: Segment,

    /// Time spent on the segment so far
    elapsed_s: f64,

    /// Total time needed to drive the segment
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

enum SimMode {
    Idle,
    Following(ActiveSegment),
    Faulted(ExecutorFault),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimExecutor {
    /// Create a new idle executor with the robot at the given pose.
    pub fn new(params: SimExecutorParams, start_pose: FieldPose) -> Self {
        Self {
            params,
            mode: SimMode::Idle,
            pose: start_pose,
            last_update_s: None,
        }
    }

    /// Force the executor into a fault, as if the drive hardware had failed.
    pub fn inject_fault(&mut self, fault: ExecutorFault) {
        error!("Path executor fault: {}", fault);
        self.mode = SimMode::Faulted(fault);
    }

    /// Time needed to drive the given segment.
    fn segment_duration_s(&self, segment: &Segment) -> f64 {
        let drive_s = segment.length_in() / self.params.speed_ips;
        let turn_s = segment.heading_change_rad().to_degrees() / self.params.turn_rate_dps;

        drive_s.max(turn_s)
    }

    /// Mode following a segment.
    fn mode_following(active: &mut ActiveSegment, dt_s: f64, pose: &mut FieldPose) -> bool {
        active.elapsed_s += dt_s;

        // Zero length segments complete on the first update
        let fraction = if active.duration_s > 0.0 {
            clamp(&(active.elapsed_s / active.duration_s), &0.0, &1.0)
        } else {
            1.0
        };

        *pose = active.segment.pose_at(fraction);

        fraction >= 1.0
    }
}

impl PathExecutor for SimExecutor {
    fn update(&mut self, now_s: f64) {
        let dt_s = match self.last_update_s {
            Some(last_s) => (now_s - last_s).max(0.0),
            None => 0.0,
        };
        self.last_update_s = Some(now_s);

        let finished = match self.mode {
            SimMode::Following(ref mut active) => {
                Self::mode_following(active, dt_s, &mut self.pose)
            }
            SimMode::Idle | SimMode::Faulted(_) => false,
        };

        if finished {
            if let SimMode::Following(ref active) = self.mode {
                debug!(
                    "Segment {} complete after {:.3} s",
                    active.segment.name(),
                    active.elapsed_s
                );
            }
            self.mode = SimMode::Idle;
        }
    }

    fn follow_segment(&mut self, segment: &Segment, reset_pose: bool) {
        if let SimMode::Faulted(ref fault) = self.mode {
            warn!(
                "Segment {} ignored, executor is faulted ({})",
                segment.name(),
                fault
            );
            return;
        }

        if reset_pose {
            self.pose = segment.start();
        }

        let duration_s = self.segment_duration_s(segment);
        if !duration_s.is_finite() || duration_s > self.params.max_segment_time_s {
            self.inject_fault(ExecutorFault::Stalled(String::from(segment.name())));
            return;
        }

        debug!(
            "Following segment {} ({:.2} in, {:.3} s)",
            segment.name(),
            segment.length_in(),
            duration_s
        );

        self.mode = SimMode::Following(ActiveSegment {
            segment: segment.clone(),
            elapsed_s: 0.0,
            duration_s,
        });
    }

    fn is_busy(&self) -> bool {
        matches!(self.mode, SimMode::Following(_))
    }

    fn pose(&self) -> FieldPose {
        self.pose
    }

    fn fault(&self) -> Option<ExecutorFault> {
        match self.mode {
            SimMode::Faulted(ref f) => Some(f.clone()),
            _ => None,
        }
    }

    fn halt(&mut self) {
        if let SimMode::Following(ref active) = self.mode {
            debug!("Halting on segment {}", active.segment.name());
            self.mode = SimMode::Idle;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plan::{Alliance, FieldConfig, PoseSpec, SegmentPlan, SegmentSpec};

    fn params() -> SimExecutorParams {
        SimExecutorParams {
            speed_ips: 10.0,
            turn_rate_dps: 90.0,
            max_segment_time_s: 5.0,
        }
    }

    fn plan() -> SegmentPlan {
        let seg = |name: &str, start: [f64; 2], end: [f64; 2], h1: f64| SegmentSpec {
            name: String::from(name),
            start_in: start,
            end_in: end,
            start_heading_deg: 0.0,
            end_heading_deg: h1,
        };

        SegmentPlan::build(
            &FieldConfig {
                start_pose: PoseSpec {
                    x_in: 72.0,
                    y_in: 8.0,
                    heading_deg: 90.0,
                },
                segments: vec![
                    seg("drive", [0.0, 0.0], [20.0, 0.0], 0.0),
                    seg("turn", [20.0, 0.0], [20.0, 0.0], 180.0),
                    seg("far", [0.0, 0.0], [100.0, 0.0], 0.0),
                ],
            },
            Alliance::Blue,
        )
        .unwrap()
    }

    fn segment<'a>(plan: &'a SegmentPlan, name: &str) -> &'a Segment {
        plan.get(plan.id(name).unwrap()).unwrap()
    }

    #[test]
    fn test_follow_segment() {
        let plan = plan();
        let mut exec = SimExecutor::new(params(), plan.start_pose());

        exec.update(0.0);
        assert!(!exec.is_busy());
        assert_eq!(exec.pose().x_in(), 72.0);

        // Reset the pose onto the start of the first segment
        exec.follow_segment(segment(&plan, "drive"), true);
        assert!(exec.is_busy());
        assert_eq!(exec.pose().x_in(), 0.0);

        exec.update(1.0);
        assert!(exec.is_busy());
        assert!((exec.pose().x_in() - 10.0).abs() < 1e-9);

        exec.update(2.0);
        assert!(!exec.is_busy());
        assert!((exec.pose().x_in() - 20.0).abs() < 1e-9);
        assert!(exec.fault().is_none());
    }

    #[test]
    fn test_turn_in_place() {
        let plan = plan();
        let mut exec = SimExecutor::new(params(), plan.start_pose());

        exec.update(0.0);
        exec.follow_segment(segment(&plan, "turn"), false);

        // 180 deg at 90 deg/s
        exec.update(1.0);
        assert!(exec.is_busy());
        assert!((exec.pose().heading_deg() - 90.0).abs() < 1e-6);

        exec.update(2.0);
        assert!(!exec.is_busy());
    }

    #[test]
    fn test_stall_and_halt() {
        let plan = plan();
        let mut exec = SimExecutor::new(params(), plan.start_pose());

        exec.update(0.0);
        exec.follow_segment(segment(&plan, "drive"), true);
        exec.update(0.5);
        exec.halt();
        assert!(!exec.is_busy());

        // 100 in at 10 in/s is longer than the 5 s limit
        exec.follow_segment(segment(&plan, "far"), false);
        assert!(!exec.is_busy());
        assert_eq!(exec.fault(), Some(ExecutorFault::Stalled(String::from("far"))));

        // Faulted executors ignore new segments
        exec.follow_segment(segment(&plan, "drive"), false);
        assert!(!exec.is_busy());
    }
}
