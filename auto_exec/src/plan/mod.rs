//! # Segment Plan
//!
//! The plan is the ordered, named set of motion segments a routine drives. It is built once, at
//! routine start, from a [`FieldConfig`] and is never modified afterwards. The sequencer only ever
//! holds [`SegmentId`] handles into the plan, which can only be obtained by looking a name up in
//! the plan, so that a segment which isn't part of the plan can never be commanded.
//!
//! Routines are written for the blue alliance. The red alliance variant of a routine is the blue
//! one mirrored about the field's centre line, which is applied when the plan is built.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
pub use params::{FieldConfig, PoseSpec, SegmentSpec};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Display, str::FromStr};

use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use util::maths::{get_ang_dist, wrap_pi};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Width of the (square) field in inches.
pub const FIELD_WIDTH_IN: f64 = 144.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose (position and heading) in the field frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPose {
    /// The position in the field frame, in inches
    pub position_in: Vector2<f64>,

    /// The heading in radians, measured anticlockwise from the field +X axis
    pub heading_rad: f64,
}

/// An immutable motion segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    name: String,
    start: FieldPose,
    end: FieldPose,
    heading: HeadingInterp,
}

/// Handle to a segment within a [`SegmentPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentId(usize);

/// The ordered, named collection of segments driven by a routine.
#[derive(Debug, Clone)]
pub struct SegmentPlan {
    segments: Vec<Segment>,
    start_pose: FieldPose,
    alliance: Alliance,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How the heading changes along a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HeadingInterp {
    /// Heading changes linearly with progress along the segment, taking the shortest direction
    /// of rotation.
    Linear { start_rad: f64, end_rad: f64 },
}

/// The alliance the routine is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Blue,
    Red,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("The field configuration contains no segments")]
    Empty,

    #[error("Segment {0:?} is defined more than once")]
    DuplicateSegment(String),

    #[error("Segment {0:?} has a non-finite {1}")]
    NonFiniteValue(String, &'static str),

    #[error("Segment {0:?} is not in the plan")]
    MissingSegment(String),
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown alliance {0:?}, expected \"blue\" or \"red\"")]
pub struct ParseAllianceError(String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FieldPose {
    pub fn new(x_in: f64, y_in: f64, heading_rad: f64) -> Self {
        Self {
            position_in: Vector2::new(x_in, y_in),
            heading_rad,
        }
    }

    pub fn x_in(&self) -> f64 {
        self.position_in[0]
    }

    pub fn y_in(&self) -> f64 {
        self.position_in[1]
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_rad.to_degrees()
    }

    /// Mirror the pose about the field centre line (x = [`FIELD_WIDTH_IN`] / 2).
    pub fn mirrored(&self) -> Self {
        Self::new(
            FIELD_WIDTH_IN - self.x_in(),
            self.y_in(),
            wrap_pi(std::f64::consts::PI - self.heading_rad),
        )
    }

    fn is_finite(&self) -> bool {
        self.position_in.iter().all(|v| v.is_finite()) && self.heading_rad.is_finite()
    }
}

impl From<PoseSpec> for FieldPose {
    fn from(spec: PoseSpec) -> Self {
        Self::new(spec.x_in, spec.y_in, spec.heading_deg.to_radians())
    }
}

impl HeadingInterp {
    /// The heading at the given fraction (0 to 1) of the way along the segment.
    pub fn heading_at(&self, fraction: f64) -> f64 {
        match self {
            HeadingInterp::Linear { start_rad, end_rad } => {
                wrap_pi(start_rad + get_ang_dist(*start_rad, *end_rad) * fraction)
            }
        }
    }
}

impl Segment {
    /// Create a segment from the configured start and end points and headings.
    fn from_spec(spec: &SegmentSpec) -> Result<Self, PlanError> {
        let start_rad = spec.start_heading_deg.to_radians();
        let end_rad = spec.end_heading_deg.to_radians();

        let seg = Self {
            name: spec.name.clone(),
            start: FieldPose::new(spec.start_in[0], spec.start_in[1], start_rad),
            end: FieldPose::new(spec.end_in[0], spec.end_in[1], end_rad),
            heading: HeadingInterp::Linear { start_rad, end_rad },
        };

        if !seg.start.is_finite() {
            return Err(PlanError::NonFiniteValue(seg.name, "start pose"));
        }
        if !seg.end.is_finite() {
            return Err(PlanError::NonFiniteValue(seg.name, "end pose"));
        }

        Ok(seg)
    }

    fn mirrored(&self) -> Self {
        let start = self.start.mirrored();
        let end = self.end.mirrored();

        Self {
            name: self.name.clone(),
            start,
            end,
            heading: HeadingInterp::Linear {
                start_rad: start.heading_rad,
                end_rad: end.heading_rad,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> FieldPose {
        self.start
    }

    pub fn end(&self) -> FieldPose {
        self.end
    }

    pub fn heading(&self) -> HeadingInterp {
        self.heading
    }

    /// Straight line length of the segment in inches.
    pub fn length_in(&self) -> f64 {
        (self.end.position_in - self.start.position_in).norm()
    }

    /// Magnitude of the heading change along the segment in radians.
    pub fn heading_change_rad(&self) -> f64 {
        get_ang_dist(self.start.heading_rad, self.end.heading_rad).abs()
    }

    /// The pose the given fraction (0 to 1) of the way along the segment.
    pub fn pose_at(&self, fraction: f64) -> FieldPose {
        let position_in =
            self.start.position_in + (self.end.position_in - self.start.position_in) * fraction;

        FieldPose {
            position_in,
            heading_rad: self.heading.heading_at(fraction),
        }
    }
}

impl SegmentId {
    /// Position of the segment within the plan.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl SegmentPlan {
    /// Build the plan from the field configuration.
    ///
    /// The segments keep the order they have in the configuration. The plan is checked to be
    /// non-empty, for unique segment names, and for finite coordinates and headings.
    pub fn build(config: &FieldConfig, alliance: Alliance) -> Result<Self, PlanError> {
        if config.segments.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut start_pose = FieldPose::from(config.start_pose);
        if !start_pose.is_finite() {
            return Err(PlanError::NonFiniteValue(
                String::from("start_pose"),
                "start pose",
            ));
        }

        let mut segments: Vec<Segment> = Vec::with_capacity(config.segments.len());
        for spec in config.segments.iter() {
            if segments.iter().any(|s| s.name == spec.name) {
                return Err(PlanError::DuplicateSegment(spec.name.clone()));
            }

            segments.push(Segment::from_spec(spec)?);
        }

        if alliance == Alliance::Red {
            start_pose = start_pose.mirrored();
            segments = segments.iter().map(Segment::mirrored).collect();
        }

        debug!(
            "Built {} plan with {} segments: {:?}",
            alliance,
            segments.len(),
            segments.iter().map(|s| s.name()).collect::<Vec<_>>()
        );

        Ok(Self {
            segments,
            start_pose,
            alliance,
        })
    }

    /// Find the handle of the segment with the given name.
    pub fn id(&self, name: &str) -> Result<SegmentId, PlanError> {
        self.segments
            .iter()
            .position(|s| s.name == name)
            .map(SegmentId)
            .ok_or_else(|| PlanError::MissingSegment(String::from(name)))
    }

    /// Check that every one of the given segments is in the plan.
    pub fn require(&self, names: &[&str]) -> Result<(), PlanError> {
        for name in names {
            self.id(name)?;
        }

        Ok(())
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start_pose(&self) -> FieldPose {
        self.start_pose
    }

    pub fn alliance(&self) -> Alliance {
        self.alliance
    }
}

impl Display for Alliance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alliance::Blue => write!(f, "blue"),
            Alliance::Red => write!(f, "red"),
        }
    }
}

impl FromStr for Alliance {
    type Err = ParseAllianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blue" => Ok(Alliance::Blue),
            "red" => Ok(Alliance::Red),
            _ => Err(ParseAllianceError(String::from(s))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::seq::RoutineParams;

    const EPS: f64 = 1e-9;

    fn close_field() -> FieldConfig {
        let params: RoutineParams =
            util::params::parse(include_str!("../../../params/routines/close.toml")).unwrap();
        params.field
    }

    fn spec(name: &str, start: [f64; 2], end: [f64; 2], h0: f64, h1: f64) -> SegmentSpec {
        SegmentSpec {
            name: String::from(name),
            start_in: start,
            end_in: end,
            start_heading_deg: h0,
            end_heading_deg: h1,
        }
    }

    fn field(segments: Vec<SegmentSpec>) -> FieldConfig {
        FieldConfig {
            start_pose: PoseSpec {
                x_in: 72.0,
                y_in: 8.0,
                heading_deg: 90.0,
            },
            segments,
        }
    }

    #[test]
    fn test_build_close() {
        let plan = SegmentPlan::build(&close_field(), Alliance::Blue).unwrap();

        assert_eq!(plan.len(), 8);
        let names: Vec<&str> = plan.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "shoot_preload",
                "lineup_field_1",
                "intake_field_1",
                "shoot_field_1",
                "lineup_field_2",
                "intake_field_2",
                "shoot_field_2",
                "strafe_off_line",
            ]
        );

        // Order is kept, and ids index it
        let id = plan.id("intake_field_1").unwrap();
        assert_eq!(id.index(), 2);

        let seg = plan.get(id).unwrap();
        assert!((seg.start().x_in() - 44.509).abs() < EPS);
        assert!((seg.end().x_in() - 15.910).abs() < EPS);
        assert!((seg.start().heading_deg() - 180.0).abs() < EPS);

        assert!((plan.start_pose().x_in() - 72.0).abs() < EPS);
        assert!((plan.start_pose().heading_deg() - 90.0).abs() < EPS);

        assert!(plan.require(&["shoot_preload", "strafe_off_line"]).is_ok());
    }

    #[test]
    fn test_missing_segment() {
        let plan = SegmentPlan::build(&close_field(), Alliance::Blue).unwrap();

        assert_eq!(
            plan.id("park"),
            Err(PlanError::MissingSegment(String::from("park")))
        );
        assert_eq!(
            plan.require(&["shoot_preload", "park"]),
            Err(PlanError::MissingSegment(String::from("park")))
        );
    }

    #[test]
    fn test_invalid_configs() {
        assert_eq!(
            SegmentPlan::build(&field(vec![]), Alliance::Blue).unwrap_err(),
            PlanError::Empty
        );

        let dup = field(vec![
            spec("a", [0.0, 0.0], [1.0, 0.0], 0.0, 0.0),
            spec("a", [1.0, 0.0], [2.0, 0.0], 0.0, 0.0),
        ]);
        assert_eq!(
            SegmentPlan::build(&dup, Alliance::Blue).unwrap_err(),
            PlanError::DuplicateSegment(String::from("a"))
        );

        let nan = field(vec![spec("a", [0.0, 0.0], [1.0, 0.0], 0.0, std::f64::NAN)]);
        assert_eq!(
            SegmentPlan::build(&nan, Alliance::Blue).unwrap_err(),
            PlanError::NonFiniteValue(String::from("a"), "end pose")
        );

        let inf = field(vec![spec("a", [std::f64::INFINITY, 0.0], [1.0, 0.0], 0.0, 0.0)]);
        assert_eq!(
            SegmentPlan::build(&inf, Alliance::Blue).unwrap_err(),
            PlanError::NonFiniteValue(String::from("a"), "start pose")
        );
    }

    #[test]
    fn test_red_mirror() {
        let blue = SegmentPlan::build(&close_field(), Alliance::Blue).unwrap();
        let red = SegmentPlan::build(&close_field(), Alliance::Red).unwrap();

        assert_eq!(red.alliance(), Alliance::Red);
        assert_eq!(blue.len(), red.len());

        for (b, r) in blue.iter().zip(red.iter()) {
            assert_eq!(b.name(), r.name());
            assert!((r.start().x_in() - (FIELD_WIDTH_IN - b.start().x_in())).abs() < EPS);
            assert!((r.end().y_in() - b.end().y_in()).abs() < EPS);
            assert!((b.length_in() - r.length_in()).abs() < EPS);
        }

        // 137 deg becomes 43 deg, 180 deg becomes 0 deg
        let shoot = red.get(red.id("shoot_preload").unwrap()).unwrap();
        assert!((shoot.start().heading_deg() - 43.0).abs() < 1e-6);
        let lineup = red.get(red.id("lineup_field_1").unwrap()).unwrap();
        assert!(lineup.end().heading_deg().abs() < 1e-6);

        // Start pose heading 90 deg stays at 90 deg
        assert!((red.start_pose().heading_deg() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_pose_at() {
        let plan = SegmentPlan::build(
            &field(vec![spec("turn", [0.0, 0.0], [10.0, 20.0], 170.0, -170.0)]),
            Alliance::Blue,
        )
        .unwrap();
        let seg = plan.get(plan.id("turn").unwrap()).unwrap();

        assert_eq!(seg.pose_at(0.0).position_in, Vector2::new(0.0, 0.0));
        assert_eq!(seg.pose_at(0.5).position_in, Vector2::new(5.0, 10.0));
        assert_eq!(seg.pose_at(1.0).position_in, Vector2::new(10.0, 20.0));

        // Shortest rotation is through 180 deg, not back through 0 deg
        assert!((seg.pose_at(0.5).heading_deg().abs() - 180.0).abs() < 1e-6);
        assert!((seg.heading_change_rad() - 20f64.to_radians()).abs() < 1e-9);
    }
}
