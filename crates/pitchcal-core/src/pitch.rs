//! Football pitch geometry.
//!
//! Pitch coordinates are meters on the playing surface. Two conventions are
//! supported: the canonical corner origin (`[0, L] × [0, W]`) and a centre
//! origin (`[-L/2, L/2] × [-W/2, W/2]`). `X` runs along the touchlines,
//! `Y` along the goal lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CalibrationError, Pt2, Pt3, Real};

/// Depth of the penalty area from the goal line.
pub const PENALTY_AREA_DEPTH: Real = 16.5;
/// Width of the penalty area.
pub const PENALTY_AREA_WIDTH: Real = 40.32;
/// Depth of the goal area from the goal line.
pub const GOAL_AREA_DEPTH: Real = 5.5;
/// Width of the goal area.
pub const GOAL_AREA_WIDTH: Real = 18.32;
/// Distance of the penalty spot from the goal line.
pub const PENALTY_SPOT_DISTANCE: Real = 11.0;

/// Where the pitch coordinate origin sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchOrigin {
    /// Origin at a corner flag, coordinates in `[0, L] × [0, W]`.
    #[default]
    Corner,
    /// Origin at the centre spot.
    Center,
}

/// Playing-surface dimensions in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchDimensions {
    /// Touchline length.
    pub length: Real,
    /// Goal line length.
    pub width: Real,
    pub origin: PitchOrigin,
}

impl Default for PitchDimensions {
    fn default() -> Self {
        Self {
            length: 105.0,
            width: 68.0,
            origin: PitchOrigin::Corner,
        }
    }
}

impl PitchDimensions {
    /// Lower-left corner of the pitch rectangle in this convention.
    pub fn min_corner(&self) -> Pt2 {
        match self.origin {
            PitchOrigin::Corner => Pt2::origin(),
            PitchOrigin::Center => Pt2::new(-self.length / 2.0, -self.width / 2.0),
        }
    }

    /// Upper-right corner of the pitch rectangle in this convention.
    pub fn max_corner(&self) -> Pt2 {
        self.min_corner() + nalgebra::Vector2::new(self.length, self.width)
    }

    /// Whether `p` lies inside the pitch rectangle (boundary included).
    ///
    /// A tolerance of 1 mm absorbs rounding in user-entered coordinates.
    pub fn contains(&self, p: &Pt2) -> bool {
        const TOL: Real = 1e-3;
        let lo = self.min_corner();
        let hi = self.max_corner();
        p.x >= lo.x - TOL && p.x <= hi.x + TOL && p.y >= lo.y - TOL && p.y <= hi.y + TOL
    }

    /// Check the pitch bounds of a named point.
    pub fn check_contains(&self, feature: &str, p: &Pt2) -> Result<(), CalibrationError> {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(CalibrationError::InvalidInput(format!(
                "feature '{feature}' has a non-finite pitch coordinate"
            )));
        }
        if !self.contains(p) {
            return Err(CalibrationError::PointOutsidePitch {
                feature: feature.to_string(),
                x: p.x,
                y: p.y,
            });
        }
        Ok(())
    }

    /// Convert a pitch point to the renderer's world frame.
    ///
    /// The world frame has the pitch centred at the origin on the `y = 0`
    /// plane, pitch `X` along world `x` and pitch `Y` along world `z`.
    pub fn to_world(&self, p: &Pt2) -> Pt3 {
        let c = self.min_corner() + nalgebra::Vector2::new(self.length / 2.0, self.width / 2.0);
        Pt3::new(p.x - c.x, 0.0, p.y - c.y)
    }

    /// Pitch coordinates of a catalogue landmark.
    pub fn feature_position(&self, feature: PitchFeature) -> Pt2 {
        let l = self.length;
        let w = self.width;
        let mid = w / 2.0;
        let (x, y) = match feature {
            PitchFeature::CornerBottomLeft => (0.0, 0.0),
            PitchFeature::CornerTopLeft => (0.0, w),
            PitchFeature::CornerBottomRight => (l, 0.0),
            PitchFeature::CornerTopRight => (l, w),
            PitchFeature::HalfwayBottom => (l / 2.0, 0.0),
            PitchFeature::HalfwayTop => (l / 2.0, w),
            PitchFeature::CenterSpot => (l / 2.0, mid),
            PitchFeature::PenaltySpotLeft => (PENALTY_SPOT_DISTANCE, mid),
            PitchFeature::PenaltySpotRight => (l - PENALTY_SPOT_DISTANCE, mid),
            PitchFeature::PenaltyAreaLeftBottom => (PENALTY_AREA_DEPTH, mid - PENALTY_AREA_WIDTH / 2.0),
            PitchFeature::PenaltyAreaLeftTop => (PENALTY_AREA_DEPTH, mid + PENALTY_AREA_WIDTH / 2.0),
            PitchFeature::PenaltyAreaRightBottom => {
                (l - PENALTY_AREA_DEPTH, mid - PENALTY_AREA_WIDTH / 2.0)
            }
            PitchFeature::PenaltyAreaRightTop => {
                (l - PENALTY_AREA_DEPTH, mid + PENALTY_AREA_WIDTH / 2.0)
            }
            PitchFeature::GoalAreaLeftBottom => (GOAL_AREA_DEPTH, mid - GOAL_AREA_WIDTH / 2.0),
            PitchFeature::GoalAreaLeftTop => (GOAL_AREA_DEPTH, mid + GOAL_AREA_WIDTH / 2.0),
            PitchFeature::GoalAreaRightBottom => (l - GOAL_AREA_DEPTH, mid - GOAL_AREA_WIDTH / 2.0),
            PitchFeature::GoalAreaRightTop => (l - GOAL_AREA_DEPTH, mid + GOAL_AREA_WIDTH / 2.0),
        };
        self.min_corner() + nalgebra::Vector2::new(x, y)
    }
}

/// Standard pitch landmarks a user can click to calibrate.
///
/// "Left" is the goal at `X = 0`, "bottom" the touchline at `Y = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchFeature {
    CornerBottomLeft,
    CornerTopLeft,
    CornerBottomRight,
    CornerTopRight,
    HalfwayBottom,
    HalfwayTop,
    CenterSpot,
    PenaltySpotLeft,
    PenaltySpotRight,
    PenaltyAreaLeftBottom,
    PenaltyAreaLeftTop,
    PenaltyAreaRightBottom,
    PenaltyAreaRightTop,
    GoalAreaLeftBottom,
    GoalAreaLeftTop,
    GoalAreaRightBottom,
    GoalAreaRightTop,
}

impl PitchFeature {
    pub const ALL: [PitchFeature; 17] = [
        PitchFeature::CornerBottomLeft,
        PitchFeature::CornerTopLeft,
        PitchFeature::CornerBottomRight,
        PitchFeature::CornerTopRight,
        PitchFeature::HalfwayBottom,
        PitchFeature::HalfwayTop,
        PitchFeature::CenterSpot,
        PitchFeature::PenaltySpotLeft,
        PitchFeature::PenaltySpotRight,
        PitchFeature::PenaltyAreaLeftBottom,
        PitchFeature::PenaltyAreaLeftTop,
        PitchFeature::PenaltyAreaRightBottom,
        PitchFeature::PenaltyAreaRightTop,
        PitchFeature::GoalAreaLeftBottom,
        PitchFeature::GoalAreaLeftTop,
        PitchFeature::GoalAreaRightBottom,
        PitchFeature::GoalAreaRightTop,
    ];

    /// Stable identifier used as the correspondence `feature_name`.
    pub fn name(self) -> &'static str {
        match self {
            PitchFeature::CornerBottomLeft => "corner_bottom_left",
            PitchFeature::CornerTopLeft => "corner_top_left",
            PitchFeature::CornerBottomRight => "corner_bottom_right",
            PitchFeature::CornerTopRight => "corner_top_right",
            PitchFeature::HalfwayBottom => "halfway_bottom",
            PitchFeature::HalfwayTop => "halfway_top",
            PitchFeature::CenterSpot => "center_spot",
            PitchFeature::PenaltySpotLeft => "penalty_spot_left",
            PitchFeature::PenaltySpotRight => "penalty_spot_right",
            PitchFeature::PenaltyAreaLeftBottom => "penalty_area_left_bottom",
            PitchFeature::PenaltyAreaLeftTop => "penalty_area_left_top",
            PitchFeature::PenaltyAreaRightBottom => "penalty_area_right_bottom",
            PitchFeature::PenaltyAreaRightTop => "penalty_area_right_top",
            PitchFeature::GoalAreaLeftBottom => "goal_area_left_bottom",
            PitchFeature::GoalAreaLeftTop => "goal_area_left_top",
            PitchFeature::GoalAreaRightBottom => "goal_area_right_bottom",
            PitchFeature::GoalAreaRightTop => "goal_area_right_top",
        }
    }
}

impl fmt::Display for PitchFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchFeature {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PitchFeature::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| CalibrationError::UnknownFeature(s.to_string()))
    }
}
