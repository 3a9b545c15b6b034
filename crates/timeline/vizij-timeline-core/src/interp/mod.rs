//! Interpolation helpers and easing presets.

pub mod functions;

use serde::{Deserialize, Serialize};

use crate::data::Vec2;

/// Distance under which a keyframe's control points count as a preset.
const PRESET_MATCH_EPS: f32 = 0.001;

/// Named easing curves offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingPreset {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Custom,
}

impl EasingPreset {
    pub const ALL: [EasingPreset; 5] = [
        EasingPreset::Linear,
        EasingPreset::EaseIn,
        EasingPreset::EaseOut,
        EasingPreset::EaseInOut,
        EasingPreset::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::EaseIn => "Ease In",
            Self::EaseOut => "Ease Out",
            Self::EaseInOut => "Ease In Out",
            Self::Custom => "Custom",
        }
    }

    /// `(P1, P2)` for named presets, `None` for `Custom`.
    pub fn control_points(&self) -> Option<(Vec2, Vec2)> {
        match self {
            Self::Linear => Some((Vec2::new(0.25, 0.25), Vec2::new(0.75, 0.75))),
            Self::EaseIn => Some((Vec2::new(0.42, 0.0), Vec2::new(1.0, 1.0))),
            Self::EaseOut => Some((Vec2::new(0.0, 0.0), Vec2::new(0.58, 1.0))),
            Self::EaseInOut => Some((Vec2::new(0.42, 0.0), Vec2::new(0.58, 1.0))),
            Self::Custom => None,
        }
    }

    /// Identify the preset matching a pair of control points.
    pub fn detect(p1: Vec2, p2: Vec2) -> EasingPreset {
        Self::ALL
            .iter()
            .copied()
            .find(|preset| match preset.control_points() {
                Some((a, b)) => {
                    p1.distance(a) < PRESET_MATCH_EPS && p2.distance(b) < PRESET_MATCH_EPS
                }
                None => false,
            })
            .unwrap_or(EasingPreset::Custom)
    }
}
