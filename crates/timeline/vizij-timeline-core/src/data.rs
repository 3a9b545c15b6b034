//! Keyframe/track model.
//!
//! A [`Track`] holds one bone's keyframes ordered by frame. Every mutation that
//! changes a frame leaves the sequence sorted ascending.

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::interp::EasingPreset;
use crate::pose::BoneTransform;

/// 2D vector used for easing control points (normalized 0..1 domain).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Straight RGBA colour in 0..1.
pub type Rgba = [f32; 4];

pub const DEFAULT_EASE_P1: Vec2 = Vec2::new(0.25, 0.25);
pub const DEFAULT_EASE_P2: Vec2 = Vec2::new(0.75, 0.75);

/// Marker shape drawn for a keyframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyframeShape {
    #[default]
    Diamond,
    Circle,
    Square,
}

/// An authored pose at an integer frame plus the easing of the segment
/// arriving at it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: i32,
    /// `None` until a pose has been captured for this keyframe.
    #[serde(default)]
    pub pose: Option<BoneTransform>,
    pub ease_p1: Vec2,
    pub ease_p2: Vec2,
    #[serde(default)]
    pub shape: KeyframeShape,
    /// Overrides the track colour when set.
    #[serde(default)]
    pub color: Option<Rgba>,
}

impl Keyframe {
    pub fn new(frame: i32, pose: Option<BoneTransform>) -> Self {
        Self {
            frame,
            pose,
            ease_p1: DEFAULT_EASE_P1,
            ease_p2: DEFAULT_EASE_P2,
            shape: KeyframeShape::Diamond,
            color: None,
        }
    }

    pub fn set_easing(&mut self, p1: Vec2, p2: Vec2) {
        self.ease_p1 = p1;
        self.ease_p2 = p2;
    }

    /// Apply a preset's control points. `Custom` leaves the curve untouched.
    pub fn apply_preset(&mut self, preset: EasingPreset) {
        if let Some((p1, p2)) = preset.control_points() {
            self.set_easing(p1, p2);
        }
    }

    pub fn easing_preset(&self) -> EasingPreset {
        EasingPreset::detect(self.ease_p1, self.ease_p2)
    }

    pub fn set_shape(&mut self, shape: KeyframeShape) {
        self.shape = shape;
    }

    pub fn set_color(&mut self, color: Option<Rgba>) {
        self.color = color;
    }
}

pub const DEFAULT_TRACK_COLOR: Rgba = [0.5, 0.5, 0.5, 1.0];

/// Per-bone ordered keyframe sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier (bone name).
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub color: Rgba,
    keyframes: Vec<Keyframe>,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            color: DEFAULT_TRACK_COLOR,
            keyframes: Vec::new(),
        }
    }

    /// Label shown in the legend.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Mutable access for presentation and easing edits. Callers that change
    /// `frame` through this must call [`Track::resort`] afterwards.
    pub fn keyframe_mut(&mut self, index: usize) -> Option<&mut Keyframe> {
        self.keyframes.get_mut(index)
    }

    pub fn keyframe_at(&self, frame: i32) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.frame == frame)
    }

    pub fn index_of_frame(&self, frame: i32) -> Option<usize> {
        self.keyframes.iter().position(|k| k.frame == frame)
    }

    /// Insert a keyframe without checking for an existing one at `frame`.
    /// The new key lands after any keys sharing its frame. Returns its index.
    pub fn add_keyframe(&mut self, frame: i32, pose: Option<BoneTransform>) -> usize {
        self.insert_sorted(Keyframe::new(frame, pose))
    }

    /// Upsert: overwrite the pose of the keyframe at `frame`, keeping its
    /// easing and presentation, or insert a new one. Returns its index.
    pub fn add_or_update_keyframe(&mut self, frame: i32, pose: Option<BoneTransform>) -> usize {
        match self.index_of_frame(frame) {
            Some(idx) => {
                self.keyframes[idx].pose = pose;
                idx
            }
            None => self.add_keyframe(frame, pose),
        }
    }

    pub fn delete_keyframe(&mut self, index: usize) -> Result<Keyframe, TimelineError> {
        if index >= self.keyframes.len() {
            return Err(TimelineError::KeyframeIndexOutOfRange {
                track: self.name.clone(),
                index,
                len: self.keyframes.len(),
            });
        }
        Ok(self.keyframes.remove(index))
    }

    /// Set a keyframe's frame and move it to its sorted position, returning
    /// the new index.
    pub fn move_keyframe(&mut self, index: usize, frame: i32) -> Result<usize, TimelineError> {
        let mut key = self.delete_keyframe(index)?;
        key.frame = frame;
        Ok(self.insert_sorted(key))
    }

    /// Change a keyframe's frame in place without re-sorting. Used while a
    /// drag is in progress so the dragged index stays stable.
    pub(crate) fn set_frame_unsorted(&mut self, index: usize, frame: i32) -> bool {
        match self.keyframes.get_mut(index) {
            Some(k) => {
                k.frame = frame;
                true
            }
            None => false,
        }
    }

    /// Restore ascending frame order (stable).
    pub fn resort(&mut self) {
        self.keyframes.sort_by_key(|k| k.frame);
    }

    pub fn is_sorted(&self) -> bool {
        self.keyframes.windows(2).all(|w| w[0].frame <= w[1].frame)
    }

    /// Deep copy of every keyframe under a `" (Copy)"` name.
    pub fn duplicate(&self) -> Track {
        Track {
            name: format!("{} (Copy)", self.name),
            display_name: self.display_name.as_ref().map(|d| format!("{d} (Copy)")),
            color: self.color,
            keyframes: self.keyframes.clone(),
        }
    }

    fn insert_sorted(&mut self, key: Keyframe) -> usize {
        let idx = self.keyframes.partition_point(|k| k.frame <= key.frame);
        self.keyframes.insert(idx, key);
        idx
    }
}
