//! Per-actor timeline: a set of bone tracks sharing one frame range and a
//! default pose.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::{Keyframe, Track};
use crate::error::TimelineError;
use crate::ids::ActorId;
use crate::pose::{BoneTransform, PoseDocument};
use crate::sampling::interpolate;

/// First frame of every timeline.
pub const FRAME_MIN: i32 = 0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub actor: ActorId,
    pub name: String,
    frame_max: i32,
    /// Pose captured when the timeline was created; `None` if the service had
    /// none or returned something unparseable.
    default_pose: Option<PoseDocument>,
    tracks: Vec<Track>,
    /// Cleared when the user closes the timeline; the manager drops it on its
    /// next prune.
    pub visible: bool,
}

impl Timeline {
    pub fn new(actor: ActorId, default_pose: Option<PoseDocument>) -> Self {
        Self {
            actor,
            name: format!("Actor {actor}"),
            frame_max: 100,
            default_pose,
            tracks: Vec::new(),
            visible: true,
        }
    }

    pub fn frame_min(&self) -> i32 {
        FRAME_MIN
    }

    pub fn frame_max(&self) -> i32 {
        self.frame_max
    }

    /// Set the upper bound; it never drops below `frame_min + 1`.
    pub fn set_frame_max(&mut self, max: i32) {
        self.frame_max = max.max(FRAME_MIN + 1);
    }

    pub fn clamp_frame(&self, frame: i32) -> i32 {
        frame.clamp(FRAME_MIN, self.frame_max)
    }

    pub fn default_pose(&self) -> Option<&PoseDocument> {
        self.default_pose.as_ref()
    }

    pub fn set_default_pose(&mut self, pose: Option<PoseDocument>) {
        self.default_pose = pose;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn has_track(&self, name: &str) -> bool {
        self.tracks.iter().any(|t| t.name == name)
    }

    pub fn track_by_name(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    pub fn track_by_name_mut(&mut self, name: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.name == name)
    }

    /// Append a new empty track and return its index.
    pub fn add_track(&mut self, name: impl Into<String>) -> usize {
        self.tracks.push(Track::new(name));
        self.tracks.len() - 1
    }

    /// Index of the track named `name`, adding it first if missing.
    pub fn ensure_track(&mut self, name: &str) -> usize {
        match self.tracks.iter().position(|t| t.name == name) {
            Some(idx) => idx,
            None => self.add_track(name),
        }
    }

    pub fn remove_track(&mut self, index: usize) -> Result<Track, TimelineError> {
        self.check_track(index)?;
        Ok(self.tracks.remove(index))
    }

    /// Deep-copy a track and insert the copy right after it. Returns the
    /// copy's index.
    pub fn duplicate_track(&mut self, index: usize) -> Result<usize, TimelineError> {
        self.check_track(index)?;
        let copy = self.tracks[index].duplicate();
        self.tracks.insert(index + 1, copy);
        Ok(index + 1)
    }

    pub fn keyframe(&self, track: usize, keyframe: usize) -> Option<&Keyframe> {
        self.tracks.get(track)?.keyframe(keyframe)
    }

    pub fn keyframe_mut(&mut self, track: usize, keyframe: usize) -> Option<&mut Keyframe> {
        self.tracks.get_mut(track)?.keyframe_mut(keyframe)
    }

    /// Sample one track against this timeline's default pose.
    pub fn interpolate_track(
        &self,
        index: usize,
        frame: i32,
    ) -> Result<Option<BoneTransform>, TimelineError> {
        self.check_track(index)?;
        Ok(interpolate(
            &self.tracks[index],
            frame,
            self.default_pose.as_ref(),
        ))
    }

    /// Sample every track into a pose document keyed by bone name. Tracks
    /// that yield no pose are left out.
    pub fn sample_pose(&self, frame: i32) -> PoseDocument {
        let mut bones = HashMap::with_capacity(self.tracks.len());
        for track in &self.tracks {
            if let Some(bone) = interpolate(track, frame, self.default_pose.as_ref()) {
                bones.insert(track.name.clone(), bone);
            }
        }
        PoseDocument::with_bones(bones)
    }

    fn check_track(&self, index: usize) -> Result<(), TimelineError> {
        if index >= self.tracks.len() {
            return Err(TimelineError::TrackIndexOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        Ok(())
    }
}
