//! Error types for the timeline core.

use thiserror::Error;

use crate::ids::ActorId;

/// Errors raised by model operations and configuration parsing.
///
/// None of these are fatal to the host: callers log them and carry on with the
/// model unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimelineError {
    #[error("keyframe index {index} out of range for track '{track}' ({len} keyframes)")]
    KeyframeIndexOutOfRange {
        track: String,
        index: usize,
        len: usize,
    },

    #[error("track index {index} out of range ({len} tracks)")]
    TrackIndexOutOfRange { index: usize, len: usize },

    #[error("timeline index {index} out of range ({len} timelines)")]
    TimelineIndexOutOfRange { index: usize, len: usize },

    #[error("no timeline for actor {0}")]
    UnknownActor(ActorId),

    #[error("malformed pose document: {0}")]
    MalformedPose(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Failure of a call into the external posing service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("posing service is not available")]
    Unavailable,

    #[error("{call} failed: {reason}")]
    CallFailed { call: &'static str, reason: String },
}
