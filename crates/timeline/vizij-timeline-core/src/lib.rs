//! Vizij Timeline Core (engine-agnostic)
//!
//! Keyframe pose timelines for posed actors: per-bone tracks, eased
//! interpolation against a default pose, a fixed-rate playback clock, a
//! canvas-agnostic timeline widget and a manager that talks to an external
//! posing service through queued requests.

pub mod config;
pub mod data;
pub mod error;
pub mod ids;
pub mod interp;
pub mod manager;
pub mod pose;
pub mod sampling;
pub mod scheduler;
pub mod service;
pub mod timeline;
pub mod widget;

// Re-exports for hosts
pub use config::TimelineConfig;
pub use data::{Keyframe, KeyframeShape, Rgba, Track, Vec2};
pub use error::{ServiceError, TimelineError};
pub use ids::{ActorId, RequestTicket, Sequence};
pub use interp::EasingPreset;
pub use manager::{TickReport, TimelineManager};
pub use pose::{BoneTransform, PoseDocument, Quat, Vec3};
pub use sampling::interpolate;
pub use scheduler::PlaybackClock;
pub use service::{
    PoseCompletion, PoseRequest, PoseRequestKind, PoseResult, PoseService, PoseServiceClient,
    SavePurpose, SelectedBones, ServiceStatus,
};
pub use timeline::Timeline;
pub use widget::{
    Canvas, DragState, Interaction, PointerEvent, RecordingCanvas, TimelineView, WidgetEvent,
    WidgetLayout, WidgetResponse, WidgetStyle,
};
