//! Keyframe sampling for pose tracks.
//!
//! Model:
//! - A Track holds keyframes sorted by integer frame.
//! - Segment [A -> B] timing uses the ease control points stored on B (the
//!   arrival keyframe governs the segment leading into it).
//! - Before the first keyframe the segment starts at the default pose, frame 0.
//! - Past the last keyframe the last pose is held.
//! - Position and scale lerp; rotation slerps along the shorter arc.
//!
//! API:
//! - interpolate(&Track, frame, default_pose)

use crate::data::{Keyframe, Track};
use crate::interp::functions::{bezier_y_at, lerp_vec3, slerp_quat};
use crate::pose::{BoneTransform, PoseDocument, Quat, Vec3};

/// Locate the first keyframe whose frame is `>= frame`.
///
/// Linear scan over the sorted sequence; the first match is also the minimum
/// such keyframe. A binary search (`partition_point(|k| k.frame < frame)`)
/// yields the same index if tracks grow large.
fn find_arrival(keyframes: &[Keyframe], frame: i32) -> Option<usize> {
    keyframes.iter().position(|k| k.frame >= frame)
}

/// Normalized position of `frame` within `[start, end]`; degenerate spans map to 0.
#[inline]
fn segment_t(frame: i32, start: i32, end: i32) -> f32 {
    let span = (i64::from(end) - i64::from(start)) as f32;
    let t = (i64::from(frame) - i64::from(start)) as f32 / span;
    if t.is_nan() || t.is_infinite() {
        0.0
    } else {
        t
    }
}

/// Blend two bone transforms with an already-eased parameter.
pub fn blend_transforms(a: &BoneTransform, b: &BoneTransform, eased: f32) -> BoneTransform {
    BoneTransform {
        position: Vec3::from_array(lerp_vec3(a.position.to_array(), b.position.to_array(), eased)),
        rotation: Quat::from_array(slerp_quat(a.rotation.to_array(), b.rotation.to_array(), eased)),
        scale: Vec3::from_array(lerp_vec3(a.scale.to_array(), b.scale.to_array(), eased)),
    }
}

/// Sample a track at `frame`.
///
/// Returns `None` when the track has no keyframes, or when a pose needed for
/// the blend is missing (including the track's bone in `default_pose` for
/// frames before the first keyframe). Callers fall back to the default pose.
pub fn interpolate(
    track: &Track,
    frame: i32,
    default_pose: Option<&PoseDocument>,
) -> Option<BoneTransform> {
    let keys = track.keyframes();
    let last = keys.last()?;

    let idx = match find_arrival(keys, frame) {
        Some(i) => i,
        None => return last.pose,
    };
    let arrival = &keys[idx];
    if arrival.frame == frame {
        return arrival.pose;
    }

    let (start_pose, start_frame) = if idx == 0 {
        (default_pose?.bone(&track.name).copied()?, 0)
    } else {
        let prev = &keys[idx - 1];
        (prev.pose?, prev.frame)
    };
    let end_pose = arrival.pose?;

    let t = segment_t(frame, start_frame, arrival.frame);
    let eased = bezier_y_at(t, arrival.ease_p1.y, arrival.ease_p2.y);
    Some(blend_transforms(&start_pose, &end_pose, eased))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_span_maps_to_zero() {
        assert_eq!(segment_t(3, 3, 3), 0.0);
        assert_eq!(segment_t(5, 0, 10), 0.5);
    }

    #[test]
    fn arrival_search_matches_binary_search() {
        let mut t = Track::new("b");
        for f in [0, 4, 4, 9, 20] {
            t.add_keyframe(f, None);
        }
        for frame in -2..25 {
            let linear = find_arrival(t.keyframes(), frame);
            let binary = t.keyframes().partition_point(|k| k.frame < frame);
            let binary = (binary < t.len()).then_some(binary);
            assert_eq!(linear, binary, "frame {frame}");
        }
    }
}
