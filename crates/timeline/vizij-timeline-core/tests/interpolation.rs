use approx::assert_abs_diff_eq;
use vizij_test_fixtures::poses;
use vizij_timeline_core::{
    interp::functions::{bezier_ease_solved, bezier_y_at},
    ActorId, BoneTransform, EasingPreset, PoseDocument, Quat, Timeline, Track, Vec3,
};

fn approx3(a: Vec3, b: [f32; 3], eps: f32) {
    assert!(
        (a.x - b[0]).abs() <= eps && (a.y - b[1]).abs() <= eps && (a.z - b[2]).abs() <= eps,
        "approx failed: left={a:?} right={b:?} eps={eps}"
    );
}

fn at(x: f32, y: f32, z: f32) -> Option<BoneTransform> {
    Some(BoneTransform::from_position(Vec3::new(x, y, z)))
}

fn rest_pose() -> PoseDocument {
    PoseDocument::from_json(&poses::json("rest").unwrap()).unwrap()
}

/// it should return exact poses at authored frames
#[test]
fn exact_pose_at_keyframes() {
    let mut track = Track::new("j_kosi");
    track.add_keyframe(0, at(0.0, 0.0, 0.0));
    track.add_keyframe(10, at(10.0, 0.0, 0.0));
    track.add_keyframe(25, at(3.0, 4.0, 5.0));

    for key in track.keyframes() {
        let sampled = vizij_timeline_core::interpolate(&track, key.frame, None);
        assert_eq!(sampled, key.pose);
    }
}

/// it should land halfway between two linear keyframes at the midpoint frame
#[test]
fn midpoint_of_linear_segment() {
    let mut track = Track::new("j_kosi");
    track.add_keyframe(0, at(0.0, 0.0, 0.0));
    track.add_keyframe(10, at(10.0, 0.0, 0.0));

    let mid = vizij_timeline_core::interpolate(&track, 5, None).unwrap();
    approx3(mid.position, [5.0, 0.0, 0.0], 1e-4);
    approx3(mid.scale, [1.0, 1.0, 1.0], 1e-6);
}

/// it should interpolate from the default pose at frame 0 before the first keyframe
#[test]
fn frames_before_first_key_start_from_default_pose() {
    let rest = rest_pose();
    let mut track = Track::new("j_kosi");
    track.add_keyframe(10, at(10.0, 1.0, 0.0));

    let sampled = vizij_timeline_core::interpolate(&track, 5, Some(&rest)).unwrap();
    approx3(sampled.position, [5.0, 1.0, 0.0], 1e-4);

    // Frame 0 is the start anchor itself.
    let start = vizij_timeline_core::interpolate(&track, 0, Some(&rest)).unwrap();
    approx3(start.position, [0.0, 1.0, 0.0], 1e-6);
}

/// it should yield nothing before the first keyframe when the default pose lacks the bone
#[test]
fn missing_default_bone_yields_none() {
    let rest = rest_pose();
    let mut track = Track::new("not_a_bone");
    track.add_keyframe(10, at(1.0, 1.0, 1.0));
    assert_eq!(vizij_timeline_core::interpolate(&track, 5, Some(&rest)), None);
    assert_eq!(vizij_timeline_core::interpolate(&track, 5, None), None);
}

/// it should hold the last pose past the final keyframe
#[test]
fn frames_after_last_key_hold() {
    let mut track = Track::new("j_kosi");
    track.add_keyframe(0, at(0.0, 0.0, 0.0));
    track.add_keyframe(10, at(7.0, 8.0, 9.0));
    for frame in [11, 50, i32::MAX] {
        assert_eq!(vizij_timeline_core::interpolate(&track, frame, None), at(7.0, 8.0, 9.0));
    }
}

/// it should return None for empty tracks and for segments missing an end pose
#[test]
fn empty_track_and_missing_poses() {
    let track = Track::new("j_kosi");
    assert_eq!(vizij_timeline_core::interpolate(&track, 0, None), None);

    let mut track = Track::new("j_kosi");
    track.add_keyframe(0, at(0.0, 0.0, 0.0));
    track.add_keyframe(10, None);
    assert_eq!(vizij_timeline_core::interpolate(&track, 5, None), None);
    assert_eq!(vizij_timeline_core::interpolate(&track, 10, None), None);
}

/// it should ease using the arrival keyframe's control points
#[test]
fn arrival_keyframe_governs_easing() {
    let mut track = Track::new("j_kosi");
    track.add_keyframe(0, at(0.0, 0.0, 0.0));
    let idx = track.add_keyframe(100, at(100.0, 0.0, 0.0));
    track.keyframe_mut(idx).unwrap().apply_preset(EasingPreset::EaseIn);

    let quarter = vizij_timeline_core::interpolate(&track, 25, None).unwrap();
    assert_abs_diff_eq!(quarter.position.x, 15.625, epsilon = 1e-3);

    track.keyframe_mut(idx).unwrap().apply_preset(EasingPreset::Linear);
    let quarter = vizij_timeline_core::interpolate(&track, 25, None).unwrap();
    assert_abs_diff_eq!(quarter.position.x, 22.65625, epsilon = 1e-3);
}

/// it should slerp rotations along the shorter arc
#[test]
fn rotation_slerps() {
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let mut track = Track::new("j_ude_a_l");
    track.add_keyframe(0, Some(BoneTransform::default()));
    track.add_keyframe(
        10,
        Some(BoneTransform {
            rotation: Quat::new(0.0, 0.0, half, half),
            ..BoneTransform::default()
        }),
    );

    let mid = vizij_timeline_core::interpolate(&track, 5, None).unwrap();
    let angle = std::f32::consts::FRAC_PI_8;
    assert_abs_diff_eq!(mid.rotation.z, angle.sin(), epsilon = 1e-4);
    assert_abs_diff_eq!(mid.rotation.w, angle.cos(), epsilon = 1e-4);
    assert!(!mid.rotation.is_identity);

    let q = mid.rotation.to_array();
    let norm = q.iter().map(|c| c * c).sum::<f32>().sqrt();
    assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-5);
}

/// it should map t=0 and t=1 to themselves for any control points
#[test]
fn easing_fixes_endpoints() {
    for preset in EasingPreset::ALL {
        let Some((p1, p2)) = preset.control_points() else {
            continue;
        };
        assert_abs_diff_eq!(bezier_y_at(0.0, p1.y, p2.y), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bezier_y_at(1.0, p1.y, p2.y), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bezier_ease_solved(0.0, p1.x, p1.y, p2.x, p2.y), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(bezier_ease_solved(1.0, p1.x, p1.y, p2.x, p2.y), 1.0, epsilon = 1e-4);
    }
    // Out-of-range t is clamped.
    assert_abs_diff_eq!(bezier_y_at(-1.0, 0.3, 0.9), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(bezier_y_at(2.0, 0.3, 0.9), 1.0, epsilon = 1e-6);
}

/// it should sample a whole timeline, leaving out tracks with no result
#[test]
fn timeline_sample_pose_omits_empty_tracks() {
    let mut timeline = Timeline::new(ActorId(3), Some(rest_pose()));
    let kosi = timeline.add_track("j_kosi");
    timeline.add_track("j_kubi");
    timeline
        .track_mut(kosi)
        .unwrap()
        .add_keyframe(10, at(10.0, 1.0, 0.0));

    let doc = timeline.sample_pose(5);
    assert_eq!(doc.bones.len(), 1);
    approx3(doc.bone("j_kosi").unwrap().position, [5.0, 1.0, 0.0], 1e-4);

    let single = timeline.interpolate_track(kosi, 10).unwrap();
    assert_eq!(single, at(10.0, 1.0, 0.0));
    assert!(timeline.interpolate_track(9, 0).is_err());
}
