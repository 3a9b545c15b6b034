use vizij_timeline_core::{
    ActorId, BoneTransform, EasingPreset, KeyframeShape, Timeline, TimelineError, Track, Vec2,
    Vec3,
};

fn at(x: f32) -> Option<BoneTransform> {
    Some(BoneTransform::from_position(Vec3::new(x, 0.0, 0.0)))
}

fn frames(track: &Track) -> Vec<i32> {
    track.keyframes().iter().map(|k| k.frame).collect()
}

/// it should keep keyframes sorted whatever order they are inserted in
#[test]
fn inserts_stay_sorted() {
    let mut track = Track::new("j_kosi");
    for f in [30, 5, 18, 0, 99, 18] {
        track.add_keyframe(f, at(f as f32));
        assert!(track.is_sorted());
    }
    assert_eq!(frames(&track), vec![0, 5, 18, 18, 30, 99]);
}

/// it should place a raw duplicate after existing keys on the same frame
#[test]
fn raw_add_places_duplicates_last() {
    let mut track = Track::new("j_kosi");
    track.add_keyframe(10, at(1.0));
    let idx = track.add_keyframe(10, at(2.0));
    assert_eq!(idx, 1);
    assert_eq!(track.keyframe(1).unwrap().pose, at(2.0));
}

/// it should overwrite the pose but keep easing and presentation on upsert
#[test]
fn upsert_replaces_pose_only() {
    let mut track = Track::new("j_kosi");
    let idx = track.add_or_update_keyframe(10, at(1.0));
    {
        let key = track.keyframe_mut(idx).unwrap();
        key.apply_preset(EasingPreset::EaseOut);
        key.set_shape(KeyframeShape::Circle);
        key.set_color(Some([1.0, 0.0, 0.0, 1.0]));
    }

    let again = track.add_or_update_keyframe(10, at(5.0));
    assert_eq!(again, idx);
    assert_eq!(track.len(), 1);
    let key = track.keyframe_at(10).unwrap();
    assert_eq!(key.pose, at(5.0));
    assert_eq!(key.easing_preset(), EasingPreset::EaseOut);
    assert_eq!(key.shape, KeyframeShape::Circle);
    assert_eq!(key.color, Some([1.0, 0.0, 0.0, 1.0]));

    track.add_or_update_keyframe(3, at(3.0));
    assert_eq!(frames(&track), vec![3, 10]);
}

/// it should delete exactly one keyframe and reject out-of-range indices
#[test]
fn delete_is_bounds_checked() {
    let mut track = Track::new("j_kosi");
    for f in [0, 10, 20] {
        track.add_keyframe(f, at(f as f32));
    }
    let removed = track.delete_keyframe(1).unwrap();
    assert_eq!(removed.frame, 10);
    assert_eq!(frames(&track), vec![0, 20]);

    let err = track.delete_keyframe(2).unwrap_err();
    assert_eq!(
        err,
        TimelineError::KeyframeIndexOutOfRange {
            track: "j_kosi".into(),
            index: 2,
            len: 2,
        }
    );
    assert_eq!(frames(&track), vec![0, 20]);
}

/// it should return the new sorted index when a keyframe is moved
#[test]
fn move_keyframe_resorts() {
    let mut track = Track::new("j_kosi");
    for f in [0, 10, 20] {
        track.add_keyframe(f, at(f as f32));
    }
    let new_index = track.move_keyframe(0, 15).unwrap();
    assert_eq!(new_index, 1);
    assert_eq!(frames(&track), vec![10, 15, 20]);
    assert_eq!(track.keyframe(1).unwrap().pose, at(0.0));
    assert!(track.move_keyframe(7, 1).is_err());
}

/// it should deep-copy a track right after the source with a Copy suffix
#[test]
fn duplicate_track_inserts_copy_after_source() {
    let mut timeline = Timeline::new(ActorId(0), None);
    let a = timeline.add_track("a");
    timeline.add_track("b");
    {
        let track = timeline.track_mut(a).unwrap();
        track.display_name = Some("Hips".into());
        let k = track.add_keyframe(4, at(4.0));
        track
            .keyframe_mut(k)
            .unwrap()
            .set_easing(Vec2::new(0.1, 0.2), Vec2::new(0.3, 0.4));
    }

    let copy = timeline.duplicate_track(a).unwrap();
    assert_eq!(copy, 1);
    let names: Vec<&str> = timeline.tracks().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "a (Copy)", "b"]);

    let original = timeline.track(0).unwrap().clone();
    let dup = timeline.track(1).unwrap();
    assert_eq!(dup.label(), "Hips (Copy)");
    assert_eq!(dup.keyframes(), original.keyframes());

    // Editing the copy leaves the source alone.
    timeline.track_mut(1).unwrap().add_keyframe(8, None);
    assert_eq!(timeline.track(0).unwrap().len(), 1);
}

/// it should bounds-check every track index operation
#[test]
fn track_index_errors() {
    let mut timeline = Timeline::new(ActorId(0), None);
    timeline.add_track("a");
    assert!(matches!(
        timeline.remove_track(3),
        Err(TimelineError::TrackIndexOutOfRange { index: 3, len: 1 })
    ));
    assert!(timeline.duplicate_track(1).is_err());
    assert_eq!(timeline.remove_track(0).unwrap().name, "a");
    assert_eq!(timeline.track_count(), 0);
}

/// it should find tracks by name and only add missing ones on ensure
#[test]
fn track_lookup_by_name() {
    let mut timeline = Timeline::new(ActorId(2), None);
    assert_eq!(timeline.name, "Actor 2");
    let a = timeline.ensure_track("j_kosi");
    assert_eq!(timeline.ensure_track("j_kosi"), a);
    assert!(timeline.has_track("j_kosi"));
    assert!(!timeline.has_track("j_kubi"));
    timeline.track_by_name_mut("j_kosi").unwrap().color = [0.0, 1.0, 0.0, 1.0];
    assert_eq!(timeline.track_by_name("j_kosi").unwrap().color, [0.0, 1.0, 0.0, 1.0]);
}

/// it should keep frame_max above frame_min
#[test]
fn frame_max_is_bounded() {
    let mut timeline = Timeline::new(ActorId(0), None);
    assert_eq!(timeline.frame_max(), 100);
    timeline.set_frame_max(-5);
    assert_eq!(timeline.frame_max(), 1);
    assert_eq!(timeline.clamp_frame(40), 1);
    assert_eq!(timeline.clamp_frame(-3), 0);
}

/// it should identify presets from control points and fall back to Custom
#[test]
fn preset_detection() {
    let mut track = Track::new("j_kosi");
    let k = track.add_keyframe(0, None);
    let key = track.keyframe_mut(k).unwrap();
    assert_eq!(key.easing_preset(), EasingPreset::Linear);
    key.apply_preset(EasingPreset::EaseInOut);
    assert_eq!(key.easing_preset(), EasingPreset::EaseInOut);
    key.set_easing(Vec2::new(0.4205, 0.0), Vec2::new(0.58, 1.0));
    assert_eq!(key.easing_preset(), EasingPreset::EaseInOut);
    key.set_easing(Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.5));
    assert_eq!(key.easing_preset(), EasingPreset::Custom);
    key.apply_preset(EasingPreset::Custom);
    assert_eq!(key.ease_p1, Vec2::new(0.5, 0.5));
}
