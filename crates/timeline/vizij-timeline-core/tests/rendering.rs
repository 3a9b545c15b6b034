use vizij_timeline_core::widget::WidgetStyle;
use vizij_timeline_core::{
    widget::DrawCommand, ActorId, BoneTransform, Interaction, KeyframeShape, PointerEvent,
    RecordingCanvas, Timeline, TimelineView, WidgetLayout,
};

// 500 px track area at 10 px per frame: the view shows frames 0..50.
const LAYOUT: WidgetLayout = WidgetLayout {
    origin: [0.0, 0.0],
    size: [620.0, 200.0],
};
const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

fn sample_timeline() -> Timeline {
    let mut timeline = Timeline::new(ActorId(4), None);
    let a = timeline.add_track("j_kosi");
    timeline.add_track("");
    let track = timeline.track_mut(a).unwrap();
    let k = track.add_keyframe(5, Some(BoneTransform::default()));
    {
        let key = track.keyframe_mut(k).unwrap();
        key.set_shape(KeyframeShape::Circle);
        key.set_color(Some(RED));
    }
    track.add_keyframe(80, Some(BoneTransform::default()));
    timeline
}

fn render(
    view: &mut TimelineView,
    timeline: &mut Timeline,
    events: &[PointerEvent],
    interaction: &mut Interaction,
) -> RecordingCanvas {
    let mut canvas = RecordingCanvas::new();
    view.frame(&mut canvas, timeline, &LAYOUT, events, interaction);
    canvas
}

/// it should balance every clip push with a pop
#[test]
fn clip_stack_is_balanced() {
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();
    let mut ix = Interaction::default();
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    assert_eq!(canvas.clip_depth(), 0);
    assert_eq!(canvas.max_clip_depth(), 1);
    let pushes = canvas
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::PushClip { .. }))
        .count();
    let pops = canvas
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::PopClip))
        .count();
    assert_eq!(pushes, pops);
}

/// it should label legend rows by display name, then name, then row number
#[test]
fn legend_labels() {
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();
    let mut ix = Interaction::default();
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    let texts: Vec<&str> = canvas.texts().collect();
    assert!(texts.contains(&"j_kosi"));
    assert!(texts.contains(&"#2"));

    timeline.track_mut(0).unwrap().display_name = Some("Hips".into());
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    assert!(canvas.texts().any(|t| t == "Hips"));
    assert!(!canvas.texts().any(|t| t == "j_kosi"));
}

/// it should label the ruler every label_every frames inside the view
#[test]
fn ruler_labels() {
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();
    let mut ix = Interaction::default();
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    let texts: Vec<&str> = canvas.texts().collect();
    // 10 px per frame doubles the label spacing once, to every 10 frames.
    for label in ["10", "20", "30", "40", "50"] {
        assert!(texts.contains(&label), "missing ruler label {label}");
    }
    assert!(!texts.contains(&"5"));
    assert!(!texts.contains(&"100"));
}

/// it should draw only keyframes inside the view with their own shape and colour
#[test]
fn keyframe_markers() {
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();
    let mut ix = Interaction::default();
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    let markers: Vec<&DrawCommand> = canvas.markers().collect();
    assert_eq!(markers.len(), 1);
    assert_eq!(
        markers[0],
        &DrawCommand::Marker {
            center: [170.0, 31.0],
            half_size: 6.0,
            shape: KeyframeShape::Circle,
            color: RED,
        }
    );
}

/// it should highlight a keyframe under the pointer
#[test]
fn hovered_marker_uses_hover_colour() {
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();
    let mut ix = Interaction::default();
    let canvas = render(
        &mut view,
        &mut timeline,
        &[PointerEvent::moved(172.0, 29.0)],
        &mut ix,
    );
    let hover = WidgetStyle::default().palette.keyframe_hover;
    match canvas.markers().next() {
        Some(DrawCommand::Marker { color, .. }) => assert_eq!(*color, hover),
        other => panic!("expected a marker, got {other:?}"),
    };
}

/// it should draw the playhead line and label only while it is in view
#[test]
fn playhead_visibility() {
    let style = WidgetStyle::default();
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();

    let mut ix = Interaction {
        current_frame: 12,
        ..Interaction::default()
    };
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    let playhead_lines: Vec<&DrawCommand> = canvas
        .commands
        .iter()
        .filter(|c| {
            matches!(c, DrawCommand::Line { color, thickness, .. }
                if *color == style.palette.playhead && *thickness == 1.0)
        })
        .collect();
    assert_eq!(playhead_lines.len(), 1);
    match playhead_lines[0] {
        DrawCommand::Line { from, to, .. } => {
            assert_eq!(from[0], 240.0);
            assert_eq!(to[0], 240.0);
        }
        _ => unreachable!(),
    }
    assert!(canvas.texts().any(|t| t == "12"));

    let mut ix = Interaction {
        current_frame: 70,
        ..Interaction::default()
    };
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    assert!(!canvas.texts().any(|t| t == "70"));
    assert!(!canvas.commands.iter().any(|c| matches!(
        c,
        DrawCommand::Line { color, thickness, .. }
            if *color == style.palette.playhead && *thickness == 1.0
    )));
}

/// it should shade the selected row
#[test]
fn selection_highlight() {
    let style = WidgetStyle::default();
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();
    let mut ix = Interaction {
        selected_track: Some(1),
        ..Interaction::default()
    };
    let canvas = render(&mut view, &mut timeline, &[], &mut ix);
    assert!(canvas.commands.iter().any(|c| matches!(
        c,
        DrawCommand::FillRect { min, color, .. }
            if *color == style.palette.selection && min[1] == 40.0
    )));
}

/// it should report a model change when a drag moves a keyframe during a frame
#[test]
fn frame_reports_changes() {
    let mut view = TimelineView::default();
    let mut timeline = sample_timeline();
    let mut ix = Interaction::default();
    let mut canvas = RecordingCanvas::new();
    let changed = view.frame(
        &mut canvas,
        &mut timeline,
        &LAYOUT,
        &[
            PointerEvent::press(170.0, 31.0),
            PointerEvent::moved(200.0, 31.0),
            PointerEvent::release(200.0, 31.0),
        ],
        &mut ix,
    );
    assert!(changed);
    assert_eq!(timeline.keyframe(0, 0).unwrap().frame, 8);
    assert_eq!(ix.selected_keyframe, Some(0));
}
