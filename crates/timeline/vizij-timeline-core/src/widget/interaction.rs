//! Pointer state machine for the timeline widget.
//!
//! Press priority: ruler header (playhead), keyframe marker, zoom bar, track
//! row, legend row. A drag lasts until the matching release; presses that
//! arrive mid-drag are ignored.

use tracing::debug;

use super::{Canvas, Rect, Regions, TimelineView, WidgetLayout};
use crate::timeline::Timeline;

/// Part of the zoom thumb grabbed on press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomGrab {
    Pan,
    MinEdge,
    MaxEdge,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingPlayhead,
    /// `anchor_x` is the pointer x that `frame`, the keyframe's current
    /// frame, corresponds to.
    DraggingKeyframe {
        track: usize,
        keyframe: usize,
        frame: i32,
        anchor_x: f32,
    },
    DraggingZoom {
        grab: ZoomGrab,
        press_x: f32,
        view_at_press: (f64, f64),
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Press,
    Move,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn press(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Press,
            x,
            y,
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Move,
            x,
            y,
        }
    }

    pub fn release(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Release,
            x,
            y,
        }
    }
}

/// Host-owned interaction values passed into and returned from the widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interaction {
    pub current_frame: i32,
    pub selected_track: Option<usize>,
    /// Index into the selected track's keyframes.
    pub selected_keyframe: Option<usize>,
}

/// Edit notifications; every `EditBegin` is followed by one `EditEnd`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    EditBegin { track: usize },
    EditEnd { track: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct WidgetResponse {
    pub interaction: Interaction,
    /// The timeline model was mutated.
    pub changed: bool,
    /// Something visible changed; the host should repaint.
    pub redraw: bool,
    pub events: Vec<WidgetEvent>,
}

impl WidgetResponse {
    fn new(interaction: Interaction) -> Self {
        Self {
            interaction,
            changed: false,
            redraw: false,
            events: Vec::new(),
        }
    }

    fn select(&mut self, track: Option<usize>, keyframe: Option<usize>) {
        let current = (self.interaction.selected_track, self.interaction.selected_keyframe);
        if current != (track, keyframe) {
            self.redraw = true;
        }
        self.interaction.selected_track = track;
        self.interaction.selected_keyframe = keyframe;
    }
}

impl TimelineView {
    /// Feed one pointer event through the state machine.
    pub fn handle_pointer_event(
        &mut self,
        timeline: &mut Timeline,
        layout: &WidgetLayout,
        event: PointerEvent,
        interaction: Interaction,
    ) -> WidgetResponse {
        self.sync(timeline, layout);
        let moved = self.pointer != Some([event.x, event.y]);
        self.pointer = Some([event.x, event.y]);
        let mut resp = self.dispatch(timeline, layout, event, WidgetResponse::new(interaction));
        if moved && matches!(self.drag, DragState::Idle) {
            // hover highlight
            let regions = Regions::compute(layout, &self.style, timeline.track_count());
            resp.redraw |= regions.canvas.contains(event.x, event.y);
        }
        resp
    }

    /// Process pointer events in order, then paint. Returns whether the model
    /// was mutated.
    pub fn frame(
        &mut self,
        canvas: &mut dyn Canvas,
        timeline: &mut Timeline,
        layout: &WidgetLayout,
        events: &[PointerEvent],
        interaction: &mut Interaction,
    ) -> bool {
        self.sync(timeline, layout);
        let mut changed = false;
        for event in events {
            let resp = self.handle_pointer_event(timeline, layout, *event, *interaction);
            changed |= resp.changed;
            *interaction = resp.interaction;
        }
        self.draw(canvas, timeline, layout, interaction);
        changed
    }

    /// Forget the pointer position and abandon any drag without touching the
    /// model beyond what the drag already did.
    pub fn reset_interaction(&mut self) {
        self.drag = DragState::Idle;
        self.pointer = None;
    }

    fn dispatch(
        &mut self,
        timeline: &mut Timeline,
        layout: &WidgetLayout,
        event: PointerEvent,
        mut resp: WidgetResponse,
    ) -> WidgetResponse {
        match event.kind {
            PointerEventKind::Press => self.on_press(timeline, layout, event, &mut resp),
            PointerEventKind::Move => self.on_move(timeline, layout, event.x, &mut resp),
            PointerEventKind::Release => self.on_release(timeline, layout, event.x, &mut resp),
        }
        resp
    }

    fn on_press(
        &mut self,
        timeline: &mut Timeline,
        layout: &WidgetLayout,
        event: PointerEvent,
        resp: &mut WidgetResponse,
    ) {
        if !matches!(self.drag, DragState::Idle) {
            debug!(drag = ?self.drag, "press ignored while dragging");
            return;
        }
        let (x, y) = (event.x, event.y);
        let rows = timeline.track_count();
        let regions = Regions::compute(layout, &self.style, rows);

        if regions.header.contains(x, y) && resp.interaction.current_frame >= 0 {
            self.drag = DragState::DraggingPlayhead;
            self.set_playhead_from_x(timeline, layout, x, resp);
            return;
        }

        if regions.track_area.contains(x, y) {
            if let Some((track, keyframe)) = self.hit_keyframe(timeline, layout, x, y) {
                let frame = timeline.keyframe(track, keyframe).map_or(0, |k| k.frame);
                self.drag = DragState::DraggingKeyframe {
                    track,
                    keyframe,
                    frame,
                    anchor_x: x,
                };
                resp.select(Some(track), Some(keyframe));
                resp.events.push(WidgetEvent::EditBegin { track });
                resp.redraw = true;
                return;
            }
        }

        if regions.zoom_bar.contains(x, y) {
            self.begin_zoom_drag(&regions.zoom_bar, x);
            resp.redraw = true;
            return;
        }

        // Anywhere right of the legend below the ruler; empty space deselects.
        let clickable = Rect::new(regions.track_area.min, regions.canvas.max);
        if clickable.contains(x, y) {
            match regions.row_at(y, self.style.row_height, rows) {
                Some(row) => resp.select(Some(row), None),
                None => resp.select(None, None),
            }
            return;
        }

        if regions.legend.contains(x, y) {
            if let Some(row) = regions.row_at(y, self.style.row_height, rows) {
                let keyframe = if resp.interaction.selected_track == Some(row) {
                    resp.interaction.selected_keyframe
                } else {
                    None
                };
                resp.select(Some(row), keyframe);
            }
        }
    }

    fn on_move(
        &mut self,
        timeline: &mut Timeline,
        layout: &WidgetLayout,
        x: f32,
        resp: &mut WidgetResponse,
    ) {
        match self.drag {
            DragState::Idle => {}
            DragState::DraggingPlayhead => self.set_playhead_from_x(timeline, layout, x, resp),
            DragState::DraggingKeyframe { .. } => self.drag_keyframe(timeline, x, resp),
            DragState::DraggingZoom { .. } => {
                let regions = Regions::compute(layout, &self.style, timeline.track_count());
                self.update_zoom_drag(&regions.zoom_bar, x);
                self.frame_pixel_width = self.zoom.pixels_per_frame(regions.zoom_bar.width());
                resp.redraw = true;
            }
        }
    }

    fn on_release(
        &mut self,
        timeline: &mut Timeline,
        layout: &WidgetLayout,
        x: f32,
        resp: &mut WidgetResponse,
    ) {
        // The release position still counts toward the drag.
        self.on_move(timeline, layout, x, resp);
        match std::mem::take(&mut self.drag) {
            DragState::DraggingKeyframe { track, keyframe, .. } => {
                let target = timeline.keyframe(track, keyframe).map(|k| k.frame);
                if let (Some(frame), Some(t)) = (target, timeline.track_mut(track)) {
                    match t.move_keyframe(keyframe, frame) {
                        Ok(new_index) => resp.select(Some(track), Some(new_index)),
                        Err(err) => debug!(%err, "keyframe vanished before release"),
                    }
                    resp.changed = true;
                }
                resp.events.push(WidgetEvent::EditEnd { track });
                resp.redraw = true;
            }
            DragState::DraggingPlayhead | DragState::DraggingZoom { .. } => resp.redraw = true,
            DragState::Idle => {}
        }
    }

    fn set_playhead_from_x(
        &self,
        timeline: &Timeline,
        layout: &WidgetLayout,
        x: f32,
        resp: &mut WidgetResponse,
    ) {
        let frame = timeline.clamp_frame(self.x_to_frame(layout, x));
        if frame != resp.interaction.current_frame {
            resp.interaction.current_frame = frame;
            resp.redraw = true;
        }
    }

    fn drag_keyframe(&mut self, timeline: &mut Timeline, x: f32, resp: &mut WidgetResponse) {
        let DragState::DraggingKeyframe {
            track,
            keyframe,
            frame,
            anchor_x,
        } = self.drag
        else {
            return;
        };
        let ppf = self.frame_pixel_width;
        let Some(keyframe) = locate_dragged(timeline, track, keyframe, frame) else {
            // The model changed under the drag; close the edit cleanly.
            debug!(track, keyframe, frame, "dragged keyframe disappeared, cancelling drag");
            self.drag = DragState::Idle;
            resp.events.push(WidgetEvent::EditEnd { track });
            resp.redraw = true;
            return;
        };
        self.drag = DragState::DraggingKeyframe {
            track,
            keyframe,
            frame,
            anchor_x,
        };
        if !(ppf.is_finite() && ppf > 0.0) {
            return;
        }
        let delta = ((x - anchor_x) / ppf).round() as i32;
        if delta == 0 {
            return;
        }
        let target = timeline.clamp_frame(frame.saturating_add(delta));
        if target != frame {
            if let Some(t) = timeline.track_mut(track) {
                t.set_frame_unsorted(keyframe, target);
            }
            resp.select(Some(track), Some(keyframe));
            resp.changed = true;
            resp.redraw = true;
        }
        let applied = target - frame;
        self.drag = DragState::DraggingKeyframe {
            track,
            keyframe,
            frame: target,
            anchor_x: anchor_x + applied as f32 * ppf,
        };
    }

    /// First keyframe whose hit box contains the pointer, scanning rows top
    /// to bottom.
    fn hit_keyframe(
        &self,
        timeline: &Timeline,
        layout: &WidgetLayout,
        x: f32,
        y: f32,
    ) -> Option<(usize, usize)> {
        let half = self.style.keyframe_half_size;
        timeline.tracks().iter().enumerate().find_map(|(row, track)| {
            track.keyframes().iter().position(|k| {
                let [cx, cy] = self.marker_center(layout, row, k.frame);
                (x - cx).abs() <= half && (y - cy).abs() <= half
            })
            .map(|k| (row, k))
        })
    }

    pub(super) fn thumb_extent(&self, bar: &Rect) -> (f32, f32) {
        let content = self.zoom.content_max - self.zoom.content_min;
        if content.is_nan() || content <= 0.0 {
            return (bar.min[0], bar.max[0]);
        }
        let w = f64::from(bar.width());
        let x0 = f64::from(bar.min[0]) + (self.zoom.view_min - self.zoom.content_min) / content * w;
        let x1 = f64::from(bar.min[0]) + (self.zoom.view_max - self.zoom.content_min) / content * w;
        (x0 as f32, x1 as f32)
    }

    fn begin_zoom_drag(&mut self, bar: &Rect, x: f32) {
        let (x0, x1) = self.thumb_extent(bar);
        let handle = self.style.zoom_handle_width;
        let grab = if (x - x0).abs() <= handle {
            ZoomGrab::MinEdge
        } else if (x - x1).abs() <= handle {
            ZoomGrab::MaxEdge
        } else {
            if x < x0 || x > x1 {
                // Jump the thumb so it is centred under the pointer.
                let content = self.zoom.content_max - self.zoom.content_min;
                let w = f64::from(bar.width());
                if w > 0.0 {
                    let at = self.zoom.content_min + f64::from(x - bar.min[0]) / w * content;
                    self.zoom.pan_to(at - self.zoom.span() / 2.0);
                }
            }
            ZoomGrab::Pan
        };
        self.drag = DragState::DraggingZoom {
            grab,
            press_x: x,
            view_at_press: (self.zoom.view_min, self.zoom.view_max),
        };
    }

    fn update_zoom_drag(&mut self, bar: &Rect, x: f32) {
        let DragState::DraggingZoom {
            grab,
            press_x,
            view_at_press: (min0, max0),
        } = self.drag
        else {
            return;
        };
        let w = f64::from(bar.width());
        if w <= 0.0 {
            return;
        }
        let content = self.zoom.content_max - self.zoom.content_min;
        let delta = f64::from(x - press_x) / w * content;
        let min_span = self.zoom.min_view_span;
        match grab {
            ZoomGrab::Pan => {
                self.zoom.view_min = min0;
                self.zoom.view_max = max0;
                self.zoom.pan_to(min0 + delta);
            }
            ZoomGrab::MinEdge => self.zoom.set_view((min0 + delta).min(max0 - min_span), max0),
            ZoomGrab::MaxEdge => self.zoom.set_view(min0, (max0 + delta).max(min0 + min_span)),
        }
    }
}

/// Index of the dragged keyframe. Keys inserted or removed mid-drag shift
/// indices, so a mismatch is resolved by the frame the drag last set.
fn locate_dragged(
    timeline: &Timeline,
    track: usize,
    keyframe: usize,
    frame: i32,
) -> Option<usize> {
    let keys = timeline.track(track)?.keyframes();
    match keys.get(keyframe) {
        Some(k) if k.frame == frame => Some(keyframe),
        _ => keys.iter().position(|k| k.frame == frame),
    }
}
