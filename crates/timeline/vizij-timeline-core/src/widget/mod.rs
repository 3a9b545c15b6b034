//! Timeline widget: zoom/pan window, pointer state machine and rendering.
//!
//! The widget owns no drawing state between calls. Each tick the host feeds
//! pointer events through [`TimelineView::handle_pointer_event`] and then asks
//! for a repaint through [`TimelineView::draw`] against its own [`Canvas`].

pub mod canvas;
pub mod interaction;
mod render;
pub mod zoom;

use serde::{Deserialize, Serialize};

use crate::data::Rgba;
use crate::timeline::Timeline;

pub use canvas::{Canvas, DrawCommand, RecordingCanvas};
pub use interaction::{
    DragState, Interaction, PointerEvent, PointerEventKind, WidgetEvent, WidgetResponse, ZoomGrab,
};
pub use zoom::{ruler_ticks, RulerTicks, TickKind, ZoomState};

/// Colours used when painting the widget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetPalette {
    pub widget_background: Rgba,
    pub header_background: Rgba,
    pub header_text: Rgba,
    pub header_lines: Rgba,
    pub legend_text: Rgba,
    pub stripe_odd: Rgba,
    pub stripe_even: Rgba,
    pub content_lines: Rgba,
    pub selection: Rgba,
    pub keyframe_hover: Rgba,
    pub playhead: Rgba,
    pub playhead_glow: Rgba,
    pub playhead_text: Rgba,
    pub zoom_track: Rgba,
    pub zoom_thumb: Rgba,
}

impl Default for WidgetPalette {
    fn default() -> Self {
        Self {
            widget_background: [0.10, 0.10, 0.11, 1.0],
            header_background: [0.16, 0.16, 0.18, 1.0],
            header_text: [0.90, 0.90, 0.90, 1.0],
            header_lines: [0.43, 0.43, 0.50, 1.0],
            legend_text: [0.90, 0.90, 0.90, 1.0],
            stripe_odd: [0.16, 0.29, 0.48, 0.54],
            stripe_even: [0.26, 0.59, 0.98, 0.40],
            content_lines: [0.43, 0.43, 0.50, 0.188],
            selection: [0.26, 0.59, 0.98, 0.25],
            keyframe_hover: [0.16, 0.29, 0.48, 1.0],
            playhead: [0.16, 0.29, 0.48, 1.0],
            playhead_glow: [0.16, 0.29, 0.48, 0.314],
            playhead_text: [1.0, 1.0, 1.0, 1.0],
            zoom_track: [0.02, 0.02, 0.02, 0.53],
            zoom_thumb: [0.31, 0.31, 0.31, 1.0],
        }
    }
}

/// Metrics of the widget in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetStyle {
    pub legend_width: f32,
    pub row_height: f32,
    /// Half-size of a keyframe marker and of its square hit box.
    pub keyframe_half_size: f32,
    /// Minimum pixel distance between labelled ruler ticks.
    pub min_tick_distance: f32,
    pub zoom_bar_height: f32,
    /// Grab tolerance around the zoom thumb's edges.
    pub zoom_handle_width: f32,
    pub palette: WidgetPalette,
}

impl Default for WidgetStyle {
    fn default() -> Self {
        Self {
            legend_width: 120.0,
            row_height: 20.0,
            keyframe_half_size: 6.0,
            min_tick_distance: 100.0,
            zoom_bar_height: 14.0,
            zoom_handle_width: 4.0,
            palette: WidgetPalette::default(),
        }
    }
}

/// Screen-space placement of the widget for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidgetLayout {
    pub origin: [f32; 2],
    pub size: [f32; 2],
}

impl WidgetLayout {
    pub fn new(origin: [f32; 2], size: [f32; 2]) -> Self {
        Self { origin, size }
    }
}

/// Axis-aligned rectangle, min inclusive and max exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min[0] && x < self.max[0] && y >= self.min[1] && y < self.max[1]
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }
}

/// Resolved regions for the current layout and track count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Regions {
    pub canvas: Rect,
    pub header: Rect,
    /// All rows, legend included.
    pub content: Rect,
    pub legend: Rect,
    /// Rows right of the legend; keyframes and grid live here.
    pub track_area: Rect,
    pub zoom_bar: Rect,
}

impl Regions {
    pub fn compute(layout: &WidgetLayout, style: &WidgetStyle, rows: usize) -> Self {
        let [ox, oy] = layout.origin;
        let [w, h] = layout.size;
        let legend = style.legend_width.min(w.max(0.0));
        let right = ox + w.max(0.0);
        let content_top = oy + style.row_height;
        let content_bottom = content_top + rows as f32 * style.row_height;
        Self {
            canvas: Rect::new([ox, oy], [right, oy + h.max(0.0)]),
            header: Rect::new([ox + legend, oy], [right, content_top]),
            content: Rect::new([ox, content_top], [right, content_bottom]),
            legend: Rect::new([ox, content_top], [ox + legend, content_bottom]),
            track_area: Rect::new([ox + legend, content_top], [right, content_bottom]),
            zoom_bar: Rect::new(
                [ox + legend, content_bottom],
                [right, content_bottom + style.zoom_bar_height],
            ),
        }
    }

    /// Row under a y coordinate, if any.
    pub fn row_at(&self, y: f32, row_height: f32, rows: usize) -> Option<usize> {
        if y < self.content.min[1] || y >= self.content.max[1] || row_height <= 0.0 {
            return None;
        }
        let row = ((y - self.content.min[1]) / row_height) as usize;
        (row < rows).then_some(row)
    }
}

/// Per-timeline view state: zoom window, derived scale and the active drag.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineView {
    pub style: WidgetStyle,
    pub zoom: ZoomState,
    initial_frame_pixel_width: f32,
    frame_pixel_width: f32,
    drag: DragState,
    pointer: Option<[f32; 2]>,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new(WidgetStyle::default(), 1.0, 10.0)
    }
}

impl TimelineView {
    pub fn new(style: WidgetStyle, min_view_span: f64, initial_frame_pixel_width: f32) -> Self {
        Self {
            style,
            zoom: ZoomState::new(min_view_span),
            initial_frame_pixel_width,
            frame_pixel_width: initial_frame_pixel_width,
            drag: DragState::Idle,
            pointer: None,
        }
    }

    pub fn from_config(cfg: &crate::config::TimelineConfig) -> Self {
        Self::new(
            cfg.style.clone(),
            cfg.min_view_span,
            cfg.initial_frame_pixel_width,
        )
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn pixels_per_frame(&self) -> f32 {
        self.frame_pixel_width
    }

    /// First whole frame shown at the left edge of the track area.
    pub fn first_visible_frame(&self) -> i32 {
        self.zoom.first_frame()
    }

    /// Re-derive the zoom window and scale from the timeline's frame range
    /// and the available track-area width.
    pub fn sync(&mut self, timeline: &Timeline, layout: &WidgetLayout) {
        let width = self.track_area_width(layout);
        self.zoom.sync(
            f64::from(timeline.frame_min()),
            f64::from(timeline.frame_max()),
            f64::from(width),
            f64::from(self.initial_frame_pixel_width),
        );
        self.frame_pixel_width = self.zoom.pixels_per_frame(width);
    }

    fn track_area_width(&self, layout: &WidgetLayout) -> f32 {
        (layout.size[0] - self.style.legend_width).max(0.0)
    }

    /// Screen x of a frame in the track area.
    pub fn frame_to_x(&self, layout: &WidgetLayout, frame: f64) -> f32 {
        let origin = layout.origin[0] + self.style.legend_width;
        origin + ((frame - self.zoom.view_min) as f32) * self.frame_pixel_width
    }

    /// Frame under a screen x on the ruler, unclamped.
    pub fn x_to_frame(&self, layout: &WidgetLayout, x: f32) -> i32 {
        if !(self.frame_pixel_width.is_finite() && self.frame_pixel_width > 0.0) {
            return self.first_visible_frame();
        }
        let origin = layout.origin[0] + self.style.legend_width;
        let offset = ((x - origin) / self.frame_pixel_width).round();
        (offset as i32).saturating_add(self.first_visible_frame())
    }

    /// Centre of the marker for keyframe `frame` on `row`.
    pub(crate) fn marker_center(&self, layout: &WidgetLayout, row: usize, frame: i32) -> [f32; 2] {
        let content_top = layout.origin[1] + self.style.row_height;
        let x = self.frame_to_x(layout, f64::from(frame));
        let row_h = self.style.row_height;
        let y = content_top + row as f32 * row_h + 1.0 + row_h / 2.0;
        [x, y]
    }
}
