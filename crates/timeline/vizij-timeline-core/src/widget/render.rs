use super::zoom::{ruler_ticks, TickKind};
use super::{Canvas, Interaction, Rect, Regions, TimelineView, WidgetLayout};
use crate::timeline::Timeline;

impl TimelineView {
    /// Paint the widget. Pure with respect to the model: reads the timeline,
    /// interaction and current zoom window, mutates nothing but the canvas.
    pub fn draw(
        &self,
        canvas: &mut dyn Canvas,
        timeline: &Timeline,
        layout: &WidgetLayout,
        interaction: &Interaction,
    ) {
        let rows = timeline.track_count();
        let regions = Regions::compute(layout, &self.style, rows);
        let palette = &self.style.palette;

        canvas.fill_rect(regions.canvas.min, regions.canvas.max, palette.widget_background);
        canvas.fill_rect(
            [regions.canvas.min[0], regions.header.min[1]],
            regions.header.max,
            palette.header_background,
        );

        self.draw_ruler(canvas, timeline, layout, &regions);
        self.draw_legend(canvas, timeline, &regions);
        self.draw_tracks(canvas, timeline, layout, &regions, interaction);
        self.draw_playhead(canvas, timeline, layout, &regions, interaction.current_frame);
        self.draw_zoom_bar(canvas, &regions);
    }

    /// Frames to visit on the ruler: multiples of `step` inside the view and
    /// the timeline range.
    fn ruler_frames(&self, timeline: &Timeline, step: i32) -> impl Iterator<Item = i32> {
        let step = step.max(1);
        let lo = timeline.frame_min().max(self.first_visible_frame());
        let hi = if self.zoom.view_max.is_finite() {
            timeline.frame_max().min(self.zoom.view_max.ceil() as i32)
        } else {
            timeline.frame_max()
        };
        let first = lo.div_euclid(step) * step;
        (first..=hi)
            .step_by(step as usize)
            .filter(move |f| *f >= lo)
    }

    fn draw_ruler(
        &self,
        canvas: &mut dyn Canvas,
        timeline: &Timeline,
        layout: &WidgetLayout,
        regions: &Regions,
    ) {
        let palette = &self.style.palette;
        let header = regions.header;
        let ticks = ruler_ticks(self.frame_pixel_width, self.style.min_tick_distance);
        let height = header.max[1] - header.min[1];

        canvas.push_clip_rect(header.min, header.max);
        let mut frames: Vec<i32> = self.ruler_frames(timeline, ticks.step).collect();
        if frames.last() != Some(&timeline.frame_max()) && self.in_view(timeline.frame_max()) {
            frames.push(timeline.frame_max());
        }
        for frame in frames {
            let x = self.frame_to_x(layout, f64::from(frame));
            if x < header.min[0] || x > header.max[0] {
                continue;
            }
            let kind = ticks.kind(frame, timeline.frame_min(), timeline.frame_max());
            let top = match kind {
                TickKind::Major => header.min[1],
                TickKind::Half => header.min[1] + height * 0.5,
                TickKind::Minor => header.min[1] + height * 0.75,
            };
            canvas.line([x, top], [x, header.max[1] - 1.0], palette.header_lines, 1.0);
            if kind == TickKind::Major {
                canvas.text([x + 3.0, header.min[1]], palette.header_text, &frame.to_string());
            }
        }
        canvas.pop_clip_rect();
    }

    fn in_view(&self, frame: i32) -> bool {
        let f = f64::from(frame);
        f >= self.zoom.view_min && f <= self.zoom.view_max
    }

    fn draw_legend(&self, canvas: &mut dyn Canvas, timeline: &Timeline, regions: &Regions) {
        let legend = regions.legend;
        canvas.push_clip_rect(legend.min, legend.max);
        for (row, track) in timeline.tracks().iter().enumerate() {
            let y = legend.min[1] + row as f32 * self.style.row_height + 2.0;
            let pos = [legend.min[0] + 3.0, y];
            let color = self.style.palette.legend_text;
            match track.label() {
                "" => canvas.text(pos, color, &format!("#{}", row + 1)),
                label => canvas.text(pos, color, label),
            }
        }
        canvas.pop_clip_rect();
    }

    fn draw_tracks(
        &self,
        canvas: &mut dyn Canvas,
        timeline: &Timeline,
        layout: &WidgetLayout,
        regions: &Regions,
        interaction: &Interaction,
    ) {
        let palette = &self.style.palette;
        let area = regions.track_area;
        let row_h = self.style.row_height;
        canvas.push_clip_rect(area.min, area.max);

        for row in 0..timeline.track_count() {
            let top = area.min[1] + row as f32 * row_h;
            let color = if row % 2 == 0 {
                palette.stripe_even
            } else {
                palette.stripe_odd
            };
            canvas.fill_rect([area.min[0], top], [area.max[0], top + row_h], color);
        }

        if let Some(row) = interaction.selected_track.filter(|r| *r < timeline.track_count()) {
            let top = area.min[1] + row as f32 * row_h;
            canvas.fill_rect([area.min[0], top], [area.max[0], top + row_h], palette.selection);
        }

        let ticks = ruler_ticks(self.frame_pixel_width, self.style.min_tick_distance);
        for frame in self.ruler_frames(timeline, ticks.step) {
            if ticks.kind(frame, timeline.frame_min(), timeline.frame_max()) == TickKind::Minor {
                continue;
            }
            let x = self.frame_to_x(layout, f64::from(frame));
            canvas.line([x, area.min[1]], [x, area.max[1]], palette.content_lines, 1.0);
        }

        let half = self.style.keyframe_half_size;
        for (row, track) in timeline.tracks().iter().enumerate() {
            for key in track.keyframes() {
                let center = self.marker_center(layout, row, key.frame);
                if center[0] < area.min[0] || center[0] > area.max[0] {
                    continue;
                }
                let hovered = self.pointer.is_some_and(|[px, py]| {
                    (px - center[0]).abs() <= half && (py - center[1]).abs() <= half
                });
                let color = if hovered {
                    palette.keyframe_hover
                } else {
                    key.color.unwrap_or(track.color)
                };
                canvas.marker(center, half, key.shape, color);
            }
        }
        canvas.pop_clip_rect();
    }

    fn draw_playhead(
        &self,
        canvas: &mut dyn Canvas,
        timeline: &Timeline,
        layout: &WidgetLayout,
        regions: &Regions,
        current_frame: i32,
    ) {
        if current_frame < self.first_visible_frame() || current_frame > timeline.frame_max() {
            return;
        }
        let x = self.frame_to_x(layout, f64::from(current_frame));
        let area = regions.track_area;
        if x < area.min[0] || x > area.max[0] {
            return;
        }
        let palette = &self.style.palette;
        let column = Rect::new([area.min[0], regions.header.min[1]], area.max);
        canvas.push_clip_rect(column.min, column.max);
        canvas.line([x, area.min[1]], [x, area.max[1]], palette.playhead_glow, 3.0);
        canvas.line([x, area.min[1]], [x, area.max[1]], palette.playhead, 1.0);
        let label = current_frame.to_string();
        let header = regions.header;
        let text_w = 8.0 * label.len() as f32;
        canvas.fill_rect(
            [x - text_w / 2.0 - 2.0, header.min[1]],
            [x + text_w / 2.0 + 2.0, header.max[1]],
            palette.playhead,
        );
        canvas.text([x - text_w / 2.0, header.min[1]], palette.playhead_text, &label);
        canvas.pop_clip_rect();
    }

    fn draw_zoom_bar(&self, canvas: &mut dyn Canvas, regions: &Regions) {
        let bar = regions.zoom_bar;
        let palette = &self.style.palette;
        canvas.fill_rect(bar.min, bar.max, palette.zoom_track);
        let (x0, x1) = self.thumb_extent(&bar);
        canvas.fill_rect([x0, bar.min[1] + 2.0], [x1, bar.max[1] - 2.0], palette.zoom_thumb);
    }
}
