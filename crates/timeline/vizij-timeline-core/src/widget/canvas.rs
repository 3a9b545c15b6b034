//! Drawing surface the widget paints onto.

use crate::data::{KeyframeShape, Rgba};

/// Minimal immediate-mode drawing backend.
///
/// Coordinates are screen pixels. Clip rects nest; every `push_clip_rect` is
/// matched by a `pop_clip_rect` within the same draw call.
pub trait Canvas {
    fn fill_rect(&mut self, min: [f32; 2], max: [f32; 2], color: Rgba);
    fn line(&mut self, from: [f32; 2], to: [f32; 2], color: Rgba, thickness: f32);
    /// Keyframe marker centred on `center`, spanning `half_size` each way.
    fn marker(&mut self, center: [f32; 2], half_size: f32, shape: KeyframeShape, color: Rgba);
    fn text(&mut self, pos: [f32; 2], color: Rgba, text: &str);
    fn push_clip_rect(&mut self, min: [f32; 2], max: [f32; 2]);
    fn pop_clip_rect(&mut self);
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        min: [f32; 2],
        max: [f32; 2],
        color: Rgba,
    },
    Line {
        from: [f32; 2],
        to: [f32; 2],
        color: Rgba,
        thickness: f32,
    },
    Marker {
        center: [f32; 2],
        half_size: f32,
        shape: KeyframeShape,
        color: Rgba,
    },
    Text {
        pos: [f32; 2],
        color: Rgba,
        text: String,
    },
    PushClip {
        min: [f32; 2],
        max: [f32; 2],
    },
    PopClip,
}

/// Canvas that records every call; used by tests and headless hosts.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
    depth: usize,
    max_depth: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
        self.max_depth = 0;
    }

    /// Current clip nesting; zero once a draw call has finished cleanly.
    pub fn clip_depth(&self) -> usize {
        self.depth
    }

    pub fn max_clip_depth(&self) -> usize {
        self.max_depth
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Marker { .. }))
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, min: [f32; 2], max: [f32; 2], color: Rgba) {
        self.commands.push(DrawCommand::FillRect { min, max, color });
    }

    fn line(&mut self, from: [f32; 2], to: [f32; 2], color: Rgba, thickness: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            thickness,
        });
    }

    fn marker(&mut self, center: [f32; 2], half_size: f32, shape: KeyframeShape, color: Rgba) {
        self.commands.push(DrawCommand::Marker {
            center,
            half_size,
            shape,
            color,
        });
    }

    fn text(&mut self, pos: [f32; 2], color: Rgba, text: &str) {
        self.commands.push(DrawCommand::Text {
            pos,
            color,
            text: text.to_owned(),
        });
    }

    fn push_clip_rect(&mut self, min: [f32; 2], max: [f32; 2]) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::PushClip { min, max });
    }

    fn pop_clip_rect(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopClip);
    }
}
