//! Visible frame window and ruler tick spacing.

/// Visible window `[view_min, view_max]` over the content range
/// `[content_min, content_max]`, in fractional frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomState {
    pub view_min: f64,
    pub view_max: f64,
    pub content_min: f64,
    pub content_max: f64,
    /// Smallest span the window may shrink to; never below one frame.
    pub min_view_span: f64,
}

impl ZoomState {
    /// Start with an invalid window so the first `sync` sizes it.
    pub fn new(min_view_span: f64) -> Self {
        let min_view_span = if min_view_span.is_finite() {
            min_view_span.max(1.0)
        } else {
            1.0
        };
        Self {
            view_min: 0.0,
            view_max: f64::NAN,
            content_min: 0.0,
            content_max: 0.0,
            min_view_span,
        }
    }

    pub fn span(&self) -> f64 {
        self.view_max - self.view_min
    }

    pub fn is_valid(&self) -> bool {
        self.view_min.is_finite() && self.view_max.is_finite() && self.view_max > self.view_min
    }

    /// Align with the current content range and track width.
    ///
    /// An invalid window is reset to start at `content_min` and span
    /// `width / initial_ppf` frames (100 if that is degenerate). The window is
    /// then clamped, and snapped to the full content when it already shows
    /// every frame.
    pub fn sync(&mut self, content_min: f64, content_max: f64, width: f64, initial_ppf: f64) {
        self.content_min = content_min;
        self.content_max = content_max.max(content_min);
        if !self.is_valid() {
            let span = width / initial_ppf;
            self.view_min = self.content_min;
            self.view_max = if span.is_finite() && span > 0.0 {
                self.view_min + span
            } else {
                self.view_min + 100.0
            };
        }
        self.clamp();

        let frame_count = self.content_max - self.content_min;
        if self.span().floor() >= frame_count {
            self.view_min = self.content_min;
            self.view_max = self.content_max;
        }
    }

    /// Keep the window inside the content range with at least
    /// `min_view_span` frames. Never panics, including when the content is
    /// shorter than the minimum span.
    pub fn clamp(&mut self) {
        let min_span = self.min_view_span;
        let upper_min = (self.content_max - min_span).max(self.content_min);
        self.view_min = clamp_f64(self.view_min, self.content_min, upper_min);
        let lo = self.view_min + min_span;
        let hi = self.content_max.max(lo);
        self.view_max = clamp_f64(self.view_max, lo, hi);
    }

    /// Move the window so it starts at `view_min`, keeping its span.
    pub fn pan_to(&mut self, view_min: f64) {
        let span = self.span();
        let upper_min = (self.content_max - span).max(self.content_min);
        self.view_min = clamp_f64(view_min, self.content_min, upper_min);
        self.view_max = self.view_min + span;
    }

    /// Replace the window and clamp it.
    pub fn set_view(&mut self, view_min: f64, view_max: f64) {
        self.view_min = view_min;
        self.view_max = view_max;
        self.clamp();
    }

    /// Pixels per frame for a track area `width` pixels wide.
    pub fn pixels_per_frame(&self, width: f32) -> f32 {
        let span = self.span();
        if span.is_finite() && span > 0.0 {
            (f64::from(width) / span) as f32
        } else {
            0.0
        }
    }

    pub fn first_frame(&self) -> i32 {
        if self.view_min.is_finite() {
            self.view_min.round() as i32
        } else {
            0
        }
    }
}

/// NaN-tolerant clamp that never panics on inverted bounds.
fn clamp_f64(v: f64, lo: f64, hi: f64) -> f64 {
    let hi = hi.max(lo);
    if v.is_nan() {
        lo
    } else {
        v.max(lo).min(hi)
    }
}

/// Ruler spacing: a tick every `step` frames, a label every `label_every`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulerTicks {
    pub step: i32,
    pub label_every: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    /// Labelled, full height.
    Major,
    /// Halfway between labels.
    Half,
    Minor,
}

const MAX_LABEL_EVERY: i32 = 1 << 28;

/// Double tick spacing until labelled ticks sit at least `min_distance`
/// pixels apart. Starts at a label every 5 frames with a tick every frame.
/// A non-positive or non-finite scale yields the starting spacing.
pub fn ruler_ticks(pixels_per_frame: f32, min_distance: f32) -> RulerTicks {
    let mut ticks = RulerTicks {
        step: 1,
        label_every: 5,
    };
    if !(pixels_per_frame.is_finite() && pixels_per_frame > 0.0) {
        return ticks;
    }
    while (ticks.label_every as f32) * pixels_per_frame < min_distance
        && ticks.label_every < MAX_LABEL_EVERY
    {
        ticks.label_every *= 2;
        ticks.step *= 2;
    }
    ticks
}

impl RulerTicks {
    /// Classify an on-ruler frame. The range ends are always labelled.
    pub fn kind(&self, frame: i32, frame_min: i32, frame_max: i32) -> TickKind {
        let half = (self.label_every / 2).max(1);
        if frame % self.label_every == 0 || frame == frame_min || frame == frame_max {
            TickKind::Major
        } else if frame % half == 0 {
            TickKind::Half
        } else {
            TickKind::Minor
        }
    }
}
