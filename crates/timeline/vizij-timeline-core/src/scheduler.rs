//! Fixed-rate playback clock.
//!
//! The host ticks with arbitrary deltas; the clock turns accumulated time into
//! whole frame steps at `fps`, wrapping the playhead past `max` back to `min`.

use serde::{Deserialize, Serialize};

/// Slack for float accumulation so `n` ticks of `1/fps` yield exactly `n` steps.
const STEP_EPS: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackClock {
    fps: f64,
    accumulator: f64,
    playing: bool,
}

impl PlaybackClock {
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            accumulator: 0.0,
            playing: false,
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.accumulator = 0.0;
    }

    /// Flip between playing and paused; pausing discards accumulated time.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    pub fn stop(&mut self) {
        self.pause();
    }

    /// Accumulate `dt` seconds and step `frame` once per elapsed frame
    /// duration. Returns the number of steps taken.
    pub fn advance(&mut self, dt: f32, frame: &mut i32, min: i32, max: i32) -> u32 {
        if !self.playing || !self.fps.is_finite() || self.fps <= 0.0 {
            self.accumulator = 0.0;
            return 0;
        }
        let frame_duration = 1.0 / self.fps;
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += f64::from(dt);
        }

        let mut steps = 0u32;
        while self.accumulator + STEP_EPS >= frame_duration {
            *frame = frame.saturating_add(1);
            self.accumulator -= frame_duration;
            if *frame > max {
                *frame = min;
            }
            steps += 1;
        }
        if self.accumulator < 0.0 {
            self.accumulator = 0.0;
        }
        steps
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(30.0)
    }
}
