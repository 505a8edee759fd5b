use std::time::{Duration, Instant};

/// Per-frame sample produced by [`FrameClock::tick`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameTick {
    /// Seconds since the first tick.
    pub elapsed: f32,
    /// Seconds since the previous tick; zero on the first frame.
    pub delta: f32,
    /// Monotonic frame counter, starting at zero.
    pub frame: u32,
}

/// Tracks elapsed/delta time, the frame counter, and a windowed FPS estimate.
pub(crate) struct FrameClock {
    start: Instant,
    last: Instant,
    frame: u32,
    fps_window_start: Instant,
    fps_frames: u32,
    fps: f32,
}

impl FrameClock {
    pub(crate) fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame: 0,
            fps_window_start: now,
            fps_frames: 0,
            fps: 0.0,
        }
    }

    pub(crate) fn tick(&mut self) -> FrameTick {
        let now = Instant::now();
        if self.frame == 0 {
            // Time starts when the first frame renders, not at construction.
            self.start = now;
            self.last = now;
            self.fps_window_start = now;
        }
        let tick = FrameTick {
            elapsed: now.duration_since(self.start).as_secs_f32(),
            delta: now.duration_since(self.last).as_secs_f32(),
            frame: self.frame,
        };
        self.last = now;
        self.frame = self.frame.saturating_add(1);

        self.fps_frames += 1;
        let window = now.duration_since(self.fps_window_start);
        if window >= Duration::from_millis(300) {
            self.fps = self.fps_frames as f32 / window.as_secs_f32();
            self.fps_frames = 0;
            self.fps_window_start = now;
        }

        tick
    }

    pub(crate) fn fps(&self) -> f32 {
        self.fps
    }
}

/// Skips redraws to honor an optional FPS cap.
///
/// Uses an accumulator so long gaps do not trigger a burst of catch-up
/// frames: at most one interval is consumed per rendered frame.
pub(crate) struct FramePacer {
    interval: Option<Duration>,
    accumulator: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    pub(crate) fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            accumulator: Duration::ZERO,
            last: None,
        }
    }

    pub(crate) fn should_render(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };
        let Some(last) = self.last else {
            self.last = Some(now);
            return true;
        };
        let delta = now.saturating_duration_since(last);
        self.last = Some(now);
        self.accumulator = self.accumulator.saturating_add(delta);
        // Small slack keeps vblank-aligned callbacks from slipping a frame.
        if self.accumulator + Duration::from_micros(250) < interval {
            false
        } else {
            self.accumulator = self.accumulator.saturating_sub(interval);
            true
        }
    }
}
