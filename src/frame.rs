//! Frame-rate sampling and per-frame scalar inputs.

/// Length of one FPS sampling window.
pub const SAMPLE_WINDOW_MS: f64 = 1000.0;

/// Counts frames and reports a rate once per [`SAMPLE_WINDOW_MS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FpsCounter {
    frames: u32,
    last_sample_ms: f64,
    last_fps: Option<u32>,
}

impl FpsCounter {
    pub fn new(now_ms: f64) -> Self {
        Self {
            frames: 0,
            last_sample_ms: now_ms,
            last_fps: None,
        }
    }

    /// Record one frame at `now_ms`; returns a fresh FPS value when a window closes.
    pub fn tick(&mut self, now_ms: f64) -> Option<u32> {
        self.frames += 1;
        let elapsed = now_ms - self.last_sample_ms;
        if elapsed < SAMPLE_WINDOW_MS {
            return None;
        }
        let fps = (f64::from(self.frames) * 1000.0 / elapsed).round() as u32;
        self.frames = 0;
        self.last_sample_ms = now_ms;
        self.last_fps = Some(fps);
        Some(fps)
    }

    pub fn last(&self) -> Option<u32> {
        self.last_fps
    }
}

pub fn fps_label(fps: u32) -> String {
    format!("FPS: {fps}")
}

/// Vertical scroll as a fraction of one viewport height, clamped to `[0, 1]`.
pub fn scroll_factor(scroll_y: f64, viewport_height: f64) -> f64 {
    if viewport_height <= 0.0 || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / viewport_height).clamp(0.0, 1.0)
}
