//=========================================================================
// FPS History
//=========================================================================
//
// Ring buffer of the last 60 frame times, used for the fps readout.
//
//=========================================================================

/// Number of frames averaged.
pub const MAX_FPS_HISTORY: usize = 60;

/// Averaged frame rate with best/worst spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsStats {
    pub fps: i32,
    /// How much faster the best frame was than the average.
    pub best_diff: i32,
    /// How much slower the worst frame was than the average.
    pub worst_diff: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpsHistory {
    frames: [i32; MAX_FPS_HISTORY],
    pos: usize,
}

impl FpsHistory {
    pub fn new() -> Self {
        Self {
            frames: [1; MAX_FPS_HISTORY],
            pos: 0,
        }
    }

    /// Forgets all recorded frames.
    pub fn reset(&mut self) {
        self.frames = [1; MAX_FPS_HISTORY];
        self.pos = 0;
    }

    /// Records one frame time, clamped to 1..=1000 ms.
    pub fn record(&mut self, millis: i32) {
        self.frames[self.pos] = millis.clamp(1, 1000);
        self.pos = (self.pos + 1) % MAX_FPS_HISTORY;
    }

    /// Instantaneous rate from the most recent frame.
    pub fn raw_fps(&self) -> f32 {
        let last = (self.pos + MAX_FPS_HISTORY - 1) % MAX_FPS_HISTORY;
        1000.0 / self.frames[last] as f32
    }

    /// Average rate over the window.
    pub fn stats(&self) -> FpsStats {
        let total: i32 = self.frames.iter().sum();
        let best = self.frames.iter().copied().min().unwrap_or(1);
        let worst = self.frames.iter().copied().max().unwrap_or(1);

        let fps = (1000 * MAX_FPS_HISTORY as i32) / total;
        FpsStats {
            fps,
            best_diff: 1000 / best - fps,
            worst_diff: fps - 1000 / worst,
        }
    }
}

impl Default for FpsHistory {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
