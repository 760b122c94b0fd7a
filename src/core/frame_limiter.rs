//=========================================================================
// Frame Limiter
//=========================================================================
//
// Caps the frame rate by sleeping at the top of each frame.
//
// `1000 / limit` is rarely a whole number of milliseconds, so the
// fractional part (`1000 % limit`) is accumulated and an extra
// millisecond is slept whenever a whole one has built up. A frame that
// already ran long resets the accumulator instead of trying to catch up.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::clock::TimeSource;
use crate::config::{EngineVars, Var};

//=== FrameLimiter ========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameLimiter {
    fps_error: i32,
}

impl FrameLimiter {
    pub fn new() -> Self {
        Self { fps_error: 0 }
    }

    /// Effective frame cap, 0 meaning unlimited.
    ///
    /// Menus and minimized windows use `menufps` (never above `maxfps`
    /// when that is set).
    pub fn limit(vars: &EngineVars, in_menu: bool, minimized: bool) -> i32 {
        let maxfps = vars.get(Var::MaxFps);
        let menufps = vars.get(Var::MenuFps);
        if (in_menu || minimized) && menufps != 0 {
            if maxfps != 0 {
                maxfps.min(menufps)
            } else {
                menufps
            }
        } else {
            maxfps
        }
    }

    /// Computes the delay for this frame and updates the error term.
    ///
    /// Returns the milliseconds to sleep (0 if none).
    pub fn delay_for(&mut self, limit: i32, millis: i32, last_millis: i32) -> i32 {
        if limit <= 0 {
            return 0;
        }

        let mut delay = 1000 / limit - (millis - last_millis);
        if delay < 0 {
            self.fps_error = 0;
            return 0;
        }

        self.fps_error += 1000 % limit;
        if self.fps_error >= limit {
            delay += 1;
            self.fps_error -= limit;
        }
        delay
    }

    /// Sleeps as needed and advances `millis` by the time slept.
    pub fn limit_fps(
        &mut self,
        millis: &mut i32,
        last_millis: i32,
        limit: i32,
        time: &dyn TimeSource,
    ) {
        let delay = self.delay_for(limit, *millis, last_millis);
        if delay > 0 {
            trace!(target: "engine::loop", "Frame limiter sleeping {} ms", delay);
            time.delay(delay as u32);
            *millis += delay;
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
