//=========================================================================
// Game Clock
//=========================================================================
//
// Deterministic time accumulation for the frame loop.
//
// Two timelines are tracked:
//
// ```text
//   real:  totalmillis ── advances by elapsedtime (wall clock, ms)
//   game:  lastmillis  ── advances by curtime (scaled, clamped, paused)
// ```
//
// Game speed is expressed in percent: the game scales elapsed real time
// by its speed (×100 at normal speed) and the sub-millisecond remainder
// is carried to the next frame in `timeerr`, so no time is lost or
// invented across frames at any speed.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::thread;
use std::time::{Duration, Instant};

//=== Internal Dependencies ===============================================

use crate::config::{EngineVars, Var};

/// Largest game-time step for a single frame outside multiplayer.
pub const MAX_FRAME_STEP: i32 = 200;

//=== TimeSource ==========================================================

/// Millisecond tick source and sleeper.
///
/// Abstracted so the loop can be driven by a manual clock in tests.
pub trait TimeSource {
    /// Milliseconds since the source was created.
    fn ticks(&self) -> u32;

    /// Blocks for `ms` milliseconds.
    fn delay(&self, ms: u32);
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy)]
pub struct SystemTime {
    start: Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTime {
    fn ticks(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn delay(&self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

//=== GameClock ===========================================================

/// Frame timing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameClock {
    /// Game milliseconds advanced this frame (scaled, clamped, 0 if paused).
    pub curtime: i32,

    /// Accumulated game time.
    pub lastmillis: i32,

    /// Real milliseconds elapsed this frame.
    pub elapsedtime: i32,

    /// Accumulated real time as seen by the loop.
    pub totalmillis: i32,

    /// Scaled-time remainder (hundredths of a millisecond).
    timeerr: i32,

    /// Tick value at the last clock reset.
    realbase: i32,

    /// `totalmillis` at the last clock reset.
    virtbase: i32,
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            curtime: 0,
            lastmillis: 1,
            elapsedtime: 0,
            totalmillis: 1,
            timeerr: 0,
            realbase: 0,
            virtbase: 0,
        }
    }

    //--- Real Time --------------------------------------------------------

    /// Rebases the clock so drift correction starts fresh from `ticks`.
    ///
    /// Called whenever `clockerror` or `clockfix` change.
    pub fn reset(&mut self, ticks: u32) {
        self.realbase = ticks as i32;
        self.virtbase = self.totalmillis;
    }

    /// Current real time in loop milliseconds.
    ///
    /// Applies the `clockerror` drift correction when `clockfix` is set
    /// and never runs backwards relative to `totalmillis`.
    pub fn millis(&self, ticks: u32, vars: &EngineVars) -> i32 {
        let mut millis = (ticks as i32).wrapping_sub(self.realbase);
        if vars.flag(Var::ClockFix) {
            let scale = f64::from(vars.get(Var::ClockError)) / 1_000_000.0;
            millis = (f64::from(millis) * scale) as i32;
        }
        millis += self.virtbase;
        millis.max(self.totalmillis)
    }

    //--- Frame Advance ----------------------------------------------------

    /// Advances both timelines to `millis`.
    ///
    /// `scale_time` maps real milliseconds to game time in hundredths
    /// (`elapsed * 100` at normal speed).
    pub fn advance<F>(&mut self, millis: i32, scale_time: F, multiplayer: bool, paused: bool)
    where
        F: FnOnce(i32) -> i32,
    {
        self.elapsedtime = millis - self.totalmillis;

        let scaled = scale_time(self.elapsedtime) + self.timeerr;
        self.curtime = scaled / 100;
        self.timeerr = scaled % 100;

        if !multiplayer && self.curtime > MAX_FRAME_STEP {
            self.curtime = MAX_FRAME_STEP;
        }
        if paused {
            self.curtime = 0;
        }

        self.lastmillis += self.curtime;
        self.totalmillis = millis;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Test Support
//=========================================================================

/// Manually driven time source; `delay` advances the clock.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ManualTime {
    now: std::cell::Cell<u32>,
    slept: std::cell::Cell<u32>,
}

#[cfg(test)]
impl ManualTime {
    pub(crate) fn at(ms: u32) -> Self {
        let time = Self::default();
        time.now.set(ms);
        time
    }

    pub(crate) fn advance(&self, ms: u32) {
        self.now.set(self.now.get() + ms);
    }

    pub(crate) fn total_slept(&self) -> u32 {
        self.slept.get()
    }
}

#[cfg(test)]
impl TimeSource for ManualTime {
    fn ticks(&self) -> u32 {
        self.now.get()
    }

    fn delay(&self, ms: u32) {
        self.slept.set(self.slept.get() + ms);
        self.advance(ms);
    }
}

/// Shared handle, so a test can keep driving the clock it gave away.
#[cfg(test)]
impl TimeSource for std::rc::Rc<ManualTime> {
    fn ticks(&self) -> u32 {
        (**self).ticks()
    }

    fn delay(&self, ms: u32) {
        (**self).delay(ms);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
