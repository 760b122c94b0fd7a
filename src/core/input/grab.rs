//=========================================================================
// Input Grab
//=========================================================================
//
// Cursor capture state.
//
// While grabbed the cursor is hidden and mouse motion steers the view.
// Relative mode (cursor locked, raw deltas) is preferred; if the platform
// refuses it once, it is never tried again and the host falls back to
// warping the cursor back to the window centre after each frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::display::Display;

//=== InputGrab ===========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputGrab {
    /// Input is captured by the game.
    pub grabbed: bool,

    /// Focus was gained; grab on the next mouse motion.
    pub should_grab: bool,

    /// Relative mode has not failed yet.
    can_relative: bool,

    /// Relative mode is active.
    relative: bool,
}

impl InputGrab {
    pub fn new() -> Self {
        Self {
            grabbed: false,
            should_grab: false,
            can_relative: true,
            relative: false,
        }
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn can_relative(&self) -> bool {
        self.can_relative
    }

    /// Captures or releases the mouse.
    ///
    /// `use_relative` is the `relativemouse` setting.
    pub fn grab(&mut self, on: bool, use_relative: bool, display: &mut dyn Display) {
        self.grabbed = on;
        if on {
            display.set_cursor_visible(false);
            if self.can_relative && use_relative {
                match display.set_relative_mouse(true) {
                    Ok(()) => {
                        display.set_window_grab(true);
                        self.relative = true;
                    }
                    Err(e) => {
                        warn!(target: "platform::input", "Relative mouse unavailable: {}", e);
                        display.set_window_grab(false);
                        self.can_relative = false;
                        self.relative = false;
                    }
                }
            }
            debug!(target: "platform::input", "Input grabbed (relative: {})", self.relative);
        } else {
            display.set_cursor_visible(true);
            if self.relative {
                // leaving relative mode cannot meaningfully fail
                let _ = display.set_relative_mouse(false);
                display.set_window_grab(false);
                self.relative = false;
            }
            debug!(target: "platform::input", "Input released");
        }
        self.should_grab = false;
    }

    /// Gives the cursor back to the desktop on exit or fatal error.
    pub fn release_all(&mut self, display: &mut dyn Display) {
        display.set_cursor_visible(true);
        let _ = display.set_relative_mouse(false);
        if display.has_window() {
            display.set_window_grab(false);
        }
        self.grabbed = false;
        self.relative = false;
    }
}

impl Default for InputGrab {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
