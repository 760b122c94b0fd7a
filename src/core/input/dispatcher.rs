//=========================================================================
// Input Dispatcher
//=========================================================================
//
// Per-frame input drain.
//
// ```text
//   Backend ──pump──> warp filter ──> pending queue ──check_input──> InputSink
//                                              ▲
//                           intercept_key ─────┘ (peeks during loads)
// ```
//
// Events stay in the pending queue between a loading-time
// `intercept_key` and the next `check_input`, so nothing typed during a
// load is lost. Only motion is discarded then.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::VecDeque;

//=== External Dependencies ===============================================

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, WindowEvent, WHEEL_DOWN, WHEEL_UP};
use super::grab::InputGrab;
use super::{Backend, InputSink};
use crate::config::{EngineVars, Var};
use crate::core::display::Display;

//=== InputFrame ==========================================================

/// Window-level outcome of one input drain, applied by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// Quit or window close was received; the loop must end.
    pub quit: bool,

    /// Last minimize/restore transition seen.
    pub minimized: Option<bool>,

    /// Last window size reported.
    pub resized: Option<(i32, i32)>,
}

//=== InputDispatcher =====================================================

#[derive(Debug, Default)]
pub struct InputDispatcher {
    pending: VecDeque<InputEvent>,
    scratch: Vec<InputEvent>,
    key_repeat_mask: u32,
    text_input_mask: u32,
    text_input_time: u32,
    last_intercept: Option<KeyCode>,
    pub grab: InputGrab,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    //--- Pump -------------------------------------------------------------

    /// Centre the cursor is warped to, if warping is active.
    fn warp_center(&self, display: &dyn Display, screen: (i32, i32)) -> Option<(i32, i32)> {
        if self.grab.grabbed && !self.grab.is_relative() && !display.is_fullscreen() {
            Some((screen.0 / 2, screen.1 / 2))
        } else {
            None
        }
    }

    /// Pulls new events into the pending queue.
    ///
    /// Motion landing on the warp centre was produced by our own warp and
    /// is dropped. With `keep_motion` false all motion is dropped.
    fn pump<B: Backend>(&mut self, backend: &mut B, now: u32, screen: (i32, i32), keep_motion: bool) {
        let center = self.warp_center(&*backend, screen);
        backend.pump_events(now, &mut self.scratch);

        for event in self.scratch.drain(..) {
            if let InputEvent::MouseMotion { x, y, .. } = event {
                if !keep_motion {
                    continue;
                }
                if let Some((cx, cy)) = center {
                    if x == cx && y == cy {
                        continue;
                    }
                    // let mac users drag windows via the title bar
                    if cfg!(target_os = "macos") && y == 0 {
                        continue;
                    }
                }
            }
            self.pending.push_back(event);
        }
    }

    //--- Frame Drain ------------------------------------------------------

    /// Drains all pending input, dispatching it to `sink`.
    ///
    /// Returns early on quit; events after the quit stay queued.
    pub fn check_input<B: Backend>(
        &mut self,
        backend: &mut B,
        sink: &mut dyn InputSink,
        vars: &EngineVars,
        now: u32,
        screen: (i32, i32),
    ) -> InputFrame {
        self.pump(backend, now, screen, true);

        let mut frame = InputFrame::default();
        let mut mouse_moved = false;

        while let Some(event) = self.pending.pop_front() {
            match event {
                InputEvent::Quit | InputEvent::Window(WindowEvent::Close) => {
                    debug!(target: "platform::input", "Quit requested");
                    frame.quit = true;
                    return frame;
                }

                InputEvent::TextInput { text, timestamp } => {
                    let age = timestamp.wrapping_sub(self.text_input_time) as i32;
                    if self.text_input_mask != 0
                        && age >= vars.get(Var::TextInputFilter)
                        && !text.is_empty()
                    {
                        sink.process_text_input(&text);
                    }
                }

                InputEvent::Key { key, pressed, repeat } => {
                    if self.key_repeat_mask != 0 || !repeat {
                        if let Some(code) = key.code() {
                            sink.process_key(code, pressed);
                        }
                    }
                }

                InputEvent::Window(window) => {
                    self.handle_window(window, backend, vars, &mut frame);
                }

                InputEvent::MouseMotion { dx, dy, .. } => {
                    if self.grab.grabbed {
                        let (dx, dy) = self.coalesce_motion(dx, dy);
                        if !sink.ui_move_cursor(dx, dy) {
                            sink.mouse_move(dx, dy);
                        }
                        mouse_moved = true;
                    } else if self.grab.should_grab {
                        self.grab.grab(true, vars.flag(Var::RelativeMouse), backend);
                    }
                }

                InputEvent::MouseButton { button, pressed } => {
                    if let Some(code) = button.code() {
                        sink.process_key(code, pressed);
                    }
                }

                InputEvent::MouseWheel { dy } => {
                    let code = match dy.signum() {
                        1 => WHEEL_UP,
                        -1 => WHEEL_DOWN,
                        _ => continue,
                    };
                    sink.process_key(code, true);
                    sink.process_key(code, false);
                }
            }
        }

        if mouse_moved {
            self.reset_mouse_motion(backend, screen);
        }
        frame
    }

    fn handle_window(
        &mut self,
        event: WindowEvent,
        display: &mut dyn Display,
        vars: &EngineVars,
        frame: &mut InputFrame,
    ) {
        let relative = vars.flag(Var::RelativeMouse);
        match event {
            WindowEvent::FocusGained => self.grab.should_grab = true,
            WindowEvent::Enter => self.grab.grab(true, relative, display),
            WindowEvent::Leave | WindowEvent::FocusLost => self.grab.grab(false, relative, display),
            WindowEvent::Minimized => frame.minimized = Some(true),
            WindowEvent::Restored => frame.minimized = Some(false),
            WindowEvent::Resized(w, h) => frame.resized = Some((w, h)),
            WindowEvent::Close => {}
        }
    }

    /// Sums all motion immediately following in the queue.
    fn coalesce_motion(&mut self, mut dx: i32, mut dy: i32) -> (i32, i32) {
        while let Some(InputEvent::MouseMotion { dx: mx, dy: my, .. }) = self.pending.front() {
            dx += mx;
            dy += my;
            self.pending.pop_front();
        }
        (dx, dy)
    }

    /// Warps the cursor back to the centre after motion was consumed.
    fn reset_mouse_motion(&self, display: &mut dyn Display, screen: (i32, i32)) {
        if let Some((cx, cy)) = self.warp_center(display, screen) {
            trace!(target: "platform::input", "Warping cursor to {}x{}", cx, cy);
            display.warp_cursor(cx, cy);
        }
    }

    //--- Loading-Time Access ----------------------------------------------

    /// Checks for a key press while the loop is not running (e.g. Escape
    /// during a map load).
    ///
    /// Only events that arrived since the last interception of the same
    /// key are searched. A match is removed; everything else stays queued.
    pub fn intercept_key<B: Backend>(
        &mut self,
        key: KeyCode,
        backend: &mut B,
        now: u32,
        screen: (i32, i32),
    ) -> bool {
        let start = if self.last_intercept == Some(key) { self.pending.len() } else { 0 };
        self.pump(backend, now, screen, false);
        self.last_intercept = Some(key);

        if key == KeyCode::Unidentified {
            return false;
        }
        let found = self.pending.iter().skip(start).position(|event| {
            matches!(event, InputEvent::Key { key: k, pressed: true, .. } if *k == key)
        });
        match found {
            Some(offset) => {
                self.pending.remove(start + offset);
                true
            }
            None => false,
        }
    }

    /// Discards all pending motion (after the initial grab).
    pub fn ignore_mouse_motion<B: Backend>(&mut self, backend: &mut B, now: u32) {
        self.pump(backend, now, (0, 0), false);
        self.pending.retain(|event| !event.is_motion());
    }

    //--- Masks ------------------------------------------------------------

    /// Enables key auto-repeat while any mask bit is set.
    pub fn key_repeat(&mut self, on: bool, mask: u32) {
        if on {
            self.key_repeat_mask |= mask;
        } else {
            self.key_repeat_mask &= !mask;
        }
    }

    /// Enables text input while any mask bit is set.
    ///
    /// The first bit starts platform text input and opens the
    /// `textinputfilter` window; clearing the last bit stops it.
    pub fn text_input(&mut self, on: bool, mask: u32, display: &mut dyn Display, now: u32) {
        if on {
            if self.text_input_mask == 0 {
                display.set_text_input(true);
                self.text_input_time = now;
            }
            self.text_input_mask |= mask;
        } else {
            self.text_input_mask &= !mask;
            if self.text_input_mask == 0 {
                display.set_text_input(false);
            }
        }
    }

    pub fn is_text_input(&self) -> bool {
        self.text_input_mask != 0
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::MouseButton;
    use crate::core::testing::{FakeDisplay, RecordingSink, SinkCall};

    const SCREEN: (i32, i32) = (800, 600);

    fn key(key: KeyCode, pressed: bool) -> InputEvent {
        InputEvent::Key { key, pressed, repeat: false }
    }

    fn motion(dx: i32, dy: i32, x: i32, y: i32) -> InputEvent {
        InputEvent::MouseMotion { dx, dy, x, y }
    }

    struct Harness {
        dispatcher: InputDispatcher,
        display: FakeDisplay,
        sink: RecordingSink,
        vars: EngineVars,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                dispatcher: InputDispatcher::new(),
                display: FakeDisplay::new((1920, 1080)),
                sink: RecordingSink::default(),
                vars: EngineVars::new(),
            }
        }

        fn check(&mut self, now: u32) -> InputFrame {
            self.dispatcher.check_input(
                &mut self.display,
                &mut self.sink,
                &self.vars,
                now,
                SCREEN,
            )
        }
    }

    //=====================================================================
    // Keys & Buttons
    //=====================================================================

    #[test]
    fn keys_dispatched_in_order() {
        let mut h = Harness::new();
        h.display.push(vec![key(KeyCode::KeyW, true), key(KeyCode::KeyW, false)]);

        h.check(0);

        assert_eq!(
            h.sink.calls,
            vec![SinkCall::Key('w' as i32, true), SinkCall::Key('w' as i32, false)]
        );
    }

    #[test]
    fn repeats_need_key_repeat_mask() {
        let mut h = Harness::new();
        let repeat = InputEvent::Key { key: KeyCode::Backspace, pressed: true, repeat: true };

        h.display.push(vec![repeat.clone()]);
        h.check(0);
        assert!(h.sink.calls.is_empty());

        h.dispatcher.key_repeat(true, 1 << 2);
        h.display.push(vec![repeat.clone()]);
        h.check(0);
        assert_eq!(h.sink.calls.len(), 1);

        h.dispatcher.key_repeat(false, 1 << 2);
        h.display.push(vec![repeat]);
        h.check(0);
        assert_eq!(h.sink.calls.len(), 1);
    }

    #[test]
    fn mouse_buttons_use_negative_codes() {
        let mut h = Harness::new();
        h.display.push(vec![
            InputEvent::MouseButton { button: MouseButton::Left, pressed: true },
            InputEvent::MouseButton { button: MouseButton::X2, pressed: false },
            InputEvent::MouseButton { button: MouseButton::Other, pressed: true },
        ]);

        h.check(0);

        assert_eq!(h.sink.calls, vec![SinkCall::Key(-1, true), SinkCall::Key(-7, false)]);
    }

    #[test]
    fn wheel_presses_and_releases() {
        let mut h = Harness::new();
        h.display.push(vec![
            InputEvent::MouseWheel { dy: 3 },
            InputEvent::MouseWheel { dy: 0 },
            InputEvent::MouseWheel { dy: -1 },
        ]);

        h.check(0);

        assert_eq!(
            h.sink.calls,
            vec![
                SinkCall::Key(-4, true),
                SinkCall::Key(-4, false),
                SinkCall::Key(-5, true),
                SinkCall::Key(-5, false),
            ]
        );
    }

    //=====================================================================
    // Text Input
    //=====================================================================

    #[test]
    fn text_ignored_without_mask() {
        let mut h = Harness::new();
        h.display.push(vec![InputEvent::TextInput { text: "hi".into(), timestamp: 100 }]);
        h.check(100);
        assert!(h.sink.calls.is_empty());
    }

    #[test]
    fn text_filtered_right_after_enabling() {
        let mut h = Harness::new();
        h.dispatcher.text_input(true, 1, &mut h.display, 1000);
        assert!(h.display.text_input);

        h.display.push(vec![
            InputEvent::TextInput { text: "t".into(), timestamp: 1002 },
            InputEvent::TextInput { text: "ok".into(), timestamp: 1005 },
        ]);
        h.check(1005);

        assert_eq!(h.sink.calls, vec![SinkCall::Text("ok".into())]);
    }

    #[test]
    fn text_input_stops_with_last_mask_bit() {
        let mut h = Harness::new();
        h.dispatcher.text_input(true, 1, &mut h.display, 0);
        h.dispatcher.text_input(true, 2, &mut h.display, 50);
        h.dispatcher.text_input(false, 1, &mut h.display, 60);
        assert!(h.display.text_input);
        assert!(h.dispatcher.is_text_input());

        h.dispatcher.text_input(false, 2, &mut h.display, 70);
        assert!(!h.display.text_input);
        assert!(!h.dispatcher.is_text_input());
    }

    //=====================================================================
    // Mouse Motion
    //=====================================================================

    #[test]
    fn motion_coalesced_while_grabbed() {
        let mut h = Harness::new();
        h.dispatcher.grab.grab(true, true, &mut h.display);
        h.display.push(vec![
            motion(1, 2, 10, 10),
            motion(3, 4, 13, 14),
            key(KeyCode::KeyA, true),
            motion(5, 0, 18, 14),
        ]);

        h.check(0);

        assert_eq!(
            h.sink.calls,
            vec![
                SinkCall::Ui(4, 6),
                SinkCall::Move(4, 6),
                SinkCall::Key('a' as i32, true),
                SinkCall::Ui(5, 0),
                SinkCall::Move(5, 0),
            ]
        );
    }

    #[test]
    fn ui_consumes_motion() {
        let mut h = Harness::new();
        h.sink.ui_captures = true;
        h.dispatcher.grab.grab(true, true, &mut h.display);
        h.display.push(vec![motion(2, 2, 0, 0)]);

        h.check(0);

        assert_eq!(h.sink.calls, vec![SinkCall::Ui(2, 2)]);
    }

    #[test]
    fn motion_ignored_until_grabbed() {
        let mut h = Harness::new();
        h.display.push(vec![motion(2, 2, 0, 0)]);
        h.check(0);
        assert!(h.sink.calls.is_empty());
        assert!(!h.dispatcher.grab.grabbed);
    }

    #[test]
    fn focus_then_motion_grabs() {
        let mut h = Harness::new();
        h.display.push(vec![InputEvent::Window(WindowEvent::FocusGained), motion(1, 1, 5, 5)]);

        h.check(0);

        assert!(h.dispatcher.grab.grabbed);
        assert!(!h.dispatcher.grab.should_grab);
        assert!(h.sink.calls.is_empty(), "grabbing motion is not dispatched");
    }

    #[test]
    fn warp_motion_filtered_and_cursor_recentred() {
        let mut h = Harness::new();
        h.vars.set(Var::RelativeMouse, 0).unwrap();
        h.dispatcher.grab.grab(true, false, &mut h.display);
        h.display.push(vec![motion(-3, 0, 400, 300), motion(7, 1, 407, 301)]);

        h.check(0);

        assert_eq!(h.sink.calls, vec![SinkCall::Ui(7, 1), SinkCall::Move(7, 1)]);
        assert_eq!(h.display.warps, vec![(400, 300)]);
    }

    #[test]
    fn relative_mode_never_warps() {
        let mut h = Harness::new();
        h.dispatcher.grab.grab(true, true, &mut h.display);
        h.display.push(vec![motion(-3, 0, 400, 300)]);

        h.check(0);

        assert_eq!(h.sink.calls.len(), 2, "centre motion kept in relative mode");
        assert!(h.display.warps.is_empty());
    }

    //=====================================================================
    // Window Events
    //=====================================================================

    #[test]
    fn quit_stops_the_drain() {
        let mut h = Harness::new();
        h.display.push(vec![
            key(KeyCode::KeyA, true),
            InputEvent::Window(WindowEvent::Close),
            key(KeyCode::KeyB, true),
        ]);

        let frame = h.check(0);

        assert!(frame.quit);
        assert_eq!(h.sink.calls.len(), 1);
        assert_eq!(h.dispatcher.pending_len(), 1);
    }

    #[test]
    fn window_state_reported() {
        let mut h = Harness::new();
        h.display.push(vec![
            InputEvent::Window(WindowEvent::Minimized),
            InputEvent::Window(WindowEvent::Restored),
            InputEvent::Window(WindowEvent::Resized(1024, 700)),
        ]);

        let frame = h.check(0);

        assert_eq!(frame.minimized, Some(false));
        assert_eq!(frame.resized, Some((1024, 700)));
        assert!(!frame.quit);
    }

    #[test]
    fn enter_and_leave_toggle_grab() {
        let mut h = Harness::new();
        h.display.push(vec![InputEvent::Window(WindowEvent::Enter)]);
        h.check(0);
        assert!(h.dispatcher.grab.grabbed);

        h.display.push(vec![InputEvent::Window(WindowEvent::FocusLost)]);
        h.check(0);
        assert!(!h.dispatcher.grab.grabbed);
        assert!(h.display.cursor_visible);
    }

    //=====================================================================
    // Interception
    //=====================================================================

    #[test]
    fn intercept_finds_and_removes_key() {
        let mut h = Harness::new();
        h.display.push(vec![
            key(KeyCode::KeyA, true),
            motion(1, 1, 0, 0),
            key(KeyCode::Escape, true),
        ]);

        assert!(h.dispatcher.intercept_key(KeyCode::Escape, &mut h.display, 0, SCREEN));
        assert_eq!(h.dispatcher.pending_len(), 1, "motion dropped, other keys kept");

        h.check(0);
        assert_eq!(h.sink.calls, vec![SinkCall::Key('a' as i32, true)]);
    }

    #[test]
    fn repeated_intercept_only_sees_new_events() {
        let mut h = Harness::new();
        h.display.push(vec![key(KeyCode::Escape, false)]);
        assert!(!h.dispatcher.intercept_key(KeyCode::Escape, &mut h.display, 0, SCREEN));

        h.display.push(vec![key(KeyCode::KeyQ, true)]);
        assert!(!h.dispatcher.intercept_key(KeyCode::Escape, &mut h.display, 0, SCREEN));

        h.display.push(vec![key(KeyCode::Escape, true)]);
        assert!(h.dispatcher.intercept_key(KeyCode::Escape, &mut h.display, 0, SCREEN));
        assert_eq!(h.dispatcher.pending_len(), 2);
    }

    #[test]
    fn intercept_unidentified_only_pumps() {
        let mut h = Harness::new();
        h.display.push(vec![key(KeyCode::KeyA, true)]);
        assert!(!h.dispatcher.intercept_key(KeyCode::Unidentified, &mut h.display, 0, SCREEN));
        assert_eq!(h.dispatcher.pending_len(), 1);
    }

    #[test]
    fn ignore_mouse_motion_drops_queued_motion() {
        let mut h = Harness::new();
        h.dispatcher.grab.grab(true, true, &mut h.display);
        h.display.push(vec![motion(50, 50, 0, 0), key(KeyCode::KeyA, true)]);

        h.dispatcher.ignore_mouse_motion(&mut h.display, 0);
        h.check(0);

        assert_eq!(h.sink.calls, vec![SinkCall::Key('a' as i32, true)]);
    }
}
