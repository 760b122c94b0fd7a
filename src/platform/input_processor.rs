//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit window and device events into engine InputEvents.
//
// Architecture:
//   Winit Events → InputProcessor → InputEvent (engine type) → pump output
//
// Stateful tracking:
// - Last cursor position, to turn absolute moves into deltas
// - Relative mode: raw device motion replaces cursor motion
// - Text input gate: key text is only forwarded while enabled
// - Minimized state, derived from zero-sized resizes and occlusion
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;
use winit::{
    event::{DeviceEvent, ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent as WinitWindowEvent},
    keyboard::{KeyCode as WinitKeyCode, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, MouseButton, WindowEvent};

//=== InputProcessor ======================================================

#[derive(Debug, Default)]
pub(crate) struct InputProcessor {
    cursor: Option<(f64, f64)>,
    /// Sub-pixel raw motion carried to the next event.
    remainder: (f64, f64),
    relative: bool,
    text_input: bool,
    minimized: bool,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    //--- Mode Switches ----------------------------------------------------

    pub(crate) fn set_relative(&mut self, on: bool) {
        self.relative = on;
        self.remainder = (0.0, 0.0);
    }

    pub(crate) fn is_relative(&self) -> bool {
        self.relative
    }

    pub(crate) fn set_text_input(&mut self, on: bool) {
        self.text_input = on;
    }

    /// The cursor was moved to `(x, y)` by the host; the next delta
    /// starts there whether or not the platform reports the move.
    pub(crate) fn warped(&mut self, x: i32, y: i32) {
        self.cursor = Some((f64::from(x), f64::from(y)));
    }

    //--- Winit Dispatch ---------------------------------------------------

    /// Appends the engine events produced by one window event.
    pub(crate) fn process_window_event(&mut self, event: &WinitWindowEvent, now: u32, out: &mut Vec<InputEvent>) {
        match event {
            WinitWindowEvent::CloseRequested => out.push(InputEvent::Window(WindowEvent::Close)),
            WinitWindowEvent::Focused(true) => out.push(InputEvent::Window(WindowEvent::FocusGained)),
            WinitWindowEvent::Focused(false) => out.push(InputEvent::Window(WindowEvent::FocusLost)),
            WinitWindowEvent::CursorEntered { .. } => out.push(InputEvent::Window(WindowEvent::Enter)),
            WinitWindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                out.push(InputEvent::Window(WindowEvent::Leave));
            }
            WinitWindowEvent::Resized(size) => {
                self.process_resize(size.width as i32, size.height as i32, out);
            }
            WinitWindowEvent::Occluded(occluded) => self.process_occluded(*occluded, out),
            WinitWindowEvent::KeyboardInput { event, .. } => {
                let text = event.text.as_ref().map(|t| t.as_str());
                self.process_key(event.physical_key, event.state, event.repeat, text, now, out);
            }
            WinitWindowEvent::Ime(Ime::Commit(text)) => self.process_text(text, now, out),
            WinitWindowEvent::MouseInput { state, button, .. } => {
                out.push(self.process_mouse_button(*button, *state));
            }
            WinitWindowEvent::MouseWheel { delta, .. } => out.extend(self.process_wheel(*delta)),
            WinitWindowEvent::CursorMoved { position, .. } => {
                out.extend(self.process_cursor_moved(position.x, position.y));
            }
            _ => {}
        }
    }

    /// Raw device motion; only used in relative mode.
    pub(crate) fn process_device_event(&mut self, event: &DeviceEvent, out: &mut Vec<InputEvent>) {
        if let DeviceEvent::MouseMotion { delta } = event {
            out.extend(self.process_raw_motion(delta.0, delta.1));
        }
    }

    //--- Keyboard ---------------------------------------------------------

    /// Key transition plus, while text input is on, the text it produced.
    pub(crate) fn process_key(
        &mut self,
        physical: PhysicalKey,
        state: ElementState,
        repeat: bool,
        text: Option<&str>,
        now: u32,
        out: &mut Vec<InputEvent>,
    ) {
        let pressed = state == ElementState::Pressed;
        let key = match physical {
            PhysicalKey::Code(code) => KeyCode::from(code),
            PhysicalKey::Unidentified(_) => KeyCode::Unidentified,
        };
        if key == KeyCode::Unidentified {
            trace!(target: "platform::input", "Unmapped key ignored");
        } else {
            out.push(InputEvent::Key { key, pressed, repeat });
        }

        if pressed {
            if let Some(text) = text {
                self.process_text(text, now, out);
            }
        }
    }

    fn process_text(&mut self, text: &str, now: u32, out: &mut Vec<InputEvent>) {
        if !self.text_input {
            return;
        }
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        if !text.is_empty() {
            out.push(InputEvent::TextInput { text, timestamp: now });
        }
    }

    //--- Mouse ------------------------------------------------------------

    pub(crate) fn process_mouse_button(&self, button: WinitMouseButton, state: ElementState) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::from(button),
            pressed: state == ElementState::Pressed,
        }
    }

    /// One wheel step per event, in the direction scrolled.
    pub(crate) fn process_wheel(&self, delta: MouseScrollDelta) -> Option<InputEvent> {
        let dy = match delta {
            MouseScrollDelta::LineDelta(_, y) => f64::from(y),
            MouseScrollDelta::PixelDelta(pos) => pos.y,
        };
        if dy > 0.0 {
            Some(InputEvent::MouseWheel { dy: 1 })
        } else if dy < 0.0 {
            Some(InputEvent::MouseWheel { dy: -1 })
        } else {
            None
        }
    }

    /// Absolute cursor motion; the first position only sets the origin.
    pub(crate) fn process_cursor_moved(&mut self, x: f64, y: f64) -> Option<InputEvent> {
        let last = self.cursor.replace((x, y));
        if self.relative {
            return None;
        }
        let (lx, ly) = last?;
        let dx = (x - lx).round() as i32;
        let dy = (y - ly).round() as i32;
        if dx == 0 && dy == 0 {
            return None;
        }
        Some(InputEvent::MouseMotion { dx, dy, x: x as i32, y: y as i32 })
    }

    /// Unaccelerated device motion while the cursor is locked.
    pub(crate) fn process_raw_motion(&mut self, dx: f64, dy: f64) -> Option<InputEvent> {
        if !self.relative {
            return None;
        }
        let fx = dx + self.remainder.0;
        let fy = dy + self.remainder.1;
        let (ix, iy) = (fx.trunc(), fy.trunc());
        self.remainder = (fx - ix, fy - iy);
        if ix == 0.0 && iy == 0.0 {
            return None;
        }
        let (x, y) = self.cursor.map_or((0, 0), |(x, y)| (x as i32, y as i32));
        Some(InputEvent::MouseMotion { dx: ix as i32, dy: iy as i32, x, y })
    }

    //--- Window State -----------------------------------------------------

    /// A zero size means minimized; the first real size after that
    /// restores.
    pub(crate) fn process_resize(&mut self, w: i32, h: i32, out: &mut Vec<InputEvent>) {
        if w == 0 || h == 0 {
            self.set_minimized(true, out);
            return;
        }
        self.set_minimized(false, out);
        out.push(InputEvent::Window(WindowEvent::Resized(w, h)));
    }

    pub(crate) fn process_occluded(&mut self, occluded: bool, out: &mut Vec<InputEvent>) {
        self.set_minimized(occluded, out);
    }

    fn set_minimized(&mut self, minimized: bool, out: &mut Vec<InputEvent>) {
        if self.minimized == minimized {
            return;
        }
        self.minimized = minimized;
        let event = if minimized { WindowEvent::Minimized } else { WindowEvent::Restored };
        out.push(InputEvent::Window(event));
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Converts Winit physical key codes to engine key codes.
///
/// Numpad, media and F13+ keys map to `KeyCode::Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Punctuation --------------------------------------------------

            Backquote => KeyCode::Backquote,
            Minus => KeyCode::Minus,
            Equal => KeyCode::Equal,
            BracketLeft => KeyCode::BracketLeft,
            BracketRight => KeyCode::BracketRight,
            Backslash => KeyCode::Backslash,
            Semicolon => KeyCode::Semicolon,
            Quote => KeyCode::Quote,
            Comma => KeyCode::Comma,
            Period => KeyCode::Period,
            Slash => KeyCode::Slash,

            //--- Editing ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,
            Insert => KeyCode::Insert,
            Home => KeyCode::Home,
            End => KeyCode::End,
            PageUp => KeyCode::PageUp,
            PageDown => KeyCode::PageDown,

            //--- Arrows -------------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            //--- Function -----------------------------------------------------

            F1 => KeyCode::F1,
            F2 => KeyCode::F2,
            F3 => KeyCode::F3,
            F4 => KeyCode::F4,
            F5 => KeyCode::F5,
            F6 => KeyCode::F6,
            F7 => KeyCode::F7,
            F8 => KeyCode::F8,
            F9 => KeyCode::F9,
            F10 => KeyCode::F10,
            F11 => KeyCode::F11,
            F12 => KeyCode::F12,

            //--- Modifiers ----------------------------------------------------

            ShiftLeft => KeyCode::ShiftLeft,
            ShiftRight => KeyCode::ShiftRight,
            ControlLeft => KeyCode::ControlLeft,
            ControlRight => KeyCode::ControlRight,
            AltLeft => KeyCode::AltLeft,
            AltRight => KeyCode::AltRight,
            SuperLeft => KeyCode::SuperLeft,
            SuperRight => KeyCode::SuperRight,
            CapsLock => KeyCode::CapsLock,

            //--- Misc ---------------------------------------------------------

            PrintScreen => KeyCode::PrintScreen,
            Pause => KeyCode::Pause,

            _ => KeyCode::Unidentified,
        }
    }
}

/// Back/Forward become the two side buttons.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Back => MouseButton::X1,
            WinitMouseButton::Forward => MouseButton::X2,
            WinitMouseButton::Other(_) => MouseButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
