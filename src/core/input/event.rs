//=========================================================================
// Input Event Types
//
// Platform-independent representation of everything the event pump
// delivers to the host loop.
//
// Responsibilities:
// - Represent keyboard, mouse, text and window events portably
// - Map keys and mouse buttons to the integer codes the binding layer
//   uses (`KeyCode::code`, `MouseButton::code`)
//
// Event Flow:
// ```text
// Platform Layer (Winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    InputDispatcher (filters, coalesces, routes)
//         ↓
//    InputSink (console, bindings, UI)
// ```
//
// Key codes follow the usual convention: printable keys use their
// lowercase ASCII value, other keys live above `SPECIAL_KEY_BASE`, and
// mouse buttons are negative.
//
//=========================================================================

//=== Key Code Conventions ================================================

/// Start of the range used by non-printable keys.
pub const SPECIAL_KEY_BASE: i32 = 1 << 30;

/// Binding code of the wheel rolled away from the user.
pub const WHEEL_UP: i32 = -4;

/// Binding code of the wheel rolled towards the user.
pub const WHEEL_DOWN: i32 = -5;

//=== MouseButton =========================================================

/// Physical mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Middle button (wheel click).
    Middle,

    /// Secondary button (typically right).
    Right,

    /// First side button (back).
    X1,

    /// Second side button (forward).
    X2,

    /// Any other button (macro keys, exotic mice).
    Other,
}

impl MouseButton {
    /// Binding code of the button; `None` for buttons that are not bound.
    pub fn code(self) -> Option<i32> {
        match self {
            Self::Left => Some(-1),
            Self::Middle => Some(-2),
            Self::Right => Some(-3),
            Self::X1 => Some(-6),
            Self::X2 => Some(-7),
            Self::Other => None,
        }
    }
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Punctuation ------------------------------------------------------

    Backquote,
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Backslash,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,

    //--- Whitespace & Editing ---------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,

    //--- Arrow Keys -------------------------------------------------------

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    //--- Function Keys ----------------------------------------------------

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Modifiers --------------------------------------------------------

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    SuperLeft,
    SuperRight,
    CapsLock,

    //--- Misc -------------------------------------------------------------

    PrintScreen,
    Pause,

    /// Fallback for keys not explicitly mapped by the input layer.
    Unidentified,
}

impl KeyCode {
    /// Binding code of the key; `None` for `Unidentified`.
    pub fn code(self) -> Option<i32> {
        use KeyCode::*;
        let ascii = |c: u8| Some(i32::from(c));
        let special = |n: i32| Some(SPECIAL_KEY_BASE + n);

        match self {
            Digit0 => ascii(b'0'),
            Digit1 => ascii(b'1'),
            Digit2 => ascii(b'2'),
            Digit3 => ascii(b'3'),
            Digit4 => ascii(b'4'),
            Digit5 => ascii(b'5'),
            Digit6 => ascii(b'6'),
            Digit7 => ascii(b'7'),
            Digit8 => ascii(b'8'),
            Digit9 => ascii(b'9'),

            KeyA => ascii(b'a'),
            KeyB => ascii(b'b'),
            KeyC => ascii(b'c'),
            KeyD => ascii(b'd'),
            KeyE => ascii(b'e'),
            KeyF => ascii(b'f'),
            KeyG => ascii(b'g'),
            KeyH => ascii(b'h'),
            KeyI => ascii(b'i'),
            KeyJ => ascii(b'j'),
            KeyK => ascii(b'k'),
            KeyL => ascii(b'l'),
            KeyM => ascii(b'm'),
            KeyN => ascii(b'n'),
            KeyO => ascii(b'o'),
            KeyP => ascii(b'p'),
            KeyQ => ascii(b'q'),
            KeyR => ascii(b'r'),
            KeyS => ascii(b's'),
            KeyT => ascii(b't'),
            KeyU => ascii(b'u'),
            KeyV => ascii(b'v'),
            KeyW => ascii(b'w'),
            KeyX => ascii(b'x'),
            KeyY => ascii(b'y'),
            KeyZ => ascii(b'z'),

            Backquote => ascii(b'`'),
            Minus => ascii(b'-'),
            Equal => ascii(b'='),
            BracketLeft => ascii(b'['),
            BracketRight => ascii(b']'),
            Backslash => ascii(b'\\'),
            Semicolon => ascii(b';'),
            Quote => ascii(b'\''),
            Comma => ascii(b','),
            Period => ascii(b'.'),
            Slash => ascii(b'/'),

            Space => ascii(b' '),
            Enter => ascii(b'\r'),
            Escape => ascii(0x1b),
            Tab => ascii(b'\t'),
            Backspace => ascii(0x08),
            Delete => ascii(0x7f),

            CapsLock => special(57),
            F1 => special(58),
            F2 => special(59),
            F3 => special(60),
            F4 => special(61),
            F5 => special(62),
            F6 => special(63),
            F7 => special(64),
            F8 => special(65),
            F9 => special(66),
            F10 => special(67),
            F11 => special(68),
            F12 => special(69),
            PrintScreen => special(70),
            Pause => special(72),
            Insert => special(73),
            Home => special(74),
            PageUp => special(75),
            End => special(77),
            PageDown => special(78),
            ArrowRight => special(79),
            ArrowLeft => special(80),
            ArrowDown => special(81),
            ArrowUp => special(82),
            ControlLeft => special(224),
            ShiftLeft => special(225),
            AltLeft => special(226),
            SuperLeft => special(227),
            ControlRight => special(228),
            ShiftRight => special(229),
            AltRight => special(230),
            SuperRight => special(231),

            Unidentified => None,
        }
    }
}

//=== WindowEvent =========================================================

/// Window state changes relevant to the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Close,
    FocusGained,
    FocusLost,
    /// Cursor entered the window.
    Enter,
    /// Cursor left the window.
    Leave,
    Minimized,
    Restored,
    /// New inner size in pixels.
    Resized(i32, i32),
}

//=== InputEvent ==========================================================

/// Low-level event from the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Key pressed or released. `repeat` marks OS auto-repeat.
    Key {
        key: KeyCode,
        pressed: bool,
        repeat: bool,
    },

    MouseButton {
        button: MouseButton,
        pressed: bool,
    },

    /// Relative motion plus the cursor position it ended at.
    MouseMotion { dx: i32, dy: i32, x: i32, y: i32 },

    /// Vertical wheel steps, positive away from the user.
    MouseWheel { dy: i32 },

    /// Committed text, stamped with the pump time in milliseconds.
    TextInput { text: String, timestamp: u32 },

    Window(WindowEvent),

    /// Application asked to terminate.
    Quit,
}

impl InputEvent {
    pub fn is_motion(&self) -> bool {
        matches!(self, Self::MouseMotion { .. })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
