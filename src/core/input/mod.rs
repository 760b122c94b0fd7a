//=========================================================================
// Input System
//
// Routes platform events to the game once per frame.
//
// Responsibilities:
// - Pull new events from the platform (`EventSource`)
// - Filter the motion generated by our own cursor warps
// - Coalesce mouse motion, drop unwanted key repeats, gate text input
// - Hand keys, text and motion to the collaborator (`InputSink`)
// - Track cursor capture (`InputGrab`)
//
// Notes:
// The sink is the console/binding/UI layer, which lives outside the
// host. It sees integer key codes only (see `event::KeyCode::code`).
//
//=========================================================================

//=== Submodules ==========================================================

pub mod dispatcher;
pub mod event;
pub mod grab;

//=== Public API ==========================================================

pub use dispatcher::{InputDispatcher, InputFrame};
pub use event::{InputEvent, KeyCode, MouseButton, WindowEvent};
pub use grab::InputGrab;

//=== Internal Dependencies ===============================================

use crate::core::display::Display;

//=== InputSink ===========================================================
//
// Receiver of dispatched input: console, key bindings and menus.
//
pub trait InputSink {
    /// Key or mouse button (negative code) pressed or released.
    fn process_key(&mut self, code: i32, pressed: bool);

    /// Committed text while text input is enabled.
    fn process_text_input(&mut self, text: &str);

    /// Offers motion to the UI cursor; `true` if it was consumed.
    fn ui_move_cursor(&mut self, dx: i32, dy: i32) -> bool;

    /// Steers the camera.
    fn mouse_move(&mut self, dx: i32, dy: i32);
}

//=== EventSource =========================================================
//
// Platform event pump. Must not block.
//
pub trait EventSource {
    /// Appends every event the platform has ready, in arrival order.
    ///
    /// `now` is the host clock in milliseconds, used to stamp text input.
    fn pump_events(&mut self, now: u32, out: &mut Vec<InputEvent>);
}

//=== Backend =============================================================
//
// A windowing backend: one object that both pumps events and owns the
// window they come from.
//
pub trait Backend: EventSource + Display {}

impl<T: EventSource + Display> Backend for T {}
