//=========================================================================
// Platform Subsystem
//
// Winit window and event pump behind the engine's `Display` and
// `EventSource` seams.
//
// Architecture:
// ```text
//  Engine thread (also the main thread):
//  ┌─────────────────────────────────────────────┐
//  │  Engine::frame                              │
//  │   ↓ pump_events(now)                        │
//  │  WinitBackend                               │
//  │   ├─ pump_app_events(timeout = 0)           │
//  │   │    ↓                                    │
//  │   │  BackendState (ApplicationHandler)      │
//  │   │   ├─ serves window/monitor requests     │
//  │   │   └─ InputProcessor → pending events    │
//  │   └─ pending events → engine                │
//  └─────────────────────────────────────────────┘
// ```
//
// Winit only hands out an `ActiveEventLoop` inside its callbacks, so
// window creation and the desktop query are posted as a request and
// served during a zero-timeout pump. Events that arrive during such a
// pump are kept and delivered with the next `pump_events`.
//
// Responsibilities:
// - Create and manage the OS window
// - Query the desktop size
// - Cursor visibility, capture and warping
// - Convert Winit events into engine InputEvents
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;

//=== Standard Library Imports ============================================

use std::time::Duration;

//=== External Crates =====================================================

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, DeviceId, WindowEvent as WinitWindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{CursorGrabMode, Fullscreen, Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::display::{Display, DisplayError, WindowSpec};
use crate::core::input::{EventSource, InputEvent};
use crate::core::render::NativeSurface;
use input_processor::InputProcessor;

//=== PlatformError =======================================================

/// Platform initialization errors.
///
/// Fatal: without an event loop the client cannot run.
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to create event loop (no display server, or already
    /// created once in this process).
    EventLoopCreation(winit::error::EventLoopError),
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EventLoopCreation(e) => Some(e),
        }
    }
}

//=== Loop Requests =======================================================

/// Work that needs an `ActiveEventLoop`.
enum LoopRequest {
    DesktopSize,
    CreateWindow(WindowAttributes),
}

enum LoopReply {
    DesktopSize(Option<(i32, i32)>),
    Window(Result<Window, String>),
}

//=== BackendState ========================================================

/// Everything the Winit callbacks touch.
struct BackendState {
    window: Option<Window>,
    request: Option<LoopRequest>,
    reply: Option<LoopReply>,
    processor: InputProcessor,
    /// Converted events not yet handed to the engine.
    events: Vec<InputEvent>,
    /// Host time of the current pump, stamped on text input.
    now: u32,
}

impl BackendState {
    fn new() -> Self {
        Self {
            window: None,
            request: None,
            reply: None,
            processor: InputProcessor::new(),
            events: Vec::new(),
            now: 0,
        }
    }

    fn serve(&mut self, event_loop: &ActiveEventLoop) {
        let Some(request) = self.request.take() else {
            return;
        };
        let reply = match request {
            LoopRequest::DesktopSize => {
                let monitor = event_loop
                    .primary_monitor()
                    .or_else(|| event_loop.available_monitors().next());
                LoopReply::DesktopSize(monitor.map(|m| {
                    let size = m.size();
                    (size.width as i32, size.height as i32)
                }))
            }
            LoopRequest::CreateWindow(attrs) => {
                LoopReply::Window(event_loop.create_window(attrs).map_err(|e| e.to_string()))
            }
        };
        self.reply = Some(reply);
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for BackendState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.serve(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WinitWindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            trace!(target: "platform", "Event for stale window {:?} dropped", window_id);
            return;
        }
        if let WinitWindowEvent::CloseRequested = event {
            info!(target: "platform", "Window close requested");
        }
        self.processor.process_window_event(&event, self.now, &mut self.events);
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        self.processor.process_device_event(&event, &mut self.events);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.serve(event_loop);
    }
}

//=== WinitBackend ========================================================

/// Window manager and input source for the engine.
///
/// Must be created and used on the main thread (a Winit requirement on
/// macOS/iOS); the engine runs there too.
pub struct WinitBackend {
    event_loop: EventLoop<()>,
    state: BackendState,
    exited: bool,
}

impl WinitBackend {
    //--- Construction -----------------------------------------------------

    /// Creates the event loop; no window exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::EventLoopCreation`] when no display
    /// server is reachable.
    pub fn new() -> Result<Self, PlatformError> {
        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        info!(target: "platform", "Platform subsystem initialized");
        Ok(Self { event_loop, state: BackendState::new(), exited: false })
    }

    //--- Internal Helpers -------------------------------------------------

    /// Runs one zero-timeout iteration of the Winit loop.
    fn pump(&mut self) {
        if self.exited {
            return;
        }
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
            warn!(target: "platform", "Event loop exited ({})", code);
            self.exited = true;
            self.state.events.push(InputEvent::Quit);
        }
    }

    /// Posts a request and pumps until it is served.
    fn request(&mut self, request: LoopRequest) -> Option<LoopReply> {
        self.state.request = Some(request);
        self.state.reply = None;
        // the first pump may only deliver the initial resume
        for _ in 0..2 {
            self.pump();
            if let Some(reply) = self.state.reply.take() {
                return Some(reply);
            }
        }
        self.state.request = None;
        None
    }

    fn window(&self) -> Result<&Window, DisplayError> {
        self.state.window.as_ref().ok_or(DisplayError::NoWindow)
    }
}

//--- Event Pump ----------------------------------------------------------

impl EventSource for WinitBackend {
    fn pump_events(&mut self, now: u32, out: &mut Vec<InputEvent>) {
        self.state.now = now;
        self.pump();
        out.append(&mut self.state.events);
    }
}

//--- Window Management ----------------------------------------------------

impl Display for WinitBackend {
    fn desktop_size(&mut self) -> Result<(i32, i32), DisplayError> {
        match self.request(LoopRequest::DesktopSize) {
            Some(LoopReply::DesktopSize(Some(size))) => Ok(size),
            Some(_) => Err(DisplayError::DesktopQuery("no monitor found".into())),
            None => Err(DisplayError::DesktopQuery("event loop not running".into())),
        }
    }

    fn create_window(&mut self, spec: &WindowSpec) -> Result<(), DisplayError> {
        let attrs = Window::default_attributes()
            .with_title(spec.title)
            .with_inner_size(PhysicalSize::new(spec.width as u32, spec.height as u32))
            .with_min_inner_size(PhysicalSize::new(spec.min_size.0 as u32, spec.min_size.1 as u32))
            .with_max_inner_size(PhysicalSize::new(spec.max_size.0 as u32, spec.max_size.1 as u32))
            .with_resizable(true)
            .with_fullscreen(spec.fullscreen.then_some(Fullscreen::Borderless(None)));

        match self.request(LoopRequest::CreateWindow(attrs)) {
            Some(LoopReply::Window(Ok(window))) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.state.window = Some(window);
                Ok(())
            }
            Some(LoopReply::Window(Err(e))) => Err(DisplayError::WindowCreation(e)),
            _ => Err(DisplayError::WindowCreation("event loop not running".into())),
        }
    }

    fn destroy_window(&mut self) {
        if self.state.window.take().is_some() {
            debug!(target: "platform", "Window destroyed");
        }
    }

    fn has_window(&self) -> bool {
        self.state.window.is_some()
    }

    fn surface(&self) -> Option<&dyn NativeSurface> {
        self.state.window.as_ref().map(|w| w as &dyn NativeSurface)
    }

    fn window_size(&self) -> Option<(i32, i32)> {
        self.state.window.as_ref().map(|w| {
            let size = w.inner_size();
            (size.width as i32, size.height as i32)
        })
    }

    fn is_fullscreen(&self) -> bool {
        self.state.window.as_ref().is_some_and(|w| w.fullscreen().is_some())
    }

    fn set_fullscreen(&mut self, on: bool) {
        if let Ok(window) = self.window() {
            window.set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
        }
    }

    fn set_window_size(&mut self, w: i32, h: i32) {
        if let Ok(window) = self.window() {
            // the new size arrives later as a Resized event
            let _ = window.request_inner_size(PhysicalSize::new(w as u32, h as u32));
        }
    }

    fn center_window(&mut self) {
        let Ok(window) = self.window() else {
            return;
        };
        let Some(monitor) = window.current_monitor() else {
            return;
        };
        let origin = monitor.position();
        let area = monitor.size();
        let size = window.outer_size();
        let x = origin.x + (area.width as i32 - size.width as i32) / 2;
        let y = origin.y + (area.height as i32 - size.height as i32) / 2;
        window.set_outer_position(PhysicalPosition::new(x, y));
    }

    fn set_brightness(&mut self, _brightness: f32) -> Result<(), DisplayError> {
        Err(DisplayError::Unsupported("gamma"))
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        if let Ok(window) = self.window() {
            window.set_cursor_visible(visible);
        }
    }

    fn set_relative_mouse(&mut self, on: bool) -> Result<(), DisplayError> {
        let window = self.window()?;
        if on {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
                .map_err(|e| {
                    debug!(target: "platform::input", "Cursor grab refused: {}", e);
                    DisplayError::Unsupported("relative mouse")
                })?;
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
        }
        self.state.processor.set_relative(on);
        Ok(())
    }

    fn set_window_grab(&mut self, on: bool) {
        // relative mode already holds the cursor
        if self.state.processor.is_relative() {
            return;
        }
        if let Ok(window) = self.window() {
            let mode = if on { CursorGrabMode::Confined } else { CursorGrabMode::None };
            if let Err(e) = window.set_cursor_grab(mode) {
                debug!(target: "platform::input", "Window grab unavailable: {}", e);
            }
        }
    }

    fn warp_cursor(&mut self, x: i32, y: i32) {
        let Ok(window) = self.window() else {
            return;
        };
        match window.set_cursor_position(PhysicalPosition::new(x, y)) {
            Ok(()) => self.state.processor.warped(x, y),
            Err(e) => trace!(target: "platform::input", "Cursor warp failed: {}", e),
        }
    }

    fn set_text_input(&mut self, on: bool) {
        if let Ok(window) = self.window() {
            window.set_ime_allowed(on);
        }
        self.state.processor.set_text_input(on);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
