//=========================================================================
// Display
//=========================================================================
//
// Window and render context management.
//
// The host never talks to the windowing system directly. It drives a
// `Display` (window, cursor, brightness) and a `RenderContext` (GL
// context, swap interval) and keeps the derived sizes in `Screen`:
//
// ```text
//   screenw/screenh vars ──> resolve_resolution ──> window request
//                                                        │
//   window size ──> screen_w/h ──┬─> render_w/h (min with requested)
//                                └─> hud_w/h
// ```
//
// `screenw`/`screenh` hold the *requested* windowed size (or -1 for
// automatic); `Screen::screen_w/h` hold what the window actually is.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::init_state::{ChangeKind, InitPhase, InitState};
use super::render::{NativeSurface, RenderContext};
use crate::config::{EngineVars, Var};

//=== Constants ===========================================================

pub const SCR_MINW: i32 = 320;
pub const SCR_MINH: i32 = 200;
pub const SCR_MAXW: i32 = 10000;
pub const SCR_MAXH: i32 = 10000;

/// Window height used when none was requested.
pub const SCR_DEFAULTH: i32 = 768;

pub const WINDOW_TITLE: &str = "Strafe";

//=== DisplayError ========================================================

/// Window, cursor and context failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// Operation needs a window and none exists.
    NoWindow,

    /// Desktop bounds could not be queried.
    DesktopQuery(String),

    /// The OS refused to create the window.
    WindowCreation(String),

    /// No GL version in the fallback list produced a context.
    ContextCreation,

    /// The backend has no way to perform the operation.
    Unsupported(&'static str),
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no window"),
            Self::DesktopQuery(e) => write!(f, "failed querying desktop bounds: {}", e),
            Self::WindowCreation(e) => write!(f, "failed to create OpenGL window: {}", e),
            Self::ContextCreation => write!(f, "failed to create OpenGL context"),
            Self::Unsupported(what) => write!(f, "{} is not supported by this backend", what),
        }
    }
}

impl std::error::Error for DisplayError {}

//=== Display Trait =======================================================

/// Parameters for a new window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: &'static str,
    pub width: i32,
    pub height: i32,
    /// Borderless fullscreen at desktop size.
    pub fullscreen: bool,
    pub min_size: (i32, i32),
    pub max_size: (i32, i32),
}

/// Windowing system operations used by the host.
pub trait Display {
    /// Size of the primary monitor.
    fn desktop_size(&mut self) -> Result<(i32, i32), DisplayError>;

    fn create_window(&mut self, spec: &WindowSpec) -> Result<(), DisplayError>;
    fn destroy_window(&mut self);
    fn has_window(&self) -> bool;

    /// Native handles of the window for context creation, `None`
    /// without a window.
    fn surface(&self) -> Option<&dyn NativeSurface>;

    /// Current inner size, `None` without a window.
    fn window_size(&self) -> Option<(i32, i32)>;

    fn is_fullscreen(&self) -> bool;
    fn set_fullscreen(&mut self, on: bool);
    fn set_window_size(&mut self, w: i32, h: i32);
    fn center_window(&mut self);

    /// Sets display brightness, 1.0 being neutral.
    fn set_brightness(&mut self, brightness: f32) -> Result<(), DisplayError>;

    fn set_cursor_visible(&mut self, visible: bool);

    /// Enters or leaves relative (locked, hidden) mouse mode.
    fn set_relative_mouse(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Confines the cursor to the window.
    fn set_window_grab(&mut self, on: bool);

    fn warp_cursor(&mut self, x: i32, y: i32);

    /// Starts or stops IME/text input delivery.
    fn set_text_input(&mut self, on: bool);
}

//=== GL Versions =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlProfile {
    Compatibility,
    /// Neither profile requested (3.1).
    Unspecified,
    Core,
}

/// A GL context version, e.g. `GlVersion::new(3, 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlVersion {
    pub major: u8,
    pub minor: u8,
}

impl GlVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Two-digit form (`33` for 3.3).
    pub fn code(self) -> u32 {
        u32::from(self.major) * 10 + u32::from(self.minor)
    }

    pub fn profile(self) -> GlProfile {
        match self.code() {
            c if c <= 30 => GlProfile::Compatibility,
            c if c >= 32 => GlProfile::Core,
            _ => GlProfile::Unspecified,
        }
    }
}

impl std::fmt::Display for GlVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Context versions tried in order, newest first.
#[cfg(target_os = "macos")]
pub const GL_VERSIONS: &[GlVersion] = &[GlVersion::new(3, 2), GlVersion::new(2, 0)];

#[cfg(not(target_os = "macos"))]
pub const GL_VERSIONS: &[GlVersion] = &[
    GlVersion::new(4, 0),
    GlVersion::new(3, 3),
    GlVersion::new(3, 2),
    GlVersion::new(3, 1),
    GlVersion::new(3, 0),
    GlVersion::new(2, 0),
];

/// Creates the first context the renderer accepts on `surface`.
pub fn negotiate_context(
    render: &mut dyn RenderContext,
    surface: &dyn NativeSurface,
    versions: &[GlVersion],
) -> Result<GlVersion, DisplayError> {
    for &version in versions {
        if render.create_context(surface, version) {
            info!(target: "display", "GL {} context created ({:?})", version, version.profile());
            return Ok(version);
        }
        debug!(target: "display", "GL {} context unavailable", version);
    }
    Err(DisplayError::ContextCreation)
}

//=== Resolution ==========================================================

/// Resolves the requested windowed size against the desktop.
///
/// Height defaults to 768; width defaults to the desktop aspect ratio at
/// that height. Neither may exceed the desktop.
pub fn resolve_resolution(screen_w: i32, screen_h: i32, desktop: (i32, i32)) -> (i32, i32) {
    let (desk_w, desk_h) = desktop;
    let h = if screen_h < 0 { SCR_DEFAULTH } else { screen_h };
    let w = if screen_w < 0 { h * desk_w / desk_h.max(1) } else { screen_w };
    (w.min(desk_w), h.min(desk_h))
}

//=== Screen ==============================================================

/// Derived window sizes and display state.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub screen_w: i32,
    pub screen_h: i32,
    pub render_w: i32,
    pub render_h: i32,
    pub hud_w: i32,
    pub hud_h: i32,
    pub minimized: bool,

    /// Last swap interval applied, -1 before any.
    pub cur_vsync: i32,

    /// Gamma currently applied (percent).
    cur_gamma: i32,

    /// Window started fullscreen and must be centred when leaving it.
    init_window_pos: bool,

    gl_version: Option<GlVersion>,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            screen_w: 0,
            screen_h: 0,
            render_w: 0,
            render_h: 0,
            hud_w: 0,
            hud_h: 0,
            minimized: false,
            cur_vsync: -1,
            cur_gamma: 100,
            init_window_pos: false,
            gl_version: None,
        }
    }

    pub fn gl_version(&self) -> Option<GlVersion> {
        self.gl_version
    }

    pub fn cur_gamma(&self) -> i32 {
        self.cur_gamma
    }

    //--- Setup ------------------------------------------------------------

    /// Builds (or rebuilds) the window and render context.
    ///
    /// Any existing window and context are destroyed first. Failure is
    /// fatal to the caller.
    pub fn setup(
        &mut self,
        display: &mut dyn Display,
        render: &mut dyn RenderContext,
        vars: &mut EngineVars,
    ) -> Result<(), DisplayError> {
        if render.has_context() {
            render.destroy_context();
        }
        if display.has_window() {
            display.destroy_window();
        }
        self.cur_vsync = -1;
        self.gl_version = None;

        let desktop = display.desktop_size()?;
        vars.force(Var::DesktopW, desktop.0);
        vars.force(Var::DesktopH, desktop.1);

        let (w, h) = resolve_resolution(vars.get(Var::ScreenW), vars.get(Var::ScreenH), desktop);
        vars.force(Var::ScreenW, w);
        vars.force(Var::ScreenH, h);

        let fullscreen = vars.flag(Var::Fullscreen);
        let (win_w, win_h) = if fullscreen {
            self.init_window_pos = true;
            desktop
        } else {
            (w, h)
        };

        display.create_window(&WindowSpec {
            title: WINDOW_TITLE,
            width: win_w,
            height: win_h,
            fullscreen,
            min_size: (SCR_MINW, SCR_MINH),
            max_size: (SCR_MAXW, SCR_MAXH),
        })?;

        let surface = display.surface().ok_or(DisplayError::NoWindow)?;
        self.gl_version = Some(negotiate_context(render, surface, GL_VERSIONS)?);

        let (sw, sh) = display.window_size().ok_or(DisplayError::NoWindow)?;
        self.screen_w = sw;
        self.screen_h = sh;
        self.render_w = w.min(sw);
        self.render_h = h.min(sh);
        self.hud_w = sw;
        self.hud_h = sh;

        info!(
            target: "display",
            "Screen {}x{} (render {}x{}, desktop {}x{}){}",
            sw, sh, self.render_w, self.render_h, desktop.0, desktop.1,
            if fullscreen { " fullscreen" } else { "" }
        );
        Ok(())
    }

    //--- Runtime Changes --------------------------------------------------

    /// Handles the `screenres W H` command.
    pub fn screen_res(
        &mut self,
        w: i32,
        h: i32,
        display: &mut dyn Display,
        render: &mut dyn RenderContext,
        vars: &mut EngineVars,
        init: &mut InitState,
    ) {
        let mut w = w.clamp(SCR_MINW, SCR_MAXW);
        let mut h = h.clamp(SCR_MINH, SCR_MAXH);

        if display.has_window() {
            w = w.min(vars.get(Var::DesktopW));
            h = h.min(vars.get(Var::DesktopH));
            vars.force(Var::ScreenW, w);
            vars.force(Var::ScreenH, h);
            if display.is_fullscreen() {
                self.resize_render(w, h, render);
            } else {
                display.set_window_size(w, h);
            }
        } else {
            vars.force(Var::ScreenW, w);
            vars.force(Var::ScreenH, h);
            init.add_change("screen resolution", ChangeKind::GFX);
        }
    }

    /// Toggles borderless fullscreen.
    pub fn set_fullscreen(&mut self, on: bool, display: &mut dyn Display, vars: &EngineVars) {
        if !display.has_window() {
            return;
        }
        display.set_fullscreen(on);
        if !on {
            display.set_window_size(vars.get(Var::ScreenW), vars.get(Var::ScreenH));
            if self.init_window_pos {
                display.center_window();
                self.init_window_pos = false;
            }
        }
    }

    /// Window was resized by the user or the OS.
    pub fn on_resized(
        &mut self,
        w: i32,
        h: i32,
        display: &dyn Display,
        render: &mut dyn RenderContext,
        vars: &mut EngineVars,
    ) {
        self.screen_w = w;
        self.screen_h = h;
        if !display.is_fullscreen() {
            vars.force(Var::ScreenW, w.clamp(SCR_MINW, SCR_MAXW));
            vars.force(Var::ScreenH, h.clamp(SCR_MINH, SCR_MAXH));
        }
        self.resize_render(vars.get(Var::ScreenW), vars.get(Var::ScreenH), render);
    }

    fn resize_render(&mut self, w: i32, h: i32, render: &mut dyn RenderContext) {
        self.render_w = w.min(self.screen_w);
        self.render_h = h.min(self.screen_h);
        self.hud_w = self.screen_w;
        self.hud_h = self.screen_h;
        render.resize(self.render_w, self.render_h, self.hud_w, self.hud_h);
    }

    //--- Gamma ------------------------------------------------------------

    /// Applies a new `gamma` value; ignored during startup or if unchanged.
    pub fn set_gamma(&mut self, gamma: i32, display: &mut dyn Display, init: &InitState) {
        if init.is_initing() || gamma == self.cur_gamma {
            return;
        }
        self.cur_gamma = gamma;
        self.apply_gamma(display);
    }

    /// Re-applies a non-default gamma after the window was rebuilt.
    pub fn restore_gamma(&mut self, display: &mut dyn Display, init: &InitState) {
        if init.is_initing() || self.cur_gamma == 100 {
            return;
        }
        self.apply_gamma(display);
    }

    /// Startup: picks up the configured gamma once the window exists.
    pub fn init_gamma(&mut self, gamma: i32, display: &mut dyn Display) {
        self.cur_gamma = gamma;
        if gamma != 100 {
            self.apply_gamma(display);
        }
    }

    /// Resets brightness on exit if it was changed.
    pub fn clear_gamma(&self, display: &mut dyn Display) {
        if self.cur_gamma != 100 && display.has_window() {
            if let Err(e) = display.set_brightness(1.0) {
                warn!(target: "display", "Could not reset gamma: {}", e);
            }
        }
    }

    fn apply_gamma(&self, display: &mut dyn Display) {
        if !display.has_window() {
            return;
        }
        if let Err(e) = display.set_brightness(self.cur_gamma as f32 / 100.0) {
            error!(target: "display", "Could not set gamma: {}", e);
        }
    }

    //--- Vsync ------------------------------------------------------------

    /// Applies `vsync`/`vsynctear` to the swap interval.
    pub fn restore_vsync(&mut self, render: &mut dyn RenderContext, vars: &EngineVars, init: &InitState) {
        if init.is_initing() || !render.has_context() {
            return;
        }
        let vsync = vars.get(Var::Vsync);
        let interval = match (vsync != 0, vars.flag(Var::VsyncTear)) {
            (false, _) => 0,
            (true, true) => -1,
            (true, false) => 1,
        };
        if render.set_swap_interval(interval) {
            self.cur_vsync = vsync;
        } else {
            debug!(target: "display", "Swap interval {} rejected", interval);
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// Level past which a resolution change needs a restart of the window.
pub const RESOLUTION_CHANGE_LEVEL: InitPhase = InitPhase::Reset;

//=========================================================================
// Unit Tests
//=========================================================================
