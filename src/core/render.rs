//=========================================================================
// Render Context
//=========================================================================
//
// The renderer is an external collaborator. The host only needs it to
// own a GL context, present frames, and draw flat HUD quads and text for
// the loading screens.
//
// Context creation receives the window as a `NativeSurface` (raw window
// and display handles). The renderer builds its GL surface there and
// keeps it for swaps and resizes until `destroy_context`.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};

//=== Internal Dependencies ===============================================

use super::display::GlVersion;

//=== HUD Items ===========================================================

/// Textures the loading screens draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HudTexture {
    Background,
    Shadow,
    Logo(LogoSize),
    LoadingFrame,
    LoadingBar,
    MapShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoSize {
    Small,
    Medium,
    Large,
}

impl HudTexture {
    /// Interface texture file; `None` for the map shot, which the game
    /// supplies per map.
    pub fn path(self) -> Option<&'static str> {
        let path = match self {
            Self::Background => "media/interface/background.png",
            Self::Shadow => "media/interface/shadow.png",
            Self::Logo(LogoSize::Small) => "media/interface/logo_512.png",
            Self::Logo(LogoSize::Medium) => "media/interface/logo_1024.png",
            Self::Logo(LogoSize::Large) => "media/interface/logo_1500.png",
            Self::LoadingFrame => "media/interface/loading_frame.png",
            Self::LoadingBar => "media/interface/loading_bar.png",
            Self::MapShot => return None,
        };
        Some(path)
    }
}

/// Screen-space rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const UNIT: Rect = Rect { x: 0.0, y: 0.0, w: 1.0, h: 1.0 };

    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// One draw call of a HUD view.
#[derive(Debug, Clone, PartialEq)]
pub enum HudItem {
    Quad {
        texture: HudTexture,
        rect: Rect,
        uv: Rect,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        scale: f32,
        /// Wrap width in unscaled font units.
        wrap: Option<f32>,
    },
}

//=== NativeSurface =======================================================

/// A native window a GL context can be created on.
pub trait NativeSurface: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> NativeSurface for T {}

//=== RenderContext =======================================================

/// Renderer operations used by the host loop.
pub trait RenderContext {
    //--- Context ----------------------------------------------------------

    /// Tries to create a context of this version on `surface`; false if
    /// unavailable.
    fn create_context(&mut self, surface: &dyn NativeSurface, version: GlVersion) -> bool;
    fn destroy_context(&mut self);
    fn has_context(&self) -> bool;

    /// Sets the swap interval (-1 adaptive, 0 off, 1 vsync).
    fn set_swap_interval(&mut self, interval: i32) -> bool;

    //--- Lifecycle --------------------------------------------------------

    /// Initialises GL state and loads the core textures.
    fn init(&mut self) -> Result<(), String>;

    /// Frees all GL resources before the context is rebuilt.
    fn cleanup(&mut self);

    /// Reloads core textures and fonts after a rebuild.
    fn reload(&mut self) -> bool;

    fn resize(&mut self, render_w: i32, render_h: i32, hud_w: i32, hud_h: i32);

    //--- Frames -----------------------------------------------------------

    fn setup_frame(&mut self, in_world: bool);
    fn draw_frame(&mut self);
    fn swap_buffers(&mut self, overlay: bool);

    /// Draws a flat view of `size` (ortho projection).
    fn draw_hud(&mut self, size: (i32, i32), items: &[HudItem]);

    //--- Metrics ----------------------------------------------------------

    /// Largest texture the HUD may use.
    fn max_texture_size(&self) -> i32;

    fn font_height(&self) -> f32;
    fn text_width(&self, text: &str) -> f32;

    /// Width and height of `text` wrapped at `max_width`.
    fn text_bounds(&self, text: &str, max_width: f32) -> (f32, f32);
}

//=== NullRenderer ========================================================

/// Renderer that accepts every call and draws nothing.
///
/// Lets the host run (window, input, pacing) without a GL backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    context: Option<GlVersion>,
    frames: u64,
}

impl NullRenderer {
    const FONT_HEIGHT: f32 = 64.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderContext for NullRenderer {
    fn create_context(&mut self, surface: &dyn NativeSurface, version: GlVersion) -> bool {
        if let Err(e) = surface.window_handle() {
            debug!(target: "render", "No window handle: {}", e);
            return false;
        }
        self.context = Some(version);
        true
    }

    fn destroy_context(&mut self) {
        self.context = None;
    }

    fn has_context(&self) -> bool {
        self.context.is_some()
    }

    fn set_swap_interval(&mut self, _interval: i32) -> bool {
        self.context.is_some()
    }

    fn init(&mut self) -> Result<(), String> {
        debug!(target: "render", "Null renderer initialised");
        Ok(())
    }

    fn cleanup(&mut self) {}

    fn reload(&mut self) -> bool {
        true
    }

    fn resize(&mut self, _render_w: i32, _render_h: i32, _hud_w: i32, _hud_h: i32) {}

    fn setup_frame(&mut self, _in_world: bool) {}

    fn draw_frame(&mut self) {}

    fn swap_buffers(&mut self, _overlay: bool) {
        self.frames += 1;
    }

    fn draw_hud(&mut self, _size: (i32, i32), _items: &[HudItem]) {}

    fn max_texture_size(&self) -> i32 {
        4096
    }

    fn font_height(&self) -> f32 {
        Self::FONT_HEIGHT
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * Self::FONT_HEIGHT / 2.0
    }

    fn text_bounds(&self, text: &str, max_width: f32) -> (f32, f32) {
        let width = self.text_width(text);
        if max_width <= 0.0 || width <= max_width {
            return (width, Self::FONT_HEIGHT);
        }
        let lines = (width / max_width).ceil();
        (max_width, lines * Self::FONT_HEIGHT)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
