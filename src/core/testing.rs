//=========================================================================
// Test Doubles
//=========================================================================
//
// Recording fakes for the host's collaborators. Each one stores what it
// was asked to do in public fields so tests can assert on them directly.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

//=== External Dependencies ===============================================

use winit::raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
    WebDisplayHandle, WebWindowHandle, WindowHandle,
};

//=== Internal Dependencies ===============================================

use super::clock::GameClock;
use super::display::{Display, DisplayError, GlVersion, WindowSpec};
use super::game::Game;
use super::init_state::InitPhase;
use super::input::{EventSource, InputEvent, InputSink};
use super::progress::{LoadingHooks, LoadingView};
use super::render::{HudItem, NativeSurface, RenderContext};
use crate::config::{DedicatedMode, SoundConfig};

//=== FakeSurface =========================================================

/// Window handle without a native window behind it; `id` tells windows
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FakeSurface {
    pub id: u32,
}

impl FakeSurface {
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    /// Id of the fake window behind `surface`, if it is one.
    pub fn id_of(surface: &dyn NativeSurface) -> Option<u32> {
        match surface.window_handle().map(|h| h.as_raw()) {
            Ok(RawWindowHandle::Web(web)) => Some(web.id),
            _ => None,
        }
    }
}

impl HasWindowHandle for FakeSurface {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        let raw = RawWindowHandle::Web(WebWindowHandle::new(self.id));
        // SAFETY: web handles are plain ids and point at nothing
        Ok(unsafe { WindowHandle::borrow_raw(raw) })
    }
}

impl HasDisplayHandle for FakeSurface {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        let raw = RawDisplayHandle::Web(WebDisplayHandle::new());
        // SAFETY: as above
        Ok(unsafe { DisplayHandle::borrow_raw(raw) })
    }
}

//=== FakeDisplay =========================================================

/// Window and event pump in one, like a real backend.
#[derive(Debug)]
pub(crate) struct FakeDisplay {
    pub desktop: (i32, i32),
    pub desktop_fails: bool,
    pub window: Option<WindowSpec>,
    pub windows_created: u32,
    /// Handles of the current window, numbered by creation.
    surface: Option<FakeSurface>,
    /// Windows come up without native handles.
    pub surfaceless: bool,
    pub centered: u32,
    pub brightness: Vec<f32>,
    pub cursor_visible: bool,
    pub relative: bool,
    pub relative_fails: bool,
    pub window_grabbed: bool,
    pub warps: Vec<(i32, i32)>,
    pub text_input: bool,
    /// Event batches, one delivered per pump.
    batches: VecDeque<Vec<InputEvent>>,
    pub pumps: u32,
}

impl FakeDisplay {
    pub fn new(desktop: (i32, i32)) -> Self {
        Self {
            desktop,
            desktop_fails: false,
            window: None,
            windows_created: 0,
            surface: None,
            surfaceless: false,
            centered: 0,
            brightness: Vec::new(),
            cursor_visible: true,
            relative: false,
            relative_fails: false,
            window_grabbed: false,
            warps: Vec::new(),
            text_input: false,
            batches: VecDeque::new(),
            pumps: 0,
        }
    }

    /// Queues a batch for a later pump; empty pumps once exhausted.
    pub fn push(&mut self, batch: Vec<InputEvent>) {
        self.batches.push_back(batch);
    }
}

impl EventSource for FakeDisplay {
    fn pump_events(&mut self, _now: u32, out: &mut Vec<InputEvent>) {
        self.pumps += 1;
        if let Some(batch) = self.batches.pop_front() {
            out.extend(batch);
        }
    }
}

impl Display for FakeDisplay {
    fn desktop_size(&mut self) -> Result<(i32, i32), DisplayError> {
        if self.desktop_fails {
            return Err(DisplayError::DesktopQuery("no monitor".into()));
        }
        Ok(self.desktop)
    }

    fn create_window(&mut self, spec: &WindowSpec) -> Result<(), DisplayError> {
        self.window = Some(spec.clone());
        self.windows_created += 1;
        if !self.surfaceless {
            self.surface = Some(FakeSurface::new(self.windows_created));
        }
        Ok(())
    }

    fn destroy_window(&mut self) {
        self.window = None;
        self.surface = None;
    }

    fn surface(&self) -> Option<&dyn NativeSurface> {
        self.surface.as_ref().map(|s| s as &dyn NativeSurface)
    }

    fn has_window(&self) -> bool {
        self.window.is_some()
    }

    fn window_size(&self) -> Option<(i32, i32)> {
        self.window.as_ref().map(|w| (w.width, w.height))
    }

    fn is_fullscreen(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.fullscreen)
    }

    fn set_fullscreen(&mut self, on: bool) {
        let desktop = self.desktop;
        if let Some(window) = self.window.as_mut() {
            window.fullscreen = on;
            if on {
                window.width = desktop.0;
                window.height = desktop.1;
            }
        }
    }

    fn set_window_size(&mut self, w: i32, h: i32) {
        if let Some(window) = self.window.as_mut() {
            window.width = w;
            window.height = h;
        }
    }

    fn center_window(&mut self) {
        self.centered += 1;
    }

    fn set_brightness(&mut self, brightness: f32) -> Result<(), DisplayError> {
        self.brightness.push(brightness);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn set_relative_mouse(&mut self, on: bool) -> Result<(), DisplayError> {
        if on && self.relative_fails {
            return Err(DisplayError::Unsupported("relative mouse"));
        }
        self.relative = on;
        Ok(())
    }

    fn set_window_grab(&mut self, on: bool) {
        self.window_grabbed = on;
    }

    fn warp_cursor(&mut self, x: i32, y: i32) {
        self.warps.push((x, y));
    }

    fn set_text_input(&mut self, on: bool) {
        self.text_input = on;
    }
}

//=== FakeRenderer ========================================================

#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    /// `None` accepts every version.
    pub accepts: Option<Vec<GlVersion>>,
    pub context: Option<GlVersion>,
    pub context_attempts: u32,
    /// Window ids contexts were created on.
    pub surfaces: Vec<u32>,
    pub contexts_destroyed: u32,
    pub swap_interval: Option<i32>,
    pub init_fails: bool,
    pub inits: u32,
    pub cleanups: u32,
    pub reloads: u32,
    pub last_resize: Option<(i32, i32, i32, i32)>,
    pub setup_frames: Vec<bool>,
    pub frames_drawn: u32,
    pub huds: Vec<((i32, i32), Vec<HudItem>)>,
    pub swaps: Vec<bool>,
}

impl FakeRenderer {
    const FONT_HEIGHT: f32 = 64.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting(versions: &[GlVersion]) -> Self {
        Self { accepts: Some(versions.to_vec()), ..Self::default() }
    }
}

impl RenderContext for FakeRenderer {
    fn create_context(&mut self, surface: &dyn NativeSurface, version: GlVersion) -> bool {
        self.context_attempts += 1;
        let ok = self.accepts.as_ref().map_or(true, |a| a.contains(&version));
        if ok {
            self.context = Some(version);
            self.surfaces.extend(FakeSurface::id_of(surface));
        }
        ok
    }

    fn destroy_context(&mut self) {
        self.context = None;
        self.contexts_destroyed += 1;
    }

    fn has_context(&self) -> bool {
        self.context.is_some()
    }

    fn set_swap_interval(&mut self, interval: i32) -> bool {
        self.swap_interval = Some(interval);
        true
    }

    fn init(&mut self) -> Result<(), String> {
        self.inits += 1;
        if self.init_fails {
            return Err("could not find core textures".into());
        }
        Ok(())
    }

    fn cleanup(&mut self) {
        self.cleanups += 1;
    }

    fn reload(&mut self) -> bool {
        self.reloads += 1;
        true
    }

    fn resize(&mut self, render_w: i32, render_h: i32, hud_w: i32, hud_h: i32) {
        self.last_resize = Some((render_w, render_h, hud_w, hud_h));
    }

    fn setup_frame(&mut self, in_world: bool) {
        self.setup_frames.push(in_world);
    }

    fn draw_frame(&mut self) {
        self.frames_drawn += 1;
    }

    fn swap_buffers(&mut self, overlay: bool) {
        self.swaps.push(overlay);
    }

    fn draw_hud(&mut self, size: (i32, i32), items: &[HudItem]) {
        self.huds.push((size, items.to_vec()));
    }

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
        (max_width, (width / max_width).ceil() * Self::FONT_HEIGHT)
    }
}

//=== RecordingSink =======================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SinkCall {
    Key(i32, bool),
    Text(String),
    Ui(i32, i32),
    Move(i32, i32),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub calls: Vec<SinkCall>,
    /// UI claims every cursor move.
    pub ui_captures: bool,
}

impl InputSink for RecordingSink {
    fn process_key(&mut self, code: i32, pressed: bool) {
        self.calls.push(SinkCall::Key(code, pressed));
    }

    fn process_text_input(&mut self, text: &str) {
        self.calls.push(SinkCall::Text(text.to_string()));
    }

    fn ui_move_cursor(&mut self, dx: i32, dy: i32) -> bool {
        self.calls.push(SinkCall::Ui(dx, dy));
        self.ui_captures
    }

    fn mouse_move(&mut self, dx: i32, dy: i32) {
        self.calls.push(SinkCall::Move(dx, dy));
    }
}

//=== RecordingGame =======================================================

/// Game that logs every hook it receives, in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingGame {
    pub log: Vec<&'static str>,
    pub sink: RecordingSink,
    /// Speed in percent; 0 reads as 100.
    pub speed: i32,
    pub paused: bool,
    pub multiplayer: bool,
    pub in_game: bool,
    pub network_fails: bool,
    /// Options starting with this prefix are claimed as server options.
    pub server_prefix: Option<&'static str>,
    pub server_options: Vec<String>,
    pub parsed_options: Vec<String>,
    pub package_dirs: Vec<PathBuf>,
    pub dedicated: Option<DedicatedMode>,
    pub config_phases: Vec<InitPhase>,
    pub sound: Option<SoundConfig>,
    pub maps: Vec<String>,
    pub scripts: Vec<String>,
    /// `(curtime, lastmillis)` seen by each `update_world`.
    pub world_steps: Vec<(i32, i32)>,
    pub server_slices: u32,
    pub sounds_stopped: u32,
    pub kept_alive: u32,
}

impl RecordingGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, hook: &str) -> usize {
        self.log.iter().filter(|h| **h == hook).count()
    }
}

impl InputSink for RecordingGame {
    fn process_key(&mut self, code: i32, pressed: bool) {
        self.sink.process_key(code, pressed);
    }

    fn process_text_input(&mut self, text: &str) {
        self.sink.process_text_input(text);
    }

    fn ui_move_cursor(&mut self, dx: i32, dy: i32) -> bool {
        self.sink.ui_move_cursor(dx, dy)
    }

    fn mouse_move(&mut self, dx: i32, dy: i32) {
        self.sink.mouse_move(dx, dy);
    }
}

impl LoadingHooks for RecordingGame {
    fn stop_sounds(&mut self) {
        self.sounds_stopped += 1;
    }

    fn keep_alive(&mut self) {
        self.kept_alive += 1;
    }
}

impl Game for RecordingGame {
    fn scale_time(&self, elapsed: i32) -> i32 {
        let speed = if self.speed == 0 { 100 } else { self.speed };
        elapsed * speed
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_multiplayer(&self) -> bool {
        self.multiplayer
    }

    fn in_main_menu(&self) -> bool {
        !self.in_game
    }

    fn server_option(&mut self, arg: &str) -> bool {
        let claimed = self.server_prefix.is_some_and(|p| arg.starts_with(p));
        if claimed {
            self.server_options.push(arg.to_string());
        }
        claimed
    }

    fn add_package_dir(&mut self, dir: &Path) {
        self.package_dirs.push(dir.to_path_buf());
    }

    fn init_network(&mut self) -> Result<(), String> {
        self.log.push("init_network");
        if self.network_fails {
            return Err("no sockets".into());
        }
        Ok(())
    }

    fn parse_options(&mut self, args: &[String]) {
        self.parsed_options.extend_from_slice(args);
    }

    fn init_server(&mut self, mode: DedicatedMode) {
        self.log.push("init_server");
        self.dedicated = Some(mode);
    }

    fn init_client(&mut self) {
        self.log.push("init_client");
    }

    fn init_console(&mut self) -> Result<(), String> {
        self.log.push("init_console");
        Ok(())
    }

    fn init_world(&mut self) {
        self.log.push("init_world");
    }

    fn apply_sound_config(&mut self, config: SoundConfig) {
        self.sound = Some(config);
    }

    fn init_sound(&mut self) {
        self.log.push("init_sound");
    }

    fn load_configs(&mut self, phase: InitPhase) {
        self.log.push("load_configs");
        self.config_phases.push(phase);
    }

    fn init_render(&mut self) {
        self.log.push("init_render");
    }

    fn change_map(&mut self, name: &str, loading: &mut LoadingView<'_>) {
        self.log.push("change_map");
        self.maps.push(name.to_string());
        loading.render_progress(0.5, Some("loading map..."), false, self);
    }

    fn execute(&mut self, script: &str) {
        self.scripts.push(script.to_string());
    }

    fn update_time(&mut self, _clock: &GameClock) {
        self.log.push("update_time");
    }

    fn update_ui(&mut self) {
        self.log.push("update_ui");
    }

    fn process_menu(&mut self) {
        self.log.push("process_menu");
    }

    fn try_edit(&mut self) {
        self.log.push("try_edit");
    }

    fn update_world(&mut self, clock: &GameClock) {
        self.log.push("update_world");
        self.world_steps.push((clock.curtime, clock.lastmillis));
    }

    fn check_sleep(&mut self, _lastmillis: i32) {
        self.log.push("check_sleep");
    }

    fn server_slice(&mut self, _clock: &GameClock) {
        self.log.push("server_slice");
        self.server_slices += 1;
    }

    fn recompute_camera(&mut self) {
        self.log.push("recompute_camera");
    }

    fn update_particles(&mut self) {
        self.log.push("update_particles");
    }

    fn update_sounds(&mut self) {
        self.log.push("update_sounds");
    }

    fn cleanup_render(&mut self) {
        self.log.push("cleanup_render");
    }

    fn reload_render(&mut self) {
        self.log.push("reload_render");
    }

    fn on_quit(&mut self) {
        self.log.push("on_quit");
    }

    fn shutdown(&mut self) {
        self.log.push("shutdown");
    }
}
