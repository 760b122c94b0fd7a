//=========================================================================
// Engine Lifecycle
//=========================================================================
//
// Startup, shutdown and failure paths.
//
// Startup order:
// ```text
//   prepare:  home dir ─> init config ─> command line ─> cpu count
//   startup:  net ─> game options/server/client ─> video ─> gl ─> console
//             ─> "initializing..." ─> world ─> sound ─> cfg (Load, Game)
//             ─> render (gamma, vsync) ─> map/script ─> grab ─> main loop
// ```
//
// A headless dedicated server stops after the game phase and runs its
// own loop without a window.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::PathBuf;

//=== External Dependencies ===============================================

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::frame::{report_fps, show_var, FrameControl};
use super::Engine;
use crate::config::{
    default_home_dir, home_path, Args, DedicatedMode, EngineVars, InitConfig, Var, INIT_CONFIG_PATH,
};
use crate::core::clock::{GameClock, TimeSource};
use crate::core::commands::{CommandQueue, EngineCommand};
use crate::core::fps_history::FpsHistory;
use crate::core::frame_limiter::FrameLimiter;
use crate::core::game::Game;
use crate::core::init_state::{ChangeKind, InitPhase};
use crate::core::input::{Backend, KeyCode};
use crate::core::progress::{BackgroundInfo, LoadingView};
use crate::core::render::RenderContext;
use crate::error::EngineError;

/// Server tick rate when `maxfps` leaves the loop unlimited.
const DEDICATED_TICK_RATE: i32 = 200;

//=== Preparation =========================================================

/// State resolved before the platform is touched.
pub(super) struct Prepared<G> {
    pub game: G,
    pub vars: EngineVars,
    pub home: PathBuf,
    /// Command line words the game parses itself.
    pub game_args: Vec<String>,
}

/// Resolves the home directory, loads the init config and applies the
/// command line over it.
pub(super) fn prepare<G: Game>(mut game: G, args: &Args, home: Option<PathBuf>) -> Prepared<G> {
    let home = args.home_dir.clone().or(home).unwrap_or_else(default_home_dir);
    info!(target: "engine::init", "Using home directory: {}", home.display());

    let mut vars = EngineVars::new();
    match InitConfig::load(&home_path(&home, INIT_CONFIG_PATH)) {
        Ok(Some(config)) => {
            config.apply(&mut vars);
            game.apply_sound_config(config.sound);
        }
        Ok(None) => {}
        Err(e) => warn!(target: "config", "Ignoring init config: {}", e),
    }

    apply_args(args, &mut vars);

    for dir in &args.package_dirs {
        info!(target: "engine::init", "Adding package directory: {}", dir.display());
        game.add_package_dir(dir);
    }

    let game_args = args
        .game_args
        .iter()
        .filter(|arg| !(arg.starts_with('-') && game.server_option(arg)))
        .cloned()
        .collect();

    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    vars.force(Var::NumCpus, cpus.clamp(1, 16) as i32);

    Prepared { game, vars, home, game_args }
}

/// Command line display settings override the init config.
fn apply_args(args: &Args, vars: &mut EngineVars) {
    // already clamped by the parser, or -1 for automatic
    if let Some(w) = args.screen_w {
        vars.force(Var::ScreenW, w);
    }
    if let Some(h) = args.screen_h {
        vars.force(Var::ScreenH, h);
    }
    if let Some(fullscreen) = args.fullscreen {
        vars.force(Var::Fullscreen, i32::from(fullscreen));
    }
}

/// Network and game-side server setup, shared by client and server.
fn init_game<G: Game>(game: &mut G, game_args: &[String], mode: DedicatedMode) -> Result<(), String> {
    info!(target: "engine::init", "init: net");
    game.init_network()
        .map_err(|e| format!("Unable to initialise network module: {}", e))?;

    info!(target: "engine::init", "init: game");
    game.parse_options(game_args);
    game.init_server(mode);
    Ok(())
}

//=== Client Startup ======================================================

impl<G: Game, R: RenderContext, B: Backend> Engine<G, R, B> {
    /// Runs every startup phase up to the main loop.
    pub(super) fn startup(&mut self, args: &Args, game_args: &[String]) -> Result<(), EngineError> {
        self.init.set_phase(InitPhase::Reset);

        if let Err(msg) = init_game(&mut self.game, game_args, args.dedicated) {
            return Err(self.fatal(msg));
        }
        self.game.init_client();

        info!(target: "engine::init", "init: video");
        if let Err(e) = self.screen.setup(&mut self.backend, &mut self.render, &mut self.vars) {
            return Err(self.fatal(e.to_string()));
        }
        self.backend.set_cursor_visible(false);
        // spurious text events otherwise arrive on the first toggle
        self.backend.set_text_input(false);

        info!(target: "engine::init", "init: gl");
        if let Err(e) = self.render.init() {
            return Err(self.fatal(format!("could not find core textures: {}", e)));
        }

        info!(target: "engine::init", "init: console");
        if let Err(e) = self.game.init_console() {
            return Err(self.fatal(e));
        }

        self.loading.between_frames = true;
        self.render_background(BackgroundInfo::caption("initializing..."), false);

        info!(target: "engine::init", "init: world");
        self.game.init_world();

        info!(target: "engine::init", "init: sound");
        self.game.init_sound();

        info!(target: "engine::init", "init: cfg");
        for phase in [InitPhase::Load, InitPhase::Game] {
            self.init.set_phase(phase);
            self.game.load_configs(phase);
            if self.process_commands()? == FrameControl::Quit {
                self.quit_requested = true;
            }
        }
        self.init.set_phase(InitPhase::NotIniting);

        info!(target: "engine::init", "init: render");
        self.screen.init_gamma(self.vars.get(Var::Gamma), &mut self.backend);
        self.screen.restore_vsync(&mut self.render, &self.vars, &self.init);
        self.game.init_render();

        info!(target: "engine::init", "init: mainloop");
        if let Some(map) = &args.load_map {
            info!(target: "engine::init", "Loading map {}", map);
            self.change_map(map);
        }
        if let Some(script) = &args.init_script {
            self.game.execute(script);
        }

        self.fps.reset();

        let relative = self.vars.flag(Var::RelativeMouse);
        self.input.grab.grab(true, relative, &mut self.backend);
        let now = self.time.ticks();
        self.input.ignore_mouse_motion(&mut self.backend, now);
        Ok(())
    }

    //--- Loading Screens --------------------------------------------------

    /// Shows the loading background (no-op while a frame is drawn unless
    /// forced).
    pub fn render_background(&mut self, info: BackgroundInfo, force: bool) {
        let main_menu = self.game.in_main_menu();
        let mut view = LoadingView {
            screen: &mut self.loading,
            render: &mut self.render,
            vars: &self.vars,
            hud: (self.screen.hud_w, self.screen.hud_h),
            lastmillis: self.clock.lastmillis,
            main_menu,
            pump: None,
        };
        view.render_background(info, force, &mut self.game);
    }

    /// Shows a progress bar (0..1) with an optional label.
    pub fn render_progress(&mut self, bar: f32, label: Option<&str>, background: bool) {
        let main_menu = self.game.in_main_menu();
        let screen = (self.screen.screen_w, self.screen.screen_h);
        let (input, backend, time) = (&mut self.input, &mut self.backend, &self.time);
        let mut pump = || {
            input.intercept_key(KeyCode::Unidentified, &mut *backend, time.ticks(), screen);
        };
        let mut view = LoadingView {
            screen: &mut self.loading,
            render: &mut self.render,
            vars: &self.vars,
            hud: (self.screen.hud_w, self.screen.hud_h),
            lastmillis: self.clock.lastmillis,
            main_menu,
            pump: Some(&mut pump),
        };
        view.render_progress(bar, label, background, &mut self.game);
    }

    /// Asks the game to load a map, lending it the loading screens.
    pub fn change_map(&mut self, name: &str) {
        let main_menu = self.game.in_main_menu();
        let screen = (self.screen.screen_w, self.screen.screen_h);
        let (input, backend, time) = (&mut self.input, &mut self.backend, &self.time);
        let mut pump = || {
            input.intercept_key(KeyCode::Unidentified, &mut *backend, time.ticks(), screen);
        };
        let mut view = LoadingView {
            screen: &mut self.loading,
            render: &mut self.render,
            vars: &self.vars,
            hud: (self.screen.hud_w, self.screen.hud_h),
            lastmillis: self.clock.lastmillis,
            main_menu,
            pump: Some(&mut pump),
        };
        self.game.change_map(name, &mut view);
    }

    //--- GL Reset ---------------------------------------------------------

    /// Rebuilds the window, context and every GL resource.
    ///
    /// Applies pending graphics changes such as a new resolution.
    pub fn reset_gl(&mut self) -> Result<(), EngineError> {
        info!(target: "render", "Resetting OpenGL");
        self.init.clear_changes(ChangeKind::GFX | ChangeKind::SHADERS);

        self.render_background(BackgroundInfo::caption("resetting OpenGL"), false);

        self.game.cleanup_render();
        self.render.cleanup();

        if let Err(e) = self.screen.setup(&mut self.backend, &mut self.render, &mut self.vars) {
            return Err(self.fatal(e.to_string()));
        }

        let grabbed = self.input.grab.grabbed;
        self.input.grab.grab(grabbed, self.vars.flag(Var::RelativeMouse), &mut self.backend);

        if let Err(e) = self.render.init() {
            return Err(self.fatal(format!("failed to reinitialise renderer: {}", e)));
        }

        self.loading.between_frames = false;
        if !self.render.reload() {
            return Err(self.fatal("failed to reload core texture"));
        }
        self.loading.between_frames = true;

        self.render_background(BackgroundInfo::caption("initializing..."), false);
        self.screen.restore_gamma(&mut self.backend, &self.init);
        self.screen.restore_vsync(&mut self.render, &self.vars, &self.init);
        self.game.reload_render();
        Ok(())
    }

    //--- Shutdown ---------------------------------------------------------

    /// Normal exit: saves the init config, lets the game save its state,
    /// then gives the desktop back.
    pub(super) fn quit(&mut self) {
        info!(target: "engine", "Quitting");
        self.write_init_config();
        self.game.on_quit();

        self.restore_desktop();
        self.game.shutdown();
        self.render.cleanup();
        if self.render.has_context() {
            self.render.destroy_context();
        }
        self.backend.destroy_window();
    }

    fn write_init_config(&self) {
        let path = home_path(&self.home, INIT_CONFIG_PATH);
        let config = InitConfig::capture(&self.vars, self.game.sound_config());
        if let Err(e) = config.save(&path) {
            warn!(target: "config", "Could not write init config: {}", e);
        }
    }

    /// Shows the cursor, releases the grab, resets gamma and leaves
    /// fullscreen.
    fn restore_desktop(&mut self) {
        self.input.grab.release_all(&mut self.backend);
        self.screen.clear_gamma(&mut self.backend);
        if self.backend.is_fullscreen() {
            self.backend.set_fullscreen(false);
        }
    }

    /// Reports an unrecoverable error and restores the desktop.
    ///
    /// Up to two messages are logged; restoration happens only on the
    /// first, since a second failure usually comes from restoring.
    pub(super) fn fatal(&mut self, msg: impl Into<String>) -> EngineError {
        let msg = msg.into();
        self.fatal_errors += 1;

        if self.fatal_errors <= 2 {
            error!(target: "engine", "{}", msg);
        }
        if self.fatal_errors == 1 {
            self.restore_desktop();
        }
        EngineError::Fatal(msg)
    }
}

//=== DedicatedServer =====================================================

/// Headless server loop: clock, pacing and server slices only.
pub(super) struct DedicatedServer<G: Game> {
    game: G,
    vars: EngineVars,
    game_args: Vec<String>,
    time: Box<dyn TimeSource>,
    commands: CommandQueue,
    clock: GameClock,
    limiter: FrameLimiter,
    fps: FpsHistory,
    frames: u64,
}

impl<G: Game> DedicatedServer<G> {
    pub fn new(prepared: Prepared<G>, time: Box<dyn TimeSource>, commands: CommandQueue) -> Self {
        Self {
            game: prepared.game,
            vars: prepared.vars,
            game_args: prepared.game_args,
            time,
            commands,
            clock: GameClock::new(),
            limiter: FrameLimiter::new(),
            fps: FpsHistory::new(),
            frames: 0,
        }
    }

    pub fn run(&mut self) -> Result<(), EngineError> {
        if let Err(msg) = init_game(&mut self.game, &self.game_args, DedicatedMode::Headless) {
            error!(target: "engine", "{}", msg);
            return Err(EngineError::Fatal(msg));
        }
        info!(target: "engine", "Dedicated server started, waiting for clients...");

        while self.tick() == FrameControl::Continue {}

        info!(target: "engine", "Dedicated server shutting down");
        self.game.on_quit();
        self.game.shutdown();
        Ok(())
    }

    /// One server slice.
    fn tick(&mut self) -> FrameControl {
        let mut millis = self.clock.millis(self.time.ticks(), &self.vars);
        let limit = match self.vars.get(Var::MaxFps) {
            0 => DEDICATED_TICK_RATE,
            fps => fps,
        };
        self.limiter.limit_fps(&mut millis, self.clock.totalmillis, limit, &*self.time);

        let game = &self.game;
        self.clock.advance(millis, |elapsed| game.scale_time(elapsed), true, game.is_paused());
        self.game.server_slice(&self.clock);

        if self.frames > 0 {
            self.fps.record(self.clock.elapsedtime);
        }
        self.frames += 1;

        let pending: Vec<EngineCommand> = self.commands.drain().collect();
        for command in pending {
            if self.handle_command(command) == FrameControl::Quit {
                return FrameControl::Quit;
            }
        }
        FrameControl::Continue
    }

    fn handle_command(&mut self, command: EngineCommand) -> FrameControl {
        match command {
            EngineCommand::Quit => return FrameControl::Quit,
            EngineCommand::GetFps { raw } => report_fps(&self.fps, raw),
            EngineCommand::ShowVar { name } => show_var(&self.vars, &name),
            EngineCommand::SetVar { name, value } => match self.vars.set_by_name(&name, value) {
                Ok((Var::ClockError | Var::ClockFix, true)) => self.clock.reset(self.time.ticks()),
                Ok(_) => {}
                Err(e) => warn!(target: "engine::commands", "{}", e),
            },
            EngineCommand::Script(line) => self.game.execute(&line),
            EngineCommand::ScreenRes { .. } | EngineCommand::ResetGl => {
                debug!(target: "engine::commands", "No display on a dedicated server");
            }
        }
        FrameControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
