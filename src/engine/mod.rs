//=========================================================================
// Strafe Engine
//
// Entry point and per-frame driver of the host.
//
// Architecture:
// ```text
//     EngineBuilder ──run(args, backend)──┬─> [dedicated] headless server loop
//         │                               │
//         ├─ with_time_source()           └─> Engine ──startup──> frame loop ──> quit
//         ├─ with_home_dir()                    │
//         └─ commands()                         └─ one thread, cooperative:
//                                                  pump ─> simulate ─> draw ─> swap
// ```
//
// Everything runs on the calling thread. The backend is pumped with a
// zero timeout once per frame, so pacing is owned entirely by the
// frame limiter.
//
//=========================================================================

//=== Submodules ==========================================================

mod frame;
mod startup;

//=== Standard Library Imports ============================================

use std::path::PathBuf;

//=== External Dependencies ===============================================

use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::config::{Args, DedicatedMode, EngineVars};
use crate::core::clock::{GameClock, SystemTime, TimeSource};
use crate::core::commands::{CommandQueue, CommandSender};
use crate::core::display::Screen;
use crate::core::fps_history::FpsHistory;
use crate::core::frame_limiter::FrameLimiter;
use crate::core::game::Game;
use crate::core::init_state::InitState;
use crate::core::input::{Backend, InputDispatcher};
use crate::core::progress::LoadingScreen;
use crate::core::render::RenderContext;
use crate::error::EngineError;
use crate::platform::PlatformError;

pub use frame::FrameControl;

//=== EngineBuilder =======================================================

/// Builder for configuring and starting an [`Engine`].
///
/// # Default Values
///
/// - **Time source**: wall clock ([`SystemTime`])
/// - **Home directory**: `-u` if given, otherwise `$HOME/.strafe`
///
/// # Examples
///
/// ```no_run
/// use strafe_engine::config::Args;
/// use strafe_engine::core::{Game, InputSink, LoadingHooks, NullRenderer};
/// use strafe_engine::platform::WinitBackend;
/// use strafe_engine::EngineBuilder;
///
/// struct Sandbox;
///
/// impl InputSink for Sandbox {
///     fn process_key(&mut self, _code: i32, _pressed: bool) {}
///     fn process_text_input(&mut self, _text: &str) {}
///     fn ui_move_cursor(&mut self, _dx: i32, _dy: i32) -> bool { false }
///     fn mouse_move(&mut self, _dx: i32, _dy: i32) {}
/// }
/// impl LoadingHooks for Sandbox {}
/// impl Game for Sandbox {}
///
/// let args = Args::parse(std::env::args().skip(1));
/// EngineBuilder::new(Sandbox, NullRenderer::new())
///     .run(&args, WinitBackend::new)
///     .unwrap();
/// ```
pub struct EngineBuilder<G: Game, R: RenderContext> {
    game: G,
    render: R,
    time: Box<dyn TimeSource>,
    home_dir: Option<PathBuf>,
    commands: CommandQueue,
    loading: Option<LoadingScreen>,
}

impl<G: Game, R: RenderContext> EngineBuilder<G, R> {
    /// Creates a builder around the game and renderer.
    pub fn new(game: G, render: R) -> Self {
        Self {
            game,
            render,
            time: Box::new(SystemTime::new()),
            home_dir: None,
            commands: CommandQueue::new(),
            loading: None,
        }
    }

    /// Replaces the wall clock (tests drive the loop with a manual one).
    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Box::new(time);
        self
    }

    /// Home directory used when `-u` is not given.
    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    /// Loading screen state, e.g. with a seeded background generator.
    pub fn with_loading_screen(mut self, loading: LoadingScreen) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Handle for submitting console commands from any thread.
    ///
    /// Lines sent before the loop starts are handled on the first frame.
    pub fn commands(&self) -> CommandSender {
        self.commands.sender()
    }

    //--- Execution --------------------------------------------------------

    /// Runs the engine to completion on the calling thread.
    ///
    /// `backend` is only invoked when a window is needed, so a headless
    /// dedicated server (`-d`) never touches the windowing system.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Fatal`] after any unrecoverable startup or
    /// runtime failure; the desktop has been restored by then.
    pub fn run<B, F>(self, args: &Args, backend: F) -> Result<(), EngineError>
    where
        B: Backend,
        F: FnOnce() -> Result<B, PlatformError>,
    {
        let prepared = startup::prepare(self.game, args, self.home_dir);

        if args.dedicated == DedicatedMode::Headless {
            let mut server = startup::DedicatedServer::new(prepared, self.time, self.commands);
            return server.run();
        }

        info!(target: "engine::init", "init: video backend");
        let backend = match backend() {
            Ok(backend) => backend,
            Err(e) => {
                let msg = format!("Unable to initialize platform: {}", e);
                error!(target: "engine::init", "{}", msg);
                return Err(EngineError::Fatal(msg));
            }
        };

        let parts = Parts { render: self.render, time: self.time, commands: self.commands, loading: self.loading };
        Engine::start(prepared, parts, args, backend)?.run()
    }

    /// Performs the full client startup with an existing backend and
    /// returns the engine ready for its frame loop.
    pub fn build<B: Backend>(self, args: &Args, backend: B) -> Result<Engine<G, R, B>, EngineError> {
        let prepared = startup::prepare(self.game, args, self.home_dir);
        let parts = Parts { render: self.render, time: self.time, commands: self.commands, loading: self.loading };
        Engine::start(prepared, parts, args, backend)
    }
}

/// Builder state handed over to the engine.
struct Parts<R> {
    render: R,
    time: Box<dyn TimeSource>,
    commands: CommandQueue,
    loading: Option<LoadingScreen>,
}

//=== Engine ==============================================================

/// The running host: owns the game, renderer, backend and all loop state.
///
/// Created by [`EngineBuilder::build`] (or implicitly by
/// [`EngineBuilder::run`]); [`Engine::run`] drives frames until quit.
pub struct Engine<G: Game, R: RenderContext, B: Backend> {
    game: G,
    render: R,
    backend: B,
    time: Box<dyn TimeSource>,
    vars: EngineVars,
    clock: GameClock,
    limiter: FrameLimiter,
    fps: FpsHistory,
    screen: Screen,
    input: InputDispatcher,
    loading: LoadingScreen,
    init: InitState,
    commands: CommandQueue,
    home: PathBuf,
    /// Frames completed; fps history starts with the second.
    frames: u64,
    /// Fatal errors reported; the desktop is restored on the first only.
    fatal_errors: u32,
    /// `quit` arrived while starting up.
    quit_requested: bool,
}

impl<G: Game, R: RenderContext, B: Backend> Engine<G, R, B> {
    fn start(
        prepared: startup::Prepared<G>,
        parts: Parts<R>,
        args: &Args,
        backend: B,
    ) -> Result<Self, EngineError> {
        let mut engine = Engine {
            game: prepared.game,
            render: parts.render,
            backend,
            time: parts.time,
            vars: prepared.vars,
            clock: GameClock::new(),
            limiter: FrameLimiter::new(),
            fps: FpsHistory::new(),
            screen: Screen::new(),
            input: InputDispatcher::new(),
            loading: parts.loading.unwrap_or_default(),
            init: InitState::new(),
            commands: parts.commands,
            home: prepared.home,
            frames: 0,
            fatal_errors: 0,
            quit_requested: false,
        };

        engine.startup(args, &prepared.game_args)?;
        Ok(engine)
    }

    //--- Execution --------------------------------------------------------

    /// Runs frames until quit, then shuts down cleanly.
    pub fn run(mut self) -> Result<(), EngineError> {
        info!(target: "engine::loop", "Entering main loop");
        while self.frame()? == FrameControl::Continue {}
        self.quit();
        Ok(())
    }

    //--- Accessors --------------------------------------------------------

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn vars(&self) -> &EngineVars {
        &self.vars
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn init_state(&self) -> &InitState {
        &self.init
    }

    pub fn fps(&self) -> &FpsHistory {
        &self.fps
    }

    pub fn commands(&self) -> CommandSender {
        self.commands.sender()
    }

    pub fn home_dir(&self) -> &std::path::Path {
        &self.home
    }
}
