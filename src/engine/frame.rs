//=========================================================================
// Frame Loop
//=========================================================================
//
// One iteration of the main loop, plus console command handling.
//
// ```text
//   millis ─> limit_fps ─> clock.advance ─> update_time
//     ─> input ─> commands ─> ui/menu/edit ─> world ─> sleep/server
//     ─> fps ─> camera/particles/sounds ─> [unless minimized] draw + swap
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::Engine;
use crate::config::{EngineVars, Var};
use crate::core::commands::EngineCommand;
use crate::core::display::RESOLUTION_CHANGE_LEVEL;
use crate::core::fps_history::FpsHistory;
use crate::core::frame_limiter::FrameLimiter;
use crate::core::game::Game;
use crate::core::init_state::ChangeKind;
use crate::core::input::{Backend, KeyCode};
use crate::core::render::RenderContext;
use crate::error::EngineError;

//=== FrameControl ========================================================

/// Whether the loop goes on after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Quit,
}

//=== Frame ===============================================================

impl<G: Game, R: RenderContext, B: Backend> Engine<G, R, B> {
    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// Only a failed `resetgl` can fail a frame; it is fatal.
    pub fn frame(&mut self) -> Result<FrameControl, EngineError> {
        //--- Timing -------------------------------------------------------

        let mut millis = self.clock.millis(self.time.ticks(), &self.vars);
        let limit = FrameLimiter::limit(&self.vars, self.game.in_main_menu(), self.screen.minimized);
        self.limiter.limit_fps(&mut millis, self.clock.totalmillis, limit, &*self.time);

        let game = &self.game;
        self.clock.advance(
            millis,
            |elapsed| game.scale_time(elapsed),
            game.is_multiplayer(),
            game.is_paused(),
        );
        self.game.update_time(&self.clock);

        //--- Input --------------------------------------------------------

        let now = self.time.ticks();
        let screen = (self.screen.screen_w, self.screen.screen_h);
        let input = self.input.check_input(&mut self.backend, &mut self.game, &self.vars, now, screen);
        if input.quit {
            return Ok(FrameControl::Quit);
        }
        if let Some(minimized) = input.minimized {
            debug!(target: "display", "Window {}", if minimized { "minimized" } else { "restored" });
            self.screen.minimized = minimized;
        }
        if let Some((w, h)) = input.resized {
            self.screen.on_resized(w, h, &self.backend, &mut self.render, &mut self.vars);
        }

        if self.process_commands()? == FrameControl::Quit || self.quit_requested {
            return Ok(FrameControl::Quit);
        }

        //--- Simulation ---------------------------------------------------

        self.game.update_ui();
        self.game.process_menu();
        self.game.try_edit();

        if self.clock.lastmillis != 0 {
            self.game.update_world(&self.clock);
        }

        self.game.check_sleep(self.clock.lastmillis);
        self.game.server_slice(&self.clock);

        if self.frames > 0 {
            self.fps.record(self.clock.elapsedtime);
        }
        self.frames += 1;

        self.game.recompute_camera();
        self.game.update_particles();
        self.game.update_sounds();

        //--- Drawing ------------------------------------------------------

        if self.screen.minimized {
            trace!(target: "engine::loop", "Minimized, skipping draw");
            return Ok(FrameControl::Continue);
        }

        self.render.setup_frame(!self.game.in_main_menu());
        self.loading.between_frames = false;
        self.render.draw_frame();
        self.render.swap_buffers(true);
        self.loading.rendered_frame = true;
        self.loading.between_frames = true;

        Ok(FrameControl::Continue)
    }

    //--- Commands ---------------------------------------------------------

    /// Handles every queued console command.
    pub(super) fn process_commands(&mut self) -> Result<FrameControl, EngineError> {
        let pending: Vec<EngineCommand> = self.commands.drain().collect();
        for command in pending {
            if self.handle_command(command)? == FrameControl::Quit {
                return Ok(FrameControl::Quit);
            }
        }
        Ok(FrameControl::Continue)
    }

    fn handle_command(&mut self, command: EngineCommand) -> Result<FrameControl, EngineError> {
        debug!(target: "engine::commands", "{:?}", command);
        match command {
            EngineCommand::Quit => return Ok(FrameControl::Quit),
            EngineCommand::ScreenRes { w, h } => self.screen.screen_res(
                w,
                h,
                &mut self.backend,
                &mut self.render,
                &mut self.vars,
                &mut self.init,
            ),
            EngineCommand::ResetGl => self.reset_gl()?,
            EngineCommand::GetFps { raw } => report_fps(&self.fps, raw),
            EngineCommand::SetVar { name, value } => match self.vars.set_by_name(&name, value) {
                Ok((var, _)) => self.on_var_set(var),
                Err(e) => warn!(target: "engine::commands", "{}", e),
            },
            EngineCommand::ShowVar { name } => show_var(&self.vars, &name),
            EngineCommand::Script(line) => self.game.execute(&line),
        }
        Ok(FrameControl::Continue)
    }

    /// Side effects of assigning an engine variable, run even when the
    /// value is unchanged.
    fn on_var_set(&mut self, var: Var) {
        match var {
            Var::ScreenW | Var::ScreenH => {
                self.init.init_warning("screen resolution", RESOLUTION_CHANGE_LEVEL, ChangeKind::GFX);
            }
            Var::ClockError | Var::ClockFix => self.clock.reset(self.time.ticks()),
            Var::Fullscreen => {
                let on = self.vars.flag(Var::Fullscreen);
                self.screen.set_fullscreen(on, &mut self.backend, &self.vars);
            }
            Var::Gamma => {
                let gamma = self.vars.get(Var::Gamma);
                self.screen.set_gamma(gamma, &mut self.backend, &self.init);
            }
            Var::Vsync => self.screen.restore_vsync(&mut self.render, &self.vars, &self.init),
            Var::VsyncTear if self.vars.flag(Var::Vsync) => {
                self.screen.restore_vsync(&mut self.render, &self.vars, &self.init);
            }
            _ => {}
        }
    }

    //--- Input Modes ------------------------------------------------------

    /// See [`crate::core::input::InputDispatcher::key_repeat`].
    pub fn key_repeat(&mut self, on: bool, mask: u32) {
        self.input.key_repeat(on, mask);
    }

    /// See [`crate::core::input::InputDispatcher::text_input`].
    pub fn text_input(&mut self, on: bool, mask: u32) {
        let now = self.time.ticks();
        self.input.text_input(on, mask, &mut self.backend, now);
    }

    pub fn is_text_input(&self) -> bool {
        self.input.is_text_input()
    }

    /// Polls for `key` outside the frame loop, e.g. to abort a load.
    pub fn intercept_key(&mut self, key: KeyCode) -> bool {
        let now = self.time.ticks();
        let screen = (self.screen.screen_w, self.screen.screen_h);
        self.input.intercept_key(key, &mut self.backend, now, screen)
    }
}

//=== Shared Reports ======================================================

pub(super) fn report_fps(fps: &FpsHistory, raw: bool) {
    if raw {
        info!(target: "engine", "fps {:.1}", fps.raw_fps());
    } else {
        let stats = fps.stats();
        info!(target: "engine", "fps {} (+{} -{})", stats.fps, stats.best_diff, stats.worst_diff);
    }
}

pub(super) fn show_var(vars: &EngineVars, name: &str) {
    match Var::from_name(name) {
        Some(var) => info!(target: "engine", "{} = {}", name, vars.get(var)),
        None => warn!(target: "engine::commands", "Unknown variable: {}", name),
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
