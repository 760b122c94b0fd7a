//=========================================================================
// Game Collaborator
//=========================================================================
//
// Everything the host loop calls but does not own: world simulation,
// UI, sound, networking, scripting. Every hook has a do-nothing default
// so a game implements only what it has.
//
// Call order per frame (see `engine::frame`):
//
// ```text
//   update_time ─> [input] ─> update_ui ─> process_menu ─> try_edit
//     ─> update_world ─> check_sleep ─> server_slice
//     ─> recompute_camera ─> update_particles ─> update_sounds ─> [draw]
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::Path;

//=== Internal Dependencies ===============================================

use super::clock::GameClock;
use super::init_state::InitPhase;
use super::input::InputSink;
use super::progress::{LoadingHooks, LoadingView};
use crate::config::{DedicatedMode, SoundConfig};

//=== Game ================================================================

pub trait Game: InputSink + LoadingHooks {
    //--- Time -------------------------------------------------------------

    /// Maps real milliseconds to game time in hundredths of a
    /// millisecond. Normal speed is `elapsed * 100`.
    fn scale_time(&self, elapsed: i32) -> i32 {
        elapsed * 100
    }

    fn is_paused(&self) -> bool {
        false
    }

    fn is_multiplayer(&self) -> bool {
        false
    }

    /// The main menu is up (no world drawn, menu frame cap applies).
    fn in_main_menu(&self) -> bool {
        true
    }

    //--- Startup ----------------------------------------------------------

    /// Offered every unrecognised command line option first; `true`
    /// claims it as a server option.
    fn server_option(&mut self, _arg: &str) -> bool {
        false
    }

    fn add_package_dir(&mut self, _dir: &Path) {}

    /// Brings up networking; an error is fatal.
    fn init_network(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Remaining command line arguments.
    fn parse_options(&mut self, _args: &[String]) {}

    fn init_server(&mut self, _mode: DedicatedMode) {}

    fn init_client(&mut self) {}

    /// Loads the script library and fonts; an error is fatal.
    fn init_console(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Creates the player and an empty world.
    fn init_world(&mut self) {}

    fn init_sound(&mut self) {}

    /// Runs the config scripts belonging to `phase` (`Load`: keymap,
    /// defaults and saved user config; `Game`: game-specific configs).
    fn load_configs(&mut self, _phase: InitPhase) {}

    /// Builds render resources that depend on the loaded config.
    fn init_render(&mut self) {}

    fn change_map(&mut self, _name: &str, _loading: &mut LoadingView<'_>) {}

    /// Runs a script line.
    fn execute(&mut self, _script: &str) {}

    /// Sound device parameters read from the init config, before
    /// `init_sound`.
    fn apply_sound_config(&mut self, _config: SoundConfig) {}

    /// Current sound device parameters, saved with the init config.
    fn sound_config(&self) -> SoundConfig {
        SoundConfig::default()
    }

    //--- Frame ------------------------------------------------------------

    fn update_time(&mut self, _clock: &GameClock) {}

    fn update_ui(&mut self) {}

    fn process_menu(&mut self) {}

    fn try_edit(&mut self) {}

    fn update_world(&mut self, _clock: &GameClock) {}

    /// Fires script `sleep` timers that are due.
    fn check_sleep(&mut self, _lastmillis: i32) {}

    /// Services the local/dedicated server once.
    fn server_slice(&mut self, _clock: &GameClock) {}

    fn recompute_camera(&mut self) {}

    fn update_particles(&mut self) {}

    fn update_sounds(&mut self) {}

    //--- GL Reset ---------------------------------------------------------

    /// Frees world render resources before the context is rebuilt.
    fn cleanup_render(&mut self) {}

    /// Reloads shaders, textures and geometry after a rebuild.
    fn reload_render(&mut self) {}

    //--- Shutdown ---------------------------------------------------------

    /// Normal exit: save server and user config, disconnect.
    fn on_quit(&mut self) {}

    /// Releases world, UI and sound after a normal exit.
    fn shutdown(&mut self) {}
}
