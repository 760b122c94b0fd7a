//=========================================================================
// Init Config
//=========================================================================
//
// Settings that must be known before the window and sound device exist.
//
// Read once at startup (command line overrides it) and rewritten on a
// normal quit so the next launch opens with the same display mode.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fs;
use std::path::Path;

//=== External Dependencies ===============================================

use log::{debug, info};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::{ConfigError, EngineVars, Var};

const HEADER: &str = "# automatically written on exit, DO NOT MODIFY\n# modify settings in game\n";

//=== SoundConfig =========================================================

/// Sound device parameters, owned by the sound subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub sound: i32,
    pub soundchans: i32,
    pub soundfreq: i32,
    pub soundbufferlen: i32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            sound: 1,
            soundchans: 32,
            soundfreq: 44100,
            soundbufferlen: 1024,
        }
    }
}

//=== InitConfig ==========================================================

/// Contents of `config/init.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    pub fullscreen: i32,
    pub screenw: i32,
    pub screenh: i32,
    #[serde(flatten)]
    pub sound: SoundConfig,
}

impl Default for InitConfig {
    fn default() -> Self {
        let vars = EngineVars::new();
        Self::capture(&vars, SoundConfig::default())
    }
}

impl InitConfig {
    //--- Conversion -------------------------------------------------------

    /// Snapshots the current display variables.
    pub fn capture(vars: &EngineVars, sound: SoundConfig) -> Self {
        Self {
            fullscreen: vars.get(Var::Fullscreen),
            screenw: vars.get(Var::ScreenW),
            screenh: vars.get(Var::ScreenH),
            sound,
        }
    }

    /// Applies the display settings to the engine variables.
    ///
    /// The resolution may hold `-1` (automatic), which bypasses clamping.
    pub fn apply(&self, vars: &mut EngineVars) {
        for (var, value) in [(Var::ScreenW, self.screenw), (Var::ScreenH, self.screenh)] {
            if value < 0 {
                vars.force(var, -1);
            } else {
                // range errors are clamped; these vars are never read-only
                let _ = vars.set(var, value);
            }
        }
        let _ = vars.set(Var::Fullscreen, self.fullscreen);
    }

    //--- Persistence ------------------------------------------------------

    /// Loads the config; a missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "config", "No init config at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(ConfigError::Io { path: path.to_path_buf(), source });
            }
        };

        let config = toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        info!(target: "config", "Loaded init config from {}", path.display());
        Ok(Some(config))
    }

    /// Writes the config, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let body = toml::to_string(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }

        fs::write(path, format!("{HEADER}{body}"))
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        debug!(target: "config", "Wrote init config to {}", path.display());
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
