//=========================================================================
// Configuration
//=========================================================================
//
// Everything the host reads before the window exists:
//
// ```text
//   command line ──> Args ─────────────┐
//   <home>/config/init.toml ──> InitConfig ──> EngineVars (clamped)
//                                      │
//   console `<var> <value>` ───────────┘
// ```
//
// Precedence: init config first, command line overrides it, console
// assignments override both at runtime. The init config is rewritten on
// normal exit.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod args;
pub mod init_config;
pub mod vars;

//=== Standard Library Imports ============================================

use std::path::{Path, PathBuf};

//=== Public API ==========================================================

pub use args::{Args, DedicatedMode};
pub use init_config::{InitConfig, SoundConfig};
pub use vars::{EngineVars, Var};

/// Path of the init config relative to the home directory.
pub const INIT_CONFIG_PATH: &str = "config/init.toml";

//=== ConfigError =========================================================

/// Configuration loading, saving and variable assignment errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing a config file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A config file exists but is not valid TOML for its schema.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The config could not be serialized.
    Serialize(toml::ser::Error),

    /// No engine variable has this name.
    UnknownVar(String),

    /// The variable is maintained by the engine and cannot be assigned.
    ReadOnlyVar(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Self::Parse { path, source } => write!(f, "{}: {}", path.display(), source),
            Self::Serialize(e) => write!(f, "could not serialize config: {}", e),
            Self::UnknownVar(name) => write!(f, "unknown variable: {}", name),
            Self::ReadOnlyVar(name) => write!(f, "variable {} is read-only", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

//=== Home Directory ======================================================

/// Resolves the default home directory (`$HOME/.strafe`, or the working
/// directory when no home is set).
pub fn default_home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".strafe"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Joins a config-relative path onto the home directory.
pub fn home_path(home: &Path, relative: &str) -> PathBuf {
    home.join(relative)
}

//=========================================================================
// Unit Tests
//=========================================================================
