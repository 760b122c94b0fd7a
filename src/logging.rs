//=========================================================================
// Logging
//=========================================================================
//
// `env_logger` setup for the binary. `RUST_LOG` picks the filter
// (default `info`); `-g[FILE]` sends the log to a file under the home
// directory instead of stderr.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fs::{self, File};
use std::path::{Path, PathBuf};

//=== External Dependencies ===============================================

use env_logger::{Builder, Env, Target};

//=== LogError ============================================================

#[derive(Debug)]
pub enum LogError {
    /// The log file could not be created.
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A logger was already installed.
    AlreadyInitialized(log::SetLoggerError),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { path, source } => write!(f, "could not open log file {}: {}", path.display(), source),
            Self::AlreadyInitialized(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File { source, .. } => Some(source),
            Self::AlreadyInitialized(e) => Some(e),
        }
    }
}

//=== Setup ===============================================================

/// Where `-g<FILE>` writes: relative names land in the home directory.
pub fn log_path(home: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        home.join(file)
    }
}

/// Installs the global logger.
///
/// # Errors
///
/// Fails when the log file cannot be created or a logger already exists.
pub fn init(home: &Path, log_file: Option<&Path>) -> Result<(), LogError> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(file) = log_file {
        let path = log_path(home, file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LogError::File { path: path.clone(), source })?;
        }
        let file = File::create(&path).map_err(|source| LogError::File { path: path.clone(), source })?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().map_err(LogError::AlreadyInitialized)
}

//=========================================================================
// Unit Tests
//=========================================================================
