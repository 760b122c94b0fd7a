//=========================================================================
// Engine Errors
//=========================================================================
//
// Error types shared by the host layer.
//
// Every subsystem reports its own enum; `EngineError` wraps them so the
// startup sequence can use `?` throughout. A `Fatal` error means the
// engine already restored the desktop and the process should exit.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::config::ConfigError;
use crate::core::display::DisplayError;
use crate::platform::PlatformError;

//=== EngineError =========================================================

/// Top-level error returned by [`crate::Engine`] operations.
#[derive(Debug)]
pub enum EngineError {
    /// Platform (event loop) could not be created or pumped.
    Platform(PlatformError),

    /// Window or render context failure.
    Display(DisplayError),

    /// Configuration could not be read, parsed or written.
    Config(ConfigError),

    /// Unrecoverable failure; the desktop has already been restored.
    Fatal(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform(e) => write!(f, "platform error: {}", e),
            Self::Display(e) => write!(f, "display error: {}", e),
            Self::Config(e) => write!(f, "config error: {}", e),
            Self::Fatal(msg) => write!(f, "fatal error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Platform(e) => Some(e),
            Self::Display(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Fatal(_) => None,
        }
    }
}

//--- Conversions ---------------------------------------------------------

impl From<PlatformError> for EngineError {
    fn from(e: PlatformError) -> Self {
        Self::Platform(e)
    }
}

impl From<DisplayError> for EngineError {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
