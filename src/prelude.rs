//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use strafe_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder, FrameControl};
pub use crate::error::EngineError;

// Configuration
pub use crate::config::{Args, DedicatedMode, EngineVars, SoundConfig, Var};

// Collaborator seams
pub use crate::core::{
    Backend, Display, EventSource, Game, InputSink, LoadingHooks, LoadingView, NativeSurface, NullRenderer,
    RenderContext,
};

// Loop state
pub use crate::core::{CommandSender, EngineCommand, GameClock, InitPhase};

// Input
pub use crate::core::input::{KeyCode, MouseButton};

// Platform
pub use crate::platform::WinitBackend;
