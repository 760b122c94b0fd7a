//=========================================================================
// Core Systems
//
// Everything the host loop is built from, independent of any windowing
// backend.
//
// Responsibilities:
// - Keep time deterministically (`clock`) and pace frames
//   (`frame_limiter`, `fps_history`)
// - Route platform input to the game (`input`)
// - Own window sizing, gamma and vsync state (`display`)
// - Draw loading screens between frames (`progress`)
// - Track startup phases and deferred changes (`init_state`)
// - Define the collaborator seams (`Game`, `RenderContext`, `Display`,
//   `EventSource`)
//
// Notes:
// Nothing in here spawns threads. The only cross-thread path is the
// command queue, which any thread may feed and the loop drains.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod clock;
pub mod commands;
pub mod display;
pub mod fps_history;
pub mod frame_limiter;
pub mod game;
pub mod init_state;
pub mod input;
pub mod progress;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;

//=== Public API ==========================================================

pub use clock::{GameClock, SystemTime, TimeSource};
pub use commands::{CommandError, CommandQueue, CommandSender, EngineCommand};
pub use display::{Display, DisplayError, GlVersion, Screen, WindowSpec};
pub use fps_history::{FpsHistory, FpsStats};
pub use frame_limiter::FrameLimiter;
pub use game::Game;
pub use init_state::{ChangeKind, InitPhase, InitState};
pub use input::{Backend, EventSource, InputSink};
pub use progress::{BackgroundInfo, LoadingHooks, LoadingScreen, LoadingView};
pub use render::{HudItem, HudTexture, NativeSurface, NullRenderer, RenderContext};
