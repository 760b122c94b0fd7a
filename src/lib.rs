//=========================================================================
// Strafe Engine — Library Root
//
// Host layer of a first-person shooter engine: startup, window and
// render-context creation, the event pump, frame pacing and the
// top-level update/render loop.
//
// Responsibilities:
// - Expose the engine entry point (`EngineBuilder`, `Engine`)
// - Define the seams to the subsystems owned elsewhere (`core::Game`,
//   `core::RenderContext`, `core::Display`, `core::EventSource`)
// - Provide the winit backend (`platform`)
//
// Typical usage:
// ```no_run
// use strafe_engine::config::Args;
// use strafe_engine::core::NullRenderer;
// use strafe_engine::platform::WinitBackend;
// use strafe_engine::EngineBuilder;
// # use strafe_engine::core::{Game, InputSink, LoadingHooks};
// # struct MyGame;
// # impl InputSink for MyGame {
// #     fn process_key(&mut self, _: i32, _: bool) {}
// #     fn process_text_input(&mut self, _: &str) {}
// #     fn ui_move_cursor(&mut self, _: i32, _: i32) -> bool { false }
// #     fn mouse_move(&mut self, _: i32, _: i32) {}
// # }
// # impl LoadingHooks for MyGame {}
// # impl Game for MyGame {}
//
// let args = Args::parse(std::env::args().skip(1));
// EngineBuilder::new(MyGame, NullRenderer::new())
//     .run(&args, WinitBackend::new)
//     .unwrap();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the loop's building blocks and collaborator traits,
// `config` the command line, init config and engine variables.
//
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod platform;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, FrameControl};
pub use error::EngineError;
