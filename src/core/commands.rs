//=========================================================================
// Engine Commands
//=========================================================================
//
// Console commands the host itself answers.
//
// Any thread (stdin console, game scripts, UI) may hold a
// `CommandSender`; the frame loop drains the queue once per frame on the
// main thread, so commands never race the loop.
//
// ```text
//   stdin thread ──┐
//   game/UI ───────┼──> CommandSender ──(crossbeam unbounded)──> CommandQueue::drain
//   scripts ───────┘                                                 (frame loop)
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender, TryIter};
use log::trace;

//=== Internal Dependencies ===============================================

use crate::config::args::atoi;
use crate::config::Var;

//=== EngineCommand =======================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Normal exit: write config, clean up, leave the loop.
    Quit,

    /// Change the windowed resolution.
    ScreenRes { w: i32, h: i32 },

    /// Rebuild the window, context and all GL resources.
    ResetGl,

    /// Report the frame rate; `raw` for the last frame only.
    GetFps { raw: bool },

    /// Assign an engine variable.
    SetVar { name: String, value: i32 },

    /// Print an engine variable.
    ShowVar { name: String },

    /// Anything else, handed to the game's script layer.
    Script(String),
}

impl EngineCommand {
    /// Parses one console line.
    ///
    /// Numbers are read leniently (leading digits, 0 otherwise) as the
    /// script layer does.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        let arg = |i: usize| -> Result<i32, CommandError> {
            args.get(i)
                .map(|s| atoi(s))
                .ok_or(CommandError::MissingArgument { command: "screenres", index: i + 1 })
        };

        let command = match name {
            "quit" => Self::Quit,
            "resetgl" => Self::ResetGl,
            "screenres" => Self::ScreenRes { w: arg(0)?, h: arg(1)? },
            "getfps" => Self::GetFps {
                raw: args.first().is_some_and(|a| *a == "raw" || atoi(a) != 0),
            },
            var if Var::from_name(var).is_some() => match args.first() {
                Some(value) => Self::SetVar { name: var.to_string(), value: atoi(value) },
                None => Self::ShowVar { name: var.to_string() },
            },
            _ => Self::Script(line.to_string()),
        };
        Ok(command)
    }
}

//=== CommandError ========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Blank line.
    Empty,

    /// A required argument was not given (1-based index).
    MissingArgument { command: &'static str, index: usize },

    /// The loop has shut down and no longer receives commands.
    Disconnected,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::MissingArgument { command, index } => {
                write!(f, "{}: missing argument {}", command, index)
            }
            Self::Disconnected => write!(f, "engine is no longer running"),
        }
    }
}

impl std::error::Error for CommandError {}

//=== CommandSender =======================================================

/// Cloneable handle for submitting commands to the loop.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<EngineCommand>,
}

impl CommandSender {
    pub fn send(&self, command: EngineCommand) -> Result<(), CommandError> {
        trace!(target: "engine::commands", "Queued {:?}", command);
        self.tx.send(command).map_err(|_| CommandError::Disconnected)
    }

    /// Parses and queues a console line.
    pub fn send_line(&self, line: &str) -> Result<(), CommandError> {
        self.send(EngineCommand::parse(line)?)
    }
}

//=== CommandQueue ========================================================

/// Receiving end, owned by the engine.
#[derive(Debug)]
pub struct CommandQueue {
    tx: Sender<EngineCommand>,
    rx: Receiver<EngineCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender { tx: self.tx.clone() }
    }

    /// Commands queued so far; never blocks.
    pub fn drain(&self) -> TryIter<'_, EngineCommand> {
        self.rx.try_iter()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
