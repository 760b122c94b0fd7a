//! Standalone engine binary.
//!
//! Usage:
//!   strafe [-u<home>] [-g[log]] [-d[mode]] [-w<w>] [-h<h>] [-f<0|1>] [-l<map>] [-x<script>]
//!
//! Runs the host loop with a sandbox game and the null renderer. Lines
//! typed on stdin are console commands:
//!   quit                 - Exit, writing the init config
//!   screenres <w> <h>    - Resize the window
//!   resetgl              - Rebuild window and context
//!   getfps [raw]         - Report the frame rate
//!   <var> [value]        - Show or assign an engine variable

use std::io::{BufRead, Write};

use anyhow::Context;
use log::{debug, info};
use strafe_engine::config::{default_home_dir, Args};
use strafe_engine::core::{CommandSender, Game, InputSink, LoadingHooks, LoadingView, NullRenderer};
use strafe_engine::logging;
use strafe_engine::platform::WinitBackend;
use strafe_engine::EngineBuilder;

/// Stand-in game: no world, just enough to drive the loop.
#[derive(Default)]
struct Sandbox {
    map: Option<String>,
}

impl InputSink for Sandbox {
    fn process_key(&mut self, code: i32, pressed: bool) {
        debug!(target: "sandbox", "key {} {}", code, if pressed { "down" } else { "up" });
    }

    fn process_text_input(&mut self, text: &str) {
        debug!(target: "sandbox", "text {:?}", text);
    }

    fn ui_move_cursor(&mut self, _dx: i32, _dy: i32) -> bool {
        self.map.is_none()
    }

    fn mouse_move(&mut self, _dx: i32, _dy: i32) {}
}

impl LoadingHooks for Sandbox {}

impl Game for Sandbox {
    fn in_main_menu(&self) -> bool {
        self.map.is_none()
    }

    fn change_map(&mut self, name: &str, loading: &mut LoadingView<'_>) {
        for step in 0..4 {
            loading.render_progress(step as f32 / 4.0, Some("loading map..."), step == 0, self);
        }
        info!(target: "sandbox", "Map {} loaded", name);
        self.map = Some(name.to_string());
    }

    fn execute(&mut self, script: &str) {
        info!(target: "sandbox", "Unknown command: {}", script);
    }
}

/// Feeds stdin lines to the engine until it stops listening.
fn spawn_console(commands: CommandSender) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Err(e) = commands.send_line(line) {
                eprintln!("{}", e);
                if matches!(e, strafe_engine::core::CommandError::Disconnected) {
                    break;
                }
            }
        }
    });
}

fn main() -> anyhow::Result<()> {
    let program = std::env::args().next().unwrap_or_else(|| "strafe".into());
    let args = Args::parse(std::env::args().skip(1));
    if args.help {
        print!("{}", Args::usage(&program));
        return Ok(());
    }

    let home = args.home_dir.clone().unwrap_or_else(default_home_dir);
    logging::init(&home, args.log_file.as_deref()).context("initialise logging")?;
    info!(target: "engine", "{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let builder = EngineBuilder::new(Sandbox::default(), NullRenderer::new()).with_home_dir(home);
    spawn_console(builder.commands());

    builder.run(&args, WinitBackend::new).context("engine stopped")?;
    Ok(())
}
