//=========================================================================
// Command Line
//=========================================================================
//
// Parses the engine's glued-value options (`-w1280`, `-umy/home`).
//
// Options:
// ```text
//  -?, --help    Show usage
//  -u<PATH>      Set the home directory
//  -g[FILE]      Log to FILE (default log.txt) under the home directory
//  -k<PATH>      Add a package directory
//  -d[MODE]      Dedicated mode (1 = listen server, 2 = headless)
//  -w<WIDTH>     Screen width (height becomes automatic unless -h given)
//  -h<HEIGHT>    Screen height (width becomes automatic unless -w given)
//  -f<MODE>      Fullscreen (0 or 1)
//  -l<FILE>      Load a map at startup
//  -x<SCRIPT>    Run a script after init
// ```
//
// Anything else is forwarded to the game untouched.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::PathBuf;

//=== Internal Dependencies ===============================================

use crate::core::display::{SCR_MAXH, SCR_MAXW, SCR_MINH, SCR_MINW};

//=== DedicatedMode =======================================================

/// Server role requested with `-d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedicatedMode {
    /// Normal client.
    #[default]
    Off,

    /// Client with a listen server (`-d1`).
    Listen,

    /// Server only, no window (`-d`, `-d2`).
    Headless,
}

impl DedicatedMode {
    fn from_arg(value: &str) -> Self {
        match atoi(value) {
            1 => Self::Listen,
            _ => Self::Headless,
        }
    }

    /// True when a server runs in this process.
    pub fn hosts_server(self) -> bool {
        self != Self::Off
    }
}

//=== Args ================================================================

/// Parsed command line.
///
/// Resolution overrides use `-1` for "derive from the desktop", exactly as
/// the engine variables do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    pub help: bool,
    pub home_dir: Option<PathBuf>,
    /// `Some` when `-g` was given; `-g` alone selects `log.txt`.
    pub log_file: Option<PathBuf>,
    pub package_dirs: Vec<PathBuf>,
    pub dedicated: DedicatedMode,
    pub screen_w: Option<i32>,
    pub screen_h: Option<i32>,
    pub fullscreen: Option<bool>,
    pub load_map: Option<String>,
    pub init_script: Option<String>,
    /// Unrecognised options and bare words, in order.
    pub game_args: Vec<String>,
}

impl Args {
    /// Parses the arguments that follow the program name.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut parsed = Args::default();

        if args.iter().any(|a| is_help(a)) {
            parsed.help = true;
            return parsed;
        }

        let has_w = args.iter().any(|a| a.starts_with("-w"));
        let has_h = args.iter().any(|a| a.starts_with("-h"));

        for arg in &args {
            let Some(rest) = arg.strip_prefix('-') else {
                parsed.game_args.push(arg.clone());
                continue;
            };
            let mut chars = rest.chars();
            let Some(flag) = chars.next() else {
                parsed.game_args.push(arg.clone());
                continue;
            };
            let value = chars.as_str();

            match flag {
                // first -u wins; it is resolved before anything else
                'u' => {
                    if parsed.home_dir.is_none() {
                        parsed.home_dir = Some(PathBuf::from(value));
                    }
                }
                'g' => {
                    if parsed.log_file.is_none() {
                        let file = if value.is_empty() { "log.txt" } else { value };
                        parsed.log_file = Some(PathBuf::from(file));
                    }
                }
                'k' => parsed.package_dirs.push(PathBuf::from(value)),
                'd' => parsed.dedicated = DedicatedMode::from_arg(value),
                'w' => {
                    parsed.screen_w = Some(atoi(value).clamp(SCR_MINW, SCR_MAXW));
                    if !has_h {
                        parsed.screen_h = Some(-1);
                    }
                }
                'h' => {
                    parsed.screen_h = Some(atoi(value).clamp(SCR_MINH, SCR_MAXH));
                    if !has_w {
                        parsed.screen_w = Some(-1);
                    }
                }
                'f' => parsed.fullscreen = Some(atoi(value) != 0),
                'l' => parsed.load_map = Some(strip_media_prefix(value)),
                'x' => parsed.init_script = Some(value.to_string()),
                _ => parsed.game_args.push(arg.clone()),
            }
        }

        parsed
    }

    /// Usage text printed for `--help`.
    pub fn usage(program: &str) -> String {
        format!(
            "Usage: {program} [options] [game options]\n\n\
             Options:\n \
             -?, --help   Show this help\n \
             -u<PATH>     Set the home directory\n \
             -g<FILE>     Set the log file\n \
             -k<PATH>     Add a package directory\n \
             -d[MODE]     Set dedicated mode (0, 1 or 2)\n \
             -w<WIDTH>    Set screen width\n \
             -h<HEIGHT>   Set screen height\n \
             -f<MODE>     Set fullscreen mode (0 or 1)\n \
             -l<FILE>     Load a specific map\n \
             -x<FILE>     Run a custom init script\n"
        )
    }
}

//=== Helpers =============================================================

fn is_help(arg: &str) -> bool {
    matches!(arg, "-?" | "--help" | "-h" | "-help")
}

/// C-style integer prefix parse: optional sign then digits, 0 otherwise.
pub(crate) fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1i64, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    (sign * value).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Map paths given with their package directory are made package-relative.
fn strip_media_prefix(value: &str) -> String {
    const PKGDIR: &str = "media/";
    let normalized = value.replace('\\', "/");
    match normalized.find(PKGDIR) {
        Some(pos) => normalized[pos + PKGDIR.len()..].to_string(),
        None => value.to_string(),
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_variants() {
        for flag in ["-?", "--help", "-h", "-help"] {
            assert!(Args::parse([flag]).help, "{} should request help", flag);
        }
        assert!(!Args::parse(["-h768"]).help);
    }

    #[test]
    fn width_alone_makes_height_automatic() {
        let args = Args::parse(["-w1280"]);
        assert_eq!(args.screen_w, Some(1280));
        assert_eq!(args.screen_h, Some(-1));
    }

    #[test]
    fn height_alone_makes_width_automatic() {
        let args = Args::parse(["-h900"]);
        assert_eq!(args.screen_h, Some(900));
        assert_eq!(args.screen_w, Some(-1));
    }

    #[test]
    fn width_and_height_together() {
        let args = Args::parse(["-w1024", "-h768"]);
        assert_eq!(args.screen_w, Some(1024));
        assert_eq!(args.screen_h, Some(768));
    }

    #[test]
    fn resolution_clamped() {
        let args = Args::parse(["-w10", "-h99999"]);
        assert_eq!(args.screen_w, Some(SCR_MINW));
        assert_eq!(args.screen_h, Some(SCR_MAXH));
    }

    #[test]
    fn dedicated_modes() {
        assert_eq!(Args::parse(["-d"]).dedicated, DedicatedMode::Headless);
        assert_eq!(Args::parse(["-d0"]).dedicated, DedicatedMode::Headless);
        assert_eq!(Args::parse(["-d1"]).dedicated, DedicatedMode::Listen);
        assert_eq!(Args::parse(["-d2"]).dedicated, DedicatedMode::Headless);
        assert_eq!(Args::parse::<[&str; 0], &str>([]).dedicated, DedicatedMode::Off);
    }

    #[test]
    fn log_file_default_name() {
        assert_eq!(Args::parse(["-g"]).log_file, Some(PathBuf::from("log.txt")));
        assert_eq!(Args::parse(["-gdebug.log"]).log_file, Some(PathBuf::from("debug.log")));
    }

    #[test]
    fn first_home_dir_wins() {
        let args = Args::parse(["-ufirst", "-usecond"]);
        assert_eq!(args.home_dir, Some(PathBuf::from("first")));
    }

    #[test]
    fn package_dirs_accumulate() {
        let args = Args::parse(["-kbase", "-kextra"]);
        assert_eq!(args.package_dirs, vec![PathBuf::from("base"), PathBuf::from("extra")]);
    }

    #[test]
    fn map_path_is_made_package_relative() {
        assert_eq!(Args::parse(["-lmedia/map/dust"]).load_map.as_deref(), Some("map/dust"));
        assert_eq!(Args::parse(["-lC:\\games\\media\\map\\dust"]).load_map.as_deref(), Some("map/dust"));
        assert_eq!(Args::parse(["-lcomplex"]).load_map.as_deref(), Some("complex"));
    }

    #[test]
    fn unknown_options_forwarded_in_order() {
        let args = Args::parse(["-f1", "-ysomething", "bare", "-xautoexec"]);
        assert_eq!(args.fullscreen, Some(true));
        assert_eq!(args.init_script.as_deref(), Some("autoexec"));
        assert_eq!(args.game_args, vec!["-ysomething".to_string(), "bare".to_string()]);
    }

    #[test]
    fn atoi_matches_c_semantics() {
        assert_eq!(atoi("42"), 42);
        assert_eq!(atoi("-7x"), -7);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi(""), 0);
        assert_eq!(atoi("99999999999"), i32::MAX);
    }

    #[test]
    fn usage_lists_options() {
        let text = Args::usage("strafe");
        assert!(text.starts_with("Usage: strafe"));
        assert!(text.contains("-x<FILE>"));
    }
}
