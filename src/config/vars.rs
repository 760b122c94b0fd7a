//=========================================================================
// Engine Variables
//=========================================================================
//
// Named integer settings owned by the host layer.
//
// Each variable has a fixed range and default. Assignments clamp into
// range (with a warning) instead of failing, matching how console
// variables behave in the rest of the engine. Read-only variables are
// published by the engine (e.g. desktop size) and rejected on assignment.
//
// Side effects of a change (fullscreen toggle, clock reset, vsync...)
// are not applied here; the caller inspects the returned `Var` and
// dispatches the hook.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;

//=== Internal Dependencies ===============================================

use super::ConfigError;
use crate::core::display::{SCR_MAXH, SCR_MAXW, SCR_MINH, SCR_MINW};

//=== Var =================================================================

/// Identifies one engine variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    DesktopW,
    DesktopH,
    ScreenW,
    ScreenH,
    MenuMute,
    MenuFps,
    MaxFps,
    ClockError,
    ClockFix,
    NumCpus,
    ProgressBackground,
    RelativeMouse,
    TextInputFilter,
    Fullscreen,
    Gamma,
    Vsync,
    VsyncTear,
    DbgModes,
}

/// Static description of a variable: name, range, default, flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSpec {
    pub name: &'static str,
    pub min: i32,
    pub default: i32,
    pub max: i32,
    pub read_only: bool,
    /// Saved with the user's config by the scripting layer.
    pub persist: bool,
}

const fn ranged(name: &'static str, min: i32, default: i32, max: i32) -> VarSpec {
    VarSpec { name, min, default, max, read_only: false, persist: false }
}

const fn persistent(name: &'static str, min: i32, default: i32, max: i32) -> VarSpec {
    VarSpec { name, min, default, max, read_only: false, persist: true }
}

const fn read_only(name: &'static str, default: i32) -> VarSpec {
    VarSpec { name, min: default, default, max: default, read_only: true, persist: false }
}

#[cfg(debug_assertions)]
const DEFAULT_FULLSCREEN: i32 = 0;
#[cfg(not(debug_assertions))]
const DEFAULT_FULLSCREEN: i32 = 1;

impl Var {
    /// Every variable, in declaration order.
    pub const ALL: [Var; 18] = [
        Var::DesktopW,
        Var::DesktopH,
        Var::ScreenW,
        Var::ScreenH,
        Var::MenuMute,
        Var::MenuFps,
        Var::MaxFps,
        Var::ClockError,
        Var::ClockFix,
        Var::NumCpus,
        Var::ProgressBackground,
        Var::RelativeMouse,
        Var::TextInputFilter,
        Var::Fullscreen,
        Var::Gamma,
        Var::Vsync,
        Var::VsyncTear,
        Var::DbgModes,
    ];

    pub const fn spec(self) -> VarSpec {
        match self {
            Var::DesktopW => read_only("desktopw", 0),
            Var::DesktopH => read_only("desktoph", 0),
            // -1 means "derive from desktop"; only the engine stores it
            Var::ScreenW => ranged("screenw", SCR_MINW, -1, SCR_MAXW),
            Var::ScreenH => ranged("screenh", SCR_MINH, -1, SCR_MAXH),
            Var::MenuMute => ranged("menumute", 0, 1, 1),
            Var::MenuFps => ranged("menufps", 0, 60, 1000),
            Var::MaxFps => persistent("maxfps", 0, 125, 1000),
            Var::ClockError => persistent("clockerror", 990_000, 1_000_000, 1_010_000),
            Var::ClockFix => persistent("clockfix", 0, 0, 1),
            Var::NumCpus => ranged("numcpus", 1, 1, 16),
            Var::ProgressBackground => ranged("progressbackground", 0, 0, 1),
            Var::RelativeMouse => persistent("relativemouse", 0, 1, 1),
            Var::TextInputFilter => ranged("textinputfilter", 0, 5, 1000),
            Var::Fullscreen => ranged("fullscreen", 0, DEFAULT_FULLSCREEN, 1),
            Var::Gamma => persistent("gamma", 30, 100, 300),
            Var::Vsync => persistent("vsync", 0, 0, 1),
            Var::VsyncTear => persistent("vsynctear", 0, 0, 1),
            Var::DbgModes => ranged("dbgmodes", 0, 0, 1),
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Looks a variable up by its console name.
    pub fn from_name(name: &str) -> Option<Var> {
        Var::ALL.iter().copied().find(|v| v.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

//=== EngineVars ==========================================================

/// Current values of every [`Var`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVars {
    values: [i32; Var::ALL.len()],
}

impl EngineVars {
    /// Creates the variable table with every default applied.
    pub fn new() -> Self {
        let mut values = [0; Var::ALL.len()];
        for var in Var::ALL {
            values[var.index()] = var.spec().default;
        }
        Self { values }
    }

    //--- Access -----------------------------------------------------------

    pub fn get(&self, var: Var) -> i32 {
        self.values[var.index()]
    }

    /// Convenience for 0/1 variables.
    pub fn flag(&self, var: Var) -> bool {
        self.get(var) != 0
    }

    //--- Assignment -------------------------------------------------------

    /// Assigns a value from user input (console, config).
    ///
    /// Out-of-range values are clamped with a warning. Returns `true` if
    /// the stored value changed.
    pub fn set(&mut self, var: Var, value: i32) -> Result<bool, ConfigError> {
        let spec = var.spec();
        if spec.read_only {
            return Err(ConfigError::ReadOnlyVar(spec.name));
        }

        let clamped = value.clamp(spec.min, spec.max);
        if clamped != value {
            warn!(
                target: "config",
                "valid range for {} is {}..{}, using {}",
                spec.name, spec.min, spec.max, clamped
            );
        }

        let slot = &mut self.values[var.index()];
        let changed = *slot != clamped;
        *slot = clamped;
        Ok(changed)
    }

    /// Assigns by console name.
    pub fn set_by_name(&mut self, name: &str, value: i32) -> Result<(Var, bool), ConfigError> {
        let var = Var::from_name(name).ok_or_else(|| ConfigError::UnknownVar(name.to_string()))?;
        let changed = self.set(var, value)?;
        Ok((var, changed))
    }

    /// Stores a value without range checks or read-only protection.
    ///
    /// Used by the engine for values it owns (desktop size, the `-1`
    /// "automatic" resolution marker).
    pub(crate) fn force(&mut self, var: Var, value: i32) {
        self.values[var.index()] = value;
    }
}

impl Default for EngineVars {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let vars = EngineVars::new();
        assert_eq!(vars.get(Var::MaxFps), 125);
        assert_eq!(vars.get(Var::MenuFps), 60);
        assert_eq!(vars.get(Var::ClockError), 1_000_000);
        assert_eq!(vars.get(Var::Gamma), 100);
        assert_eq!(vars.get(Var::TextInputFilter), 5);
        assert_eq!(vars.get(Var::ScreenW), -1);
        assert_eq!(vars.get(Var::ScreenH), -1);
        assert!(vars.flag(Var::RelativeMouse));
        assert!(vars.flag(Var::MenuMute));
    }

    #[test]
    fn set_clamps_into_range() {
        let mut vars = EngineVars::new();
        assert!(vars.set(Var::Gamma, 1000).unwrap());
        assert_eq!(vars.get(Var::Gamma), 300);

        vars.set(Var::Gamma, 0).unwrap();
        assert_eq!(vars.get(Var::Gamma), 30);
    }

    #[test]
    fn set_reports_unchanged_value() {
        let mut vars = EngineVars::new();
        assert!(!vars.set(Var::MaxFps, 125).unwrap());
        assert!(vars.set(Var::MaxFps, 200).unwrap());
    }

    #[test]
    fn read_only_rejected() {
        let mut vars = EngineVars::new();
        let err = vars.set(Var::DesktopW, 1920).unwrap_err();
        assert!(matches!(err, ConfigError::ReadOnlyVar("desktopw")));
        assert_eq!(vars.get(Var::DesktopW), 0);
    }

    #[test]
    fn force_bypasses_checks() {
        let mut vars = EngineVars::new();
        vars.force(Var::DesktopW, 2560);
        vars.force(Var::ScreenW, -1);
        assert_eq!(vars.get(Var::DesktopW), 2560);
        assert_eq!(vars.get(Var::ScreenW), -1);
    }

    #[test]
    fn screen_size_cannot_be_set_to_auto_from_console() {
        let mut vars = EngineVars::new();
        vars.set(Var::ScreenW, -1).unwrap();
        assert_eq!(vars.get(Var::ScreenW), SCR_MINW);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(Var::from_name("vsynctear"), Some(Var::VsyncTear));
        assert_eq!(Var::from_name("nope"), None);

        let mut vars = EngineVars::new();
        let (var, changed) = vars.set_by_name("menufps", 30).unwrap();
        assert_eq!(var, Var::MenuFps);
        assert!(changed);
        assert!(matches!(
            vars.set_by_name("bogus", 1),
            Err(ConfigError::UnknownVar(_))
        ));
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in Var::ALL.iter().enumerate() {
            for b in &Var::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
