//=========================================================================
// Init State
//=========================================================================
//
// Tracks which startup phase the engine is in and which settings changed
// too late to take effect without a restart of the affected subsystem.
//
// ```text
//   Reset ──> Load ──> Game ──> NotIniting
//   (args)   (configs) (game cfg) (main loop)
// ```
//
// A setting that needs e.g. a new window is applied directly while the
// engine is still early enough in startup; afterwards it is queued as a
// pending change and the UI offers to apply it.
//
//=========================================================================

//=== External Dependencies ===============================================

use bitflags::bitflags;
use log::info;

//=== InitPhase ===========================================================

/// Startup phase, ordered from earliest to fully running.
///
/// Ordering is by how "late" a change can be made: `NotIniting` is the
/// least permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InitPhase {
    NotIniting,
    Reset,
    Load,
    Game,
}

bitflags! {
    /// Subsystems a pending change requires restarting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeKind: u8 {
        const GFX = 1 << 0;
        const SOUND = 1 << 1;
        const SHADERS = 1 << 2;
    }
}

/// A setting change waiting for a subsystem restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub desc: String,
    pub kind: ChangeKind,
}

//=== InitState ===========================================================

#[derive(Debug, Clone)]
pub struct InitState {
    phase: InitPhase,
    changes: Vec<PendingChange>,
}

impl InitState {
    /// Starts in the `Reset` phase, as the engine does on launch.
    pub fn new() -> Self {
        Self {
            phase: InitPhase::Reset,
            changes: Vec::new(),
        }
    }

    pub fn phase(&self) -> InitPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: InitPhase) {
        self.phase = phase;
    }

    /// True during any startup phase.
    pub fn is_initing(&self) -> bool {
        self.phase != InitPhase::NotIniting
    }

    //--- Pending Changes --------------------------------------------------

    /// Records `desc` as pending if startup has progressed past `level`.
    ///
    /// Returns `true` when the change was deferred (the caller must not
    /// apply it now).
    pub fn init_warning(&mut self, desc: &str, level: InitPhase, kind: ChangeKind) -> bool {
        if self.phase < level {
            self.add_change(desc, kind);
            return true;
        }
        false
    }

    /// Queues a change, ignoring duplicates by description.
    pub fn add_change(&mut self, desc: &str, kind: ChangeKind) {
        if self.changes.iter().any(|c| c.desc == desc) {
            return;
        }
        info!(target: "engine::init", "Pending change: {} ({:?})", desc, kind);
        self.changes.push(PendingChange { desc: desc.to_string(), kind });
    }

    /// Drops pending changes of the given kinds (after the restart).
    pub fn clear_changes(&mut self, kinds: ChangeKind) {
        self.changes.retain(|c| !c.kind.intersects(kinds));
    }

    pub fn pending_changes(&self) -> &[PendingChange] {
        &self.changes
    }
}

impl Default for InitState {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
