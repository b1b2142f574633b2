// src/window/mod.rs
//! Window management
//!
//! The desktop is modelled as a stacking order of windows, each with two
//! pin flags (always-above, always-below). [`WindowManager`] is the only
//! way the rest of the crate touches that state; [`X11WindowManager`] is the
//! real implementation and tests substitute a recording double.

pub mod arbiter;
pub mod command;
pub mod opener;
pub mod snapshot;
pub mod x11;

use crate::error::WindowResult;

pub use arbiter::{ArbitrationPhase, Arbiter, ArbiterTiming, CycleReport};
pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use opener::{UriOpener, XdgOpener};
pub use snapshot::WindowSnapshot;
pub use x11::X11WindowManager;

/// Window-manager specific identifier, e.g. `0x04600007`.
pub type WindowId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PinFlags {
    pub above: bool,
    pub below: bool,
}

impl PinFlags {
    pub fn new(above: bool, below: bool) -> Self {
        Self { above, below }
    }
}

/// One top-level window. Identity is the id.
#[derive(Debug, Clone)]
pub struct WindowHandle {
    pub id: WindowId,
    pub name: String,
    pub process_class: String,
    pub pin: PinFlags,
}

impl PartialEq for WindowHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WindowHandle {}

impl WindowHandle {
    /// Titles follow `<project><separator><rest>`.
    pub fn belongs_to_project(&self, project: &str, separator: &str) -> bool {
        self.name
            .strip_prefix(project)
            .is_some_and(|rest| rest.starts_with(separator))
    }

    pub fn is_class(&self, process_class: &str) -> bool {
        self.process_class == process_class
    }
}

/// Synchronous access to desktop window state.
///
/// Every mutating call waits for the underlying operation to finish before
/// returning.
pub trait WindowManager: Send + Sync {
    /// All top-level windows, topmost first.
    fn list_windows_in_stacking_order(&self) -> WindowResult<Vec<WindowHandle>>;

    fn query_pin_flags(&self, id: &str) -> WindowResult<PinFlags>;

    fn set_pin_above(&self, id: &str, enabled: bool) -> WindowResult<()>;

    fn set_pin_below(&self, id: &str, enabled: bool) -> WindowResult<()>;

    /// Give the window input focus and raise it.
    fn activate(&self, id: &str) -> WindowResult<()>;

    /// Bring both flags to `flags`, touching only those that differ.
    fn apply_pin_flags(&self, id: &str, current: PinFlags, flags: PinFlags) -> WindowResult<()> {
        if current.above != flags.above {
            self.set_pin_above(id, flags.above)?;
        }
        if current.below != flags.below {
            self.set_pin_below(id, flags.below)?;
        }
        Ok(())
    }
}
