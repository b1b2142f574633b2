// Waypoint - workspace reference navigation daemon
//!
//! Resolves class names and resource paths to files of a multi-module
//! workspace and brings the owning IDE window forward while the IDE jumps
//! to the file.

pub mod config;
pub mod error;
pub mod health;
pub mod locator;
pub mod navigation;
pub mod resolver;
pub mod server;
pub mod startup; // Tool checks, instance lock, autostart entry
pub mod window;
pub mod workspace;

#[cfg(test)]
pub mod tests;

// Re-export common types
pub use config::DaemonConfig;
pub use error::{NavigationError, StartupError, WindowError};
pub use locator::{MatchSet, Provenance, ReferenceLocator, ResourceMatch, ResourceSelector, SymbolicReference};
pub use navigation::{NavigationReference, NavigationRequest};
pub use resolver::{Outcome, Selector};
pub use window::{Arbiter, CycleReport, WindowManager};
pub use workspace::ProjectWorkspace;
