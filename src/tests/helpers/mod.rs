pub mod desktop;
pub mod tempdir;
pub mod workspace;

// Re-export the most used helpers for easy access
pub use desktop::{RecordingOpener, RecordingWindowManager, ScriptedRunner, ScriptedSelector, WmEvent};
pub use tempdir::unique_temp_dir;
pub use workspace::WorkspaceFixture;
