//! Window Snapshot Service

use indexmap::IndexMap;
use tracing::debug;

use super::{PinFlags, WindowHandle, WindowManager};
use crate::error::WindowResult;

/// Pin flags of every window at one instant, in stacking order (topmost
/// first). Never mutated once captured.
#[derive(Debug, Clone)]
pub struct WindowSnapshot {
    windows: IndexMap<String, WindowHandle>,
}

impl WindowSnapshot {
    pub fn capture(manager: &dyn WindowManager) -> WindowResult<Self> {
        let windows = manager.list_windows_in_stacking_order()?;
        debug!("Captured {} windows", windows.len());
        Ok(Self::from_windows(windows))
    }

    pub fn from_windows(windows: Vec<WindowHandle>) -> Self {
        Self {
            windows: windows.into_iter().map(|w| (w.id.clone(), w)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.windows.contains_key(id)
    }

    pub fn flags(&self, id: &str) -> Option<PinFlags> {
        self.windows.get(id).map(|w| w.pin)
    }

    pub fn get(&self, id: &str) -> Option<&WindowHandle> {
        self.windows.get(id)
    }

    /// Topmost first.
    pub fn windows(&self) -> impl DoubleEndedIterator<Item = &WindowHandle> {
        self.windows.values()
    }

    /// First window whose title follows the project convention.
    pub fn find_project_window(&self, project: &str, separator: &str) -> Option<&WindowHandle> {
        self.windows()
            .find(|w| w.belongs_to_project(project, separator))
    }
}
