// src/workspace/mod.rs
//! Project workspace resolution
//!
//! A request names a project; this module turns that name into the root
//! directory every locator search is relative to. Roots come from explicit
//! overrides in the config, or from `<projects_dir>/<project>`.

pub mod modules;

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{expand_path, WorkspaceConfig};
use crate::error::NavigationError;

pub use modules::ModuleEnumerator;

/// A resolved project: its name as the IDE knows it and its root on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectWorkspace {
    pub name: String,
    pub root: PathBuf,
}

impl ProjectWorkspace {
    /// Resolve a project name against the workspace settings.
    ///
    /// The name must be a plain identifier (`[A-Za-z0-9_-]+`) so it can
    /// never escape the projects directory.
    pub fn resolve(project: &str, settings: &WorkspaceConfig) -> Result<Self, NavigationError> {
        validate_project_name(project)?;

        let candidate = match settings.projects.get(project) {
            Some(path) => expand_path(path),
            None => expand_path(&settings.projects_dir).join(project),
        };

        if !candidate.is_dir() {
            return Err(NavigationError::UnknownProject(format!(
                "{} (no directory at {})",
                project,
                candidate.display()
            )));
        }

        // Canonical root keeps relative paths stable when projects_dir is a symlink
        let root = candidate.canonicalize().unwrap_or(candidate);
        debug!("Project '{}' resolved to {}", project, root.display());

        Ok(Self {
            name: project.to_string(),
            root,
        })
    }

    /// Workspace rooted at an arbitrary directory, bypassing config lookup.
    pub fn at(name: impl Into<String>, root: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            root: root.as_ref().to_path_buf(),
        }
    }
}

pub fn validate_project_name(project: &str) -> Result<(), NavigationError> {
    let valid = !project.is_empty()
        && project
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(NavigationError::InvalidReference(format!(
            "project name '{}' must match [A-Za-z0-9_-]+",
            project
        )))
    }
}

/// POSIX-style rendering of `path` relative to `root`.
pub fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

// Tests live in `src/tests/workspace_tests.rs`
