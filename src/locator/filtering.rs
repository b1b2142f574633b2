//! Exclusion of build/output directories from locator walks
//!
//! Build temp output and tool metadata are never matches. The one exception
//! is anything under a `resources` directory: generated resource copies are
//! legitimate results even when they live below an excluded directory.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::workspace::relative_posix;

/// Workspace-relative directories excluded from every search.
pub const EXCLUDED_DIRECTORIES: &[&str] = &[
    "build/tmp",
    "build/kotlin",
    ".gradle",
    ".git",
    ".idea",
    "node_modules",
];

#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    excluded: GlobSet,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionFilter {
    pub fn new() -> Self {
        let mut builder = GlobSetBuilder::new();
        for dir in EXCLUDED_DIRECTORIES {
            // The directory itself and everything below it
            for pattern in [format!("**/{}", dir), format!("**/{}/**", dir)] {
                let glob = GlobBuilder::new(&pattern)
                    .literal_separator(true)
                    .build()
                    .expect("exclusion patterns are valid globs");
                builder.add(glob);
            }
        }
        Self {
            excluded: builder.build().expect("exclusion patterns are valid globs"),
        }
    }

    /// `relative` is a POSIX path relative to the workspace root.
    pub fn is_excluded(&self, relative: &str) -> bool {
        if relative.split('/').any(|c| c.eq_ignore_ascii_case("resources")) {
            return false;
        }
        self.excluded.is_match(relative)
    }

    pub fn is_excluded_path(&self, workspace_root: &Path, path: &Path) -> bool {
        match relative_posix(workspace_root, path) {
            Some(relative) => self.is_excluded(&relative),
            None => false,
        }
    }

    /// Regular files below `dir`, skipping excluded subtrees, in a stable order.
    pub fn walk_files<'a>(
        &'a self,
        dir: &Path,
        workspace_root: &'a Path,
        max_depth: Option<usize>,
    ) -> impl Iterator<Item = DirEntry> + 'a {
        let mut walker = WalkDir::new(dir).sort_by_file_name();
        if let Some(depth) = max_depth {
            walker = walker.max_depth(depth);
        }
        walker
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0 || !self.is_excluded_path(workspace_root, entry.path())
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
    }
}
