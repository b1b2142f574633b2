//! Resource directory discovery and provenance-ordered lookup

use indexmap::IndexSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::{ExclusionFilter, MatchSet, Provenance, ResourceMatch, ResourceSelector};
use crate::workspace::relative_posix;

/// Conventional main resource roots, relative to a module root.
pub const MAIN_RESOURCE_DIRS: &[&str] = &[
    "src/main/resources",
    "src/resources",
    "resources",
    "WebContent/WEB-INF/classes",
    "web/WEB-INF/classes",
];

/// Build-tool output that carries copies of (or generated) resources.
pub const GENERATED_RESOURCE_DIRS: &[&str] = &[
    "build/generated/resources",
    "out/production/generated-resources",
    "target/generated-resources",
];

pub const TEST_RESOURCE_DIRS: &[&str] = &[
    "src/test/resources",
    "test/resources",
    "build/generated/resources/test",
    "out/test/resources",
    "target/test-classes",
];

/// Directory names picked up anywhere in the workspace.
const HEURISTIC_DIR_NAMES: &[&str] = &["resources", "webapp", "webcontent"];

/// Resource directories of one workspace, grouped by provenance.
#[derive(Debug, Default, Clone)]
pub struct ResourceDirectories {
    main: IndexSet<PathBuf>,
    generated: IndexSet<PathBuf>,
    test: IndexSet<PathBuf>,
}

impl ResourceDirectories {
    pub fn discover(
        workspace_root: &Path,
        modules: &[PathBuf],
        scan_depth: usize,
        filter: &ExclusionFilter,
    ) -> Self {
        let mut dirs = Self::default();

        for module in modules {
            for (provenance, conventional) in [
                (Provenance::Main, MAIN_RESOURCE_DIRS),
                (Provenance::Generated, GENERATED_RESOURCE_DIRS),
                (Provenance::Test, TEST_RESOURCE_DIRS),
            ] {
                for relative in conventional {
                    let dir = module.join(relative);
                    if dir.is_dir() {
                        dirs.insert(provenance, dir);
                    }
                }
            }
        }

        dirs.collect_heuristic(workspace_root, scan_depth, filter);

        debug!(
            "Resource directories under {}: {} main, {} generated, {} test",
            workspace_root.display(),
            dirs.main.len(),
            dirs.generated.len(),
            dirs.test.len()
        );
        dirs
    }

    fn collect_heuristic(&mut self, workspace_root: &Path, scan_depth: usize, filter: &ExclusionFilter) {
        let walker = WalkDir::new(workspace_root)
            .max_depth(scan_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !filter.is_excluded_path(workspace_root, entry.path())
            })
            .filter_map(|entry| entry.ok());

        for entry in walker {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            if !HEURISTIC_DIR_NAMES.contains(&name.as_str()) {
                continue;
            }
            let Some(relative) = relative_posix(workspace_root, entry.path()) else {
                continue;
            };
            let provenance = Provenance::classify(&relative);
            self.insert(provenance, entry.into_path());
        }
    }

    /// A directory belongs to the first provenance it was registered under.
    fn insert(&mut self, provenance: Provenance, dir: PathBuf) {
        if self.contains(&dir) {
            return;
        }
        match provenance {
            Provenance::Main => self.main.insert(dir),
            Provenance::Generated => self.generated.insert(dir),
            Provenance::Test => self.test.insert(dir),
        };
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.main.contains(dir) || self.generated.contains(dir) || self.test.contains(dir)
    }

    pub fn get(&self, provenance: Provenance) -> &IndexSet<PathBuf> {
        match provenance {
            Provenance::Main => &self.main,
            Provenance::Generated => &self.generated,
            Provenance::Test => &self.test,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.generated.is_empty() && self.test.is_empty()
    }
}

pub(crate) fn locate(
    selector: &ResourceSelector,
    workspace_root: &Path,
    directories: &ResourceDirectories,
    order: [Provenance; 3],
    filter: &ExclusionFilter,
) -> MatchSet {
    let mut matches = MatchSet::new();

    for provenance in order {
        for dir in directories.get(provenance) {
            for path in selector.find_in(dir, workspace_root, filter) {
                if let Some(found) = ResourceMatch::new(workspace_root, path, provenance) {
                    // IndexSet keeps the first entry, so earlier provenance wins
                    matches.insert(found);
                }
            }
        }
    }

    if matches.is_empty() {
        debug!(
            "No resource matched {} under {}",
            selector,
            workspace_root.display()
        );
    }
    matches
}
