// src/locator/mod.rs
//! Reference Locator
//!
//! Turns a symbolic class reference or a resource selector into concrete
//! files of a workspace. The locator is a pure filesystem query: it keeps
//! no state between calls, so two calls against an unchanged workspace
//! return identical match sets.
//!
//! Results are [`MatchSet`]s: insertion-ordered sets keyed by the path
//! relative to the workspace root. The same relative path reached through
//! two module roots is one match, and the first provenance in search order
//! wins.

pub mod class;
pub mod filtering;
pub mod pattern;
pub mod resource;

use indexmap::IndexSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::error::NavigationError;
use crate::workspace::{relative_posix, ModuleEnumerator};

pub use filtering::ExclusionFilter;
pub use pattern::ResourceSelector;
pub use resource::ResourceDirectories;

/// Where a match lives, driving search priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    Main,
    Generated,
    Test,
}

impl Provenance {
    /// Main -> Generated -> Test normally; Test first when a caller asks
    /// for a test fixture.
    pub fn search_order(test_priority: bool) -> [Provenance; 3] {
        if test_priority {
            [Provenance::Test, Provenance::Main, Provenance::Generated]
        } else {
            [Provenance::Main, Provenance::Generated, Provenance::Test]
        }
    }

    /// Classify a workspace-relative directory by its component names.
    ///
    /// A component naming a test source set or test output (see
    /// [`TEST_COMPONENTS`], case-insensitive) wins; otherwise a `build`,
    /// `target`, `out` or `generated` component marks generated output.
    pub fn classify(relative_dir: &str) -> Provenance {
        let components: Vec<String> = relative_dir
            .split('/')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if components
            .iter()
            .any(|c| TEST_COMPONENTS.contains(&c.as_str()))
        {
            Provenance::Test
        } else if components
            .iter()
            .any(|c| matches!(c.as_str(), "build" | "target" | "out" | "generated"))
        {
            Provenance::Generated
        } else {
            Provenance::Main
        }
    }
}

/// Lowercased directory names that mark test sources or test output.
pub const TEST_COMPONENTS: &[&str] = &[
    "test",
    "tests",
    "testfixtures",
    "integrationtest",
    "androidtest",
    "unittest",
    "functionaltest",
    "test-classes",
    "generated-test-sources",
];

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provenance::Main => "Main",
            Provenance::Generated => "Generated",
            Provenance::Test => "Test",
        };
        f.write_str(name)
    }
}

/// A fully-qualified class name split into package and simple name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicReference {
    package: Vec<String>,
    simple_name: String,
}

impl SymbolicReference {
    /// Parse `com.acme.Foo` (or `com.acme.Foo$Inner`, whose inner-class
    /// suffix is dropped).
    pub fn parse(raw: &str) -> Result<Self, NavigationError> {
        let outer = raw.split('$').next().unwrap_or("").trim();
        if outer.is_empty() {
            return Err(NavigationError::InvalidReference(
                "class name is empty".to_string(),
            ));
        }

        let mut segments: Vec<String> = outer.split('.').map(str::to_string).collect();
        let valid = segments.iter().all(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
        });
        if !valid {
            return Err(NavigationError::InvalidReference(format!(
                "'{}' is not a qualified class name",
                raw
            )));
        }

        let simple_name = segments.pop().unwrap_or_default();
        Ok(Self {
            package: segments,
            simple_name,
        })
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    /// Dotted package name, empty for the default package.
    pub fn package_name(&self) -> String {
        self.package.join(".")
    }

    /// Package as a relative directory (`com/acme`).
    pub fn package_dir(&self) -> PathBuf {
        self.package.iter().collect()
    }
}

impl fmt::Display for SymbolicReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.simple_name)
        } else {
            write!(f, "{}.{}", self.package_name(), self.simple_name)
        }
    }
}

/// One located file. Identity is the path relative to the workspace root.
#[derive(Debug, Clone)]
pub struct ResourceMatch {
    workspace_root: PathBuf,
    path: PathBuf,
    provenance: Provenance,
    relative: String,
}

impl ResourceMatch {
    /// `None` when `path` is not inside `workspace_root`.
    pub fn new(workspace_root: &Path, path: PathBuf, provenance: Provenance) -> Option<Self> {
        let relative = relative_posix(workspace_root, &path)?;
        Some(Self {
            workspace_root: workspace_root.to_path_buf(),
            path,
            provenance,
            relative,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// POSIX-style path relative to the workspace root.
    pub fn relative_path(&self) -> &str {
        &self.relative
    }

    /// Label shown when the caller has to choose between matches.
    pub fn display_label(&self) -> String {
        format!("{} [{}]", self.relative, self.provenance)
    }
}

impl PartialEq for ResourceMatch {
    fn eq(&self, other: &Self) -> bool {
        self.relative == other.relative
    }
}

impl Eq for ResourceMatch {}

impl Hash for ResourceMatch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relative.hash(state);
    }
}

/// Deduplicated matches in the order they were found.
pub type MatchSet = IndexSet<ResourceMatch>;

/// Entry point for both lookup kinds.
pub struct ReferenceLocator {
    modules: ModuleEnumerator,
    resource_scan_depth: usize,
    filter: ExclusionFilter,
}

impl Default for ReferenceLocator {
    fn default() -> Self {
        Self::new(&WorkspaceConfig::default())
    }
}

impl ReferenceLocator {
    pub fn new(settings: &WorkspaceConfig) -> Self {
        Self {
            modules: ModuleEnumerator::new(settings.module_scan_depth),
            resource_scan_depth: settings.resource_scan_depth,
            filter: ExclusionFilter::new(),
        }
    }

    pub fn filter(&self) -> &ExclusionFilter {
        &self.filter
    }

    /// Source file declaring `reference`, verified by its package statement.
    pub fn locate_class(&self, reference: &SymbolicReference, workspace_root: &Path) -> MatchSet {
        let modules = self.modules.enumerate(workspace_root);
        class::locate(reference, workspace_root, &modules, &self.filter)
    }

    /// Resources matching `selector`, searched in provenance order.
    pub fn locate_resource(
        &self,
        selector: &ResourceSelector,
        workspace_root: &Path,
        test_priority: bool,
    ) -> MatchSet {
        let modules = self.modules.enumerate(workspace_root);
        let directories = ResourceDirectories::discover(
            workspace_root,
            &modules,
            self.resource_scan_depth,
            &self.filter,
        );
        resource::locate(
            selector,
            workspace_root,
            &directories,
            Provenance::search_order(test_priority),
            &self.filter,
        )
    }
}

// Tests live in `src/tests/locator_class_tests.rs` and `src/tests/locator_resource_tests.rs`
