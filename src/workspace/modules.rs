//! Module Enumerator
//!
//! Discovers every build module of a workspace: directories carrying a
//! build descriptor (Gradle, Maven, IntelliJ module files), sub-projects
//! declared in `settings.gradle[.kts]`, and `<module>` entries of the root
//! `pom.xml`. Discovery is best effort. Anything unreadable is skipped and
//! the workspace root is always part of the result.

use indexmap::IndexSet;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File names that mark a directory as a module root.
pub const MODULE_MARKERS: &[&str] = &["build.gradle", "build.gradle.kts", "pom.xml"];

/// Multi-module settings files read from the workspace root.
pub const SETTINGS_FILES: &[&str] = &["settings.gradle", "settings.gradle.kts"];

/// Directories never descended into while looking for markers.
const SKIPPED_DIRS: &[&str] = &[".git", ".gradle", ".idea", "node_modules", "build", "target", "out"];

pub struct ModuleEnumerator {
    max_depth: usize,
}

impl Default for ModuleEnumerator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ModuleEnumerator {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Ordered module roots, workspace root first, without duplicates.
    pub fn enumerate(&self, workspace_root: &Path) -> Vec<PathBuf> {
        let mut roots: IndexSet<PathBuf> = IndexSet::new();
        roots.insert(workspace_root.to_path_buf());

        self.collect_marker_dirs(workspace_root, &mut roots);

        for settings in SETTINGS_FILES {
            for module in read_settings_includes(&workspace_root.join(settings)) {
                let dir = workspace_root.join(module);
                if dir.is_dir() {
                    roots.insert(dir);
                }
            }
        }

        for module in read_maven_modules(&workspace_root.join("pom.xml")) {
            let dir = workspace_root.join(module);
            if dir.is_dir() {
                roots.insert(dir);
            }
        }

        debug!(
            "Enumerated {} module roots under {}",
            roots.len(),
            workspace_root.display()
        );
        roots.into_iter().collect()
    }

    fn collect_marker_dirs(&self, workspace_root: &Path, roots: &mut IndexSet<PathBuf>) {
        let walker = WalkDir::new(workspace_root)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !is_skipped_dir(entry.file_name().to_str().unwrap_or(""))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry during module scan: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_module_marker(entry.path()) {
                continue;
            }
            if let Some(parent) = entry.path().parent() {
                if parent != workspace_root {
                    roots.insert(parent.to_path_buf());
                }
            }
        }
    }
}

fn is_skipped_dir(name: &str) -> bool {
    SKIPPED_DIRS.contains(&name)
}

fn is_module_marker(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    MODULE_MARKERS.contains(&name) || name.ends_with(".iml")
}

fn quoted_string_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("static regex"))
}

fn maven_module_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<module>\s*([^<]+?)\s*</module>").expect("static regex"))
}

/// Relative module directories declared by `include` statements.
///
/// Handles Gradle project paths (`":core:api"` -> `core/api`) as well as
/// plain relative paths (`"libs/util"`), single or double quoted, several
/// per statement. Arguments may span lines inside `include(...)` or after a
/// trailing comma.
pub fn read_settings_includes(settings_file: &Path) -> Vec<String> {
    let content = match fs::read_to_string(settings_file) {
        Ok(content) => content,
        Err(e) => {
            if settings_file.exists() {
                warn!("Failed to read {}: {}", settings_file.display(), e);
            }
            return Vec::new();
        }
    };

    parse_settings_includes(&content)
}

pub fn parse_settings_includes(content: &str) -> Vec<String> {
    let mut modules = Vec::new();
    let mut pending = Pending::None;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("//") {
            continue;
        }

        let arguments = match pending {
            Pending::None if is_include(line) => {
                let arguments = &line["include".len()..];
                match arguments.find('(') {
                    Some(open) => {
                        let inner = &arguments[open + 1..];
                        match inner.find(')') {
                            Some(close) => &inner[..close],
                            None => {
                                pending = Pending::Parenthesised;
                                inner
                            }
                        }
                    }
                    None => {
                        if arguments.ends_with(',') {
                            pending = Pending::Comma;
                        }
                        arguments
                    }
                }
            }
            Pending::None => continue,
            Pending::Parenthesised => match line.find(')') {
                Some(close) => {
                    pending = Pending::None;
                    &line[..close]
                }
                None => line,
            },
            Pending::Comma => {
                if !line.ends_with(',') {
                    pending = Pending::None;
                }
                line
            }
        };

        for captures in quoted_string_regex().captures_iter(arguments) {
            let Some(raw) = captures.get(1).or_else(|| captures.get(2)) else {
                continue;
            };
            let module = raw.as_str().trim_start_matches(':').replace(':', "/");
            if !module.is_empty() {
                modules.push(module);
            }
        }
    }
    modules
}

/// `include ...` but not `includeBuild ...`
fn is_include(line: &str) -> bool {
    line.strip_prefix("include")
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

/// An `include` whose arguments continue on the next line.
#[derive(Clone, Copy)]
enum Pending {
    None,
    Parenthesised,
    Comma,
}

/// `<module>` entries inside the `<modules>` block of a Maven descriptor.
pub fn read_maven_modules(pom: &Path) -> Vec<String> {
    match fs::read_to_string(pom) {
        Ok(content) => parse_maven_modules(&content),
        Err(_) => Vec::new(),
    }
}

pub fn parse_maven_modules(content: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (content.find("<modules>"), content.find("</modules>")) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    maven_module_regex()
        .captures_iter(&content[start..end])
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_includes_colon_and_path_forms() {
        let modules = parse_settings_includes(
            r#"
            rootProject.name = "acme"
            include ':core', ":web:api"
            include("libs/util")
            // include ":commented"
            "#,
        );
        assert_eq!(modules, vec!["core", "web/api", "libs/util"]);
    }

    #[test]
    fn test_settings_includes_spanning_lines() {
        let modules = parse_settings_includes(
            r#"
            include(
                ":platform:core",
                // ":platform:legacy",
                ":platform:web"
            )
            include 'tools:cli',
                'tools:lint'
            includeBuild("build-logic")
            rootProject.name = "not-a-module"
            "#,
        );
        assert_eq!(
            modules,
            vec!["platform/core", "platform/web", "tools/cli", "tools/lint"]
        );
    }

    #[test]
    fn test_maven_modules_only_inside_modules_block() {
        let modules = parse_maven_modules(
            r#"<project>
              <module>ignored-before</module>
              <modules>
                <module>service</module>
                <module> client </module>
              </modules>
            </project>"#,
        );
        assert_eq!(modules, vec!["service", "client"]);
    }
}
