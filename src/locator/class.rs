//! Class lookup with exact package verification
//!
//! A file is only accepted when its declared `package` equals the package
//! of the requested reference. Name collisions across large workspaces are
//! common; the package statement is the authority, never the file name.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ExclusionFilter, MatchSet, Provenance, ResourceMatch, SymbolicReference};
use crate::workspace::relative_posix;

/// Source file extensions a class may be declared in.
pub const SOURCE_EXTENSIONS: &[&str] = &["java", "kt"];

/// Conventional source roots probed under every module root.
pub const SOURCE_DIRECTORIES: &[&str] = &[
    "src/main/java",
    "src/main/kotlin",
    "src/test/java",
    "src/test/kotlin",
    "src/testFixtures/java",
    "src/testFixtures/kotlin",
    "src",
];

pub(crate) fn locate(
    reference: &SymbolicReference,
    workspace_root: &Path,
    modules: &[PathBuf],
    filter: &ExclusionFilter,
) -> MatchSet {
    let mut matches = MatchSet::new();

    // Fast path: the conventional package directory under each source root
    let package_dir = reference.package_dir();
    for module in modules {
        for source_dir in SOURCE_DIRECTORIES {
            for ext in SOURCE_EXTENSIONS {
                let candidate = module
                    .join(source_dir)
                    .join(&package_dir)
                    .join(format!("{}.{}", reference.simple_name(), ext));
                if candidate.is_file() {
                    accept(reference, workspace_root, candidate, filter, &mut matches);
                }
            }
        }
    }

    if !matches.is_empty() {
        return matches;
    }

    // Slow path: declarations that do not follow the directory convention
    debug!(
        "No conventional location for {}, walking {}",
        reference,
        workspace_root.display()
    );
    for entry in filter.walk_files(workspace_root, workspace_root, None) {
        if is_named_source(entry.path(), reference.simple_name()) {
            accept(
                reference,
                workspace_root,
                entry.into_path(),
                filter,
                &mut matches,
            );
        }
    }

    matches
}

fn accept(
    reference: &SymbolicReference,
    workspace_root: &Path,
    candidate: PathBuf,
    filter: &ExclusionFilter,
    matches: &mut MatchSet,
) {
    if filter.is_excluded_path(workspace_root, &candidate) {
        return;
    }

    let declared = declared_package(&candidate).unwrap_or_default();
    if declared != reference.package_name() {
        debug!(
            "Rejecting {}: declares package '{}', expected '{}'",
            candidate.display(),
            declared,
            reference.package_name()
        );
        return;
    }

    let provenance = candidate
        .parent()
        .and_then(|dir| relative_posix(workspace_root, dir))
        .map(|dir| Provenance::classify(&dir))
        .unwrap_or(Provenance::Main);

    if let Some(found) = ResourceMatch::new(workspace_root, candidate, provenance) {
        matches.insert(found);
    }
}

/// Exact `<SimpleName>.<ext>` match; `MyFoo.java` is not `Foo.java`.
pub fn is_named_source(path: &Path, simple_name: &str) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str());
    let ext = path.extension().and_then(|e| e.to_str());
    match (stem, ext) {
        (Some(stem), Some(ext)) => stem == simple_name && SOURCE_EXTENSIONS.contains(&ext),
        _ => false,
    }
}

/// Package declared by a Java/Kotlin source file.
///
/// Returns `Some("")` for a readable file without a package statement
/// (the default package) and `None` when the file cannot be read.
pub fn declared_package(file: &Path) -> Option<String> {
    let reader = BufReader::new(File::open(file).ok()?);
    for line in reader.lines() {
        let line = line.ok()?;
        if let Some(package) = parse_package_line(&line) {
            return Some(package);
        }
    }
    Some(String::new())
}

fn parse_package_line(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix("package ")?;
    let package = rest.trim().trim_end_matches(';').trim();
    Some(package.replace('`', ""))
}
