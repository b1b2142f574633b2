//! Test workspace builders with proper isolation

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::tempdir::{canonical_root, unique_temp_dir};

/// A throwaway workspace on disk. The root is canonical so it compares
/// equal to what project resolution produces.
pub struct WorkspaceFixture {
    _dir: TempDir,
    root: PathBuf,
}

impl WorkspaceFixture {
    pub fn new(test_name: &str) -> Self {
        let dir = unique_temp_dir(test_name);
        let root = canonical_root(&dir);
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn file(&self, relative: &str, content: &str) -> &Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parent");
        }
        fs::write(&path, content).expect("write fixture file");
        self
    }

    pub fn dir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.path(relative)).expect("create fixture dir");
        self
    }

    /// A Java source declaring `class <name>` in `package` (none for the
    /// default package).
    pub fn java_class(&self, relative: &str, package: Option<&str>, name: &str) -> &Self {
        let mut source = String::new();
        if let Some(package) = package {
            source.push_str(&format!("package {};\n\n", package));
        }
        source.push_str("import java.util.List;\n\n");
        source.push_str(&format!("public class {} {{\n}}\n", name));
        self.file(relative, &source)
    }

    pub fn kotlin_class(&self, relative: &str, package: &str, name: &str) -> &Self {
        self.file(
            relative,
            &format!("package {}\n\nclass {}\n", package, name),
        )
    }
}
