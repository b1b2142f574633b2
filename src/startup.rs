//! Startup checks and one-time setup
//!
//! - required desktop tools present on `PATH`
//! - single-instance lock (advisory lock on a pid file)
//! - optional autostart desktop entry

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::expand_path;
use crate::error::StartupError;

pub const LOCK_FILE_NAME: &str = "waypoint.pid";
pub const AUTOSTART_FILE_NAME: &str = "waypoint.desktop";

/// Fails with every missing tool listed, not just the first.
pub fn check_required_tools(tools: &[&str]) -> std::result::Result<(), StartupError> {
    let missing: Vec<String> = tools
        .iter()
        .filter(|tool| which::which(tool).is_err())
        .map(|tool| tool.to_string())
        .collect();

    if missing.is_empty() {
        debug!("Required tools present: {}", tools.join(", "));
        Ok(())
    } else {
        Err(StartupError::RequiredToolMissing { tools: missing })
    }
}

/// `$XDG_RUNTIME_DIR/waypoint.pid`, or the temp dir when unset.
pub fn default_lock_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(LOCK_FILE_NAME)
}

/// Exclusive advisory lock on the pid file, held for the lifetime of the
/// daemon. The kernel drops it when the process exits, however it exits.
/// The pid written into the file only feeds the error message.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    _file: File,
}

impl InstanceLock {
    pub fn acquire(path: &Path) -> std::result::Result<Self, StartupError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(StartupError::AlreadyRunning {
                    pid: read_pid(&mut file),
                    lock_path: path.to_path_buf(),
                });
            }
            return Err(e.into());
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;
        debug!("Acquired instance lock {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_pid(file: &mut File) -> Option<u32> {
    let mut content = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut content).ok()?;
    content.trim().parse().ok()
}

pub fn default_autostart_dir() -> PathBuf {
    expand_path("~/.config/autostart")
}

pub fn desktop_entry(executable: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=Waypoint\n\
         Comment=Opens workspace files in the IDE and brings its window forward\n\
         Exec=\"{}\" serve\n\
         X-GNOME-Autostart-enabled=true\n\
         NoDisplay=true\n",
        executable.display()
    )
}

/// Write (or overwrite) the autostart entry in `dir`.
pub fn write_autostart_entry(dir: &Path, executable: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(AUTOSTART_FILE_NAME);
    fs::write(&path, desktop_entry(executable))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Autostart entry written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_exclusive_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let lock = InstanceLock::acquire(&path).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());

        let err = InstanceLock::acquire(&path).unwrap_err();
        match err {
            StartupError::AlreadyRunning { pid, lock_path } => {
                assert_eq!(pid, Some(std::process::id()));
                assert_eq!(lock_path, path);
            }
            other => panic!("unexpected error: {other}"),
        }

        drop(lock);
        assert!(InstanceLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_leftover_file_with_live_pid_is_not_a_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        // pid 1 is always alive but never holds the lock
        fs::write(&path, "1\nleftover from a killed run\n").unwrap();

        let lock = InstanceLock::acquire(&path).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content, format!("{}\n", std::process::id()));
    }

    #[test]
    fn test_missing_tools_are_all_reported() {
        let err = check_required_tools(&["sh", "waypoint-missing-a", "waypoint-missing-b"])
            .unwrap_err();
        match err {
            StartupError::RequiredToolMissing { tools } => {
                assert_eq!(tools, vec!["waypoint-missing-a", "waypoint-missing-b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_autostart_entry_points_at_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            write_autostart_entry(&dir.path().join("autostart"), Path::new("/opt/waypoint")).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("[Desktop Entry]\n"));
        assert!(content.contains("Exec=\"/opt/waypoint\" serve\n"));
    }
}
