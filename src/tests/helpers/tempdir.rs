//! Scratch directories for scenario tests. Names carry the scenario so a
//! leftover directory can be traced back to the test that made it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

pub fn unique_temp_dir(scenario: &str) -> TempDir {
    let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
    tempfile::Builder::new()
        .prefix(&format!("waypoint-{}-{}-", scenario, seq))
        .tempdir()
        .expect("create scratch dir")
}

/// Resolved through symlinks (`/tmp` is one on some hosts), matching what
/// workspace resolution hands back.
pub fn canonical_root(dir: &TempDir) -> PathBuf {
    dir.path().canonicalize().expect("canonical scratch dir")
}
