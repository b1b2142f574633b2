//! Window Arbiter
//!
//! One arbitration cycle:
//!
//! ```text
//! Idle -> Snapshotting -> Pinned -> NavigationTriggered -> Settling -> Restoring -> Idle
//! ```
//!
//! The target window (the IDE window of the requested project) is pinned
//! above everything and rival IDE windows are pinned below, the navigation
//! URI is handed to the desktop, and after a fixed settle delay every
//! window captured in the snapshot gets its original pin flags back.
//!
//! Cycles are single-flight: the arbiter's mutex is held from snapshot to
//! restore, so a second cycle can only snapshot state the first one has
//! already restored.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::opener::UriOpener;
use super::snapshot::WindowSnapshot;
use super::{PinFlags, WindowHandle, WindowId, WindowManager};
use crate::config::{ArbiterConfig, IdeConfig, SETTLE_DELAY};
use crate::error::WindowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrationPhase {
    Idle,
    Snapshotting,
    Pinned,
    NavigationTriggered,
    Settling,
    Restoring,
}

impl fmt::Display for ArbitrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Delays used by a cycle.
#[derive(Debug, Clone, Copy)]
pub struct ArbiterTiming {
    pub settle: Duration,
    pub retry_attempts: u32,
    pub retry_interval: Duration,
}

impl ArbiterTiming {
    pub fn new(settle: Duration, retry_attempts: u32, retry_interval: Duration) -> Self {
        Self {
            settle,
            retry_attempts,
            retry_interval,
        }
    }

    /// Fixed settle delay, retry budget from the config.
    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self::new(
            SETTLE_DELAY,
            config.target_retry_attempts,
            config.target_retry_interval(),
        )
    }
}

/// What one cycle did. Failures never abort the cycle; they are collected.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub phases: Vec<ArbitrationPhase>,
    pub target: Option<WindowId>,
    pub restored: usize,
    pub failures: Vec<WindowError>,
}

impl CycleReport {
    fn enter(&mut self, phase: ArbitrationPhase) {
        debug!("Arbitration phase: {}", phase);
        self.phases.push(phase);
    }

    fn record(&mut self, error: WindowError) {
        warn!("Arbitration step failed: {}", error);
        self.failures.push(error);
    }

    pub fn target_found(&self) -> bool {
        self.target.is_some()
    }
}

pub struct Arbiter {
    windows: Arc<dyn WindowManager>,
    opener: Arc<dyn UriOpener>,
    process_class: String,
    title_separator: String,
    timing: ArbiterTiming,
    cycle_lock: Mutex<()>,
    cycles_completed: AtomicU64,
}

impl Arbiter {
    pub fn new(
        windows: Arc<dyn WindowManager>,
        opener: Arc<dyn UriOpener>,
        ide: &IdeConfig,
        timing: ArbiterTiming,
    ) -> Self {
        Self {
            windows,
            opener,
            process_class: ide.process_class.clone(),
            title_separator: ide.title_separator.clone(),
            timing,
            cycle_lock: Mutex::new(()),
            cycles_completed: AtomicU64::new(0),
        }
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    /// Run one full cycle for `project`, opening `uri` on the way. Blocks
    /// for at least the settle delay; queues behind any running cycle.
    pub fn run_cycle(&self, project: &str, uri: &str) -> CycleReport {
        // A panicked cycle still leaves the desktop usable; keep serving
        let _guard = self
            .cycle_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut report = CycleReport::default();
        self.run_locked(project, uri, &mut report);
        report.enter(ArbitrationPhase::Idle);

        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        info!(
            "Arbitration for '{}' finished: target {:?}, {} windows restored, {} failures",
            project,
            report.target,
            report.restored,
            report.failures.len()
        );
        report
    }

    fn run_locked(&self, project: &str, uri: &str, report: &mut CycleReport) {
        report.enter(ArbitrationPhase::Snapshotting);
        let snapshot = match WindowSnapshot::capture(self.windows.as_ref()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                report.record(e);
                // Nothing to restore, but the navigation itself must still happen
                report.enter(ArbitrationPhase::NavigationTriggered);
                self.open(uri, report);
                return;
            }
        };

        report.enter(ArbitrationPhase::Pinned);
        let mut late_target: Option<WindowHandle> = None;
        if let Some(target) = snapshot.find_project_window(project, &self.title_separator) {
            report.target = Some(target.id.clone());
            self.promote(&snapshot, &target.id, report);
        }

        report.enter(ArbitrationPhase::NavigationTriggered);
        self.open(uri, report);

        if report.target.is_none() {
            match self.await_new_window(&snapshot, project) {
                Some(window) => {
                    debug!("Window {} appeared for '{}'", window.id, project);
                    report.target = Some(window.id.clone());
                    self.promote(&snapshot, &window.id, report);
                    late_target = Some(window);
                }
                None => report.record(WindowError::WindowNotFound {
                    project: project.to_string(),
                }),
            }
        }

        report.enter(ArbitrationPhase::Settling);
        thread::sleep(self.timing.settle);

        report.enter(ArbitrationPhase::Restoring);
        self.restore(&snapshot, late_target.as_ref(), report);
        if let Some(target) = report.target.clone() {
            if let Err(e) = self.windows.activate(&target) {
                report.record(e);
            }
        }
    }

    fn open(&self, uri: &str, report: &mut CycleReport) {
        if let Err(e) = self.opener.open(uri) {
            report.record(e);
        }
    }

    /// Pin `target` above and push every other IDE window below it.
    fn promote(&self, snapshot: &WindowSnapshot, target: &str, report: &mut CycleReport) {
        let current = snapshot.flags(target).unwrap_or_default();
        let pinned = PinFlags::new(true, false);
        if let Err(e) = self.windows.apply_pin_flags(target, current, pinned) {
            report.record(e);
        }

        let rivals = snapshot
            .windows()
            .filter(|w| w.id != target && w.is_class(&self.process_class));
        for rival in rivals {
            let demoted = PinFlags::new(false, true);
            if let Err(e) = self.windows.apply_pin_flags(&rival.id, rival.pin, demoted) {
                report.record(e);
            }
        }
    }

    /// Poll for an IDE window that was not in the snapshot, preferring one
    /// already titled for `project`.
    fn await_new_window(&self, snapshot: &WindowSnapshot, project: &str) -> Option<WindowHandle> {
        for attempt in 0..self.timing.retry_attempts {
            if attempt > 0 {
                thread::sleep(self.timing.retry_interval);
            }

            let windows = match self.windows.list_windows_in_stacking_order() {
                Ok(windows) => windows,
                Err(e) => {
                    debug!("Window listing failed while waiting for '{}': {}", project, e);
                    continue;
                }
            };

            let mut fresh: Vec<WindowHandle> = windows
                .into_iter()
                .filter(|w| w.is_class(&self.process_class) && !snapshot.contains(&w.id))
                .collect();
            if let Some(index) = fresh
                .iter()
                .position(|w| w.belongs_to_project(project, &self.title_separator))
            {
                return Some(fresh.swap_remove(index));
            }
            if !fresh.is_empty() {
                return Some(fresh.swap_remove(0));
            }
        }
        None
    }

    /// Put every snapshot window back to its captured flags, bottom to top,
    /// then the late-appearing target to the flags it had when discovered.
    fn restore(
        &self,
        snapshot: &WindowSnapshot,
        late_target: Option<&WindowHandle>,
        report: &mut CycleReport,
    ) {
        for window in snapshot.windows().rev().chain(late_target) {
            let current = match self.windows.query_pin_flags(&window.id) {
                Ok(flags) => flags,
                Err(e) => {
                    debug!("Window {} is gone, not restoring: {}", window.id, e);
                    continue;
                }
            };

            match self.windows.apply_pin_flags(&window.id, current, window.pin) {
                Ok(()) => report.restored += 1,
                Err(e) => report.record(e),
            }
        }
    }
}
