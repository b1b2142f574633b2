// Daemon readiness report
//
// Served on /health. Ready means every window tool the arbiter needs is on
// PATH; with the arbiter disabled the daemon is always ready.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::window::x11::REQUIRED_TOOLS;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    /// Locator works, window arbitration will fail
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: Readiness,
    pub version: &'static str,
    pub arbiter_enabled: bool,
    pub cycles_completed: u64,
    pub tools: BTreeMap<String, bool>,
}

pub struct HealthChecker;

impl HealthChecker {
    pub fn report(arbiter_enabled: bool, cycles_completed: u64) -> HealthReport {
        let tools: BTreeMap<String, bool> = REQUIRED_TOOLS
            .iter()
            .map(|tool| (tool.to_string(), which::which(tool).is_ok()))
            .collect();
        Self::from_parts(arbiter_enabled, cycles_completed, tools)
    }

    pub fn from_parts(
        arbiter_enabled: bool,
        cycles_completed: u64,
        tools: BTreeMap<String, bool>,
    ) -> HealthReport {
        let status = if !arbiter_enabled || tools.values().all(|present| *present) {
            Readiness::Ready
        } else {
            Readiness::Degraded
        };

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION"),
            arbiter_enabled,
            cycles_completed,
            tools,
        }
    }
}
