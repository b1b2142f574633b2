//! Ambiguity Resolver
//!
//! Zero matches is not-found, one match goes straight through, several are
//! handed to a [`Selector`] which may pick one or decline.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SelectorKind;
use crate::locator::{MatchSet, ResourceMatch};
use crate::window::command::CommandRunner;

/// One row offered to a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption {
    pub label: String,
    pub id: String,
}

/// Picks one of several options, or none.
pub trait Selector: Send + Sync {
    fn choose(&self, options: &[SelectionOption]) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    Resolved(ResourceMatch),
    Cancelled,
}

pub fn resolve(matches: MatchSet, selector: &dyn Selector) -> Outcome {
    match matches.len() {
        0 => Outcome::NotFound,
        1 => matches
            .into_iter()
            .next()
            .map(Outcome::Resolved)
            .unwrap_or(Outcome::NotFound),
        count => {
            debug!("{} candidates, asking selector", count);
            let options: Vec<SelectionOption> = matches
                .iter()
                .map(|m| SelectionOption {
                    label: m.display_label(),
                    id: m.relative_path().to_string(),
                })
                .collect();

            let Some(chosen) = selector.choose(&options) else {
                info!("Selection declined");
                return Outcome::Cancelled;
            };
            match matches.into_iter().find(|m| m.relative_path() == chosen) {
                Some(found) => Outcome::Resolved(found),
                None => {
                    warn!("Selector returned unknown id '{}'", chosen);
                    Outcome::Cancelled
                }
            }
        }
    }
}

/// Graphical list prompt via `zenity --list`.
pub struct ZenitySelector {
    runner: Arc<dyn CommandRunner>,
}

impl ZenitySelector {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Selector for ZenitySelector {
    fn choose(&self, options: &[SelectionOption]) -> Option<String> {
        let mut args = vec![
            "--list",
            "--title=Multiple matches",
            "--text=Choose the file to open",
            "--column=File",
            "--hide-header",
            "--width=800",
            "--height=400",
        ];
        args.extend(options.iter().map(|o| o.label.as_str()));

        let output = match self.runner.run("zenity", &args) {
            Ok(output) => output,
            Err(e) => {
                warn!("Selection prompt failed: {}", e);
                return None;
            }
        };
        // Non-zero exit is the user closing the dialog
        if !output.success() {
            return None;
        }

        let label = output.stdout.trim();
        options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.id.clone())
    }
}

/// Declines every choice; ambiguity becomes cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclineSelector;

impl Selector for DeclineSelector {
    fn choose(&self, _options: &[SelectionOption]) -> Option<String> {
        None
    }
}

/// Selector for the configured kind. Zenity falls back to declining when
/// the binary is not installed.
pub fn selector_for(kind: SelectorKind, runner: Arc<dyn CommandRunner>) -> Arc<dyn Selector> {
    match kind {
        SelectorKind::Zenity if which::which("zenity").is_ok() => {
            Arc::new(ZenitySelector::new(runner))
        }
        SelectorKind::Zenity => {
            warn!("zenity not found on PATH, ambiguous matches will be reported as cancelled");
            Arc::new(DeclineSelector)
        }
        SelectorKind::None => Arc::new(DeclineSelector),
    }
}

// Tests live in `src/tests/resolver_tests.rs`
