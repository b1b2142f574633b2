//! X11/EWMH window manager backed by `xprop` and `wmctrl`

use std::sync::Arc;
use tracing::{debug, warn};

use super::command::{run_checked, CommandRunner};
use super::{PinFlags, WindowHandle, WindowManager};
use crate::error::{WindowError, WindowResult};

const XPROP: &str = "xprop";
const WMCTRL: &str = "wmctrl";

/// Tools that must be on `PATH` for this backend to work.
pub const REQUIRED_TOOLS: &[&str] = &[XPROP, WMCTRL];

const STATE_ABOVE: &str = "_NET_WM_STATE_ABOVE";
const STATE_BELOW: &str = "_NET_WM_STATE_BELOW";

pub struct X11WindowManager {
    runner: Arc<dyn CommandRunner>,
}

impl X11WindowManager {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn describe(&self, id: &str) -> WindowResult<WindowHandle> {
        let output = run_checked(
            self.runner.as_ref(),
            XPROP,
            &["-id", id, "WM_NAME", "WM_CLASS", "_NET_WM_STATE"],
        )?;
        Ok(parse_window_properties(id, &output.stdout))
    }

    fn set_state(&self, id: &str, enabled: bool, state: &str) -> WindowResult<()> {
        let action = format!("{},{}", if enabled { "add" } else { "remove" }, state);
        run_checked(self.runner.as_ref(), WMCTRL, &["-i", "-r", id, "-b", &action])?;
        Ok(())
    }
}

impl WindowManager for X11WindowManager {
    fn list_windows_in_stacking_order(&self) -> WindowResult<Vec<WindowHandle>> {
        let output = run_checked(
            self.runner.as_ref(),
            XPROP,
            &["-root", "_NET_CLIENT_LIST_STACKING"],
        )?;
        let mut ids = parse_client_list(&output.stdout)?;
        // EWMH lists bottom-to-top
        ids.reverse();

        let mut windows = Vec::with_capacity(ids.len());
        for id in ids {
            match self.describe(&id) {
                Ok(window) => windows.push(window),
                // Windows close between the two queries; that is not an error
                Err(e) => debug!("Skipping window {}: {}", id, e),
            }
        }
        Ok(windows)
    }

    fn query_pin_flags(&self, id: &str) -> WindowResult<PinFlags> {
        let output = run_checked(self.runner.as_ref(), XPROP, &["-id", id, "_NET_WM_STATE"])?;
        Ok(parse_window_properties(id, &output.stdout).pin)
    }

    fn set_pin_above(&self, id: &str, enabled: bool) -> WindowResult<()> {
        self.set_state(id, enabled, "above")
    }

    fn set_pin_below(&self, id: &str, enabled: bool) -> WindowResult<()> {
        self.set_state(id, enabled, "below")
    }

    fn activate(&self, id: &str) -> WindowResult<()> {
        run_checked(self.runner.as_ref(), WMCTRL, &["-i", "-a", id])?;
        Ok(())
    }
}

/// Window ids from `xprop -root _NET_CLIENT_LIST_STACKING`.
pub fn parse_client_list(output: &str) -> WindowResult<Vec<String>> {
    let line = output
        .lines()
        .find(|l| l.starts_with("_NET_CLIENT_LIST_STACKING"))
        .ok_or_else(|| malformed("missing _NET_CLIENT_LIST_STACKING"))?;

    if line.contains("not found") {
        warn!("Window manager does not publish _NET_CLIENT_LIST_STACKING");
        return Ok(Vec::new());
    }

    let Some((_, ids)) = line.split_once('#') else {
        return Err(malformed(line));
    };
    Ok(ids
        .split(',')
        .map(str::trim)
        .filter(|id| id.starts_with("0x"))
        .map(str::to_string)
        .collect())
}

/// Build a handle from `xprop -id <id> WM_NAME WM_CLASS _NET_WM_STATE`.
/// Missing properties leave the corresponding field empty/false.
pub fn parse_window_properties(id: &str, output: &str) -> WindowHandle {
    let mut handle = WindowHandle {
        id: id.to_string(),
        name: String::new(),
        process_class: String::new(),
        pin: PinFlags::default(),
    };

    for line in output.lines() {
        if let Some(value) = property_value(line, "WM_NAME") {
            handle.name = quoted_strings(value).into_iter().next().unwrap_or_default();
        } else if let Some(value) = property_value(line, "WM_CLASS") {
            handle.process_class = quoted_strings(value).into_iter().next().unwrap_or_default();
        } else if let Some(value) = property_value(line, "_NET_WM_STATE") {
            for atom in value.split(',').map(str::trim) {
                match atom {
                    STATE_ABOVE => handle.pin.above = true,
                    STATE_BELOW => handle.pin.below = true,
                    _ => {}
                }
            }
        }
    }
    handle
}

/// `NAME(TYPE) = value` -> `value`; `None` for other properties or
/// `NAME:  not found.`
fn property_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?;
    let rest = match rest.strip_prefix('(') {
        Some(typed) => &typed[typed.find(')')? + 1..],
        None => rest,
    };
    rest.trim_start().strip_prefix('=').map(str::trim)
}

/// Double-quoted strings of an xprop value, with `\"` and `\\` unescaped.
fn quoted_strings(value: &str) -> Vec<String> {
    let mut strings = Vec::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '"' {
            continue;
        }
        let mut current = String::new();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '"' => break,
                other => current.push(other),
            }
        }
        strings.push(current);
    }
    strings
}

fn malformed(detail: &str) -> WindowError {
    WindowError::Malformed {
        program: XPROP.to_string(),
        detail: detail.to_string(),
    }
}
