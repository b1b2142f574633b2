//! In-memory doubles for the desktop ports
//!
//! `RecordingWindowManager` keeps a fake stacking order and logs every call
//! in one shared timeline, so tests can assert both final state and call
//! ordering without a display server.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::{WindowError, WindowResult};
use crate::resolver::{SelectionOption, Selector};
use crate::window::command::{CommandOutput, CommandRunner};
use crate::window::{PinFlags, UriOpener, WindowHandle, WindowManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    List,
    Query(String),
    SetAbove(String, bool),
    SetBelow(String, bool),
    Activate(String),
    Open(String),
}

#[derive(Default)]
struct Desktop {
    /// Topmost first
    windows: Vec<WindowHandle>,
    events: Vec<WmEvent>,
    failing: HashSet<String>,
    listing_fails: bool,
}

#[derive(Default)]
pub struct RecordingWindowManager {
    desktop: Mutex<Desktop>,
}

pub fn window(id: &str, name: &str, process_class: &str, above: bool, below: bool) -> WindowHandle {
    WindowHandle {
        id: id.to_string(),
        name: name.to_string(),
        process_class: process_class.to_string(),
        pin: PinFlags::new(above, below),
    }
}

impl RecordingWindowManager {
    pub fn new(windows: Vec<WindowHandle>) -> Arc<Self> {
        let manager = Self::default();
        manager.desktop.lock().unwrap().windows = windows;
        Arc::new(manager)
    }

    /// Every mutation of `id` exits non-zero.
    pub fn fail_mutations_for(&self, id: &str) {
        self.desktop.lock().unwrap().failing.insert(id.to_string());
    }

    pub fn fail_listing(&self) {
        self.desktop.lock().unwrap().listing_fails = true;
    }

    /// A new window opens on top of the stack.
    pub fn add_window(&self, window: WindowHandle) {
        self.desktop.lock().unwrap().windows.insert(0, window);
    }

    pub fn close_window(&self, id: &str) {
        self.desktop.lock().unwrap().windows.retain(|w| w.id != id);
    }

    pub fn flags(&self, id: &str) -> Option<PinFlags> {
        let desktop = self.desktop.lock().unwrap();
        desktop.windows.iter().find(|w| w.id == id).map(|w| w.pin)
    }

    pub fn all_flags(&self) -> HashMap<String, PinFlags> {
        let desktop = self.desktop.lock().unwrap();
        desktop.windows.iter().map(|w| (w.id.clone(), w.pin)).collect()
    }

    pub fn events(&self) -> Vec<WmEvent> {
        self.desktop.lock().unwrap().events.clone()
    }

    /// Shared timeline, so openers can log into the same sequence.
    pub fn record(&self, event: WmEvent) {
        self.desktop.lock().unwrap().events.push(event);
    }

    fn mutate(&self, id: &str, event: WmEvent, apply: impl FnOnce(&mut PinFlags)) -> WindowResult<()> {
        let mut desktop = self.desktop.lock().unwrap();
        desktop.events.push(event);
        if desktop.failing.contains(id) {
            return Err(process_failure("wmctrl", id));
        }
        match desktop.windows.iter_mut().find(|w| w.id == id) {
            Some(window) => {
                apply(&mut window.pin);
                Ok(())
            }
            None => Err(process_failure("wmctrl", id)),
        }
    }
}

fn process_failure(program: &str, id: &str) -> WindowError {
    WindowError::ExternalProcessFailure {
        program: program.to_string(),
        args: vec![id.to_string()],
        status: 1,
        stderr: format!("BadWindow {}", id),
    }
}

impl WindowManager for RecordingWindowManager {
    fn list_windows_in_stacking_order(&self) -> WindowResult<Vec<WindowHandle>> {
        let mut desktop = self.desktop.lock().unwrap();
        desktop.events.push(WmEvent::List);
        if desktop.listing_fails {
            return Err(process_failure("xprop", "-root"));
        }
        Ok(desktop.windows.clone())
    }

    fn query_pin_flags(&self, id: &str) -> WindowResult<PinFlags> {
        let mut desktop = self.desktop.lock().unwrap();
        desktop.events.push(WmEvent::Query(id.to_string()));
        desktop
            .windows
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.pin)
            .ok_or_else(|| process_failure("xprop", id))
    }

    fn set_pin_above(&self, id: &str, enabled: bool) -> WindowResult<()> {
        self.mutate(id, WmEvent::SetAbove(id.to_string(), enabled), |pin| {
            pin.above = enabled
        })
    }

    fn set_pin_below(&self, id: &str, enabled: bool) -> WindowResult<()> {
        self.mutate(id, WmEvent::SetBelow(id.to_string(), enabled), |pin| {
            pin.below = enabled
        })
    }

    fn activate(&self, id: &str) -> WindowResult<()> {
        self.mutate(id, WmEvent::Activate(id.to_string()), |_| {})
    }
}

type OpenHook = Box<dyn Fn(&str) + Send + Sync>;

/// Records opened URIs; optionally reacts the way a desktop would (a new
/// IDE window appearing, a window closing).
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
    hook: Option<OpenHook>,
    fail: bool,
}

impl RecordingOpener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_hook(hook: impl Fn(&str) + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            hook: Some(Box::new(hook)),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// Log opens into a window manager's timeline.
    pub fn into_timeline(manager: Arc<RecordingWindowManager>) -> Arc<Self> {
        Self::with_hook(move |uri| manager.record(WmEvent::Open(uri.to_string())))
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UriOpener for RecordingOpener {
    fn open(&self, uri: &str) -> WindowResult<()> {
        self.opened.lock().unwrap().push(uri.to_string());
        if let Some(hook) = &self.hook {
            hook(uri);
        }
        if self.fail {
            return Err(process_failure("xdg-open", uri));
        }
        Ok(())
    }
}

/// Replies from a table keyed by the full command line; anything unknown
/// succeeds with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, CommandOutput>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, command_line: &str, status: i32, stdout: &str) {
        self.responses.lock().unwrap().insert(
            command_line.to_string(),
            CommandOutput {
                status,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn command_line(program: &str, args: &[&str]) -> String {
        std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> WindowResult<CommandOutput> {
        let line = Self::command_line(program, args);
        self.calls.lock().unwrap().push(line.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&line)
            .cloned()
            .unwrap_or(CommandOutput {
                status: 0,
                stdout: String::new(),
                stderr: String::new(),
            }))
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> WindowResult<()> {
        let line = Self::command_line(program, args);
        self.calls.lock().unwrap().push(format!("spawn {}", line));
        Ok(())
    }
}

/// Picks the option at a fixed index (or declines) and remembers what it
/// was offered.
pub struct ScriptedSelector {
    pick: Option<usize>,
    offered: Mutex<Vec<Vec<SelectionOption>>>,
}

impl ScriptedSelector {
    pub fn picking(index: usize) -> Arc<Self> {
        Arc::new(Self {
            pick: Some(index),
            offered: Mutex::new(Vec::new()),
        })
    }

    pub fn declining() -> Arc<Self> {
        Arc::new(Self {
            pick: None,
            offered: Mutex::new(Vec::new()),
        })
    }

    pub fn offered(&self) -> Vec<Vec<SelectionOption>> {
        self.offered.lock().unwrap().clone()
    }
}

impl Selector for ScriptedSelector {
    fn choose(&self, options: &[SelectionOption]) -> Option<String> {
        self.offered.lock().unwrap().push(options.to_vec());
        self.pick
            .and_then(|index| options.get(index))
            .map(|option| option.id.clone())
    }
}
