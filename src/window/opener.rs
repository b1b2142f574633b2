//! URI-open port

use std::sync::Arc;
use tracing::info;

use super::command::CommandRunner;
use crate::error::WindowResult;

/// Hands a URI to whatever the desktop has registered for its scheme.
pub trait UriOpener: Send + Sync {
    fn open(&self, uri: &str) -> WindowResult<()>;
}

/// `xdg-open`, started and left running.
pub struct XdgOpener {
    runner: Arc<dyn CommandRunner>,
}

impl XdgOpener {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl UriOpener for XdgOpener {
    fn open(&self, uri: &str) -> WindowResult<()> {
        info!("Opening {}", uri);
        self.runner.spawn_detached("xdg-open", &[uri])
    }
}
