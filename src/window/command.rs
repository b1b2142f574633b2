//! External process execution
//!
//! Every tool the daemon shells out to (xprop, wmctrl, xdg-open, zenity)
//! goes through a [`CommandRunner`], so window and selector logic can be
//! driven by a scripted runner in tests.

use std::process::{Command, Stdio};
use tracing::{debug, warn};

use crate::error::{WindowError, WindowResult};

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion and capture its output.
    ///
    /// A non-zero exit is NOT an error here; callers decide via
    /// [`run_checked`]. Only a failure to start the process is.
    fn run(&self, program: &str, args: &[&str]) -> WindowResult<CommandOutput>;

    /// Start `program` without waiting for it.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> WindowResult<()>;
}

/// Run and turn a non-zero exit into [`WindowError::ExternalProcessFailure`].
pub fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> WindowResult<CommandOutput> {
    let output = runner.run(program, args)?;
    if output.success() {
        Ok(output)
    } else {
        Err(WindowError::ExternalProcessFailure {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// Runs real processes with `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> WindowResult<CommandOutput> {
        debug!("Running {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| WindowError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            // Killed by a signal has no code
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> WindowResult<()> {
        debug!("Spawning {} {:?}", program, args);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| WindowError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Reap in the background so the child never lingers as a zombie
        let program = program.to_string();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                warn!("{} exited with {}", program, status);
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to wait for {}: {}", program, e),
        });
        Ok(())
    }
}
