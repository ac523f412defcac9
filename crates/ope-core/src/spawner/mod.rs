//! Companion process invocation.

#[doc(hidden)]
pub mod mock;

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

/// The companion path and its argument list for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    program: PathBuf,
    args: Vec<String>,
}

impl DispatchRequest {
    /// Request that passes `url` as the only argument.
    pub fn new(program: impl Into<PathBuf>, url: &str) -> Self {
        Self {
            program: program.into(),
            args: vec![url.to_string()],
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// How the companion exited. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSummary {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
}

impl ExitSummary {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            success: code == 0,
        }
    }
}

impl From<ExitStatus> for ExitSummary {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}

/// Capability for running the companion to completion.
pub trait Spawner {
    /// Start the companion and block until it exits.
    fn run(&mut self, request: &DispatchRequest) -> Result<ExitSummary>;
}

/// Runs the companion as a real child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpawner;

impl ProcessSpawner {
    pub fn new() -> Self {
        Self
    }

    fn command(request: &DispatchRequest) -> Command {
        let mut command = Command::new(request.program());
        command
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            use windows::Win32::System::Threading::CREATE_NO_WINDOW;

            command.creation_flags(CREATE_NO_WINDOW.0);
        }

        command
    }
}

impl Spawner for ProcessSpawner {
    fn run(&mut self, request: &DispatchRequest) -> Result<ExitSummary> {
        let mut child =
            Self::command(request)
                .spawn()
                .map_err(|source| Error::SpawnFailed {
                    program: request.program().to_path_buf(),
                    source,
                })?;

        debug!("Spawned companion (PID: {})", child.id());

        // No timeout: a hung companion keeps the handler alive with it.
        let status = child.wait().map_err(|source| Error::WaitFailed {
            program: request.program().to_path_buf(),
            source,
        })?;

        Ok(status.into())
    }
}
