use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Captured diagnostics for error reporting: stderr, falling back to
    /// stdout when the tool wrote its complaint there.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        }
    }
}

/// Execute a program and capture stdout/stderr. Blocking, no timeout; the
/// user cancels long operations with a signal.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned or its output cannot
/// be read; a non-zero exit is reported through [`RunOutput::code`], not as
/// an error.
pub fn run_command(program: &str, args: &[String], cwd: Option<&Path>) -> Result<RunOutput> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }
    command.stdin(Stdio::null());
    let output = command
        .output()
        .with_context(|| format!("failed to start {program}"))?;
    Ok(RunOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
