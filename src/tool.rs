// ABOUTME: Abstraction over the external mysqldump/mysql executables
// ABOUTME: Runs argv-style invocations with file redirection, no shell involved

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Where the process reads from or writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Append stdout to the file, creating it if needed (`>>`)
    AppendStdout(PathBuf),
    /// Feed the file to stdin (`<`)
    StdinFrom(PathBuf),
}

/// A fully built command line, ready to hand to an [`ExternalTool`]
#[derive(Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub redirect: Option<Redirect>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            redirect: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn redirect(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Command line with `--password=` values masked
    pub fn display_masked(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|arg| {
            if arg.starts_with("--password=") {
                "--password=***".to_string()
            } else {
                arg.clone()
            }
        }));

        match &self.redirect {
            Some(Redirect::AppendStdout(path)) => {
                parts.push(format!(">> {}", path.display()));
            }
            Some(Redirect::StdinFrom(path)) => {
                parts.push(format!("< {}", path.display()));
            }
            None => {}
        }

        parts.join(" ")
    }
}

impl fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToolInvocation")
            .field(&self.display_masked())
            .finish()
    }
}

/// Exit status and captured streams of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Short description of a failure for error messages
    pub fn failure_summary(&self) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

/// Something that can run an external command to completion
#[async_trait]
pub trait ExternalTool: Send + Sync {
    /// Run the invocation and wait for it to exit.
    ///
    /// `Err` means the process could not be started; a started process that
    /// exits non-zero is reported through [`ToolOutput::exit_code`].
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

/// Runs invocations as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTool;

#[async_trait]
impl ExternalTool for SystemTool {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        tracing::debug!("Running: {}", invocation.display_masked());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match &invocation.redirect {
            Some(Redirect::AppendStdout(path)) => {
                cmd.stdout(open_append(path)?);
            }
            Some(Redirect::StdinFrom(path)) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("Failed to open {} for reading", path.display()))?;
                cmd.stdin(file);
            }
            None => {}
        }

        // output() would force stdout back to a pipe, so spawn and wait instead
        let child = cmd.spawn().with_context(|| {
            format!(
                "Failed to execute {}. Is the MySQL client installed and on PATH?",
                invocation.program
            )
        })?;
        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for {}", invocation.program))?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for appending", path.display()))
}
