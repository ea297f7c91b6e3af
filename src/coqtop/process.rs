//! coqtop process spawning and output capture.
//!
//! This module provides a builder for describing one coqtop invocation and
//! [`run`], which feeds the input on stdin and captures stdout and stderr
//! interleaved, the way coqtop writes them.

use std::borrow::Cow;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

use super::{CollectError, TimeoutSpec};

/// Grace period between SIGTERM and SIGKILL for a timed out run.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Marker appended to the output of a run that hit its timeout.
pub const TIMEOUT_MARKER: &str = "\nTimeout!";

/// Flags that make coqtop echo offsets and emacs-style prompts.
pub const TRANSCRIPT_FLAGS: [&str; 3] = ["-q", "-emacs", "-time"];

/// One coqtop invocation.
///
/// Two commands are equal when binary, arguments, input, timeout, and
/// working directory all match; this is the key output is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoqtopCommand {
    binary: PathBuf,
    args: Vec<String>,
    input: String,
    timeout: TimeoutSpec,
    working_dir: Option<PathBuf>,
}

impl CoqtopCommand {
    /// Create a command for the given binary.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            input: String::new(),
            timeout: TimeoutSpec::default(),
            working_dir: None,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the text fed on stdin.
    #[must_use]
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: TimeoutSpec) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the working directory for the coqtop process.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn get_timeout(&self) -> TimeoutSpec {
        self.timeout
    }

    #[must_use]
    pub fn get_working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }

    /// Shell-quoted rendering for logs.
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = vec![shell_escape::escape(self.binary.to_string_lossy())];
        parts.extend(
            self.args
                .iter()
                .map(|a| shell_escape::escape(Cow::from(a.as_str()))),
        );
        let mut line = parts.join(" ");
        if !self.input.is_empty() {
            line.push_str(" < <stdin>");
        }
        line
    }
}

/// Captured result of one coqtop run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoqOutput {
    /// Combined stdout and stderr, newlines normalised.
    pub output: String,
    /// Arguments the binary was run with.
    pub args: Vec<String>,
    /// Exit code, or `None` if the process was killed.
    pub exit_code: Option<i32>,
    /// Whether the run hit its timeout.
    pub timed_out: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Run `command` once with the given limit.
///
/// # Errors
///
/// Returns `CollectError` if the process cannot be spawned or its output
/// cannot be read back.
pub async fn run(command: &CoqtopCommand, limit: Option<Duration>) -> Result<CoqOutput, CollectError> {
    let mut capture = tempfile::tempfile()?;
    let stdout = capture.try_clone()?;
    let stderr = capture.try_clone()?;

    let mut cmd = Command::new(&command.binary);
    cmd.args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true);

    if let Some(ref dir) = command.working_dir {
        cmd.current_dir(dir);
    }

    tracing::debug!(command = %command.display(), "Running coqtop");

    let start = Instant::now();
    let mut child = cmd
        .spawn()
        .map_err(|e| CollectError::from_spawn(&command.binary, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        let input = command.input.clone().into_bytes();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&input).await {
                tracing::debug!(error = %e, "coqtop closed stdin early");
            }
        });
    }

    let (status, timed_out) = match limit {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => (Some(status?), false),
            Err(_) => {
                tracing::warn!(?limit, command = %command.display(), "coqtop timed out");
                terminate(&mut child, TERMINATE_GRACE).await?;
                (None, true)
            }
        },
        None => (Some(child.wait().await?), false),
    };
    let elapsed = start.elapsed();

    let mut raw = Vec::new();
    capture.seek(SeekFrom::Start(0))?;
    capture.read_to_end(&mut raw)?;

    let mut output = normalize_newlines(&String::from_utf8_lossy(&raw));
    if timed_out {
        output.push_str(TIMEOUT_MARKER);
    }

    let exit_code = status.and_then(|s| s.code());
    tracing::trace!(?exit_code, %output, "coqtop finished");

    Ok(CoqOutput {
        output,
        args: command.args.clone(),
        exit_code,
        timed_out,
        elapsed,
    })
}

/// Convert `\r\n` and lone `\r` to `\n`.
#[must_use]
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Ask the child to stop, then kill it if it is still running after `grace`.
///
/// On Unix, sends SIGTERM first. On other platforms, kills immediately.
async fn terminate(child: &mut Child, grace: Duration) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = child.id() else {
            // Already exited
            return Ok(());
        };

        let nix_pid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));
        let _ = kill(nix_pid, Signal::SIGTERM);

        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => child.kill().await,
        }
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        child.kill().await
    }
}
