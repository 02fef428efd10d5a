//! Running external processes.
//!
//! Every command is an argument vector (program first) executed without a
//! shell, so arguments are passed through literally. A [`ProcessRunner`]
//! blocks until the process exits and turns any non-zero exit into an
//! [`Error::ProcessFailed`](crate::Error::ProcessFailed).
//!
//! # Example
//!
//! ```no_run
//! use toolchain::process::{CaptureBuffer, ExecutionContext, ProcessRunner, SystemRunner};
//!
//! let runner = SystemRunner::new();
//!
//! // Capture combined stdout and stderr
//! let output = runner.run(&["git".to_string(), "--version".to_string()]).unwrap();
//! println!("{output}");
//!
//! // Or stream into a sink of your choice
//! let buffer = CaptureBuffer::new();
//! let context = ExecutionContext::new()
//!     .working_dir("/tmp")
//!     .env_var("CI", "true")
//!     .output(buffer.sink());
//! runner.run_with(&["ls".to_string()], &context).unwrap();
//! ```

mod system;

pub use system::SystemRunner;

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Something that can execute commands.
///
/// Implementations must reject an empty command with
/// [`Error::InvalidCommand`](crate::Error::InvalidCommand) before spawning
/// anything.
pub trait ProcessRunner: Send + Sync {
    /// Run `command` with the given context and return its exit code.
    ///
    /// Output (stdout and stderr combined) is streamed into the context's
    /// sink as it is produced. Since non-zero exits are errors, a returned
    /// exit code is always `0`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidCommand` if `command` is empty
    /// - `Error::ProcessLaunch` if the process cannot be started
    /// - `Error::ProcessFailed` if it exits non-zero or is killed
    fn run_with(&self, command: &[String], context: &ExecutionContext) -> Result<i32>;

    /// Run `command` with the default context and return everything it
    /// printed.
    fn run(&self, command: &[String]) -> Result<String> {
        let buffer = CaptureBuffer::new();
        self.run_with(command, &ExecutionContext::new().output(buffer.sink()))?;
        Ok(buffer.contents())
    }
}

/// Render a command for logs and error messages.
pub(crate) fn render_command(command: &[String]) -> String {
    command.join(" ")
}

/// Working directory, environment and output sink for one invocation.
///
/// Each unset field falls back to a fixed default:
///
/// | Field       | Default                                   |
/// |-------------|-------------------------------------------|
/// | working dir | the current process's working directory   |
/// | environment | inherited unchanged                       |
/// | output      | the shared stdout sink                    |
///
/// Environment entries, when given, are applied on top of the inherited
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    working_dir: Option<PathBuf>,
    env: Option<BTreeMap<String, String>>,
    output: Option<OutputSink>,
}

impl ExecutionContext {
    /// Create a context where every field uses its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the environment overrides, replacing any set before.
    #[must_use]
    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Add one environment override.
    #[must_use]
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the output sink.
    #[must_use]
    pub fn output(mut self, sink: OutputSink) -> Self {
        self.output = Some(sink);
        self
    }

    /// The working directory, if one was set.
    #[must_use]
    pub fn working_dir_path(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// The environment overrides, if any were set.
    #[must_use]
    pub fn env_vars(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    /// The output sink, falling back to the shared stdout sink.
    #[must_use]
    pub fn output_sink(&self) -> OutputSink {
        self.output.clone().unwrap_or_else(OutputSink::stdout)
    }
}

/// A shared, thread-safe destination for process output.
///
/// Cloning is cheap; clones write to the same underlying writer.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<dyn Write + Send>>,
}

impl OutputSink {
    /// Wrap any writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// The process-wide stdout sink.
    #[must_use]
    pub fn stdout() -> Self {
        static STDOUT: OnceLock<OutputSink> = OnceLock::new();
        STDOUT.get_or_init(|| Self::new(io::stdout())).clone()
    }

    /// Write one chunk and flush it, so output shows up as it arrives.
    pub fn write_chunk(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(bytes)?;
        writer.flush()
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

/// An in-memory writer for capturing output.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink writing into this buffer.
    #[must_use]
    pub fn sink(&self) -> OutputSink {
        OutputSink::new(self.clone())
    }

    /// Everything written so far, decoded lossily as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A command as seen by [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The full argument vector.
    pub command: Vec<String>,
    /// Working directory from the context.
    pub working_dir: Option<PathBuf>,
    /// Environment overrides from the context.
    pub env: Option<BTreeMap<String, String>>,
}

/// Process runner for testing without spawning anything.
///
/// Records every command it is asked to run, writes the configured output
/// to the context's sink and exits with the configured code.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    output: String,
    exit_code: i32,
}

impl MockRunner {
    /// Create a runner that prints nothing and exits `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Print `output` on every run.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Exit with `code` on every run.
    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// All recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The most recently recorded command.
    #[must_use]
    pub fn last_command(&self) -> Option<Vec<String>> {
        self.calls.lock().unwrap().last().map(|c| c.command.clone())
    }
}

impl ProcessRunner for MockRunner {
    fn run_with(&self, command: &[String], context: &ExecutionContext) -> Result<i32> {
        if command.is_empty() {
            return Err(Error::InvalidCommand);
        }

        self.calls.lock().unwrap().push(RecordedCall {
            command: command.to_vec(),
            working_dir: context.working_dir_path().map(Path::to_path_buf),
            env: context.env_vars().cloned(),
        });

        context
            .output_sink()
            .write_chunk(self.output.as_bytes())
            .map_err(|e| Error::io("<output>", e))?;

        if self.exit_code == 0 {
            Ok(0)
        } else {
            Err(Error::ProcessFailed {
                command: render_command(command),
                exit_code: Some(self.exit_code),
            })
        }
    }
}
