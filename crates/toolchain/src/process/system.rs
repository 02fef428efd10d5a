//! Process runner backed by real OS processes.

use super::{ExecutionContext, OutputSink, ProcessRunner, render_command};
use crate::error::{Error, Result};
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;

/// Size of one chunk copied from a pipe into the sink.
const CHUNK_SIZE: usize = 8 * 1024;

/// Runs commands as child processes of the current process.
///
/// Stdin is inherited. Stdout and stderr are piped and copied into the
/// context's sink chunk by chunk while the process runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run_with(&self, command: &[String], context: &ExecutionContext) -> Result<i32> {
        let (program, args) = command.split_first().ok_or(Error::InvalidCommand)?;
        let rendered = render_command(command);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = context.working_dir_path() {
            cmd.current_dir(dir);
        }
        if let Some(env) = context.env_vars() {
            cmd.envs(env);
        }

        log::debug!("Running: {rendered}");

        let mut child = cmd.spawn().map_err(|source| Error::ProcessLaunch {
            command: rendered.clone(),
            source,
        })?;

        let sink = context.output_sink();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let pumped = thread::scope(|scope| {
            let sink = &sink;
            let out = stdout.map(|pipe| scope.spawn(move || pump(pipe, sink)));
            let err = stderr.map(|pipe| scope.spawn(move || pump(pipe, sink)));

            [out, err]
                .into_iter()
                .flatten()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(io::Error::other("output reader panicked")))
                })
                .fold(Ok(()), |acc, result| acc.and(result))
        });

        let status = child.wait().map_err(|source| Error::ProcessLaunch {
            command: rendered.clone(),
            source,
        })?;

        pumped.map_err(|e| Error::io("<output>", e))?;

        if status.success() {
            log::trace!("Finished: {rendered}");
            Ok(0)
        } else {
            log::debug!("Failed ({status}): {rendered}");
            Err(Error::ProcessFailed {
                command: rendered,
                exit_code: status.code(),
            })
        }
    }
}

/// Copy a pipe into the sink until EOF.
///
/// If the sink fails, the pipe is still drained so the child never blocks on
/// a full pipe; the first write error is returned at the end.
fn pump(mut pipe: impl Read, sink: &OutputSink) -> io::Result<()> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut write_error = None;

    loop {
        let n = match pipe.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if write_error.is_none() {
            write_error = sink.write_chunk(&buf[..n]).err();
        }
    }

    write_error.map_or(Ok(()), Err)
}
