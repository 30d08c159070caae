use std::convert::Infallible;
use std::ffi::{CString, NulError};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use thiserror::Error;

use crate::builtin;
use crate::types::{Command, Stage};

/// Failures while turning a [`Command`] into running processes.
///
/// `PipeCreationFailed` and `ForkFailed` happen in the interpreter process
/// and abort the current line. The remaining variants happen in a forked
/// child, which reports to stderr and exits non-zero; the interpreter only
/// observes that the child terminated.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to create pipe: {0}")]
    PipeCreationFailed(Errno),
    #[error("failed to fork: {0}")]
    ForkFailed(Errno),
    #[error("cannot open {path}: {source}")]
    RedirectOpenFailed { path: String, source: io::Error },
    #[error("failed to execute {program}: {source}")]
    ExecFailed { program: String, source: Errno },
    #[error("cd: {path}: {source}")]
    ChangeDirFailed { path: String, source: Errno },
    #[error("stream setup failed: {0}")]
    Sys(#[from] Errno),
    #[error("argument contains an interior NUL byte")]
    InvalidArgument(#[from] NulError),
}

impl LaunchError {
    fn child_exit_code(&self) -> i32 {
        match self {
            LaunchError::ExecFailed {
                source: Errno::ENOENT,
                ..
            } => 127,
            LaunchError::ExecFailed { .. } => 126,
            _ => 1,
        }
    }
}

/// Parent-owned pipe descriptors. Dropping the link closes both ends, which
/// the parent must do before it waits: a write end left open in the parent
/// keeps the reading child from ever seeing end-of-input.
struct PipeLink {
    read: OwnedFd,
    write: OwnedFd,
}

impl PipeLink {
    fn new() -> Result<PipeLink, LaunchError> {
        let (read, write) = unistd::pipe().map_err(LaunchError::PipeCreationFailed)?;
        Ok(PipeLink { read, write })
    }
}

/// How a stage connects to the pipeline's pipe, if at all.
enum PipeAttachment<'a> {
    None,
    /// The stage's stdout becomes the pipe's write end.
    Writer(&'a PipeLink),
    /// The stage's stdin becomes the pipe's read end.
    Reader(&'a PipeLink),
}

/// Executes one parsed command line, blocking until every process launched
/// for it has terminated.
///
/// Empty input is a no-op, and `cd` with a target runs in this process
/// without forking. Exit statuses of the children are not surfaced; a child
/// that fails reports on its own stderr.
pub fn run(command: &Command) -> Result<(), LaunchError> {
    if command.arguments.is_empty() {
        return Ok(());
    }
    if let Some(target) = builtin::cd_target(command) {
        return builtin::change_directory(target).map_err(|source| {
            LaunchError::ChangeDirFailed {
                path: target.to_string(),
                source,
            }
        });
    }

    match command.stages() {
        (stage, None) => {
            let pid = spawn(&stage, &PipeAttachment::None)?;
            wait_for(pid);
            Ok(())
        }
        (left, Some(right)) => {
            let link = PipeLink::new()?;
            let left_pid = spawn(&left, &PipeAttachment::Writer(&link))?;
            let right_pid = spawn(&right, &PipeAttachment::Reader(&link));
            // Both parent ends must be closed before waiting, whether or not
            // the second fork succeeded.
            drop(link);
            let result = match right_pid {
                Ok(pid) => {
                    wait_for(pid);
                    Ok(())
                }
                Err(e) => Err(e),
            };
            wait_for(left_pid);
            result
        }
    }
}

/// Forks one child for `stage`. The child wires up its standard streams and
/// replaces its image; it never returns into interpreter code. The parent
/// gets the child's pid back immediately.
fn spawn(stage: &Stage<'_>, pipe: &PipeAttachment<'_>) -> Result<Pid, LaunchError> {
    match unsafe { unistd::fork() }.map_err(LaunchError::ForkFailed)? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => exec_stage(stage, pipe),
    }
}

/// Child side of `spawn`: report any failure and exit without unwinding
/// back into interpreter state.
fn exec_stage(stage: &Stage<'_>, pipe: &PipeAttachment<'_>) -> ! {
    let err = match redirect_and_exec(stage, pipe) {
        Ok(never) => match never {},
        Err(err) => err,
    };
    let message = match &err {
        LaunchError::ExecFailed {
            program,
            source: Errno::ENOENT,
        } => format!("command not found: {program}"),
        other => other.to_string(),
    };
    let _ = writeln!(io::stderr(), "rsh: {message}");
    unsafe { libc::_exit(err.child_exit_code()) }
}

fn redirect_and_exec(
    stage: &Stage<'_>,
    pipe: &PipeAttachment<'_>,
) -> Result<Infallible, LaunchError> {
    match pipe {
        PipeAttachment::None => {}
        PipeAttachment::Writer(link) => {
            unistd::close(link.read.as_raw_fd())?;
            dup_onto(link.write.as_raw_fd(), STDOUT_FILENO)?;
        }
        PipeAttachment::Reader(link) => {
            unistd::close(link.write.as_raw_fd())?;
            dup_onto(link.read.as_raw_fd(), STDIN_FILENO)?;
        }
    }
    if let Some(path) = stage.input {
        let file = File::open(path).map_err(|source| LaunchError::RedirectOpenFailed {
            path: path.to_string(),
            source,
        })?;
        dup_onto(file.into_raw_fd(), STDIN_FILENO)?;
    }
    if let Some(path) = stage.output {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(path)
            .map_err(|source| LaunchError::RedirectOpenFailed {
                path: path.to_string(),
                source,
            })?;
        dup_onto(file.into_raw_fd(), STDOUT_FILENO)?;
    }

    let program = CString::new(stage.argv[0].as_str())?;
    let argv = stage
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    match unistd::execvp(&program, &argv) {
        Ok(never) => match never {},
        Err(source) => Err(LaunchError::ExecFailed {
            program: stage.argv[0].clone(),
            source,
        }),
    }
}

/// Duplicates `fd` onto a standard stream and closes the original, so the
/// descriptor does not leak across the image replacement.
fn dup_onto(fd: RawFd, stream: RawFd) -> Result<(), Errno> {
    unistd::dup2(fd, stream)?;
    unistd::close(fd)?;
    Ok(())
}

/// Blocks until the child has terminated. Only `EINTR` is retried; any other
/// wait error means the child is already gone.
fn wait_for(pid: Pid) {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => return,
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(_) => return,
        }
    }
}
