//! Running external programs as foreground jobs.
//!
//! Each program gets its own process group and, in an interactive session,
//! the controlling terminal for as long as the shell waits on it:
//!
//! ```text
//! READY -> fork -> child:  setpgid(0, 0) -> tcsetpgrp(child) -> SIG_DFL -> execvp | _exit(127)
//!               -> parent: setpgid(child, child) -> tcsetpgrp(child) -> waitpid
//!       -> tcsetpgrp(shell) -> READY
//! ```
//!
//! Both sides set the process group and hand over the terminal so that
//! whichever runs first establishes them. The shell gets the terminal back
//! once the wait returns, also when it fails. A child that never exits or
//! stops blocks the shell; there is no timeout.

use crate::error::ShellError;
use crate::lexer::ArgumentVector;
use crate::session::{ShellSession, TerminalHandoff, set_job_control_signals};
use nix::sys::signal::{SigHandler, Signal, killpg};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork, getpid, setpgid, tcsetpgrp};
use std::ffi::CString;
use std::os::fd::BorrowedFd;
use tracing::debug;

/// Exit status of a child whose `execvp` failed.
pub const EXEC_FAILURE_STATUS: i32 = 127;

/// Run `args` as a foreground job and wait until it exits, is killed or stops.
///
/// Returns `None` for an empty vector. A stopped job is recorded in the
/// session for `fg`.
pub fn launch(
    session: &mut ShellSession,
    args: &ArgumentVector,
) -> Result<Option<WaitStatus>, ShellError> {
    let Some(name) = args.command() else {
        return Ok(None);
    };
    let argv = args.to_exec_args()?;

    // SAFETY: the shell runs a single thread, and the child only adjusts its
    // process group, terminal and signal dispositions before exec or _exit.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => run_child(session.terminal(), session.is_interactive(), &argv),
        Ok(ForkResult::Parent { child }) => {
            debug!(pid = %child, command = name, "forked");
            let status = wait_foreground(session, child)?;
            report(session, status, child, name);
            Ok(Some(status))
        }
        Err(e) => {
            eprintln!("pgsh: fork failed: {e}");
            std::process::abort();
        }
    }
}

/// Continue the stopped group `pgid` in the foreground and wait for it.
pub fn resume(session: &mut ShellSession, pgid: Pid) -> Result<WaitStatus, ShellError> {
    let result = {
        let _handoff = TerminalHandoff::new(session, pgid);
        killpg(pgid, Signal::SIGCONT)
            .map_err(|source| ShellError::Signal { pgid, source })
            .and_then(|()| {
                debug!(pgid = %pgid, "job continued");
                waitpid(Pid::from_raw(-pgid.as_raw()), Some(WaitPidFlag::WUNTRACED))
                    .map_err(|source| ShellError::Wait { pid: pgid, source })
            })
    };

    let status = match result {
        Ok(status) => status,
        Err(e) => {
            if session.stopped_job() == Some(pgid) {
                session.set_stopped_job(None);
            }
            return Err(e);
        }
    };

    if let WaitStatus::Stopped(..) = status {
        session.set_stopped_job(Some(pgid));
        eprintln!("\n[stopped] {pgid}");
    } else {
        if session.stopped_job() == Some(pgid) {
            session.set_stopped_job(None);
        }
        report_termination(status);
    }
    Ok(status)
}

fn run_child(terminal: BorrowedFd<'_>, interactive: bool, argv: &[CString]) -> ! {
    let pid = getpid();
    // Failures here are also handled by the parent's mirrored calls.
    let _ = setpgid(pid, pid);
    if interactive {
        let _ = tcsetpgrp(terminal, pid);
    }
    set_job_control_signals(SigHandler::SigDfl);

    let Err(err) = execvp(&argv[0], argv);
    eprintln!("pgsh: {}: {}", argv[0].to_string_lossy(), err.desc());
    // SAFETY: _exit skips atexit handlers and stdio buffers the child shares
    // with the shell.
    unsafe { libc::_exit(EXEC_FAILURE_STATUS) }
}

fn wait_foreground(session: &ShellSession, child: Pid) -> Result<WaitStatus, ShellError> {
    if let Err(e) = setpgid(child, child) {
        // EACCES: the child already exec'd; ESRCH: it already exited.
        debug!(pid = %child, error = %e, "setpgid from parent failed");
    }
    let _handoff = TerminalHandoff::new(session, child);
    waitpid(child, Some(WaitPidFlag::WUNTRACED))
        .map_err(|source| ShellError::Wait { pid: child, source })
}

fn report(session: &mut ShellSession, status: WaitStatus, child: Pid, name: &str) {
    match status {
        WaitStatus::Stopped(..) => {
            session.set_stopped_job(Some(child));
            eprintln!("\n[stopped] {child} {name}");
        }
        other => report_termination(other),
    }
}

fn report_termination(status: WaitStatus) {
    match status {
        WaitStatus::Signaled(pid, sig, _) => {
            debug!(pid = %pid, signal = ?sig, "job killed");
            eprintln!("Process terminated by signal {}", sig as i32);
        }
        WaitStatus::Exited(pid, code) => debug!(pid = %pid, code, "job exited"),
        other => debug!(status = ?other, "job changed state"),
    }
}
