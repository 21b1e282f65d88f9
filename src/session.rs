//! Process-wide shell state: the controlling terminal and who owns it.

use crate::config::Config;
use crate::env::{Environment, get_prompt};
use crate::error::ShellError;
use nix::errno::Errno;
use nix::sys::signal::{SigHandler, Signal, killpg, signal};
use nix::unistd::{Pid, getpgrp, getpid, setpgid, tcgetpgrp, tcsetpgrp};
use std::io::IsTerminal;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use tracing::{debug, warn};

/// Signals the terminal driver uses for job control.
///
/// The shell ignores them for its whole lifetime; launched children put them
/// back to their defaults before exec.
pub(crate) const JOB_CONTROL_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// State shared by every component for the duration of one shell run.
///
/// There is exactly one session per process. It is created by
/// [`ShellSession::init`] before the first prompt and dropped when the read
/// loop ends, which closes the terminal descriptor.
#[derive(Debug)]
pub struct ShellSession {
    terminal: OwnedFd,
    is_interactive: bool,
    prompt: String,
    shell_pgid: Pid,
    stopped_job: Option<Pid>,
}

impl ShellSession {
    /// Set up the session on standard input.
    pub fn init(env: &Environment, config: &Config) -> Result<Self, ShellError> {
        let terminal = std::io::stdin().as_fd().try_clone_to_owned()?;
        Self::on_terminal(terminal, get_prompt(env, &config.prompt_var))
    }

    /// Set up the session on `terminal`.
    ///
    /// When `terminal` is a terminal the shell waits until it is in the
    /// foreground, ignores the job-control signals, moves into its own process
    /// group and takes the terminal. Otherwise nothing about signals or
    /// process groups is changed.
    pub fn on_terminal(terminal: OwnedFd, prompt: String) -> Result<Self, ShellError> {
        let is_interactive = terminal.is_terminal();
        let shell_pgid = if is_interactive {
            take_terminal(terminal.as_fd())?
        } else {
            getpgrp()
        };
        debug!(interactive = is_interactive, pgid = %shell_pgid, "session initialized");

        Ok(Self {
            terminal,
            is_interactive,
            prompt,
            shell_pgid,
            stopped_job: None,
        })
    }

    /// A session that never touches terminal ownership.
    #[cfg(test)]
    pub(crate) fn detached(prompt: &str) -> Self {
        Self {
            terminal: std::io::stdin()
                .as_fd()
                .try_clone_to_owned()
                .expect("dup stdin"),
            is_interactive: false,
            prompt: prompt.to_string(),
            shell_pgid: getpgrp(),
            stopped_job: None,
        }
    }

    pub fn terminal(&self) -> BorrowedFd<'_> {
        self.terminal.as_fd()
    }

    pub fn is_interactive(&self) -> bool {
        self.is_interactive
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn shell_pgid(&self) -> Pid {
        self.shell_pgid
    }

    /// Process group of the last foreground job that was stopped.
    pub fn stopped_job(&self) -> Option<Pid> {
        self.stopped_job
    }

    pub(crate) fn set_stopped_job(&mut self, pgid: Option<Pid>) {
        self.stopped_job = pgid;
    }

    /// The group `fg` should resume.
    ///
    /// A foreign group currently in the terminal's foreground wins; otherwise
    /// the recorded stopped job is used.
    pub fn foreground_job(&self) -> Option<Pid> {
        match tcgetpgrp(self.terminal()) {
            Ok(pgid) if pgid.as_raw() > 0 && pgid != self.shell_pgid => return Some(pgid),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "no foreground group on terminal"),
        }
        self.stopped_job
    }

    /// Hand the terminal to `pgid`. No-op for a non-interactive session.
    pub fn give_terminal(&self, pgid: Pid) {
        if !self.is_interactive {
            return;
        }
        match tcsetpgrp(self.terminal(), pgid) {
            Ok(()) => debug!(pgid = %pgid, "terminal handed to job"),
            Err(e) => warn!(pgid = %pgid, error = %e, "failed to hand over the terminal"),
        }
    }

    /// Give the terminal back to the shell's own process group.
    pub fn reclaim_terminal(&self) {
        if !self.is_interactive {
            return;
        }
        match tcsetpgrp(self.terminal(), self.shell_pgid) {
            Ok(()) => debug!(pgid = %self.shell_pgid, "terminal reclaimed"),
            Err(e) => warn!(error = %e, "failed to reclaim the terminal"),
        }
    }
}

impl Drop for ShellSession {
    fn drop(&mut self) {
        debug!(stopped_job = ?self.stopped_job, "session teardown");
    }
}

/// Hands the terminal to a job for as long as the value lives.
///
/// Dropping it returns the terminal to the shell, whatever happened while the
/// job was in the foreground.
pub(crate) struct TerminalHandoff<'a> {
    session: &'a ShellSession,
}

impl<'a> TerminalHandoff<'a> {
    pub(crate) fn new(session: &'a ShellSession, pgid: Pid) -> Self {
        session.give_terminal(pgid);
        Self { session }
    }
}

impl Drop for TerminalHandoff<'_> {
    fn drop(&mut self) {
        self.session.reclaim_terminal();
    }
}

fn take_terminal(terminal: BorrowedFd<'_>) -> Result<Pid, ShellError> {
    loop {
        let pgrp = getpgrp();
        let foreground = tcgetpgrp(terminal).map_err(|source| ShellError::Terminal {
            op: "tcgetpgrp",
            source,
        })?;
        if foreground == pgrp {
            break;
        }
        // Stop until the job-control shell that started us puts us in front.
        killpg(pgrp, Signal::SIGTTIN).map_err(|source| ShellError::Signal {
            pgid: pgrp,
            source,
        })?;
    }

    set_job_control_signals(SigHandler::SigIgn);

    let pid = getpid();
    match setpgid(pid, pid) {
        Ok(()) => {}
        // Already a session leader, which is its own group.
        Err(Errno::EPERM) => debug!("shell is a session leader, keeping its group"),
        Err(e) => warn!(error = %e, "could not move the shell into its own group"),
    }

    let pgid = getpgrp();
    tcsetpgrp(terminal, pgid).map_err(|source| ShellError::Terminal {
        op: "tcsetpgrp",
        source,
    })?;
    Ok(pgid)
}

/// Set every job-control signal to `handler`.
pub(crate) fn set_job_control_signals(handler: SigHandler) {
    for sig in JOB_CONTROL_SIGNALS {
        // SAFETY: SIG_IGN and SIG_DFL install no Rust code as a handler.
        if let Err(e) = unsafe { signal(sig, handler) } {
            warn!(signal = ?sig, error = %e, "failed to change signal disposition");
        }
    }
}
