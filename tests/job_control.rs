//! Job control checks that change process-wide state.
//!
//! Each check runs in a forked child so that ignored signals, new sessions
//! and controlling terminals never leak into the test runner.
#![cfg(target_os = "linux")]

use nix::pty::openpty;
use nix::sys::signal::{SigHandler, Signal, killpg, signal};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, fork, setsid, tcgetpgrp};
use pgsh::launcher::{launch, resume};
use pgsh::{ArgumentVector, ShellError, ShellSession};
use std::fmt::Display;
use std::fs::File;
use std::os::fd::AsRawFd;

/// Succeeds when the job's terminal has the job's own group in the foreground.
/// Fields 5 and 8 of /proc/<pid>/stat are pgrp and tpgid.
const OWNS_TERMINAL: &str = "set -- $(cat /proc/$$/stat); test \"$5\" = \"$8\"";

type Check = Result<(), String>;

fn argv(words: &[&str]) -> ArgumentVector {
    words.iter().copied().collect()
}

fn step<T, E: Display>(what: &str, res: Result<T, E>) -> Result<T, String> {
    res.map_err(|e| format!("{what}: {e}"))
}

/// Run `check` in a forked child and return how the child ended.
fn in_child(check: fn() -> Check) -> WaitStatus {
    // SAFETY: the child only runs `check` and leaves through _exit.
    match unsafe { fork() }.expect("fork") {
        ForkResult::Child => {
            let code = match std::panic::catch_unwind(check) {
                Ok(Ok(())) => 0,
                Ok(Err(msg)) => {
                    eprintln!("{msg}");
                    1
                }
                Err(_) => 2,
            };
            unsafe { libc::_exit(code) }
        }
        ForkResult::Parent { child } => waitpid(child, None).expect("waitpid"),
    }
}

fn assert_passed(status: WaitStatus) {
    assert!(
        matches!(status, WaitStatus::Exited(_, 0)),
        "check failed: {status:?}"
    );
}

fn ignore_job_control_signals() -> Check {
    for sig in [
        Signal::SIGINT,
        Signal::SIGQUIT,
        Signal::SIGTSTP,
        Signal::SIGTTIN,
        Signal::SIGTTOU,
    ] {
        step("ignore signal", unsafe { signal(sig, SigHandler::SigIgn) })?;
    }
    Ok(())
}

fn jobs_get_default_signals_back() -> Check {
    ignore_job_control_signals()?;
    let null = step("open /dev/null", File::open("/dev/null"))?;
    let mut session = step("session", ShellSession::on_terminal(null.into(), "t>".into()))?;

    match launch(&mut session, &argv(&["sh", "-c", "kill -INT $$; exit 0"])) {
        Ok(Some(WaitStatus::Signaled(_, Signal::SIGINT, _))) => {}
        other => return Err(format!("SIGINT was not fatal: {other:?}")),
    }

    let pid = match launch(&mut session, &argv(&["sh", "-c", "kill -TSTP $$; exit 0"])) {
        Ok(Some(WaitStatus::Stopped(pid, Signal::SIGTSTP))) => pid,
        other => return Err(format!("SIGTSTP did not stop the job: {other:?}")),
    };
    if session.stopped_job() != Some(pid) {
        return Err(format!("stopped job not recorded: {:?}", session.stopped_job()));
    }
    let _ = killpg(pid, Signal::SIGKILL);
    let _ = waitpid(pid, None);
    Ok(())
}

fn terminal_follows_the_foreground_job() -> Check {
    step("setsid", setsid())?;
    let pty = step("openpty", openpty(None, None))?;
    // SAFETY: plain ioctl on a descriptor owned by `pty`.
    if unsafe { libc::ioctl(pty.slave.as_raw_fd(), libc::TIOCSCTTY, 0) } != 0 {
        return Err("TIOCSCTTY failed".into());
    }

    let mut session = step("session", ShellSession::on_terminal(pty.slave, "t>".into()))?;
    if !session.is_interactive() {
        return Err("pty session is not interactive".into());
    }
    let shell = session.shell_pgid();
    let shell_owns_terminal = |session: &ShellSession, when: &str| -> Check {
        let owner = step("tcgetpgrp", tcgetpgrp(session.terminal()))?;
        if owner == shell {
            Ok(())
        } else {
            Err(format!("{when}: terminal owned by {owner}, shell is {shell}"))
        }
    };
    shell_owns_terminal(&session, "after init")?;

    match launch(&mut session, &argv(&["sh", "-c", OWNS_TERMINAL])) {
        Ok(Some(WaitStatus::Exited(_, 0))) => {}
        other => return Err(format!("job did not own the terminal: {other:?}")),
    }
    shell_owns_terminal(&session, "after launch")?;

    let script = format!("kill -STOP $$; {OWNS_TERMINAL}");
    let pid = match launch(&mut session, &argv(&["sh", "-c", &script])) {
        Ok(Some(WaitStatus::Stopped(pid, Signal::SIGSTOP))) => pid,
        other => return Err(format!("job did not stop: {other:?}")),
    };
    shell_owns_terminal(&session, "after stop")?;
    match resume(&mut session, pid) {
        Ok(WaitStatus::Exited(_, 0)) => {}
        other => return Err(format!("resumed job did not own the terminal: {other:?}")),
    }
    shell_owns_terminal(&session, "after resume")?;

    // The background sleep keeps the group alive after its leader is reaped,
    // so it can be signalled but not waited for.
    let pgid = match launch(&mut session, &argv(&["sh", "-c", "sleep 30 & exit 0"])) {
        Ok(Some(WaitStatus::Exited(pid, 0))) => pid,
        other => return Err(format!("group leader did not exit: {other:?}")),
    };
    let res = resume(&mut session, pgid);
    let _ = killpg(pgid, Signal::SIGKILL);
    match res {
        Err(ShellError::Wait { .. }) => {}
        other => return Err(format!("wait did not fail: {other:?}")),
    }
    shell_owns_terminal(&session, "after failed wait")?;
    if session.stopped_job().is_some() {
        return Err("failed resume left a stopped job".into());
    }
    Ok(())
}

#[test]
fn ignored_signals_are_reset_for_jobs() {
    assert_passed(in_child(jobs_get_default_signals_back));
}

#[test]
fn terminal_is_handed_over_and_reclaimed() {
    assert_passed(in_child(terminal_follows_the_foreground_job));
}

#[test]
fn helper_reports_failures() {
    assert!(matches!(
        in_child(|| Err("failed on purpose".into())),
        WaitStatus::Exited(_, 1)
    ));
}
