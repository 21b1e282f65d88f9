use nix::errno::Errno;
use nix::unistd::Pid;
use std::ffi::NulError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the shell's own process.
///
/// Everything here is recoverable: the read loop reports it and continues.
/// Failures that leave the process table in an unknown state (a failed
/// `fork`) abort instead of producing a value of this type.
#[derive(Debug, Error)]
pub enum ShellError {
    /// `cd` without an argument and no home directory could be found.
    #[error("HOME not set and no home directory in the account database")]
    NoHome,

    #[error("too many arguments")]
    TooManyArgs,

    #[error("cannot change directory to {}", path.display())]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A token cannot be handed to `execvp`.
    #[error("argument contains an interior NUL byte")]
    NulByte(#[from] NulError),

    #[error("wait for process {pid} failed")]
    Wait {
        pid: Pid,
        #[source]
        source: Errno,
    },

    #[error("{op} failed on the controlling terminal")]
    Terminal {
        op: &'static str,
        #[source]
        source: Errno,
    },

    #[error("failed to signal process group {pgid}")]
    Signal {
        pgid: Pid,
        #[source]
        source: Errno,
    },

    #[error("no stopped job")]
    NoStoppedJob,

    #[error(transparent)]
    Io(#[from] io::Error),
}
