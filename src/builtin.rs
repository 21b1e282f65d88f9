use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::launcher;
use crate::lexer::ArgumentVector;
use crate::session::ShellSession;
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins take their tokens as typed, without option parsing, and are
/// executed directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd" or "fg".
    fn name() -> &'static str;

    /// Builds the command from the full argument vector, `args[0]` included.
    fn from_args(args: &ArgumentVector) -> Self;

    /// Executes the command against the session and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, session: &mut ShellSession, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        session: &mut ShellSession,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, session, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                eprintln!("{}: {:#}", T::name(), e);
                Ok(1)
            }
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, args: &ArgumentVector) -> Option<Box<dyn ExecutableCommand>> {
        if args.command() == Some(T::name()) {
            Some(Box::new(T::from_args(args)))
        } else {
            None
        }
    }
}

/// Table of the builtins the shell recognizes: `exit`, `cd` and `fg`.
pub struct Builtins {
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Builtins {
    /// Create a table with a custom set of builtin factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { commands }
    }

    /// Run `args` if it names a builtin.
    ///
    /// Returns `true` when the line was a builtin, whether or not it
    /// succeeded; failures have already been reported on stderr. Returns
    /// `false` when the caller should launch an external program instead.
    pub fn try_builtin(
        &self,
        session: &mut ShellSession,
        env: &mut Environment,
        args: &ArgumentVector,
    ) -> bool {
        let Some(name) = args.command() else {
            return false;
        };
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(args) {
                match cmd.execute(session, env) {
                    Ok(code) => debug!(builtin = name, code, "builtin finished"),
                    Err(e) => eprintln!("{name}: {e:#}"),
                }
                return true;
            }
        }
        false
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Fg>::default()),
        ])
    }
}

/// Exit the shell with status 0. Arguments are ignored.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &ArgumentVector) -> Self {
        Exit
    }

    fn execute(self, _session: &mut ShellSession, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// Without an argument, changes to $HOME, or to the home directory of the
/// account record when HOME is not set. A single argument is used as the path
/// verbatim, even when it starts with a dash.
pub struct Cd {
    args: ArgumentVector,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &ArgumentVector) -> Self {
        Cd { args: args.clone() }
    }

    fn execute(self, _session: &mut ShellSession, env: &mut Environment) -> Result<ExitCode> {
        change_dir(&self.args, env)?;
        Ok(0)
    }
}

/// Continue the stopped job in the foreground. Arguments are ignored.
pub struct Fg;

impl BuiltinCommand for Fg {
    fn name() -> &'static str {
        "fg"
    }

    fn from_args(_args: &ArgumentVector) -> Self {
        Fg
    }

    fn execute(self, session: &mut ShellSession, _env: &mut Environment) -> Result<ExitCode> {
        let pgid = session.foreground_job().ok_or(ShellError::NoStoppedJob)?;
        launcher::resume(session, pgid)?;
        Ok(0)
    }
}

/// Change directory as `cd` would for the full argument vector `args`.
///
/// With only the command name, goes to the home directory. With one argument,
/// goes to that path verbatim. On failure the working directory is unchanged.
pub fn change_dir(args: &ArgumentVector, env: &mut Environment) -> Result<(), ShellError> {
    match args.len() {
        0 | 1 => change_dir_to(None, env),
        2 => change_dir_to(args.get(1), env),
        _ => Err(ShellError::TooManyArgs),
    }
}

fn change_dir_to(target: Option<&str>, env: &mut Environment) -> Result<(), ShellError> {
    let dir = match target {
        Some(path) => PathBuf::from(path),
        None => env.home_dir().ok_or(ShellError::NoHome)?,
    };

    env::set_current_dir(&dir).map_err(|source| ShellError::ChangeDir {
        path: dir.clone(),
        source,
    })?;
    env.current_dir = env::current_dir().unwrap_or(dir);
    debug!(cwd = %env.current_dir.display(), "changed directory");
    Ok(())
}
